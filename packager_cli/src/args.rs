//! Command-line surface of the `packager` binary

use crate::orchestrators::PackagerRequest;
use clap::{ArgAction, Parser};
use packager_core::ModeFlags;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "packager")]
#[command(
    author,
    version,
    about = "Import and export repository objects as archival packages",
    long_about = None,
    disable_help_flag = true,
    after_help = "Examples:\n  \
        Submit:      packager -e user@example.org -p 123456789/2 -t AIP item.json\n  \
        Restore:     packager -r -a -e user@example.org -t AIP COMMUNITY@10673-1.json\n  \
        Replace:     packager -f -e user@example.org -t AIP -i 123456789/7 ITEM@123456789-7.json\n  \
        Disseminate: packager -d -e user@example.org -t AIP -i 123456789/1 export.json"
)]
pub struct PackagerArgs {
    /// Package type or plugin alias (e.g. AIP)
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub package_type: Option<String>,

    /// Email address of the person performing the operation
    #[arg(short = 'e', long = "eperson", value_name = "EMAIL")]
    pub eperson: Option<String>,

    /// Parent handle; repeatable, the first one owns the new object
    #[arg(short = 'p', long = "parent", value_name = "HANDLE")]
    pub parents: Vec<String>,

    /// Handle of the object to disseminate or replace
    #[arg(short = 'i', long = "identifier", value_name = "HANDLE")]
    pub identifier: Option<String>,

    /// Export objects as packages instead of ingesting them
    #[arg(short = 'd', long = "disseminate", conflicts_with = "submit")]
    pub disseminate: bool,

    /// Ingest packages as new objects (the default)
    #[arg(short = 's', long = "submit")]
    pub submit: bool,

    /// Recreate objects with the identifiers recorded in the packages
    #[arg(short = 'r', long = "restore")]
    pub restore: bool,

    /// With -r, skip packages whose objects already exist
    #[arg(short = 'k', long = "keep-existing")]
    pub keep_existing: bool,

    /// Replace existing objects with the package contents (implies -r)
    #[arg(short = 'f', long = "force-replace")]
    pub force_replace: bool,

    /// Install submissions directly, bypassing the review workflow
    #[arg(short = 'w', long = "install")]
    pub install: bool,

    /// Process the whole tree a package references
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    /// Plugin option as NAME=VALUE; repeatable
    #[arg(short = 'o', long = "option", value_name = "NAME=VALUE")]
    pub options: Vec<String>,

    /// Relational scope forwarded to the plugin
    #[arg(short = 'z', long = "relational-scope", value_name = "SCOPE")]
    pub relational_scope: Option<String>,

    /// Never prompt; use the default answer for every question
    #[arg(short = 'u', long = "no-user-interaction")]
    pub no_user_interaction: bool,

    /// Validate and list what would be processed without changing anything
    #[arg(short = 'y', long = "dry-run")]
    pub dry_run: bool,

    /// Print usage, plus plugin options when combined with -t
    #[arg(short = 'h', long = "help", action = ArgAction::SetTrue)]
    pub help: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Configuration file to use instead of the default one
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Package sources, or destinations with -d; `-` means standard input/output
    #[arg(value_name = "PACKAGE")]
    pub packages: Vec<String>,
}

impl PackagerArgs {
    /// Build the orchestrator request; `warnings` collects dropped `-o` values
    pub fn to_request(&self, warnings: &mut Vec<String>) -> PackagerRequest {
        let (options, malformed) = parse_options(&self.options);
        warnings.extend(
            malformed
                .into_iter()
                .map(|raw| format!("Ignoring malformed option '{raw}': expected NAME=VALUE")),
        );

        PackagerRequest {
            package_type: self.package_type.clone(),
            eperson: self.eperson.clone(),
            packages: self.packages.clone(),
            parents: self.parents.clone(),
            identifier: self.identifier.clone(),
            flags: ModeFlags {
                disseminate: self.disseminate,
                restore: self.restore,
                replace: self.force_replace,
            },
            keep_existing: self.keep_existing,
            workflow: !self.install,
            recursive: self.all,
            options,
            scope: self.relational_scope.clone(),
            no_user_interaction: self.no_user_interaction,
            dry_run: self.dry_run,
            help: self.help,
        }
    }
}

/// Split `-o` values into name/value pairs
///
/// A bare `name` gets an empty value; values with an empty name are returned
/// separately as malformed.
pub fn parse_options(raw: &[String]) -> (Vec<(String, String)>, Vec<String>) {
    let mut options = Vec::new();
    let mut malformed = Vec::new();

    for option in raw {
        let (name, value) = option.split_once('=').unwrap_or((option.as_str(), ""));
        let name = name.trim();
        if name.is_empty() {
            malformed.push(option.clone());
        } else {
            options.push((name.to_string(), value.to_string()));
        }
    }

    (options, malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> PackagerArgs {
        PackagerArgs::try_parse_from(std::iter::once("packager").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_command_definition_is_valid() {
        PackagerArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_full_submit() {
        let args = parse(&[
            "-e", "user@example.org", "-t", "AIP", "-p", "123456/7", "-p", "123456/8", "-a", "-w",
            "pkg.json",
        ]);

        assert_eq!(args.eperson.as_deref(), Some("user@example.org"));
        assert_eq!(args.package_type.as_deref(), Some("AIP"));
        assert_eq!(args.parents, vec!["123456/7", "123456/8"]);
        assert!(args.all);
        assert!(args.install);
        assert_eq!(args.packages, vec!["pkg.json"]);
    }

    #[test]
    fn test_dash_is_a_package() {
        let args = parse(&["-d", "-e", "u@example.org", "-t", "AIP", "-i", "1/2", "-"]);
        assert_eq!(args.packages, vec!["-"]);
    }

    #[test]
    fn test_disseminate_conflicts_with_submit() {
        let result = PackagerArgs::try_parse_from(["packager", "-d", "-s", "pkg.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_help_flag_does_not_exit() {
        let args = parse(&["-h", "-t", "AIP"]);
        assert!(args.help);
        assert_eq!(args.package_type.as_deref(), Some("AIP"));
    }

    #[test]
    fn test_to_request_maps_flags() {
        let args = parse(&["-f", "-k", "-w", "-u", "-y", "-z", "isPartOf", "pkg.json"]);
        let mut warnings = Vec::new();
        let request = args.to_request(&mut warnings);

        assert!(request.flags.replace);
        assert!(!request.flags.restore);
        assert!(request.keep_existing);
        assert!(!request.workflow);
        assert!(request.no_user_interaction);
        assert!(request.dry_run);
        assert_eq!(request.scope.as_deref(), Some("isPartOf"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_parse_options() {
        let raw = vec![
            "manifestOnly=true".to_string(),
            "ignoreHandle".to_string(),
            "=orphan".to_string(),
            "filter=a=b".to_string(),
        ];
        let (options, malformed) = parse_options(&raw);

        assert_eq!(
            options,
            vec![
                ("manifestOnly".to_string(), "true".to_string()),
                ("ignoreHandle".to_string(), String::new()),
                ("filter".to_string(), "a=b".to_string()),
            ]
        );
        assert_eq!(malformed, vec!["=orphan"]);
    }

    #[test]
    fn test_malformed_options_become_warnings() {
        let args = parse(&["-o", "=value", "-o", "pretty=false", "pkg.json"]);
        let mut warnings = Vec::new();
        let request = args.to_request(&mut warnings);

        assert_eq!(request.options.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("=value"));
    }
}
