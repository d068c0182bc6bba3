//! Human-readable run reports
//!
//! The labels are colored when the report stream supports ANSI codes; the
//! text is otherwise identical, so scripts can match on it.

use colored::*;
use packager_core::{PackageLocation, RepositoryObject, Result};
use std::io::Write;

/// Writes report lines for one packager run
pub struct Reporter<'w> {
    out: &'w mut dyn Write,
    use_color: bool,
}

impl<'w> Reporter<'w> {
    pub fn new(out: &'w mut dyn Write, use_color: bool) -> Self {
        Self { out, use_color }
    }

    fn colorize(&self, text: &str, color: fn(&str) -> ColoredString) -> String {
        if self.use_color {
            color(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Write one plain line
    pub fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    pub fn blank(&mut self) -> Result<()> {
        self.line("")
    }

    /// Write a block of text as is, e.g. usage output
    pub fn text(&mut self, text: &str) -> Result<()> {
        write!(self.out, "{text}")?;
        if !text.ends_with('\n') {
            writeln!(self.out)?;
        }
        Ok(())
    }

    /// List the resolved parents; the first one owns new objects
    pub fn destination_parents(&mut self, parents: &[RepositoryObject]) -> Result<()> {
        self.line("Destination parents:")?;
        for (index, parent) in parents.iter().enumerate() {
            let role = if index == 0 { "Owner" } else { "Parent" };
            self.line(&format!("{role}: {}", parent.handle))?;
        }
        self.blank()
    }

    pub fn ingesting(&mut self, package: &PackageLocation) -> Result<()> {
        self.line(&format!(
            "Ingesting package located at {}",
            package.display_path()
        ))
    }

    pub fn created(&mut self, object: &RepositoryObject) -> Result<()> {
        let label = self.colorize("CREATED", |s| s.green());
        self.line(&format!("{label} new {}", object.describe()))
    }

    pub fn restored(&mut self, object: &RepositoryObject) -> Result<()> {
        let label = self.colorize("RESTORED", |s| s.cyan());
        self.line(&format!("{label} {}", object.describe()))
    }

    /// Report an ingested object as restored or created
    pub fn ingested(&mut self, object: &RepositoryObject, restored: bool) -> Result<()> {
        if restored {
            self.restored(object)
        } else {
            self.created(object)
        }
    }

    pub fn replacing(&mut self, package: &PackageLocation) -> Result<()> {
        self.line(&format!(
            "Replacing repository object(s) with package located at {}",
            package.display_path()
        ))
    }

    pub fn will_replace(&mut self, object: &RepositoryObject) -> Result<()> {
        self.line(&format!(
            "Will replace existing {} [ hdl={} ]",
            object.kind, object.handle
        ))
    }

    pub fn replaced(&mut self, object: &RepositoryObject) -> Result<()> {
        let label = self.colorize("REPLACED", |s| s.yellow());
        self.line(&format!("{label} {} [ hdl={} ]", object.kind, object.handle))
    }

    pub fn skipped(&mut self, package: &PackageLocation) -> Result<()> {
        let label = self.colorize("SKIPPED", |s| s.yellow());
        self.line(&format!(
            "{label} processing package '{package}', as an object already exists with this handle."
        ))
    }

    pub fn package_file(&mut self, canonical: &str) -> Result<()> {
        let label = self.colorize("CREATED", |s| s.green());
        self.line(&format!("{label} package file: {canonical}"))
    }

    pub fn created_total(&mut self, count: usize) -> Result<()> {
        self.line(&format!("CREATED a total of {count} repository objects."))
    }

    pub fn replaced_total(&mut self, count: usize) -> Result<()> {
        self.line(&format!("REPLACED a total of {count} repository objects."))
    }

    pub fn package_total(&mut self, count: usize) -> Result<()> {
        self.line(&format!(
            "CREATED a total of {count} dissemination package files."
        ))
    }

    pub fn dry_run_item(&mut self, text: &str) -> Result<()> {
        self.line(&format!("  {text}"))
    }

    pub fn dry_run_done(&mut self) -> Result<()> {
        let label = self.colorize("(DRY RUN)", |s| s.magenta());
        self.line(&format!("{label} No changes were made."))
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packager_test_utils::{ObjectBuilder, SharedBuffer};

    #[test]
    fn test_object_lines() {
        let buffer = SharedBuffer::new();
        let mut sink = buffer.clone();
        let mut reporter = Reporter::new(&mut sink, false);
        let item = ObjectBuilder::item("123456789/7").build();

        reporter.created(&item).unwrap();
        reporter.restored(&item).unwrap();
        reporter.will_replace(&item).unwrap();
        reporter.replaced(&item).unwrap();

        assert_eq!(
            buffer.lines(),
            vec![
                "CREATED new ITEM [ hdl=123456789/7, dbID=7 ]",
                "RESTORED ITEM [ hdl=123456789/7, dbID=7 ]",
                "Will replace existing ITEM [ hdl=123456789/7 ]",
                "REPLACED ITEM [ hdl=123456789/7 ]",
            ]
        );
    }

    #[test]
    fn test_destination_parents_marks_owner() {
        let buffer = SharedBuffer::new();
        let mut sink = buffer.clone();
        let mut reporter = Reporter::new(&mut sink, false);
        let parents = vec![
            ObjectBuilder::collection("123456789/2").build(),
            ObjectBuilder::collection("123456789/3").build(),
        ];

        reporter.destination_parents(&parents).unwrap();

        let lines = buffer.lines();
        assert_eq!(lines[0], "Destination parents:");
        assert_eq!(lines[1], "Owner: 123456789/2");
        assert_eq!(lines[2], "Parent: 123456789/3");
    }

    #[test]
    fn test_skipped_names_the_package() {
        let buffer = SharedBuffer::new();
        let mut sink = buffer.clone();
        let mut reporter = Reporter::new(&mut sink, false);
        reporter
            .skipped(&PackageLocation::from_argument("ITEM@123456789-7.json"))
            .unwrap();

        assert_eq!(
            buffer.contents(),
            "SKIPPED processing package 'ITEM@123456789-7.json', as an object already exists with this handle.\n"
        );
    }

    #[test]
    fn test_colors_only_decorate_labels() {
        let buffer = SharedBuffer::new();
        let mut sink = buffer.clone();
        let mut reporter = Reporter::new(&mut sink, true);
        colored::control::set_override(true);
        reporter.package_total(2).unwrap();
        reporter.dry_run_done().unwrap();
        colored::control::unset_override();

        let contents = buffer.contents();
        assert!(contents.contains("CREATED a total of 2 dissemination package files."));
        assert!(contents.contains("No changes were made."));
    }
}
