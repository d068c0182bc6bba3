use assert_cmd::Command;
use packager_test_utils::AipTree;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ADMIN: &str = "admin@example.org";

/// A store and configuration file isolated in a temporary directory
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("repository.json");
        let config = format!(
            "[store]\npath = {:?}\nprincipals = [\"{ADMIN}\"]\n\n[output]\ncolor_enabled = false\nprogress_enabled = false\n",
            store.display().to_string()
        );
        fs::write(dir.path().join("config.toml"), config).unwrap();
        Self { dir }
    }

    fn store(&self) -> PathBuf {
        self.dir.path().join("repository.json")
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn packager(&self) -> Command {
        let mut cmd = Command::cargo_bin("packager").unwrap();
        cmd.arg("--config").arg(self.dir.path().join("config.toml"));
        cmd
    }
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("packager").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_package_types() {
    let workspace = Workspace::new();
    workspace
        .packager()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains(
            "Registered ingest package types: AIP, JSON-AIP",
        ));

    assert!(!workspace.store().exists());
}

#[test]
fn test_help_with_type_prints_plugin_options() {
    let workspace = Workspace::new();
    workspace
        .packager()
        .args(["-h", "-t", "AIP"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AIP ingest plugin options:"))
        .stdout(predicate::str::contains("AIP dissemination plugin options:"))
        .stdout(predicate::str::contains("scope="));
}

#[test]
fn test_help_with_unknown_type_says_so() {
    let workspace = Workspace::new();
    workspace
        .packager()
        .args(["-h", "-t", "METS"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No valid ingest plugin found for METS type.",
        ));
}

#[test]
fn test_missing_package_is_usage_error() {
    let workspace = Workspace::new();
    workspace
        .packager()
        .args(["-e", ADMIN, "-t", "AIP"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Missing required argument: PACKAGE"));
}

#[test]
fn test_missing_eperson_is_usage_error() {
    let workspace = Workspace::new();
    let tree = AipTree::sample();
    workspace
        .packager()
        .args(["-t", "AIP"])
        .arg(tree.root())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("-e <email>"));
}

#[test]
fn test_unknown_principal_is_usage_error() {
    let workspace = Workspace::new();
    let tree = AipTree::sample();
    workspace
        .packager()
        .args(["-r", "-u", "-e", "nobody@example.org", "-t", "AIP"])
        .arg(tree.root())
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "EPerson cannot be found: nobody@example.org",
        ));

    assert!(!workspace.store().exists());
}

#[test]
fn test_unknown_package_type_suggests_alias() {
    let workspace = Workspace::new();
    let tree = AipTree::sample();
    workspace
        .packager()
        .args(["-r", "-e", ADMIN, "-t", "AIPP"])
        .arg(tree.root())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Did you mean 'AIP'?"));
}

#[test]
fn test_missing_package_file_is_filesystem_error() {
    let workspace = Workspace::new();
    workspace
        .packager()
        .args(["-r", "-u", "-e", ADMIN, "-t", "AIP"])
        .arg(workspace.path().join("missing.json"))
        .assert()
        .code(4)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_restore_whole_tree() {
    let workspace = Workspace::new();
    let tree = AipTree::sample();

    workspace
        .packager()
        .args(["-r", "-a", "-u", "-e", ADMIN, "-t", "AIP"])
        .arg(tree.root())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "CREATED a total of 3 repository objects.",
        ))
        .stdout(predicate::str::contains(
            "RESTORED COMMUNITY [ hdl=10673/1",
        ))
        .stdout(predicate::str::contains("RESTORED ITEM [ hdl=10673/3"));

    let store = fs::read_to_string(workspace.store()).unwrap();
    assert!(store.contains("10673/3"));
}

#[test]
fn test_restore_collision_fails_without_keep_existing() {
    let workspace = Workspace::new();
    let tree = AipTree::sample();
    let restore = |extra: &[&str]| {
        let mut cmd = workspace.packager();
        cmd.args(["-r", "-u", "-e", ADMIN, "-t", "AIP"])
            .args(extra)
            .arg(tree.root());
        cmd
    };

    restore(&[]).assert().success();
    let before = fs::read_to_string(workspace.store()).unwrap();

    restore(&[])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("10673/1"));
    assert_eq!(fs::read_to_string(workspace.store()).unwrap(), before);

    restore(&["-k"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SKIPPED processing package"));
}

#[test]
fn test_disseminate_tree_after_restore() {
    let workspace = Workspace::new();
    let tree = AipTree::sample();
    workspace
        .packager()
        .args(["-r", "-a", "-u", "-e", ADMIN, "-t", "AIP"])
        .arg(tree.root())
        .assert()
        .success();

    let export_dir = TempDir::new().unwrap();
    let destination = export_dir.path().join("export.json");
    workspace
        .packager()
        .args(["-d", "-a", "-u", "-e", ADMIN, "-t", "AIP", "-i", "10673/1"])
        .arg(&destination)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "CREATED a total of 3 dissemination package files.",
        ));

    assert!(destination.exists());
    assert!(export_dir.path().join("ITEM@10673-3.json").exists());
}

#[test]
fn test_disseminate_requires_identifier() {
    let workspace = Workspace::new();
    workspace
        .packager()
        .args(["-d", "-u", "-e", ADMIN, "-t", "AIP"])
        .arg(workspace.path().join("out.json"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("-i <handle>"));
}

#[test]
fn test_dry_run_changes_nothing() {
    let workspace = Workspace::new();
    let tree = AipTree::sample();
    workspace
        .packager()
        .args(["-r", "-y", "-u", "-e", ADMIN, "-t", "AIP"])
        .arg(tree.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("Packages that would be restored:"))
        .stdout(predicate::str::contains("(DRY RUN) No changes were made."));

    assert!(!workspace.store().exists());
}

#[test]
fn test_malformed_option_is_warned_about() {
    let workspace = Workspace::new();
    workspace
        .packager()
        .args(["-h", "-o", "=orphan"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Ignoring malformed option '=orphan'"));
}
