//! Terminal detection and capability utilities

use is_terminal::IsTerminal;
use std::env;
use std::io::{stderr, stdin, stdout};

/// Check if the operator can answer prompts interactively
pub fn is_interactive() -> bool {
    if !stdin().is_terminal() || !stderr().is_terminal() {
        return false;
    }

    // CI runners may allocate a TTY but nobody is there to answer
    if is_ci_environment() {
        return false;
    }

    env::var("DEBIAN_FRONTEND").unwrap_or_default() != "noninteractive"
}

/// Check if stdout supports ANSI escape codes for colored report labels
pub fn supports_ansi() -> bool {
    if !stdout().is_terminal() || is_ci_environment() {
        return false;
    }

    let term = env::var("TERM").unwrap_or_default();
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }

    #[cfg(windows)]
    {
        let _ = term;
        true
    }

    #[cfg(not(windows))]
    {
        term != "dumb" && !term.is_empty()
    }
}

/// Check if stderr is connected to a terminal (for progress display)
pub fn stderr_is_terminal() -> bool {
    stderr().is_terminal()
}

/// Detect if running in a CI environment
fn is_ci_environment() -> bool {
    let ci_vars = [
        "CI",
        "CONTINUOUS_INTEGRATION",
        "JENKINS_URL",
        "GITHUB_ACTIONS",
        "GITLAB_CI",
        "TRAVIS",
        "CIRCLECI",
        "BUILDKITE",
        "DRONE",
        "TEAMCITY_VERSION",
        "TF_BUILD", // Azure DevOps
    ];

    ci_vars.iter().any(|var| env::var(var).is_ok())
}

/// Determine if the spinner should be shown during whole-tree operations
pub fn should_show_progress() -> bool {
    stderr_is_terminal() && !is_ci_environment()
}
