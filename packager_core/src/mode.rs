//! Operating mode derivation
//!
//! The mode is never stored: it is computed once per run from the raw
//! command-line switches.

use crate::session::SessionMode;
use std::fmt;

/// Raw switches that decide the operating mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeFlags {
    pub disseminate: bool,
    pub restore: bool,
    pub replace: bool,
}

/// The one mode active for an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingMode {
    /// Create new objects from packages
    Submit,
    /// Recreate objects with the identifiers recorded in their packages
    Restore,
    /// Write objects out as packages
    Disseminate,
    /// Destroy existing objects and recreate them from packages
    Replace,
}

impl OperatingMode {
    /// Derive the mode; replace implies restore and wins over everything else
    pub fn derive(flags: ModeFlags) -> Self {
        if flags.replace {
            Self::Replace
        } else if !flags.disseminate || flags.restore {
            if flags.restore {
                Self::Restore
            } else {
                Self::Submit
            }
        } else {
            Self::Disseminate
        }
    }

    /// Submit, Restore and Replace all read packages through an ingester
    pub fn is_submit_family(self) -> bool {
        !matches!(self, Self::Disseminate)
    }

    /// Session mode the run needs
    pub fn session_mode(self) -> SessionMode {
        match self {
            Self::Disseminate => SessionMode::ReadOnly,
            _ => SessionMode::BatchEdit,
        }
    }

    /// Plugin role the mode drives
    pub fn plugin_role(self) -> &'static str {
        if self.is_submit_family() {
            "ingester"
        } else {
            "disseminator"
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Restore => "restore",
            Self::Disseminate => "disseminate",
            Self::Replace => "replace",
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
