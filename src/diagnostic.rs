//! Diagnostic records returned by rules.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ast::Extent;

/// Severity level for diagnostics
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Severity {
    Information,
    #[default]
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Information => write!(f, "Information"),
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// Replacement text a host could apply to resolve a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedCorrection {
    pub description: String,
    pub text: String,
    pub extent: Extent,
}

/// A single rule violation.
///
/// Rules only ever construct one of these on failure; an empty result
/// is the pass signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub message: String,
    pub extent: Extent,
    pub rule_id: String,
    pub severity: Severity,
    pub path: Option<PathBuf>,
    pub fix: Option<SuggestedCorrection>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(rule_id: &str, severity: Severity, message: &str, extent: Extent) -> Self {
        Self {
            message: message.to_string(),
            extent,
            rule_id: rule_id.to_string(),
            severity,
            path: None,
            fix: None,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: Option<&Path>) -> Self {
        self.path = path.map(Path::to_path_buf);
        self
    }

    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}
