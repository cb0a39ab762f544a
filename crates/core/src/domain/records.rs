// Output records produced from the tool's report lines

use serde::{Deserialize, Serialize};

/// Per-app result of an update-only, uninstall or freeze run.
///
/// Freeze reports put the bundled version in `version` and leave
/// `status`/`reason` empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub app: String,
    pub status: String,
    pub reason: String,
    pub version: String,
}

/// An installable version of a managed app, as reported by `/list versions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppVersion {
    pub app: String,
    pub version: String,
    /// Marked with `*`: the version the tool recommends. Says nothing about
    /// what is installed locally.
    pub current_version: bool,
    /// Marked with `(`: has to be selected explicitly to be installed.
    pub alternate_version: bool,
}

/// Installed state of a managed app, read from the versions listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppAudit {
    pub app: String,
    pub status: String,
    pub version: String,
    pub installed: bool,
}

impl AppAudit {
    /// Build an audit record; an app counts as installed iff a version was reported.
    pub fn new(app: impl Into<String>, status: impl Into<String>, version: impl Into<String>) -> Self {
        let version = version.into();
        Self {
            app: app.into(),
            status: status.into(),
            installed: !version.is_empty(),
            version,
        }
    }
}
