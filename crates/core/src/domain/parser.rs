// Report line classifiers
//
// The tool prints one `<app> : <detail>` line per managed app. Anything else
// (banners, progress, blank lines) does not match and is skipped by callers.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::records::{AppAudit, AppVersion, Status};

static STATUS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<app>[^:\r\n]+)\s+:\s+(?P<status>[^\r\n\(\)]+)(?:\s+\((?P<reason>.+)\))?$")
        .expect("status pattern is valid")
});

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<app>[^:\r\n]+)\s+:\s+(?P<kind>[\*\(])?(?P<version>[^\r\n\(\)]+)\)?$")
        .expect("version pattern is valid")
});

static AUDIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<app>[^:\r\n]+)\s+:\s+(?P<status>[^\r\n\(\)\-]+)(?:\s+-\s+(?P<version>.+))?$")
        .expect("audit pattern is valid")
});

/// Turns one line of tool output into a record, or `None` when the line is noise.
pub trait LineParser: Send + Sync {
    type Record: Send + 'static;

    fn parse(&self, line: &str) -> Option<Self::Record>;
}

/// `<app> : <status> [(<reason>)]`, used by update-only and uninstall.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusParser;

/// Freeze reuses the status line shape, but the second field is the bundled version.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreezeParser;

/// `<app> : [*|(]<version>[)]`, used by list.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionParser;

/// `<app> : <status> [- <version>]`, used by audit.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditParser;

fn strip_terminator(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

fn group<'h>(caps: &Captures<'h>, name: &str) -> &'h str {
    caps.name(name).map_or("", |m| m.as_str())
}

impl LineParser for StatusParser {
    type Record = Status;

    fn parse(&self, line: &str) -> Option<Status> {
        let caps = STATUS_PATTERN.captures(strip_terminator(line))?;
        Some(Status {
            app: group(&caps, "app").to_string(),
            status: group(&caps, "status").to_string(),
            reason: group(&caps, "reason").to_string(),
            version: String::new(),
        })
    }
}

impl LineParser for FreezeParser {
    type Record = Status;

    fn parse(&self, line: &str) -> Option<Status> {
        let caps = STATUS_PATTERN.captures(strip_terminator(line))?;
        Some(Status {
            app: group(&caps, "app").to_string(),
            version: group(&caps, "status").to_string(),
            ..Status::default()
        })
    }
}

impl LineParser for VersionParser {
    type Record = AppVersion;

    fn parse(&self, line: &str) -> Option<AppVersion> {
        let caps = VERSION_PATTERN.captures(strip_terminator(line))?;
        let kind = group(&caps, "kind");
        Some(AppVersion {
            app: group(&caps, "app").to_string(),
            version: group(&caps, "version").to_string(),
            current_version: kind == "*",
            alternate_version: kind == "(",
        })
    }
}

impl LineParser for AuditParser {
    type Record = AppAudit;

    fn parse(&self, line: &str) -> Option<AppAudit> {
        let caps = AUDIT_PATTERN.captures(strip_terminator(line))?;
        Some(AppAudit::new(
            group(&caps, "app"),
            group(&caps, "status"),
            group(&caps, "version"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_without_reason() {
        let status = StatusParser.parse("App Name : Installed").unwrap();
        assert_eq!(status.app, "App Name");
        assert_eq!(status.status, "Installed");
        assert_eq!(status.reason, "");
        assert_eq!(status.version, "");
    }

    #[test]
    fn test_status_with_reason() {
        let status = StatusParser.parse("App Name : Installed (forced)").unwrap();
        assert_eq!(status.status, "Installed");
        assert_eq!(status.reason, "forced");
    }

    #[test]
    fn test_status_strips_line_terminators() {
        let status = StatusParser.parse("  Firefox : Skipped (up to date)\r\n").unwrap();
        assert_eq!(status.app, "Firefox");
        assert_eq!(status.status, "Skipped");
        assert_eq!(status.reason, "up to date");
    }

    #[test]
    fn test_status_rejects_noise() {
        assert!(StatusParser.parse("").is_none());
        assert!(StatusParser.parse("Ninite Pro Classic").is_none());
        assert!(StatusParser.parse("Firefox :").is_none());
    }

    #[test]
    fn test_freeze_captures_version() {
        let status = FreezeParser.parse("VLC : 3.0.20\n").unwrap();
        assert_eq!(status.app, "VLC");
        assert_eq!(status.version, "3.0.20");
        assert_eq!(status.status, "");
        assert_eq!(status.reason, "");
    }

    #[test]
    fn test_version_current_marker() {
        let version = VersionParser.parse("App Name : *1.2.3").unwrap();
        assert_eq!(version.version, "1.2.3");
        assert!(version.current_version);
        assert!(!version.alternate_version);
    }

    #[test]
    fn test_version_alternate_marker_consumes_closing_paren() {
        let version = VersionParser.parse("App Name : (2.0.0)").unwrap();
        assert_eq!(version.version, "2.0.0");
        assert!(!version.current_version);
        assert!(version.alternate_version);
    }

    #[test]
    fn test_version_without_marker() {
        let version = VersionParser.parse("Java : 8u391").unwrap();
        assert_eq!(version.app, "Java");
        assert_eq!(version.version, "8u391");
        assert!(!version.current_version);
        assert!(!version.alternate_version);
    }

    #[test]
    fn test_audit_installed() {
        let audit = AuditParser.parse("App Name : Installed - 1.2.3").unwrap();
        assert_eq!(audit.status, "Installed");
        assert_eq!(audit.version, "1.2.3");
        assert!(audit.installed);
    }

    #[test]
    fn test_audit_not_installed() {
        let audit = AuditParser.parse("App Name : Not Installed").unwrap();
        assert_eq!(audit.status, "Not Installed");
        assert_eq!(audit.version, "");
        assert!(!audit.installed);
    }

    #[test]
    fn test_audit_keeps_hyphenated_app_and_version() {
        let audit = AuditParser.parse("7-Zip : Update Available - 23.01-beta").unwrap();
        assert_eq!(audit.app, "7-Zip");
        assert_eq!(audit.status, "Update Available");
        assert_eq!(audit.version, "23.01-beta");
    }
}
