//! Fake Ninite executable for end-to-end tests
//!
//! Writes a `/bin/sh` script named `NinitePro.exe` that records its argv
//! and replays scripted stdout, stderr and exit code.

#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::sync::{Mutex, MutexGuard};

// Writing an executable while another test forks can fail exec with ETXTBSY,
// so scripted runs are serialized.
static EXEC_LOCK: Mutex<()> = Mutex::const_new(());

pub async fn exec_lock() -> MutexGuard<'static, ()> {
    EXEC_LOCK.lock().await
}

pub struct FakeNinite {
    dir: TempDir,
}

impl FakeNinite {
    pub fn new(stdout: &str, stderr: &str, exit_code: i32) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let args_file = dir.path().join("args.txt");

        let mut script = String::from("#!/bin/sh\n");
        script.push_str(&format!("printf '%s\\n' \"$@\" > '{}'\n", args_file.display()));
        if !stdout.is_empty() {
            script.push_str(&format!("cat <<'NINITE_STDOUT'\n{}\nNINITE_STDOUT\n", stdout));
        }
        if !stderr.is_empty() {
            script.push_str(&format!("cat >&2 <<'NINITE_STDERR'\n{}\nNINITE_STDERR\n", stderr));
        }
        script.push_str(&format!("exit {}\n", exit_code));

        let exe = dir.path().join("NinitePro.exe");
        std::fs::write(&exe, script).expect("write fake executable");
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755))
            .expect("make fake executable runnable");

        Self { dir }
    }

    /// Directory holding `NinitePro.exe`
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn executable(&self) -> PathBuf {
        self.dir.path().join("NinitePro.exe")
    }

    /// Arguments of the last run, one per element
    pub fn recorded_args(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join("args.txt"))
            .expect("fake executable did not run")
            .lines()
            .map(str::to_string)
            .collect()
    }
}
