use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    process::Command,
    sync::mpsc::Sender,
    thread,
};

use crate::{error::MaintenanceError, util::human_bytes};

/// one of the "speed boost" actions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    ClearTemp,
    FlushDns,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::ClearTemp => f.write_str("clear temp files"),
            Action::FlushDns => f.write_str("flush dns"),
        }
    }
}

/// what a temp cleanup managed to do.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CleanupReport {
    pub dir: PathBuf,
    pub removed: u64,
    pub removed_bytes: u64,
    pub errors: u64,
}

impl fmt::Display for CleanupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cleared {} files ({}) from {}. Errors: {}",
            self.removed,
            human_bytes(self.removed_bytes),
            self.dir.display(),
            self.errors
        )
    }
}

/// the platform's temp directory: `%TEMP%`/`%TMP%` on windows, `/tmp` elsewhere.
pub fn default_temp_dir() -> PathBuf {
    if cfg!(windows) {
        std::env::var_os("TEMP")
            .or_else(|| std::env::var_os("TMP"))
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir)
    } else {
        PathBuf::from("/tmp")
    }
}

/// deletes every file below `dir`, leaving the directories in place.
///
/// files that cannot be removed (in use, permissions) are counted, not fatal.
pub fn clear_temp_files(dir: &Path) -> Result<CleanupReport, MaintenanceError> {
    if !dir.is_dir() {
        return Err(MaintenanceError::TempDirMissing(dir.to_path_buf()));
    }

    let mut report = CleanupReport {
        dir: dir.to_path_buf(),
        ..Default::default()
    };
    sweep(dir, &mut report);

    log::info!(
        "temp cleanup in {}: removed {} ({} bytes), {} errors",
        dir.display(),
        report.removed,
        report.removed_bytes,
        report.errors
    );
    Ok(report)
}

fn sweep(dir: &Path, report: &mut CleanupReport) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            log::debug!("cannot read {}: {err}", dir.display());
            report.errors += 1;
            return;
        }
    };

    for entry in entries {
        let Ok(entry) = entry else {
            report.errors += 1;
            continue;
        };
        let path = entry.path();
        match entry.file_type() {
            // symlinked directories are removed as links, never followed.
            Ok(kind) if kind.is_dir() => sweep(&path, report),
            Ok(_) => match remove_file(&path) {
                Ok(size) => {
                    report.removed += 1;
                    report.removed_bytes += size;
                }
                Err(err) => {
                    log::debug!("cannot remove {}: {err}", path.display());
                    report.errors += 1;
                }
            },
            Err(_) => report.errors += 1,
        }
    }
}

fn remove_file(path: &Path) -> io::Result<u64> {
    let size = fs::symlink_metadata(path)?.len();
    fs::remove_file(path)?;
    Ok(size)
}

/// flushes the resolver cache and returns the tool's output.
pub fn flush_dns() -> Result<String, MaintenanceError> {
    if !cfg!(windows) {
        return Err(MaintenanceError::Unsupported);
    }

    let output = Command::new("ipconfig").arg("/flushdns").output()?;
    let mut text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(stderr.trim());
    }
    if !output.status.success() {
        log::warn!("ipconfig /flushdns exited with {}", output.status);
    }
    Ok(text)
}

/// runs an action to completion and renders the outcome for the console.
pub fn run(action: Action, temp_dir: &Path) -> String {
    let outcome = match action {
        Action::ClearTemp => clear_temp_files(temp_dir).map(|report| report.to_string()),
        Action::FlushDns => flush_dns(),
    };
    outcome.unwrap_or_else(|err| {
        log::warn!("{action} failed: {err}");
        err.to_string()
    })
}

/// runs an action on a worker thread; the summary arrives on `done`.
pub fn spawn(action: Action, temp_dir: PathBuf, done: Sender<String>) -> io::Result<()> {
    thread::Builder::new()
        .name(format!("maintenance-{action}"))
        .spawn(move || {
            let summary = run(action, &temp_dir);
            // the ui may already be gone.
            let _ = done.send(summary);
        })
        .map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn sweeps_nested_files_and_keeps_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.tmp"), [0u8; 100]).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("b.tmp"), [0u8; 24]).unwrap();

        let report = clear_temp_files(dir.path()).unwrap();
        assert_eq!(report.removed, 2);
        assert_eq!(report.removed_bytes, 124);
        assert_eq!(report.errors, 0);
        assert!(dir.path().join("nested").is_dir());
        assert!(!dir.path().join("a.tmp").exists());
    }

    #[test]
    fn summary_reads_like_the_console_line() {
        let report = CleanupReport {
            dir: PathBuf::from("/tmp"),
            removed: 3,
            removed_bytes: 1536,
            errors: 1,
        };
        assert_eq!(
            report.to_string(),
            "Cleared 3 files (1.50 KB) from /tmp. Errors: 1"
        );
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("nope");
        let summary = run(Action::ClearTemp, &gone);
        assert!(summary.starts_with("Temp directory not found: "));
        assert!(summary.ends_with("nope"));
    }

    #[test]
    fn empty_directory_clears_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let report = clear_temp_files(dir.path()).unwrap();
        assert_eq!(report.removed, 0);
        assert_eq!(report.removed_bytes, 0);
    }

    #[cfg(not(windows))]
    #[test]
    fn dns_flush_is_windows_only() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(run(Action::FlushDns, dir.path()), "DNS flush not supported on this OS.");
    }

    #[test]
    fn worker_reports_back() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x"), b"abc").unwrap();

        let (tx, rx) = mpsc::channel();
        spawn(Action::ClearTemp, dir.path().to_path_buf(), tx).unwrap();
        let summary = rx.recv().unwrap();
        assert!(summary.starts_with("Cleared 1 files (3.00 B)"));
    }
}
