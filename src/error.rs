use std::{io, path::PathBuf};

use thiserror::Error;

/// failures of the "speed boost" actions.
#[derive(Debug, Error)]
pub enum MaintenanceError {
    #[error("Temp directory not found: {}", .0.display())]
    TempDirMissing(PathBuf),

    #[error("Error: {0}")]
    Command(#[from] io::Error),

    #[error("DNS flush not supported on this OS.")]
    Unsupported,
}

/// failures of the pointer speed mutator.
#[derive(Debug, Error)]
pub enum PointerError {
    #[error("Not Windows")]
    Unsupported,

    #[error("SystemParametersInfoW failed: {0}")]
    #[allow(dead_code)]
    Os(String),
}
