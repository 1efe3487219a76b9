//! Audio transcoding through the `ffmpeg` executable.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{ErrorCode, Result, TraknabError};
use crate::signal::CancelToken;

use super::{interrupted_exit, Transcoder};

/// `Transcoder` backed by ffmpeg. The output codec follows the output
/// file's extension.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    program: PathBuf,
    cancel: CancelToken,
}

impl Ffmpeg {
    pub fn new(program: impl Into<PathBuf>, cancel: CancelToken) -> Self {
        Self {
            program: program.into(),
            cancel,
        }
    }
}

impl Transcoder for Ffmpeg {
    fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        debug!(input = %input.display(), output = %output.display(), "running ffmpeg");

        let result = Command::new(&self.program)
            .args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
            .arg(input)
            .arg("-vn")
            .arg(output)
            .output()
            .map_err(|e| {
                TraknabError::with_source(
                    ErrorCode::TranscodeFailed,
                    format!("Failed to run {}", self.program.display()),
                    e,
                )
            })?;

        if !result.status.success() {
            // A half-written output would pass the already-acquired check next run
            let _ = std::fs::remove_file(output);
            self.cancel.check()?;
            if interrupted_exit(&result.status) {
                return Err(TraknabError::cancelled());
            }
            return Err(TraknabError::transcode_failed(format!(
                "ffmpeg {} on {}: {}",
                result.status,
                input.display(),
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }

        if !output.is_file() {
            return Err(TraknabError::transcode_failed(format!(
                "ffmpeg reported success but {} is missing",
                output.display()
            )));
        }

        Ok(())
    }
}
