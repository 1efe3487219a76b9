//! Batch run over a whole tracklist.

use std::path::PathBuf;

use tracing::{error, info};

use crate::error::Result;
use crate::platform::{StreamDownloader, Transcoder, VideoSearch};
use crate::types::{TrackRequest, Tracklist};

use super::{Acquirer, Outcome, Rejection};

/// What a batch run did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    /// Outputs written by this run, in processing order.
    pub acquired: Vec<PathBuf>,
    /// Tracks whose output already existed.
    pub skipped: usize,
    /// Rejected tracks with their labels.
    pub rejected: Vec<(String, Rejection)>,
    /// True if the run stopped early on a cancellation or connection reset.
    pub interrupted: bool,
}

impl BatchSummary {
    /// Number of tracks that were looked at, including the interrupted one.
    pub fn processed(&self) -> usize {
        self.acquired.len() + self.skipped + self.rejected.len() + usize::from(self.interrupted)
    }
}

impl<S, D, T> Acquirer<S, D, T>
where
    S: VideoSearch,
    D: StreamDownloader,
    T: Transcoder,
{
    /// Processes every track in genre → artist → title order.
    ///
    /// All entries are validated before the first search so a bad tracklist
    /// fails without touching the network. Rejections are printed and
    /// skipped. An interruption deletes the current track's intermediate file
    /// and ends the run with `interrupted` set. Any other error is returned.
    pub fn run_batch(&self, tracklist: &Tracklist) -> Result<BatchSummary> {
        let requests: Vec<TrackRequest> = tracklist.requests().collect::<Result<_>>()?;

        println!("Download routine initialised.");
        info!(tracks = requests.len(), "starting batch");

        let mut summary = BatchSummary::default();

        for request in &requests {
            if self.cancel.is_cancelled() {
                println!("Breaking...");
                summary.interrupted = true;
                return Ok(summary);
            }

            match self.process(request) {
                Ok(Outcome::Acquired { output }) => {
                    info!(output = %output.display(), "track acquired");
                    summary.acquired.push(output);

                    if let Some(pause) = self.config.sleep() {
                        println!("Sleeping for {} seconds...", pause.as_secs());
                        std::thread::sleep(pause);
                    }
                }
                Ok(Outcome::AlreadyAcquired { .. }) => summary.skipped += 1,
                Ok(Outcome::Rejected(reason)) => {
                    println!("{}", reason);
                    summary.rejected.push((request.label(), reason));
                }
                Err(e) if e.is_interruption() => {
                    self.remove_intermediate(request);
                    println!("Exception raised: {}", e.message);
                    println!("Breaking...");
                    summary.interrupted = true;
                    return Ok(summary);
                }
                Err(e) => {
                    error!(track = %request.label(), error = %e, "stopping batch");
                    return Err(e);
                }
            }
        }

        println!("Download routine complete.");
        info!(
            acquired = summary.acquired.len(),
            skipped = summary.skipped,
            rejected = summary.rejected.len(),
            "batch finished"
        );
        Ok(summary)
    }
}
