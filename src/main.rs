//! traknab: batch-download the tracks of a TOML tracklist as audio files.
//!
//! Exit status is 0 when the tracklist is exhausted, 130 when the run was
//! interrupted (Ctrl+C or connection reset) and 1 on any other error.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use traknab::cli::Cli;
use traknab::config::AcquireConfig;
use traknab::error::{Result, TraknabError};
use traknab::pipeline::Acquirer;
use traknab::platform::{tool_available, Ffmpeg, HttpDownloader, YtDlp};
use traknab::signal::{install_interrupt_handler, CancelToken};
use traknab::types::Tracklist;

const EXIT_INTERRUPTED: i32 = 130;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse_args();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.apply(AcquireConfig::from_env());
    if let Some(reason) = config.validate() {
        return Err(TraknabError::invalid_config(reason));
    }
    config.validate_paths()?;

    let tracklist = Tracklist::load(&config.tracks_path)?;
    tracing::debug!(?config, tracks = tracklist.len(), "configuration loaded");

    if cli.check {
        return run_check(&config, &tracklist);
    }

    let cancel = CancelToken::new();
    install_interrupt_handler(cancel.clone())?;

    let acquirer = Acquirer::new(
        config.clone(),
        YtDlp::new(
            &config.yt_dlp_path,
            config.search_limit,
            config.timeout(),
            cancel.clone(),
        ),
        HttpDownloader::new(cancel.clone()),
        Ffmpeg::new(&config.ffmpeg_path, cancel.clone()),
        cancel,
    );

    let summary = acquirer.run_batch(&tracklist)?;
    println!(
        "{} acquired, {} already present, {} rejected.",
        summary.acquired.len(),
        summary.skipped,
        summary.rejected.len()
    );

    Ok(if summary.interrupted {
        EXIT_INTERRUPTED
    } else {
        0
    })
}

/// Reports whether the external tools can be run and the tracklist is valid.
fn run_check(config: &AcquireConfig, tracklist: &Tracklist) -> Result<i32> {
    let requests = tracklist.requests().collect::<Result<Vec<_>>>()?;
    println!("Tracklist: {} ({} tracks)", config.tracks_path.display(), requests.len());
    println!("Download root: {}", config.download_root.display());

    let mut ok = true;
    for (name, path, flag) in [
        ("yt-dlp", &config.yt_dlp_path, "--version"),
        ("ffmpeg", &config.ffmpeg_path, "-version"),
    ] {
        if tool_available(path, flag) {
            println!("{}: found ({})", name, path.display());
        } else {
            println!("{}: NOT FOUND ({})", name, path.display());
            ok = false;
        }
    }

    Ok(if ok { 0 } else { 1 })
}
