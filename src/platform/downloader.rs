//! HTTP stream downloader.
//!
//! Streams the selected media URL to disk in chunks so cancellation can be
//! observed mid-transfer.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{is_connection_reset, ErrorCode, Result, TraknabError};
use crate::signal::CancelToken;
use crate::types::AudioStream;

use super::StreamDownloader;

const CHUNK_SIZE: usize = 64 * 1024;

/// `StreamDownloader` backed by a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    cancel: CancelToken,
}

impl HttpDownloader {
    pub fn new(cancel: CancelToken) -> Self {
        Self { cancel }
    }
}

impl StreamDownloader for HttpDownloader {
    fn download(&self, stream: &AudioStream, dest: &Path, timeout: Duration) -> Result<u64> {
        download_file_streaming(&stream.url, dest, timeout, &self.cancel)
    }
}

/// Maps a transport error to INTERRUPTED for resets, DOWNLOAD_FAILED otherwise.
fn classify<E>(context: String, err: E) -> TraknabError
where
    E: std::error::Error + Send + Sync + 'static,
{
    if is_connection_reset(&err) {
        TraknabError::connection_reset(err)
    } else {
        TraknabError::with_source(ErrorCode::DownloadFailed, context, err)
    }
}

/// Downloads `url` into `dest`.
///
/// `timeout` bounds connecting and each read, not the whole transfer.
fn download_file_streaming(
    url: &str,
    dest: &Path,
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<u64> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .map_err(|e| {
            TraknabError::download_failed(format!("Failed to create HTTP client: {}", e))
        })?;

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| classify(format!("Request to {} failed", redact(url)), e))?;

    if !response.status().is_success() {
        return Err(TraknabError::download_failed(format!(
            "HTTP {} for {}",
            response.status(),
            redact(url)
        )));
    }

    let total_size = response.content_length().unwrap_or(0);
    debug!(dest = %dest.display(), total_size, "streaming download");

    let mut file = fs::File::create(dest).map_err(|e| {
        TraknabError::io(format!("Failed to create file {}", dest.display()), e)
    })?;

    let mut downloaded: u64 = 0;
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        cancel.check()?;

        let bytes_read = response
            .read(&mut buffer)
            .map_err(|e| classify("Failed to read response".to_string(), e))?;

        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read]).map_err(|e| {
            TraknabError::io(format!("Failed to write {}", dest.display()), e)
        })?;

        downloaded += bytes_read as u64;
    }

    file.flush()
        .map_err(|e| TraknabError::io(format!("Failed to flush {}", dest.display()), e))?;

    info!(
        dest = %dest.display(),
        size_mb = %format!("{:.1}", downloaded as f64 / (1024.0 * 1024.0)),
        "download finished"
    );

    Ok(downloaded)
}

/// Strips the query string, which carries signed tokens for media URLs.
fn redact(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(url: &str) -> AudioStream {
        AudioStream {
            format_id: "251".to_string(),
            container: "webm".to_string(),
            codec: Some("opus".to_string()),
            abr_kbps: Some(160.0),
            filesize_bytes: Some(3_000_000),
            url: url.to_string(),
            audio_only: true,
        }
    }

    #[test]
    fn redact_drops_query() {
        assert_eq!(
            redact("https://media.example/videoplayback?sig=secret&expire=1"),
            "https://media.example/videoplayback"
        );
        assert_eq!(redact("https://media.example/a"), "https://media.example/a");
    }

    /// Serves one canned HTTP response on a loopback port.
    fn serve_once(body: &'static [u8]) -> String {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).unwrap_or(0);
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let header = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            // The client may hang up early when it was cancelled
            let _ = socket.write_all(header.as_bytes());
            let _ = socket.write_all(body);
        });
        format!("http://{}/videoplayback?sig=abc", addr)
    }

    #[test]
    fn downloads_body_to_dest() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("track.webm");
        let url = serve_once(b"opus-bytes");

        let written = HttpDownloader::new(CancelToken::new())
            .download(&stream(&url), &dest, Duration::from_secs(5))
            .unwrap();
        assert_eq!(written, 10);
        assert_eq!(std::fs::read(&dest).unwrap(), b"opus-bytes");
    }

    #[test]
    fn cancelled_token_interrupts_transfer() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("track.webm");
        let url = serve_once(b"opus-bytes");
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = HttpDownloader::new(cancel)
            .download(&stream(&url), &dest, Duration::from_secs(5))
            .unwrap_err();
        assert!(err.is_interruption());
    }

    #[test]
    fn unreachable_host_is_download_failure() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("x.webm");
        let err = HttpDownloader::new(CancelToken::new())
            .download(
                &stream("http://127.0.0.1:9/never"),
                &dest,
                Duration::from_secs(1),
            )
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DownloadFailed);
        assert!(!dest.exists());
    }

    #[test]
    fn reset_maps_to_interrupted() {
        let reset = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(classify("read".to_string(), reset).is_interruption());

        let timeout = std::io::Error::new(std::io::ErrorKind::TimedOut, "timeout");
        let err = classify("read".to_string(), timeout);
        assert_eq!(err.code, ErrorCode::DownloadFailed);
    }
}
