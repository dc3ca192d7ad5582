//! HTTP(S) transfer over libcurl, one blocking GET per request.
//!
//! The body is streamed into `<name>.part` in the download directory and
//! renamed to `<name>` only after a 2xx response finished cleanly.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use super::classify::{classify_curl_error, classify_http_status};
use super::storage::{discard, temp_path};
use super::{Transfer, TransferError, TransferRequest};
use crate::config::TransferConfig;

/// Curl-backed [`Transfer`] that writes into a fixed download directory.
#[derive(Debug, Clone)]
pub struct CurlTransfer {
    download_dir: PathBuf,
    options: TransferConfig,
}

impl CurlTransfer {
    pub fn new(download_dir: impl Into<PathBuf>, options: TransferConfig) -> Self {
        Self {
            download_dir: download_dir.into(),
            options,
        }
    }

    fn destination(&self, name: &str) -> Result<PathBuf, TransferError> {
        let file_name = Path::new(name)
            .file_name()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| TransferError::Other(format!("invalid destination name: {:?}", name)))?;
        Ok(self.download_dir.join(file_name))
    }
}

#[async_trait]
impl Transfer for CurlTransfer {
    async fn fetch(&self, request: &TransferRequest) -> Result<(), TransferError> {
        let dest = self.destination(&request.destination_name)?;
        let source = request.source.clone();
        let options = self.options.clone();
        tokio::task::spawn_blocking(move || fetch_blocking(&source, &dest, &options))
            .await
            .map_err(|e| TransferError::Other(format!("transfer task failed: {}", e)))?
    }
}

/// Blocking GET of `url` into `dest`, via a `.part` temp file.
pub(crate) fn fetch_blocking(
    url: &str,
    dest: &Path,
    options: &TransferConfig,
) -> Result<(), TransferError> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let temp = temp_path(dest);
    let mut file = File::create(&temp)?;

    match perform(url, &mut file, options) {
        Ok(()) => {}
        Err(e) => {
            drop(file);
            discard(&temp);
            return Err(e);
        }
    }

    if let Err(e) = file.flush().and_then(|_| file.sync_all()) {
        drop(file);
        discard(&temp);
        return Err(e.into());
    }
    drop(file);
    fs::rename(&temp, dest)?;
    tracing::debug!(url = %url, path = %dest.display(), "transfer complete");
    Ok(())
}

fn perform(url: &str, file: &mut File, options: &TransferConfig) -> Result<(), TransferError> {
    let curl_err = |e: curl::Error| classify_curl_error(&e);

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(curl_err)?;
    easy.follow_location(true).map_err(curl_err)?;
    easy.max_redirections(10).map_err(curl_err)?;
    easy.connect_timeout(Duration::from_secs(options.connect_timeout_secs))
        .map_err(curl_err)?;
    easy.low_speed_limit(options.low_speed_limit).map_err(curl_err)?;
    easy.low_speed_time(Duration::from_secs(options.low_speed_time_secs))
        .map_err(curl_err)?;
    easy.timeout(Duration::from_secs(options.timeout_secs))
        .map_err(curl_err)?;
    if let Some(ua) = &options.user_agent {
        easy.useragent(ua).map_err(curl_err)?;
    }

    let mut write_err: Option<io::Error> = None;
    let performed = {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| match file.write_all(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    tracing::warn!("transfer write failed: {}", e);
                    write_err = Some(e);
                    Ok(0) // abort transfer
                }
            })
            .map_err(curl_err)?;
        transfer.perform()
    };

    if let Err(e) = performed {
        if let Some(io_err) = write_err {
            return Err(TransferError::Storage(io_err));
        }
        return Err(classify_curl_error(&e));
    }

    let code = easy.response_code().map_err(curl_err)?;
    match classify_http_status(code) {
        None => Ok(()),
        Some(err) => Err(err),
    }
}
