//! Classify HTTP status and curl errors into transfer outcomes.

use super::TransferError;

/// Classify a completed response's HTTP status. `None` means success (2xx).
pub fn classify_http_status(code: u32) -> Option<TransferError> {
    match code {
        200..=299 => None,
        408 | 504 => Some(TransferError::Timeout(format!("HTTP {}", code))),
        _ => Some(TransferError::Http(code)),
    }
}

/// Classify a curl error: timeouts are reported separately from other failures.
pub fn classify_curl_error(e: &curl::Error) -> TransferError {
    if e.is_operation_timedout() {
        return TransferError::Timeout(e.to_string());
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return TransferError::Connection(e.to_string());
    }
    TransferError::Other(e.to_string())
}
