//! HTTP client module: single-shot JSON lookups and retried downloads.

mod client;
mod retry;

pub use client::HttpClient;
pub use retry::NonRetryableError;
