//! Default values for serde `#[serde(default = "...")]` attributes.

pub(super) fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

pub(super) fn default_download_dir() -> String {
    "downloads".to_string()
}

pub(super) fn default_log_level() -> String {
    "info".to_string()
}

pub(super) fn default_limit() -> u32 {
    100
}

pub(super) fn default_timeout() -> u64 {
    30
}

pub(super) fn default_retry_timeout() -> u64 {
    10
}

pub(super) fn default_shutdown_grace() -> u64 {
    5
}
