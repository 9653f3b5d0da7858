// common/src/utils.rs
use chrono::Utc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Setup tracing for consistent logging across the uploader
pub fn setup_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Current time in whole seconds since the Unix epoch
pub fn now_epoch_secs() -> i64 {
    Utc::now().timestamp()
}

/// Current time in milliseconds since the Unix epoch
pub fn now_epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Trim whitespace and strip every trailing slash from a base URL
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Return the value if it has visible content, otherwise `None`
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
