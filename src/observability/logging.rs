use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `json` switches to one JSON object per
/// event; anything else logs in the compact format.
pub fn init(log_level: &str, log_format: &str) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_target(false);

    if log_format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}
