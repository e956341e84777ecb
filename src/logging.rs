//! Log output for the command line tools

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or empty
pub const DEFAULT_DIRECTIVES: &str = "info";

/// Build the log filter from `RUST_LOG` style directives, falling back to [`DEFAULT_DIRECTIVES`]
pub fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the fmt subscriber, filtered by `RUST_LOG`
pub fn init() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(filter_from(directives.as_deref()))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn shows_info_without_rust_log() {
        assert_eq!(filter_from(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            filter_from(Some("  ")).max_level_hint(),
            Some(LevelFilter::INFO)
        );
    }

    #[test]
    fn rust_log_overrides_the_default() {
        assert_eq!(
            filter_from(Some("debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(
            filter_from(Some("warn")).max_level_hint(),
            Some(LevelFilter::WARN)
        );
    }
}
