use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "fimg_engine::lock=debug,fimg_engine::queue=trace").
///
/// `write_style` controls ANSI coloring behavior.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Route output through the test harness capture instead of stderr.
    pub is_test: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            is_test: false,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Subsequent calls are ignored. An explicit filter wins over `RUST_LOG`;
/// with neither, the level is `info`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = configure(config, std::env::var("RUST_LOG").ok());

        // Another logger may already be installed by the host process.
        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized");
    });
}

fn configure(config: LoggingConfig, rust_log: Option<String>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();

    match config.env_filter.or(rust_log) {
        Some(filter) => builder.parse_filters(&filter),
        None => builder.filter_level(log::LevelFilter::Info),
    };

    builder.write_style(config.write_style);
    builder.is_test(config.is_test);
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialization_is_ignored() {
        let config = LoggingConfig {
            env_filter: Some("fimg_engine=trace".into()),
            is_test: true,
            ..LoggingConfig::default()
        };
        init_logging(config.clone());
        init_logging(config);
        assert!(INIT.is_completed());
    }

    fn level(env_filter: Option<&str>, rust_log: Option<&str>) -> log::LevelFilter {
        let config = LoggingConfig {
            env_filter: env_filter.map(Into::into),
            is_test: true,
            ..LoggingConfig::default()
        };
        configure(config, rust_log.map(Into::into)).build().filter()
    }

    #[test]
    fn explicit_filter_wins_over_rust_log() {
        assert_eq!(level(Some("warn"), Some("trace")), log::LevelFilter::Warn);
    }

    #[test]
    fn rust_log_applies_without_explicit_filter() {
        assert_eq!(level(None, Some("debug")), log::LevelFilter::Debug);
    }

    #[test]
    fn default_level_is_info() {
        assert_eq!(level(None, None), log::LevelFilter::Info);
    }
}
