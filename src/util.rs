// Browser logging: tracing events go to the devtools console.

use std::sync::Once;
use tracing::Level;

static INIT: Once = Once::new();

/// Maps the `cm_log_level` setting onto a tracing level. Unknown or missing
/// values fall back to INFO.
pub fn log_level(raw: Option<&str>) -> Level {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("error") => Level::ERROR,
        Some("warn") | Some("warning") => Level::WARN,
        Some("debug") => Level::DEBUG,
        Some("trace") => Level::TRACE,
        _ => Level::INFO,
    }
}

/// Installs the tracing-wasm subscriber. Only the first call has any effect.
pub fn init_logging(level: Level) {
    INIT.call_once(|| {
        tracing_wasm::set_as_global_default_with_config(
            tracing_wasm::WASMLayerConfigBuilder::new().set_max_level(level).build(),
        );
        tracing::debug!("logging at {}", level);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_setting_parses() {
        assert_eq!(log_level(Some("debug")), Level::DEBUG);
        assert_eq!(log_level(Some(" WARN ")), Level::WARN);
        assert_eq!(log_level(Some("warning")), Level::WARN);
        assert_eq!(log_level(Some("error")), Level::ERROR);
        assert_eq!(log_level(Some("trace")), Level::TRACE);
        assert_eq!(log_level(Some("loud")), Level::INFO);
        assert_eq!(log_level(None), Level::INFO);
    }
}
