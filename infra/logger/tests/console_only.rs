use verneg_logger::{LogSettings, Logger};

#[test]
fn default_settings_log_to_console_without_a_guard() {
    let settings = LogSettings { level: "debug".into(), ..LogSettings::default() };
    let logger = Logger::from_settings("integration-console-only", &settings)
        .expect("logger should initialize");

    assert!(logger.guard().is_none(), "console-only logger should not create a file guard");
    tracing::debug!("console logger installed");
}
