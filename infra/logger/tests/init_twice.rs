use verneg_logger::{LevelFilter, LogSettings, Logger, LoggerError};

#[test]
fn second_install_is_rejected() {
    let _logger = Logger::builder()
        .name("integration-init-twice")
        .level(LevelFilter::INFO)
        .init()
        .expect("first init should succeed");

    let err = Logger::from_settings("integration-init-twice-second", &LogSettings::default())
        .expect_err("second init should fail");

    assert!(
        matches!(err, LoggerError::Subscriber { .. }),
        "expected subscriber error for second init, got {err}"
    );
}
