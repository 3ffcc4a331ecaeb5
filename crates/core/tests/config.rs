use serde::Deserialize;
use std::io::Write;
use verneg_core::config::{ConfigError, load_config};
use verneg_core::{MissingMapperPolicy, NegotiationOptions};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServiceConfig {
    name: String,
    negotiation: NegotiationOptions,
}

fn write_config(extension: &str, body: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(extension).tempfile().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file
}

#[test]
fn loads_negotiation_section_from_toml() {
    let file = write_config(
        ".toml",
        r#"
        name = "people"

        [negotiation]
        emit_vary_header = false
        missing_mapper = "passthrough"
        "#,
    );

    let config: ServiceConfig = load_config(Some(file.path())).unwrap();
    assert_eq!(config.name, "people");
    assert!(!config.negotiation.emit_vary_header);
    assert_eq!(config.negotiation.missing_mapper, MissingMapperPolicy::Passthrough);
    assert!(!config.negotiation.cache_registries);
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let file = write_config(".json", r#"{ "name": "people" }"#);

    let config: ServiceConfig = load_config(Some(file.path())).unwrap();
    assert_eq!(config.negotiation, NegotiationOptions::default());
}

#[test]
fn no_file_means_defaults() {
    let options: NegotiationOptions = load_config(None::<&str>).unwrap();
    assert!(options.emit_vary_header);
    assert_eq!(options.missing_mapper, MissingMapperPolicy::Fail);
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result: Result<ServiceConfig, _> = load_config(Some(dir.path().join("absent.toml")));
    assert!(matches!(result, Err(ConfigError::Config { .. })));
}

#[test]
fn unknown_policy_is_rejected() {
    let file = write_config(".toml", "[negotiation]\nmissing_mapper = \"ignore\"\n");

    let err = load_config::<ServiceConfig>(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("Failed to deserialize config"), "{err}");
}
