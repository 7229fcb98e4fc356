use keel_core::config::Configuration;
use keel_core::kernel::Kernel;
use keel_core::kernel::error::Error;
use keel_core::plugin_system::Plugin;

use crate::{LogFormat, LoggingPlugin};

#[test]
fn test_log_format_parsing() {
    assert_eq!("".parse::<LogFormat>().unwrap(), LogFormat::Text);
    assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
    let err = "xml".parse::<LogFormat>().unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
    assert!(err.to_string().contains("json"));
}

#[test]
fn test_invalid_fallback_filter_is_rejected() {
    if std::env::var_os("RUST_LOG").is_none() {
        assert!(LoggingPlugin::filter("keel=loudest").is_err());
    }
    assert!(LoggingPlugin::filter("debug,hyper=warn").is_ok());
}

#[test]
fn test_init_tolerates_repeated_installs() {
    let plugin = LoggingPlugin;
    assert_eq!(plugin.name(), "core-logging");

    let mut first = Kernel::with_configuration(Configuration::new());
    plugin.init(&mut first).unwrap();
    let mut second = Kernel::with_configuration(Configuration::new().with("LOG_FORMAT", "json"));
    plugin.init(&mut second).unwrap();
}

#[test]
fn test_unknown_format_fails_init() {
    let mut kernel = Kernel::with_configuration(Configuration::new().with("LOG_FORMAT", "xml"));
    assert!(LoggingPlugin.init(&mut kernel).is_err());
}
