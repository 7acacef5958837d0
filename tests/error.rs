use segframe_core::error::{Error, Result};
use std::error::Error as _;
use std::io;

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "missing response");
    let converted: Error = io_err.into();
    assert!(matches!(converted, Error::Io(_)));
    assert!(converted.source().is_some());

    let config_err = config::ConfigError::NotFound("query.metric".to_string());
    let converted: Error = config_err.into();
    assert!(matches!(converted, Error::Config(_)));

    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let converted: Error = json_err.into();
    assert!(matches!(converted, Error::Serialization(_)));

    let arrow_err = arrow::error::ArrowError::SchemaError("bad schema".to_string());
    let converted: Error = arrow_err.into();
    assert!(matches!(converted, Error::Arrow(_)));
}

#[test]
fn test_error_messages() {
    let err = Error::Decode("malformed object".to_string());
    assert_eq!(err.to_string(), "Decode error: malformed object");

    let err = Error::Transform("expected dimension region not found in segment".to_string());
    assert_eq!(
        err.to_string(),
        "Transform error: expected dimension region not found in segment"
    );
    assert!(err.source().is_none());
}

#[test]
fn test_result_type() {
    fn returns_err() -> Result<()> {
        Err(Error::Transform("test error".to_string()))
    }

    assert!(returns_err().is_err());
}
