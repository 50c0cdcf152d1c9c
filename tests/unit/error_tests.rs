//! Unit tests for `AppError` display format and conversions.

use score_queue::AppError;

#[test]
fn display_prefixes_each_kind() {
    let cases = [
        (AppError::Config("bad".into()), "config: bad"),
        (AppError::Storage("bad".into()), "storage: bad"),
        (AppError::Delivery("bad".into()), "delivery: bad"),
        (AppError::Validation("bad".into()), "validation: bad"),
        (AppError::Io("bad".into()), "io: bad"),
    ];
    for (err, expected) in cases {
        assert_eq!(err.to_string(), expected);
    }
}

#[test]
fn toml_errors_become_config_errors() {
    let parse_err = toml::from_str::<toml::Value>("endpoint = ").expect_err("invalid toml");
    let err = AppError::from(parse_err);
    assert!(matches!(err, AppError::Config(_)));
    assert!(err.to_string().starts_with("config: invalid config"));
}

#[test]
fn json_errors_become_storage_errors() {
    let parse_err = serde_json::from_str::<Vec<u32>>("[1,").expect_err("invalid json");
    let err = AppError::from(parse_err);
    assert!(matches!(err, AppError::Storage(_)));
}

#[test]
fn io_errors_become_io_errors() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err = AppError::from(io);
    assert_eq!(err.to_string(), "io: denied");
}

#[test]
fn implements_std_error() {
    fn assert_error<E: std::error::Error + Send + Sync + 'static>(_: &E) {}
    let err = AppError::Delivery("scoring endpoint returned 500".into());
    assert_error(&err);
    let boxed: Box<dyn std::error::Error> = Box::new(err);
    assert_eq!(
        boxed.to_string(),
        "delivery: scoring endpoint returned 500"
    );
}
