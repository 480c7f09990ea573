use std::{
    fs,
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::error;
use trapstore::LogConfig;

#[test]
fn log_file_is_appended_without_ansi() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("trapstore-log-{}-{}.log", std::process::id(), nanos));
    fs::write(&path, "earlier line\n").expect("failed to seed log file");

    let cfg = LogConfig {
        loglevel: "debug".to_string(),
        log_file: Some(path.clone()),
    };
    let subscriber = trapstore::logging::subscriber(&cfg).expect("failed to build subscriber");
    tracing::subscriber::with_default(subscriber, || {
        error!(uid = "u1", "Database error occurred");
    });

    let contents = fs::read_to_string(&path).expect("failed to read log file");
    assert!(contents.starts_with("earlier line\n"));
    assert!(contents.contains("ERROR"));
    assert!(contents.contains("Database error occurred"));
    assert!(contents.contains("uid=\"u1\""));
    assert!(!contents.contains('\u{1b}'));

    let _ = fs::remove_file(&path);
}

#[test]
fn unwritable_log_file_is_a_config_error() {
    let mut path = std::env::temp_dir();
    path.push("trapstore-missing-dir");
    path.push("nested");
    path.push("app.log");

    let cfg = LogConfig {
        loglevel: "info".to_string(),
        log_file: Some(path),
    };
    let err = trapstore::logging::subscriber(&cfg).err().expect("open should fail");
    assert!(matches!(err, trapstore::StoreError::Config(_)));
}
