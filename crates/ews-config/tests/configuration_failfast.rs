//! Loading fails loudly on unreadable configuration files.

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use ews_config::Config;
use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;

fn reported_paths(error: &OrthoError) -> Vec<PathBuf> {
    match error {
        OrthoError::File { path, .. } => vec![path.clone()],
        OrthoError::Aggregate(aggregate) => aggregate.iter().flat_map(reported_paths).collect(),
        _ => Vec::new(),
    }
}

#[test]
fn malformed_config_file_names_its_path() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("ews.toml");
    fs::write(&path, r#"server_version = "Exchange2013" log_filter = "debug""#)
        .expect("write malformed config");

    let args = vec![
        OsString::from("ews-client"),
        OsString::from("--config-path"),
        path.clone().into_os_string(),
    ];
    let error = Config::load_from_iter(args).expect_err("loading must fail");

    assert!(
        reported_paths(error.as_ref()).contains(&path),
        "expected the malformed file to be named, got {error:?}"
    );
}

#[test]
fn mistyped_value_is_rejected() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("ews.toml");
    fs::write(&path, "request_timeout_secs = \"soon\"\n").expect("write config");

    let args = vec![
        OsString::from("ews-client"),
        OsString::from("--config-path"),
        path.into_os_string(),
    ];
    assert!(Config::load_from_iter(args).is_err());
}
