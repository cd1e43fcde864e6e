//! Loading namespaces from files and the environment, and reading them back typed.

use hotswap_properties::prelude::*;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use tokio::runtime::Handle;

const APPLICATION_YAML: &str = r#"
server:
  port: 8080
  host: "localhost"
http:
  timeout: 30
  retries: notanumber
ratio: 0.75
features:
  caching: true
  metrics: "yes"
servers:
  - alpha
  - beta
  - gamma
csv: "a,b,,c"
"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

async fn load(path: &std::path::Path) -> NamespaceConfig {
    NamespaceConfig::builder("application")
        .with_file(path)
        .with_runtime_handle(Handle::current())
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_yaml_file_is_flattened() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "application.yaml", APPLICATION_YAML);
    let config = load(&path).await;

    let snapshot = config.snapshot();
    assert_eq!(snapshot.get("server.port"), Some("8080"));
    assert_eq!(snapshot.get("server.host"), Some("localhost"));
    assert_eq!(snapshot.get("servers"), Some("alpha,beta,gamma"));
    assert!(!snapshot.contains_key("server"));
}

#[tokio::test]
async fn test_typed_getters() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "application.yaml", APPLICATION_YAML);
    let config = load(&path).await;

    assert_eq!(config.get_int_property("server.port", 80).unwrap(), 8080);
    assert_eq!(config.get_long_property("http.timeout", 0).unwrap(), 30);
    assert_eq!(config.get_short_property("http.timeout", 0).unwrap(), 30);
    assert_eq!(config.get_byte_property("http.timeout", 0).unwrap(), 30);
    assert_eq!(config.get_double_property("ratio", 0.0).unwrap(), 0.75);
    assert_eq!(config.get_float_property("ratio", 0.0).unwrap(), 0.75);
    assert_eq!(config.get_property("server.host", "0.0.0.0"), "localhost");

    assert!(config.get_boolean_property("features.caching", false));
    assert!(!config.get_boolean_property("features.metrics", true));
    assert!(config.get_boolean_property("features.missing", true));

    // Absent keys return the caller's default.
    assert_eq!(config.get_int_property("missing", 42).unwrap(), 42);
    assert_eq!(config.get_property("missing", "fallback"), "fallback");
}

#[tokio::test]
async fn test_malformed_value_is_a_format_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "application.yaml", APPLICATION_YAML);
    let config = load(&path).await;

    let err = config.get_int_property("http.retries", 3).unwrap_err();
    assert_eq!(err.key, "http.retries");
    assert_eq!(err.value, "notanumber");

    // Too large for a signed byte.
    assert!(config.get_byte_property("server.port", 0).is_err());

    let as_config_error: ConfigError = err.into();
    assert!(matches!(as_config_error, ConfigError::Format(_)));
}

#[tokio::test]
async fn test_array_getter() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "application.yaml", APPLICATION_YAML);
    let config = load(&path).await;

    assert_eq!(
        config.get_array_property("servers", ",", Vec::new()),
        vec!["alpha", "beta", "gamma"]
    );
    assert_eq!(
        config.get_array_property("csv", ",", Vec::new()),
        vec!["a", "b", "", "c"]
    );
    assert_eq!(
        config.get_array_property("missing", ",", vec!["x".to_string()]),
        vec!["x"]
    );
}

#[tokio::test]
async fn test_later_sources_take_precedence() {
    let dir = TempDir::new().unwrap();
    let base = write(
        &dir,
        "base.yaml",
        "server:\n  port: 8080\n  host: base\nlog:\n  level: info\n",
    );
    let overlay = write(&dir, "overlay.toml", "[server]\nport = 9090\n");

    let config = NamespaceConfig::builder("application")
        .with_file(&base)
        .with_file(&overlay)
        .with_properties([("log.level", "debug")])
        .with_runtime_handle(Handle::current())
        .build()
        .await
        .unwrap();

    assert_eq!(config.get_property("server.port", ""), "9090");
    assert_eq!(config.get_property("server.host", ""), "base");
    assert_eq!(config.get_property("log.level", ""), "debug");
}

#[tokio::test]
#[allow(unsafe_code)]
async fn test_env_overrides_files() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "application.json", r#"{"http": {"timeout": 30}}"#);

    unsafe {
        std::env::set_var("HSPROPS_IT_HTTP__TIMEOUT", "45");
    }

    let config = NamespaceConfig::builder("application")
        .with_file(&path)
        .with_env_overrides("HSPROPS_IT", "__")
        .with_runtime_handle(Handle::current())
        .build()
        .await
        .unwrap();

    unsafe {
        std::env::remove_var("HSPROPS_IT_HTTP__TIMEOUT");
    }

    assert_eq!(config.get_int_property("http.timeout", 0).unwrap(), 45);
}

#[tokio::test]
async fn test_missing_file_fails_build() {
    let result = NamespaceConfig::builder("application")
        .with_file("/nonexistent/application.yaml")
        .with_runtime_handle(Handle::current())
        .build()
        .await;

    assert!(matches!(result, Err(ConfigError::LoadError(_))));
}

#[tokio::test]
async fn test_reload_delivers_file_changes() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "application.yaml", "http:\n  timeout: 30\nlegacy: x\n");
    let config = load(&path).await;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    config.add_change_listener(Arc::new(FnListener::new("recorder", move |event: &ChangeEvent| {
        tx.send(event.clone()).map_err(ListenerError::failed)
    })));

    write(&dir, "application.yaml", "http:\n  timeout: 60\npool: 4\n");
    let returned = config.reload().unwrap().unwrap();

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&event, returned.as_ref());
    assert_eq!(event.len(), 3);
    assert_eq!(
        event.change("http.timeout").unwrap().change_type(),
        PropertyChangeType::Modified
    );
    assert_eq!(event.change("pool").unwrap().change_type(), PropertyChangeType::Added);
    assert_eq!(event.change("legacy").unwrap().change_type(), PropertyChangeType::Deleted);

    // Nothing changed on disk since the last reload.
    assert!(config.reload().unwrap().is_none());
}

#[tokio::test]
async fn test_failed_reload_keeps_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "application.json", r#"{"timeout": 30}"#);
    let config = load(&path).await;

    write(&dir, "application.json", "{ not json");
    assert!(config.reload().is_err());
    assert_eq!(config.get_int_property("timeout", 0).unwrap(), 30);
}

#[cfg(feature = "file-watch")]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_file_watch_reloads_namespace() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "application.yaml", "http:\n  timeout: 30\n");

    let config = NamespaceConfig::builder("application")
        .with_file(&path)
        .with_file_watch(true)
        .with_debounce(Duration::from_millis(50))
        .with_runtime_handle(Handle::current())
        .build()
        .await
        .unwrap();
    assert!(config.is_watching());

    let notified = Arc::new(AtomicUsize::new(0));
    {
        let notified = Arc::clone(&notified);
        config.add_change_listener(Arc::new(FnListener::new(
            "watch-recorder",
            move |_event: &ChangeEvent| {
                notified.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        )));
    }

    // Give the platform watcher a moment to arm.
    tokio::time::sleep(Duration::from_millis(100)).await;
    fs::write(&path, "http:\n  timeout: 60\n").unwrap();

    for _ in 0..200 {
        if config.get_int_property("http.timeout", 0).unwrap() == 60 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    assert_eq!(config.get_int_property("http.timeout", 0).unwrap(), 60);

    for _ in 0..200 {
        if notified.load(Ordering::SeqCst) >= 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    assert!(notified.load(Ordering::SeqCst) >= 1);
}
