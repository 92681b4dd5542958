//! End-to-end tests of the control plane with the executable plugin manager

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::{tempdir, TempDir};

use pulse_control::control::config::ControlConfig;
use pulse_control::notifications::{ControlEvent, NotificationResult, Subscriber};
use pulse_control::plugin::{CatalogedPlugin, PluginError, PluginIdentity};
use pulse_control::{ControlError, PluginControl};

struct EventLog {
    events: Mutex<Vec<ControlEvent>>,
}

#[async_trait]
impl Subscriber<ControlEvent> for EventLog {
    async fn handle_event(&self, event: ControlEvent) -> NotificationResult<()> {
        self.events.lock().push(event);
        Ok(())
    }

    fn subscriber_id(&self) -> &str {
        "event-log"
    }
}

fn write_executable(dir: &Path, file_name: &str) -> PathBuf {
    let path = dir.join(file_name);
    fs::write(&path, b"#!/bin/sh\nexit 0\n").expect("Failed to write plugin file");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("Failed to chmod plugin file");
    }
    path
}

async fn started_control(dir: &TempDir) -> (PluginControl, Arc<EventLog>) {
    let config = ControlConfig::builder()
        .with_plugin_log_path(dir.path().join("plugins.log"))
        .build()
        .expect("Failed to build control config");

    let control = PluginControl::from_config(&config).expect("Failed to create plugin control");
    let log = Arc::new(EventLog { events: Mutex::new(Vec::new()) });
    control.events().subscribe(log.clone()).await.expect("Failed to subscribe event log");
    control.start();

    (control, log)
}

#[tokio::test]
async fn test_plugin_lifecycle_with_executables() {
    let dir = tempdir().expect("Failed to create temp directory");
    let (control, log) = started_control(&dir).await;

    let cpu_v1 = write_executable(dir.path(), "collector-cpu-v1");
    let cpu_v2 = write_executable(dir.path(), "collector-cpu-v2");
    let file_publisher = write_executable(dir.path(), "publisher-file");

    control.load(&cpu_v1).await.unwrap();
    control.load(&file_publisher).await.unwrap();

    let catalog = control.plugin_catalog().await;
    assert_eq!(catalog.names(), vec!["cpu", "file"]);
    assert_eq!(catalog[1].type_name(), "publisher");
    assert!(catalog[0].loaded_timestamp() > 0);

    let outgoing = catalog.find("cpu").cloned().unwrap();
    control.swap(&cpu_v2, outgoing.as_ref()).await.unwrap();

    let catalog = control.plugin_catalog().await;
    assert_eq!(catalog.find("cpu").unwrap().version(), 2);
    assert_eq!(catalog.len(), 2);

    let publisher = catalog.find("file").cloned().unwrap();
    control.unload(publisher.as_ref()).await.unwrap();
    assert_eq!(control.plugin_catalog().await.names(), vec!["cpu"]);

    assert_eq!(
        *log.events.lock(),
        vec![
            ControlEvent::LoadPlugin { plugin: PluginIdentity::new("collector", "cpu", 1) },
            ControlEvent::LoadPlugin { plugin: PluginIdentity::new("publisher", "file", 1) },
            ControlEvent::SwapPlugins {
                loaded: PluginIdentity::new("collector", "cpu", 2),
                unloaded: PluginIdentity::new("collector", "cpu", 1),
            },
            ControlEvent::UnloadPlugin { plugin: PluginIdentity::new("publisher", "file", 1) },
        ]
    );
}

#[tokio::test]
async fn test_invalid_plugin_paths_are_rejected() {
    let dir = tempdir().expect("Failed to create temp directory");
    let (control, log) = started_control(&dir).await;

    let missing = dir.path().join("collector-missing");
    let error = control.load(&missing).await.unwrap_err();
    assert!(matches!(error.plugin_error(), Some(PluginError::LoadingFailed { .. })));

    let error = control.load(dir.path()).await.unwrap_err();
    assert!(matches!(error.plugin_error(), Some(PluginError::InvalidExecutable { .. })));

    assert!(control.plugin_catalog().await.is_empty());
    assert!(log.events.lock().is_empty());
}

#[tokio::test]
async fn test_duplicate_load_is_rejected() {
    let dir = tempdir().expect("Failed to create temp directory");
    let (control, log) = started_control(&dir).await;
    let cpu = write_executable(dir.path(), "collector-cpu-v1");

    control.load(&cpu).await.unwrap();
    let error = control.load(&cpu).await.unwrap_err();

    assert!(matches!(error.plugin_error(), Some(PluginError::AlreadyLoaded { .. })));
    assert_eq!(control.plugin_catalog().await.len(), 1);
    assert_eq!(log.events.lock().len(), 1);
}

#[tokio::test]
async fn test_swap_into_missing_file_keeps_outgoing_plugin() {
    let dir = tempdir().expect("Failed to create temp directory");
    let (control, log) = started_control(&dir).await;
    let cpu = write_executable(dir.path(), "collector-cpu-v1");

    control.load(&cpu).await.unwrap();
    let outgoing = control.plugin_catalog().await[0].clone();

    let error = control
        .swap(&dir.path().join("collector-cpu-v2"), outgoing.as_ref())
        .await
        .unwrap_err();

    assert!(matches!(error, ControlError::Swap { .. }));
    assert!(error.is_consistent());
    assert_eq!(control.plugin_catalog().await.identities(), vec![outgoing.identity()]);
    assert_eq!(log.events.lock().len(), 1);
}

#[tokio::test]
async fn test_metric_subscriptions_through_public_api() {
    let dir = tempdir().expect("Failed to create temp directory");
    let (control, log) = started_control(&dir).await;

    control.subscribe_metric(["intel", "cpu", "percent"]).await.unwrap();
    control.subscribe_metric(["intel", "cpu", "percent"]).await.unwrap();
    control.unsubscribe_metric(["intel", "cpu", "percent"]).await.unwrap();

    assert_eq!(control.subscription_count(["intel", "cpu", "percent"]), 1);
    assert_eq!(log.events.lock().len(), 3);
    assert_eq!(
        log.events.lock().last(),
        Some(&ControlEvent::MetricUnsubscription {
            namespace: vec!["intel".to_string(), "cpu".to_string(), "percent".to_string()],
        })
    );
}

#[tokio::test]
async fn test_stopped_control_rejects_requests() {
    let dir = tempdir().expect("Failed to create temp directory");
    let (control, log) = started_control(&dir).await;
    let cpu = write_executable(dir.path(), "collector-cpu-v1");
    control.stop();

    let error = control.load(&cpu).await.unwrap_err();
    assert_eq!(error.to_string(), "Must start plugin control before calling load()");
    assert!(log.events.lock().is_empty());
}

#[test]
fn test_from_config_reads_public_key() {
    let dir = tempdir().expect("Failed to create temp directory");
    let key_file = dir.path().join("control.pub");
    fs::write(&key_file, b"control-key").unwrap();

    let config = ControlConfig::builder()
        .with_control_public_key_file(&key_file)
        .build()
        .unwrap();
    let control = PluginControl::from_config(&config).unwrap();

    let key = control.launch_args().control_public_key.as_ref().unwrap();
    assert_eq!(key.as_bytes(), b"control-key");
    assert!(!control.is_started());
}

#[test]
fn test_from_config_missing_public_key_fails() {
    let config = ControlConfig::builder()
        .with_control_public_key_file("/nonexistent/pulse/control.pub")
        .build()
        .unwrap();

    assert!(PluginControl::from_config(&config).is_err());
}
