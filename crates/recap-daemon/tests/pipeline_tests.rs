//! Whole-pipeline tests: real controller, real capture host with synthetic
//! media, real filesystem persistence under a temp directory.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use recap_capture::SyntheticEncoder;
use recap_capture::SyntheticMediaProvider;
use recap_daemon::CaptureSpawner;
use recap_daemon::ControllerConfig;
use recap_daemon::start_controller;
use recap_proto::ErrorKind;
use recap_proto::PanelEvent;
use recap_proto::SessionStatus;
use recap_store::FsDirectoryPicker;
use recap_store::FsDownloadSink;
use recap_store::SaveManager;

fn test_config() -> ControllerConfig {
    ControllerConfig::from_env()
        .with_flush_interval(Duration::from_millis(10))
        .with_save_timeout(Duration::from_secs(5))
}

fn store_for(
    library: &std::path::Path,
    downloads: &std::path::Path,
    config: &ControllerConfig,
) -> Arc<SaveManager> {
    Arc::new(SaveManager::new(
        Arc::new(FsDirectoryPicker::new(library)),
        Arc::new(FsDownloadSink::new(downloads)),
        config.subfolder.clone(),
        config.capability_max_age,
    ))
}

async fn next_event(rx: &mut broadcast::Receiver<PanelEvent>) -> PanelEvent {
    tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("timed out waiting for a panel event")
        .expect("panel channel closed")
}

#[tokio::test]
async fn records_and_saves_into_the_library() {
    let tmp = tempfile::tempdir().unwrap();
    let library = tmp.path().join("library");
    let downloads = tmp.path().join("downloads");
    let config = test_config();

    let spawner = CaptureSpawner::new(
        Arc::new(SyntheticMediaProvider::new()),
        Arc::new(SyntheticEncoder::new().with_chunk_size(512)),
        store_for(&library, &downloads, &config),
        &config,
    );
    let handle = start_controller(spawner, &config);
    let mut panel = handle.subscribe();

    handle.start_recording().await.unwrap();

    assert!(matches!(
        next_event(&mut panel).await,
        PanelEvent::RecordingStarted { .. }
    ));

    // Let at least one chunk land, then ask for a stop.
    let mut last_progress = 0;
    loop {
        if let PanelEvent::RecordingProgress { size } = next_event(&mut panel).await {
            assert!(size >= last_progress, "progress must be non-decreasing");
            last_progress = size;
            break;
        }
    }
    handle.stop_recording().await.unwrap();

    let mut saved_size = None;
    let terminal = loop {
        match next_event(&mut panel).await {
            PanelEvent::RecordingProgress { size } => {
                assert!(size >= last_progress);
                last_progress = size;
            }
            PanelEvent::ProcessingComplete { size } => saved_size = Some(size),
            event if event.is_terminal() => break event,
            _ => {}
        }
    };
    match terminal {
        PanelEvent::SavingComplete { message } => assert!(message.contains("library")),
        other => panic!("expected SavingComplete, got {other:?}"),
    }
    assert_eq!(saved_size, Some(last_progress));

    let snap = handle.recording_state().await.unwrap();
    assert_eq!(snap.status, SessionStatus::Idle);

    let recordings = library.join("Recordings");
    let files: Vec<_> = std::fs::read_dir(&recordings)
        .expect("recordings folder created")
        .collect::<std::io::Result<_>>()
        .unwrap();
    assert_eq!(files.len(), 1);
    let len = files[0].metadata().unwrap().len();
    assert_eq!(len, last_progress);
}

#[tokio::test]
async fn denied_microphone_never_creates_an_artifact() {
    let tmp = tempfile::tempdir().unwrap();
    let library = tmp.path().join("library");
    let downloads = tmp.path().join("downloads");
    let config = test_config();

    let spawner = CaptureSpawner::new(
        Arc::new(SyntheticMediaProvider::new().deny_microphone("mic denied")),
        Arc::new(SyntheticEncoder::new()),
        store_for(&library, &downloads, &config),
        &config,
    );
    let handle = start_controller(spawner, &config);
    let mut panel = handle.subscribe();

    handle.start_recording().await.unwrap();

    match next_event(&mut panel).await {
        PanelEvent::StreamError { error } => {
            assert_eq!(error.kind, ErrorKind::StreamDenied);
            assert!(error.message.contains("mic denied"));
        }
        other => panic!("expected StreamError, got {other:?}"),
    }

    let snap = handle.recording_state().await.unwrap();
    assert_eq!(snap.status, SessionStatus::Idle);
    assert!(!library.exists());
    assert!(!downloads.exists());

    // A failed session re-enables starting a new one.
    handle.start_recording().await.unwrap();
}

#[tokio::test]
async fn cancelled_picker_aborts_the_save_cleanly() {
    let tmp = tempfile::tempdir().unwrap();
    let downloads = tmp.path().join("downloads");
    let config = test_config();

    let store = Arc::new(SaveManager::new(
        Arc::new(FsDirectoryPicker::unconfigured()),
        Arc::new(FsDownloadSink::new(&downloads)),
        config.subfolder.clone(),
        config.capability_max_age,
    ));
    let spawner = CaptureSpawner::new(
        Arc::new(SyntheticMediaProvider::new()),
        Arc::new(SyntheticEncoder::new().with_chunk_size(64)),
        store,
        &config,
    );
    let handle = start_controller(spawner, &config);
    let mut panel = handle.subscribe();

    handle.start_recording().await.unwrap();
    loop {
        if matches!(
            next_event(&mut panel).await,
            PanelEvent::RecordingProgress { .. }
        ) {
            break;
        }
    }
    handle.stop_recording().await.unwrap();

    let terminal = loop {
        let event = next_event(&mut panel).await;
        if event.is_terminal() {
            break event;
        }
    };
    match terminal {
        PanelEvent::SavingError { error } => {
            assert_eq!(error.kind, ErrorKind::NoDirectoryAccess);
        }
        other => panic!("expected SavingError, got {other:?}"),
    }

    // Cancellation is a clean abort: the fallback was not attempted.
    assert!(!downloads.exists());
    let snap = handle.recording_state().await.unwrap();
    assert_eq!(snap.status, SessionStatus::Idle);
}
