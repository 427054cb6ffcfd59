//! The ephemeral control-panel context.
//!
//! Asks the controller to start, renders relayed status events as log
//! lines, and requests a stop on Ctrl-C (or after `--duration`). The panel
//! exits only once a terminal event has returned the session to idle.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tracing::error;
use tracing::info;
use tracing::warn;

use recap_capture::SyntheticEncoder;
use recap_capture::SyntheticMediaProvider;
use recap_daemon::CaptureSpawner;
use recap_daemon::ControllerConfig;
use recap_daemon::start_controller;
use recap_proto::PanelEvent;
use recap_store::DirectoryPicker;
use recap_store::FsDirectoryPicker;
use recap_store::FsDownloadSink;
use recap_store::SaveManager;

use crate::commands::RecordArgs;

fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

fn build_store(args: &RecordArgs, config: &ControllerConfig) -> Arc<SaveManager> {
    let picker: Arc<dyn DirectoryPicker> = if args.no_library {
        Arc::new(FsDirectoryPicker::unconfigured())
    } else {
        let library = args
            .library_dir
            .clone()
            .unwrap_or_else(home_dir);
        Arc::new(FsDirectoryPicker::new(library))
    };
    let downloads = args
        .downloads_dir
        .clone()
        .unwrap_or_else(|| home_dir().join("Downloads"));

    Arc::new(SaveManager::new(
        picker,
        Arc::new(FsDownloadSink::new(downloads)),
        config.subfolder.clone(),
        config.capability_max_age,
    ))
}

pub async fn record(args: RecordArgs) -> ExitCode {
    let config = ControllerConfig::from_env();
    let store = build_store(&args, &config);
    let spawner = CaptureSpawner::new(
        Arc::new(SyntheticMediaProvider::new()),
        Arc::new(SyntheticEncoder::new()),
        store,
        &config,
    );
    let handle = start_controller(spawner, &config);
    let mut events = handle.subscribe();

    if let Err(e) = handle.start_recording().await {
        error!("could not start recording: {e}");
        return ExitCode::FAILURE;
    }
    info!("recording session requested, press Ctrl-C to stop");

    let auto_stop = async {
        match args.duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(auto_stop);
    let mut stop_requested = false;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    render(&event);
                    if event.is_terminal() {
                        return if event.error().is_some() {
                            ExitCode::FAILURE
                        } else {
                            ExitCode::SUCCESS
                        };
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "panel fell behind the event stream");
                }
                Err(RecvError::Closed) => {
                    error!("controller stopped unexpectedly");
                    return ExitCode::FAILURE;
                }
            },
            _ = tokio::signal::ctrl_c(), if !stop_requested => {
                info!("stopping recording");
                stop_requested = true;
                let _ = handle.stop_recording().await;
            }
            _ = &mut auto_stop, if !stop_requested => {
                info!(seconds = args.duration, "duration reached, stopping recording");
                stop_requested = true;
                let _ = handle.stop_recording().await;
            }
        }
    }
}

fn render(event: &PanelEvent) {
    match event {
        PanelEvent::RecordingStarted { started_at } => {
            info!(%started_at, "recording started");
        }
        PanelEvent::RecordingProgress { size } => {
            info!(bytes = size, "recording");
        }
        PanelEvent::ProcessingStart => info!("processing recording"),
        PanelEvent::ProcessingComplete { size } => {
            info!(bytes = size, "processing complete, saving");
        }
        PanelEvent::SavingComplete { message } => info!("{message}"),
        PanelEvent::StreamError { error }
        | PanelEvent::ProcessingError { error }
        | PanelEvent::SavingError { error } => {
            error!(kind = ?error.kind, "{}", error.message);
        }
    }
}
