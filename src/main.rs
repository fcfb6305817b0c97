use anyhow::{Context, Result};
use audio_session_bridge::native::{PermissionResult, SimulatedPermissions};
use audio_session_bridge::{
    create_router, AppState, AudioBridge, Config, OutputRoute, PlaybackOptions, RecordingOptions,
    SessionHandlers, SimulatedPlayer, SimulatedRecorder,
};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "audio-session-bridge", about = "Recorder/player session controller")]
struct Cli {
    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/audio-session-bridge")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record for a fixed time
    Record {
        #[arg(long)]
        path: String,
        #[arg(long, default_value_t = 3.0)]
        seconds: f64,
        /// Recording options as JSON, e.g. '{"SampleRate": 22050}'
        #[arg(long)]
        options: Option<String>,
    },
    /// Play a WAV file to completion
    Play {
        #[arg(long)]
        path: String,
        /// Output route key
        #[arg(long)]
        output: Option<String>,
    },
    /// List output routes
    Outputs,
    /// Serve the HTTP control API
    Serve,
}

fn build_bridge(cfg: &Config) -> Result<AudioBridge> {
    let recorder = Arc::new(SimulatedRecorder::new(cfg.recording_progress_interval()));
    let player = Arc::new(SimulatedPlayer::new(
        cfg.playback_progress_interval(),
        cfg.playback.outputs.clone(),
    ));
    let normalizer = cfg.normalizer().context("Invalid configured defaults")?;

    Ok(
        AudioBridge::with_normalizer(recorder, player, cfg.capabilities(), normalizer)
            .with_permissions(Arc::new(SimulatedPermissions::new(PermissionResult::Granted))),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;
    info!("Loaded config: {} ({:?})", cfg.service.name, cfg.platform.target);

    let bridge = build_bridge(&cfg)?;

    match cli.command {
        Command::Record {
            path,
            seconds,
            options,
        } => {
            let options = match options {
                Some(json) => RecordingOptions::from_value(
                    serde_json::from_str(&json).context("Recording options must be JSON")?,
                )?,
                None => RecordingOptions::default(),
            };
            let path = cfg.resolve_recording_path(&path);

            bridge
                .recorder
                .set_handlers(SessionHandlers::new(
                    |p| info!("Recording: {:.2}s", p.current_time),
                    |f| info!("Recording finished: {:?}", f.status),
                ))
                .await;

            if !bridge.recorder.check_authorization().await
                && !bridge.recorder.request_authorization().await
            {
                anyhow::bail!("Recording permission denied");
            }

            let settings = bridge.recorder.prepare(&path, &options).await?;
            info!(
                "Recording {} Hz / {} ch to {}",
                settings.sample_rate, settings.channels, path
            );
            bridge.recorder.start().await?;
            tokio::time::sleep(Duration::from_secs_f64(seconds.max(0.0))).await;
            let finished = bridge.recorder.stop().await?;

            println!(
                "{}",
                finished.audio_file_url.unwrap_or_else(|| format!("file://{}", path))
            );
        }

        Command::Play { path, output } => {
            let output: Option<OutputRoute> = output.as_deref().map(str::parse).transpose()?;
            let (done_tx, done_rx) = oneshot::channel();
            let done_tx = std::sync::Mutex::new(Some(done_tx));

            bridge
                .player
                .set_handlers(SessionHandlers::new(
                    |p| info!("Playing: {:.2}s", p.current_time),
                    move |f| {
                        if let Some(tx) = done_tx.lock().expect("done mutex poisoned").take() {
                            let _ = tx.send(f.clone());
                        }
                    },
                ))
                .await;

            bridge
                .player
                .play(&path, &PlaybackOptions::default(), output)
                .await?;
            let finished = done_rx.await.context("Player dropped before finishing")?;
            info!("Playback finished: {:?}", finished.status);
        }

        Command::Outputs => {
            for output in bridge.player.get_outputs().await? {
                println!(
                    "{:<14} {}",
                    output.key,
                    if output.available { "available" } else { "unavailable" }
                );
            }
        }

        Command::Serve => {
            let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
            let state = AppState::new(bridge, cfg).await;
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;

            info!("HTTP API listening on {}", addr);
            axum::serve(listener, create_router(state))
                .await
                .context("HTTP server failed")?;
        }
    }

    Ok(())
}
