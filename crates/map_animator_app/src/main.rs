// SPDX-License-Identifier: MIT OR Apache-2.0
//! Map Animator - headless timeline runner.
//!
//! Builds a timeline from a settings file and command line keyframes/layers,
//! then either:
//! - Samples every frame to JSON lines (`sample`)
//! - Plays it in real time on a tokio runtime (`preview`)
//! - Writes the default settings (`init-config`)

mod cli;
mod sink;

use clap::Parser;
use cli::{Cli, Command, SampleArgs, SceneArgs};
use map_animator_sequencer::driver::{self, command_channel};
use map_animator_sequencer::{
    export_frames, AnimatedLayer, ConfigError, HeadlessSurface, LayerKind, LatLng, MapSurface,
    TextStyle, Timeline, TimelineConfig, TimelineError, TimelineEvent,
};
use sink::JsonLinesSink;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Top-level failure
#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Timeline(#[from] TimelineError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so sampled frames can be piped
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("map_animator_app=debug,map_animator_sequencer=info")
    });
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    tracing::info!("Starting Map Animator v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.cmd {
        Command::Sample(args) => {
            let config = load_config(cli.config.as_deref(), &args.scene)?;
            cmd_sample(&config, args)
        }
        Command::Preview(scene) => {
            let config = load_config(cli.config.as_deref(), &scene)?;
            cmd_preview(&config, &scene)
        }
        Command::InitConfig { out } => {
            TimelineConfig::default().save(&out)?;
            tracing::info!("Wrote default settings to {}", out.display());
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>, scene: &SceneArgs) -> Result<TimelineConfig, ConfigError> {
    let mut config = match path {
        Some(path) => TimelineConfig::load(path)?,
        None => TimelineConfig::default(),
    };
    if let Some(duration) = scene.duration {
        config.duration_secs = duration;
        config.validate()?;
    }
    Ok(config)
}

fn build_timeline(
    config: &TimelineConfig,
    scene: &SceneArgs,
) -> Result<Timeline<HeadlessSurface>, TimelineError> {
    let mut timeline = Timeline::from_config(config, HeadlessSurface::new())?;

    for keyframe in &scene.keyframes {
        timeline.insert_keyframe(keyframe.time, keyframe.pose)?;
    }

    // Labels sit at the first camera position
    let anchor = scene
        .keyframes
        .first()
        .map_or_else(LatLng::default, |keyframe| keyframe.pose.center);
    for text in &scene.text_layers {
        let kind = LayerKind::Text {
            position: anchor,
            content: text.label.clone(),
            text_style: TextStyle::default(),
        };
        timeline.insert_layer(AnimatedLayer::new(kind, text.window));
    }

    tracing::info!(
        "Timeline: {:.1}s, {} keyframes, {} layers",
        timeline.duration(),
        timeline.keyframes().len(),
        timeline.layers().len()
    );
    timeline.seek(0.0);
    Ok(timeline)
}

fn cmd_sample(config: &TimelineConfig, args: SampleArgs) -> Result<(), AppError> {
    let mut timeline = build_timeline(config, &args.scene)?;
    let mut settings = config.export;
    if let Some(fps) = args.fps {
        settings.fps = fps;
    }

    let report = |fraction: f64| tracing::debug!("Sampled {:.0}%", fraction * 100.0);
    let summary = match &args.out {
        Some(path) => {
            let file = io::BufWriter::new(std::fs::File::create(path)?);
            let mut sink = JsonLinesSink::new(file);
            let summary = export_frames(&mut timeline, &settings, &mut sink, report)?;
            sink.finish()?;
            summary
        }
        None => {
            let mut sink = JsonLinesSink::new(io::stdout().lock());
            let summary = export_frames(&mut timeline, &settings, &mut sink, report)?;
            sink.finish()?;
            summary
        }
    };

    tracing::info!(
        "Sampled {} frames at {} fps ({} would be {})",
        summary.frames,
        summary.fps,
        settings.format.mime_type(),
        settings.format.file_name()
    );
    Ok(())
}

fn cmd_preview(config: &TimelineConfig, scene: &SceneArgs) -> Result<(), AppError> {
    let mut timeline = build_timeline(config, scene)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    let (handle, commands) = command_channel();
    let shutdown = handle.clone();
    timeline.subscribe(move |event: &TimelineEvent| match event {
        TimelineEvent::TimeChanged { time, .. } => tracing::debug!("t = {time:.3}s"),
        TimelineEvent::PlaybackStopped => {
            shutdown.shutdown();
        }
        _ => {}
    });

    handle.play();
    runtime.block_on(driver::run(&mut timeline, commands));

    let pose = timeline.surface().pose();
    tracing::info!(
        "Finished at {:.2}s: camera ({:.4}, {:.4}) zoom {:.2}",
        timeline.current_time(),
        pose.center.lat,
        pose.center.lng,
        pose.zoom
    );
    Ok(())
}
