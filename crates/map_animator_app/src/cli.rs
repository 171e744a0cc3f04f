// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line arguments.

use clap::{Args, Parser, Subcommand};
use map_animator_sequencer::config::CONFIG_FILE_NAME;
use map_animator_sequencer::{AnimationWindow, CameraPose};
use std::path::PathBuf;

/// Map Animator command line
#[derive(Parser, Debug)]
#[command(name = "map_animator", version, about = "Sample and preview map animation timelines")]
pub struct Cli {
    /// Timeline settings (RON). Defaults apply when omitted.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand
    #[command(subcommand)]
    pub cmd: Command,
}

/// What to do with the timeline
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sample every frame and print surface snapshots as JSON lines.
    Sample(SampleArgs),
    /// Play the timeline in real time, logging playback.
    Preview(SceneArgs),
    /// Write the default settings file.
    InitConfig {
        /// Output path
        #[arg(long, default_value = CONFIG_FILE_NAME)]
        out: PathBuf,
    },
}

/// Timeline content given on the command line
#[derive(Args, Debug, Clone, Default)]
pub struct SceneArgs {
    /// Timeline length in seconds (overrides the config).
    #[arg(long)]
    pub duration: Option<f64>,

    /// Camera keyframe as `TIME@LAT,LNG,ZOOM`.
    #[arg(long = "keyframe", short = 'k', value_parser = parse_keyframe)]
    pub keyframes: Vec<KeyframeArg>,

    /// Text layer as `LABEL@START-END`.
    #[arg(long = "text", value_parser = parse_text_layer)]
    pub text_layers: Vec<TextLayerArg>,
}

/// Arguments for `sample`
#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Timeline content
    #[command(flatten)]
    pub scene: SceneArgs,

    /// Frames per second (overrides the config).
    #[arg(long)]
    pub fps: Option<u32>,

    /// Write frames here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// A camera keyframe from the command line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeArg {
    /// Time in seconds
    pub time: f64,
    /// Camera at that time
    pub pose: CameraPose,
}

/// A text layer from the command line
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayerArg {
    /// Label text
    pub label: String,
    /// Reveal window
    pub window: AnimationWindow,
}

fn parse_number(value: &str, what: &str) -> Result<f64, String> {
    let number: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid {what}: '{value}'"))?;
    if number.is_finite() {
        Ok(number)
    } else {
        Err(format!("{what} must be finite"))
    }
}

/// Parse `TIME@LAT,LNG,ZOOM`
pub fn parse_keyframe(value: &str) -> Result<KeyframeArg, String> {
    let (time, pose) = value
        .split_once('@')
        .ok_or_else(|| format!("expected TIME@LAT,LNG,ZOOM, got '{value}'"))?;
    let parts: Vec<&str> = pose.split(',').collect();
    let [lat, lng, zoom] = parts.as_slice() else {
        return Err(format!("expected LAT,LNG,ZOOM, got '{pose}'"));
    };
    Ok(KeyframeArg {
        time: parse_number(time, "time")?,
        pose: CameraPose::new(
            parse_number(lat, "latitude")?,
            parse_number(lng, "longitude")?,
            parse_number(zoom, "zoom")?,
        ),
    })
}

/// Parse `LABEL@START-END`
pub fn parse_text_layer(value: &str) -> Result<TextLayerArg, String> {
    let (label, window) = value
        .rsplit_once('@')
        .ok_or_else(|| format!("expected LABEL@START-END, got '{value}'"))?;
    let (start, end) = window
        .split_once('-')
        .ok_or_else(|| format!("expected START-END, got '{window}'"))?;
    if label.is_empty() {
        return Err("label must not be empty".to_string());
    }
    Ok(TextLayerArg {
        label: label.to_string(),
        window: AnimationWindow::new(parse_number(start, "start")?, parse_number(end, "end")?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyframe() {
        let arg = parse_keyframe("2.5@48.85,2.35,11").unwrap();
        assert_eq!(arg.time, 2.5);
        assert_eq!(arg.pose, CameraPose::new(48.85, 2.35, 11.0));

        assert!(parse_keyframe("2.5").is_err());
        assert!(parse_keyframe("2.5@48.85,2.35").is_err());
        assert!(parse_keyframe("x@1,2,3").is_err());
        assert!(parse_keyframe("1@nan,2,3").is_err());
    }

    #[test]
    fn test_parse_text_layer() {
        let arg = parse_text_layer("Paris@1-3.5").unwrap();
        assert_eq!(arg.label, "Paris");
        assert_eq!(arg.window, AnimationWindow::new(1.0, 3.5));

        let arg = parse_text_layer("a@b@0-1").unwrap();
        assert_eq!(arg.label, "a@b");

        assert!(parse_text_layer("@0-1").is_err());
        assert!(parse_text_layer("Paris@1").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "map_animator",
            "sample",
            "--fps",
            "10",
            "-k",
            "0@0,0,3",
            "-k",
            "4@10,20,6",
            "--text",
            "Hello@0-2",
        ])
        .unwrap();
        let Command::Sample(args) = cli.cmd else {
            panic!("expected sample");
        };
        assert_eq!(args.fps, Some(10));
        assert_eq!(args.scene.keyframes.len(), 2);
        assert_eq!(args.scene.text_layers[0].label, "Hello");
    }
}
