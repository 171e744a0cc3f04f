// SPDX-License-Identifier: MIT OR Apache-2.0
//! Real-time playback on a tokio runtime.
//!
//! The driver owns the timeline for as long as it runs. Other tasks talk to
//! it through a [`PlaybackHandle`]; ticks fire only while playing, and a
//! late tick is skipped rather than bursted since every tick measures the
//! wall time elapsed anyway.

use crate::clock::TickOutcome;
use crate::surface::MapSurface;
use crate::timeline::Timeline;
use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};

/// Requests accepted by a running driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackCommand {
    /// Start playback
    Play,
    /// Stop playback
    Stop,
    /// Play if stopped, stop if playing
    TogglePlay,
    /// Move the playhead
    Seek(f64),
    /// Record the surface camera at the current time
    CaptureKeyframe,
    /// Stop and return from [`run`]
    Shutdown,
}

/// Sender side of a driver's command channel
#[derive(Debug, Clone)]
pub struct PlaybackHandle {
    tx: mpsc::UnboundedSender<PlaybackCommand>,
}

impl PlaybackHandle {
    /// Queue a command. Returns false once the driver has exited.
    pub fn send(&self, command: PlaybackCommand) -> bool {
        self.tx.send(command).is_ok()
    }

    /// Start playback
    pub fn play(&self) -> bool {
        self.send(PlaybackCommand::Play)
    }

    /// Stop playback
    pub fn stop(&self) -> bool {
        self.send(PlaybackCommand::Stop)
    }

    /// Move the playhead
    pub fn seek(&self, time: f64) -> bool {
        self.send(PlaybackCommand::Seek(time))
    }

    /// Ask the driver to exit
    pub fn shutdown(&self) -> bool {
        self.send(PlaybackCommand::Shutdown)
    }
}

/// Create a command channel for [`run`]
pub fn command_channel() -> (PlaybackHandle, mpsc::UnboundedReceiver<PlaybackCommand>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (PlaybackHandle { tx }, rx)
}

fn now() -> std::time::Instant {
    Instant::now().into_std()
}

fn handle_command<S: MapSurface>(timeline: &mut Timeline<S>, command: PlaybackCommand) {
    tracing::debug!("Playback command: {:?}", command);
    match command {
        PlaybackCommand::Play => {
            timeline.play(now());
        }
        PlaybackCommand::Stop => {
            timeline.stop();
        }
        PlaybackCommand::TogglePlay => timeline.toggle_play(now()),
        PlaybackCommand::Seek(time) => {
            timeline.seek(time);
        }
        PlaybackCommand::CaptureKeyframe => {
            // Rejections are logged by the timeline
            let _ = timeline.capture_keyframe();
        }
        PlaybackCommand::Shutdown => {}
    }
}

/// Drive `timeline` until a [`PlaybackCommand::Shutdown`] arrives or every
/// handle is dropped. Playback is stopped on exit.
pub async fn run<S: MapSurface>(
    timeline: &mut Timeline<S>,
    mut commands: mpsc::UnboundedReceiver<PlaybackCommand>,
) {
    let mut ticker = interval(timeline.clock().tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tracing::info!(
        "Playback driver running at {:.0} Hz",
        timeline.clock().tick_rate_hz()
    );

    loop {
        tokio::select! {
            biased;

            command = commands.recv() => match command {
                None | Some(PlaybackCommand::Shutdown) => break,
                Some(command) => handle_command(timeline, command),
            },
            _ = ticker.tick(), if timeline.is_playing() => {
                if timeline.tick(now()) == TickOutcome::Finished {
                    tracing::info!("Reached end of timeline");
                }
            }
        }
    }

    timeline.stop();
    tracing::info!("Playback driver stopped");
}

/// Play from the current time (or from the top if at the end) until the
/// timeline finishes
pub async fn play_to_end<S: MapSurface>(timeline: &mut Timeline<S>) {
    let mut ticker = interval(timeline.clock().tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    timeline.play(now());
    while timeline.is_playing() {
        ticker.tick().await;
        timeline.tick(now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TimelineEvent;
    use crate::keyframe::CameraPose;
    use crate::surface::HeadlessSurface;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn timeline() -> Timeline<HeadlessSurface> {
        let mut timeline = Timeline::new(1.0, HeadlessSurface::new()).unwrap();
        timeline
            .insert_keyframe(0.0, CameraPose::new(0.0, 0.0, 4.0))
            .unwrap();
        timeline
            .insert_keyframe(1.0, CameraPose::new(10.0, 20.0, 8.0))
            .unwrap();
        timeline
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_to_end() {
        let mut timeline = timeline();
        let stops = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&stops);
        timeline.subscribe(move |event: &TimelineEvent| {
            if *event == TimelineEvent::PlaybackStopped {
                *counter.borrow_mut() += 1;
            }
        });

        play_to_end(&mut timeline).await;

        assert!(!timeline.is_playing());
        assert_eq!(timeline.current_time(), 1.0);
        assert_eq!(timeline.surface().pose(), CameraPose::new(10.0, 20.0, 8.0));
        assert_eq!(*stops.borrow(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_plays_and_shuts_down() {
        let mut timeline = timeline();
        let (handle, rx) = command_channel();
        handle.play();

        let control = async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            assert!(handle.shutdown());
        };
        tokio::join!(run(&mut timeline, rx), control);

        assert!(!timeline.is_playing());
        assert_eq!(timeline.current_time(), 1.0);
        assert!(!handle.play());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stop_holds_time() {
        let mut timeline = timeline();
        let (handle, rx) = command_channel();
        handle.play();

        let control = async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            handle.stop();
            tokio::time::sleep(Duration::from_secs(1)).await;
            handle.shutdown();
        };
        tokio::join!(run(&mut timeline, rx), control);

        let time = timeline.current_time();
        assert!(time > 0.2 && time < 0.4, "stopped at {time}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_seek_command() {
        let mut timeline = timeline();
        let (handle, rx) = command_channel();
        handle.seek(0.5);
        drop(handle);

        run(&mut timeline, rx).await;

        assert_eq!(timeline.current_time(), 0.5);
        assert!((timeline.surface().pose().center.lat - 5.0).abs() < 1e-9);
    }
}
