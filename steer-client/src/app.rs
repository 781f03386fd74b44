use anyhow::Result;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use steer_core::{DriveLabel, KeySink};

use crate::display::FrameDisplay;
use crate::guard::KeyGuard;
use crate::source::LandmarkSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The landmark stream ended
    EndOfStream,
    /// Quit key pressed in the preview window
    Quit,
    /// Ctrl-C or another external stop request
    Interrupted,
    /// `--max-frames` reached
    FrameLimit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub stop: StopReason,
    /// Keys released on shutdown; a key whose release failed is not counted
    pub released: usize,
}

/// Frame loop: read landmarks, drive keys, show feedback, until told to stop.
///
/// Held keys are released on every way out, including errors returned
/// from the source or the display.
pub fn run<L, S, D>(
    source: &mut L,
    mut guard: KeyGuard<S>,
    display: &mut D,
    stop: &AtomicBool,
    max_frames: Option<u64>,
) -> Result<RunSummary>
where
    L: LandmarkSource + ?Sized,
    S: KeySink,
    S::Error: fmt::Display,
    D: FrameDisplay + ?Sized,
{
    log::info!("Starting main loop...");

    let mut frames = 0u64;
    let mut last_state: Option<(DriveLabel, bool)> = None;
    let mut frame_count = 0u32;
    let mut last_fps_time = Instant::now();

    let reason = loop {
        if stop.load(Ordering::SeqCst) {
            break StopReason::Interrupted;
        }
        if max_frames.is_some_and(|limit| frames >= limit) {
            break StopReason::FrameLimit;
        }

        let Some(frame) = source.next_frame()? else {
            break StopReason::EndOfStream;
        };
        frames += 1;

        let classification = guard.process(&frame);

        let state = (classification.label, classification.boost);
        if last_state != Some(state) {
            if classification.boost {
                log::info!("{} + BOOST (hands: {})", state.0, classification.hand_count);
            } else {
                log::info!("{} (hands: {})", state.0, classification.hand_count);
            }
            last_state = Some(state);
        }

        frame_count += 1;
        if last_fps_time.elapsed().as_secs() >= 1 {
            let fps = frame_count as f64 / last_fps_time.elapsed().as_secs_f64();
            log::debug!("FPS: {:.1}", fps);
            frame_count = 0;
            last_fps_time = Instant::now();
        }

        if display.show(&classification)? {
            log::info!("Quit requested");
            break StopReason::Quit;
        }
    };

    let released = guard.finish();

    Ok(RunSummary {
        frames,
        stop: reason,
        released,
    })
}
