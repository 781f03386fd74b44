use std::fmt;
use steer_core::{Classification, FrameObservation, KeySink, SteeringPipeline};

/// Owns the pipeline together with the sink it drives.
///
/// Held keys are released through the sink by [`finish`](Self::finish), or
/// on drop if `finish` never ran, so leaving the loop by `?` or by a panic
/// unwinding through it still lets every key go before the sink is dropped.
pub struct KeyGuard<S>
where
    S: KeySink,
    S::Error: fmt::Display,
{
    pipeline: SteeringPipeline,
    sink: S,
}

impl<S> KeyGuard<S>
where
    S: KeySink,
    S::Error: fmt::Display,
{
    pub fn new(pipeline: SteeringPipeline, sink: S) -> Self {
        Self { pipeline, sink }
    }

    /// Classify one frame and push its edges to the sink.
    ///
    /// Injection failures are logged; the rejected keys are retried on the
    /// next frame.
    pub fn process(&mut self, frame: &FrameObservation) -> Classification {
        let (classification, result) = self.pipeline.process_frame_with(frame, &mut self.sink);
        match result {
            Ok(events) => {
                for event in &events {
                    log::debug!("{:?} {}", event.action, event.key);
                }
            }
            Err(e) => log::warn!("Key injection failed: {}", e),
        }
        classification
    }

    /// Release every held key; returns how many were released
    pub fn finish(mut self) -> usize {
        self.release_held()
    }

    fn release_held(&mut self) -> usize {
        let held_before = self.pipeline.key_state().held_keys().count();
        if held_before == 0 {
            return 0;
        }

        if let Err(e) = self.pipeline.shutdown_with(&mut self.sink) {
            log::warn!("Failed to release keys on shutdown: {}", e);
        }

        let released = held_before - self.pipeline.key_state().held_keys().count();
        log::info!("Released {} held key(s)", released);
        released
    }
}

impl<S> Drop for KeyGuard<S>
where
    S: KeySink,
    S::Error: fmt::Display,
{
    fn drop(&mut self) {
        self.release_held();
    }
}
