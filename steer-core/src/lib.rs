#![cfg_attr(not(feature = "std"), no_std)]

//! Gesture steering core: classify hands per frame, then turn the wanted
//! keys into press/release edges.

pub mod gesture;
pub mod keys;

pub use gesture::{
    Classification, ClassifierConfig, DriveLabel, GestureClassifier, BOOST_LABEL, MAX_HANDS,
};
pub use keys::{dispatch, KeyEvents, KeySink, KeyState, KeyStateController, TargetKeys};
pub use steer_shared::{
    FrameObservation, FrameSize, HandObservation, KeyAction, KeyEvent, Landmark, VirtualKey,
};

/// What one frame produced
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub classification: Classification,
    pub events: KeyEvents,
}

/// Classifier and controller wired together, one call per frame.
///
/// Works the same from a live capture loop or from recorded frames.
#[derive(Debug, Clone, Default)]
pub struct SteeringPipeline {
    classifier: GestureClassifier,
    controller: KeyStateController,
    frame_size: FrameSize,
}

impl SteeringPipeline {
    pub fn new(config: ClassifierConfig, frame_size: FrameSize) -> Self {
        Self {
            classifier: GestureClassifier::new(config),
            controller: KeyStateController::new(),
            frame_size,
        }
    }

    pub fn frame_size(&self) -> FrameSize {
        self.frame_size
    }

    pub fn key_state(&self) -> &KeyState {
        self.controller.state()
    }

    pub fn process_frame(&mut self, frame: &FrameObservation) -> FrameOutcome {
        let classification = self.classifier.classify(frame, self.frame_size);
        let events = self.controller.apply(&classification.target);
        FrameOutcome {
            classification,
            events,
        }
    }

    /// Process a frame and deliver its edges to `sink` as they happen.
    ///
    /// The classification is returned even if the sink rejected an edge.
    pub fn process_frame_with<S: KeySink + ?Sized>(
        &mut self,
        frame: &FrameObservation,
        sink: &mut S,
    ) -> (Classification, Result<KeyEvents, S::Error>) {
        let classification = self.classifier.classify(frame, self.frame_size);
        let events = self.controller.apply_with(&classification.target, sink);
        (classification, events)
    }

    pub fn shutdown(&mut self) -> KeyEvents {
        self.controller.release_all()
    }

    pub fn shutdown_with<S: KeySink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<KeyEvents, S::Error> {
        self.controller.release_all_with(sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steer_shared::{HandLandmark, HAND_LANDMARK_COUNT};

    fn hand_at(x: f32, y: f32) -> HandObservation {
        let mut landmarks = [Landmark::new(0.5, 0.5); HAND_LANDMARK_COUNT];
        landmarks[HandLandmark::PALM_CENTER.index()] = Landmark::new(x, y);
        HandObservation::from_landmarks(&landmarks).unwrap()
    }

    #[test]
    fn test_pipeline_session() {
        let mut pipeline =
            SteeringPipeline::new(ClassifierConfig::default(), FrameSize::new(640, 480));
        assert_eq!(pipeline.frame_size(), FrameSize::new(640, 480));

        let one = FrameObservation::new(vec![hand_at(0.5, 0.5)]);
        let outcome = pipeline.process_frame(&one);
        assert_eq!(outcome.classification.label, DriveLabel::Backward);
        assert_eq!(outcome.events.as_slice(), &[KeyEvent::press(VirtualKey::Backward)]);

        assert!(pipeline.process_frame(&one).events.is_empty());

        let two = FrameObservation::new(vec![hand_at(0.2, 0.5), hand_at(0.8, 0.5)]);
        let outcome = pipeline.process_frame(&two);
        assert_eq!(outcome.classification.label, DriveLabel::Forward);
        assert_eq!(
            outcome.events.as_slice(),
            &[
                KeyEvent::press(VirtualKey::Forward),
                KeyEvent::release(VirtualKey::Backward)
            ]
        );

        let events = pipeline.shutdown();
        assert_eq!(events.as_slice(), &[KeyEvent::release(VirtualKey::Forward)]);
        assert!(!pipeline.key_state().any_held());
    }

    #[test]
    fn test_no_hands_releases_everything() {
        let mut pipeline = SteeringPipeline::default();
        let two = FrameObservation::new(vec![hand_at(0.2, 0.9), hand_at(0.8, 0.1)]);
        let outcome = pipeline.process_frame(&two);
        assert_eq!(outcome.classification.label, DriveLabel::Left);

        let outcome = pipeline.process_frame(&FrameObservation::empty());
        assert_eq!(outcome.classification.label, DriveLabel::NoHands);
        assert_eq!(
            outcome.events.as_slice(),
            &[
                KeyEvent::release(VirtualKey::Forward),
                KeyEvent::release(VirtualKey::Left)
            ]
        );
        assert!(pipeline.shutdown().is_empty());
    }
}
