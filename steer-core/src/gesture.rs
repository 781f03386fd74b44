//! Per-frame gesture classification.
//!
//! Turns the hands detected in one frame into the set of virtual keys that
//! should be held. Nothing here keeps state between frames.

use steer_shared::{
    ClassifierSettings, FrameObservation, FrameSize, HandLandmark, HandObservation, Position,
};

use crate::keys::TargetKeys;

/// Upper bound on hands taken from a single frame
pub const MAX_HANDS: usize = 2;

/// Label shown alongside the driving label while boosting
pub const BOOST_LABEL: &str = "BOOST";

/// Thresholds for the classifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierConfig {
    /// Vertical offset between hands (pixels) still treated as centered
    pub dead_zone_px: f32,
    /// How far (normalized units) the thumb tip must sit above the thumb IP joint
    pub thumb_ip_margin: f32,
    /// How far (normalized units) the thumb tip must sit above the wrist
    pub thumb_wrist_margin: f32,
    /// Hands considered per frame, capped at [`MAX_HANDS`]
    pub max_hands: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            dead_zone_px: 50.0,
            thumb_ip_margin: 0.04,
            thumb_wrist_margin: 0.08,
            max_hands: MAX_HANDS,
        }
    }
}

impl From<ClassifierSettings> for ClassifierConfig {
    fn from(settings: ClassifierSettings) -> Self {
        Self {
            dead_zone_px: settings.dead_zone_px,
            thumb_ip_margin: settings.thumb_ip_margin,
            thumb_wrist_margin: settings.thumb_wrist_margin,
            max_hands: settings.max_hands.min(MAX_HANDS),
        }
    }
}

/// Driving intent derived from hand count and relative height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveLabel {
    NoHands,
    Backward,
    Forward,
    Left,
    Right,
}

impl DriveLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriveLabel::NoHands => "NO HANDS",
            DriveLabel::Backward => "BACKWARD",
            DriveLabel::Forward => "FORWARD",
            DriveLabel::Left => "LEFT",
            DriveLabel::Right => "RIGHT",
        }
    }
}

impl core::fmt::Display for DriveLabel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub target: TargetKeys,
    pub label: DriveLabel,
    pub boost: bool,
    pub hand_count: usize,
    pub thumbs_up_count: usize,
    /// Palm-center pixel positions of the usable hands, in detector order
    pub hand_points: heapless::Vec<Position, MAX_HANDS>,
}

/// Strict thumbs-up test.
///
/// The thumb tip has to be clearly above both the thumb IP joint and the
/// wrist; image y grows downward. Returns `None` if any of the three
/// landmarks is missing.
pub fn thumbs_up(hand: &HandObservation, config: &ClassifierConfig) -> Option<bool> {
    let tip = hand.landmark(HandLandmark::ThumbTip)?;
    let ip = hand.landmark(HandLandmark::ThumbIp)?;
    let wrist = hand.landmark(HandLandmark::Wrist)?;

    Some(tip.y < ip.y - config.thumb_ip_margin && tip.y < wrist.y - config.thumb_wrist_margin)
}

/// Palm-center landmark in whole-pixel coordinates
pub fn reference_point(hand: &HandObservation, size: FrameSize) -> Option<Position> {
    hand.landmark(HandLandmark::PALM_CENTER).map(|lm| lm.to_pixels(size))
}

#[derive(Debug, Clone, Default)]
pub struct GestureClassifier {
    config: ClassifierConfig,
}

impl GestureClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn is_thumbs_up(&self, hand: &HandObservation) -> Option<bool> {
        thumbs_up(hand, &self.config)
    }

    /// Classify one frame.
    ///
    /// Only the first `max_hands` detections are looked at. A hand missing
    /// any of the wrist, thumb or palm-center landmarks is skipped and does
    /// not count as present.
    pub fn classify(&self, frame: &FrameObservation, size: FrameSize) -> Classification {
        let limit = self.config.max_hands.min(MAX_HANDS);
        let mut hand_points = heapless::Vec::<Position, MAX_HANDS>::new();
        let mut thumbs_up_count = 0;

        for hand in frame.hands.iter().take(limit) {
            let (Some(point), Some(is_up)) = (reference_point(hand, size), self.is_thumbs_up(hand))
            else {
                continue;
            };
            if hand_points.push(point).is_err() {
                break;
            }
            if is_up {
                thumbs_up_count += 1;
            }
        }

        let mut target = TargetKeys::default();

        let boost = thumbs_up_count == 2;
        target.boost = boost;

        let label = match hand_points.as_slice() {
            [] => DriveLabel::NoHands,
            [_] => {
                target.backward = true;
                DriveLabel::Backward
            }
            [a, b, ..] => self.steer(*a, *b, &mut target),
        };

        Classification {
            target,
            label,
            boost,
            hand_count: hand_points.len(),
            thumbs_up_count,
            hand_points,
        }
    }

    fn steer(&self, a: Position, b: Position, target: &mut TargetKeys) -> DriveLabel {
        // Order by x so detector reordering never swaps left and right
        let (left, right) = if b.x < a.x { (b, a) } else { (a, b) };
        let diff = left.y - right.y;

        target.forward = true;
        if libm::fabsf(diff) < self.config.dead_zone_px {
            DriveLabel::Forward
        } else if diff > 0.0 {
            target.left = true;
            DriveLabel::Left
        } else {
            target.right = true;
            DriveLabel::Right
        }
    }
}
