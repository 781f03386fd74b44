#![cfg_attr(not(feature = "std"), no_std)]

//! Data types shared between the steering core and its collaborators:
//! hand landmarks as reported by the detector, virtual keys, edge events
//! and the key bindings used by the injector.

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Number of keypoints in the hand topology reported by the detector
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Represents a 2D position in pixel coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Size of the captured frame in pixels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

/// The 21 hand landmarks, indexed the way the detector reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexFingerMcp = 5,
    IndexFingerPip = 6,
    IndexFingerDip = 7,
    IndexFingerTip = 8,
    MiddleFingerMcp = 9,
    MiddleFingerPip = 10,
    MiddleFingerDip = 11,
    MiddleFingerTip = 12,
    RingFingerMcp = 13,
    RingFingerPip = 14,
    RingFingerDip = 15,
    RingFingerTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl HandLandmark {
    /// Palm-center proxy used for steering
    pub const PALM_CENTER: HandLandmark = HandLandmark::MiddleFingerMcp;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A single hand keypoint in normalized (0.0-1.0) frame coordinates
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Convert to whole-pixel coordinates for a frame of the given size.
    ///
    /// The product is taken in f64 so a value just under a pixel boundary
    /// never rounds up onto it before truncation.
    pub fn to_pixels(&self, size: FrameSize) -> Position {
        Position::new(
            libm::trunc(self.x as f64 * size.width as f64) as f32,
            libm::trunc(self.y as f64 * size.height as f64) as f32,
        )
    }
}

/// Error building a hand observation from raw detector output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationError {
    /// More keypoints than the hand topology defines
    TooManyLandmarks(usize),
}

impl fmt::Display for ObservationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservationError::TooManyLandmarks(n) => write!(
                f,
                "hand has {} landmarks, expected at most {}",
                n, HAND_LANDMARK_COUNT
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ObservationError {}

/// One detected hand in one frame
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HandObservation {
    pub landmarks: heapless::Vec<Landmark, HAND_LANDMARK_COUNT>,
}

impl HandObservation {
    pub fn from_landmarks(landmarks: &[Landmark]) -> Result<Self, ObservationError> {
        let landmarks = heapless::Vec::from_slice(landmarks)
            .map_err(|_| ObservationError::TooManyLandmarks(landmarks.len()))?;
        Ok(Self { landmarks })
    }

    /// Look up a landmark; `None` if the detector did not report it
    pub fn landmark(&self, which: HandLandmark) -> Option<&Landmark> {
        self.landmarks.get(which.index())
    }
}

/// All hands detected in the current frame, in detector order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FrameObservation {
    #[serde(default)]
    pub hands: Vec<HandObservation>,
}

impl FrameObservation {
    pub fn new(hands: Vec<HandObservation>) -> Self {
        Self { hands }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse one line of a recorded or streamed session
    #[cfg(feature = "std")]
    pub fn from_json_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }

    #[cfg(feature = "std")]
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Classifier thresholds as they appear in configuration files
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierSettings {
    pub dead_zone_px: f32,
    pub thumb_ip_margin: f32,
    pub thumb_wrist_margin: f32,
    pub max_hands: usize,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            dead_zone_px: 50.0,
            thumb_ip_margin: 0.04,
            thumb_wrist_margin: 0.08,
            max_hands: 2,
        }
    }
}

/// Abstract driving control, independent of any physical key code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VirtualKey {
    Forward,
    Left,
    Right,
    Backward,
    Boost,
}

impl VirtualKey {
    pub const ALL: [VirtualKey; 5] = [
        VirtualKey::Forward,
        VirtualKey::Left,
        VirtualKey::Right,
        VirtualKey::Backward,
        VirtualKey::Boost,
    ];

    pub fn index(self) -> usize {
        match self {
            VirtualKey::Forward => 0,
            VirtualKey::Left => 1,
            VirtualKey::Right => 2,
            VirtualKey::Backward => 3,
            VirtualKey::Boost => 4,
        }
    }
}

impl fmt::Display for VirtualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VirtualKey::Forward => "forward",
            VirtualKey::Left => "left",
            VirtualKey::Right => "right",
            VirtualKey::Backward => "backward",
            VirtualKey::Boost => "boost",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAction {
    Pressed,
    Released,
}

/// A press or release transition for one virtual key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: VirtualKey,
    pub action: KeyAction,
}

impl KeyEvent {
    pub fn press(key: VirtualKey) -> Self {
        Self {
            key,
            action: KeyAction::Pressed,
        }
    }

    pub fn release(key: VirtualKey) -> Self {
        Self {
            key,
            action: KeyAction::Released,
        }
    }
}

/// Physical key a virtual key is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyCode {
    Char(char),
    Space,
    Enter,
    Shift,
    Control,
    Up,
    Down,
    Left,
    Right,
}

/// Mapping from virtual keys to physical keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub backward: KeyCode,
    pub boost: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: KeyCode::Char('w'),
            left: KeyCode::Char('a'),
            right: KeyCode::Char('d'),
            backward: KeyCode::Char('s'),
            boost: KeyCode::Space,
        }
    }
}

impl KeyBindings {
    pub fn get(&self, key: VirtualKey) -> KeyCode {
        match key {
            VirtualKey::Forward => self.forward,
            VirtualKey::Left => self.left,
            VirtualKey::Right => self.right,
            VirtualKey::Backward => self.backward,
            VirtualKey::Boost => self.boost,
        }
    }

    /// True when no two virtual keys share a physical key
    pub fn is_distinct(&self) -> bool {
        let codes = VirtualKey::ALL.map(|key| self.get(key));
        codes
            .iter()
            .enumerate()
            .all(|(i, code)| !codes[i + 1..].contains(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_to_pixels_truncates() {
        let lm = Landmark::new(0.5, 0.251);
        let pos = lm.to_pixels(FrameSize::new(640, 480));
        assert_eq!(pos, Position::new(320.0, 120.0));
    }

    #[test]
    fn test_landmark_just_below_pixel_boundary() {
        let size = FrameSize::new(640, 480);
        // Largest f32 below 47/480; an f32 product rounds it up to 47.0
        let lm = Landmark::new(0.5, 0.09791666);
        assert_eq!(lm.to_pixels(size).y, 46.0);

        for px in 1..480u32 {
            let below = f32::from_bits((px as f32 / 480.0).to_bits() - 1);
            let expected = (below as f64 * 480.0).trunc() as f32;
            assert_eq!(Landmark::new(0.0, below).to_pixels(size).y, expected, "px {}", px);
        }
    }

    #[test]
    fn test_hand_observation_lookup() {
        let landmarks: Vec<Landmark> = (0..HAND_LANDMARK_COUNT)
            .map(|i| Landmark::new(i as f32 / 100.0, 0.5))
            .collect();
        let hand = HandObservation::from_landmarks(&landmarks).unwrap();
        assert_eq!(hand.landmark(HandLandmark::PALM_CENTER).unwrap().x, 0.09);
        assert_eq!(hand.landmark(HandLandmark::Wrist).unwrap().x, 0.0);
    }

    #[test]
    fn test_partial_hand_reports_missing_landmarks() {
        let hand = HandObservation::from_landmarks(&[Landmark::new(0.1, 0.1); 5]).unwrap();
        assert!(hand.landmark(HandLandmark::ThumbTip).is_some());
        assert!(hand.landmark(HandLandmark::PALM_CENTER).is_none());
    }

    #[test]
    fn test_too_many_landmarks_rejected() {
        let result = HandObservation::from_landmarks(&[Landmark::default(); 22]);
        assert_eq!(result, Err(ObservationError::TooManyLandmarks(22)));
    }

    #[test]
    fn test_frame_json_line() {
        let line = r#"{"hands":[{"landmarks":[{"x":0.1,"y":0.2},{"x":0.3,"y":0.4,"z":-0.01}]}]}"#;
        let frame = FrameObservation::from_json_line(line).unwrap();
        assert_eq!(frame.hands.len(), 1);
        assert_eq!(frame.hands[0].landmarks.len(), 2);
        assert_eq!(frame.hands[0].landmarks[1].z, -0.01);

        let line = frame.to_json_line().unwrap();
        assert!(!line.contains('\n'));
        assert_eq!(FrameObservation::from_json_line(&line).unwrap(), frame);

        let empty = FrameObservation::from_json_line("{}").unwrap();
        assert!(empty.hands.is_empty());
    }

    #[test]
    fn test_default_bindings() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.get(VirtualKey::Forward), KeyCode::Char('w'));
        assert_eq!(bindings.get(VirtualKey::Left), KeyCode::Char('a'));
        assert_eq!(bindings.get(VirtualKey::Backward), KeyCode::Char('s'));
        assert_eq!(bindings.get(VirtualKey::Right), KeyCode::Char('d'));
        assert_eq!(bindings.get(VirtualKey::Boost), KeyCode::Space);
        assert!(bindings.is_distinct());
    }

    #[test]
    fn test_bindings_parse_partial_override() {
        let bindings: KeyBindings =
            serde_json::from_str(r#"{"boost":"shift","left":{"char":"q"}}"#).unwrap();
        assert_eq!(bindings.boost, KeyCode::Shift);
        assert_eq!(bindings.left, KeyCode::Char('q'));
        assert_eq!(bindings.forward, KeyCode::Char('w'));
    }

    #[test]
    fn test_duplicate_bindings_detected() {
        let bindings = KeyBindings {
            boost: KeyCode::Char('w'),
            ..KeyBindings::default()
        };
        assert!(!bindings.is_distinct());
    }

    #[test]
    fn test_virtual_key_index_matches_all_order() {
        for (i, key) in VirtualKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), i);
        }
    }
}
