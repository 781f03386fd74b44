use anyhow::Result;
use steer_core::Classification;

/// On-screen feedback for each processed frame
pub trait FrameDisplay {
    /// Show one frame's result; returns `true` when the user asked to quit
    fn show(&mut self, classification: &Classification) -> Result<bool>;
}

/// No window at all
#[derive(Debug, Default)]
pub struct Headless;

impl FrameDisplay for Headless {
    fn show(&mut self, _classification: &Classification) -> Result<bool> {
        Ok(false)
    }
}

/// Whether a `wait_key` code is the quit key; modifier bits above the low byte are ignored
pub fn is_quit_key(code: i32) -> bool {
    code != -1 && (code & 0xFF) == b'q' as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_key_ignores_modifier_bits() {
        assert!(is_quit_key(b'q' as i32));
        assert!(is_quit_key(0x10_0000 | b'q' as i32));
        assert!(!is_quit_key(b'Q' as i32));
        assert!(!is_quit_key(-1));
    }
}
