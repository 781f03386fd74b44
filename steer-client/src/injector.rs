//! Key injection backends.

use std::convert::Infallible;
use steer_core::KeySink;
use steer_shared::{KeyBindings, VirtualKey};

/// Dry-run sink: logs every edge instead of touching the OS
#[derive(Debug, Clone, Default)]
pub struct LogInjector {
    bindings: KeyBindings,
}

impl LogInjector {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }
}

impl KeySink for LogInjector {
    type Error = Infallible;

    fn press(&mut self, key: VirtualKey) -> Result<(), Infallible> {
        log::info!("press {} ({:?})", key, self.bindings.get(key));
        Ok(())
    }

    fn release(&mut self, key: VirtualKey) -> Result<(), Infallible> {
        log::info!("release {} ({:?})", key, self.bindings.get(key));
        Ok(())
    }
}

#[cfg(feature = "inject")]
pub use os::EnigoInjector;

#[cfg(feature = "inject")]
mod os {
    use super::*;
    use anyhow::Result;
    use enigo::{Direction, Enigo, InputError, Key, Keyboard, Settings};
    use steer_shared::KeyCode;

    /// Injects real key events through the OS input API
    pub struct EnigoInjector {
        enigo: Enigo,
        bindings: KeyBindings,
    }

    impl EnigoInjector {
        pub fn new(bindings: KeyBindings) -> Result<Self> {
            let enigo = Enigo::new(&Settings::default())
                .map_err(|e| anyhow::anyhow!("Failed to initialize key injection: {:?}", e))?;
            Ok(Self { enigo, bindings })
        }

        fn emit(&mut self, key: VirtualKey, direction: Direction) -> Result<(), InputError> {
            let code = to_enigo_key(self.bindings.get(key));
            self.enigo.key(code, direction)
        }
    }

    impl KeySink for EnigoInjector {
        type Error = InputError;

        fn press(&mut self, key: VirtualKey) -> Result<(), InputError> {
            self.emit(key, Direction::Press)
        }

        fn release(&mut self, key: VirtualKey) -> Result<(), InputError> {
            self.emit(key, Direction::Release)
        }
    }

    fn to_enigo_key(code: KeyCode) -> Key {
        match code {
            KeyCode::Char(c) => Key::Unicode(c),
            KeyCode::Space => Key::Space,
            KeyCode::Enter => Key::Return,
            KeyCode::Shift => Key::Shift,
            KeyCode::Control => Key::Control,
            KeyCode::Up => Key::UpArrow,
            KeyCode::Down => Key::DownArrow,
            KeyCode::Left => Key::LeftArrow,
            KeyCode::Right => Key::RightArrow,
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_default_bindings_map_to_wasd_and_space() {
            let bindings = KeyBindings::default();
            assert_eq!(to_enigo_key(bindings.forward), Key::Unicode('w'));
            assert_eq!(to_enigo_key(bindings.left), Key::Unicode('a'));
            assert_eq!(to_enigo_key(bindings.backward), Key::Unicode('s'));
            assert_eq!(to_enigo_key(bindings.right), Key::Unicode('d'));
            assert_eq!(to_enigo_key(bindings.boost), Key::Space);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steer_core::{dispatch, KeyEvent};

    #[test]
    fn test_log_injector_accepts_everything() {
        let mut sink = LogInjector::default();
        let events = [
            KeyEvent::press(VirtualKey::Forward),
            KeyEvent::release(VirtualKey::Forward),
        ];
        assert!(dispatch(&events, &mut sink).is_ok());
    }
}
