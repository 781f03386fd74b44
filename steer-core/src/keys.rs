//! Held-key bookkeeping.
//!
//! [`KeyStateController`] owns the only record of which virtual keys are
//! held and turns per-frame targets into press/release edges.

use core::convert::Infallible;

use steer_shared::{KeyAction, KeyEvent, VirtualKey};

pub const KEY_COUNT: usize = VirtualKey::ALL.len();

/// Edges emitted for one frame; at most one per key
pub type KeyEvents = heapless::Vec<KeyEvent, KEY_COUNT>;

/// Keys the current frame wants held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetKeys {
    pub forward: bool,
    pub left: bool,
    pub right: bool,
    pub backward: bool,
    pub boost: bool,
}

impl TargetKeys {
    pub fn get(&self, key: VirtualKey) -> bool {
        match key {
            VirtualKey::Forward => self.forward,
            VirtualKey::Left => self.left,
            VirtualKey::Right => self.right,
            VirtualKey::Backward => self.backward,
            VirtualKey::Boost => self.boost,
        }
    }

    pub fn set(&mut self, key: VirtualKey, held: bool) {
        match key {
            VirtualKey::Forward => self.forward = held,
            VirtualKey::Left => self.left = held,
            VirtualKey::Right => self.right = held,
            VirtualKey::Backward => self.backward = held,
            VirtualKey::Boost => self.boost = held,
        }
    }

    pub fn from_keys(keys: &[VirtualKey]) -> Self {
        let mut target = Self::default();
        for key in keys {
            target.set(*key, true);
        }
        target
    }
}

/// Which virtual keys have been pressed and not yet released
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    held: [bool; KEY_COUNT],
}

impl KeyState {
    pub fn is_held(&self, key: VirtualKey) -> bool {
        self.held[key.index()]
    }

    pub fn any_held(&self) -> bool {
        self.held.iter().any(|held| *held)
    }

    pub fn held_keys(&self) -> impl Iterator<Item = VirtualKey> + '_ {
        VirtualKey::ALL
            .into_iter()
            .filter(move |key| self.is_held(*key))
    }

    fn record(&mut self, event: KeyEvent) {
        let pressed = event.action == KeyAction::Pressed;
        debug_assert_ne!(
            self.is_held(event.key),
            pressed,
            "key state desync on {}",
            event.key
        );
        self.held[event.key.index()] = pressed;
    }
}

/// The key-injection collaborator
pub trait KeySink {
    type Error;

    fn press(&mut self, key: VirtualKey) -> Result<(), Self::Error>;
    fn release(&mut self, key: VirtualKey) -> Result<(), Self::Error>;

    fn send(&mut self, event: KeyEvent) -> Result<(), Self::Error> {
        match event.action {
            KeyAction::Pressed => self.press(event.key),
            KeyAction::Released => self.release(event.key),
        }
    }
}

impl<S: KeySink + ?Sized> KeySink for &mut S {
    type Error = S::Error;

    fn press(&mut self, key: VirtualKey) -> Result<(), Self::Error> {
        (**self).press(key)
    }

    fn release(&mut self, key: VirtualKey) -> Result<(), Self::Error> {
        (**self).release(key)
    }
}

/// Sink that accepts everything; used for the pure `apply` path
struct Detached;

impl KeySink for Detached {
    type Error = Infallible;

    fn press(&mut self, _key: VirtualKey) -> Result<(), Infallible> {
        Ok(())
    }

    fn release(&mut self, _key: VirtualKey) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Forward events to a sink in order, stopping at the first failure
pub fn dispatch<S: KeySink + ?Sized>(events: &[KeyEvent], sink: &mut S) -> Result<(), S::Error> {
    for event in events {
        sink.send(*event)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct KeyStateController {
    state: KeyState,
}

impl KeyStateController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &KeyState {
        &self.state
    }

    /// Move the held state to `target`, returning only the edges needed.
    pub fn apply(&mut self, target: &TargetKeys) -> KeyEvents {
        match self.apply_with(target, &mut Detached) {
            Ok(events) => events,
            Err(never) => match never {},
        }
    }

    /// Like [`apply`](Self::apply), but each edge goes to `sink` before the
    /// state changes. A key whose edge the sink rejects keeps its old state,
    /// so the edge is retried on the next frame. Remaining keys are still
    /// attempted; the first error is returned.
    pub fn apply_with<S: KeySink + ?Sized>(
        &mut self,
        target: &TargetKeys,
        sink: &mut S,
    ) -> Result<KeyEvents, S::Error> {
        let mut events = KeyEvents::new();
        let mut first_error = None;

        for key in VirtualKey::ALL {
            let wanted = target.get(key);
            let event = match (wanted, self.state.is_held(key)) {
                (true, false) => KeyEvent::press(key),
                (false, true) => KeyEvent::release(key),
                _ => continue,
            };

            match sink.send(event) {
                Ok(()) => {
                    self.state.record(event);
                    // capacity is one slot per key
                    let _ = events.push(event);
                }
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(events),
        }
    }

    /// Release every held key. Run this before the sink goes away.
    pub fn release_all(&mut self) -> KeyEvents {
        self.apply(&TargetKeys::default())
    }

    pub fn release_all_with<S: KeySink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<KeyEvents, S::Error> {
        self.apply_with(&TargetKeys::default(), sink)
    }
}
