// SPDX-License-Identifier: MIT OR Apache-2.0
//! Short-lived debug messages.
//!
//! Messages carry an absolute expiry time and are polled every tick rather
//! than scheduled individually.

use crate::broadcast::Broadcast;

/// Lifetime used by [`DebugOverlay::add_message`], roughly one frame
pub const DEFAULT_MESSAGE_LIFETIME: f64 = 0.001;

/// A message and the time it stops being shown
#[derive(Debug, Clone, PartialEq)]
pub struct DebugMessage {
    /// Message text
    pub text: String,
    /// Runtime clock time in seconds after which the message is dropped
    pub expires_at: f64,
}

/// Collects debug messages and announces changes to the visible set
#[derive(Debug, Default)]
pub struct DebugOverlay {
    messages: Vec<DebugMessage>,
    now: f64,
    changed: Broadcast<Vec<String>>,
}

impl DebugOverlay {
    /// Create an empty overlay
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel receiving the visible texts whenever they change
    pub fn on_change(&self) -> &Broadcast<Vec<String>> {
        &self.changed
    }

    /// Add a message shown for [`DEFAULT_MESSAGE_LIFETIME`]
    pub fn add_message(&mut self, text: impl Into<String>) {
        self.add_message_for(text, DEFAULT_MESSAGE_LIFETIME);
    }

    /// Add a message shown for `lifetime` seconds
    pub fn add_message_for(&mut self, text: impl Into<String>, lifetime: f64) {
        self.messages.push(DebugMessage {
            text: text.into(),
            expires_at: self.now + lifetime,
        });
        self.changed.broadcast(&self.messages());
    }

    /// Visible message texts, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.messages.iter().map(|m| m.text.clone()).collect()
    }

    /// Raw messages with expiry times
    pub fn entries(&self) -> &[DebugMessage] {
        &self.messages
    }

    /// Current clock as seen by the overlay
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Advance the clock to `now` and drop expired messages.
    ///
    /// Broadcasts only when something was dropped.
    pub fn tick(&mut self, now: f64) {
        self.now = now;
        let mut removed = false;
        for i in (0..self.messages.len()).rev() {
            if now > self.messages[i].expires_at {
                self.messages.remove(i);
                removed = true;
            }
        }
        if removed {
            self.changed.broadcast(&self.messages());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(overlay: &DebugOverlay) -> Rc<RefCell<Vec<Vec<String>>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        overlay.on_change().add(move |messages| {
            sink.borrow_mut().push(messages.clone());
            Ok(())
        });
        seen
    }

    #[test]
    fn test_message_visible_until_expiry() {
        let mut overlay = DebugOverlay::new();
        overlay.tick(10.0);
        overlay.add_message_for("hello", 1.0);
        assert_eq!(overlay.messages(), vec!["hello".to_string()]);
        assert_eq!(overlay.entries()[0].expires_at, 11.0);

        overlay.tick(10.5);
        assert_eq!(overlay.messages().len(), 1);

        overlay.tick(11.5);
        assert!(overlay.messages().is_empty());
    }

    #[test]
    fn test_broadcasts_on_add_and_on_expiry_only() {
        let mut overlay = DebugOverlay::new();
        let seen = recorder(&overlay);

        overlay.add_message_for("a", 1.0);
        overlay.add_message_for("b", 3.0);
        assert_eq!(seen.borrow().len(), 2);

        overlay.tick(0.5);
        assert_eq!(seen.borrow().len(), 2);

        overlay.tick(2.0);
        assert_eq!(seen.borrow().len(), 3);
        assert_eq!(seen.borrow()[2], vec!["b".to_string()]);

        overlay.tick(2.5);
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn test_default_lifetime_lasts_one_tick() {
        let mut overlay = DebugOverlay::new();
        overlay.tick(1.0);
        overlay.add_message("pointer");
        overlay.tick(1.0 + 1.0 / 60.0);
        assert!(overlay.messages().is_empty());
    }

    #[test]
    fn test_removes_several_expired_in_one_tick() {
        let mut overlay = DebugOverlay::new();
        let seen = recorder(&overlay);
        overlay.add_message_for("x", 0.1);
        overlay.add_message_for("keep", 5.0);
        overlay.add_message_for("y", 0.2);

        overlay.tick(1.0);
        assert_eq!(overlay.messages(), vec!["keep".to_string()]);
        assert_eq!(seen.borrow().len(), 4);
    }
}
