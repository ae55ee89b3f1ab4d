//! Per-subject alert cooldown.
//!
//! A debounce of one: a subject gets an alert, then nothing until the
//! cooldown has passed since that alert.

use std::collections::HashMap;

/// Last-alert bookkeeping for the speed monitor
///
/// Entries whose last alert is older than the cooldown can no longer
/// suppress anything. They are swept whenever a new subject would push the
/// map past `sweep_threshold`, which bounds the map by the number of
/// subjects alerted within one cooldown window.
#[derive(Debug)]
pub struct AlertThrottle {
    last_alert: HashMap<String, i64>,
    sweep_threshold: usize,
}

impl AlertThrottle {
    /// Create an empty throttle
    pub fn new(sweep_threshold: usize) -> Self {
        Self {
            last_alert: HashMap::new(),
            sweep_threshold: sweep_threshold.max(1),
        }
    }

    /// Claim the right to alert for `subject_id` at `now`
    ///
    /// Returns `false` while the subject's previous alert is less than
    /// `cooldown_millis` old. On `true` the alert time is recorded.
    pub fn try_acquire(&mut self, subject_id: &str, now: i64, cooldown_millis: i64) -> bool {
        match self.last_alert.get_mut(subject_id) {
            Some(last) if now - *last < cooldown_millis => false,
            Some(last) => {
                *last = now;
                true
            }
            None => {
                if self.last_alert.len() >= self.sweep_threshold {
                    let removed = self.sweep(now, cooldown_millis);
                    tracing::debug!(
                        removed,
                        remaining = self.last_alert.len(),
                        "Swept alert history"
                    );
                }
                self.last_alert.insert(subject_id.to_string(), now);
                true
            }
        }
    }

    /// Time of the last alert for a subject
    pub fn last_alert(&self, subject_id: &str) -> Option<i64> {
        self.last_alert.get(subject_id).copied()
    }

    /// Drop entries that are past their cooldown; returns how many went
    pub fn sweep(&mut self, now: i64, cooldown_millis: i64) -> usize {
        let before = self.last_alert.len();
        self.last_alert.retain(|_, last| now - *last < cooldown_millis);
        before - self.last_alert.len()
    }

    /// Forget one subject
    pub fn clear_subject(&mut self, subject_id: &str) -> bool {
        self.last_alert.remove(subject_id).is_some()
    }

    /// Forget everyone
    pub fn clear(&mut self) {
        self.last_alert.clear();
    }

    /// Number of tracked subjects
    pub fn len(&self) -> usize {
        self.last_alert.len()
    }

    /// Whether no subject is tracked
    pub fn is_empty(&self) -> bool {
        self.last_alert.is_empty()
    }
}
