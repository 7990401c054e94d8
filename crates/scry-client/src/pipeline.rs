//! Change pipeline
//!
//! Two emission disciplines coexist: discrete controls emit immediately,
//! continuous controls are coalesced per element id. The coalescer is an
//! explicit timer resource: staging a value arms (or re-arms) that id's
//! deadline, only the last value staged before the quiescence window
//! elapses is emitted, and entries whose element disappears from the render
//! order are canceled without emission.

use scry_core::{ChangeValue, ElementId, UiState};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// How an emission reaches the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitPolicy {
    /// Sent synchronously with the user action
    Immediate,
    /// Buffered per id until the quiescence window elapses
    Coalesced,
}

/// One value change produced by user interaction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emission {
    pub value: ChangeValue,
    pub policy: EmitPolicy,
}

impl Emission {
    /// An immediate emission of the given value
    pub fn immediate(value: impl Into<ChangeValue>) -> Self {
        Self {
            value: value.into(),
            policy: EmitPolicy::Immediate,
        }
    }

    /// A coalesced emission of the given value
    pub fn coalesced(value: impl Into<ChangeValue>) -> Self {
        Self {
            value: value.into(),
            policy: EmitPolicy::Coalesced,
        }
    }

    /// An immediate stateless activation (button/image click)
    pub fn activation() -> Self {
        Self {
            value: ChangeValue::ACTIVATE,
            policy: EmitPolicy::Immediate,
        }
    }
}

/// Per-element buffered value awaiting its flush deadline
#[derive(Debug, Clone, Copy)]
struct PendingChange {
    value: ChangeValue,
    deadline: Instant,
}

/// Per-id quiescence buffer for continuous controls
#[derive(Debug)]
pub struct Coalescer {
    window: Duration,
    pending: HashMap<ElementId, PendingChange>,
}

impl Coalescer {
    /// Create a coalescer with the given quiescence window
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: HashMap::new(),
        }
    }

    /// The configured quiescence window
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Stage a value for an element, arming or re-arming its deadline
    ///
    /// A later stage for the same id overwrites the buffered value and
    /// pushes the deadline out to `now + window`; ids do not interfere with
    /// each other.
    pub fn stage(&mut self, id: ElementId, value: ChangeValue, now: Instant) {
        self.pending.insert(
            id,
            PendingChange {
                value,
                deadline: now + self.window,
            },
        );
    }

    /// The earliest pending deadline, if any value is buffered
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }

    /// Drain every entry whose deadline has elapsed
    ///
    /// Returned in deadline order; each drained id emits exactly its last
    /// staged value.
    pub fn take_due(&mut self, now: Instant) -> Vec<(ElementId, ChangeValue)> {
        let due_ids: Vec<ElementId> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(id, _)| id.clone())
            .collect();

        let mut due: Vec<(ElementId, PendingChange)> = due_ids
            .into_iter()
            .filter_map(|id| self.pending.remove(&id).map(|p| (id, p)))
            .collect();
        due.sort_by_key(|(_, p)| p.deadline);

        due.into_iter().map(|(id, p)| (id, p.value)).collect()
    }

    /// Cancel entries whose element is no longer in the render order
    ///
    /// Their buffered values are discarded without emission.
    pub fn retain_present(&mut self, state: &UiState) {
        self.pending.retain(|id, _| state.is_ordered(id));
    }

    /// Number of buffered entries
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scry_core::{Element, Widget};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_rapid_updates_keep_last_value_only() {
        let mut coalescer = Coalescer::new(ms(500));
        let start = Instant::now();

        coalescer.stage("s1".into(), 5.0.into(), start);
        coalescer.stage("s1".into(), 6.0.into(), start + ms(100));
        coalescer.stage("s1".into(), 7.0.into(), start + ms(200));

        // Window re-armed by the last update: nothing due at the original deadline
        assert!(coalescer.take_due(start + ms(500)).is_empty());

        let due = coalescer.take_due(start + ms(700));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].0.as_str(), "s1");
        assert_eq!(due[0].1.as_number(), Some(7.0));
        assert!(coalescer.is_empty());
    }

    #[test]
    fn test_ids_do_not_interfere() {
        let mut coalescer = Coalescer::new(ms(500));
        let start = Instant::now();

        coalescer.stage("a".into(), 1.0.into(), start);
        coalescer.stage("b".into(), 2.0.into(), start + ms(300));

        // Only a's window has elapsed
        let due = coalescer.take_due(start + ms(500));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].0.as_str(), "a");

        let due = coalescer.take_due(start + ms(800));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].0.as_str(), "b");
    }

    #[test]
    fn test_next_deadline_is_earliest() {
        let mut coalescer = Coalescer::new(ms(500));
        let start = Instant::now();
        assert!(coalescer.next_deadline().is_none());

        coalescer.stage("late".into(), 1.0.into(), start + ms(100));
        coalescer.stage("early".into(), 2.0.into(), start);

        assert_eq!(coalescer.next_deadline(), Some(start + ms(500)));
    }

    #[test]
    fn test_removed_element_is_canceled() {
        let mut coalescer = Coalescer::new(ms(500));
        let start = Instant::now();

        coalescer.stage("gone".into(), 3.0.into(), start);
        coalescer.stage("kept".into(), 4.0.into(), start);

        let state = UiState::new().with_element(Element::new(
            "kept",
            Widget::Slider {
                value: 4.0,
                min: 0.0,
                max: 10.0,
            },
        ));
        coalescer.retain_present(&state);

        let due = coalescer.take_due(start + ms(500));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].0.as_str(), "kept");
    }
}
