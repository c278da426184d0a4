//! Event Markers
//!
//! One fixed 5-byte record per statement, decision or condition
//! evaluation: the 4 marker ID bytes followed by a tag byte.
//!
//! Decisions and conditions share the wire shape. Which one a record is
//! follows from the ID namespace the instrumenter assigned, not from the
//! bytes.

use super::identity::MarkerId;
use serde::{Deserialize, Serialize};

/// Length of every event record
pub const EVENT_LEN: usize = 5;

/// Tag of a statement record
pub const STATEMENT_TAG: u8 = 0x00;

/// Tag of an evaluation that yielded `true`
pub const TRUE_TAG: u8 = 0xA6;

/// Tag of an evaluation that yielded `false`
pub const FALSE_TAG: u8 = 0x59;

/// A coverage event before serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventMarker {
    /// A statement was reached
    Statement(MarkerId),
    /// A full decision evaluated to the given outcome
    Decision(MarkerId, bool),
    /// One condition inside a decision evaluated to the given outcome
    Condition(MarkerId, bool),
}

impl EventMarker {
    /// Marker ID of the event
    #[inline]
    #[must_use]
    pub const fn id(self) -> MarkerId {
        match self {
            Self::Statement(id) | Self::Decision(id, _) | Self::Condition(id, _) => id,
        }
    }

    /// Serialize to the 5-byte wire record
    #[inline]
    #[must_use]
    pub const fn encode(self) -> [u8; EVENT_LEN] {
        match self {
            Self::Statement(id) => encode_statement(id),
            Self::Decision(id, outcome) | Self::Condition(id, outcome) => {
                encode_evaluation(id, outcome).0
            }
        }
    }
}

/// What a decoded record says, without the decision/condition split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Statement record
    Statement,
    /// Decision or condition record with its outcome
    Evaluation(bool),
}

impl EventKind {
    /// Interpret a tag byte
    #[inline]
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            STATEMENT_TAG => Some(Self::Statement),
            TRUE_TAG => Some(Self::Evaluation(true)),
            FALSE_TAG => Some(Self::Evaluation(false)),
            _ => None,
        }
    }

    /// Tag byte on the wire
    #[inline]
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Statement => STATEMENT_TAG,
            Self::Evaluation(true) => TRUE_TAG,
            Self::Evaluation(false) => FALSE_TAG,
        }
    }
}

/// Encode a statement record.
#[inline]
#[must_use]
pub const fn encode_statement(id: MarkerId) -> [u8; EVENT_LEN] {
    let [b0, b1, b2, b3] = id.as_bytes();
    [b0, b1, b2, b3, STATEMENT_TAG]
}

/// Encode a decision or condition record.
///
/// The outcome is handed back unchanged next to the record so the call can
/// sit inline inside the evaluated expression.
#[inline]
#[must_use]
pub const fn encode_evaluation(id: MarkerId, outcome: bool) -> ([u8; EVENT_LEN], bool) {
    let [b0, b1, b2, b3] = id.as_bytes();
    let tag = if outcome { TRUE_TAG } else { FALSE_TAG };
    ([b0, b1, b2, b3, tag], outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_statement_encoding() {
        let id = MarkerId::new(0xA1, 0xA2, 0xA3, 0xA4);
        assert_eq!(encode_statement(id), [0xA1, 0xA2, 0xA3, 0xA4, 0x00]);
        assert_eq!(EventMarker::Statement(id).encode(), encode_statement(id));
    }

    #[test]
    fn test_evaluation_encoding() {
        let id = MarkerId::new(0x51, 0x52, 0x53, 0x54);
        assert_eq!(
            encode_evaluation(id, true),
            ([0x51, 0x52, 0x53, 0x54, 0xA6], true)
        );
        assert_eq!(
            encode_evaluation(id, false),
            ([0x51, 0x52, 0x53, 0x54, 0x59], false)
        );
    }

    #[test]
    fn test_decision_and_condition_share_wire_shape() {
        let id = MarkerId::new(0x61, 0x62, 0x63, 0x64);
        for outcome in [true, false] {
            assert_eq!(
                EventMarker::Decision(id, outcome).encode(),
                EventMarker::Condition(id, outcome).encode()
            );
        }
    }

    #[test]
    fn test_tags_roundtrip_through_kind() {
        for kind in [
            EventKind::Statement,
            EventKind::Evaluation(true),
            EventKind::Evaluation(false),
        ] {
            assert_eq!(EventKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(EventKind::from_tag(0x01), None);
        assert_eq!(EventKind::from_tag(0xFF), None);
    }

    proptest! {
        #[test]
        fn prop_evaluation_passes_outcome_through(id in any::<[u8; 4]>(), outcome in any::<bool>()) {
            let (record, passed) = encode_evaluation(MarkerId::from_bytes(id), outcome);
            prop_assert_eq!(passed, outcome);
            prop_assert_eq!(&record[..4], &id[..]);
            prop_assert_eq!(EventKind::from_tag(record[4]), Some(EventKind::Evaluation(outcome)));
        }

        #[test]
        fn prop_any_id_is_accepted(id in any::<[u8; 4]>()) {
            let marker = EventMarker::Statement(MarkerId::from_bytes(id));
            prop_assert_eq!(marker.id().as_bytes(), id);
            prop_assert_eq!(marker.encode()[4], STATEMENT_TAG);
        }
    }
}
