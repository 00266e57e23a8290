//! Event definitions.
//!
//! This module contains the events of the gameplay log in their high-level
//! form. Object references are still textual ids at this stage; they are
//! resolved against the scene when the event is dispatched.
use getset::{CopyGetters, Getters};

use crate::task::Point;

/// A single event line of the log.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct Event {
    /// The timestamp of the event.
    #[get_copy = "pub"]
    time: u64,
    /// The kind of the event.
    #[get = "pub"]
    kind: EventKind,
}

impl Event {
    pub(crate) fn new(time: u64, kind: EventKind) -> Event {
        Event { time, kind }
    }
}

/// A rusty enum for all possible log events.
///
/// The end of the session is not an event: the parser stops at the
/// `Session ended` marker (or at the end of the file).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// A batch of position updates, one per moved object.
    ///
    /// The `Player` literal refers to the synthesized player object; every
    /// other id must name an object from the scene table.
    Tick {
        /// New positions, in the order they appear on the line.
        updates: Vec<(String, Point)>,
    },

    /// An object attacked another object.
    Attack {
        /// The attacker: an object id or the `Player` literal.
        attacker: String,
        /// The id of the attacked object.
        target: String,
        /// The damage dealt.
        damage: f32,
    },

    /// An object took damage.
    Attacked {
        /// The id of the damaged object.
        target: String,
        /// The damage taken.
        damage: f32,
    },

    /// An object was destroyed.
    Died {
        /// The id of the destroyed object.
        victim: String,
    },

    /// The game ended.
    ///
    /// Only a won game feeds the condition engine; any other outcome is
    /// recorded here and then ignored.
    GameOver {
        /// Whether the game was won.
        won: bool,
    },
}
