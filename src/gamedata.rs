//! This module contains the closed vocabularies of the task configuration:
//! object types and condition kinds, together with their textual forms.
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use thiserror::Error;

/// The maximum number of conditions a single task may carry.
///
/// The result of a check is a 7-bit mask, one bit per condition ordinal, with
/// the high bit of the byte reserved. A task with more conditions than this
/// is rejected at load time.
pub const MAX_CONDITIONS: usize = 7;

/// The type of a scene object.
///
/// Both the task configuration and the gameplay log classify objects with
/// this enum, but they use different vocabularies: the configuration writes
/// `player`/`mob`/`intobj`/`static` (parsed strictly via [`FromStr`]), while
/// the log writes `mob`/`interactive_object` and treats every other token as
/// scenery (see [`ObjectType::from_log_token`]). The single player is never
/// spelled out in the scene table; it is synthesized from the `Player`
/// literal in the log.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ObjectType {
    /// The player character.
    Player,
    /// A hostile or neutral creature.
    Mob,
    /// An object the player can interact with.
    IntObject,
    /// Scenery with no behavior of its own.
    Static,
}

impl ObjectType {
    /// Classifies a type token from the scene table of a log.
    ///
    /// Unlike the configuration vocabulary this never fails: anything that is
    /// not a known token is scenery.
    pub fn from_log_token(token: &str) -> ObjectType {
        match token {
            "mob" => ObjectType::Mob,
            "interactive_object" => ObjectType::IntObject,
            _ => ObjectType::Static,
        }
    }
}

/// Error for when converting a string to an object type fails.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Error)]
#[error("Invalid object type: {0}")]
pub struct ParseObjectTypeError(String);

impl FromStr for ObjectType {
    type Err = ParseObjectTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "player" => Ok(ObjectType::Player),
            "mob" => Ok(ObjectType::Mob),
            "intobj" => Ok(ObjectType::IntObject),
            "static" => Ok(ObjectType::Static),
            _ => Err(ParseObjectTypeError(s.to_owned())),
        }
    }
}

impl Display for ObjectType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = match *self {
            ObjectType::Player => "player",
            ObjectType::Mob => "mob",
            ObjectType::IntObject => "intobj",
            ObjectType::Static => "static",
        };
        write!(f, "{}", name)
    }
}

/// The kind of a behavioral condition.
///
/// Each kind is a predicate over the scene state and/or a single event; the
/// exact semantics are implemented by
/// [`evaluate`][crate::analyzer::evaluate].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    /// A primary object is within a given distance of a secondary object.
    Proximity,
    /// A primary object moved towards a secondary object.
    Approaching,
    /// A primary object moved away from a secondary object.
    Retiring,
    /// A primary object changed its position.
    Moving,
    /// The game ended with a win.
    GameWon,
    /// A primary object attacked a secondary object for at most the given
    /// damage.
    Attacked,
    /// A primary object took at most the given damage.
    Damaged,
    /// A primary object was destroyed.
    Destroyed,
}

impl ConditionKind {
    /// Whether this kind is a pure world-state query.
    ///
    /// World-state kinds only look at object positions and can match on any
    /// event; the remaining kinds need an event payload.
    pub fn is_positional(self) -> bool {
        matches!(
            self,
            ConditionKind::Proximity
                | ConditionKind::Approaching
                | ConditionKind::Retiring
                | ConditionKind::Moving
        )
    }
}

/// Error for when converting a string to a condition kind fails.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Error)]
#[error("Invalid condition kind: {0}")]
pub struct ParseConditionKindError(String);

impl FromStr for ConditionKind {
    type Err = ParseConditionKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "proxy" => Ok(ConditionKind::Proximity),
            "approach" => Ok(ConditionKind::Approaching),
            "retire" => Ok(ConditionKind::Retiring),
            "move" => Ok(ConditionKind::Moving),
            "win" => Ok(ConditionKind::GameWon),
            "attack" => Ok(ConditionKind::Attacked),
            "damage" => Ok(ConditionKind::Damaged),
            "destroy" => Ok(ConditionKind::Destroyed),
            _ => Err(ParseConditionKindError(s.to_owned())),
        }
    }
}

impl Display for ConditionKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = match *self {
            ConditionKind::Proximity => "proxy",
            ConditionKind::Approaching => "approach",
            ConditionKind::Retiring => "retire",
            ConditionKind::Moving => "move",
            ConditionKind::GameWon => "win",
            ConditionKind::Attacked => "attack",
            ConditionKind::Damaged => "damage",
            ConditionKind::Destroyed => "destroy",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_type_parsing_ok() {
        use ObjectType::*;
        let tests: &[(&'static str, ObjectType)] = &[
            ("player", Player),
            ("mob", Mob),
            ("intobj", IntObject),
            ("static", Static),
        ];

        for (input, expected) in tests {
            assert_eq!(input.parse(), Ok(*expected), "parsing {:?}", input);
        }
    }

    #[test]
    fn test_object_type_parsing_err() {
        let tests = &["", "Player", "interactive_object", "zombie"];
        for test in tests {
            assert!(
                test.parse::<ObjectType>().is_err(),
                "{:?} should not parse",
                test
            );
        }
    }

    #[test]
    fn test_object_type_from_log_token() {
        assert_eq!(ObjectType::from_log_token("mob"), ObjectType::Mob);
        assert_eq!(
            ObjectType::from_log_token("interactive_object"),
            ObjectType::IntObject
        );
        assert_eq!(ObjectType::from_log_token("tree"), ObjectType::Static);
        assert_eq!(ObjectType::from_log_token(""), ObjectType::Static);
    }

    #[test]
    fn test_condition_kind_parsing_ok() {
        use ConditionKind::*;
        let tests: &[(&'static str, ConditionKind)] = &[
            ("proxy", Proximity),
            ("approach", Approaching),
            ("retire", Retiring),
            ("move", Moving),
            ("win", GameWon),
            ("attack", Attacked),
            ("damage", Damaged),
            ("destroy", Destroyed),
        ];

        for (input, expected) in tests {
            assert_eq!(input.parse(), Ok(*expected), "parsing {:?}", input);
        }
    }

    #[test]
    fn test_condition_kind_parsing_err() {
        let tests = &["", "proximity", "WIN", "died"];
        for test in tests {
            assert!(
                test.parse::<ConditionKind>().is_err(),
                "{:?} should not parse",
                test
            );
        }
    }

    #[test]
    fn test_positional_kinds() {
        assert!(ConditionKind::Proximity.is_positional());
        assert!(ConditionKind::Moving.is_positional());
        assert!(!ConditionKind::GameWon.is_positional());
        assert!(!ConditionKind::Destroyed.is_positional());
    }

    #[test]
    fn test_roundtrip_display() {
        let kinds = [
            ConditionKind::Proximity,
            ConditionKind::Approaching,
            ConditionKind::Retiring,
            ConditionKind::Moving,
            ConditionKind::GameWon,
            ConditionKind::Attacked,
            ConditionKind::Damaged,
            ConditionKind::Destroyed,
        ];
        for kind in kinds {
            assert_eq!(kind.to_string().parse::<ConditionKind>(), Ok(kind));
        }
    }
}
