//! In-memory representation of tasks.
//!
//! A [`Task`] is a named bundle of scene expectations ([`BaseObject`],
//! [`ObjectRequirement`]) and behavioral [`Condition`]s. The model is purely
//! data: it is constructed once by the [config loader][crate::config] and
//! never mutated afterwards. Everything that changes during a check (which
//! base objects have been matched, how many objects a requirement has found)
//! lives in per-check scratch owned by the check invocation, so a single
//! [`Checker`][crate::Checker] can safely drive any number of checks.

use getset::{CopyGetters, Getters};

use crate::gamedata::{ConditionKind, ObjectType};

/// Tolerance for position and stat comparisons.
///
/// Two coordinates are considered equal when they differ by no more than
/// this, per component.
pub const FLOAT_TOLERANCE: f32 = 0.001;

/// A point on the scene plane.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Creates a new point.
    pub fn new(x: f32, y: f32) -> Point {
        Point { x, y }
    }

    /// Tolerant equality, component-wise within [`FLOAT_TOLERANCE`].
    pub fn approx_eq(self, other: Point) -> bool {
        (self.x - other.x).abs() <= FLOAT_TOLERANCE && (self.y - other.y).abs() <= FLOAT_TOLERANCE
    }

    /// Euclidean distance to another point.
    pub fn dist(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// An object that must exist in the scene with the stated attributes.
///
/// Any of class, position, hp and damage may be left unconstrained in the
/// configuration: an empty class and a missing position constrain nothing,
/// and a zero hp or damage likewise means "do not compare".
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct BaseObject {
    /// The required object type.
    #[get_copy = "pub"]
    object_type: ObjectType,
    /// The required class, or empty for any class.
    #[get = "pub"]
    class: String,
    /// The required position, or `None` for any position.
    #[get_copy = "pub"]
    position: Option<Point>,
    /// The required hit points; zero compares equal to anything.
    #[get_copy = "pub"]
    hp: f32,
    /// The required damage stat; zero compares equal to anything.
    #[get_copy = "pub"]
    damage: f32,
}

impl BaseObject {
    pub(crate) fn new(
        object_type: ObjectType,
        class: String,
        position: Option<Point>,
        hp: f32,
        damage: f32,
    ) -> BaseObject {
        BaseObject {
            object_type,
            class,
            position,
            hp,
            damage,
        }
    }
}

/// A cardinality constraint on scene objects of a given type and class.
///
/// Scene validation counts the runtime objects matching `object_type` and
/// `class` and requires `minimum <= count <= limit`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct ObjectRequirement {
    /// The counted object type.
    #[get_copy = "pub"]
    object_type: ObjectType,
    /// The counted class.
    #[get = "pub"]
    class: String,
    /// The least number of matching objects.
    #[get_copy = "pub"]
    minimum: u8,
    /// The greatest number of matching objects.
    #[get_copy = "pub"]
    limit: u8,
}

impl ObjectRequirement {
    pub(crate) fn new(
        object_type: ObjectType,
        class: String,
        minimum: u8,
        limit: u8,
    ) -> ObjectRequirement {
        ObjectRequirement {
            object_type,
            class,
            minimum,
            limit,
        }
    }
}

/// An object filter used by a condition: a type together with an optional
/// class constraint.
///
/// The type may be absent for kinds that do not select an object at all
/// (e.g. a win condition). An empty class matches any class; players always
/// match regardless of class.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct Selector {
    /// The selected object type, if the condition kind needs one.
    #[get_copy = "pub"]
    object_type: Option<ObjectType>,
    /// The selected class, or empty for any class.
    #[get = "pub"]
    class: String,
}

impl Selector {
    pub(crate) fn new(object_type: Option<ObjectType>, class: String) -> Selector {
        Selector { object_type, class }
    }
}

/// A single behavioral condition of a task.
///
/// Conditions carry a 1-based ordinal `n` that doubles as their bit position
/// in the result byte. At most one further condition can be AND-combined via
/// [`second`][Condition::second]; the nested condition never nests again.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct Condition {
    /// The 1-based condition ordinal.
    #[get_copy = "pub"]
    n: u8,
    /// What this condition tests.
    #[get_copy = "pub"]
    kind: ConditionKind,
    /// The primary object filter.
    #[get = "pub"]
    primary: Selector,
    /// The secondary object filter.
    #[get = "pub"]
    secondary: Selector,
    /// Numeric argument (a distance or a damage bound); zero when unused.
    #[get_copy = "pub"]
    arg: f32,
    /// The AND-combined partner condition, if any.
    second: Option<Box<Condition>>,
}

impl Condition {
    pub(crate) fn new(
        n: u8,
        kind: ConditionKind,
        primary: Selector,
        secondary: Selector,
        arg: f32,
    ) -> Condition {
        Condition {
            n,
            kind,
            primary,
            secondary,
            arg,
            second: None,
        }
    }

    /// The AND-combined partner condition, if any.
    pub fn second(&self) -> Option<&Condition> {
        self.second.as_deref()
    }

    pub(crate) fn set_second(&mut self, second: Condition) {
        self.second = Some(Box::new(second));
    }
}

/// A named bundle of scene expectations and conditions.
///
/// Invariants upheld by the loader: a task has between 1 and
/// [`MAX_CONDITIONS`][crate::gamedata::MAX_CONDITIONS] conditions, their
/// ordinals are strictly increasing, and only the single AND pair ever
/// duplicates an ordinal.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Task {
    /// The task name, as given by the manifest key.
    #[get = "pub"]
    name: String,
    /// The objects that must exist in the scene.
    #[get = "pub"]
    base_objects: Vec<BaseObject>,
    /// The cardinality constraints on the scene.
    #[get = "pub"]
    requirements: Vec<ObjectRequirement>,
    /// The conditions to evaluate, in ascending ordinal order.
    #[get = "pub"]
    conditions: Vec<Condition>,
}

impl Task {
    pub(crate) fn new(
        name: String,
        base_objects: Vec<BaseObject>,
        requirements: Vec<ObjectRequirement>,
        conditions: Vec<Condition>,
    ) -> Task {
        Task {
            name,
            base_objects,
            requirements,
            conditions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_approx_eq() {
        let a = Point::new(1.0, 2.0);
        assert!(a.approx_eq(Point::new(1.0005, 2.0)));
        assert!(a.approx_eq(Point::new(1.0, 1.999)));
        assert!(!a.approx_eq(Point::new(1.002, 2.0)));
    }

    #[test]
    fn test_point_dist() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.dist(b) - 5.0).abs() < f32::EPSILON);
        assert_eq!(a.dist(a), 0.0);
    }

    #[test]
    fn test_condition_second_single_level() {
        let mut outer = Condition::new(
            1,
            ConditionKind::Approaching,
            Selector::new(Some(ObjectType::Player), String::new()),
            Selector::new(Some(ObjectType::Mob), "zombie".to_owned()),
            0.0,
        );
        assert!(outer.second().is_none());
        outer.set_second(Condition::new(
            1,
            ConditionKind::Proximity,
            Selector::new(Some(ObjectType::Player), String::new()),
            Selector::new(Some(ObjectType::Mob), "zombie".to_owned()),
            3.0,
        ));
        let second = outer.second().unwrap();
        assert_eq!(second.kind(), ConditionKind::Proximity);
        assert!(second.second().is_none());
    }
}
