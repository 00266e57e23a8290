//! Condition evaluation.
//!
//! This module decides which conditions a single event satisfies, and by
//! which object. Evaluation is split in two: [`evaluate`] tests one
//! condition against the current scene and the event payload and returns the
//! crediting actor, and the [`SatisfactionMatrix`] records these credits
//! under the precedence policy described on [`SatisfactionMatrix::record`].

use crate::gamedata::{ConditionKind, ObjectType, MAX_CONDITIONS};
use crate::object::{RuntimeObject, Scene};
use crate::task::{Condition, Selector};

/// The payload of an event, with object references resolved to scene
/// indices.
///
/// Position updates and other payload-free events use [`EventContext::TICK`];
/// conditions that are pure world-state queries ignore the context entirely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventContext {
    /// The acting object (attacker, victim, damage taker).
    pub primary: Option<usize>,
    /// The acted-on object (attack target).
    pub secondary: Option<usize>,
    /// The numeric payload, e.g. the damage dealt.
    pub arg: f32,
    /// Whether this event reports a won game.
    pub won: bool,
}

impl EventContext {
    /// The empty context: no payload, no winner.
    pub const TICK: EventContext = EventContext {
        primary: None,
        secondary: None,
        arg: 0.0,
        won: false,
    };
}

/// The object(s) credited with satisfying a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// A single object, by scene index.
    One(usize),
    /// Every object of the scene. Produced only by win conditions.
    All,
}

/// Checks whether an object passes a condition selector.
///
/// The type must be equal; the class must be equal when the selector names
/// one. Players carry no class and always pass the class check. A selector
/// without a type selects nothing.
fn selector_matches(selector: &Selector, object: &RuntimeObject) -> bool {
    match selector.object_type() {
        Some(object_type) => {
            object.object_type() == object_type
                && (object_type == ObjectType::Player
                    || selector.class().is_empty()
                    || object.class() == selector.class())
        }
        None => false,
    }
}

/// Searches for an ordered pair of distinct objects matching the two
/// selectors and passing the given distance test.
fn find_pair<F>(scene: &Scene, condition: &Condition, accept: F) -> Option<usize>
where
    F: Fn(&RuntimeObject, &RuntimeObject) -> bool,
{
    let objects = scene.objects();
    for (i, first) in objects.iter().enumerate() {
        if !selector_matches(condition.primary(), first) {
            continue;
        }
        for (j, second) in objects.iter().enumerate() {
            if i == j || !selector_matches(condition.secondary(), second) {
                continue;
            }
            if accept(first, second) {
                return Some(i);
            }
        }
    }
    None
}

/// Tests a single condition, ignoring its AND partner.
fn evaluate_single(condition: &Condition, scene: &Scene, ctx: &EventContext) -> Option<Actor> {
    match condition.kind() {
        ConditionKind::Proximity => find_pair(scene, condition, |first, second| {
            first.pos().dist(second.pos()) <= condition.arg()
        })
        .map(Actor::One),
        ConditionKind::Approaching => find_pair(scene, condition, |first, second| {
            first.pos().dist(second.pos()) < first.prev_pos().dist(second.prev_pos())
        })
        .map(Actor::One),
        ConditionKind::Retiring => find_pair(scene, condition, |first, second| {
            first.pos().dist(second.pos()) > first.prev_pos().dist(second.prev_pos())
        })
        .map(Actor::One),
        ConditionKind::Moving => scene
            .objects()
            .iter()
            .position(|object| {
                selector_matches(condition.primary(), object)
                    && object.pos().dist(object.prev_pos()) > 0.0
            })
            .map(Actor::One),
        ConditionKind::GameWon => ctx.won.then_some(Actor::All),
        ConditionKind::Attacked => {
            let primary = ctx.primary?;
            let secondary = ctx.secondary?;
            let matched = selector_matches(condition.primary(), &scene.objects()[primary])
                && selector_matches(condition.secondary(), &scene.objects()[secondary])
                && condition.arg() >= ctx.arg;
            matched.then_some(Actor::One(primary))
        }
        ConditionKind::Damaged => {
            let primary = ctx.primary?;
            let matched = selector_matches(condition.primary(), &scene.objects()[primary])
                && condition.arg() >= ctx.arg;
            matched.then_some(Actor::One(primary))
        }
        ConditionKind::Destroyed => {
            let primary = ctx.primary?;
            selector_matches(condition.primary(), &scene.objects()[primary])
                .then_some(Actor::One(primary))
        }
    }
}

/// Tests a condition against the scene and an event payload.
///
/// Returns the actor to credit, or `None` if the condition does not match.
/// If the condition carries an AND partner, the partner is tested against
/// the current world state only (an empty context), and both must match;
/// the credited actor is the outer condition's.
pub fn evaluate(condition: &Condition, scene: &Scene, ctx: &EventContext) -> Option<Actor> {
    let actor = evaluate_single(condition, scene, ctx)?;
    if let Some(second) = condition.second() {
        evaluate_single(second, scene, &EventContext::TICK)?;
    }
    Some(actor)
}

/// The condition × object satisfaction grid of one check invocation.
///
/// Rows are condition ordinals (0-based), columns are scene object indices.
/// Cells only ever transition from unset to set.
#[derive(Debug, Clone, PartialEq)]
pub struct SatisfactionMatrix {
    rows: Vec<Vec<bool>>,
}

impl SatisfactionMatrix {
    /// Creates an empty matrix for a scene with the given object count.
    pub fn new(objects: usize) -> SatisfactionMatrix {
        SatisfactionMatrix {
            rows: vec![vec![false; objects]; MAX_CONDITIONS],
        }
    }

    /// Whether the cell at the given row and object index is set.
    pub fn is_set(&self, row: usize, object: usize) -> bool {
        self.rows[row][object]
    }

    fn later_satisfied(&self, row: usize, object: usize) -> bool {
        self.rows[row + 1..].iter().any(|cells| cells[object])
    }

    /// Credits an actor with satisfying the condition in the given row.
    ///
    /// Recording follows the no-later-wins rule: an object that has already
    /// been credited to a higher-numbered condition is not newly credited to
    /// a lower-numbered one. Higher-numbered conditions take precedence;
    /// cells that are already set stay set.
    pub fn record(&mut self, row: usize, actor: Actor) {
        match actor {
            Actor::One(object) => {
                if !self.later_satisfied(row, object) {
                    self.rows[row][object] = true;
                }
            }
            Actor::All => {
                for object in 0..self.rows[row].len() {
                    if !self.later_satisfied(row, object) {
                        self.rows[row][object] = true;
                    }
                }
            }
        }
    }

    /// Folds the matrix to the result byte.
    ///
    /// Bit `i` is set iff any object satisfied the condition with ordinal
    /// `i + 1`. The high bit is never set.
    pub fn result_byte(&self) -> u8 {
        let mut result = 0u8;
        for (row, cells) in self.rows.iter().enumerate() {
            if cells.iter().any(|&cell| cell) {
                result |= 1 << row;
            }
        }
        result
    }
}
