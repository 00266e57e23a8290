//! Runtime scene objects.
//!
//! A [`Scene`] is materialized from the scene table of a parsed log plus the
//! synthesized player, owned by a single check invocation and discarded when
//! the check returns. Positions are the only thing that changes while the
//! event stream is replayed; everything else is fixed at materialization.

use getset::{CopyGetters, Getters};
use tracing::debug;

use crate::gamedata::ObjectType;
use crate::raw::GameLog;
use crate::task::{Point, Task, FLOAT_TOLERANCE};
use crate::CheckError;

/// The literal that identifies the player in the event stream.
pub(crate) const PLAYER_TOKEN: &str = "Player";

/// An object of the running scene.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct RuntimeObject {
    /// The object type.
    #[get_copy = "pub"]
    object_type: ObjectType,
    /// The object class. Empty for the player.
    #[get = "pub"]
    class: String,
    /// The object id. Empty for the player, who is addressed by the
    /// `Player` literal instead.
    #[get = "pub"]
    id: String,
    /// The current position.
    #[get_copy = "pub"]
    pos: Point,
    /// The position before the most recent update.
    #[get_copy = "pub"]
    prev_pos: Point,
    /// Hit points, as reported by the scene table.
    #[get_copy = "pub"]
    hp: f32,
    /// Damage stat, as reported by the scene table.
    #[get_copy = "pub"]
    damage: f32,
    /// Whether a base object has claimed this object during validation.
    #[get_copy = "pub"]
    valid: bool,
}

impl RuntimeObject {
    /// Moves the object, remembering the previous position.
    fn update_position(&mut self, pos: Point) {
        self.prev_pos = self.pos;
        self.pos = pos;
    }
}

/// The materialized object set of one check invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    objects: Vec<RuntimeObject>,
    player: usize,
}

impl Scene {
    /// Builds the scene from a parsed log.
    ///
    /// The player is appended after the scene table rows, so its index is
    /// always the highest one.
    pub fn from_log(log: &GameLog) -> Scene {
        let mut objects: Vec<RuntimeObject> = log
            .scene
            .iter()
            .map(|row| RuntimeObject {
                object_type: row.object_type,
                class: row.class.clone(),
                id: row.id.clone(),
                pos: row.position,
                prev_pos: row.position,
                hp: row.hp,
                damage: row.damage,
                valid: false,
            })
            .collect();
        objects.push(RuntimeObject {
            object_type: ObjectType::Player,
            class: String::new(),
            id: String::new(),
            pos: log.player_start,
            prev_pos: log.player_start,
            hp: 0.0,
            damage: 0.0,
            valid: false,
        });
        let player = objects.len() - 1;
        Scene { objects, player }
    }

    /// All objects of the scene, the player last.
    pub fn objects(&self) -> &[RuntimeObject] {
        &self.objects
    }

    /// The index of the player object.
    pub fn player_index(&self) -> usize {
        self.player
    }

    /// Resolves an id token from the event stream to an object index.
    ///
    /// The `Player` literal resolves to the synthesized player; everything
    /// else is looked up by id.
    pub fn resolve(&self, token: &str) -> Option<usize> {
        if token == PLAYER_TOKEN {
            return Some(self.player);
        }
        self.objects.iter().position(|object| object.id == token)
    }

    pub(crate) fn update_position(&mut self, index: usize, pos: Point) {
        self.objects[index].update_position(pos);
    }

    /// Checks the scene against the expectations of a task.
    ///
    /// Every base object must claim a distinct runtime object matching its
    /// constrained attributes (greedy, in scene order), and every
    /// requirement must count a number of matching objects within its
    /// bounds. The claim markers live on the scene, which is per-check
    /// scratch, so the task itself stays untouched.
    pub(crate) fn validate(&mut self, task: &Task) -> Result<(), CheckError> {
        for base in task.base_objects() {
            let found = self.objects.iter().position(|object| {
                !object.valid
                    && object.object_type == base.object_type()
                    && (base.class().is_empty() || object.class == *base.class())
                    && base
                        .position()
                        .map_or(true, |position| position.approx_eq(object.pos))
                    && (base.hp() == 0.0 || (base.hp() - object.hp).abs() <= FLOAT_TOLERANCE)
                    && (base.damage() == 0.0
                        || (base.damage() - object.damage).abs() <= FLOAT_TOLERANCE)
            });
            match found {
                Some(index) => self.objects[index].valid = true,
                None => {
                    return Err(CheckError::SceneMismatch(format!(
                        "no scene object matches required {} {:?}",
                        base.object_type(),
                        base.class(),
                    )))
                }
            }
        }

        for requirement in task.requirements() {
            let found = self
                .objects
                .iter()
                .filter(|object| {
                    object.object_type == requirement.object_type()
                        && (requirement.class().is_empty()
                            || object.class == *requirement.class())
                })
                .count();
            if found < usize::from(requirement.minimum()) || found > usize::from(requirement.limit())
            {
                return Err(CheckError::SceneMismatch(format!(
                    "expected between {} and {} objects of {} {:?}, found {}",
                    requirement.minimum(),
                    requirement.limit(),
                    requirement.object_type(),
                    requirement.class(),
                    found,
                )));
            }
        }

        debug!(
            objects = self.objects.len(),
            task = task.name().as_str(),
            "scene validated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::SceneRow;

    fn sample_log() -> GameLog {
        GameLog {
            player_start: Point::new(4.0, 5.0),
            scene: vec![
                SceneRow {
                    id: "zombie_1".to_owned(),
                    class: "zombie".to_owned(),
                    node_id: "n1".to_owned(),
                    object_type: ObjectType::Mob,
                    position: Point::new(5.0, 5.0),
                    hp: 10.0,
                    damage: 1.0,
                },
                SceneRow {
                    id: "door_1".to_owned(),
                    class: "door".to_owned(),
                    node_id: "n2".to_owned(),
                    object_type: ObjectType::IntObject,
                    position: Point::new(0.0, 0.0),
                    hp: 0.0,
                    damage: 0.0,
                },
            ],
            events: Vec::new(),
        }
    }

    #[test]
    fn test_scene_synthesizes_player() {
        let scene = Scene::from_log(&sample_log());
        assert_eq!(scene.objects().len(), 3);
        let player = &scene.objects()[scene.player_index()];
        assert_eq!(player.object_type(), ObjectType::Player);
        assert_eq!(player.id(), "");
        assert_eq!(player.pos(), Point::new(4.0, 5.0));
        assert_eq!(player.prev_pos(), Point::new(4.0, 5.0));
    }

    #[test]
    fn test_scene_resolve() {
        let scene = Scene::from_log(&sample_log());
        assert_eq!(scene.resolve("zombie_1"), Some(0));
        assert_eq!(scene.resolve("door_1"), Some(1));
        assert_eq!(scene.resolve("Player"), Some(2));
        assert_eq!(scene.resolve("ghost"), None);
    }

    #[test]
    fn test_update_position_remembers_previous() {
        let mut scene = Scene::from_log(&sample_log());
        scene.update_position(0, Point::new(6.0, 6.0));
        let zombie = &scene.objects()[0];
        assert_eq!(zombie.prev_pos(), Point::new(5.0, 5.0));
        assert_eq!(zombie.pos(), Point::new(6.0, 6.0));
    }
}
