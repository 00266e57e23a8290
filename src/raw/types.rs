//! Raw record types produced by the log parser.

use crate::event::Event;
use crate::gamedata::ObjectType;
use crate::task::Point;

/// A single data row of the scene table.
///
/// Fields are kept the way the log spells them; in particular the class is
/// the raw `Name` column and the type has already been classified with
/// [`ObjectType::from_log_token`] (which cannot fail).
#[derive(Clone, Debug, PartialEq)]
pub struct SceneRow {
    /// The object id, unique within the scene.
    pub id: String,
    /// The object class.
    pub class: String,
    /// The engine-internal node id. Parsed but never interpreted.
    pub node_id: String,
    /// The object type.
    pub object_type: ObjectType,
    /// The starting position.
    pub position: Point,
    /// Hit points.
    pub hp: f32,
    /// Damage stat.
    pub damage: f32,
}

/// A completely parsed (raw) gameplay log.
#[derive(Clone, Debug, PartialEq)]
pub struct GameLog {
    /// The player start position from the log header.
    pub player_start: Point,
    /// The scene table rows, in file order. The player is not among them.
    pub scene: Vec<SceneRow>,
    /// The event stream, up to `Session ended` or the end of the file.
    pub events: Vec<Event>,
}
