//! This module contains functions to parse a gameplay log.
//!
//! # Layout
//!
//! The general layout of a log file is as follows:
//!
//! ```raw
//! Player Start Position: (x,y)
//! ID | Name | Object ID | Type | Position | HP | Damage
//! ---
//! scene rows
//! ---
//! [t] event
//! ...
//! Session ended
//! ```
//!
//! The file is consumed by a state machine keyed on the leftmost token of
//! each line: anything before the `Player Start Position` line is preamble
//! and skipped, the scene table is delimited by two `---` lines, and
//! everything after the second delimiter is an event. `Session ended` (with
//! or without a leading timestamp) or the end of the file closes the stream.
//!
//! # Error handling
//!
//! Errors are wrapped in [`ParseError`]. I/O errors are wrapped as
//! [`ParseError::Io`]. Inside the event section every unrecognized line is an
//! error; a missing `Session ended` marker is not, as logs may simply be
//! truncated at the end of a session.
//!
//! Lines longer than [`MAX_LINE_LEN`] bytes are truncated before parsing.

use std::io::{self, BufRead};

use thiserror::Error;

use super::{GameLog, SceneRow};
use crate::event::{Event, EventKind};
use crate::gamedata::ObjectType;
use crate::task::Point;

/// The maximum number of bytes of a line that are ever looked at.
pub const MAX_LINE_LEN: usize = 4095;

/// The scene table header that opens the scene section.
const SCENE_HEADER: &str = "ID | Name | Object ID | Type | Position | HP | Damage";

/// Any error that can occur while parsing a log.
#[derive(Debug, Error)]
pub enum ParseError {
    /// An I/O error from the underlying reader.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The header or scene table is missing or never terminated.
    #[error("malformed log header")]
    MalformedHeader,
    /// A coordinate pair could not be parsed.
    #[error("malformed coordinate pair: {0}")]
    BadCoordinate(String),
    /// A numeric field could not be parsed.
    #[error("malformed number: {0}")]
    BadNumber(String),
    /// A scene table row does not have the expected shape.
    #[error("malformed scene row: {0}")]
    MalformedSceneRow(String),
    /// An event line has no parseable `[t]` timestamp.
    #[error("malformed event timestamp: {0}")]
    BadTimestamp(String),
    /// An event line has a recognized token but a broken payload.
    #[error("malformed event payload: {0}")]
    MalformedEvent(String),
    /// An event line matches no known event token.
    #[error("unrecognized event line: {0}")]
    UnknownEvent(String),
}

/// A type indicating the parse result.
pub type ParseResult<T> = Result<T, ParseError>;

/// Truncates a line to [`MAX_LINE_LEN`] bytes, on a character boundary.
pub(crate) fn clip_line(line: &str) -> &str {
    if line.len() <= MAX_LINE_LEN {
        return line;
    }
    let mut end = MAX_LINE_LEN;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}

fn parse_float(field: &str) -> ParseResult<f32> {
    field
        .trim()
        .parse()
        .map_err(|_| ParseError::BadNumber(field.trim().to_owned()))
}

/// Parses a coordinate pair.
///
/// Leading whitespace and an optional leading `(` are trimmed, as are
/// trailing whitespace and an optional trailing `)`. The two halves are
/// split on the first `,`.
///
/// * `input` - The textual coordinate pair, e.g. `(1.5, -2)`.
pub fn parse_coords(input: &str) -> ParseResult<Point> {
    let s = input.trim_start();
    let s = s.strip_prefix('(').unwrap_or(s);
    let s = s.trim_end();
    let s = s.strip_suffix(')').unwrap_or(s);
    let comma = s
        .find(',')
        .ok_or_else(|| ParseError::BadCoordinate(input.trim().to_owned()))?;
    let x = s[..comma]
        .trim()
        .parse()
        .map_err(|_| ParseError::BadCoordinate(input.trim().to_owned()))?;
    let y = s[comma + 1..]
        .trim()
        .parse()
        .map_err(|_| ParseError::BadCoordinate(input.trim().to_owned()))?;
    Ok(Point::new(x, y))
}

/// Parses a single scene table row.
///
/// A row consists of 7 `|`-separated fields: id, class, engine node id,
/// type, position, hp and damage. Every field is whitespace-trimmed.
fn parse_scene_row(line: &str) -> ParseResult<SceneRow> {
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    if fields.len() != 7 {
        return Err(ParseError::MalformedSceneRow(line.to_owned()));
    }
    Ok(SceneRow {
        id: fields[0].to_owned(),
        class: fields[1].to_owned(),
        node_id: fields[2].to_owned(),
        object_type: ObjectType::from_log_token(fields[3]),
        position: parse_coords(fields[4])?,
        hp: parse_float(fields[5])?,
        damage: parse_float(fields[6])?,
    })
}

/// Parses the payload of a position update event.
///
/// The payload is a `;`-separated sequence of `ID position: (x,y)` entries.
/// The player entry uses the `Player` literal and may omit the `position:`
/// keyword.
fn parse_tick(tail: &str) -> ParseResult<EventKind> {
    let mut updates = Vec::new();
    for entry in tail.split(';') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (id, coords) = match entry.find("position:") {
            Some(idx) => (entry[..idx].trim(), &entry[idx + "position:".len()..]),
            None => {
                let space = entry
                    .find(char::is_whitespace)
                    .ok_or_else(|| ParseError::MalformedEvent(entry.to_owned()))?;
                (entry[..space].trim(), &entry[space..])
            }
        };
        if id.is_empty() {
            return Err(ParseError::MalformedEvent(entry.to_owned()));
        }
        updates.push((id.to_owned(), parse_coords(coords)?));
    }
    Ok(EventKind::Tick { updates })
}

/// Parses the payload of an attack event.
///
/// The payload has the attacker as its first space-separated token, the
/// damage as its third, and the target id as everything after the first four
/// tokens.
fn parse_attack(rest: &str) -> ParseResult<EventKind> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    if tokens.len() < 5 {
        return Err(ParseError::MalformedEvent(rest.to_owned()));
    }
    Ok(EventKind::Attack {
        attacker: tokens[0].to_owned(),
        target: tokens[4..].join(" "),
        damage: parse_float(tokens[2])?,
    })
}

/// Parses the payload of an attacked event.
///
/// The payload is `,`-separated; the target id is the first token of the
/// first field and the damage is the second field.
fn parse_attacked(rest: &str) -> ParseResult<EventKind> {
    let mut fields = rest.split(',');
    let target = fields
        .next()
        .and_then(|head| head.split_whitespace().next())
        .ok_or_else(|| ParseError::MalformedEvent(rest.to_owned()))?;
    let damage = fields
        .next()
        .ok_or_else(|| ParseError::MalformedEvent(rest.to_owned()))?;
    Ok(EventKind::Attacked {
        target: target.to_owned(),
        damage: parse_float(damage)?,
    })
}

/// Parses the part of an event line after the timestamp.
fn parse_event_tail(tail: &str) -> ParseResult<EventKind> {
    if tail.contains("position:") {
        parse_tick(tail)
    } else if let Some(rest) = tail.strip_prefix("attack ") {
        parse_attack(rest)
    } else if let Some(rest) = tail.strip_prefix("attacked ") {
        parse_attacked(rest)
    } else if tail.contains("died") {
        let victim = tail
            .split_whitespace()
            .next()
            .ok_or_else(|| ParseError::MalformedEvent(tail.to_owned()))?;
        Ok(EventKind::Died {
            victim: victim.to_owned(),
        })
    } else if let Some(value) = tail.strip_prefix("Game Over:") {
        Ok(EventKind::GameOver {
            won: value.trim() == "Win",
        })
    } else {
        Err(ParseError::UnknownEvent(tail.to_owned()))
    }
}

/// Parses a single event line.
///
/// Returns `Ok(None)` for the `Session ended` marker, which closes the
/// stream. The marker is accepted both bare and behind a timestamp.
fn parse_event_line(line: &str) -> ParseResult<Option<Event>> {
    if line.starts_with("Session ended") {
        return Ok(None);
    }
    let rest = line
        .strip_prefix('[')
        .ok_or_else(|| ParseError::UnknownEvent(line.to_owned()))?;
    let close = rest
        .find(']')
        .ok_or_else(|| ParseError::BadTimestamp(line.to_owned()))?;
    let time = rest[..close]
        .trim()
        .parse()
        .map_err(|_| ParseError::BadTimestamp(line.to_owned()))?;
    let tail = rest[close + 1..].trim();
    if tail.starts_with("Session ended") {
        return Ok(None);
    }
    Ok(Some(Event::new(time, parse_event_tail(tail)?)))
}

/// The states of the log state machine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum State {
    /// Waiting for the `Player Start Position` line.
    AwaitPlayerStart,
    /// Waiting for the scene table header.
    AwaitSceneHeader,
    /// Inside the header band, waiting for the first `---`.
    SceneHeaderBand,
    /// Reading scene rows until the second `---`.
    ReadScene,
    /// Reading the event stream.
    ReadEvents,
}

/// Parses a complete gameplay log.
///
/// * `input` - Input stream.
pub fn parse_log<R: BufRead>(input: R) -> ParseResult<GameLog> {
    let mut state = State::AwaitPlayerStart;
    let mut player_start = Point::default();
    let mut scene = Vec::new();
    let mut events = Vec::new();

    for line in input.lines() {
        let line = line?;
        let line = clip_line(&line);
        match state {
            State::AwaitPlayerStart => {
                let trimmed = line.trim_start();
                if let Some(rest) = trimmed.strip_prefix("Player Start Position") {
                    let rest = rest.trim_start();
                    let rest = rest.strip_prefix(':').unwrap_or(rest);
                    player_start = parse_coords(rest)?;
                    state = State::AwaitSceneHeader;
                }
            }
            State::AwaitSceneHeader => {
                if line.trim_start().starts_with(SCENE_HEADER) {
                    state = State::SceneHeaderBand;
                }
            }
            State::SceneHeaderBand => {
                if line.trim_start().starts_with("---") {
                    state = State::ReadScene;
                }
            }
            State::ReadScene => {
                let trimmed = line.trim();
                if trimmed.starts_with("---") {
                    state = State::ReadEvents;
                } else if !trimmed.is_empty() {
                    scene.push(parse_scene_row(trimmed)?);
                }
            }
            State::ReadEvents => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match parse_event_line(trimmed)? {
                    Some(event) => events.push(event),
                    // Session ended, halt the event loop.
                    None => break,
                }
            }
        }
    }

    // A log that never reached its event section has no usable scene.
    if state != State::ReadEvents {
        return Err(ParseError::MalformedHeader);
    }

    Ok(GameLog {
        player_start,
        scene,
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_coords() {
        let point = parse_coords("(1.5, -2)").unwrap();
        assert_eq!(point, Point::new(1.5, -2.0));
        assert_eq!(parse_coords("3,4").unwrap(), Point::new(3.0, 4.0));
        assert_eq!(parse_coords("  ( 0 , 0 )  ").unwrap(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_parse_coords_errors() {
        assert!(matches!(
            parse_coords("12"),
            Err(ParseError::BadCoordinate(_))
        ));
        assert!(matches!(
            parse_coords("(1,)"),
            Err(ParseError::BadCoordinate(_))
        ));
        assert!(matches!(
            parse_coords("(,2)"),
            Err(ParseError::BadCoordinate(_))
        ));
    }

    #[test]
    fn test_clip_line() {
        let short = "abc";
        assert_eq!(clip_line(short), "abc");
        let long = "x".repeat(MAX_LINE_LEN + 10);
        assert_eq!(clip_line(&long).len(), MAX_LINE_LEN);
    }

    #[test]
    fn test_parse_scene_row() {
        let row =
            parse_scene_row("zombie_1 | zombie | n42 | mob | (5,5) | 10 | 1").unwrap();
        assert_eq!(row.id, "zombie_1");
        assert_eq!(row.class, "zombie");
        assert_eq!(row.node_id, "n42");
        assert_eq!(row.object_type, ObjectType::Mob);
        assert_eq!(row.position, Point::new(5.0, 5.0));
        assert_eq!(row.hp, 10.0);
        assert_eq!(row.damage, 1.0);
    }

    #[test]
    fn test_parse_scene_row_wrong_arity() {
        assert!(matches!(
            parse_scene_row("zombie_1 | zombie | mob | (5,5) | 10 | 1"),
            Err(ParseError::MalformedSceneRow(_))
        ));
    }

    #[test]
    fn test_parse_position_event() {
        let event = parse_event_line("[0] Player position: (4,5); zombie_1 position: (5,5)")
            .unwrap()
            .unwrap();
        assert_eq!(event.time(), 0);
        assert_eq!(
            *event.kind(),
            EventKind::Tick {
                updates: vec![
                    ("Player".to_owned(), Point::new(4.0, 5.0)),
                    ("zombie_1".to_owned(), Point::new(5.0, 5.0)),
                ],
            }
        );
    }

    #[test]
    fn test_parse_position_event_player_shorthand() {
        let event = parse_event_line("[3] Player (1,2); zombie_1 position: (5,5)")
            .unwrap()
            .unwrap();
        match event.kind() {
            EventKind::Tick { updates } => {
                assert_eq!(updates[0], ("Player".to_owned(), Point::new(1.0, 2.0)));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_parse_attack_event() {
        let event = parse_event_line("[7] attack Player hits 5.0 at zombie_1")
            .unwrap()
            .unwrap();
        assert_eq!(
            *event.kind(),
            EventKind::Attack {
                attacker: "Player".to_owned(),
                target: "zombie_1".to_owned(),
                damage: 5.0,
            }
        );
    }

    #[test]
    fn test_parse_attacked_event() {
        let event = parse_event_line("[8] attacked zombie_1 by Player, 2.5, hp left 7.5")
            .unwrap()
            .unwrap();
        assert_eq!(
            *event.kind(),
            EventKind::Attacked {
                target: "zombie_1".to_owned(),
                damage: 2.5,
            }
        );
    }

    #[test]
    fn test_parse_died_event() {
        let event = parse_event_line("[9] zombie_1 died").unwrap().unwrap();
        assert_eq!(
            *event.kind(),
            EventKind::Died {
                victim: "zombie_1".to_owned(),
            }
        );
    }

    #[test]
    fn test_parse_game_over() {
        let won = parse_event_line("[100] Game Over: Win").unwrap().unwrap();
        assert_eq!(*won.kind(), EventKind::GameOver { won: true });
        let lost = parse_event_line("[100] Game Over: Defeat").unwrap().unwrap();
        assert_eq!(*lost.kind(), EventKind::GameOver { won: false });
    }

    #[test]
    fn test_parse_session_ended() {
        assert!(parse_event_line("Session ended").unwrap().is_none());
        assert!(parse_event_line("[42] Session ended").unwrap().is_none());
    }

    #[test]
    fn test_parse_unknown_event() {
        assert!(matches!(
            parse_event_line("[1] teleport zombie_1"),
            Err(ParseError::UnknownEvent(_))
        ));
        assert!(matches!(
            parse_event_line("no timestamp here"),
            Err(ParseError::UnknownEvent(_))
        ));
    }

    const SMALL_LOG: &str = "\
Player Start Position: (4,5)
ID | Name | Object ID | Type | Position | HP | Damage
---
zombie_1 | zombie | n1 | mob | (5,5) | 10 | 1
door_1 | door | n2 | interactive_object | (0,0) | 0 | 0
---
[0] Player position: (4,5); zombie_1 position: (5,5)
[1] zombie_1 died
Session ended
[2] this is never read
";

    #[test]
    fn test_parse_log() {
        let log = parse_log(Cursor::new(SMALL_LOG)).unwrap();
        assert_eq!(log.player_start, Point::new(4.0, 5.0));
        assert_eq!(log.scene.len(), 2);
        assert_eq!(log.scene[1].object_type, ObjectType::IntObject);
        assert_eq!(log.events.len(), 2);
    }

    #[test]
    fn test_parse_log_eof_closes_events() {
        let log = parse_log(Cursor::new(
            "Player Start Position: (0,0)\n\
             ID | Name | Object ID | Type | Position | HP | Damage\n\
             ---\n\
             ---\n\
             [0] Game Over: Win\n",
        ))
        .unwrap();
        assert_eq!(log.events.len(), 1);
    }

    #[test]
    fn test_parse_log_missing_scene() {
        assert!(matches!(
            parse_log(Cursor::new("Player Start Position: (0,0)\n")),
            Err(ParseError::MalformedHeader)
        ));
    }
}
