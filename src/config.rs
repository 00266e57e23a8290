//! Task configuration loading.
//!
//! The configuration is a two-level format. The top-level manifest maps a
//! reserved `secret` key and one key per task to per-task files:
//!
//! ```raw
//! secret:hunter2
//! T1:tasks/approach.csv
//! T2:tasks/clear_mobs.csv
//! ```
//!
//! Each task file is a line-oriented `:`-separated table. The first field
//! of a data line discriminates: `base` rows declare objects that must
//! exist in the scene, `req` rows declare cardinality constraints, and rows
//! starting with a number declare conditions. A condition row repeating the
//! previous ordinal is AND-combined with it:
//!
//! ```raw
//! base:mob:zombie:5,5:0:0:
//! req:mob:zombie:1:3::
//! 1:approach:player::mob:zombie:0
//! 1:proxy:player::mob:zombie:3
//! 2:destroy:mob:zombie::::
//! ```
//!
//! Lines whose first token is `id` or `obj`, and blank lines, are headers
//! and skipped. Every configuration problem, syntactic or semantic, aborts
//! the load.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::gamedata::{ConditionKind, ObjectType, MAX_CONDITIONS};
use crate::raw::{clip_line, parse_coords};
use crate::task::{BaseObject, Condition, ObjectRequirement, Point, Selector, Task};
use crate::CheckError;

/// The number of `:`-separated fields of every data line.
const TASK_FIELDS: usize = 7;

fn row_error(line: usize, reason: impl Into<String>) -> CheckError {
    CheckError::InvalidTaskRow {
        line,
        reason: reason.into(),
    }
}

/// Parses the top-level manifest, loading every referenced task file.
///
/// Returns the secret (empty if the manifest does not set one) and the
/// tasks in encounter order. Task paths are resolved relative to
/// `base_dir`.
pub(crate) fn load_manifest<R: BufRead>(
    input: R,
    base_dir: &Path,
) -> Result<(String, Vec<Task>), CheckError> {
    let mut secret: Option<String> = None;
    let mut tasks: Vec<Task> = Vec::new();

    for line in input.lines() {
        let line = line?;
        let line = clip_line(&line);
        // Lines without a separator, or without a key or value, carry no
        // configuration and are skipped.
        let (key, value) = match line.find(':') {
            Some(colon) => (line[..colon].trim(), line[colon + 1..].trim()),
            None => continue,
        };
        if key.is_empty() || value.is_empty() {
            continue;
        }
        if key == "secret" {
            if secret.is_some() {
                return Err(CheckError::DuplicateSecret);
            }
            secret = Some(value.to_owned());
        } else {
            if tasks.iter().any(|task| task.name() == key) {
                return Err(CheckError::DuplicateTask(key.to_owned()));
            }
            let path = base_dir.join(value);
            let file = File::open(&path)?;
            tasks.push(parse_task(key, BufReader::new(file))?);
            debug!(task = key, path = %path.display(), "task loaded");
        }
    }

    Ok((secret.unwrap_or_default(), tasks))
}

/// Splits a task file line into its data fields.
///
/// Returns `None` for blank lines and for the `id`/`obj` header lines.
fn data_fields(line: &str) -> Option<Vec<&str>> {
    if line.trim().is_empty() {
        return None;
    }
    let fields: Vec<&str> = line.split(':').map(str::trim).collect();
    if matches!(fields[0], "id" | "obj") {
        return None;
    }
    Some(fields)
}

/// Parses a single task file.
///
/// The file is read in two passes: the first counts base objects,
/// requirements and distinct condition ordinals (and rejects a task with no
/// conditions or with more than [`MAX_CONDITIONS`]), the second populates
/// the task.
///
/// * `name` - The task name, as given by the manifest key.
/// * `input` - Input stream.
pub fn parse_task<R: BufRead>(name: &str, input: R) -> Result<Task, CheckError> {
    let mut lines = Vec::new();
    for line in input.lines() {
        lines.push(line?);
    }

    // First pass: size everything and check the condition count.
    let mut base_count = 0;
    let mut requirement_count = 0;
    let mut condition_count = 0;
    let mut previous_ordinal = None;
    for (index, line) in lines.iter().enumerate() {
        let fields = match data_fields(clip_line(line)) {
            Some(fields) => fields,
            None => continue,
        };
        if fields.len() != TASK_FIELDS {
            return Err(row_error(
                index + 1,
                format!("expected {} fields, got {}", TASK_FIELDS, fields.len()),
            ));
        }
        match fields[0] {
            "base" => base_count += 1,
            "req" => requirement_count += 1,
            ordinal => {
                let n = parse_ordinal(ordinal, index + 1)?;
                if previous_ordinal != Some(n) {
                    condition_count += 1;
                }
                previous_ordinal = Some(n);
            }
        }
    }
    if condition_count == 0 || condition_count > MAX_CONDITIONS {
        return Err(CheckError::ConditionCount(condition_count));
    }

    // Second pass: populate.
    let mut base_objects = Vec::with_capacity(base_count);
    let mut requirements = Vec::with_capacity(requirement_count);
    let mut conditions: Vec<Condition> = Vec::with_capacity(condition_count);
    for (index, line) in lines.iter().enumerate() {
        let fields = match data_fields(clip_line(line)) {
            Some(fields) => fields,
            None => continue,
        };
        let lineno = index + 1;
        match fields[0] {
            "base" => base_objects.push(parse_base(&fields, lineno)?),
            "req" => requirements.push(parse_requirement(&fields, lineno)?),
            _ => {
                let condition = parse_condition(&fields, lineno)?;
                match conditions.last_mut() {
                    Some(last) if last.n() == condition.n() => {
                        if last.second().is_some() {
                            return Err(row_error(
                                lineno,
                                "a condition can be AND-combined only once",
                            ));
                        }
                        last.set_second(condition);
                    }
                    Some(last) if last.n() > condition.n() => {
                        return Err(row_error(
                            lineno,
                            "condition ordinals must be strictly increasing",
                        ));
                    }
                    _ => conditions.push(condition),
                }
            }
        }
    }

    debug!(
        task = name,
        bases = base_objects.len(),
        requirements = requirements.len(),
        conditions = conditions.len(),
        "task parsed"
    );
    Ok(Task::new(
        name.to_owned(),
        base_objects,
        requirements,
        conditions,
    ))
}

fn parse_ordinal(field: &str, lineno: usize) -> Result<u8, CheckError> {
    let n: u8 = field
        .parse()
        .map_err(|_| row_error(lineno, format!("unrecognized row discriminator: {:?}", field)))?;
    if n == 0 || usize::from(n) > MAX_CONDITIONS {
        return Err(row_error(
            lineno,
            format!("condition ordinal out of range: {}", n),
        ));
    }
    Ok(n)
}

fn parse_object_type(field: &str, lineno: usize) -> Result<ObjectType, CheckError> {
    field
        .parse()
        .map_err(|_| row_error(lineno, format!("unknown object type: {:?}", field)))
}

/// Parses an optional float field; an empty field means zero.
fn parse_stat(field: &str, lineno: usize) -> Result<f32, CheckError> {
    if field.is_empty() {
        return Ok(0.0);
    }
    field
        .parse()
        .map_err(|_| row_error(lineno, format!("malformed number: {:?}", field)))
}

fn parse_position(field: &str, lineno: usize) -> Result<Option<Point>, CheckError> {
    if field.is_empty() {
        return Ok(None);
    }
    parse_coords(field)
        .map(Some)
        .map_err(|_| row_error(lineno, format!("malformed position: {:?}", field)))
}

/// Parses a `base:type:class:position:hp:damage:` row.
fn parse_base(fields: &[&str], lineno: usize) -> Result<BaseObject, CheckError> {
    if !fields[6].is_empty() {
        return Err(row_error(lineno, "base rows end in an empty field"));
    }
    Ok(BaseObject::new(
        parse_object_type(fields[1], lineno)?,
        fields[2].to_owned(),
        parse_position(fields[3], lineno)?,
        parse_stat(fields[4], lineno)?,
        parse_stat(fields[5], lineno)?,
    ))
}

/// Parses a `req:type:class:minimum:limit::` row.
fn parse_requirement(fields: &[&str], lineno: usize) -> Result<ObjectRequirement, CheckError> {
    if !fields[5].is_empty() || !fields[6].is_empty() {
        return Err(row_error(lineno, "req rows end in two empty fields"));
    }
    let minimum: u8 = fields[3]
        .parse()
        .map_err(|_| row_error(lineno, format!("malformed minimum: {:?}", fields[3])))?;
    let limit: u8 = fields[4]
        .parse()
        .map_err(|_| row_error(lineno, format!("malformed limit: {:?}", fields[4])))?;
    if minimum == 0 || minimum > limit {
        return Err(row_error(
            lineno,
            format!("requirement bounds out of order: {}..{}", minimum, limit),
        ));
    }
    Ok(ObjectRequirement::new(
        parse_object_type(fields[1], lineno)?,
        fields[2].to_owned(),
        minimum,
        limit,
    ))
}

fn parse_selector(type_field: &str, class_field: &str, lineno: usize) -> Result<Selector, CheckError> {
    let object_type = if type_field.is_empty() {
        None
    } else {
        Some(parse_object_type(type_field, lineno)?)
    };
    Ok(Selector::new(object_type, class_field.to_owned()))
}

/// Parses an `n:kind:prim_type:prim_class:sec_type:sec_class:arg` row.
fn parse_condition(fields: &[&str], lineno: usize) -> Result<Condition, CheckError> {
    let n = parse_ordinal(fields[0], lineno)?;
    let kind: ConditionKind = fields[1]
        .parse()
        .map_err(|_| row_error(lineno, format!("unknown condition kind: {:?}", fields[1])))?;
    Ok(Condition::new(
        n,
        kind,
        parse_selector(fields[2], fields[3], lineno)?,
        parse_selector(fields[4], fields[5], lineno)?,
        parse_stat(fields[6], lineno)?,
    ))
}
