//! Private module to contain the check drivers.

use std::io::{BufReader, Read, Seek};

use tracing::{debug, trace};

use crate::analyzer::{evaluate, EventContext, SatisfactionMatrix};
use crate::event::EventKind;
use crate::object::Scene;
use crate::raw::{self, GameLog};
use crate::task::Task;
use crate::CheckError;

/// Indicates the given compression method for the log file.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Compression {
    /// No compression was used.
    None,
    /// The file is wrapped in a zip archive.
    Zip,
}

/// The outcome of a successful check.
///
/// Carries the 7-bit result mask and the signature code that binds the
/// result to the secret, the task and the salt.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Verdict {
    result: u8,
    signature: String,
}

impl Verdict {
    pub(crate) fn new(result: u8, signature: String) -> Verdict {
        Verdict { result, signature }
    }

    /// The result byte. Bit `i` means "condition `i + 1` was satisfied";
    /// the high bit is always clear.
    pub fn result(&self) -> u8 {
        self.result
    }

    /// The 64-character lowercase hex signature code.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Whether the condition with the given 1-based ordinal was satisfied.
    pub fn satisfied(&self, ordinal: u8) -> bool {
        ordinal >= 1 && ordinal <= 7 && self.result & (1 << (ordinal - 1)) != 0
    }
}

/// Reads a log stream into its raw form, unwrapping compression.
///
/// The [`Seek`] bound is needed for zip compressed archives; the log itself
/// is expected to be the first entry of the archive.
pub(crate) fn read_log<R: Read + Seek>(input: R, compression: Compression) -> Result<GameLog, CheckError> {
    match compression {
        Compression::None => Ok(raw::parse_log(BufReader::new(input))?),
        Compression::Zip => {
            let mut archive = zip::ZipArchive::new(input)?;
            let entry = archive.by_index(0)?;
            Ok(raw::parse_log(BufReader::new(entry))?)
        }
    }
}

/// Replays a parsed log against a task and folds the satisfaction matrix
/// into the result byte.
pub(crate) fn evaluate_log(task: &Task, log: &GameLog) -> Result<u8, CheckError> {
    let mut scene = Scene::from_log(log);
    scene.validate(task)?;
    let mut matrix = SatisfactionMatrix::new(scene.objects().len());

    for event in &log.events {
        let ctx = match event.kind() {
            EventKind::Tick { updates } => {
                for (id, pos) in updates {
                    let index = scene
                        .resolve(id)
                        .ok_or_else(|| CheckError::UnknownObject(id.clone()))?;
                    scene.update_position(index, *pos);
                }
                EventContext::TICK
            }
            EventKind::Attack {
                attacker,
                target,
                damage,
            } => EventContext {
                primary: Some(
                    scene
                        .resolve(attacker)
                        .ok_or_else(|| CheckError::UnknownObject(attacker.clone()))?,
                ),
                secondary: Some(
                    scene
                        .resolve(target)
                        .ok_or_else(|| CheckError::UnknownObject(target.clone()))?,
                ),
                arg: *damage,
                won: false,
            },
            EventKind::Attacked { target, damage } => EventContext {
                primary: Some(
                    scene
                        .resolve(target)
                        .ok_or_else(|| CheckError::UnknownObject(target.clone()))?,
                ),
                secondary: None,
                arg: *damage,
                won: false,
            },
            EventKind::Died { victim } => EventContext {
                primary: Some(
                    scene
                        .resolve(victim)
                        .ok_or_else(|| CheckError::UnknownObject(victim.clone()))?,
                ),
                secondary: None,
                arg: 0.0,
                won: false,
            },
            EventKind::GameOver { won: true } => EventContext {
                primary: None,
                secondary: None,
                arg: 0.0,
                won: true,
            },
            // A lost or aborted game feeds nothing.
            EventKind::GameOver { won: false } => continue,
        };

        for condition in task.conditions() {
            if let Some(actor) = evaluate(condition, &scene, &ctx) {
                trace!(time = event.time(), n = condition.n(), "condition matched");
                matrix.record(usize::from(condition.n()) - 1, actor);
            }
        }
    }

    let result = matrix.result_byte();
    debug!(task = task.name().as_str(), result, "log evaluated");
    Ok(result)
}
