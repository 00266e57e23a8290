//! `playcheck` is a library to check gameplay logs against task conditions.
//!
//! A *task* describes what a play session is supposed to look like: which
//! objects the scene must contain, and up to seven behavioral conditions
//! ("the player approached the enemy", "a mob was destroyed", "the game was
//! won"). A *check* replays a session log produced by the game engine
//! against one task and reports which conditions were satisfied as a compact
//! bitmask, together with a signature code binding the result to the
//! checker secret, the task and a caller-chosen salt.
//!
//! # Usage
//!
//! In the simplest case, you can load a checker configuration and check a
//! log file with [`Checker::load`] and [`Checker::check`]:
//!
//! ```no_run
//! # fn main() -> Result<(), playcheck::CheckError> {
//! use playcheck::Checker;
//!
//! let checker = Checker::load("checker.cfg")?;
//! let verdict = checker.check("T1", 42, "session.log")?;
//!
//! println!("Result code: {}", verdict.result());
//! println!("Code string: {}", verdict.signature());
//! # Ok(()) }
//! ```
//!
//! Logs wrapped in a zip archive are handled by passing
//! [`Compression::Zip`] to [`Checker::check_file`]. Everything file-based
//! is a thin wrapper around a reader-based function, so in-memory checking
//! works as well (see [`Checker::check_stream`] and
//! [`config::parse_task`]).
//!
//! # Layout
//!
//! The crate is split into the low-level log grammar ([`raw`]), the task
//! configuration loader ([`config`]), and the condition evaluation engine
//! ([`analyzer`]). Most consumers only need [`Checker`] and [`Verdict`].
//!
//! # Feature flags
//!
//! * `serde`: derives `Serialize`/`Deserialize` for the task model, events
//!   and verdicts.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;

use num_derive::FromPrimitive;
use thiserror::Error;

pub mod analyzer;
pub mod config;
pub mod gamedata;
pub mod raw;
pub mod sign;

mod event;
mod object;
mod processing;
mod task;

pub use event::{Event, EventKind};
pub use gamedata::{ConditionKind, ObjectType, MAX_CONDITIONS};
pub use object::{RuntimeObject, Scene};
pub use processing::{Compression, Verdict};
pub use task::{BaseObject, Condition, ObjectRequirement, Point, Selector, Task, FLOAT_TOLERANCE};

/// Any error that can occur while loading a configuration or checking a
/// log.
///
/// The variants carry enough context for diagnostics; embedders that only
/// need the coarse taxonomy (process exit codes, protocol error codes) can
/// fold any error with [`CheckError::code`].
#[derive(Debug, Error)]
pub enum CheckError {
    /// Reading a configuration or log file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The log violates its grammar.
    #[error(transparent)]
    Log(#[from] raw::ParseError),
    /// A compressed log could not be unwrapped.
    #[error("Archive error: {0}")]
    InvalidZip(#[from] zip::result::ZipError),
    /// The manifest sets the secret more than once.
    #[error("the checker secret is configured more than once")]
    DuplicateSecret,
    /// Two configured tasks share a name.
    #[error("duplicate task name: {0}")]
    DuplicateTask(String),
    /// A task file row is malformed.
    #[error("malformed task row at line {line}: {reason}")]
    InvalidTaskRow {
        /// 1-based line number within the task file.
        line: usize,
        /// What is wrong with the row.
        reason: String,
    },
    /// A task has no conditions, or more than
    /// [`MAX_CONDITIONS`][gamedata::MAX_CONDITIONS].
    #[error("task must have between 1 and 7 conditions, got {0}")]
    ConditionCount(usize),
    /// The requested task is not configured.
    #[error("unknown task: {0}")]
    UnknownTask(String),
    /// The scene does not satisfy the task's expectations.
    #[error("scene validation failed: {0}")]
    SceneMismatch(String),
    /// An event referenced an object that is not part of the scene.
    #[error("unknown object id: {0}")]
    UnknownObject(String),
}

impl CheckError {
    /// Folds this error into the three-kind [`ErrorCode`] taxonomy.
    ///
    /// Syntactic violations of the log grammar (including unknown object
    /// ids) are [`ErrorCode::FormatError`]; everything else, from
    /// unreadable files to semantic configuration problems, is
    /// [`ErrorCode::BadParameters`].
    pub fn code(&self) -> ErrorCode {
        match self {
            CheckError::Log(raw::ParseError::Io(_)) => ErrorCode::BadParameters,
            CheckError::Log(_) | CheckError::UnknownObject(_) => ErrorCode::FormatError,
            _ => ErrorCode::BadParameters,
        }
    }
}

/// The coarse result taxonomy of a check, as seen by external callers.
///
/// The numeric values double as process exit codes of the command line
/// front-end; [`num_traits::FromPrimitive`] converts them back:
///
/// ```
/// use num_traits::FromPrimitive;
/// use playcheck::ErrorCode;
/// assert_eq!(ErrorCode::from_i32(2), Some(ErrorCode::FormatError));
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(i32)]
pub enum ErrorCode {
    /// The check ran to completion.
    NoError = 0,
    /// Missing inputs, unreadable files, or semantic violations of the
    /// configuration.
    BadParameters = 1,
    /// Syntactic violations of the log grammar.
    FormatError = 2,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", *self as i32)
    }
}

/// A loaded checker configuration: the secret and the configured tasks.
///
/// A `Checker` is immutable once loaded. Checks borrow it shared, so one
/// instance can drive any number of sequential (or, with an outer `Sync`
/// wrapper, concurrent) checks.
#[derive(Debug, Clone)]
pub struct Checker {
    secret: String,
    tasks: Vec<Task>,
}

impl Checker {
    /// Loads a checker from a top-level manifest file.
    ///
    /// Task file paths in the manifest are resolved relative to the
    /// manifest's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Checker, CheckError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Checker::from_manifest(BufReader::new(file), base_dir)
    }

    /// Loads a checker from a manifest stream.
    ///
    /// * `input` - Input stream.
    /// * `base_dir` - Directory against which task file paths are resolved.
    pub fn from_manifest<R: BufRead>(input: R, base_dir: &Path) -> Result<Checker, CheckError> {
        let (secret, tasks) = config::load_manifest(input, base_dir)?;
        Ok(Checker { secret, tasks })
    }

    /// Assembles a checker from already-parsed tasks.
    ///
    /// Fails if two tasks share a name.
    pub fn new(secret: impl Into<String>, tasks: Vec<Task>) -> Result<Checker, CheckError> {
        for (index, task) in tasks.iter().enumerate() {
            if tasks[..index].iter().any(|other| other.name() == task.name()) {
                return Err(CheckError::DuplicateTask(task.name().clone()));
            }
        }
        Ok(Checker {
            secret: secret.into(),
            tasks,
        })
    }

    /// The configured tasks, in manifest order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up a task by name.
    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.name() == name)
    }

    /// Checks an uncompressed log file against a task.
    ///
    /// This is a shorthand for [`Checker::check_file`] with
    /// [`Compression::None`].
    pub fn check<P: AsRef<Path>>(
        &self,
        task_id: &str,
        salt: i32,
        log_path: P,
    ) -> Result<Verdict, CheckError> {
        self.check_file(task_id, salt, log_path, Compression::None)
    }

    /// Checks a log file against a task.
    pub fn check_file<P: AsRef<Path>>(
        &self,
        task_id: &str,
        salt: i32,
        log_path: P,
        compression: Compression,
    ) -> Result<Verdict, CheckError> {
        let file = File::open(log_path)?;
        self.check_stream(task_id, salt, BufReader::new(file), compression)
    }

    /// Checks a log stream against a task.
    ///
    /// The [`Seek`] bound is needed for zip compressed archives. The
    /// returned [`Verdict`] carries the result byte and its signature code.
    pub fn check_stream<R: Read + Seek>(
        &self,
        task_id: &str,
        salt: i32,
        input: R,
        compression: Compression,
    ) -> Result<Verdict, CheckError> {
        let task = self
            .task(task_id)
            .ok_or_else(|| CheckError::UnknownTask(task_id.to_owned()))?;
        let log = processing::read_log(input, compression)?;
        let result = processing::evaluate_log(task, &log)?;
        let signature = sign::signature(&self.secret, task.name(), salt, result);
        Ok(Verdict::new(result, signature))
    }
}
