//! Round-trip tests for the optional serde representations.
#![cfg(feature = "serde")]

use std::io::Cursor;

use playcheck::config::parse_task;
use playcheck::{Checker, Compression, Task, Verdict};

const TASK: &str = "\
base:mob:zombie:5,5:0:0:
req:mob:zombie:1:3::
1:approach:player::mob:zombie:0
1:proxy:player::mob:zombie:3
2:destroy:mob:zombie::::
";

#[test]
fn task_roundtrip() {
    let task = parse_task("T1", Cursor::new(TASK)).unwrap();
    let json = serde_json::to_string(&task).unwrap();
    let back: Task = serde_json::from_str(&json).unwrap();
    assert_eq!(task, back);
}

#[test]
fn verdict_roundtrip() {
    let log = "\
Player Start Position: (4,5)
ID | Name | Object ID | Type | Position | HP | Damage
---
zombie_1 | zombie | n1 | mob | (5,5) | 10 | 1
---
[0] Player position: (4,5); zombie_1 position: (5,5)
Session ended
";
    let task = parse_task("T1", Cursor::new(TASK)).unwrap();
    let checker = Checker::new("s", vec![task]).unwrap();
    let verdict = checker
        .check_stream("T1", 7, Cursor::new(log.as_bytes()), Compression::None)
        .unwrap();

    let json = serde_json::to_string(&verdict).unwrap();
    let back: Verdict = serde_json::from_str(&json).unwrap();
    assert_eq!(verdict, back);
}
