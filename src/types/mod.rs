//! Target types shared by the command-line front end and the engines.

mod target;

pub use target::{load_targets, read_targets, TargetError, TargetSpec};
