//! Writes selected snapshots back out as a regular directory tree.

pub mod materializer;

pub use materializer::{CopyFailure, MaterializeReport, copy_snapshot, materialize};
