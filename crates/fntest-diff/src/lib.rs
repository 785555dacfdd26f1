//! Diff engine for comparing expected and actual function output.
//!
//! Produces field-level change sets for JSON values and `-want +got` line
//! diffs of their pretty-printed form for test failure messages.
//!
//! # Key Types
//!
//! - [`ValueDiff`] / [`FieldChange`] -- Field-level diff keyed by path
//! - [`LineDiff`] / [`DiffHunk`] / [`DiffLine`] -- Line-level text diff
//! - [`render_diff`] -- `-want +got` text for any two serializable values

pub mod line_diff;
pub mod value_diff;

pub use line_diff::{diff_lines, render_diff, DiffHunk, DiffLine, LineDiff};
pub use value_diff::{diff_values, FieldChange, ValueDiff};
