//! Recursive structural merge for key/value trees.
//!
//! Overlays one tree onto another: nested trees are merged key by key, every
//! other value from the overlay replaces the base value outright. Inputs are
//! never mutated; leaf values are shared with the result by reference.
//!
//! # Key Types
//!
//! - [`Tree`] -- Key/value mapping, generic over the key type
//! - [`Node`] -- A tree, a [`Scalar`], or an ordered sequence of nodes
//! - [`merge`] / [`merge_objects`] -- Overlay merge for [`Tree`] and `serde_json` objects

pub mod merge;
pub mod node;

pub use merge::{merge, merge_objects};
pub use node::{Node, Scalar, Tree};
