//! Procedural stacks: copies of one object arranged as a pyramid of rows,
//! each row one item shorter than the row below, along a straight baseline
//! or along a curve.
//!
//! Main components:
//! - [`config`]: the user-facing property bag of a stack node.
//! - [`params`]: the immutable parameter set of one generation pass.
//! - [`random`]: seeded jitter source.
//! - [`triangle`]: triangular arena holding one transform per item.
//! - [`path`] and [`arc_length`]: curves and their arc-length correction.
//! - [`generator`]: computes the item transforms.
//! - [`scene`] and [`mesh`]: the scene graph the stack lives in.
//! - [`materialize`]: turns a layout into scene nodes.
//! - [`dependency`] and [`object`]: the stack node with its cache and
//!   dirty detection.
//! - [`error`] and [`types`]: shared error and id types.

pub mod arc_length;
pub mod config;
pub mod dependency;
pub mod error;
pub mod generator;
pub mod materialize;
pub mod mesh;
pub mod object;
pub mod params;
pub mod path;
pub mod random;
pub mod scene;
pub mod triangle;
pub mod types;
