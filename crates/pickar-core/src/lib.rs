//! **pickar-core**: shared types for the warehouse picking navigator.
//!
//! This crate provides the geometry primitives used across the *pickar*
//! crates: world-space vectors for waypoints, items and the user, and integer
//! points for shelf layouts.

pub mod geom;

pub use geom::{Point, Vec3};
