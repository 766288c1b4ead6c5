// rangefinder_core/src/lib.rs

//! Pure simulation and classification logic for a rotating 2D rangefinder.
//!
//! Nothing in this crate spawns threads or touches the filesystem. The
//! runtime crate (`rangefinder_sim`) drives these functions from its worker
//! pools and feeds the results to consumers.

pub mod arena;
pub mod classify;
pub mod error;
pub mod geometry;
pub mod messages;
pub mod numeric;
pub mod prelude;
pub mod raycast;
