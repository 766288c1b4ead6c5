// rangefinder_sim/src/lib.rs

//! Runtime for the rangefinder simulator: configuration, the threaded scan
//! and classifier pipelines, and the hardware replay path.

pub mod cli;
pub mod config;
pub mod error;
pub mod hardware;
pub mod pipeline;
pub mod prelude;
pub mod prng;
