// rangefinder_sim/src/pipeline/mod.rs

pub mod classify;
pub mod scan;
pub mod shared_arena;
pub mod slot;

pub use classify::{classify_frame, ClassifiedFrame, ClassifierPipeline};
pub use scan::{ScanCoordinator, ScanPipeline, ScanSettings};
pub use shared_arena::SharedArena;
pub use slot::LatestSlot;
