// rangefinder_sim/src/hardware/mod.rs

//! Physical sensor input. Decoded sweeps become [`ScanFrame`]s with only the
//! robot-frame half filled in, so the classifier runs on them unchanged.

pub mod decoder;

use crate::error::Result;
use decoder::FrameDecoder;
use rangefinder_core::messages::ScanFrame;
use std::fs::File;
use std::path::Path;

/// Opens a captured byte stream and yields one frame per decoded sweep.
pub fn replay_frames(path: &Path) -> Result<impl Iterator<Item = Result<ScanFrame>>> {
    let file = File::open(path)?;
    tracing::info!("Replaying sensor capture from: {}", path.display());
    Ok(FrameDecoder::new(file)
        .zip(0u64..)
        .map(|(sweep, cycle)| Ok(ScanFrame::from_samples(cycle, sweep?))))
}
