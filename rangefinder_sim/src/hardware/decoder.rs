// rangefinder_sim/src/hardware/decoder.rs

//! Decoder for the rotating sensor's serial byte stream.
//!
//! Records are separated by a `0xFA` start byte. Each record carries an index
//! byte (`0xA0 + k`) and four little-endian distance words; sample `j` of
//! record `k` sits at `(4k + j)` degrees. A set bit in the top three bits of
//! the high byte flags an invalid sample. Distances are in units of 1/20.
//!
//! Malformed records are logged and skipped; they never stop the decoder.

use rangefinder_core::geometry::PolarCoord;
use std::io::{self, BufRead, BufReader, Read};

pub const START_BYTE: u8 = 0xFA;
pub const INDEX_BASE: u8 = 0xA0;
pub const SAMPLES_PER_RECORD: usize = 4;
/// Index byte plus four (low, high) pairs.
pub const RECORD_LEN: usize = 1 + 2 * SAMPLES_PER_RECORD;

const INVALID_MASK: u8 = 0xE0;
const DISTANCE_HIGH_MASK: u8 = 0x1F;
const DISTANCE_SCALE: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("record too short: {0} bytes")]
    TooShort(usize),

    #[error("index byte {0:#04x} below 0xa0")]
    BadIndex(u8),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Valid { angle_deg: u16, distance: f64 },
    Invalid { angle_deg: u16 },
}

impl Sample {
    pub fn angle_deg(&self) -> u16 {
        match self {
            Sample::Valid { angle_deg, .. } | Sample::Invalid { angle_deg } => *angle_deg,
        }
    }
}

/// Parses one record (the bytes between two start markers).
pub fn parse_record(bytes: &[u8]) -> Result<[Sample; SAMPLES_PER_RECORD], RecordError> {
    if bytes.len() < RECORD_LEN {
        return Err(RecordError::TooShort(bytes.len()));
    }
    let index = bytes[0];
    if index < INDEX_BASE {
        return Err(RecordError::BadIndex(index));
    }
    let k = u16::from(index - INDEX_BASE);

    let mut samples = [Sample::Invalid { angle_deg: 0 }; SAMPLES_PER_RECORD];
    for (j, sample) in samples.iter_mut().enumerate() {
        let angle_deg = (k * 4 + j as u16) % 360;
        let low = bytes[1 + 2 * j];
        let high = bytes[2 + 2 * j];
        *sample = if high & INVALID_MASK != 0 {
            Sample::Invalid { angle_deg }
        } else {
            let raw = (u16::from(high & DISTANCE_HIGH_MASK) << 8) | u16::from(low);
            Sample::Valid {
                angle_deg,
                distance: f64::from(raw) / DISTANCE_SCALE,
            }
        };
    }
    Ok(samples)
}

/// Collects samples into sweeps. A sweep closes when the sample at 0 degrees
/// of the next revolution arrives.
#[derive(Debug, Default)]
pub struct SweepAssembler {
    pending: Vec<PolarCoord>,
}

impl SweepAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record's samples, returning a finished sweep if one closed.
    pub fn push(&mut self, samples: &[Sample]) -> Option<Vec<PolarCoord>> {
        let mut finished = None;
        for sample in samples {
            if sample.angle_deg() == 0 && !self.pending.is_empty() {
                finished = Some(std::mem::take(&mut self.pending));
            }
            match *sample {
                Sample::Valid {
                    angle_deg,
                    distance,
                } => self
                    .pending
                    .push(PolarCoord::new(distance, f64::from(angle_deg).to_radians())),
                Sample::Invalid { angle_deg } => {
                    tracing::trace!(angle_deg, "invalid sample");
                }
            }
        }
        finished
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

/// Pulls complete sweeps out of a byte stream.
pub struct FrameDecoder<R> {
    reader: BufReader<R>,
    assembler: SweepAssembler,
    buffer: Vec<u8>,
    synced: bool,
    records: u64,
    discarded: u64,
}

impl<R: Read> FrameDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            assembler: SweepAssembler::new(),
            buffer: Vec::with_capacity(64),
            synced: false,
            records: 0,
            discarded: 0,
        }
    }

    /// The next complete sweep, or `None` at end of stream. Samples of an
    /// unfinished final sweep are dropped.
    pub fn next_sweep(&mut self) -> io::Result<Option<Vec<PolarCoord>>> {
        loop {
            self.buffer.clear();
            // Framing is by marker only: a distance byte equal to 0xFA splits
            // its record, and both halves are discarded as too short.
            let read = self.reader.read_until(START_BYTE, &mut self.buffer)?;
            if read == 0 {
                if self.assembler.pending() > 0 {
                    tracing::debug!(samples = self.assembler.pending(), "dropping partial sweep at end of stream");
                }
                return Ok(None);
            }
            if self.buffer.last() == Some(&START_BYTE) {
                self.buffer.pop();
            }

            // Bytes before the first marker are the tail of an unseen record.
            if !self.synced {
                self.synced = true;
                if !self.buffer.is_empty() {
                    tracing::debug!(bytes = self.buffer.len(), "skipping bytes before first start marker");
                }
                continue;
            }

            match parse_record(&self.buffer) {
                Ok(samples) => {
                    self.records += 1;
                    if let Some(sweep) = self.assembler.push(&samples) {
                        return Ok(Some(sweep));
                    }
                }
                Err(e) => {
                    self.discarded += 1;
                    tracing::debug!(error = %e, "discarding record");
                }
            }
        }
    }

    /// Records decoded and records discarded so far.
    pub fn stats(&self) -> (u64, u64) {
        (self.records, self.discarded)
    }
}

impl<R: Read> Iterator for FrameDecoder<R> {
    type Item = io::Result<Vec<PolarCoord>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_sweep().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Encodes one record with all four samples at `distance`.
    fn record(k: u8, distance: f64) -> Vec<u8> {
        let raw = (distance * DISTANCE_SCALE).round() as u16;
        let mut bytes = vec![START_BYTE, INDEX_BASE + k];
        for _ in 0..SAMPLES_PER_RECORD {
            bytes.push((raw & 0xFF) as u8);
            bytes.push((raw >> 8) as u8);
        }
        bytes
    }

    fn revolution(distance: f64) -> Vec<u8> {
        (0..90).flat_map(|k| record(k, distance)).collect()
    }

    #[test]
    fn parses_a_record() {
        let samples = parse_record(&record(2, 1.5)[1..]).unwrap();
        assert_eq!(
            samples[0],
            Sample::Valid {
                angle_deg: 8,
                distance: 1.5
            }
        );
        assert_eq!(samples[3].angle_deg(), 11);
    }

    #[test]
    fn flags_invalid_samples() {
        let mut bytes = record(0, 2.0)[1..].to_vec();
        bytes[2] |= 0x80;
        let samples = parse_record(&bytes).unwrap();
        assert_eq!(samples[0], Sample::Invalid { angle_deg: 0 });
        assert!(matches!(samples[1], Sample::Valid { .. }));
    }

    #[test]
    fn rejects_short_and_misindexed_records() {
        assert_eq!(parse_record(&[0xA0, 1, 2]), Err(RecordError::TooShort(3)));
        assert_eq!(
            parse_record(&[0x10, 0, 0, 0, 0, 0, 0, 0, 0]),
            Err(RecordError::BadIndex(0x10))
        );
    }

    #[test]
    fn decodes_full_sweeps() {
        let mut stream = revolution(2.0);
        stream.extend(revolution(3.0));
        stream.extend(record(0, 4.0));
        let mut decoder = FrameDecoder::new(stream.as_slice());

        let first = decoder.next_sweep().unwrap().unwrap();
        assert_eq!(first.len(), 360);
        assert_abs_diff_eq!(first[0].radius, 2.0);
        assert_abs_diff_eq!(first[90].angle, 90f64.to_radians(), epsilon = 1e-12);

        let second = decoder.next_sweep().unwrap().unwrap();
        assert_eq!(second.len(), 360);
        assert_abs_diff_eq!(second[359].radius, 3.0);

        assert!(decoder.next_sweep().unwrap().is_none());
        assert_eq!(decoder.stats(), (181, 0));
    }

    #[test]
    fn marker_valued_distance_byte_loses_only_its_record() {
        // 12.5 encodes as 250 = 0xFA in the low byte.
        let mut stream: Vec<u8> = (0..90)
            .flat_map(|k| record(k, if k == 5 { 12.5 } else { 2.0 }))
            .collect();
        stream.extend(record(0, 2.0));
        let mut decoder = FrameDecoder::new(stream.as_slice());

        let sweep = decoder.next_sweep().unwrap().unwrap();
        assert_eq!(sweep.len(), 356);
        assert!(sweep.iter().all(|s| s.radius == 2.0));
        let (_, discarded) = decoder.stats();
        assert!(discarded > 0);
    }

    #[test]
    fn garbage_is_skipped_without_stopping() {
        let mut stream = vec![0x01, 0x02];
        stream.extend(revolution(2.0));
        // A truncated record in the middle of the next revolution.
        stream.extend([START_BYTE, INDEX_BASE, 0x05]);
        stream.extend(revolution(2.5));
        stream.extend(record(0, 1.0));

        let sweeps: Vec<_> = FrameDecoder::new(stream.as_slice())
            .collect::<io::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(sweeps.len(), 2);
        assert_eq!(sweeps[1].len(), 360);
    }
}
