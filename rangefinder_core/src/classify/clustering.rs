// rangefinder_core/src/classify/clustering.rs

//! Gap-based segmentation of an angle-ordered scan.
//!
//! A window covering a fixed fraction of the scan slides one point at a time
//! around the (cyclic) sequence. Inside each window the successive point gaps
//! are averaged together with the wrap-around gap from the window's last
//! point back to its first. A forward gap larger than `boundary_factor` times
//! that mean marks a cut. The wrap-around gap only feeds the mean; it never
//! becomes a cut itself.

use crate::error::{GeometryError, Result};
use crate::geometry::Point;
use std::collections::BTreeSet;
use std::ops::Range;

/// Smallest window that still has an interior gap next to the wrap gap.
const MIN_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterParams {
    /// Window length as a fraction of the scan length.
    pub window_fraction: f64,
    /// A gap above `boundary_factor * window_mean` is a cut.
    pub boundary_factor: f64,
    /// Clusters with at most this many points are dropped as noise.
    pub min_cluster_len: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            window_fraction: 0.05,
            boundary_factor: 1.5,
            min_cluster_len: 5,
        }
    }
}

/// A contiguous run of scan indices believed to come from one surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub range: Range<usize>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn points<'a>(&self, scan: &'a [Point]) -> &'a [Point] {
        &scan[self.range.clone()]
    }
}

fn window_len(n: usize, fraction: f64) -> usize {
    let w = (n as f64 * fraction).ceil() as usize;
    w.max(MIN_WINDOW).min(n)
}

/// Indices `k` such that the scan should be cut between `k` and `k + 1`.
pub fn find_boundaries(points: &[Point], params: &ClusterParams) -> Result<BTreeSet<usize>> {
    let n = points.len();
    if n < MIN_WINDOW {
        return Err(GeometryError::InsufficientPoints {
            needed: MIN_WINDOW,
            got: n,
        });
    }

    let w = window_len(n, params.window_fraction);
    // With a full-length window every rotation sees the same gaps.
    let starts = if w < n { n } else { 1 };

    let mut boundaries = BTreeSet::new();
    let mut gaps = vec![0.0; w];
    for start in 0..starts {
        let idx = |j: usize| (start + j) % n;
        for j in 0..w - 1 {
            gaps[j] = (points[idx(j + 1)] - points[idx(j)]).norm();
        }
        gaps[w - 1] = (points[idx(0)] - points[idx(w - 1)]).norm();

        let mean = gaps.iter().sum::<f64>() / w as f64;
        if mean <= f64::EPSILON {
            continue;
        }
        let limit = params.boundary_factor * mean;
        for (j, gap) in gaps.iter().enumerate().take(w - 1) {
            let k = idx(j);
            // The gap after the final index is the scan seam, not a cut.
            if *gap > limit && k != n - 1 {
                boundaries.insert(k);
            }
        }
    }
    Ok(boundaries)
}

/// Splits the scan at its boundaries and drops clusters too short to trust.
pub fn detect_clusters(points: &[Point], params: &ClusterParams) -> Result<Vec<Cluster>> {
    let boundaries = find_boundaries(points, params)?;

    let mut clusters = Vec::with_capacity(boundaries.len() + 1);
    let mut start = 0;
    for &k in &boundaries {
        clusters.push(Cluster { range: start..k + 1 });
        start = k + 1;
    }
    clusters.push(Cluster {
        range: start..points.len(),
    });

    clusters.retain(|c| c.len() > params.min_cluster_len);
    Ok(clusters)
}
