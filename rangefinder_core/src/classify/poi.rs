// rangefinder_core/src/classify/poi.rs

use crate::geometry::Point;

/// Display tag attached to every point of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoiColor {
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
    Orange,
    White,
}

impl PoiColor {
    /// Colors handed out to successive clusters.
    pub const PALETTE: [PoiColor; 7] = [
        PoiColor::Red,
        PoiColor::Blue,
        PoiColor::Yellow,
        PoiColor::Cyan,
        PoiColor::Magenta,
        PoiColor::Orange,
        PoiColor::Green,
    ];

    pub fn cycle(index: usize) -> Self {
        Self::PALETTE[index % Self::PALETTE.len()]
    }
}

/// A feature worth drawing or inspecting. Never fed back into classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointOfInterest {
    Marker { point: Point, color: PoiColor },
    Segment { start: Point, end: Point, color: PoiColor },
}

impl PointOfInterest {
    pub fn color(&self) -> PoiColor {
        match self {
            PointOfInterest::Marker { color, .. } | PointOfInterest::Segment { color, .. } => {
                *color
            }
        }
    }

    pub fn is_segment(&self) -> bool {
        matches!(self, PointOfInterest::Segment { .. })
    }
}
