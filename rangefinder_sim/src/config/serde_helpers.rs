// rangefinder_sim/src/config/serde_helpers.rs

/// `[x, y]` in TOML <-> `Point2<f64>`.
pub mod point2_from_array {
    use nalgebra::Point2;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(point: &Point2<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq([point.x, point.y].iter())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Point2<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let arr: [f64; 2] = Deserialize::deserialize(deserializer)?;
        Ok(Point2::new(arr[0], arr[1]))
    }
}

/// `[[low, high], ...]` in TOML <-> `Vec<DeadAngleRange>`, validated on load.
pub mod dead_angles_from_pairs {
    use rangefinder_core::arena::DeadAngleRange;
    use serde::{self, de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ranges: &[DeadAngleRange], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(ranges.iter().map(|r| [r.low, r.high]))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<DeadAngleRange>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs: Vec<[f64; 2]> = Deserialize::deserialize(deserializer)?;
        pairs
            .into_iter()
            .map(|[low, high]| DeadAngleRange::new(low, high).map_err(D::Error::custom))
            .collect()
    }
}
