use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceBucket {
    Short,
    Medium,
    Long,
    VeryLong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldZone {
    RedZone,
    GreenZone,
    MidField,
    OwnTerritory,
}

/// Yards-to-go band. Missing or NaN distances land in `Medium`.
pub fn distance_bucket(yards: Option<f64>) -> DistanceBucket {
    let Some(yards) = yards.filter(|y| !y.is_nan()) else {
        return DistanceBucket::Medium;
    };
    if yards <= 3.0 {
        DistanceBucket::Short
    } else if yards <= 6.0 {
        DistanceBucket::Medium
    } else if yards <= 10.0 {
        DistanceBucket::Long
    } else {
        DistanceBucket::VeryLong
    }
}

/// Field band by yards from the opponent's goal line. Missing or NaN
/// positions land in `MidField`.
pub fn field_zone(yardline_100: Option<f64>) -> FieldZone {
    let Some(yards) = yardline_100.filter(|y| !y.is_nan()) else {
        return FieldZone::MidField;
    };
    if yards <= 10.0 {
        FieldZone::RedZone
    } else if yards <= 20.0 {
        FieldZone::GreenZone
    } else if yards <= 50.0 {
        FieldZone::MidField
    } else {
        FieldZone::OwnTerritory
    }
}
