// Location domain model
use serde::{Deserialize, Serialize};

/// A named geographic point we keep a forecast for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub lat: f64,
    pub long: f64,
}

impl Location {
    #[cfg(test)]
    pub fn new(id: impl Into<String>, lat: f64, long: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            long,
        }
    }

    pub fn has_valid_coordinates(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.long)
    }
}
