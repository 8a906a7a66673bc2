use serde::{Deserialize, Serialize};

use super::Coordinate;

/// Named point of interest a route is computed to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub name: String,
    pub location: Coordinate,
}

impl Poi {
    pub fn new(name: impl Into<String>, location: Coordinate) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}
