//! Geographic value shapes

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Longitude first, six decimals
impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lng, self.lat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLngHeight {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub height: f64,
}

impl LatLngHeight {
    pub fn new(lat: f64, lng: f64, height: f64) -> Self {
        Self { lat, lng, height }
    }

    pub fn lat_lng(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

impl From<LatLng> for LatLngHeight {
    fn from(l: LatLng) -> Self {
        Self::new(l.lat, l.lng, 0.0)
    }
}

impl fmt::Display for LatLngHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}, {:.6}", self.lng, self.lat, self.height)
    }
}

/// An ordered line of positions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coordinates(pub Vec<LatLngHeight>);

impl Coordinates {
    /// Build from a flat `[lat, lng, height, lat, lng, height, ...]` list.
    /// Returns `None` unless the length is a multiple of three.
    pub fn from_flat(values: &[f64]) -> Option<Self> {
        if values.len() % 3 != 0 {
            return None;
        }
        Some(Self(
            values
                .chunks_exact(3)
                .map(|c| LatLngHeight::new(c[0], c[1], c[2]))
                .collect(),
        ))
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|p| p.to_string()).collect();
        f.write_str(&parts.join("; "))
    }
}

/// Rings of coordinates; the first is the outer boundary
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon(pub Vec<Coordinates>);

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|c| format!("[{c}]")).collect();
        f.write_str(&parts.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Rect {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6}, {:.6}, {:.6}, {:.6}",
            self.west, self.south, self.east, self.north
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latlng_renders_longitude_first() {
        assert_eq!(LatLng::new(1.0, 2.0).to_string(), "2.000000, 1.000000");
    }

    #[test]
    fn test_coordinates_from_flat() {
        let c = Coordinates::from_flat(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(c.0.len(), 2);
        assert_eq!(c.0[1], LatLngHeight::new(4.0, 5.0, 6.0));
        assert!(Coordinates::from_flat(&[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_latlngheight_defaults_height() {
        let v: LatLngHeight = serde_json::from_value(serde_json::json!({"lat": 1, "lng": 2})).unwrap();
        assert_eq!(v.height, 0.0);
    }
}
