//! The raw data carried by a value
//!
//! A payload is either a canonical form produced by a codec or a "wild"
//! input such as parsed JSON. Codecs accept any payload and normalize it.

use serde_json::Value as Json;
use url::Url;

use super::geo::{Coordinates, LatLng, LatLngHeight, Polygon, Rect};

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Bool(bool),
    Number(f64),
    String(String),
    Url(Url),
    LatLng(LatLng),
    LatLngHeight(LatLngHeight),
    Coordinates(Coordinates),
    Polygon(Polygon),
    Rect(Rect),
    Array(Vec<Json>),
    Map(serde_json::Map<String, Json>),
    /// Loosely typed input, e.g. a manifest default value
    Json(Json),
}

impl Payload {
    /// Unwrap JSON scalars and containers into their typed variants
    pub fn normalized(&self) -> Payload {
        match self {
            Payload::Json(Json::Bool(b)) => Payload::Bool(*b),
            Payload::Json(Json::Number(n)) => match n.as_f64() {
                Some(f) => Payload::Number(f),
                None => self.clone(),
            },
            Payload::Json(Json::String(s)) => Payload::String(s.clone()),
            Payload::Json(Json::Array(a)) => Payload::Array(a.clone()),
            Payload::Json(Json::Object(o)) => Payload::Map(o.clone()),
            other => other.clone(),
        }
    }

    /// A JSON view of the payload, used for structural decoding
    pub fn to_json(&self) -> Option<Json> {
        let json = match self {
            Payload::Bool(b) => Json::Bool(*b),
            Payload::Number(n) => Json::Number(serde_json::Number::from_f64(*n)?),
            Payload::String(s) => Json::String(s.clone()),
            Payload::Url(u) => Json::String(u.to_string()),
            Payload::LatLng(v) => serde_json::to_value(v).ok()?,
            Payload::LatLngHeight(v) => serde_json::to_value(v).ok()?,
            Payload::Coordinates(v) => serde_json::to_value(v).ok()?,
            Payload::Polygon(v) => serde_json::to_value(v).ok()?,
            Payload::Rect(v) => serde_json::to_value(v).ok()?,
            Payload::Array(a) => Json::Array(a.clone()),
            Payload::Map(m) => Json::Object(m.clone()),
            Payload::Json(j) => j.clone(),
        };
        Some(json)
    }

    /// Decode the payload field-by-field into `T`
    pub(crate) fn decode<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        match self.normalized() {
            Payload::Array(a) => serde_json::from_value(Json::Array(a)).ok(),
            Payload::Map(m) => serde_json::from_value(Json::Object(m)).ok(),
            _ => None,
        }
    }
}

impl From<bool> for Payload {
    fn from(v: bool) -> Self {
        Payload::Bool(v)
    }
}

impl From<f64> for Payload {
    fn from(v: f64) -> Self {
        Payload::Number(v)
    }
}

impl From<i64> for Payload {
    fn from(v: i64) -> Self {
        Payload::Number(v as f64)
    }
}

impl From<i32> for Payload {
    fn from(v: i32) -> Self {
        Payload::Number(f64::from(v))
    }
}

impl From<&str> for Payload {
    fn from(v: &str) -> Self {
        Payload::String(v.to_string())
    }
}

impl From<String> for Payload {
    fn from(v: String) -> Self {
        Payload::String(v)
    }
}

impl From<Url> for Payload {
    fn from(v: Url) -> Self {
        Payload::Url(v)
    }
}

impl From<LatLng> for Payload {
    fn from(v: LatLng) -> Self {
        Payload::LatLng(v)
    }
}

impl From<LatLngHeight> for Payload {
    fn from(v: LatLngHeight) -> Self {
        Payload::LatLngHeight(v)
    }
}

impl From<Coordinates> for Payload {
    fn from(v: Coordinates) -> Self {
        Payload::Coordinates(v)
    }
}

impl From<Polygon> for Payload {
    fn from(v: Polygon) -> Self {
        Payload::Polygon(v)
    }
}

impl From<Rect> for Payload {
    fn from(v: Rect) -> Self {
        Payload::Rect(v)
    }
}

impl From<Json> for Payload {
    fn from(v: Json) -> Self {
        Payload::Json(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalized_unwraps_json() {
        assert_eq!(Payload::Json(json!(1.5)).normalized(), Payload::Number(1.5));
        assert_eq!(Payload::Json(json!("a")).normalized(), Payload::String("a".into()));
        assert!(matches!(Payload::Json(json!({"a": 1})).normalized(), Payload::Map(_)));
        assert_eq!(Payload::Json(Json::Null).normalized(), Payload::Json(Json::Null));
    }

    #[test]
    fn test_decode_structural() {
        let p = Payload::Json(json!({"lat": 1.0, "lng": 2.0}));
        assert_eq!(p.decode::<LatLng>(), Some(LatLng::new(1.0, 2.0)));
        assert_eq!(Payload::Number(1.0).decode::<LatLng>(), None);
    }
}
