//! Built-in codecs for the default value types

use serde_json::{json, Value as Json};
use url::Url;

use super::geo::{Coordinates, LatLng, LatLngHeight, Polygon, Rect};
use super::payload::Payload;
use super::Codec;

/// Parse booleans the way manifests spell them
fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn json_of<T: serde::Serialize>(v: &T) -> Option<Json> {
    serde_json::to_value(v).ok()
}

pub(crate) struct BoolCodec;

impl Codec for BoolCodec {
    fn i2v(&self, input: &Payload) -> Option<Payload> {
        match input.normalized() {
            Payload::Bool(b) => Some(Payload::Bool(b)),
            Payload::Number(n) => Some(Payload::Bool(n != 0.0)),
            Payload::String(s) => parse_bool(&s).map(Payload::Bool),
            _ => None,
        }
    }

    fn v2i(&self, v: &Payload) -> Option<Json> {
        match v {
            Payload::Bool(b) => Some(Json::Bool(*b)),
            _ => None,
        }
    }

    fn validate(&self, v: &Payload) -> bool {
        matches!(v, Payload::Bool(_))
    }

    fn string(&self, v: &Payload) -> String {
        match v {
            Payload::Bool(b) => b.to_string(),
            _ => String::new(),
        }
    }

    fn json_schema(&self) -> Json {
        json!({ "type": "boolean" })
    }
}

pub(crate) struct NumberCodec;

impl Codec for NumberCodec {
    fn i2v(&self, input: &Payload) -> Option<Payload> {
        match input.normalized() {
            Payload::Number(n) => Some(Payload::Number(n)),
            Payload::Bool(b) => Some(Payload::Number(if b { 1.0 } else { 0.0 })),
            Payload::String(s) => s.trim().parse::<f64>().ok().map(Payload::Number),
            _ => None,
        }
    }

    fn v2i(&self, v: &Payload) -> Option<Json> {
        match v {
            Payload::Number(n) => serde_json::Number::from_f64(*n).map(Json::Number),
            _ => None,
        }
    }

    fn validate(&self, v: &Payload) -> bool {
        matches!(v, Payload::Number(_))
    }

    fn string(&self, v: &Payload) -> String {
        match v {
            Payload::Number(n) => n.to_string(),
            _ => String::new(),
        }
    }

    fn json_schema(&self) -> Json {
        json!({ "type": "number" })
    }
}

pub(crate) struct StringCodec;

impl Codec for StringCodec {
    fn i2v(&self, input: &Payload) -> Option<Payload> {
        let s = match input.normalized() {
            Payload::String(s) => s,
            Payload::Number(n) => n.to_string(),
            Payload::Bool(b) => b.to_string(),
            Payload::Url(u) => u.to_string(),
            Payload::LatLng(v) => v.to_string(),
            Payload::LatLngHeight(v) => v.to_string(),
            Payload::Coordinates(v) => v.to_string(),
            Payload::Polygon(v) => v.to_string(),
            Payload::Rect(v) => v.to_string(),
            _ => return None,
        };
        Some(Payload::String(s))
    }

    fn v2i(&self, v: &Payload) -> Option<Json> {
        match v {
            Payload::String(s) => Some(Json::String(s.clone())),
            _ => None,
        }
    }

    fn validate(&self, v: &Payload) -> bool {
        matches!(v, Payload::String(_))
    }

    fn string(&self, v: &Payload) -> String {
        match v {
            Payload::String(s) => s.clone(),
            _ => String::new(),
        }
    }

    fn json_schema(&self) -> Json {
        json!({ "type": "string" })
    }
}

/// A reference to another entity, by id
pub(crate) struct RefCodec;

impl Codec for RefCodec {
    fn i2v(&self, input: &Payload) -> Option<Payload> {
        match input.normalized() {
            Payload::String(s) if !s.is_empty() => Some(Payload::String(s)),
            _ => None,
        }
    }

    fn v2i(&self, v: &Payload) -> Option<Json> {
        StringCodec.v2i(v)
    }

    fn validate(&self, v: &Payload) -> bool {
        matches!(v, Payload::String(s) if !s.is_empty())
    }

    fn string(&self, v: &Payload) -> String {
        StringCodec.string(v)
    }

    fn json_schema(&self) -> Json {
        json!({ "type": "string" })
    }
}

pub(crate) struct UrlCodec;

impl Codec for UrlCodec {
    fn i2v(&self, input: &Payload) -> Option<Payload> {
        match input.normalized() {
            Payload::Url(u) => Some(Payload::Url(u)),
            Payload::String(s) => Url::parse(&s).ok().map(Payload::Url),
            _ => None,
        }
    }

    fn v2i(&self, v: &Payload) -> Option<Json> {
        match v {
            Payload::Url(u) => Some(Json::String(u.to_string())),
            _ => None,
        }
    }

    fn validate(&self, v: &Payload) -> bool {
        matches!(v, Payload::Url(_))
    }

    fn string(&self, v: &Payload) -> String {
        match v {
            Payload::Url(u) => u.to_string(),
            _ => String::new(),
        }
    }

    fn json_schema(&self) -> Json {
        json!({ "type": "string", "format": "uri" })
    }
}

pub(crate) struct LatLngCodec;

impl Codec for LatLngCodec {
    fn i2v(&self, input: &Payload) -> Option<Payload> {
        match input {
            Payload::LatLng(v) => Some(Payload::LatLng(*v)),
            Payload::LatLngHeight(v) => Some(Payload::LatLng(v.lat_lng())),
            other => other.decode::<LatLng>().map(Payload::LatLng),
        }
    }

    fn v2i(&self, v: &Payload) -> Option<Json> {
        match v {
            Payload::LatLng(v) => json_of(v),
            _ => None,
        }
    }

    fn validate(&self, v: &Payload) -> bool {
        matches!(v, Payload::LatLng(_))
    }

    fn string(&self, v: &Payload) -> String {
        match v {
            Payload::LatLng(v) => v.to_string(),
            _ => String::new(),
        }
    }

    fn json_schema(&self) -> Json {
        json!({
            "type": "object",
            "required": ["lat", "lng"],
            "properties": {
                "lat": { "type": "number" },
                "lng": { "type": "number" },
            },
        })
    }
}

pub(crate) struct LatLngHeightCodec;

impl Codec for LatLngHeightCodec {
    fn i2v(&self, input: &Payload) -> Option<Payload> {
        match input {
            Payload::LatLngHeight(v) => Some(Payload::LatLngHeight(*v)),
            Payload::LatLng(v) => Some(Payload::LatLngHeight((*v).into())),
            other => other.decode::<LatLngHeight>().map(Payload::LatLngHeight),
        }
    }

    fn v2i(&self, v: &Payload) -> Option<Json> {
        match v {
            Payload::LatLngHeight(v) => json_of(v),
            _ => None,
        }
    }

    fn validate(&self, v: &Payload) -> bool {
        matches!(v, Payload::LatLngHeight(_))
    }

    fn string(&self, v: &Payload) -> String {
        match v {
            Payload::LatLngHeight(v) => v.to_string(),
            _ => String::new(),
        }
    }

    fn json_schema(&self) -> Json {
        json!({
            "type": "object",
            "required": ["lat", "lng", "height"],
            "properties": {
                "lat": { "type": "number" },
                "lng": { "type": "number" },
                "height": { "type": "number" },
            },
        })
    }
}

fn decode_coordinates(input: &Payload) -> Option<Coordinates> {
    match input.normalized() {
        Payload::Coordinates(c) => Some(c),
        Payload::LatLng(v) => Some(Coordinates(vec![v.into()])),
        Payload::LatLngHeight(v) => Some(Coordinates(vec![v])),
        Payload::Array(items) => {
            if !items.is_empty() && items.iter().all(Json::is_number) {
                let flat: Vec<f64> = items.iter().filter_map(Json::as_f64).collect();
                Coordinates::from_flat(&flat)
            } else {
                serde_json::from_value(Json::Array(items)).ok()
            }
        }
        _ => None,
    }
}

pub(crate) struct CoordinatesCodec;

impl Codec for CoordinatesCodec {
    fn i2v(&self, input: &Payload) -> Option<Payload> {
        decode_coordinates(input).map(Payload::Coordinates)
    }

    fn v2i(&self, v: &Payload) -> Option<Json> {
        match v {
            Payload::Coordinates(v) => json_of(v),
            _ => None,
        }
    }

    fn validate(&self, v: &Payload) -> bool {
        matches!(v, Payload::Coordinates(_))
    }

    fn string(&self, v: &Payload) -> String {
        match v {
            Payload::Coordinates(v) => v.to_string(),
            _ => String::new(),
        }
    }

    fn json_schema(&self) -> Json {
        json!({
            "type": "array",
            "items": LatLngHeightCodec.json_schema(),
        })
    }
}

pub(crate) struct PolygonCodec;

impl Codec for PolygonCodec {
    fn i2v(&self, input: &Payload) -> Option<Payload> {
        match input.normalized() {
            Payload::Polygon(p) => Some(Payload::Polygon(p)),
            Payload::Array(items) => {
                let rings: Option<Vec<Coordinates>> = items
                    .into_iter()
                    .map(|ring| decode_coordinates(&Payload::Json(ring)))
                    .collect();
                rings.map(|r| Payload::Polygon(Polygon(r)))
            }
            other => decode_coordinates(&other).map(|c| Payload::Polygon(Polygon(vec![c]))),
        }
    }

    fn v2i(&self, v: &Payload) -> Option<Json> {
        match v {
            Payload::Polygon(v) => json_of(v),
            _ => None,
        }
    }

    fn validate(&self, v: &Payload) -> bool {
        matches!(v, Payload::Polygon(_))
    }

    fn string(&self, v: &Payload) -> String {
        match v {
            Payload::Polygon(v) => v.to_string(),
            _ => String::new(),
        }
    }

    fn json_schema(&self) -> Json {
        json!({
            "type": "array",
            "items": CoordinatesCodec.json_schema(),
        })
    }
}

pub(crate) struct RectCodec;

impl Codec for RectCodec {
    fn i2v(&self, input: &Payload) -> Option<Payload> {
        match input {
            Payload::Rect(r) => Some(Payload::Rect(*r)),
            other => other.decode::<Rect>().map(Payload::Rect),
        }
    }

    fn v2i(&self, v: &Payload) -> Option<Json> {
        match v {
            Payload::Rect(v) => json_of(v),
            _ => None,
        }
    }

    fn validate(&self, v: &Payload) -> bool {
        matches!(v, Payload::Rect(_))
    }

    fn string(&self, v: &Payload) -> String {
        match v {
            Payload::Rect(v) => v.to_string(),
            _ => String::new(),
        }
    }

    fn json_schema(&self) -> Json {
        json!({
            "type": "object",
            "required": ["west", "south", "east", "north"],
            "properties": {
                "west": { "type": "number" },
                "south": { "type": "number" },
                "east": { "type": "number" },
                "north": { "type": "number" },
            },
        })
    }
}

pub(crate) struct ArrayCodec;

impl Codec for ArrayCodec {
    fn i2v(&self, input: &Payload) -> Option<Payload> {
        match input.normalized() {
            Payload::Array(a) => Some(Payload::Array(a)),
            _ => None,
        }
    }

    fn v2i(&self, v: &Payload) -> Option<Json> {
        match v {
            Payload::Array(a) => Some(Json::Array(a.clone())),
            _ => None,
        }
    }

    fn validate(&self, v: &Payload) -> bool {
        matches!(v, Payload::Array(_))
    }

    fn string(&self, v: &Payload) -> String {
        self.v2i(v).map(|j| j.to_string()).unwrap_or_default()
    }

    fn json_schema(&self) -> Json {
        json!({ "type": "array" })
    }
}

pub(crate) struct MapCodec;

impl Codec for MapCodec {
    fn i2v(&self, input: &Payload) -> Option<Payload> {
        match input.normalized() {
            Payload::Map(m) => Some(Payload::Map(m)),
            _ => None,
        }
    }

    fn v2i(&self, v: &Payload) -> Option<Json> {
        match v {
            Payload::Map(m) => Some(Json::Object(m.clone())),
            _ => None,
        }
    }

    fn validate(&self, v: &Payload) -> bool {
        matches!(v, Payload::Map(_))
    }

    fn string(&self, v: &Payload) -> String {
        self.v2i(v).map(|j| j.to_string()).unwrap_or_default()
    }

    fn json_schema(&self) -> Json {
        json!({ "type": "object" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_absorbs_strings_and_bools() {
        assert_eq!(NumberCodec.i2v(&"2.5".into()), Some(Payload::Number(2.5)));
        assert_eq!(NumberCodec.i2v(&true.into()), Some(Payload::Number(1.0)));
        assert_eq!(NumberCodec.i2v(&"abc".into()), None);
    }

    #[test]
    fn test_number_string_is_shortest() {
        assert_eq!(NumberCodec.string(&Payload::Number(1.0)), "1");
        assert_eq!(NumberCodec.string(&Payload::Number(1.5)), "1.5");
    }

    #[test]
    fn test_bool_parses_strings() {
        assert_eq!(BoolCodec.i2v(&"true".into()), Some(Payload::Bool(true)));
        assert_eq!(BoolCodec.i2v(&"F".into()), Some(Payload::Bool(false)));
        assert_eq!(BoolCodec.i2v(&"yes".into()), None);
    }

    #[test]
    fn test_latlng_accepts_siblings() {
        let llh = Payload::LatLngHeight(LatLngHeight::new(1.0, 2.0, 3.0));
        assert_eq!(LatLngCodec.i2v(&llh), Some(Payload::LatLng(LatLng::new(1.0, 2.0))));

        let ll = Payload::LatLng(LatLng::new(1.0, 2.0));
        assert_eq!(
            LatLngHeightCodec.i2v(&ll),
            Some(Payload::LatLngHeight(LatLngHeight::new(1.0, 2.0, 0.0)))
        );
    }

    #[test]
    fn test_coordinates_accepts_flat_and_objects() {
        let flat = Payload::Json(json!([1, 2, 3, 4, 5, 6]));
        let objects = Payload::Json(json!([
            {"lat": 1, "lng": 2, "height": 3},
            {"lat": 4, "lng": 5, "height": 6},
        ]));
        assert_eq!(CoordinatesCodec.i2v(&flat), CoordinatesCodec.i2v(&objects));
        assert!(CoordinatesCodec.i2v(&Payload::Json(json!([1, 2]))).is_none());
    }

    #[test]
    fn test_polygon_wraps_coordinates() {
        let c = Coordinates(vec![LatLngHeight::new(1.0, 2.0, 3.0)]);
        assert_eq!(
            PolygonCodec.i2v(&Payload::Coordinates(c.clone())),
            Some(Payload::Polygon(Polygon(vec![c])))
        );
    }

    #[test]
    fn test_url_rejects_garbage() {
        assert!(UrlCodec.i2v(&"https://example.com/a.png".into()).is_some());
        assert!(UrlCodec.i2v(&"not a url".into()).is_none());
    }

    #[test]
    fn test_ref_rejects_empty() {
        assert!(RefCodec.i2v(&"".into()).is_none());
        assert!(!RefCodec.validate(&Payload::String(String::new())));
    }
}
