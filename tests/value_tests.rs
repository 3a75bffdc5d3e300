//! Value Casting Tests
//!
//! Conversions between the built-in types and through caller-supplied codecs.

use std::collections::HashMap;
use std::sync::Arc;

use plugin_schemas::value::{Codec, Codecs, LatLng, LatLngHeight, Payload};
use plugin_schemas::{Optional, Type};
use serde_json::{json, Value as Json};

fn value(t: &Type, p: impl Into<Payload>) -> plugin_schemas::Value {
    t.value_from(&p.into(), None).unwrap()
}

// =============================================================================
// Built-in Types
// =============================================================================

#[test]
fn test_self_cast_is_identity() {
    let samples = [
        value(&Type::BOOL, true),
        value(&Type::NUMBER, 1.5),
        value(&Type::STRING, "hello"),
        value(&Type::LATLNG, LatLng::new(1.0, 2.0)),
        value(&Type::LATLNGHEIGHT, LatLngHeight::new(1.0, 2.0, 3.0)),
        value(&Type::COORDINATES, json!([1.0, 2.0, 3.0, 4.0, 5.0, 6.0])),
        value(&Type::MAP, json!({ "a": 1 })),
    ];
    for v in samples {
        assert_eq!(v.cast(v.value_type(), None).as_ref(), Some(&v));
    }
}

#[test]
fn test_latlng_to_string_is_lng_first() {
    let v = value(&Type::LATLNG, LatLng::new(1.0, 2.0));
    let s = v.cast(&Type::STRING, None).unwrap();
    assert_eq!(s.as_str(), Some("2.000000, 1.000000"));
}

#[test]
fn test_primitive_casts() {
    let n = value(&Type::STRING, "42").cast(&Type::NUMBER, None).unwrap();
    assert_eq!(n.as_f64(), Some(42.0));

    let s = value(&Type::NUMBER, 1.0).cast(&Type::STRING, None).unwrap();
    assert_eq!(s.as_str(), Some("1"));

    let b = value(&Type::STRING, "true").cast(&Type::BOOL, None).unwrap();
    assert_eq!(b.as_bool(), Some(true));

    assert!(value(&Type::STRING, "abc").cast(&Type::NUMBER, None).is_none());
}

#[test]
fn test_composite_siblings() {
    let llh = value(&Type::LATLNGHEIGHT, LatLngHeight::new(1.0, 2.0, 3.0));
    let ll = llh.cast(&Type::LATLNG, None).unwrap();
    assert_eq!(ll.interface(), Some(json!({ "lat": 1.0, "lng": 2.0 })));

    let coords = ll.cast(&Type::COORDINATES, None).unwrap();
    assert_eq!(coords.interface().unwrap().as_array().unwrap().len(), 1);

    let polygon = coords.cast(&Type::POLYGON, None).unwrap();
    assert_eq!(polygon.value_type(), &Type::POLYGON);
}

#[test]
fn test_loose_json_decoding() {
    let v = Type::LATLNG
        .value_from(&Payload::from(json!({ "lat": 35.0, "lng": 139.0 })), None)
        .unwrap();
    assert_eq!(v.payload(), &Payload::LatLng(LatLng::new(35.0, 139.0)));

    let rect = Type::RECT.value_from(
        &Payload::from(json!({ "west": 1.0, "south": 2.0, "east": 3.0, "north": 4.0 })),
        None,
    );
    assert!(rect.is_some());

    assert!(Type::LATLNG
        .value_from(&Payload::from(json!({ "x": 1 })), None)
        .is_none());
}

#[test]
fn test_unknown_type_yields_nothing() {
    assert!(Type::new("color").value_from(&"#fff".into(), None).is_none());
    assert!(Type::new("color").none().is_none());
    assert!(Optional::new(Type::new("color"), None).is_none());
}

#[test]
fn test_optional_type_match() {
    let s = value(&Type::STRING, "a");
    assert!(Optional::new(Type::NUMBER, Some(s.clone())).is_none());

    let mut o = Optional::new(Type::STRING, None).unwrap();
    o.set_value(Some(value(&Type::NUMBER, 1.0)));
    assert!(o.is_none());
    o.set_value(Some(s));
    assert!(!o.is_none());

    let cast = o.cast(&Type::NUMBER, None);
    assert_eq!(cast.value_type(), &Type::NUMBER);
    assert!(cast.is_none());
}

// =============================================================================
// Custom Codecs
// =============================================================================

struct HexColorCodec;

impl Codec for HexColorCodec {
    fn i2v(&self, input: &Payload) -> Option<Payload> {
        match input.normalized() {
            Payload::String(s) if s.starts_with('#') && s.len() == 7 => {
                Some(Payload::String(s.to_lowercase()))
            }
            _ => None,
        }
    }

    fn v2i(&self, v: &Payload) -> Option<Json> {
        v.to_json()
    }

    fn validate(&self, v: &Payload) -> bool {
        matches!(v, Payload::String(s) if s.len() == 7)
    }

    fn string(&self, v: &Payload) -> String {
        match v {
            Payload::String(s) => s.clone(),
            _ => String::new(),
        }
    }

    fn json_schema(&self) -> Json {
        json!({ "type": "string", "pattern": "^#[0-9a-f]{6}$" })
    }
}

fn custom() -> Arc<Codecs> {
    let mut codecs: Codecs = HashMap::new();
    codecs.insert(Type::new("color"), Arc::new(HexColorCodec));
    Arc::new(codecs)
}

#[test]
fn test_custom_codec_is_consulted_first() {
    let codecs = custom();
    let color = Type::new("color")
        .value_from(&"#FFAA00".into(), Some(&codecs))
        .unwrap();
    assert_eq!(color.as_str(), Some("#ffaa00"));
    assert!(color.codecs().is_some());
    assert!(color.validate());
    assert_eq!(color.to_string(), "#ffaa00");

    let s = color.cast(&Type::STRING, Some(&codecs)).unwrap();
    assert_eq!(s.as_str(), Some("#ffaa00"));

    let back = s.cast(&Type::new("color"), Some(&codecs)).unwrap();
    assert_eq!(back.value_type(), &Type::new("color"));
    assert!(s.cast(&Type::new("color"), None).is_none());

    assert_eq!(
        Type::new("color").json_schema(Some(&codecs)).unwrap()["pattern"],
        "^#[0-9a-f]{6}$"
    );
}
