//! Typed values
//!
//! Every property value carries a [`Type`] tag and a [`Payload`]. A type is
//! only usable when a [`Codec`] is registered for it, either in the built-in
//! set or in a caller-supplied [`Codecs`] map threaded through every value.
//!
//! Conversions never fail loudly: a payload a codec cannot absorb simply
//! produces no value (`None`).

pub mod codecs;
pub mod geo;
pub mod optional;
pub mod payload;

pub use geo::{Coordinates, LatLng, LatLngHeight, Polygon, Rect};
pub use optional::Optional;
pub use payload::Payload;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Conversion, validation and rendering logic behind a [`Type`]
pub trait Codec: Send + Sync {
    /// Normalize a wild input into the canonical payload for this type
    fn i2v(&self, input: &Payload) -> Option<Payload>;
    /// Project a canonical payload into a JSON-friendly form
    fn v2i(&self, v: &Payload) -> Option<Json>;
    fn validate(&self, v: &Payload) -> bool;
    /// Human readable rendering, used for exports and string casts
    fn string(&self, v: &Payload) -> String;
    /// A JSON-Schema draft-07 fragment describing the type
    fn json_schema(&self) -> Json;
}

/// A map of codecs keyed by type
pub type Codecs = HashMap<Type, Arc<dyn Codec>>;

/// Name of a value type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Type(Cow<'static, str>);

impl Type {
    pub const BOOL: Type = Type(Cow::Borrowed("bool"));
    pub const NUMBER: Type = Type(Cow::Borrowed("number"));
    pub const STRING: Type = Type(Cow::Borrowed("string"));
    pub const REF: Type = Type(Cow::Borrowed("ref"));
    pub const URL: Type = Type(Cow::Borrowed("url"));
    pub const LATLNG: Type = Type(Cow::Borrowed("latlng"));
    pub const LATLNGHEIGHT: Type = Type(Cow::Borrowed("latlngheight"));
    pub const COORDINATES: Type = Type(Cow::Borrowed("coordinates"));
    pub const POLYGON: Type = Type(Cow::Borrowed("polygon"));
    pub const RECT: Type = Type(Cow::Borrowed("rect"));
    pub const ARRAY: Type = Type(Cow::Borrowed("array"));
    pub const MAP: Type = Type(Cow::Borrowed("map"));

    pub fn new(name: impl Into<String>) -> Self {
        Type(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a built-in codec exists for this type
    pub fn is_default(&self) -> bool {
        default_codecs().contains_key(self)
    }

    /// Resolve the codec, preferring custom codecs over the built-in set
    pub fn codec(&self, custom: Option<&Arc<Codecs>>) -> Option<Arc<dyn Codec>> {
        custom
            .and_then(|c| c.get(self))
            .or_else(|| default_codecs().get(self))
            .cloned()
    }

    /// Build a value of this type from any compatible input
    pub fn value_from(&self, input: &Payload, custom: Option<&Arc<Codecs>>) -> Option<Value> {
        let codec = self.codec(custom)?;
        let v = codec.i2v(input)?;
        Some(Value {
            t: self.clone(),
            v,
            codecs: custom.cloned(),
        })
    }

    /// An optional slot of this type holding no value; `None` when the type
    /// has no built-in codec
    pub fn none(&self) -> Option<Optional> {
        Optional::new(self.clone(), None)
    }

    pub fn json_schema(&self, custom: Option<&Arc<Codecs>>) -> Option<Json> {
        self.codec(custom).map(|c| c.json_schema())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Type {
    fn from(s: &str) -> Self {
        Type::new(s)
    }
}

/// The built-in codec set
pub fn default_codecs() -> &'static Codecs {
    static DEFAULTS: OnceLock<Codecs> = OnceLock::new();
    DEFAULTS.get_or_init(|| {
        let entries: [(Type, Arc<dyn Codec>); 12] = [
            (Type::BOOL, Arc::new(codecs::BoolCodec)),
            (Type::NUMBER, Arc::new(codecs::NumberCodec)),
            (Type::STRING, Arc::new(codecs::StringCodec)),
            (Type::REF, Arc::new(codecs::RefCodec)),
            (Type::URL, Arc::new(codecs::UrlCodec)),
            (Type::LATLNG, Arc::new(codecs::LatLngCodec)),
            (Type::LATLNGHEIGHT, Arc::new(codecs::LatLngHeightCodec)),
            (Type::COORDINATES, Arc::new(codecs::CoordinatesCodec)),
            (Type::POLYGON, Arc::new(codecs::PolygonCodec)),
            (Type::RECT, Arc::new(codecs::RectCodec)),
            (Type::ARRAY, Arc::new(codecs::ArrayCodec)),
            (Type::MAP, Arc::new(codecs::MapCodec)),
        ];
        entries.into_iter().collect()
    })
}

/// One typed datum
#[derive(Clone)]
pub struct Value {
    t: Type,
    v: Payload,
    codecs: Option<Arc<Codecs>>,
}

impl Value {
    pub fn value_type(&self) -> &Type {
        &self.t
    }

    pub fn payload(&self) -> &Payload {
        &self.v
    }

    /// The custom codecs this value was built with
    pub fn codecs(&self) -> Option<&Arc<Codecs>> {
        self.codecs.as_ref()
    }

    fn codec(&self) -> Option<Arc<dyn Codec>> {
        self.t.codec(self.codecs.as_ref())
    }

    /// True when no codec is known for the value's type
    pub fn is_empty(&self) -> bool {
        self.codec().is_none()
    }

    pub fn validate(&self) -> bool {
        self.codec().is_some_and(|c| c.validate(&self.v))
    }

    /// JSON-friendly projection of the payload
    pub fn interface(&self) -> Option<Json> {
        self.codec().and_then(|c| c.v2i(&self.v))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.v {
            Payload::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.v {
            Payload::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.v {
            Payload::String(s) => Some(s),
            _ => None,
        }
    }

    /// The referenced id, if this is a ref value
    pub fn as_ref_id(&self) -> Option<&str> {
        if self.t == Type::REF {
            self.as_str()
        } else {
            None
        }
    }

    /// Convert into another type by feeding this payload to the target codec
    pub fn cast(&self, t: &Type, custom: Option<&Arc<Codecs>>) -> Option<Value> {
        if &self.t == t {
            return Some(self.clone());
        }
        t.value_from(&self.v, custom)
    }

    /// Wrap this value into an optional slot of its own type
    pub fn some(self) -> Optional {
        Optional::of(self)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.t == other.t && self.v == other.v
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type", &self.t)
            .field("payload", &self.v)
            .field("custom_codecs", &self.codecs.is_some())
            .finish()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.codec() {
            Some(c) => f.write_str(&c.string(&self.v)),
            None => Ok(()),
        }
    }
}
