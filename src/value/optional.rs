//! A type-tagged slot that may hold no value yet

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as Json;
use std::sync::Arc;

use super::{Codecs, Payload, Type, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Optional {
    t: Type,
    v: Option<Value>,
}

impl Optional {
    /// Returns `None` when the type is unknown or the value's type differs
    pub fn new(t: Type, v: Option<Value>) -> Option<Self> {
        match &v {
            Some(value) => {
                if value.value_type() != &t || value.is_empty() {
                    return None;
                }
            }
            None => {
                if !t.is_default() {
                    return None;
                }
            }
        }
        Some(Self { t, v })
    }

    pub(crate) fn of(v: Value) -> Self {
        Self {
            t: v.value_type().clone(),
            v: Some(v),
        }
    }

    pub fn value_type(&self) -> &Type {
        &self.t
    }

    pub fn value(&self) -> Option<&Value> {
        self.v.as_ref()
    }

    pub fn take_value(self) -> Option<Value> {
        self.v
    }

    pub fn is_none(&self) -> bool {
        self.v.is_none()
    }

    /// Replace the value; a value of another type is ignored
    pub fn set_value(&mut self, v: Option<Value>) {
        if let Some(value) = &v {
            if value.value_type() != &self.t {
                return;
            }
        }
        self.v = v;
    }

    /// Cast into another type; a value that cannot be converted is dropped
    pub fn cast(&self, t: &Type, custom: Option<&Arc<Codecs>>) -> Optional {
        let v = self.v.as_ref().and_then(|v| v.cast(t, custom));
        Optional { t: t.clone(), v }
    }
}

/// Persisted form: the type name and the value's JSON projection
#[derive(Serialize, Deserialize)]
struct OptionalRecord {
    #[serde(rename = "type")]
    t: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Json>,
}

impl Serialize for Optional {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        OptionalRecord {
            t: self.t.clone(),
            value: self.v.as_ref().and_then(Value::interface),
        }
        .serialize(serializer)
    }
}

/// Decodes with the built-in codecs only
impl<'de> Deserialize<'de> for Optional {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = OptionalRecord::deserialize(deserializer)?;
        let value = match record.value {
            Some(json) => Some(
                record
                    .t
                    .value_from(&Payload::from(json), None)
                    .ok_or_else(|| D::Error::custom(format!("value is not a valid {}", record.t)))?,
            ),
            None => None,
        };
        let t = record.t.clone();
        Optional::new(record.t, value).ok_or_else(|| D::Error::custom(format!("unknown value type '{t}'")))
    }
}
