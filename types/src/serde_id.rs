//! Identifiers that the live platform emits either as JSON numbers or as
//! strings. Both are accepted and kept as strings, since room and user ids
//! routinely exceed the range a JSON number can carry exactly.

use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Number(u64),
    Text(String),
}

impl From<Repr> for String {
    fn from(value: Repr) -> Self {
        match value {
            Repr::Number(number) => number.to_string(),
            Repr::Text(text) => text,
        }
    }
}

pub(crate) mod required {
    use super::*;

    pub fn serialize<S>(value: &str, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Repr::deserialize(deserializer).map(String::from)
    }
}

pub(crate) mod optional {
    use super::*;

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_str(value),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Repr>::deserialize(deserializer).map(|value| value.map(String::from))
    }
}
