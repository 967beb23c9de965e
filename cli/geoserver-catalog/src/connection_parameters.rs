//! Connection parameters of a data store and their wire encoding.
//!
//! GeoServer does not encode the (open ended) connection parameters of a data
//! store as a plain JSON object.
//! Instead it uses the XStream convention of a container with a single
//! `entry` array whose elements carry the key as `@key` and the value as `$`:
//!
//! ```json
//! { "entry": [ { "@key": "url", "$": "file:///data/states.shp" } ] }
//! ```
//!
//! The order of entries is part of the stored representation and duplicate
//! keys are legal, so the list is kept as an ordered `Vec` rather than a map.
//! Decoding is strict: anything but exactly the shape above is rejected.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

const CONTAINER_FIELD: &str = "entry";
const KEY_FIELD: &str = "@key";
const VALUE_FIELD: &str = "$";
const ENTRY_FIELDS: &[&str] = &[KEY_FIELD, VALUE_FIELD];
const CONTAINER_FIELDS: &[&str] = &[CONTAINER_FIELD];

/// A single key/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionParameter {
    key: String,
    value: String,
}

impl ConnectionParameter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for ConnectionParameter {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

/// Ordered list of [ConnectionParameter]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionParameters(Vec<ConnectionParameter>);

impl ConnectionParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters of a shapefile data store.
    ///
    /// `url` points at the `.shp` file, `namespace` is the URI of the
    /// namespace features are published under.
    pub fn shapefile(url: &Url, namespace: &Url) -> Self {
        [("namespace", namespace.as_str()), ("url", url.as_str())]
            .into_iter()
            .collect()
    }

    pub fn push(&mut self, parameter: impl Into<ConnectionParameter>) {
        self.0.push(parameter.into());
    }

    /// Value of the first parameter named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|parameter| parameter.key == key)
            .map(ConnectionParameter::value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConnectionParameter> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<ConnectionParameter> {
        self.0
    }
}

impl From<Vec<ConnectionParameter>> for ConnectionParameters {
    fn from(parameters: Vec<ConnectionParameter>) -> Self {
        Self(parameters)
    }
}

impl<P: Into<ConnectionParameter>> FromIterator<P> for ConnectionParameters {
    fn from_iter<T: IntoIterator<Item = P>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for ConnectionParameters {
    type IntoIter = std::vec::IntoIter<ConnectionParameter>;
    type Item = ConnectionParameter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConnectionParameters {
    type IntoIter = std::slice::Iter<'a, ConnectionParameter>;
    type Item = &'a ConnectionParameter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// Wire encoding
// =============================================================================

impl Serialize for ConnectionParameter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut entry = serializer.serialize_struct("ConnectionParameter", 2)?;
        entry.serialize_field(KEY_FIELD, &self.key)?;
        entry.serialize_field(VALUE_FIELD, &self.value)?;
        entry.end()
    }
}

impl Serialize for ConnectionParameters {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Always emit `entry`, even for an empty list, so the shape is stable.
        let mut container = serializer.serialize_map(Some(1))?;
        container.serialize_entry(CONTAINER_FIELD, &self.0)?;
        container.end()
    }
}

// Entries are decoded with hand written visitors rather than derived impls:
// derived struct impls also accept JSON arrays (`["k", "v"]`) which is not a
// legal entry.

impl<'de> Deserialize<'de> for ConnectionParameter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = ConnectionParameter;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "an object with exactly the fields `{KEY_FIELD}` and `{VALUE_FIELD}`")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut key = None;
                let mut value = None;

                while let Some(field) = map.next_key::<String>()? {
                    match field.as_str() {
                        KEY_FIELD if key.is_some() => {
                            return Err(de::Error::duplicate_field(KEY_FIELD));
                        },
                        KEY_FIELD => key = Some(map.next_value::<String>()?),
                        VALUE_FIELD if value.is_some() => {
                            return Err(de::Error::duplicate_field(VALUE_FIELD));
                        },
                        VALUE_FIELD => value = Some(map.next_value::<String>()?),
                        other => {
                            return Err(de::Error::unknown_field(other, ENTRY_FIELDS));
                        },
                    }
                }

                let key = key.ok_or_else(|| de::Error::missing_field(KEY_FIELD))?;
                let value = value.ok_or_else(|| de::Error::missing_field(VALUE_FIELD))?;
                Ok(ConnectionParameter { key, value })
            }
        }

        deserializer.deserialize_map(EntryVisitor)
    }
}

impl<'de> Deserialize<'de> for ConnectionParameters {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ContainerVisitor;

        impl<'de> Visitor<'de> for ContainerVisitor {
            type Value = ConnectionParameters;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "an object with the single field `{CONTAINER_FIELD}`")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries: Option<Vec<ConnectionParameter>> = None;

                while let Some(field) = map.next_key::<String>()? {
                    if field != CONTAINER_FIELD {
                        return Err(de::Error::unknown_field(&field, CONTAINER_FIELDS));
                    }
                    if entries.is_some() {
                        return Err(de::Error::duplicate_field(CONTAINER_FIELD));
                    }
                    entries = Some(map.next_value()?);
                }

                entries
                    .map(ConnectionParameters)
                    .ok_or_else(|| de::Error::missing_field(CONTAINER_FIELD))
            }
        }

        deserializer.deserialize_map(ContainerVisitor)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn decode(value: serde_json::Value) -> Result<ConnectionParameters, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn encodes_entries_in_order() {
        let parameters: ConnectionParameters =
            [("url", "file:///data/states.shp"), ("charset", "UTF-8")]
                .into_iter()
                .collect();

        let encoded = serde_json::to_value(&parameters).unwrap();
        assert_eq!(
            encoded,
            json!({
                "entry": [
                    { "@key": "url", "$": "file:///data/states.shp" },
                    { "@key": "charset", "$": "UTF-8" },
                ]
            })
        );
    }

    #[test]
    fn empty_list_keeps_entry_field() {
        let encoded = serde_json::to_string(&ConnectionParameters::new()).unwrap();
        assert_eq!(encoded, r#"{"entry":[]}"#);
    }

    #[test]
    fn decodes_fields_in_either_order() {
        let decoded = decode(json!({
            "entry": [
                { "$": "b", "@key": "a" },
                { "@key": "c", "$": "d" },
            ]
        }))
        .unwrap();

        assert_eq!(decoded.into_inner(), vec![
            ConnectionParameter::new("a", "b"),
            ConnectionParameter::new("c", "d"),
        ]);
    }

    #[test]
    fn keeps_duplicate_keys() {
        let decoded = decode(json!({
            "entry": [
                { "@key": "dbtype", "$": "postgis" },
                { "@key": "dbtype", "$": "shapefile" },
            ]
        }))
        .unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.get("dbtype"), Some("postgis"));
    }

    #[test]
    fn shapefile_parameters() {
        let url = Url::parse("file:///data/shapefiles/states.shp").unwrap();
        let namespace = Url::parse("http://www.openplans.org/topp").unwrap();

        let parameters = ConnectionParameters::shapefile(&url, &namespace);
        assert_eq!(parameters.into_inner(), vec![
            ConnectionParameter::new("namespace", "http://www.openplans.org/topp"),
            ConnectionParameter::new("url", "file:///data/shapefiles/states.shp"),
        ]);
    }

    #[test]
    fn rejects_unknown_entry_field() {
        let err = decode(json!({ "entry": [ { "@key": "a", "value": "b" } ] })).unwrap_err();
        assert!(err.to_string().contains("unknown field `value`"), "{err}");
    }

    #[test]
    fn rejects_extra_entry_field() {
        decode(json!({ "entry": [ { "@key": "a", "$": "b", "@type": "c" } ] })).unwrap_err();
    }

    #[test]
    fn rejects_missing_entry_field() {
        let err = decode(json!({ "entry": [ { "@key": "a" } ] })).unwrap_err();
        assert!(err.to_string().contains("missing field `$`"), "{err}");
    }

    #[test]
    fn rejects_non_string_value() {
        decode(json!({ "entry": [ { "@key": "a", "$": 1 } ] })).unwrap_err();
        decode(json!({ "entry": [ { "@key": null, "$": "b" } ] })).unwrap_err();
    }

    #[test]
    fn rejects_array_entry() {
        decode(json!({ "entry": [ ["a", "b"] ] })).unwrap_err();
    }

    #[test]
    fn rejects_wrong_container() {
        decode(json!([ { "@key": "a", "$": "b" } ])).unwrap_err();
        decode(json!({ "entries": [] })).unwrap_err();
        decode(json!({ "entry": [], "extra": [] })).unwrap_err();
        decode(json!({})).unwrap_err();
        decode(json!({ "entry": { "@key": "a", "$": "b" } })).unwrap_err();
    }

    #[test]
    fn rejects_duplicate_entry_field() {
        let err = serde_json::from_str::<ConnectionParameters>(
            r#"{"entry":[{"@key":"a","@key":"b","$":"c"}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate field"), "{err}");
    }

    #[test]
    fn rejects_truncated_input() {
        serde_json::from_str::<ConnectionParameters>(r#"{"entry":[{"@key":"a","$":"b"}"#)
            .unwrap_err();
    }

    proptest! {
        #[test]
        fn round_trip_preserves_order(
            entries in proptest::collection::vec((".*", ".*"), 0..16),
            duplicate in any::<bool>(),
        ) {
            let mut parameters: ConnectionParameters = entries.into_iter().collect();
            let first = parameters.iter().next().cloned();
            if let Some(first) = first.filter(|_| duplicate) {
                parameters.push(first);
            }

            let encoded = serde_json::to_string(&parameters).unwrap();
            let decoded: ConnectionParameters = serde_json::from_str(&encoded).unwrap();
            prop_assert_eq!(decoded, parameters);
        }
    }
}
