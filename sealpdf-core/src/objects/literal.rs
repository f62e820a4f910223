//! Native literals and their conversion to and from [`Object`].
//!
//! Literals are the authoring form used by [`ObjectGraph::obj`]: bare strings
//! become names, byte buffers become hex strings, and [`Literal::Absent`]
//! entries vanish from dictionaries.
//!
//! [`ObjectGraph::obj`]: crate::graph::ObjectGraph::obj

use crate::objects::{Dictionary, Object, ObjectId};
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    /// Missing value. Dropped from dictionaries, `null` anywhere else
    Absent,
    Bool(bool),
    Integer(i64),
    Real(f64),
    /// Becomes a name object
    Str(String),
    /// Becomes a hex string object
    Bytes(Vec<u8>),
    Array(Vec<Literal>),
    Dict(IndexMap<String, Literal>),
    /// Pre-built object, passed through unchanged
    Object(Object),
}

/// Flags for [`Literal::from_object`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralConfig {
    /// Convert nested arrays and dictionaries too
    pub deep: bool,
    /// References become their object number
    pub literal_ref: bool,
    /// Streams become the literal of their dictionary
    pub literal_stream_dict: bool,
    /// String and hex string objects become `Str`
    pub literal_string: bool,
}

impl Default for LiteralConfig {
    fn default() -> Self {
        Self {
            deep: true,
            literal_ref: false,
            literal_stream_dict: false,
            literal_string: false,
        }
    }
}

impl Literal {
    /// Ordered dictionary literal from key/value pairs.
    pub fn dict<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Literal)>,
    {
        Literal::Dict(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn array(items: impl IntoIterator<Item = Literal>) -> Self {
        Literal::Array(items.into_iter().collect())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Literal::Absent)
    }

    pub fn into_object(self) -> Object {
        match self {
            Literal::Null | Literal::Absent => Object::Null,
            Literal::Bool(b) => Object::Boolean(b),
            Literal::Integer(i) => Object::Integer(i),
            Literal::Real(f) => Object::Real(f),
            Literal::Str(s) => Object::Name(s),
            Literal::Bytes(bytes) => Object::HexString(bytes),
            Literal::Array(items) => {
                Object::Array(items.into_iter().map(Literal::into_object).collect())
            }
            Literal::Dict(entries) => Object::Dictionary(dict_from_entries(entries)),
            Literal::Object(object) => object,
        }
    }

    /// Inverse of [`Literal::into_object`].
    pub fn from_object(object: &Object, config: LiteralConfig) -> Self {
        match object {
            Object::Null => Literal::Null,
            Object::Boolean(b) => Literal::Bool(*b),
            Object::Integer(i) => Literal::Integer(*i),
            Object::Real(f) => Literal::Real(*f),
            Object::Name(n) => Literal::Str(n.clone()),
            Object::HexString(bytes) if config.literal_string => Literal::Str(latin1(bytes)),
            Object::HexString(bytes) => Literal::Bytes(bytes.clone()),
            Object::String(bytes) if config.literal_string => Literal::Str(latin1(bytes)),
            Object::String(_) => Literal::Object(object.clone()),
            Object::Reference(id) if config.literal_ref => Literal::Integer(id.number() as i64),
            Object::Reference(_) => Literal::Object(object.clone()),
            Object::Stream(stream) if config.literal_stream_dict => {
                dict_literal(stream.dictionary(), config)
            }
            Object::Stream(_) => Literal::Object(object.clone()),
            Object::Array(items) => Literal::Array(
                items
                    .iter()
                    .map(|item| child_literal(item, config))
                    .collect(),
            ),
            Object::Dictionary(dict) => dict_literal(dict, config),
        }
    }
}

fn dict_from_entries(entries: IndexMap<String, Literal>) -> Dictionary {
    let mut dict = Dictionary::with_capacity(entries.len());
    for (key, value) in entries {
        if !value.is_absent() {
            dict.set(key, value.into_object());
        }
    }
    dict
}

fn dict_literal(dict: &Dictionary, config: LiteralConfig) -> Literal {
    Literal::Dict(
        dict.iter()
            .map(|(key, value)| (key.clone(), child_literal(value, config)))
            .collect(),
    )
}

fn child_literal(object: &Object, config: LiteralConfig) -> Literal {
    if config.deep {
        Literal::from_object(object, config)
    } else {
        Literal::Object(object.clone())
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl From<i32> for Literal {
    fn from(i: i32) -> Self {
        Literal::Integer(i as i64)
    }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self {
        Literal::Integer(i)
    }
}

impl From<f64> for Literal {
    fn from(f: f64) -> Self {
        Literal::Real(f)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::Str(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::Str(s)
    }
}

impl From<Vec<u8>> for Literal {
    fn from(bytes: Vec<u8>) -> Self {
        Literal::Bytes(bytes)
    }
}

impl From<ObjectId> for Literal {
    fn from(id: ObjectId) -> Self {
        Literal::Object(Object::Reference(id))
    }
}

impl From<Object> for Literal {
    fn from(object: Object) -> Self {
        Literal::Object(object)
    }
}

impl<T: Into<Literal>> From<Option<T>> for Literal {
    fn from(value: Option<T>) -> Self {
        value.map_or(Literal::Absent, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Stream;

    #[test]
    fn test_str_becomes_name() {
        assert_eq!(Literal::from("Catalog").into_object(), Object::name("Catalog"));
        assert_eq!(
            Literal::Bytes(vec![0xAB, 0x01]).into_object(),
            Object::HexString(vec![0xAB, 0x01])
        );
    }

    #[test]
    fn test_absent_handling() {
        assert_eq!(Literal::Absent.into_object(), Object::Null);

        let dict = Literal::dict([
            ("Type", Literal::from("Page")),
            ("Parent", Literal::Absent),
            ("Rotate", Literal::from(None::<i64>)),
            ("Count", Literal::from(Some(3))),
        ])
        .into_object();
        let dict = dict.as_dict().unwrap();
        let keys: Vec<_> = dict.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Type", "Count"]);

        let arr = Literal::array([Literal::Integer(1), Literal::Absent]).into_object();
        assert_eq!(arr, Object::Array(vec![Object::Integer(1), Object::Null]));
    }

    #[test]
    fn test_object_passthrough() {
        let id = ObjectId::new(4, 0);
        assert_eq!(Literal::from(id).into_object(), Object::Reference(id));
        assert_eq!(
            Literal::Object(Object::string("raw")).into_object(),
            Object::string("raw")
        );
    }

    #[test]
    fn test_from_object_default_flags() {
        let config = LiteralConfig::default();
        assert_eq!(
            Literal::from_object(&Object::name("Font"), config),
            Literal::Str("Font".to_string())
        );
        assert_eq!(
            Literal::from_object(&Object::string("text"), config),
            Literal::Object(Object::string("text"))
        );
        assert_eq!(
            Literal::from_object(&Object::Reference(ObjectId::new(9, 0)), config),
            Literal::Object(Object::Reference(ObjectId::new(9, 0)))
        );
    }

    #[test]
    fn test_from_object_flags() {
        let config = LiteralConfig {
            literal_ref: true,
            literal_string: true,
            literal_stream_dict: true,
            ..LiteralConfig::default()
        };

        assert_eq!(
            Literal::from_object(&Object::Reference(ObjectId::new(9, 0)), config),
            Literal::Integer(9)
        );
        assert_eq!(
            Literal::from_object(&Object::string([b'a', 0xE9]), config),
            Literal::Str("a\u{e9}".to_string())
        );

        let mut dict = Dictionary::new();
        dict.set("Subtype", Object::name("Form"));
        let stream = Object::Stream(Stream::with_dictionary(dict, vec![1, 2]));
        assert_eq!(
            Literal::from_object(&stream, config),
            Literal::dict([
                ("Subtype", Literal::from("Form")),
                ("Length", Literal::Integer(2)),
            ])
        );
    }

    #[test]
    fn test_shallow_conversion_wraps_children() {
        let object = Object::Array(vec![
            Object::name("A"),
            Object::Array(vec![Object::Integer(1)]),
        ]);
        let config = LiteralConfig {
            deep: false,
            ..LiteralConfig::default()
        };

        assert_eq!(
            Literal::from_object(&object, config),
            Literal::array([
                Literal::Object(Object::name("A")),
                Literal::Object(Object::Array(vec![Object::Integer(1)])),
            ])
        );
    }

    #[test]
    fn test_round_trip() {
        let literal = Literal::dict([
            ("Type", Literal::from("XObject")),
            ("BBox", Literal::array([0.into(), 0.into(), 612.into(), 792.5.into()])),
            ("ID", Literal::Bytes(vec![1, 2, 3])),
            ("Visible", Literal::Bool(true)),
            ("Nothing", Literal::Null),
        ]);

        let object = literal.clone().into_object();
        assert_eq!(Literal::from_object(&object, LiteralConfig::default()), literal);
    }
}
