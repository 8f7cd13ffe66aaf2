//! JSON-deserializable schema description.
//!
//! These types describe a schema tree so that layouts can ship as configuration
//! files. [SchemaDef::compile] turns a description into an [AnySchema] that
//! parses into and builds from [crate::value::Value]s.
//!
//! ```
//! use bytecraft::{prelude::*, serde::SchemaDef};
//!
//! let def = SchemaDef::from_json(r#"{
//!     "type": "struct",
//!     "fields": [
//!         { "name": "len", "schema": { "type": "uint8" } },
//!         { "name": "data", "schema": { "type": "bytes", "length": { "field": "len" } } }
//!     ]
//! }"#).unwrap();
//! let schema = def.compile().unwrap();
//! let value = schema.parse(&[2, 0xca, 0xfe]).unwrap();
//! assert_eq!(value.get("len"), Some(&Value::U64(2)));
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    encoding::from_hex,
    errors::ConfigError,
    length::Length,
    schema::{AnySchema, Schema},
    schemas::{
        Endian, Struct, Switch, Text, array, bytes, float32, float64, greedy_range, int8, int16,
        int32, int64, literal, literal_text, prefixed, sized, uint8, uint16, uint32, uint64,
    },
    value::Value,
};

/// A length or count: a literal number, or `{"field": name}`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum LengthDef {
    Fixed(usize),
    Field { field: String },
}

impl From<LengthDef> for Length {
    fn from(value: LengthDef) -> Self {
        match value {
            LengthDef::Fixed(n) => Length::Fixed(n),
            LengthDef::Field { field } => Length::Field(field),
        }
    }
}

/// A named struct field.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FieldDef {
    /// Key of the field in the parsed record.
    pub name: String,
    pub schema: SchemaDef,
}

/// Description of one schema node, tagged by `"type"`.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaDef {
    Uint8 {
        #[serde(default)]
        endian: Endian,
    },
    Uint16 {
        #[serde(default)]
        endian: Endian,
    },
    Uint32 {
        #[serde(default)]
        endian: Endian,
    },
    Uint64 {
        #[serde(default)]
        endian: Endian,
    },
    Int8 {
        #[serde(default)]
        endian: Endian,
    },
    Int16 {
        #[serde(default)]
        endian: Endian,
    },
    Int32 {
        #[serde(default)]
        endian: Endian,
    },
    Int64 {
        #[serde(default)]
        endian: Endian,
    },
    Float32 {
        #[serde(default)]
        endian: Endian,
    },
    Float64 {
        #[serde(default)]
        endian: Endian,
    },
    /// Raw bytes.
    Bytes { length: LengthDef },
    /// Constant bytes, given either as hex or as text. Exactly one must be set.
    Literal {
        #[serde(default)]
        hex: Option<String>,
        #[serde(default)]
        text: Option<String>,
    },
    /// UTF-8 text; without a length it takes the rest of the window.
    Text {
        #[serde(default)]
        length: Option<LengthDef>,
    },
    Hex {
        #[serde(default)]
        length: Option<LengthDef>,
    },
    Base64 {
        #[serde(default)]
        length: Option<LengthDef>,
    },
    Struct { fields: Vec<FieldDef> },
    Array {
        item: Box<SchemaDef>,
        count: LengthDef,
    },
    GreedyRange { item: Box<SchemaDef> },
    /// Dispatch on the canonical key of a field visible in the scope.
    Switch {
        on: String,
        #[serde(default)]
        cases: BTreeMap<String, SchemaDef>,
        #[serde(default)]
        default: Option<Box<SchemaDef>>,
    },
    /// A struct padded to the total size held in one of its own fields.
    Sized {
        inner: Box<SchemaDef>,
        length_field: String,
    },
    Prefixed {
        length: LengthDef,
        inner: Box<SchemaDef>,
    },
}

impl SchemaDef {
    /// Deserializes a definition from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|err| ConfigError::InvalidDefinition(err.to_string()))
    }

    /// Validates the definition and builds the schema it describes.
    pub fn compile(&self) -> Result<AnySchema, ConfigError> {
        let schema = match self {
            SchemaDef::Uint8 { endian } => uint8().endian(*endian).boxed(),
            SchemaDef::Uint16 { endian } => uint16().endian(*endian).boxed(),
            SchemaDef::Uint32 { endian } => uint32().endian(*endian).boxed(),
            SchemaDef::Uint64 { endian } => uint64().endian(*endian).boxed(),
            SchemaDef::Int8 { endian } => int8().endian(*endian).boxed(),
            SchemaDef::Int16 { endian } => int16().endian(*endian).boxed(),
            SchemaDef::Int32 { endian } => int32().endian(*endian).boxed(),
            SchemaDef::Int64 { endian } => int64().endian(*endian).boxed(),
            SchemaDef::Float32 { endian } => float32().endian(*endian).boxed(),
            SchemaDef::Float64 { endian } => float64().endian(*endian).boxed(),
            SchemaDef::Bytes { length } => bytes(length.clone()).boxed(),
            SchemaDef::Literal { hex, text } => match (hex, text) {
                (Some(hex), None) => {
                    let expected =
                        from_hex(hex).ok_or_else(|| ConfigError::InvalidLiteral(hex.clone()))?;
                    literal(expected).boxed()
                }
                (None, Some(text)) => literal_text(text).boxed(),
                _ => {
                    return Err(ConfigError::InvalidLiteral(
                        "exactly one of hex and text must be set".to_string(),
                    ));
                }
            },
            SchemaDef::Text { length } => with_length(crate::schemas::text(), length).boxed(),
            SchemaDef::Hex { length } => with_length(crate::schemas::hex(), length).boxed(),
            SchemaDef::Base64 { length } => with_length(crate::schemas::base64(), length).boxed(),
            SchemaDef::Struct { fields } => compile_struct(fields)?.boxed(),
            SchemaDef::Array { item, count } => array(item.compile()?, count.clone()).boxed(),
            SchemaDef::GreedyRange { item } => greedy_range(item.compile()?).boxed(),
            SchemaDef::Switch { on, cases, default } => {
                if cases.is_empty() && default.is_none() {
                    return Err(ConfigError::EmptySwitch(on.clone()));
                }
                let mut switch = Switch::on_field(on.as_str());
                for (key, case) in cases {
                    switch = switch.case(key, case.compile()?);
                }
                if let Some(default) = default {
                    switch = switch.default_case(default.compile()?);
                }
                switch.boxed()
            }
            SchemaDef::Sized {
                inner,
                length_field,
            } => {
                let SchemaDef::Struct { fields } = inner.as_ref() else {
                    return Err(ConfigError::InvalidSizedField(length_field.clone()));
                };
                if !fields.iter().any(|field| &field.name == length_field) {
                    return Err(ConfigError::InvalidSizedField(length_field.clone()));
                }
                let field = length_field.clone();
                sized(inner.compile()?, move |value: &Value| {
                    value.get(&field)?.as_i64()
                })
                .boxed()
            }
            SchemaDef::Prefixed { length, inner } => {
                prefixed(length.clone(), inner.compile()?).boxed()
            }
        };
        Ok(schema)
    }
}

fn with_length(text: Text, length: &Option<LengthDef>) -> Text {
    match length {
        Some(length) => text.length(length.clone()),
        None => text,
    }
}

fn compile_struct(fields: &[FieldDef]) -> Result<Struct, ConfigError> {
    let mut seen = HashSet::new();
    let mut schema = Struct::new();
    for field in fields {
        if field.name.is_empty() || !seen.insert(field.name.as_str()) {
            return Err(ConfigError::InvalidFieldName(field.name.clone()));
        }
        schema = schema.field(field.name.as_str(), field.schema.compile()?);
    }
    Ok(schema)
}

impl TryFrom<SchemaDef> for AnySchema {
    type Error = ConfigError;

    fn try_from(value: SchemaDef) -> Result<Self, Self::Error> {
        value.compile()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn test_numbers_with_endian() {
        let def = SchemaDef::from_json(r#"{"type": "uint16", "endian": "little"}"#).unwrap();
        let schema = def.compile().unwrap();
        assert_eq!(schema.parse(&[0x01, 0x02]), Ok(Value::U64(0x0201)));
    }

    #[test]
    fn test_greedy_and_literal() {
        let def = SchemaDef::from_json(
            r#"{
                "type": "struct",
                "fields": [
                    { "name": "magic", "schema": { "type": "literal", "text": "OK" } },
                    { "name": "items", "schema": {
                        "type": "greedy_range",
                        "item": { "type": "literal", "hex": "aabb" }
                    } }
                ]
            }"#,
        )
        .unwrap();
        let schema = def.compile().unwrap();
        let value = schema.parse(b"OK\xaa\xbb\xaa\xbb\xaa").unwrap();
        assert_eq!(
            value.get("items"),
            Some(&Value::Array(vec![
                Value::Bytes(Bytes::from_static(&[0xaa, 0xbb])),
                Value::Bytes(Bytes::from_static(&[0xaa, 0xbb])),
            ]))
        );
    }

    #[test]
    fn test_switch_and_sized() {
        let def = SchemaDef::from_json(
            r#"{
                "type": "struct",
                "fields": [
                    { "name": "kind", "schema": { "type": "uint8" } },
                    { "name": "body", "schema": {
                        "type": "switch",
                        "on": "kind",
                        "cases": {
                            "1": {
                                "type": "sized",
                                "length_field": "size",
                                "inner": { "type": "struct", "fields": [
                                    { "name": "size", "schema": { "type": "uint8" } }
                                ] }
                            }
                        },
                        "default": { "type": "hex" }
                    } }
                ]
            }"#,
        )
        .unwrap();
        let schema = def.compile().unwrap();

        let value = schema.parse(&[1, 3, 0xff, 0xff]).unwrap();
        assert_eq!(
            value.get("body"),
            Some(&Value::record([("size", Value::U64(3))]))
        );
        assert_eq!(schema.build(&value), Ok(vec![1, 3, 0, 0]));

        let value = schema.parse(&[2, 0xca, 0xfe]).unwrap();
        assert_eq!(value.get("body"), Some(&Value::from("cafe")));
    }

    #[test]
    fn test_duplicate_field_name() {
        let def = SchemaDef::Struct {
            fields: vec![
                FieldDef {
                    name: "a".to_string(),
                    schema: SchemaDef::Uint8 {
                        endian: Endian::Big,
                    },
                },
                FieldDef {
                    name: "a".to_string(),
                    schema: SchemaDef::Uint8 {
                        endian: Endian::Big,
                    },
                },
            ],
        };
        assert!(matches!(
            AnySchema::try_from(def),
            Err(ConfigError::InvalidFieldName(name)) if name == "a"
        ));
    }

    #[test]
    fn test_invalid_definitions() {
        let bad_literal = SchemaDef::Literal {
            hex: Some("xyz".to_string()),
            text: None,
        };
        assert!(matches!(
            bad_literal.compile(),
            Err(ConfigError::InvalidLiteral(_))
        ));

        let empty_switch = SchemaDef::Switch {
            on: "kind".to_string(),
            cases: BTreeMap::new(),
            default: None,
        };
        assert_eq!(
            empty_switch.compile().err(),
            Some(ConfigError::EmptySwitch("kind".to_string()))
        );

        let sized_number = SchemaDef::Sized {
            inner: Box::new(SchemaDef::Uint8 {
                endian: Endian::Big,
            }),
            length_field: "size".to_string(),
        };
        assert!(matches!(
            sized_number.compile(),
            Err(ConfigError::InvalidSizedField(_))
        ));

        assert!(matches!(
            SchemaDef::from_json(r#"{"type": "nope"}"#),
            Err(ConfigError::InvalidDefinition(_))
        ));
    }

    #[test]
    fn test_definition_round_trips_through_json() {
        let def = SchemaDef::Array {
            item: Box::new(SchemaDef::Int32 {
                endian: Endian::Little,
            }),
            count: LengthDef::Field {
                field: "n".to_string(),
            },
        };
        let json = serde_json::to_string(&def).unwrap();
        let back = SchemaDef::from_json(&json).unwrap();
        assert!(matches!(
            back,
            SchemaDef::Array { count: LengthDef::Field { ref field }, .. } if field == "n"
        ));
    }

    #[test]
    fn test_value_serializes_untagged() {
        let value = Value::record([("a", Value::U64(1)), ("b", Value::from("x"))]);
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"a":1,"b":"x"}"#
        );
        let back: Value = serde_json::from_str(r#"{"a":1,"b":[1,2]}"#).unwrap();
        assert_eq!(
            back.get("b"),
            Some(&Value::Array(vec![Value::U64(1), Value::U64(2)]))
        );
    }
}
