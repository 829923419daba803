// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema/value conformance checking.
//!
//! Validates a keyed record against a schema before serialization, failing
//! fast on the first invalid field (in schema order) with the field name,
//! the expected type tag, and a description of the actual value.
//!
//! Extra record fields not named by the schema are ignored. A schema field
//! missing from the record is an error unless its type is `Option<...>`; an
//! omitted optional is accepted and treated as `none`.

use crate::codec::{bind_params, DEFAULT_MAX_DEPTH};
use crate::registry::{RegistryError, TypeDef, TypeRegistry};
use crate::schema::Schema;
use crate::typeexpr::{PrimitiveKind, TypeExpr};
use crate::value::BcsValue;
use std::collections::HashMap;
use std::fmt;

/// Errors from record validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidateError {
    /// A non-optional schema field is absent from the record.
    MissingField { field: String, expected: String },
    /// A field's value does not conform to its declared type.
    Mismatch {
        field: String,
        expected: String,
        found: String,
    },
    /// The value graph under a field is nested too deep.
    DepthExceeded { field: String, limit: usize },
    /// Type resolution failed while walking a field's type.
    Registry { field: String, source: RegistryError },
}

impl fmt::Display for ValidateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field, expected } => {
                write!(f, "field {:?}: missing value of type {}", field, expected)
            }
            Self::Mismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "field {:?}: expected {}, found {}",
                field, expected, found
            ),
            Self::DepthExceeded { field, limit } => {
                write!(f, "field {:?}: nesting exceeds max depth {}", field, limit)
            }
            Self::Registry { field, source } => write!(f, "field {:?}: {}", field, source),
        }
    }
}

impl std::error::Error for ValidateError {}

/// Check `record` against `schema`, failing fast on the first invalid field.
pub fn validate(
    registry: &TypeRegistry,
    schema: &Schema,
    record: &HashMap<String, BcsValue>,
) -> Result<(), ValidateError> {
    for field in schema.fields() {
        match record.get(&field.name) {
            Some(value) => {
                check_value(registry, &field.expr, value, 0)
                    .map_err(|fault| fault.for_field(&field.name))?;
            }
            None if field.expr.is_option() => {}
            None => {
                return Err(ValidateError::MissingField {
                    field: field.name.clone(),
                    expected: field.expr.to_string(),
                });
            }
        }
    }
    Ok(())
}

enum Fault {
    Mismatch { expected: String, found: String },
    Depth(usize),
    Registry(RegistryError),
}

impl Fault {
    fn for_field(self, field: &str) -> ValidateError {
        match self {
            Self::Mismatch { expected, found } => ValidateError::Mismatch {
                field: field.to_string(),
                expected,
                found,
            },
            Self::Depth(limit) => ValidateError::DepthExceeded {
                field: field.to_string(),
                limit,
            },
            Self::Registry(source) => ValidateError::Registry {
                field: field.to_string(),
                source,
            },
        }
    }

    fn mismatch(expected: impl ToString, found: &BcsValue) -> Self {
        Self::Mismatch {
            expected: expected.to_string(),
            found: found.describe(),
        }
    }
}

fn check_value(
    registry: &TypeRegistry,
    expr: &TypeExpr,
    value: &BcsValue,
    depth: usize,
) -> Result<(), Fault> {
    if depth >= DEFAULT_MAX_DEPTH {
        return Err(Fault::Depth(DEFAULT_MAX_DEPTH));
    }
    match expr {
        TypeExpr::Primitive(kind) => check_primitive(*kind, value),
        TypeExpr::Vector(elem) => {
            let items = value
                .as_vector()
                .ok_or_else(|| Fault::mismatch(expr, value))?;
            for item in items {
                check_value(registry, elem, item, depth + 1)?;
            }
            Ok(())
        }
        TypeExpr::Option(inner) => match value.as_option() {
            Some(None) => Ok(()),
            Some(Some(present)) => check_value(registry, inner, present, depth + 1),
            None => Err(Fault::mismatch(expr, value)),
        },
        TypeExpr::Map(key_expr, value_expr) => {
            let entries = value.as_map().ok_or_else(|| Fault::mismatch(expr, value))?;
            for (key, entry_value) in entries {
                check_value(registry, key_expr, key, depth + 1)?;
                check_value(registry, value_expr, entry_value, depth + 1)?;
            }
            // VecMap keys must be unique.
            for (i, (key, _)) in entries.iter().enumerate() {
                if entries[i + 1..].iter().any(|(other, _)| other == key) {
                    return Err(Fault::Mismatch {
                        expected: expr.to_string(),
                        found: format!("map with duplicate key {}", key.describe()),
                    });
                }
            }
            Ok(())
        }
        TypeExpr::Named { name, args } => check_named(registry, name, args, value, depth),
    }
}

fn check_named(
    registry: &TypeRegistry,
    name: &str,
    args: &[TypeExpr],
    value: &BcsValue,
    depth: usize,
) -> Result<(), Fault> {
    let def = registry
        .get(name)
        .ok_or_else(|| Fault::Registry(RegistryError::UnknownType(name.to_string())))?;
    match &*def {
        TypeDef::Primitive(kind) => {
            check_def_arity(name, 0, args.len())?;
            check_primitive(*kind, value)
        }
        TypeDef::Struct(def) => {
            check_def_arity(name, def.type_params.len(), args.len())?;
            let fields = match value {
                BcsValue::Struct(fields) => fields,
                other => return Err(Fault::mismatch(name, other)),
            };
            let bindings = bind_params(&def.type_params, args);
            for (field_name, field_expr) in &def.fields {
                let concrete = field_expr.substitute(&bindings);
                match fields.get(field_name) {
                    Some(field_value) => {
                        check_value(registry, &concrete, field_value, depth + 1)?;
                    }
                    None if concrete.is_option() => {}
                    None => {
                        return Err(Fault::Mismatch {
                            expected: name.to_string(),
                            found: format!("struct missing field {:?}", field_name),
                        });
                    }
                }
            }
            Ok(())
        }
        TypeDef::Enum(def) => {
            check_def_arity(name, 0, args.len())?;
            let (variant, payload) = match value {
                BcsValue::Enum(variant, payload) => (variant, payload),
                other => return Err(Fault::mismatch(name, other)),
            };
            let index = def.variant_index(variant).ok_or_else(|| Fault::Mismatch {
                expected: name.to_string(),
                found: format!("unknown variant {:?}", variant),
            })?;
            match (&def.variants[index].1, payload) {
                (Some(payload_expr), Some(payload_value)) => {
                    check_value(registry, payload_expr, payload_value, depth + 1)
                }
                (None, None) => Ok(()),
                (Some(_), None) => Err(Fault::Mismatch {
                    expected: name.to_string(),
                    found: format!("variant {:?} without its payload", variant),
                }),
                (None, Some(_)) => Err(Fault::Mismatch {
                    expected: name.to_string(),
                    found: format!("payload on unit variant {:?}", variant),
                }),
            }
        }
    }
}

fn check_def_arity(name: &str, expected: usize, got: usize) -> Result<(), Fault> {
    if expected == got {
        Ok(())
    } else {
        Err(Fault::Registry(RegistryError::ArityMismatch {
            name: name.to_string(),
            expected,
            got,
        }))
    }
}

fn check_primitive(kind: PrimitiveKind, value: &BcsValue) -> Result<(), Fault> {
    let ok = match (kind, value) {
        (PrimitiveKind::Bool, BcsValue::Bool(_))
        | (PrimitiveKind::U8, BcsValue::U8(_))
        | (PrimitiveKind::U16, BcsValue::U16(_))
        | (PrimitiveKind::U32, BcsValue::U32(_))
        | (PrimitiveKind::U64, BcsValue::U64(_))
        | (PrimitiveKind::U128, BcsValue::U128(_))
        | (PrimitiveKind::U256, BcsValue::U256(_))
        | (PrimitiveKind::Address, BcsValue::Address(_))
        | (PrimitiveKind::Id, BcsValue::Address(_))
        | (PrimitiveKind::Utf8, BcsValue::Ascii(_))
        | (PrimitiveKind::Utf8, BcsValue::Utf8(_)) => true,
        (PrimitiveKind::Ascii, BcsValue::Ascii(s) | BcsValue::Utf8(s)) => {
            if !s.is_ascii() {
                return Err(Fault::Mismatch {
                    expected: kind.tag().to_string(),
                    found: format!("non-ASCII text {:?}", s),
                });
            }
            true
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(Fault::mismatch(kind.tag(), value))
    }
}
