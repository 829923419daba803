// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schemas: ordered field-name → type mappings.
//!
//! Field order is semantically significant -- it defines the wire layout, and
//! producer and consumer must agree on it exactly. Schemas are checked
//! against a registry at build time, so unknown type names surface before
//! any encode/decode call.

use crate::registry::{RegistryError, TypeRegistry};
use crate::typeexpr::TypeExpr;
use std::fmt;

/// One schema field: the declared tag string and its parsed form.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    /// Field name.
    pub name: String,
    /// Declared type tag (as written by the caller).
    pub tag: String,
    /// Parsed type expression.
    pub expr: TypeExpr,
}

/// Errors from schema construction.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A field tag failed to parse or referenced an unknown type.
    Registry { field: String, source: RegistryError },
    /// The same field name was declared twice.
    DuplicateField(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry { field, source } => {
                write!(f, "schema field {:?}: {}", field, source)
            }
            Self::DuplicateField(name) => write!(f, "duplicate schema field {:?}", name),
        }
    }
}

impl std::error::Error for SchemaError {}

/// An ordered, immutable field-name → type mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<SchemaField>,
}

impl Schema {
    /// Build a schema from ordered `(field name, type tag)` pairs, checking
    /// every tag against `registry`.
    pub fn build(
        registry: &TypeRegistry,
        fields: &[(&str, &str)],
    ) -> Result<Self, SchemaError> {
        let mut builder = Self::builder();
        for (name, tag) in fields {
            builder = builder.field(*name, *tag);
        }
        builder.build(registry)
    }

    /// Start a fluent builder.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder { fields: Vec::new() }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    /// Field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Declaration-order index of a field.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Fluent schema builder.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<(String, String)>,
}

impl SchemaBuilder {
    /// Append a field. Declaration order is wire order.
    pub fn field(mut self, name: impl Into<String>, tag: impl Into<String>) -> Self {
        self.fields.push((name.into(), tag.into()));
        self
    }

    /// Parse and registry-check every field, producing the schema.
    pub fn build(self, registry: &TypeRegistry) -> Result<Schema, SchemaError> {
        let mut fields: Vec<SchemaField> = Vec::with_capacity(self.fields.len());
        for (name, tag) in self.fields {
            if fields.iter().any(|f| f.name == name) {
                return Err(SchemaError::DuplicateField(name));
            }
            let expr = registry
                .resolve(&tag)
                .map_err(|source| SchemaError::Registry {
                    field: name.clone(),
                    source,
                })?;
            fields.push(SchemaField { name, tag, expr });
        }
        Ok(Schema { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeexpr::PrimitiveKind;

    #[test]
    fn build_preserves_order() {
        let reg = TypeRegistry::new();
        let schema = Schema::build(
            &reg,
            &[("name", "ascii"), ("power_level", "u64"), ("tags", "vector<string>")],
        )
        .unwrap();

        let names: Vec<&str> = schema.names().collect();
        assert_eq!(names, vec!["name", "power_level", "tags"]);
        assert_eq!(schema.index_of("power_level"), Some(1));
        assert_eq!(
            schema.field("name").unwrap().expr,
            TypeExpr::Primitive(PrimitiveKind::Ascii)
        );
    }

    #[test]
    fn builder_matches_build() {
        let reg = TypeRegistry::new();
        let a = Schema::build(&reg, &[("x", "u8"), ("y", "Option<u64>")]).unwrap();
        let b = Schema::builder()
            .field("x", "u8")
            .field("y", "Option<u64>")
            .build(&reg)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_type_fails_with_field() {
        let reg = TypeRegistry::new();
        let err = Schema::build(&reg, &[("pet", "Dragon")]).unwrap_err();
        match err {
            SchemaError::Registry { field, source } => {
                assert_eq!(field, "pet");
                assert_eq!(source, RegistryError::UnknownType("Dragon".to_string()));
            }
            other => panic!("expected registry error, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_field_rejected() {
        let reg = TypeRegistry::new();
        assert_eq!(
            Schema::build(&reg, &[("x", "u8"), ("x", "u16")]).unwrap_err(),
            SchemaError::DuplicateField("x".to_string())
        );
    }

    #[test]
    fn registered_types_usable() {
        let reg = TypeRegistry::new();
        reg.register_struct("Weapon", &[("damage", "u32")]).unwrap();
        let schema = Schema::build(&reg, &[("loadout", "vector<Weapon>")]).unwrap();
        assert_eq!(schema.len(), 1);
    }
}
