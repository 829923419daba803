// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry.
//!
//! Maps type names to their wire layouts: built-in primitive codecs, struct
//! layouts (ordered field lists), and enum layouts (ordered variant lists).
//! The registry is an explicitly constructed object -- independent registries
//! can coexist without cross-contamination.
//!
//! Field type expressions are parsed at registration time, so malformed tags
//! fail early; the *names* they reference may be forward references, resolved
//! lazily at first encode/decode/validate. Registering an already-present
//! name is a hard error, including collisions with the built-in primitives.

use crate::typeexpr::{parse_type_tag, PrimitiveKind, TypeExpr, TypeParseError};
use log::debug;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Layout definitions
// ---------------------------------------------------------------------------

/// A registered wire layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDef {
    /// Built-in leaf codec.
    Primitive(PrimitiveKind),
    /// Struct layout. Field order defines byte layout.
    Struct(StructDef),
    /// Enum layout. On the wire: ULEB128 variant index, then the variant's
    /// payload bytes (absent for unit variants).
    Enum(EnumDef),
}

/// Ordered struct layout, optionally generic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    /// Declared type parameter names, bound positionally at instantiation.
    pub type_params: Vec<String>,
    /// `(field name, field type)` in wire order.
    pub fields: Vec<(String, TypeExpr)>,
}

/// Ordered enum layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    /// `(variant name, payload type)` in tag order; `None` = unit variant.
    pub variants: Vec<(String, Option<TypeExpr>)>,
}

impl EnumDef {
    /// Variant index by name.
    pub fn variant_index(&self, name: &str) -> Option<usize> {
        self.variants.iter().position(|(n, _)| n == name)
    }
}

// ---------------------------------------------------------------------------
// RegistryError
// ---------------------------------------------------------------------------

/// Errors from registration and type resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The name is already registered (built-ins included).
    DuplicateType(String),
    /// A referenced name is not registered.
    UnknownType(String),
    /// A field/variant/schema tag failed to parse.
    Parse(TypeParseError),
    /// A generic reference with the wrong number of type arguments.
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    /// A struct declared the same field name twice.
    DuplicateField { type_name: String, field: String },
    /// An enum declared the same variant name twice.
    DuplicateVariant { type_name: String, variant: String },
    /// A type parameter name shadows a built-in primitive tag.
    ReservedParam(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateType(name) => write!(f, "type already registered: {:?}", name),
            Self::UnknownType(name) => write!(f, "unknown type: {:?}", name),
            Self::Parse(e) => write!(f, "type tag parse error: {}", e),
            Self::ArityMismatch {
                name,
                expected,
                got,
            } => write!(
                f,
                "{:?} expects {} type argument(s), got {}",
                name, expected, got
            ),
            Self::DuplicateField { type_name, field } => {
                write!(f, "duplicate field {:?} in struct {:?}", field, type_name)
            }
            Self::DuplicateVariant { type_name, variant } => {
                write!(f, "duplicate variant {:?} in enum {:?}", variant, type_name)
            }
            Self::ReservedParam(name) => {
                write!(f, "type parameter {:?} shadows a primitive tag", name)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<TypeParseError> for RegistryError {
    fn from(e: TypeParseError) -> Self {
        Self::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// TypeRegistry
// ---------------------------------------------------------------------------

/// Name → layout table consulted by every encode/decode/validate call.
///
/// Registrations take the write lock; lookups take read locks, so concurrent
/// readers are fine once registration is quiescent (single-writer
/// discipline).
pub struct TypeRegistry {
    types: RwLock<HashMap<String, Arc<TypeDef>>>,
}

impl TypeRegistry {
    /// Create a registry pre-loaded with the built-in primitives.
    pub fn new() -> Self {
        let mut types = HashMap::new();
        for kind in PrimitiveKind::all() {
            types.insert(
                kind.tag().to_string(),
                Arc::new(TypeDef::Primitive(*kind)),
            );
        }
        Self {
            types: RwLock::new(types),
        }
    }

    /// Register an additional name for a primitive codec (e.g. a domain
    /// newtype such as `Url` carried as ASCII text on the wire).
    pub fn register_primitive(&self, name: &str, kind: PrimitiveKind) -> Result<(), RegistryError> {
        self.insert(name, TypeDef::Primitive(kind))?;
        debug!("registered primitive {} ({})", name, kind.tag());
        Ok(())
    }

    /// Register a non-generic struct layout from ordered
    /// `(field name, type tag)` pairs.
    pub fn register_struct(
        &self,
        name: &str,
        fields: &[(&str, &str)],
    ) -> Result<(), RegistryError> {
        self.register_generic_struct(name, &[], fields)
    }

    /// Register a struct layout with declared type parameters.
    ///
    /// Field tags may reference the parameters by bare name; they are bound
    /// positionally when the struct is instantiated (`Name<T1,...,Tn>`).
    pub fn register_generic_struct(
        &self,
        name: &str,
        type_params: &[&str],
        fields: &[(&str, &str)],
    ) -> Result<(), RegistryError> {
        for param in type_params {
            if PrimitiveKind::from_tag(param).is_some() {
                return Err(RegistryError::ReservedParam((*param).to_string()));
            }
        }

        let mut parsed = Vec::with_capacity(fields.len());
        let mut seen = HashSet::new();
        for (field_name, tag) in fields {
            if !seen.insert(*field_name) {
                return Err(RegistryError::DuplicateField {
                    type_name: name.to_string(),
                    field: (*field_name).to_string(),
                });
            }
            parsed.push(((*field_name).to_string(), parse_type_tag(tag)?));
        }

        let def = TypeDef::Struct(StructDef {
            type_params: type_params.iter().map(|p| (*p).to_string()).collect(),
            fields: parsed,
        });
        self.insert(name, def)?;
        debug!(
            "registered struct {} ({} fields, {} type params)",
            name,
            fields.len(),
            type_params.len()
        );
        Ok(())
    }

    /// Register an enum layout from ordered `(variant name, payload tag)`
    /// pairs; `None` declares a unit variant.
    pub fn register_enum(
        &self,
        name: &str,
        variants: &[(&str, Option<&str>)],
    ) -> Result<(), RegistryError> {
        let mut parsed = Vec::with_capacity(variants.len());
        let mut seen = HashSet::new();
        for (variant_name, tag) in variants {
            if !seen.insert(*variant_name) {
                return Err(RegistryError::DuplicateVariant {
                    type_name: name.to_string(),
                    variant: (*variant_name).to_string(),
                });
            }
            let payload = match tag {
                Some(tag) => Some(parse_type_tag(tag)?),
                None => None,
            };
            parsed.push(((*variant_name).to_string(), payload));
        }

        self.insert(name, TypeDef::Enum(EnumDef { variants: parsed }))?;
        debug!("registered enum {} ({} variants)", name, variants.len());
        Ok(())
    }

    fn insert(&self, name: &str, def: TypeDef) -> Result<(), RegistryError> {
        let mut types = self.types.write();
        if types.contains_key(name) {
            return Err(RegistryError::DuplicateType(name.to_string()));
        }
        types.insert(name.to_string(), Arc::new(def));
        Ok(())
    }

    /// Look up a registered layout.
    pub fn get(&self, name: &str) -> Option<Arc<TypeDef>> {
        self.types.read().get(name).cloned()
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.types.read().contains_key(name)
    }

    /// Number of registered types (built-ins included).
    pub fn type_count(&self) -> usize {
        self.types.read().len()
    }

    /// All registered type names (sorted for determinism).
    pub fn list_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Parse a type tag and verify every name it references (transitively)
    /// resolves against the current registry contents.
    ///
    /// Cycle-safe: self-referential struct/enum definitions are visited once.
    /// Purely functional for fixed registry state -- the same tag yields the
    /// same AST or the same error.
    pub fn resolve(&self, tag: &str) -> Result<TypeExpr, RegistryError> {
        let expr = parse_type_tag(tag)?;
        let mut visited = HashSet::new();
        self.verify(&expr, &[], &mut visited)?;
        Ok(expr)
    }

    /// Verify an already-parsed expression against the registry.
    pub fn verify_expr(&self, expr: &TypeExpr) -> Result<(), RegistryError> {
        let mut visited = HashSet::new();
        self.verify(expr, &[], &mut visited)
    }

    fn verify(
        &self,
        expr: &TypeExpr,
        params_in_scope: &[String],
        visited: &mut HashSet<String>,
    ) -> Result<(), RegistryError> {
        match expr {
            TypeExpr::Primitive(_) => Ok(()),
            TypeExpr::Vector(elem) | TypeExpr::Option(elem) => {
                self.verify(elem, params_in_scope, visited)
            }
            TypeExpr::Map(key, value) => {
                self.verify(key, params_in_scope, visited)?;
                self.verify(value, params_in_scope, visited)
            }
            TypeExpr::Named { name, args } => {
                for arg in args {
                    self.verify(arg, params_in_scope, visited)?;
                }
                if args.is_empty() && params_in_scope.iter().any(|p| p == name) {
                    return Ok(());
                }
                let def = self
                    .get(name)
                    .ok_or_else(|| RegistryError::UnknownType(name.clone()))?;
                match &*def {
                    TypeDef::Primitive(_) => {
                        if args.is_empty() {
                            Ok(())
                        } else {
                            Err(RegistryError::ArityMismatch {
                                name: name.clone(),
                                expected: 0,
                                got: args.len(),
                            })
                        }
                    }
                    TypeDef::Struct(s) => {
                        if args.len() != s.type_params.len() {
                            return Err(RegistryError::ArityMismatch {
                                name: name.clone(),
                                expected: s.type_params.len(),
                                got: args.len(),
                            });
                        }
                        if visited.insert(name.clone()) {
                            for (_, field_expr) in &s.fields {
                                self.verify(field_expr, &s.type_params, visited)?;
                            }
                        }
                        Ok(())
                    }
                    TypeDef::Enum(e) => {
                        if !args.is_empty() {
                            return Err(RegistryError::ArityMismatch {
                                name: name.clone(),
                                expected: 0,
                                got: args.len(),
                            });
                        }
                        if visited.insert(name.clone()) {
                            for (_, payload) in &e.variants {
                                if let Some(payload_expr) = payload {
                                    self.verify(payload_expr, &[], visited)?;
                                }
                            }
                        }
                        Ok(())
                    }
                }
            }
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("type_count", &self.type_count())
            .finish()
    }
}
