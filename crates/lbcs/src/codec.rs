// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Canonical value codec.
//!
//! Encodes/decodes [`BcsValue`]s against resolved type expressions:
//! little-endian fixed-width integers, ULEB128 length prefixes for
//! variable-length containers, a one-byte presence flag for options, and a
//! ULEB128 variant index for enums. Encoding is deterministic and
//! order-preserving; decode errors are fatal for the call and never yield
//! partial data.

use crate::registry::{RegistryError, TypeDef, TypeRegistry};
use crate::typeexpr::{PrimitiveKind, TypeExpr};
use crate::value::BcsValue;
use crate::wire::{WireError, WireReader, WireWriter};
use std::collections::HashMap;
use std::fmt;

/// Default recursion guard for nested/recursive registered types.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Resource limits applied by encoder and decoder.
#[derive(Debug, Clone, Copy)]
pub struct CodecLimits {
    /// Maximum nesting depth of the value graph.
    pub max_depth: usize,
    /// Maximum element/entry/byte count for variable-length containers.
    pub max_len: u32,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_len: u32::MAX,
        }
    }
}

/// Errors from encoding or decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Byte-level failure (underrun, bad ULEB128, trailing bytes).
    Wire(WireError),
    /// Type resolution failure (unknown name, arity).
    Registry(RegistryError),
    /// Value shape does not match the declared type.
    TypeMismatch { expected: String, found: String },
    /// A registered struct value is missing a non-optional field.
    MissingField { type_name: String, field: String },
    /// Decoded variant index out of range for the enum layout.
    UnknownVariant { enum_name: String, index: u32 },
    /// Enum value names a variant the layout does not declare.
    UnknownVariantName { enum_name: String, variant: String },
    /// Enum value and layout disagree about the variant carrying a payload.
    PayloadMismatch {
        enum_name: String,
        variant: String,
        expects_payload: bool,
    },
    /// Text declared `ascii` contains non-ASCII characters.
    InvalidAscii(String),
    /// Decoded string bytes are not valid UTF-8.
    InvalidUtf8(String),
    /// Decoded bool byte is neither 0 nor 1.
    InvalidBool(u8),
    /// Decoded option presence flag is neither 0 nor 1.
    InvalidOptionFlag(u8),
    /// Value graph deeper than the configured limit.
    DepthExceeded(usize),
    /// Container longer than the configured limit.
    LengthExceeded { len: usize, max: u32 },
    /// Buffer count does not match the expected field count.
    FieldCountMismatch { expected: usize, got: usize },
    /// A selected key is not declared by the schema.
    UnknownField(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wire(e) => write!(f, "wire error: {}", e),
            Self::Registry(e) => write!(f, "type error: {}", e),
            Self::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {}, found {}", expected, found)
            }
            Self::MissingField { type_name, field } if type_name.is_empty() => {
                write!(f, "record missing field {:?}", field)
            }
            Self::MissingField { type_name, field } => {
                write!(f, "struct {:?} value missing field {:?}", type_name, field)
            }
            Self::UnknownVariant { enum_name, index } => {
                write!(f, "enum {:?} has no variant index {}", enum_name, index)
            }
            Self::UnknownVariantName { enum_name, variant } => {
                write!(f, "enum {:?} has no variant {:?}", enum_name, variant)
            }
            Self::PayloadMismatch {
                enum_name,
                variant,
                expects_payload,
            } => {
                if *expects_payload {
                    write!(f, "variant {}::{} requires a payload", enum_name, variant)
                } else {
                    write!(f, "variant {}::{} takes no payload", enum_name, variant)
                }
            }
            Self::InvalidAscii(s) => write!(f, "non-ASCII text in ascii field: {:?}", s),
            Self::InvalidUtf8(msg) => write!(f, "invalid UTF-8 string bytes: {}", msg),
            Self::InvalidBool(b) => write!(f, "invalid bool byte {:#04x}", b),
            Self::InvalidOptionFlag(b) => write!(f, "invalid option flag byte {:#04x}", b),
            Self::DepthExceeded(max) => write!(f, "value nesting exceeds max depth {}", max),
            Self::LengthExceeded { len, max } => {
                write!(f, "container length {} exceeds limit {}", len, max)
            }
            Self::FieldCountMismatch { expected, got } => {
                write!(f, "expected {} field buffer(s), got {}", expected, got)
            }
            Self::UnknownField(name) => write!(f, "field {:?} not in schema", name),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<WireError> for CodecError {
    fn from(e: WireError) -> Self {
        Self::Wire(e)
    }
}

impl From<RegistryError> for CodecError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

/// Encode a single value against `expr`, returning its wire bytes.
pub fn encode_value(
    registry: &TypeRegistry,
    expr: &TypeExpr,
    value: &BcsValue,
) -> Result<Vec<u8>, CodecError> {
    let mut encoder = BcsEncoder::new(registry);
    encoder.encode_value(expr, value)?;
    Ok(encoder.into_bytes())
}

/// Decode a single value of type `expr` from `bytes`, requiring the buffer
/// to be consumed exactly.
pub fn decode_value(
    registry: &TypeRegistry,
    expr: &TypeExpr,
    bytes: &[u8],
) -> Result<BcsValue, CodecError> {
    let mut decoder = BcsDecoder::new(registry, bytes);
    let value = decoder.decode_value(expr)?;
    decoder.finish()?;
    Ok(value)
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Streaming value encoder over a [`WireWriter`].
pub struct BcsEncoder<'r> {
    registry: &'r TypeRegistry,
    limits: CodecLimits,
    writer: WireWriter,
}

impl<'r> BcsEncoder<'r> {
    /// Encoder with default limits.
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self::with_limits(registry, CodecLimits::default())
    }

    /// Encoder with caller-supplied limits.
    pub fn with_limits(registry: &'r TypeRegistry, limits: CodecLimits) -> Self {
        Self {
            registry,
            limits,
            writer: WireWriter::new(),
        }
    }

    /// Append `value` encoded as `expr`.
    pub fn encode_value(&mut self, expr: &TypeExpr, value: &BcsValue) -> Result<(), CodecError> {
        self.encode_at(expr, value, 0)
    }

    /// Consume the encoder and return the bytes written.
    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_bytes()
    }

    fn check_len(&self, len: usize) -> Result<u32, CodecError> {
        if len > self.limits.max_len as usize {
            return Err(CodecError::LengthExceeded {
                len,
                max: self.limits.max_len,
            });
        }
        Ok(len as u32)
    }

    fn encode_at(
        &mut self,
        expr: &TypeExpr,
        value: &BcsValue,
        depth: usize,
    ) -> Result<(), CodecError> {
        if depth >= self.limits.max_depth {
            return Err(CodecError::DepthExceeded(self.limits.max_depth));
        }
        match expr {
            TypeExpr::Primitive(kind) => self.encode_primitive(*kind, value),
            TypeExpr::Vector(elem) => {
                let items = value.as_vector().ok_or_else(|| CodecError::TypeMismatch {
                    expected: expr.to_string(),
                    found: value.describe(),
                })?;
                let len = self.check_len(items.len())?;
                self.writer.write_uleb128(len);
                for item in items {
                    self.encode_at(elem, item, depth + 1)?;
                }
                Ok(())
            }
            TypeExpr::Option(inner) => match value {
                BcsValue::Option(None) => {
                    self.writer.write_bool(false);
                    Ok(())
                }
                BcsValue::Option(Some(present)) => {
                    self.writer.write_bool(true);
                    self.encode_at(inner, present, depth + 1)
                }
                other => Err(CodecError::TypeMismatch {
                    expected: expr.to_string(),
                    found: other.describe(),
                }),
            },
            TypeExpr::Map(key_expr, value_expr) => {
                let entries = value.as_map().ok_or_else(|| CodecError::TypeMismatch {
                    expected: expr.to_string(),
                    found: value.describe(),
                })?;
                let len = self.check_len(entries.len())?;
                self.writer.write_uleb128(len);
                for (k, v) in entries {
                    self.encode_at(key_expr, k, depth + 1)?;
                    self.encode_at(value_expr, v, depth + 1)?;
                }
                Ok(())
            }
            TypeExpr::Named { name, args } => self.encode_named(name, args, value, depth),
        }
    }

    fn encode_named(
        &mut self,
        name: &str,
        args: &[TypeExpr],
        value: &BcsValue,
        depth: usize,
    ) -> Result<(), CodecError> {
        let def = self
            .registry
            .get(name)
            .ok_or_else(|| RegistryError::UnknownType(name.to_string()))?;
        match &*def {
            TypeDef::Primitive(kind) => {
                check_arity(name, 0, args.len())?;
                self.encode_primitive(*kind, value)
            }
            TypeDef::Struct(def) => {
                check_arity(name, def.type_params.len(), args.len())?;
                let fields = match value {
                    BcsValue::Struct(fields) => fields,
                    other => {
                        return Err(CodecError::TypeMismatch {
                            expected: name.to_string(),
                            found: other.describe(),
                        })
                    }
                };
                let bindings = bind_params(&def.type_params, args);
                for (field_name, field_expr) in &def.fields {
                    let concrete = field_expr.substitute(&bindings);
                    match fields.get(field_name) {
                        Some(field_value) => self.encode_at(&concrete, field_value, depth + 1)?,
                        // Omitted optional field serializes as `none`.
                        None if concrete.is_option() => self.writer.write_bool(false),
                        None => {
                            return Err(CodecError::MissingField {
                                type_name: name.to_string(),
                                field: field_name.clone(),
                            })
                        }
                    }
                }
                Ok(())
            }
            TypeDef::Enum(def) => {
                check_arity(name, 0, args.len())?;
                let (variant, payload) = match value {
                    BcsValue::Enum(variant, payload) => (variant, payload),
                    other => {
                        return Err(CodecError::TypeMismatch {
                            expected: name.to_string(),
                            found: other.describe(),
                        })
                    }
                };
                let index =
                    def.variant_index(variant)
                        .ok_or_else(|| CodecError::UnknownVariantName {
                            enum_name: name.to_string(),
                            variant: variant.clone(),
                        })?;
                self.writer.write_uleb128(index as u32);
                match (&def.variants[index].1, payload) {
                    (Some(payload_expr), Some(payload_value)) => {
                        self.encode_at(payload_expr, payload_value, depth + 1)
                    }
                    (None, None) => Ok(()),
                    (expects, _) => Err(CodecError::PayloadMismatch {
                        enum_name: name.to_string(),
                        variant: variant.clone(),
                        expects_payload: expects.is_some(),
                    }),
                }
            }
        }
    }

    fn encode_primitive(
        &mut self,
        kind: PrimitiveKind,
        value: &BcsValue,
    ) -> Result<(), CodecError> {
        match (kind, value) {
            (PrimitiveKind::Bool, BcsValue::Bool(v)) => self.writer.write_bool(*v),
            (PrimitiveKind::U8, BcsValue::U8(v)) => self.writer.write_u8(*v),
            (PrimitiveKind::U16, BcsValue::U16(v)) => self.writer.write_u16(*v),
            (PrimitiveKind::U32, BcsValue::U32(v)) => self.writer.write_u32(*v),
            (PrimitiveKind::U64, BcsValue::U64(v)) => self.writer.write_u64(*v),
            (PrimitiveKind::U128, BcsValue::U128(v)) => self.writer.write_u128(*v),
            (PrimitiveKind::U256, BcsValue::U256(bytes)) => self.writer.write_bytes32(bytes),
            (PrimitiveKind::Address | PrimitiveKind::Id, BcsValue::Address(bytes)) => {
                self.writer.write_bytes32(bytes)
            }
            (PrimitiveKind::Ascii, BcsValue::Ascii(s) | BcsValue::Utf8(s)) => {
                if !s.is_ascii() {
                    return Err(CodecError::InvalidAscii(s.clone()));
                }
                self.write_text(s)?;
            }
            (PrimitiveKind::Utf8, BcsValue::Ascii(s) | BcsValue::Utf8(s)) => {
                self.write_text(s)?;
            }
            (kind, other) => {
                return Err(CodecError::TypeMismatch {
                    expected: kind.tag().to_string(),
                    found: other.describe(),
                })
            }
        }
        Ok(())
    }

    fn write_text(&mut self, s: &str) -> Result<(), CodecError> {
        let len = self.check_len(s.len())?;
        self.writer.write_uleb128(len);
        self.writer.write_bytes(s.as_bytes());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Streaming value decoder over a [`WireReader`].
pub struct BcsDecoder<'a, 'r> {
    registry: &'r TypeRegistry,
    limits: CodecLimits,
    reader: WireReader<'a>,
}

impl<'a, 'r> BcsDecoder<'a, 'r> {
    /// Decoder with default limits.
    pub fn new(registry: &'r TypeRegistry, bytes: &'a [u8]) -> Self {
        Self::with_limits(registry, bytes, CodecLimits::default())
    }

    /// Decoder with caller-supplied limits.
    pub fn with_limits(registry: &'r TypeRegistry, bytes: &'a [u8], limits: CodecLimits) -> Self {
        Self {
            registry,
            limits,
            reader: WireReader::new(bytes),
        }
    }

    /// Decode one value of type `expr` from the current position.
    pub fn decode_value(&mut self, expr: &TypeExpr) -> Result<BcsValue, CodecError> {
        self.decode_at(expr, 0)
    }

    /// Error unless the buffer was consumed exactly.
    pub fn finish(self) -> Result<(), CodecError> {
        self.reader.expect_end().map_err(Into::into)
    }

    fn read_len(&mut self) -> Result<usize, CodecError> {
        let len = self.reader.read_uleb128()?;
        if len > self.limits.max_len {
            return Err(CodecError::LengthExceeded {
                len: len as usize,
                max: self.limits.max_len,
            });
        }
        Ok(len as usize)
    }

    fn decode_at(&mut self, expr: &TypeExpr, depth: usize) -> Result<BcsValue, CodecError> {
        if depth >= self.limits.max_depth {
            return Err(CodecError::DepthExceeded(self.limits.max_depth));
        }
        match expr {
            TypeExpr::Primitive(kind) => self.decode_primitive(*kind),
            TypeExpr::Vector(elem) => {
                let len = self.read_len()?;
                let mut items = Vec::with_capacity(len.min(1024));
                for _ in 0..len {
                    items.push(self.decode_at(elem, depth + 1)?);
                }
                Ok(BcsValue::Vector(items))
            }
            TypeExpr::Option(inner) => match self.reader.read_u8()? {
                0 => Ok(BcsValue::Option(None)),
                1 => {
                    let present = self.decode_at(inner, depth + 1)?;
                    Ok(BcsValue::Option(Some(Box::new(present))))
                }
                flag => Err(CodecError::InvalidOptionFlag(flag)),
            },
            TypeExpr::Map(key_expr, value_expr) => {
                let len = self.read_len()?;
                let mut entries = Vec::with_capacity(len.min(1024));
                for _ in 0..len {
                    let key = self.decode_at(key_expr, depth + 1)?;
                    let value = self.decode_at(value_expr, depth + 1)?;
                    entries.push((key, value));
                }
                Ok(BcsValue::Map(entries))
            }
            TypeExpr::Named { name, args } => self.decode_named(name, args, depth),
        }
    }

    fn decode_named(
        &mut self,
        name: &str,
        args: &[TypeExpr],
        depth: usize,
    ) -> Result<BcsValue, CodecError> {
        let def = self
            .registry
            .get(name)
            .ok_or_else(|| RegistryError::UnknownType(name.to_string()))?;
        match &*def {
            TypeDef::Primitive(kind) => {
                check_arity(name, 0, args.len())?;
                self.decode_primitive(*kind)
            }
            TypeDef::Struct(def) => {
                check_arity(name, def.type_params.len(), args.len())?;
                let bindings = bind_params(&def.type_params, args);
                let mut fields = HashMap::with_capacity(def.fields.len());
                for (field_name, field_expr) in &def.fields {
                    let concrete = field_expr.substitute(&bindings);
                    let value = self.decode_at(&concrete, depth + 1)?;
                    fields.insert(field_name.clone(), value);
                }
                Ok(BcsValue::Struct(fields))
            }
            TypeDef::Enum(def) => {
                check_arity(name, 0, args.len())?;
                let index = self.reader.read_uleb128()?;
                let (variant_name, payload_expr) = def
                    .variants
                    .get(index as usize)
                    .ok_or_else(|| CodecError::UnknownVariant {
                        enum_name: name.to_string(),
                        index,
                    })?;
                let payload = match payload_expr {
                    Some(expr) => Some(Box::new(self.decode_at(expr, depth + 1)?)),
                    None => None,
                };
                Ok(BcsValue::Enum(variant_name.clone(), payload))
            }
        }
    }

    fn decode_primitive(&mut self, kind: PrimitiveKind) -> Result<BcsValue, CodecError> {
        match kind {
            PrimitiveKind::Bool => match self.reader.read_u8()? {
                0 => Ok(BcsValue::Bool(false)),
                1 => Ok(BcsValue::Bool(true)),
                byte => Err(CodecError::InvalidBool(byte)),
            },
            PrimitiveKind::U8 => Ok(BcsValue::U8(self.reader.read_u8()?)),
            PrimitiveKind::U16 => Ok(BcsValue::U16(self.reader.read_u16()?)),
            PrimitiveKind::U32 => Ok(BcsValue::U32(self.reader.read_u32()?)),
            PrimitiveKind::U64 => Ok(BcsValue::U64(self.reader.read_u64()?)),
            PrimitiveKind::U128 => Ok(BcsValue::U128(self.reader.read_u128()?)),
            PrimitiveKind::U256 => Ok(BcsValue::U256(self.reader.read_bytes32()?)),
            PrimitiveKind::Address | PrimitiveKind::Id => {
                Ok(BcsValue::Address(self.reader.read_bytes32()?))
            }
            PrimitiveKind::Ascii => {
                let text = self.read_text()?;
                if !text.is_ascii() {
                    return Err(CodecError::InvalidAscii(text));
                }
                Ok(BcsValue::Ascii(text))
            }
            PrimitiveKind::Utf8 => Ok(BcsValue::Utf8(self.read_text()?)),
        }
    }

    fn read_text(&mut self) -> Result<String, CodecError> {
        let len = self.read_len()?;
        let bytes = self.reader.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| CodecError::InvalidUtf8(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

pub(crate) fn check_arity(name: &str, expected: usize, got: usize) -> Result<(), CodecError> {
    if expected == got {
        Ok(())
    } else {
        Err(CodecError::Registry(RegistryError::ArityMismatch {
            name: name.to_string(),
            expected,
            got,
        }))
    }
}

pub(crate) fn bind_params<'e>(
    params: &'e [String],
    args: &'e [TypeExpr],
) -> HashMap<&'e str, TypeExpr> {
    params
        .iter()
        .map(String::as_str)
        .zip(args.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeexpr::parse_type_tag;

    fn expr(tag: &str) -> TypeExpr {
        parse_type_tag(tag).unwrap()
    }

    #[test]
    fn u64_fixed_width() {
        let reg = TypeRegistry::new();
        let bytes = encode_value(&reg, &expr("u64"), &BcsValue::U64(199)).unwrap();
        assert_eq!(bytes, vec![199, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(
            decode_value(&reg, &expr("u64"), &bytes).unwrap(),
            BcsValue::U64(199)
        );
    }

    #[test]
    fn ascii_length_prefixed() {
        let reg = TypeRegistry::new();
        let bytes = encode_value(&reg, &expr("ascii"), &BcsValue::Ascii("Kyrie".into())).unwrap();
        assert_eq!(bytes, vec![5, b'K', b'y', b'r', b'i', b'e']);
    }

    #[test]
    fn ascii_rejects_non_ascii() {
        let reg = TypeRegistry::new();
        let err = encode_value(&reg, &expr("ascii"), &BcsValue::Utf8("héllo".into())).unwrap_err();
        assert!(matches!(err, CodecError::InvalidAscii(_)));
    }

    #[test]
    fn option_presence_flag() {
        let reg = TypeRegistry::new();
        let tag = expr("Option<ascii>");

        let none = encode_value(&reg, &tag, &BcsValue::none()).unwrap();
        assert_eq!(none, vec![0x00]);

        let some = encode_value(&reg, &tag, &BcsValue::some(BcsValue::Ascii("hi".into()))).unwrap();
        assert_eq!(some, vec![0x01, 0x02, b'h', b'i']);

        assert_eq!(decode_value(&reg, &tag, &none).unwrap(), BcsValue::none());
        assert_eq!(
            decode_value(&reg, &tag, &some).unwrap(),
            BcsValue::some(BcsValue::Ascii("hi".into()))
        );
    }

    #[test]
    fn invalid_option_flag_rejected() {
        let reg = TypeRegistry::new();
        let err = decode_value(&reg, &expr("Option<u8>"), &[0x02, 0x00]).unwrap_err();
        assert_eq!(err, CodecError::InvalidOptionFlag(2));
    }

    #[test]
    fn vector_uleb_prefix() {
        let reg = TypeRegistry::new();
        let tag = expr("vector<u8>");
        let value: BcsValue = vec![1u8, 2, 3].into();
        let bytes = encode_value(&reg, &tag, &value).unwrap();
        assert_eq!(bytes, vec![3, 1, 2, 3]);

        // Empty vector is a single zero byte.
        let empty = encode_value(&reg, &tag, &BcsValue::Vector(Vec::new())).unwrap();
        assert_eq!(empty, vec![0]);

        // 130 elements: two-byte ULEB128 prefix.
        let long: BcsValue = vec![7u8; 130].into();
        let bytes = encode_value(&reg, &tag, &long).unwrap();
        assert_eq!(&bytes[..2], &[0x82, 0x01]);
        assert_eq!(bytes.len(), 2 + 130);
        assert_eq!(decode_value(&reg, &tag, &bytes).unwrap(), long);
    }

    #[test]
    fn decode_consumes_exactly() {
        let reg = TypeRegistry::new();
        let err = decode_value(&reg, &expr("u8"), &[1, 2]).unwrap_err();
        assert_eq!(
            err,
            CodecError::Wire(WireError::TrailingBytes { remaining: 1 })
        );

        let err = decode_value(&reg, &expr("u32"), &[1, 2]).unwrap_err();
        assert!(matches!(err, CodecError::Wire(WireError::UnexpectedEnd { .. })));
    }

    #[test]
    fn invalid_bool_byte_rejected() {
        let reg = TypeRegistry::new();
        let err = decode_value(&reg, &expr("bool"), &[7]).unwrap_err();
        assert_eq!(err, CodecError::InvalidBool(7));
    }

    #[test]
    fn struct_fields_in_layout_order() {
        let reg = TypeRegistry::new();
        reg.register_struct("Outlaw", &[("name", "ascii"), ("power_level", "u64")])
            .unwrap();

        let value = BcsValue::record([
            ("power_level", BcsValue::U64(199)),
            ("name", BcsValue::Ascii("Kyrie".into())),
        ]);
        let bytes = encode_value(&reg, &expr("Outlaw"), &value).unwrap();
        // name first (declaration order), regardless of map insertion order.
        assert_eq!(
            bytes,
            vec![5, b'K', b'y', b'r', b'i', b'e', 199, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(decode_value(&reg, &expr("Outlaw"), &bytes).unwrap(), value);
    }

    #[test]
    fn struct_missing_field_rejected() {
        let reg = TypeRegistry::new();
        reg.register_struct("Outlaw", &[("name", "ascii"), ("power_level", "u64")])
            .unwrap();
        let value = BcsValue::record([("name", BcsValue::Ascii("Kyrie".into()))]);
        let err = encode_value(&reg, &expr("Outlaw"), &value).unwrap_err();
        assert_eq!(
            err,
            CodecError::MissingField {
                type_name: "Outlaw".to_string(),
                field: "power_level".to_string()
            }
        );
    }

    #[test]
    fn struct_omitted_optional_encodes_none() {
        let reg = TypeRegistry::new();
        reg.register_struct("Profile", &[("bio", "Option<ascii>"), ("age", "u8")])
            .unwrap();
        let value = BcsValue::record([("age", BcsValue::U8(30))]);
        let bytes = encode_value(&reg, &expr("Profile"), &value).unwrap();
        assert_eq!(bytes, vec![0x00, 30]);

        let decoded = decode_value(&reg, &expr("Profile"), &bytes).unwrap();
        assert_eq!(decoded.get_field("bio"), Some(&BcsValue::none()));
    }

    #[test]
    fn enum_variant_index_and_payload() {
        let reg = TypeRegistry::new();
        reg.register_enum(
            "Element",
            &[("none", None), ("fire", Some("u8")), ("water", Some("u8"))],
        )
        .unwrap();

        let unit = encode_value(&reg, &expr("Element"), &BcsValue::variant("none")).unwrap();
        assert_eq!(unit, vec![0x00]);

        let water =
            encode_value(&reg, &expr("Element"), &BcsValue::variant_with("water", 9u8)).unwrap();
        assert_eq!(water, vec![0x02, 9]);

        assert_eq!(
            decode_value(&reg, &expr("Element"), &water).unwrap(),
            BcsValue::variant_with("water", 9u8)
        );
    }

    #[test]
    fn enum_payload_mismatch_rejected() {
        let reg = TypeRegistry::new();
        reg.register_enum("Element", &[("none", None), ("fire", Some("u8"))])
            .unwrap();

        let err = encode_value(
            &reg,
            &expr("Element"),
            &BcsValue::variant_with("none", 1u8),
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::PayloadMismatch { .. }));

        let err =
            encode_value(&reg, &expr("Element"), &BcsValue::variant("fire")).unwrap_err();
        assert!(matches!(err, CodecError::PayloadMismatch { .. }));

        let err =
            encode_value(&reg, &expr("Element"), &BcsValue::variant("ice")).unwrap_err();
        assert!(matches!(err, CodecError::UnknownVariantName { .. }));
    }

    #[test]
    fn enum_unknown_index_rejected() {
        let reg = TypeRegistry::new();
        reg.register_enum("Element", &[("none", None)]).unwrap();
        let err = decode_value(&reg, &expr("Element"), &[0x05]).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnknownVariant {
                enum_name: "Element".to_string(),
                index: 5
            }
        );
    }

    #[test]
    fn primitive_alias_encodes_as_its_codec() {
        let reg = TypeRegistry::new();
        reg.register_primitive("Url", crate::typeexpr::PrimitiveKind::Ascii)
            .unwrap();

        let bytes = encode_value(
            &reg,
            &expr("Url"),
            &BcsValue::Ascii("https://a.io".into()),
        )
        .unwrap();
        assert_eq!(
            bytes,
            encode_value(&reg, &expr("ascii"), &BcsValue::Ascii("https://a.io".into())).unwrap()
        );
        assert_eq!(
            decode_value(&reg, &expr("Url"), &bytes).unwrap(),
            BcsValue::Ascii("https://a.io".into())
        );
    }

    #[test]
    fn generic_struct_instantiation() {
        let reg = TypeRegistry::new();
        reg.register_generic_struct("Pair", &["K", "V"], &[("first", "K"), ("second", "V")])
            .unwrap();

        let value = BcsValue::record([
            ("first", BcsValue::U8(1)),
            ("second", BcsValue::Utf8("two".into())),
        ]);
        let tag = expr("Pair<u8,string>");
        let bytes = encode_value(&reg, &tag, &value).unwrap();
        assert_eq!(bytes, vec![1, 3, b't', b'w', b'o']);
        assert_eq!(decode_value(&reg, &tag, &bytes).unwrap(), value);
    }

    #[test]
    fn vecmap_entries() {
        let reg = TypeRegistry::new();
        let tag = expr("VecMap<string,string>");
        let value = BcsValue::Map(vec![(
            BcsValue::Utf8("k".into()),
            BcsValue::Utf8("v".into()),
        )]);
        let bytes = encode_value(&reg, &tag, &value).unwrap();
        assert_eq!(bytes, vec![1, 1, b'k', 1, b'v']);
        assert_eq!(decode_value(&reg, &tag, &bytes).unwrap(), value);
    }

    #[test]
    fn depth_limit_enforced() {
        let reg = TypeRegistry::new();
        reg.register_struct("Node", &[("next", "Option<Node>")])
            .unwrap();

        // Build a value nested beyond a small depth limit.
        let mut value = BcsValue::record([("next", BcsValue::none())]);
        for _ in 0..10 {
            value = BcsValue::record([("next", BcsValue::some(value))]);
        }

        let limits = CodecLimits {
            max_depth: 8,
            ..CodecLimits::default()
        };
        let mut encoder = BcsEncoder::with_limits(&reg, limits);
        let err = encoder.encode_value(&expr("Node"), &value).unwrap_err();
        assert_eq!(err, CodecError::DepthExceeded(8));
    }

    #[test]
    fn length_limit_enforced() {
        let reg = TypeRegistry::new();
        let limits = CodecLimits {
            max_len: 4,
            ..CodecLimits::default()
        };
        let mut encoder = BcsEncoder::with_limits(&reg, limits);
        let err = encoder
            .encode_value(&expr("vector<u8>"), &vec![0u8; 5].into())
            .unwrap_err();
        assert_eq!(err, CodecError::LengthExceeded { len: 5, max: 4 });

        // Decode side: declared length above the limit fails before any
        // element reads.
        let mut decoder = BcsDecoder::with_limits(&reg, &[5, 0, 0, 0, 0, 0], limits);
        let err = decoder.decode_value(&expr("vector<u8>")).unwrap_err();
        assert_eq!(err, CodecError::LengthExceeded { len: 5, max: 4 });
    }

    #[test]
    fn u128_and_u256_little_endian() {
        let reg = TypeRegistry::new();
        let bytes = encode_value(&reg, &expr("u128"), &BcsValue::U128(1)).unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes[0], 1);
        assert!(bytes[1..].iter().all(|&b| b == 0));

        let v = BcsValue::u256_from_u128(513);
        let bytes = encode_value(&reg, &expr("u256"), &v).unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[..2], &[0x01, 0x02]);
        assert_eq!(decode_value(&reg, &expr("u256"), &bytes).unwrap(), v);
    }

    #[test]
    fn address_and_id_raw_bytes() {
        let reg = TypeRegistry::new();
        let addr = BcsValue::address_from_hex("0x2").unwrap();
        let bytes = encode_value(&reg, &expr("address"), &addr).unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[31], 2);
        // `id` shares the wire shape.
        assert_eq!(encode_value(&reg, &expr("id"), &addr).unwrap(), bytes);
    }
}
