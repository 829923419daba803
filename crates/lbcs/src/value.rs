// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime values for schema-driven encoding.

use std::collections::HashMap;
use std::fmt;

/// A runtime value that can hold any wire type.
///
/// `U256` and `Address` carry raw 32-byte little-endian / address storage;
/// use [`BcsValue::u256_from_decimal`] and [`BcsValue::address_from_hex`] to
/// construct them from the string forms upstream callers produce.
#[derive(Debug, Clone, PartialEq)]
pub enum BcsValue {
    // Primitives
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    U256([u8; 32]),
    /// 32-byte account address or object id.
    Address([u8; 32]),
    /// ASCII-only text.
    Ascii(String),
    /// UTF-8 text.
    Utf8(String),

    // Composites
    Vector(Vec<BcsValue>),
    /// The two-armed optional shape: `None` = absent, `Some` = present.
    Option(Option<Box<BcsValue>>),
    /// Ordered key/value entries of a `VecMap<K,V>`.
    Map(Vec<(BcsValue, BcsValue)>),
    /// Keyed fields of a registered struct.
    Struct(HashMap<String, BcsValue>),
    /// Registered enum value: (variant name, payload). Unit variants carry
    /// no payload.
    Enum(String, Option<Box<BcsValue>>),
}

/// Errors from value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Not a valid hex address string.
    InvalidHex(String),
    /// Not a valid decimal integer string.
    InvalidDecimal(String),
    /// Decimal value does not fit the target width.
    Overflow(String),
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::InvalidHex(s) => write!(f, "invalid hex address: {:?}", s),
            ValueError::InvalidDecimal(s) => write!(f, "invalid decimal integer: {:?}", s),
            ValueError::Overflow(s) => write!(f, "decimal value out of range: {:?}", s),
        }
    }
}

impl std::error::Error for ValueError {}

impl BcsValue {
    /// The explicit `none` optional shape.
    pub fn none() -> Self {
        Self::Option(None)
    }

    /// The `some` optional shape wrapping `value`.
    pub fn some(value: impl Into<BcsValue>) -> Self {
        Self::Option(Some(Box::new(value.into())))
    }

    /// A unit enum variant value.
    pub fn variant(name: impl Into<String>) -> Self {
        Self::Enum(name.into(), None)
    }

    /// An enum variant value carrying a payload.
    pub fn variant_with(name: impl Into<String>, payload: impl Into<BcsValue>) -> Self {
        Self::Enum(name.into(), Some(Box::new(payload.into())))
    }

    /// Build a struct value from `(field, value)` pairs.
    pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, BcsValue)>) -> Self {
        Self::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Parse a `0x`-prefixed (or bare) hex string into a 32-byte address,
    /// left-padding short forms.
    pub fn address_from_hex(hex: &str) -> Result<Self, ValueError> {
        Ok(Self::Address(parse_address(hex)?))
    }

    /// Widen a `u128` into 32-byte little-endian `u256` storage.
    pub fn u256_from_u128(value: u128) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..16].copy_from_slice(&value.to_le_bytes());
        Self::U256(bytes)
    }

    /// Parse a decimal string into 32-byte little-endian `u256` storage.
    pub fn u256_from_decimal(text: &str) -> Result<Self, ValueError> {
        let digits = check_decimal(text)?;
        let mut bytes = [0u8; 32];
        for d in digits.bytes() {
            let mut carry = u16::from(d - b'0');
            for limb in bytes.iter_mut() {
                let v = u16::from(*limb) * 10 + carry;
                *limb = (v & 0xff) as u8;
                carry = v >> 8;
            }
            if carry != 0 {
                return Err(ValueError::Overflow(text.to_string()));
            }
        }
        Ok(Self::U256(bytes))
    }

    /// Parse a decimal string into a `u128` value.
    pub fn u128_from_decimal(text: &str) -> Result<Self, ValueError> {
        let digits = check_decimal(text)?;
        digits
            .parse::<u128>()
            .map(Self::U128)
            .map_err(|_| ValueError::Overflow(text.to_string()))
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u8.
    pub fn as_u8(&self) -> Option<u8> {
        match self {
            Self::U8(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u16.
    pub fn as_u16(&self) -> Option<u16> {
        match self {
            Self::U16(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u32.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u128.
    pub fn as_u128(&self) -> Option<u128> {
        match self {
            Self::U128(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the raw little-endian u256 bytes.
    pub fn as_u256(&self) -> Option<&[u8; 32]> {
        match self {
            Self::U256(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get the raw address bytes.
    pub fn as_address(&self) -> Option<&[u8; 32]> {
        match self {
            Self::Address(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as text (either string flavor).
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Ascii(v) | Self::Utf8(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as vector elements.
    pub fn as_vector(&self) -> Option<&[BcsValue]> {
        match self {
            Self::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as map entries.
    pub fn as_map(&self) -> Option<&[(BcsValue, BcsValue)]> {
        match self {
            Self::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get the optional shape.
    pub fn as_option(&self) -> Option<Option<&BcsValue>> {
        match self {
            Self::Option(v) => Some(v.as_deref()),
            _ => None,
        }
    }

    /// Try to get a struct field.
    pub fn get_field(&self, name: &str) -> Option<&BcsValue> {
        match self {
            Self::Struct(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Get the enum variant name.
    pub fn enum_variant(&self) -> Option<&str> {
        match self {
            Self::Enum(name, _) => Some(name),
            _ => None,
        }
    }

    /// Get the enum payload, if any.
    pub fn enum_payload(&self) -> Option<&BcsValue> {
        match self {
            Self::Enum(_, payload) => payload.as_deref(),
            _ => None,
        }
    }

    /// Short human-readable description, used in validation and codec errors.
    pub fn describe(&self) -> String {
        match self {
            Self::Bool(v) => format!("bool({})", v),
            Self::U8(v) => format!("u8({})", v),
            Self::U16(v) => format!("u16({})", v),
            Self::U32(v) => format!("u32({})", v),
            Self::U64(v) => format!("u64({})", v),
            Self::U128(v) => format!("u128({})", v),
            Self::U256(_) => "u256".to_string(),
            Self::Address(bytes) => format!("address({})", address_to_hex(bytes)),
            Self::Ascii(s) => format!("ascii({:?})", s),
            Self::Utf8(s) => format!("string({:?})", s),
            Self::Vector(v) => format!("vector of {} elements", v.len()),
            Self::Option(None) => "none".to_string(),
            Self::Option(Some(inner)) => format!("some({})", inner.describe()),
            Self::Map(entries) => format!("map of {} entries", entries.len()),
            Self::Struct(fields) => format!("struct with {} fields", fields.len()),
            Self::Enum(name, _) => format!("enum variant {:?}", name),
        }
    }
}

/// Parse a hex address string into 32 raw bytes.
///
/// Accepts an optional `0x` prefix and short forms (left-padded with zeros).
pub fn parse_address(hex: &str) -> Result<[u8; 32], ValueError> {
    let digits = hex.strip_prefix("0x").unwrap_or(hex);
    if digits.is_empty()
        || digits.len() > 64
        || !digits.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return Err(ValueError::InvalidHex(hex.to_string()));
    }

    let mut padded = [b'0'; 64];
    padded[64 - digits.len()..].copy_from_slice(digits.as_bytes());

    let mut bytes = [0u8; 32];
    for (i, pair) in padded.chunks(2).enumerate() {
        let hi = hex_digit(pair[0]);
        let lo = hex_digit(pair[1]);
        bytes[i] = (hi << 4) | lo;
    }
    Ok(bytes)
}

/// Format 32 address bytes as lowercase `0x` hex.
pub fn address_to_hex(bytes: &[u8; 32]) -> String {
    let mut out = String::with_capacity(66);
    out.push_str("0x");
    for b in bytes {
        out.push(char::from_digit(u32::from(*b >> 4), 16).unwrap_or('0'));
        out.push(char::from_digit(u32::from(*b & 0xf), 16).unwrap_or('0'));
    }
    out
}

fn hex_digit(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}

fn check_decimal(text: &str) -> Result<&str, ValueError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValueError::InvalidDecimal(text.to_string()));
    }
    Ok(trimmed)
}

// Conversion traits
impl From<bool> for BcsValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u8> for BcsValue {
    fn from(v: u8) -> Self {
        Self::U8(v)
    }
}

impl From<u16> for BcsValue {
    fn from(v: u16) -> Self {
        Self::U16(v)
    }
}

impl From<u32> for BcsValue {
    fn from(v: u32) -> Self {
        Self::U32(v)
    }
}

impl From<u64> for BcsValue {
    fn from(v: u64) -> Self {
        Self::U64(v)
    }
}

impl From<u128> for BcsValue {
    fn from(v: u128) -> Self {
        Self::U128(v)
    }
}

impl From<String> for BcsValue {
    fn from(v: String) -> Self {
        Self::Utf8(v)
    }
}

impl From<&str> for BcsValue {
    fn from(v: &str) -> Self {
        Self::Utf8(v.to_string())
    }
}

impl<T: Into<BcsValue>> From<Vec<T>> for BcsValue {
    fn from(v: Vec<T>) -> Self {
        Self::Vector(v.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_accessors() {
        let v = BcsValue::from(42u32);
        assert_eq!(v.as_u32(), Some(42));
        assert_eq!(v.as_u64(), None);

        let v = BcsValue::from("hello");
        assert_eq!(v.as_text(), Some("hello"));
    }

    #[test]
    fn option_shapes() {
        assert_eq!(BcsValue::none().as_option(), Some(None));
        let some = BcsValue::some(7u8);
        assert_eq!(
            some.as_option().flatten().and_then(BcsValue::as_u8),
            Some(7)
        );
    }

    #[test]
    fn record_field_access() {
        let v = BcsValue::record([("x", BcsValue::from(1u32)), ("y", BcsValue::from(2u32))]);
        assert_eq!(v.get_field("x").and_then(BcsValue::as_u32), Some(1));
        assert!(v.get_field("z").is_none());
    }

    #[test]
    fn address_parse_full_and_short() {
        let full = BcsValue::address_from_hex(
            "0x0000000000000000000000000000000000000000000000000000000000000002",
        )
        .unwrap();
        let short = BcsValue::address_from_hex("0x2").unwrap();
        assert_eq!(full, short);

        let bytes = short.as_address().unwrap();
        assert_eq!(bytes[31], 0x02);
        assert_eq!(
            address_to_hex(bytes),
            "0x0000000000000000000000000000000000000000000000000000000000000002"
        );
    }

    #[test]
    fn address_parse_rejects_garbage() {
        assert!(BcsValue::address_from_hex("0x").is_err());
        assert!(BcsValue::address_from_hex("0xzz").is_err());
        let too_long = format!("0x{}", "0".repeat(65));
        assert!(BcsValue::address_from_hex(&too_long).is_err());
    }

    #[test]
    fn u256_from_decimal_small() {
        let v = BcsValue::u256_from_decimal("199").unwrap();
        let bytes = v.as_u256().unwrap();
        assert_eq!(bytes[0], 199);
        assert!(bytes[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn u256_from_decimal_matches_u128_widening() {
        let big = 340_282_366_920_938_463_463_374_607_431_768_211_455u128; // u128::MAX
        let from_dec =
            BcsValue::u256_from_decimal("340282366920938463463374607431768211455").unwrap();
        assert_eq!(from_dec, BcsValue::u256_from_u128(big));
    }

    #[test]
    fn u256_overflow_rejected() {
        // 2^256 exactly.
        let too_big = "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert!(matches!(
            BcsValue::u256_from_decimal(too_big),
            Err(ValueError::Overflow(_))
        ));
        // 2^256 - 1 still fits.
        let max = "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        let v = BcsValue::u256_from_decimal(max).unwrap();
        assert!(v.as_u256().unwrap().iter().all(|&b| b == 0xff));
    }

    #[test]
    fn decimal_rejects_non_digits() {
        assert!(BcsValue::u128_from_decimal("12a").is_err());
        assert!(BcsValue::u256_from_decimal("").is_err());
        assert!(BcsValue::u128_from_decimal("-5").is_err());
    }
}
