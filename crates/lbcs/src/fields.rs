// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field-level serialization.
//!
//! Encodes a keyed record one field at a time: the output is one buffer per
//! schema field (or per explicitly selected subset), not a single
//! concatenated struct buffer. This independence is what lets a remote call
//! accept `(key, bytes)` pairs for targeted mutation instead of rewriting a
//! whole record. Buffers carry no embedded field names -- producer and
//! consumer must agree on the key list and its order.
//!
//! The whole-record pair ([`serialize_record`]/[`deserialize_record`])
//! produces the concatenated struct form the ledger stores.

use crate::codec::{BcsDecoder, BcsEncoder, CodecError};
use crate::registry::TypeRegistry;
use crate::schema::{Schema, SchemaField};
use crate::value::BcsValue;
use log::trace;
use std::collections::HashMap;

/// A keyed record: field name → runtime value.
pub type Record = HashMap<String, BcsValue>;

/// Serialize record fields to independent buffers.
///
/// With `selected` = `None`, iterates the schema's declared field order;
/// otherwise iterates `selected` in the caller's order (the partial-update
/// path). An omitted `Option<...>` field serializes as `none`; any other
/// omission is an error.
pub fn serialize_fields(
    registry: &TypeRegistry,
    schema: &Schema,
    record: &Record,
    selected: Option<&[&str]>,
) -> Result<Vec<Vec<u8>>, CodecError> {
    let fields = effective_fields(schema, selected)?;
    trace!("serializing {} field(s)", fields.len());

    let mut buffers = Vec::with_capacity(fields.len());
    for field in fields {
        let mut encoder = BcsEncoder::new(registry);
        match record.get(&field.name) {
            Some(value) => encoder.encode_value(&field.expr, value)?,
            None if field.expr.is_option() => {
                encoder.encode_value(&field.expr, &BcsValue::Option(None))?;
            }
            None => {
                return Err(CodecError::MissingField {
                    type_name: String::new(),
                    field: field.name.clone(),
                });
            }
        }
        buffers.push(encoder.into_bytes());
    }
    Ok(buffers)
}

/// Reconstruct a keyed record from an ordered buffer list.
///
/// `buffers.len()` must equal the effective key count (the whole schema, or
/// `selected`); a mismatch is an explicit error, never a guessed alignment.
/// Each buffer must decode to exactly one value with no trailing bytes.
pub fn deserialize_fields<B: AsRef<[u8]>>(
    registry: &TypeRegistry,
    schema: &Schema,
    buffers: &[B],
    selected: Option<&[&str]>,
) -> Result<Record, CodecError> {
    let fields = effective_fields(schema, selected)?;
    if buffers.len() != fields.len() {
        return Err(CodecError::FieldCountMismatch {
            expected: fields.len(),
            got: buffers.len(),
        });
    }
    trace!("deserializing {} field buffer(s)", fields.len());

    let mut record = Record::with_capacity(fields.len());
    for (field, buffer) in fields.iter().zip(buffers) {
        let mut decoder = BcsDecoder::new(registry, buffer.as_ref());
        let value = decoder.decode_value(&field.expr)?;
        decoder.finish()?;
        record.insert(field.name.clone(), value);
    }
    Ok(record)
}

/// Serialize a full record as one concatenated struct buffer (schema field
/// order).
pub fn serialize_record(
    registry: &TypeRegistry,
    schema: &Schema,
    record: &Record,
) -> Result<Vec<u8>, CodecError> {
    let mut encoder = BcsEncoder::new(registry);
    for field in schema.fields() {
        match record.get(&field.name) {
            Some(value) => encoder.encode_value(&field.expr, value)?,
            None if field.expr.is_option() => {
                encoder.encode_value(&field.expr, &BcsValue::Option(None))?;
            }
            None => {
                return Err(CodecError::MissingField {
                    type_name: String::new(),
                    field: field.name.clone(),
                });
            }
        }
    }
    Ok(encoder.into_bytes())
}

/// Decode one concatenated struct buffer back into a keyed record.
pub fn deserialize_record(
    registry: &TypeRegistry,
    schema: &Schema,
    bytes: &[u8],
) -> Result<Record, CodecError> {
    let mut decoder = BcsDecoder::new(registry, bytes);
    let mut record = Record::with_capacity(schema.len());
    for field in schema.fields() {
        let value = decoder.decode_value(&field.expr)?;
        record.insert(field.name.clone(), value);
    }
    decoder.finish()?;
    Ok(record)
}

/// Resolve the effective field list: full schema order, or the caller's
/// selection order.
fn effective_fields<'s>(
    schema: &'s Schema,
    selected: Option<&[&str]>,
) -> Result<Vec<&'s SchemaField>, CodecError> {
    match selected {
        None => Ok(schema.fields().iter().collect()),
        Some(keys) => keys
            .iter()
            .map(|key| {
                schema
                    .field(key)
                    .ok_or_else(|| CodecError::UnknownField((*key).to_string()))
            })
            .collect(),
    }
}
