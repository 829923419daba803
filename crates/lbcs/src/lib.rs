// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema-driven BCS serialization engine.
//!
//! Takes a declarative schema (field name → type tag such as `u64`,
//! `vector<u8>`, `Option<ascii>`, `VecMap<string,string>`), validates
//! runtime values against it, and deterministically encodes/decodes them
//! to/from the canonical binary format (BCS) shared with a remote ledger.
//!
//! # Features
//!
//! - **TypeRegistry**: name → wire layout table (primitives, struct layouts,
//!   enum layouts) with forward references and generic instantiation
//! - **Type-tag grammar**: composite type strings parsed once into a
//!   [`TypeExpr`] AST with balanced angle-bracket matching
//! - **Validation**: per-field conformance errors naming the field, the
//!   expected type, and the actual value
//! - **Field-level codec**: one buffer per field for partial updates, plus
//!   whole-record encoding
//! - **View extraction**: unwraps the length-prefixed response envelope of a
//!   read-only remote call
//!
//! # Architecture
//!
//! ```text
//! register layouts        build schema          keyed record
//!       |                      |                     |
//!       v                      v                     v
//!  TypeRegistry  ------>  Schema (ordered)  --->  validate
//!       |                      |                     |
//!       |                      v                     v
//!       +--------------> serialize_fields ---> wire buffers ---> transport
//!                              ^                                    |
//!                              |                                    v
//!                        deserialize_fields <--- extract_payload <--+
//! ```
//!
//! # Example
//!
//! ```rust
//! use lbcs::{BcsValue, Schema, TypeRegistry};
//!
//! let registry = TypeRegistry::new();
//! let schema = Schema::builder()
//!     .field("name", "ascii")
//!     .field("power_level", "u64")
//!     .build(&registry)
//!     .unwrap();
//!
//! let mut record = lbcs::Record::new();
//! record.insert("name".to_string(), BcsValue::Ascii("Kyrie".into()));
//! record.insert("power_level".to_string(), BcsValue::U64(199));
//!
//! lbcs::validate(&registry, &schema, &record).unwrap();
//! let buffers = lbcs::serialize_fields(&registry, &schema, &record, None).unwrap();
//! assert_eq!(buffers[1], vec![199, 0, 0, 0, 0, 0, 0, 0]);
//!
//! let decoded = lbcs::deserialize_fields(&registry, &schema, &buffers, None).unwrap();
//! assert_eq!(decoded, record);
//! ```

pub mod codec;
pub mod fields;
pub mod registry;
pub mod schema;
pub mod typeexpr;
pub mod validate;
pub mod value;
pub mod view;
pub mod wire;

pub use codec::{
    decode_value, encode_value, BcsDecoder, BcsEncoder, CodecError, CodecLimits, DEFAULT_MAX_DEPTH,
};
pub use fields::{
    deserialize_fields, deserialize_record, serialize_fields, serialize_record, Record,
};
pub use registry::{EnumDef, RegistryError, StructDef, TypeDef, TypeRegistry};
pub use schema::{Schema, SchemaBuilder, SchemaError, SchemaField};
pub use typeexpr::{parse_type_tag, PrimitiveKind, TypeExpr, TypeParseError};
pub use validate::{validate, ValidateError};
pub use value::{address_to_hex, parse_address, BcsValue, ValueError};
pub use view::{
    encode_submit_payloads, extract_payload, parse_response, strip_length_prefix, ReturnBytes,
    ReturnValue, SubmitAck, Transport, TransportError, ViewError, ViewResponse, ViewResult,
};
pub use wire::{peel_uleb128, WireError, WireReader, WireWriter};
