// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-tag grammar.
//!
//! Parses type-tag strings (`u64`, `vector<u8>`, `Option<ascii>`,
//! `VecMap<string,string>`, `Name<T1,...,Tn>`) into a [`TypeExpr`] AST with
//! balanced angle-bracket matching. All later stages (validation, codec)
//! match on the AST rather than re-inspecting strings.

use std::collections::HashMap;
use std::fmt;

/// Primitive leaf types of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    /// 32-byte account address.
    Address,
    /// 32-byte object id. Same wire shape as `Address`.
    Id,
    /// ULEB128-prefixed ASCII-only text.
    Ascii,
    /// ULEB128-prefixed UTF-8 text.
    Utf8,
}

impl PrimitiveKind {
    /// The tag string this kind parses from.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::U128 => "u128",
            Self::U256 => "u256",
            Self::Address => "address",
            Self::Id => "id",
            Self::Ascii => "ascii",
            Self::Utf8 => "string",
        }
    }

    /// Reverse lookup from a tag string.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "bool" => Some(Self::Bool),
            "u8" => Some(Self::U8),
            "u16" => Some(Self::U16),
            "u32" => Some(Self::U32),
            "u64" => Some(Self::U64),
            "u128" => Some(Self::U128),
            "u256" => Some(Self::U256),
            "address" => Some(Self::Address),
            "id" => Some(Self::Id),
            "ascii" => Some(Self::Ascii),
            "string" => Some(Self::Utf8),
            _ => None,
        }
    }

    /// All built-in primitive kinds, in tag order.
    pub fn all() -> &'static [PrimitiveKind] {
        &[
            Self::Bool,
            Self::U8,
            Self::U16,
            Self::U32,
            Self::U64,
            Self::U128,
            Self::U256,
            Self::Address,
            Self::Id,
            Self::Ascii,
            Self::Utf8,
        ]
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Parsed type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// Built-in leaf type.
    Primitive(PrimitiveKind),
    /// `vector<T>`: ULEB128 count followed by element encodings.
    Vector(Box<TypeExpr>),
    /// `Option<T>`: one-byte presence flag, then `T` if present.
    Option(Box<TypeExpr>),
    /// `VecMap<K,V>`: ULEB128 entry count followed by key/value pairs.
    Map(Box<TypeExpr>, Box<TypeExpr>),
    /// Registered struct/enum reference, optionally instantiated
    /// (`Name<T1,...,Tn>`), or a generic type parameter in scope.
    Named { name: String, args: Vec<TypeExpr> },
}

impl TypeExpr {
    /// Reference a registered type by bare name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// True if the outermost constructor is `Option<...>`.
    pub fn is_option(&self) -> bool {
        matches!(self, Self::Option(_))
    }

    /// Replace in-scope generic parameters with their bound expressions.
    ///
    /// Only bare `Named` references participate; a parameter is never itself
    /// generic.
    pub fn substitute(&self, bindings: &HashMap<&str, TypeExpr>) -> TypeExpr {
        match self {
            Self::Primitive(kind) => Self::Primitive(*kind),
            Self::Vector(elem) => Self::Vector(Box::new(elem.substitute(bindings))),
            Self::Option(inner) => Self::Option(Box::new(inner.substitute(bindings))),
            Self::Map(key, value) => Self::Map(
                Box::new(key.substitute(bindings)),
                Box::new(value.substitute(bindings)),
            ),
            Self::Named { name, args } => {
                if args.is_empty() {
                    if let Some(bound) = bindings.get(name.as_str()) {
                        return bound.clone();
                    }
                }
                Self::Named {
                    name: name.clone(),
                    args: args.iter().map(|a| a.substitute(bindings)).collect(),
                }
            }
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => write!(f, "{}", kind),
            Self::Vector(elem) => write!(f, "vector<{}>", elem),
            Self::Option(inner) => write!(f, "Option<{}>", inner),
            Self::Map(key, value) => write!(f, "VecMap<{},{}>", key, value),
            Self::Named { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(",")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
        }
    }
}

/// Errors from parsing a type-tag string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeParseError {
    /// Empty input (or an empty spot where a type was expected).
    EmptyType,
    /// A character that cannot start or continue a type name.
    InvalidChar { ch: char, at: String },
    /// `<` without a matching `>`.
    UnclosedBracket { name: String },
    /// Input left over after a complete expression.
    TrailingInput { rest: String },
    /// A generic constructor applied with the wrong argument count.
    WrongArity {
        name: String,
        expected: usize,
        got: usize,
    },
    /// A primitive tag used with type arguments (e.g. `u64<u8>`).
    GenericPrimitive { name: String },
}

impl fmt::Display for TypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyType => write!(f, "empty type expression"),
            Self::InvalidChar { ch, at } => {
                write!(f, "invalid character {:?} in type expression at {:?}", ch, at)
            }
            Self::UnclosedBracket { name } => {
                write!(f, "unbalanced angle brackets after {:?}", name)
            }
            Self::TrailingInput { rest } => {
                write!(f, "trailing input after type expression: {:?}", rest)
            }
            Self::WrongArity {
                name,
                expected,
                got,
            } => write!(
                f,
                "{} expects {} type argument(s), got {}",
                name, expected, got
            ),
            Self::GenericPrimitive { name } => {
                write!(f, "primitive type {:?} takes no type arguments", name)
            }
        }
    }
}

impl std::error::Error for TypeParseError {}

/// Parse a type-tag string into a [`TypeExpr`].
///
/// Deterministic: the same input always yields the same AST. Registry lookups
/// happen later -- `Named` references are not checked here.
pub fn parse_type_tag(input: &str) -> Result<TypeExpr, TypeParseError> {
    let mut parser = Parser::new(input);
    parser.skip_whitespace();
    let expr = parser.parse_expr()?;
    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(TypeParseError::TrailingInput {
            rest: parser.rest().to_string(),
        });
    }
    Ok(expr)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    /// Type names: alphanumerics, `_`, and `::` path separators (module
    /// qualified names like `0xabc::mod::Struct`).
    fn read_name(&mut self) -> Result<&'a str, TypeParseError> {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_alphanumeric() || ch == '_' || ch == ':' {
                self.next_char();
            } else {
                break;
            }
        }
        if self.pos == start {
            return match self.peek_char() {
                Some(ch) => Err(TypeParseError::InvalidChar {
                    ch,
                    at: self.rest().to_string(),
                }),
                None => Err(TypeParseError::EmptyType),
            };
        }
        Ok(&self.input[start..self.pos])
    }

    fn parse_expr(&mut self) -> Result<TypeExpr, TypeParseError> {
        self.skip_whitespace();
        let name = self.read_name()?;
        self.skip_whitespace();

        let mut args = Vec::new();
        if self.peek_char() == Some('<') {
            self.next_char();
            loop {
                self.skip_whitespace();
                if self.peek_char() == Some('>') {
                    // `Name<>` or `Name<T,>` -- a type is missing.
                    return Err(TypeParseError::EmptyType);
                }
                args.push(self.parse_expr()?);
                self.skip_whitespace();
                match self.next_char() {
                    Some(',') => continue,
                    Some('>') => break,
                    Some(ch) => {
                        return Err(TypeParseError::InvalidChar {
                            ch,
                            at: format!("{}{}", ch, self.rest()),
                        })
                    }
                    None => {
                        return Err(TypeParseError::UnclosedBracket {
                            name: name.to_string(),
                        })
                    }
                }
            }
        }

        classify(name, args)
    }
}

/// Map a parsed head name + arguments onto an AST constructor.
fn classify(name: &str, mut args: Vec<TypeExpr>) -> Result<TypeExpr, TypeParseError> {
    if let Some(kind) = PrimitiveKind::from_tag(name) {
        if !args.is_empty() {
            return Err(TypeParseError::GenericPrimitive {
                name: name.to_string(),
            });
        }
        return Ok(TypeExpr::Primitive(kind));
    }

    match name {
        "vector" => {
            if args.len() != 1 {
                return Err(TypeParseError::WrongArity {
                    name: name.to_string(),
                    expected: 1,
                    got: args.len(),
                });
            }
            Ok(TypeExpr::Vector(Box::new(args.remove(0))))
        }
        "Option" => {
            if args.len() != 1 {
                return Err(TypeParseError::WrongArity {
                    name: name.to_string(),
                    expected: 1,
                    got: args.len(),
                });
            }
            Ok(TypeExpr::Option(Box::new(args.remove(0))))
        }
        "VecMap" => {
            if args.len() != 2 {
                return Err(TypeParseError::WrongArity {
                    name: name.to_string(),
                    expected: 2,
                    got: args.len(),
                });
            }
            let value = Box::new(args.remove(1));
            let key = Box::new(args.remove(0));
            Ok(TypeExpr::Map(key, value))
        }
        _ => Ok(TypeExpr::Named {
            name: name.to_string(),
            args,
        }),
    }
}
