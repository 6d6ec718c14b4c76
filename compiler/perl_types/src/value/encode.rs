//! Stub encoding of values.
//!
//! `encode` writes the tag, `encode_payload` only the variant's own data.
//! Payloads:
//!
//! | Tag | Payload |
//! |---|---|
//! | `Scalar` | kind byte (0 any, 1 string, 2 number) |
//! | `Array`, `Hash`, `ArrayRef`, `HashRef` | optional inner value |
//! | `Code` | optional sub name, optional return value |
//! | `Blessed` | package, inner value |
//! | `OneOf` | member count, members |
//! | others | nothing |

use std::sync::Arc;

use super::{CodeContract, ScalarKind, Value};
use crate::{DecodeError, Decoder, Encoder, Tag};

impl Value {
    pub fn tag(&self) -> Tag {
        match self {
            Value::Scalar(_) => Tag::Scalar,
            Value::Array(_) => Tag::Array,
            Value::Hash(_) => Tag::Hash,
            Value::ArrayRef(_) => Tag::ArrayRef,
            Value::HashRef(_) => Tag::HashRef,
            Value::Code(_) => Tag::Code,
            Value::Glob => Tag::Glob,
            Value::Blessed { .. } => Tag::Blessed,
            Value::OneOf(_) => Tag::OneOf,
            Value::Undef => Tag::Undef,
            Value::Unknown => Tag::Unknown,
        }
    }

    pub fn encode(&self, enc: &mut Encoder) {
        enc.tag(self.tag());
        self.encode_payload(enc);
    }

    fn encode_payload(&self, enc: &mut Encoder) {
        match self {
            Value::Scalar(kind) => enc.u8(match kind {
                ScalarKind::Any => 0,
                ScalarKind::String => 1,
                ScalarKind::Number => 2,
            }),
            Value::Array(inner)
            | Value::Hash(inner)
            | Value::ArrayRef(inner)
            | Value::HashRef(inner) => {
                encode_opt(enc, inner.as_deref());
            }
            Value::Code(contract) => {
                enc.bool(contract.sub.is_some());
                if let Some(sub) = &contract.sub {
                    enc.str(sub);
                }
                encode_opt(enc, contract.returns.as_deref());
            }
            Value::Blessed { inner, package } => {
                enc.str(package);
                inner.encode(enc);
            }
            Value::OneOf(union) => {
                enc.seq_len(union.len());
                for member in union.members() {
                    member.encode(enc);
                }
            }
            Value::Glob | Value::Undef | Value::Unknown => {}
        }
    }

    /// Read one tagged value.
    ///
    /// Unions are re-canonicalised, so a stub written with a different
    /// member order still decodes to the canonical value. Union members sit
    /// at the union's own nesting level, as in [`Value::depth`], so any
    /// value no deeper than [`MAX_DEPTH`](crate::codec::MAX_DEPTH) decodes.
    pub fn decode(dec: &mut Decoder<'_>) -> Result<Value, DecodeError> {
        dec.enter()?;
        let value = Self::decode_tagged(dec, false);
        dec.leave();
        value
    }

    fn decode_tagged(dec: &mut Decoder<'_>, in_union: bool) -> Result<Value, DecodeError> {
        let offset = dec.position();
        let tag = dec.tag()?;
        Ok(match tag {
            Tag::Scalar => Value::Scalar(match dec.u8()? {
                0 => ScalarKind::Any,
                1 => ScalarKind::String,
                2 => ScalarKind::Number,
                _ => return Err(DecodeError::InvalidPayload("scalar kind out of range")),
            }),
            Tag::Array => Value::Array(decode_opt(dec)?),
            Tag::Hash => Value::Hash(decode_opt(dec)?),
            Tag::ArrayRef => Value::ArrayRef(decode_opt(dec)?),
            Tag::HashRef => Value::HashRef(decode_opt(dec)?),
            Tag::Code => {
                let sub = if dec.bool()? {
                    Some(Arc::from(dec.str()?))
                } else {
                    None
                };
                Value::Code(CodeContract {
                    sub,
                    returns: decode_opt(dec)?,
                })
            }
            Tag::Glob => Value::Glob,
            Tag::Blessed => {
                let package = Arc::from(dec.str()?);
                Value::Blessed {
                    inner: Arc::new(Value::decode(dec)?),
                    package,
                }
            }
            Tag::OneOf if in_union => return Err(DecodeError::InvalidPayload("nested union")),
            Tag::OneOf => {
                let count = dec.seq_len()?;
                if count < 2 {
                    return Err(DecodeError::InvalidPayload("union with fewer than two members"));
                }
                let members = (0..count)
                    .map(|_| Self::decode_tagged(dec, true))
                    .collect::<Result<Vec<_>, _>>()?;
                Value::merge_all(members)
            }
            Tag::Undef => Value::Undef,
            Tag::Unknown => Value::Unknown,
            found => {
                return Err(DecodeError::UnexpectedTag {
                    expected: "value",
                    found,
                    offset,
                })
            }
        })
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        self.encode(&mut enc);
        enc.finish()
    }

    /// Decode a buffer holding exactly one value.
    pub fn from_bytes(bytes: &[u8]) -> Result<Value, DecodeError> {
        let mut dec = Decoder::new(bytes);
        let value = Value::decode(&mut dec)?;
        dec.finish()?;
        Ok(value)
    }
}

fn encode_opt(enc: &mut Encoder, value: Option<&Value>) {
    enc.bool(value.is_some());
    if let Some(value) = value {
        value.encode(enc);
    }
}

fn decode_opt(dec: &mut Decoder<'_>) -> Result<Option<Arc<Value>>, DecodeError> {
    Ok(if dec.bool()? {
        Some(Arc::new(Value::decode(dec)?))
    } else {
        None
    })
}
