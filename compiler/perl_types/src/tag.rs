//! Stable tags of the persisted stub form.
//!
//! Every encoded item starts with one tag byte. The tag space is
//! append-only: a tag is never renumbered or reused, so stubs written by an
//! older build stay readable.
//!
//! # Tag Ranges
//!
//! - 0-31: values
//! - 32-63: registry entries
//! - 64-255: reserved

use std::fmt;

use crate::DecodeError;

/// Discriminant written in front of every encoded value or registry entry.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Tag {
    // === Values (0-31) ===
    Unknown = 0,
    Undef = 1,
    Scalar = 2,
    Array = 3,
    Hash = 4,
    ArrayRef = 5,
    HashRef = 6,
    Code = 7,
    Glob = 8,
    Blessed = 9,
    OneOf = 10,

    // === Registry entries (32-63) ===
    Package = 32,
    Sub = 33,
    Use = 34,
    Registry = 35,
}

impl Tag {
    /// Decode a tag byte read at `offset`.
    pub fn from_u8(byte: u8, offset: usize) -> Result<Tag, DecodeError> {
        Ok(match byte {
            0 => Tag::Unknown,
            1 => Tag::Undef,
            2 => Tag::Scalar,
            3 => Tag::Array,
            4 => Tag::Hash,
            5 => Tag::ArrayRef,
            6 => Tag::HashRef,
            7 => Tag::Code,
            8 => Tag::Glob,
            9 => Tag::Blessed,
            10 => Tag::OneOf,
            32 => Tag::Package,
            33 => Tag::Sub,
            34 => Tag::Use,
            35 => Tag::Registry,
            tag => return Err(DecodeError::UnknownTag { tag, offset }),
        })
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Tags in the value range.
    #[inline]
    pub const fn is_value(self) -> bool {
        (self as u8) < 32
    }

    pub const fn name(self) -> &'static str {
        match self {
            Tag::Unknown => "unknown",
            Tag::Undef => "undef",
            Tag::Scalar => "scalar",
            Tag::Array => "array",
            Tag::Hash => "hash",
            Tag::ArrayRef => "array-ref",
            Tag::HashRef => "hash-ref",
            Tag::Code => "code",
            Tag::Glob => "glob",
            Tag::Blessed => "blessed",
            Tag::OneOf => "one-of",
            Tag::Package => "package",
            Tag::Sub => "sub",
            Tag::Use => "use",
            Tag::Registry => "registry",
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag::{}({})", self.name(), *self as u8)
    }
}
