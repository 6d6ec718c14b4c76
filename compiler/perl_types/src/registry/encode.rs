//! Stub encoding of registry entries.
//!
//! Names are written as strings and re-interned on decode, so a stub can be
//! read into any interner. A registry stub starts with a format version
//! byte; entries inside it carry their own tags.

use perl_ir::{FeatureTable, Features, Name, NodeId, PerlVersion, Span, StringInterner};
use rustc_hash::FxHashMap;

use super::{PackageEntry, Registry, SubEntry, SubFlags, UseEntry, UseKind};
use crate::{DecodeError, Decoder, Encoder, Tag, Value};

/// Bumped only when an existing payload layout changes.
pub const FORMAT_VERSION: u8 = 1;

fn name(enc: &mut Encoder, interner: &StringInterner, name: Name) {
    enc.str(interner.lookup(name));
}

fn read_name(dec: &mut Decoder<'_>, interner: &StringInterner) -> Result<Name, DecodeError> {
    Ok(interner.intern(dec.str()?))
}

fn names(enc: &mut Encoder, interner: &StringInterner, list: &[Name]) {
    enc.seq_len(list.len());
    for &n in list {
        name(enc, interner, n);
    }
}

fn read_names(dec: &mut Decoder<'_>, interner: &StringInterner) -> Result<Vec<Name>, DecodeError> {
    let count = dec.seq_len()?;
    (0..count).map(|_| read_name(dec, interner)).collect()
}

fn span(enc: &mut Encoder, span: Span) {
    enc.u32(span.start);
    enc.u32(span.end);
}

fn read_span(dec: &mut Decoder<'_>) -> Result<Span, DecodeError> {
    let start = dec.u32()?;
    let end = dec.u32()?;
    if end < start {
        return Err(DecodeError::InvalidPayload("span ends before it starts"));
    }
    Ok(Span::new(start, end))
}

fn version(enc: &mut Encoder, version: PerlVersion) {
    enc.u32(u32::from(version.major));
    enc.u32(u32::from(version.minor));
    enc.u32(u32::from(version.patch));
}

fn read_version(dec: &mut Decoder<'_>) -> Result<PerlVersion, DecodeError> {
    let mut part = || {
        u16::try_from(dec.u32()?)
            .map_err(|_| DecodeError::InvalidPayload("version part out of range"))
    };
    Ok(PerlVersion::new(part()?, part()?, part()?))
}

impl SubEntry {
    pub fn encode(&self, enc: &mut Encoder, interner: &StringInterner) {
        enc.tag(Tag::Sub);
        name(enc, interner, self.name);
        name(enc, interner, self.package);
        span(enc, self.span);
        enc.u32(self.node.raw());
        enc.u8(self.flags.bits());
        enc.bool(self.returns.is_some());
        if let Some(returns) = &self.returns {
            returns.encode(enc);
        }
    }

    pub fn decode(
        dec: &mut Decoder<'_>,
        interner: &StringInterner,
    ) -> Result<SubEntry, DecodeError> {
        dec.expect_tag(Tag::Sub)?;
        let name = read_name(dec, interner)?;
        let package = read_name(dec, interner)?;
        let span = read_span(dec)?;
        let node = NodeId::from_raw(dec.u32()?);
        let flags = SubFlags::from_bits(dec.u8()?)
            .ok_or(DecodeError::InvalidPayload("unknown sub flags"))?;
        let returns = if dec.bool()? {
            Some(Value::decode(dec)?)
        } else {
            None
        };
        Ok(SubEntry {
            name,
            package,
            span,
            node,
            returns,
            flags,
        })
    }
}

impl UseEntry {
    pub fn encode(&self, enc: &mut Encoder, interner: &StringInterner) {
        enc.tag(Tag::Use);
        name(enc, interner, self.module);
        enc.u8(match self.kind {
            UseKind::Use => 0,
            UseKind::No => 1,
        });
        enc.bool(self.imports.is_some());
        if let Some(imports) = &self.imports {
            names(enc, interner, imports);
        }
        span(enc, self.span);
    }

    pub fn decode(
        dec: &mut Decoder<'_>,
        interner: &StringInterner,
    ) -> Result<UseEntry, DecodeError> {
        dec.expect_tag(Tag::Use)?;
        let module = read_name(dec, interner)?;
        let kind = match dec.u8()? {
            0 => UseKind::Use,
            1 => UseKind::No,
            _ => return Err(DecodeError::InvalidPayload("use kind out of range")),
        };
        let imports = if dec.bool()? {
            Some(read_names(dec, interner)?)
        } else {
            None
        };
        Ok(UseEntry {
            module,
            kind,
            imports,
            span: read_span(dec)?,
        })
    }
}

impl PackageEntry {
    pub fn encode(&self, enc: &mut Encoder, interner: &StringInterner) {
        enc.tag(Tag::Package);
        name(enc, interner, self.name);
        span(enc, self.span);
        enc.bool(self.version.is_some());
        if let Some(v) = self.version {
            version(enc, v);
        }
        names(enc, interner, &self.parents);
        names(enc, interner, &self.export);
        names(enc, interner, &self.export_ok);
        enc.seq_len(self.uses.len());
        for entry in &self.uses {
            entry.encode(enc, interner);
        }
        enc.u32(self.features.features().bits());
        version(enc, self.features.min_version());
        enc.seq_len(self.subs.len());
        for sub in &self.subs {
            sub.encode(enc, interner);
        }
    }

    pub fn decode(
        dec: &mut Decoder<'_>,
        interner: &StringInterner,
    ) -> Result<PackageEntry, DecodeError> {
        dec.expect_tag(Tag::Package)?;
        let mut entry = PackageEntry::new(read_name(dec, interner)?, read_span(dec)?);
        if dec.bool()? {
            entry.version = Some(read_version(dec)?);
        }
        entry.parents = read_names(dec, interner)?.into_iter().collect();
        entry.export = read_names(dec, interner)?;
        entry.export_ok = read_names(dec, interner)?;
        let uses = dec.seq_len()?;
        entry.uses = (0..uses)
            .map(|_| UseEntry::decode(dec, interner))
            .collect::<Result<_, _>>()?;
        let bits = Features::from_bits(dec.u32()?)
            .ok_or(DecodeError::InvalidPayload("unknown feature bits"))?;
        entry.features = FeatureTable::from_parts(bits, read_version(dec)?);
        let subs = dec.seq_len()?;
        for _ in 0..subs {
            entry.add_sub(SubEntry::decode(dec, interner)?);
        }
        Ok(entry)
    }
}

impl Registry {
    pub fn encode(&self, enc: &mut Encoder, interner: &StringInterner) {
        enc.tag(Tag::Registry);
        enc.u8(FORMAT_VERSION);
        enc.seq_len(self.packages.len());
        for package in &self.packages {
            package.encode(enc, interner);
        }
    }

    pub fn decode(
        dec: &mut Decoder<'_>,
        interner: &StringInterner,
    ) -> Result<Registry, DecodeError> {
        dec.expect_tag(Tag::Registry)?;
        let format = dec.u8()?;
        if format != FORMAT_VERSION {
            return Err(DecodeError::UnsupportedVersion(format));
        }
        let count = dec.seq_len()?;
        let mut packages = Vec::with_capacity(count);
        let mut index = FxHashMap::default();
        for i in 0..count {
            let package = PackageEntry::decode(dec, interner)?;
            if index.insert(package.name, i).is_some() {
                return Err(DecodeError::InvalidPayload("package listed twice"));
            }
            packages.push(package);
        }
        Ok(Registry {
            packages,
            index,
            main: interner.intern("main"),
            universal: interner.intern("UNIVERSAL"),
        })
    }

    pub fn to_bytes(&self, interner: &StringInterner) -> Vec<u8> {
        let mut enc = Encoder::new();
        self.encode(&mut enc, interner);
        enc.finish()
    }

    pub fn from_bytes(bytes: &[u8], interner: &StringInterner) -> Result<Registry, DecodeError> {
        let mut dec = Decoder::new(bytes);
        let registry = Registry::decode(&mut dec, interner)?;
        dec.finish()?;
        Ok(registry)
    }
}
