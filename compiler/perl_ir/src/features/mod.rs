//! Lexically scoped pragma state.
//!
//! `FeatureTable` is the value the parser pushes onto its context stack when
//! it enters a block or package scope. It is `Copy`, so "clone-on-write" is
//! simply taking a modified copy: `use feature 'say'` inside a block produces
//! a new table for the rest of that block and leaves the enclosing table
//! untouched.
//!
//! # Recognised forms
//!
//! - `use strict` / `no strict 'refs'` (and `vars`, `subs`)
//! - `use warnings`, `use utf8`
//! - `use feature qw(say state)`, `use feature ':5.10'`, `no feature 'indirect'`
//! - `use experimental 'signatures'`
//! - `use v5.12`, `use 5.012_001`, `use VERSION` bundles
//! - modules that switch on strict and warnings (`Moose`, `Moo`, `Mojo::Base`, ...)
//!
//! Anything else is accepted and ignored.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Individual pragma bits.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct Features: u32 {
        // === strict / warnings / utf8 (bits 0-7) ===
        const STRICT_REFS = 1 << 0;
        const STRICT_VARS = 1 << 1;
        const STRICT_SUBS = 1 << 2;
        const STRICT = Self::STRICT_REFS.bits()
            | Self::STRICT_VARS.bits()
            | Self::STRICT_SUBS.bits();
        const WARNINGS = 1 << 3;
        const UTF8 = 1 << 4;

        // === feature.pm (bits 8+) ===
        const SAY = 1 << 8;
        const STATE = 1 << 9;
        const SWITCH = 1 << 10;
        const UNICODE_STRINGS = 1 << 11;
        const UNICODE_EVAL = 1 << 12;
        const EVALBYTES = 1 << 13;
        const CURRENT_SUB = 1 << 14;
        const FC = 1 << 15;
        const LEXICAL_SUBS = 1 << 16;
        const POSTDEREF_QQ = 1 << 17;
        const BITWISE = 1 << 18;
        const SIGNATURES = 1 << 19;
        const ISA = 1 << 20;
        const INDIRECT = 1 << 21;
        const MULTIDIMENSIONAL = 1 << 22;
        const BAREWORD_FILEHANDLES = 1 << 23;
        const TRY = 1 << 24;
        const DEFER = 1 << 25;
    }
}

/// `feature.pm` names, in declaration order.
const FEATURE_NAMES: &[(&str, Features)] = &[
    ("say", Features::SAY),
    ("state", Features::STATE),
    ("switch", Features::SWITCH),
    ("unicode_strings", Features::UNICODE_STRINGS),
    ("unicode_eval", Features::UNICODE_EVAL),
    ("evalbytes", Features::EVALBYTES),
    ("current_sub", Features::CURRENT_SUB),
    ("fc", Features::FC),
    ("lexical_subs", Features::LEXICAL_SUBS),
    ("postderef_qq", Features::POSTDEREF_QQ),
    ("bitwise", Features::BITWISE),
    ("signatures", Features::SIGNATURES),
    ("isa", Features::ISA),
    ("indirect", Features::INDIRECT),
    ("multidimensional", Features::MULTIDIMENSIONAL),
    ("bareword_filehandles", Features::BAREWORD_FILEHANDLES),
    ("try", Features::TRY),
    ("defer", Features::DEFER),
];

/// Modules whose `import` turns on strict and warnings for the caller.
const STRICT_MODULES: &[&str] = &[
    "Moose",
    "Moo",
    "Mouse",
    "Mojo::Base",
    "Modern::Perl",
    "common::sense",
    "strictures",
    "Test::More",
];

impl Features {
    /// Bits of `feature.pm` (everything except strict/warnings/utf8).
    pub const FEATURE_MASK: Features = Features::from_bits_truncate(0xFFFF_FF00);

    /// Feature bits enabled when no pragma has been seen.
    pub const DEFAULT: Features = Features::INDIRECT
        .union(Features::MULTIDIMENSIONAL)
        .union(Features::BAREWORD_FILEHANDLES);

    /// Look up a single `feature.pm` name.
    pub fn from_feature_name(name: &str) -> Option<Features> {
        FEATURE_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, f)| *f)
    }

    /// The `feature.pm` bundle for a Perl version (`:5.10`, `use v5.36`).
    pub fn bundle(version: PerlVersion) -> Features {
        let mut bits = Features::DEFAULT;
        if version < PerlVersion::new(5, 10, 0) {
            return bits;
        }
        bits |= Features::SAY | Features::STATE | Features::SWITCH;
        if version >= PerlVersion::new(5, 12, 0) {
            bits |= Features::UNICODE_STRINGS;
        }
        if version >= PerlVersion::new(5, 16, 0) {
            bits |= Features::CURRENT_SUB
                | Features::FC
                | Features::EVALBYTES
                | Features::UNICODE_EVAL;
        }
        if version >= PerlVersion::new(5, 24, 0) {
            bits |= Features::POSTDEREF_QQ;
        }
        if version >= PerlVersion::new(5, 28, 0) {
            bits |= Features::BITWISE;
        }
        if version >= PerlVersion::new(5, 36, 0) {
            bits |= Features::SIGNATURES | Features::ISA;
            bits -= Features::INDIRECT | Features::SWITCH | Features::MULTIDIMENSIONAL;
        }
        if version >= PerlVersion::new(5, 38, 0) {
            bits -= Features::BAREWORD_FILEHANDLES;
        }
        if version >= PerlVersion::new(5, 40, 0) {
            bits |= Features::TRY;
        }
        bits
    }
}

/// Set of enabled pragmas plus the minimum Perl version asserted so far.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FeatureTable {
    features: Features,
    min_version: PerlVersion,
}

impl Default for FeatureTable {
    fn default() -> Self {
        FeatureTable {
            features: Features::DEFAULT,
            min_version: PerlVersion::MINIMUM,
        }
    }
}

impl FeatureTable {
    /// Table in effect at the top of a file analysed against `version`.
    ///
    /// Only the version floor is set; feature bundles are enabled by explicit
    /// `use VERSION` statements, matching how `perl` treats its own version.
    pub fn for_version(version: PerlVersion) -> Self {
        FeatureTable {
            features: Features::DEFAULT,
            min_version: version,
        }
    }

    pub const fn from_parts(features: Features, min_version: PerlVersion) -> Self {
        FeatureTable {
            features,
            min_version,
        }
    }

    #[inline]
    pub const fn features(&self) -> Features {
        self.features
    }

    #[inline]
    pub const fn min_version(&self) -> PerlVersion {
        self.min_version
    }

    #[inline]
    pub fn is_enabled(&self, feature: Features) -> bool {
        self.features.contains(feature)
    }

    /// Apply `use VERSION`.
    ///
    /// The version floor only ever rises. The feature bundle of the new
    /// version replaces the current `feature.pm` bits; from 5.12 on strict is
    /// enabled, from 5.36 on warnings too.
    #[must_use]
    pub fn with_version(self, version: PerlVersion) -> Self {
        let mut features = (self.features - Features::FEATURE_MASK) | Features::bundle(version);
        if version >= PerlVersion::new(5, 12, 0) {
            features |= Features::STRICT;
        }
        if version >= PerlVersion::new(5, 36, 0) {
            features |= Features::WARNINGS;
        }
        FeatureTable {
            features,
            min_version: self.min_version.max(version),
        }
    }

    /// Apply `use NAME ARGS` (`enable = true`) or `no NAME ARGS`.
    ///
    /// `args` are the already unquoted import-list words. Unknown pragma names
    /// and unknown feature names leave the table unchanged.
    #[must_use]
    pub fn with_pragma(self, name: &str, args: &[&str], enable: bool) -> Self {
        let bits = match name {
            "strict" => strict_bits(args),
            "warnings" => Features::WARNINGS,
            "utf8" => Features::UTF8,
            "feature" | "experimental" => feature_bits(args),
            _ if enable && STRICT_MODULES.contains(&name) => Features::STRICT | Features::WARNINGS,
            _ => Features::empty(),
        };
        let mut features = self.features;
        if enable {
            features |= bits;
        } else {
            features -= bits;
        }
        FeatureTable {
            features,
            min_version: self.min_version,
        }
    }

    /// Names of the enabled `feature.pm` features, in a stable order.
    pub fn enabled_feature_names(&self) -> Vec<&'static str> {
        FEATURE_NAMES
            .iter()
            .filter(|(_, f)| self.features.contains(*f))
            .map(|(n, _)| *n)
            .collect()
    }

    /// Names of all enabled pragmas: `strict`, `warnings`, `utf8` followed by
    /// the enabled features.
    pub fn enabled_pragma_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.features.contains(Features::STRICT) {
            names.push("strict");
        }
        if self.features.contains(Features::WARNINGS) {
            names.push("warnings");
        }
        if self.features.contains(Features::UTF8) {
            names.push("utf8");
        }
        names.extend(self.enabled_feature_names());
        names
    }
}

fn strict_bits(args: &[&str]) -> Features {
    if args.is_empty() {
        return Features::STRICT;
    }
    args.iter().fold(Features::empty(), |acc, arg| {
        acc | match *arg {
            "refs" => Features::STRICT_REFS,
            "vars" => Features::STRICT_VARS,
            "subs" => Features::STRICT_SUBS,
            _ => Features::empty(),
        }
    })
}

fn feature_bits(args: &[&str]) -> Features {
    args.iter().fold(Features::empty(), |acc, arg| {
        if let Some(bundle) = arg.strip_prefix(':') {
            if bundle == "all" {
                return acc | Features::FEATURE_MASK;
            }
            return match PerlVersion::parse(bundle) {
                Some(version) => acc | (Features::bundle(version) - Features::DEFAULT),
                None => acc,
            };
        }
        acc | Features::from_feature_name(arg).unwrap_or(Features::empty())
    })
}

/// A Perl version, as written in `use VERSION` or `package NAME VERSION`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct PerlVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl PerlVersion {
    /// Floor used when nothing has been declared.
    pub const MINIMUM: PerlVersion = PerlVersion::new(5, 0, 0);

    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        PerlVersion {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version literal.
    ///
    /// Accepts v-strings (`v5.12.1`, `v5`), dotted forms with two or more
    /// dots (`5.12.1`) and decimal forms (`5.012001`, `5.012`, `5.12`), where
    /// the fraction is read in groups of three digits (`5.12` is 5.120.0).
    /// Underscores are ignored.
    pub fn parse(text: &str) -> Option<PerlVersion> {
        let cleaned: String = text.trim().chars().filter(|&c| c != '_').collect();
        if let Some(rest) = cleaned.strip_prefix('v') {
            return Self::parse_dotted(rest);
        }
        if cleaned.matches('.').count() >= 2 {
            return Self::parse_dotted(&cleaned);
        }
        let (int_part, frac) = cleaned.split_once('.').unwrap_or((&cleaned, ""));
        let major = int_part.parse().ok()?;
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let mut padded = frac.to_owned();
        while padded.len() % 3 != 0 {
            padded.push('0');
        }
        let group = |idx: usize| -> Option<u16> {
            padded
                .get(idx * 3..idx * 3 + 3)
                .map_or(Some(0), |g| g.parse().ok())
        };
        Some(PerlVersion::new(major, group(0)?, group(1)?))
    }

    fn parse_dotted(text: &str) -> Option<PerlVersion> {
        let mut parts = text.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next().map_or(Some(0), |p| p.parse().ok())?;
        let patch = parts.next().map_or(Some(0), |p| p.parse().ok())?;
        Some(PerlVersion::new(major, minor, patch))
    }
}

impl fmt::Display for PerlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests;
