//! Registry facts written as ordinary statements: `@ISA`, `@EXPORT` and
//! `@EXPORT_OK` assignments, `push @ISA, ...`, Moose-style `extends`, and
//! the word lists of `use` statements.
//!
//! These scans run over the code tokens of a statement that has already
//! been parsed, so they never affect the tree.

use perl_ir::{Name, Span, TokenFlags, TokenKind};
use tracing::trace;

use crate::{var_name, Parser};

/// The package arrays the registry tracks.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum PackageArray {
    Isa,
    Export,
    ExportOk,
}

impl PackageArray {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "ISA" => Some(PackageArray::Isa),
            "EXPORT" => Some(PackageArray::Export),
            "EXPORT_OK" => Some(PackageArray::ExportOk),
            _ => None,
        }
    }
}

impl<'a> Parser<'a> {
    #[inline]
    fn kind_at(&self, pos: usize) -> TokenKind {
        self.cursor.token_at(pos).kind
    }

    #[inline]
    fn text_at(&self, pos: usize) -> &'a str {
        self.cursor.token_at(pos).span.text(self.source)
    }

    /// Look for package-array updates in the statement spanning code
    /// positions `first..end`.
    pub(super) fn scan_package_arrays(&mut self, first: usize, end: usize) {
        let mut pos = first;
        if matches!(
            self.kind_at(pos),
            TokenKind::KwOur | TokenKind::KwMy | TokenKind::KwLocal
        ) {
            pos += 1;
        }
        match self.kind_at(pos) {
            TokenKind::ArrayVar if self.kind_at(pos + 1) == TokenKind::Assign => {
                if let Some((package, array)) = self.package_array(pos) {
                    let names = self.word_names(pos + 2, end);
                    self.update_package_array(package, array, &names, true);
                }
            }
            TokenKind::Ident if matches!(self.text_at(pos), "push" | "unshift") => {
                let target = if self.kind_at(pos + 1) == TokenKind::LParen {
                    pos + 2
                } else {
                    pos + 1
                };
                if self.kind_at(target) != TokenKind::ArrayVar
                    || self.kind_at(target + 1) != TokenKind::Comma
                {
                    return;
                }
                if let Some((package, array)) = self.package_array(target) {
                    let names = self.word_names(target + 2, end);
                    self.update_package_array(package, array, &names, false);
                }
            }
            TokenKind::Ident if self.text_at(pos) == "extends" => {
                let names = self.word_names(pos + 1, end);
                let package = self.package();
                self.registry.set_parents(package, &names);
            }
            _ => {}
        }
    }

    /// The package and array named by the `@...` token at `pos`, when it is
    /// one of the tracked arrays. `@Foo::ISA` names `Foo`'s array.
    fn package_array(&self, pos: usize) -> Option<(Name, PackageArray)> {
        let name = var_name(self.text_at(pos));
        match name.rsplit_once("::") {
            Some((package, array)) => {
                let array = PackageArray::from_name(array)?;
                let package = if package.is_empty() {
                    self.registry.main()
                } else {
                    self.intern(package)
                };
                Some((package, array))
            }
            None => Some((self.package(), PackageArray::from_name(name)?)),
        }
    }

    fn update_package_array(
        &mut self,
        package: Name,
        array: PackageArray,
        names: &[Name],
        replace: bool,
    ) {
        trace!(?array, count = names.len(), replace, "package array");
        match (array, replace) {
            (PackageArray::Isa, true) => self.registry.set_parents(package, names),
            (PackageArray::Isa, false) => self.registry.add_parents(package, names),
            (PackageArray::Export, _) => self.registry.add_exports(package, names, false),
            (PackageArray::ExportOk, _) => self.registry.add_exports(package, names, true),
        }
    }

    fn word_names(&self, start: usize, end: usize) -> Vec<Name> {
        self.import_words(start, end)
            .iter()
            .map(|w| self.intern(w))
            .collect()
    }

    /// Words of a list written with quotes, `qw`, barewords or `&name`s.
    /// `-word` keeps its dash; a leading `&` is dropped.
    pub(crate) fn import_words(&self, start: usize, end: usize) -> Vec<String> {
        let mut words = Vec::new();
        for pos in start..end {
            let token = self.cursor.token_at(pos);
            let text = token.span.text(self.source);
            match token.kind {
                TokenKind::StringContent => words.extend(
                    text.split_whitespace()
                        .map(|w| w.trim_start_matches('&').to_owned()),
                ),
                TokenKind::Ident => {
                    let dashed = pos > start
                        && self.kind_at(pos - 1) == TokenKind::Minus
                        && !token
                            .flags
                            .intersects(TokenFlags::SPACE_BEFORE | TokenFlags::NEWLINE_BEFORE);
                    if dashed {
                        words.push(format!("-{text}"));
                    } else {
                        words.push(text.to_owned());
                    }
                }
                TokenKind::CodeVar => words.push(var_name(text).to_owned()),
                _ => {}
            }
        }
        words
    }

    /// A constant name at `pos`: a bareword or a single-quoted string.
    /// Returns the name, its span and the position after it.
    fn constant_key(&self, pos: usize) -> Option<(&'a str, Span, usize)> {
        match self.kind_at(pos) {
            TokenKind::Ident => {
                let token = self.cursor.token_at(pos);
                Some((token.span.text(self.source), token.span, pos + 1))
            }
            TokenKind::QuoteOpen
                if self.kind_at(pos + 1) == TokenKind::StringContent
                    && self.kind_at(pos + 2) == TokenKind::QuoteClose =>
            {
                let token = self.cursor.token_at(pos + 1);
                Some((token.span.text(self.source), token.span, pos + 3))
            }
            _ => None,
        }
    }

    /// Names declared by `use constant NAME => ...` or
    /// `use constant { A => ..., B => ... }`.
    pub(crate) fn constant_names(&self, start: usize, end: usize) -> Vec<(&'a str, Span)> {
        if self.kind_at(start) != TokenKind::LBrace {
            return match self.constant_key(start) {
                Some((name, span, next))
                    if matches!(self.kind_at(next), TokenKind::FatComma | TokenKind::Comma) =>
                {
                    vec![(name, span)]
                }
                _ => Vec::new(),
            };
        }
        let mut names = Vec::new();
        let mut depth = 0u32;
        let mut pos = start;
        while pos < end {
            match self.kind_at(pos) {
                TokenKind::LBrace | TokenKind::LBracket | TokenKind::LParen => depth += 1,
                TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen => {
                    depth = depth.saturating_sub(1);
                }
                _ if depth == 1 => {
                    if let Some((name, span, next)) = self.constant_key(pos) {
                        if self.kind_at(next) == TokenKind::FatComma {
                            names.push((name, span));
                            pos = next;
                            continue;
                        }
                    }
                }
                _ => {}
            }
            pos += 1;
        }
        names
    }
}
