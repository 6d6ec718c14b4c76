//! Values written in annotations: `#@returns ArrayRef[Foo::Bar]`.
//!
//! ```text
//! type  := shape ('|' shape)*
//! shape := NAME ('[' type ']')?
//! ```
//!
//! `Scalar`, `Str`, `Num`, `Undef`, `Glob`, `Array`, `Hash`, `ArrayRef`,
//! `HashRef` and `CodeRef` are built in; any other name is a package and
//! stands for an instance of it.

use super::{ScalarKind, Value};

impl Value {
    /// Parse an annotation type. `None` when the text is not a type.
    pub fn from_annotation(text: &str) -> Option<Value> {
        let mut parser = TypeParser {
            text: text.trim(),
            pos: 0,
        };
        let value = parser.union(0)?;
        parser.skip_blanks();
        (parser.pos == parser.text.len()).then_some(value)
    }
}

/// Nesting limit for `ArrayRef[ArrayRef[...]]`.
const MAX_NESTING: u32 = 16;

struct TypeParser<'a> {
    text: &'a str,
    pos: usize,
}

impl TypeParser<'_> {
    fn skip_blanks(&mut self) {
        let rest = &self.text[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, byte: u8) -> bool {
        self.skip_blanks();
        if self.text.as_bytes().get(self.pos) == Some(&byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn name(&mut self) -> Option<&str> {
        self.skip_blanks();
        let start = self.pos;
        let len = self.text[start..]
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b == b':')
            .count();
        self.pos += len;
        (len > 0).then(|| &self.text[start..start + len])
    }

    fn union(&mut self, depth: u32) -> Option<Value> {
        let mut shapes = vec![self.shape(depth)?];
        while self.eat(b'|') {
            shapes.push(self.shape(depth)?);
        }
        Some(Value::merge_all(shapes))
    }

    fn shape(&mut self, depth: u32) -> Option<Value> {
        if depth > MAX_NESTING {
            return None;
        }
        let name = self.name()?.to_owned();
        let inner = if self.eat(b'[') {
            let inner = self.union(depth + 1)?;
            if !self.eat(b']') {
                return None;
            }
            Some(inner)
        } else {
            None
        };
        let container = |build: fn(Value) -> Value, empty: Value| match &inner {
            Some(v) => build(v.clone()),
            None => empty,
        };
        Some(match name.as_str() {
            "Scalar" | "Any" => Value::SCALAR,
            "Str" | "String" => Value::Scalar(ScalarKind::String),
            "Num" | "Number" | "Int" => Value::Scalar(ScalarKind::Number),
            "Undef" | "undef" => Value::Undef,
            "Glob" => Value::Glob,
            "Array" => container(Value::array_of, Value::Array(None)),
            "Hash" => container(Value::hash_of, Value::Hash(None)),
            "ArrayRef" => container(Value::array_ref_of, Value::ArrayRef(None)),
            "HashRef" => container(Value::hash_ref_of, Value::HashRef(None)),
            "CodeRef" | "Code" => Value::code(None, inner.clone().unwrap_or_default()),
            package if inner.is_none() && !package.starts_with(':') && !package.ends_with(':') => {
                Value::object(package)
            }
            _ => return None,
        })
    }
}
