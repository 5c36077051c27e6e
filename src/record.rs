// CLASSIFICATION: COMMUNITY
// Filename: record.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Record preamble and line shape.
//!
//! Every record is `<tag>: <file>:<line> <function>()`, followed by
//! `: <body>` when the body is non-empty. Log consumers rely on this shape,
//! so [`render`] and [`ParsedRecord::parse`] must stay in step.

use std::fmt::{Display, Write};

/// Separator between `name: value` pairs.
pub const KV_SEPARATOR: &str = ",  ";

/// Call-site origin of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: &'static str,
    pub line: u32,
    pub function: &'static str,
}

impl Location {
    pub const fn new(file: &'static str, line: u32, function: &'static str) -> Self {
        Self {
            file,
            line,
            function,
        }
    }
}

/// Reduce a `type_name` of a nested item to the enclosing function's name.
#[doc(hidden)]
pub fn function_name(path: &'static str) -> &'static str {
    let path = path.strip_suffix("::__pk_here").unwrap_or(path);
    path.rsplit("::")
        .find(|seg| *seg != "{{closure}}")
        .unwrap_or(path)
}

/// Capture the current file, line and enclosing function as a [`Location`].
#[macro_export]
macro_rules! location {
    () => {{
        fn __pk_here() {}
        fn __pk_type_name<T>(_: T) -> &'static str {
            ::core::any::type_name::<T>()
        }
        $crate::Location::new(
            ::core::file!(),
            ::core::line!(),
            $crate::record::function_name(__pk_type_name(__pk_here)),
        )
    }};
}

/// Render one record line.
pub fn render(tag: &str, loc: &Location, body: &str) -> String {
    let mut line = String::with_capacity(tag.len() + loc.file.len() + body.len() + 32);
    let _ = write!(line, "{tag}: {}:{} {}()", loc.file, loc.line, loc.function);
    if !body.is_empty() {
        line.push_str(": ");
        line.push_str(body);
    }
    line
}

/// Render `name: value` pairs in input order.
pub fn render_kv<N, V, I>(pairs: I) -> String
where
    N: Display,
    V: Display,
    I: IntoIterator<Item = (N, V)>,
{
    let mut out = String::new();
    for (i, (name, value)) in pairs.into_iter().enumerate() {
        if i > 0 {
            out.push_str(KV_SEPARATOR);
        }
        let _ = write!(out, "{name}: {value}");
    }
    out
}

/// A record line split back into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedRecord<'a> {
    pub file: &'a str,
    pub line: u32,
    pub function: &'a str,
    pub body: &'a str,
}

impl<'a> ParsedRecord<'a> {
    /// Parse a line emitted with `tag`; `None` for anything else.
    pub fn parse(tag: &str, text: &'a str) -> Option<Self> {
        let rest = text.strip_prefix(tag)?.strip_prefix(": ")?;
        let (head, body) = match rest.find("(): ") {
            Some(idx) => (&rest[..idx], &rest[idx + 4..]),
            None => (rest.strip_suffix("()")?, ""),
        };
        let (file_line, function) = head.rsplit_once(' ')?;
        let (file, line) = file_line.rsplit_once(':')?;
        let line = line.parse().ok()?;
        if file.is_empty() || function.is_empty() {
            return None;
        }
        Some(Self {
            file,
            line,
            function,
            body,
        })
    }
}
