//! Identifier validation for generated SQL.
//!
//! Table, column and alias names reach the builder as plain strings. Each one
//! is parsed before it is written:
//!
//! - bare parts must match `[A-Za-z_][A-Za-z0-9_$]*` and are written as-is
//! - double-quoted parts may hold anything but NUL; `"` is escaped as `""`
//! - parts may be dotted: `public.users`, `public."UserTable".id`

use crate::error::{RepoError, RepoResult};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Bare(String),
    Quoted(String),
}

fn invalid(name: &str, reason: impl std::fmt::Display) -> RepoError {
    RepoError::build(format!("invalid identifier {name:?}: {reason}"))
}

fn parse(name: &str) -> RepoResult<Vec<Part>> {
    if name.is_empty() {
        return Err(invalid(name, "empty"));
    }
    if name.contains('\0') {
        return Err(invalid(name, "contains NUL"));
    }

    let mut parts = Vec::new();
    let mut chars = name.chars().peekable();

    while chars.peek().is_some() {
        if !parts.is_empty() {
            match chars.next() {
                Some('.') if chars.peek().is_none() => return Err(invalid(name, "trailing '.'")),
                Some('.') => {}
                Some(c) => return Err(invalid(name, format_args!("expected '.', got '{c}'"))),
                None => break,
            }
        }

        if chars.peek() == Some(&'"') {
            chars.next();
            let mut part = String::new();
            loop {
                match chars.next() {
                    Some('"') if chars.peek() == Some(&'"') => {
                        chars.next();
                        part.push('"');
                    }
                    Some('"') => break,
                    Some(c) => part.push(c),
                    None => return Err(invalid(name, "unclosed quote")),
                }
            }
            if part.is_empty() {
                return Err(invalid(name, "empty quoted part"));
            }
            parts.push(Part::Quoted(part));
            continue;
        }

        let mut part = String::new();
        while let Some(&c) = chars.peek() {
            if c == '.' {
                break;
            }
            let ok = if part.is_empty() {
                c == '_' || c.is_ascii_alphabetic()
            } else {
                c == '_' || c == '$' || c.is_ascii_alphanumeric()
            };
            if !ok {
                return Err(invalid(name, format_args!("unexpected character '{c}'")));
            }
            part.push(c);
            chars.next();
        }
        if part.is_empty() {
            return Err(invalid(name, "empty segment"));
        }
        parts.push(Part::Bare(part));
    }

    Ok(parts)
}

/// Validate `name` and append it to `out`.
pub(crate) fn push_ident(out: &mut String, name: &str) -> RepoResult<()> {
    for (i, part) in parse(name)?.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        match part {
            Part::Bare(s) => out.push_str(s),
            Part::Quoted(s) => {
                out.push('"');
                out.push_str(&s.replace('"', "\"\""));
                out.push('"');
            }
        }
    }
    Ok(())
}

/// Append `table.column`, or just `column` when `table` is empty.
pub(crate) fn push_qualified(out: &mut String, table: &str, column: &str) -> RepoResult<()> {
    if !table.is_empty() {
        push_ident(out, table)?;
        out.push('.');
    }
    push_ident(out, column)
}

/// Validated SQL text for `name`.
pub fn ident(name: &str) -> RepoResult<String> {
    let mut out = String::with_capacity(name.len());
    push_ident(&mut out, name)?;
    Ok(out)
}
