// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed scalar values with promotion-aware comparison.
//!
//! Every predicate operand holds a [`FilterValue`]: a scalar payload plus an
//! optional pattern role for LIKE/MATCH. Comparison across kinds follows a
//! fixed promotion lattice with a single promotion direction.
//!
//! # Promotion order
//!
//! Two families exist. Within a family the lower-ranked operand is promoted
//! toward the higher-ranked one; comparisons across families are rejected
//! when the filter is built and never reach the evaluator.
//!
//! - numeric: `Bool(0) < Enum(1) < SignedInt(2) < UnsignedInt(3) < Float(4)`
//! - textual: `Char(0) < Str(1)`
//!
//! Signed-vs-unsigned comparison checks the sign first: a negative signed
//! value orders below every unsigned value. Promotions targeting `Bool` or
//! `Char` do not exist.

use regex::Regex;
use std::cmp::Ordering;

use super::FilterError;

/// Pattern role of a value used on the right-hand side of LIKE/MATCH.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RegexKind {
    /// Not a pattern operand.
    None,
    /// SQL wildcard pattern: `%`/`*` match any run, `_`/`?` match one
    /// character, everything else is literal.
    Like,
    /// Verbatim regular expression.
    Match,
}

/// Scalar payload. Exactly one variant is valid per operand by construction.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Payload {
    Bool(bool),
    Char(char),
    SignedInt(i64),
    UnsignedInt(u64),
    Float(f64),
    Str(String),
    /// Underlying enumeration value.
    Enum(i32),
}

/// Family and in-family rank for the promotion lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Numeric,
    Textual,
}

impl Payload {
    fn family(&self) -> Family {
        match self {
            Payload::Bool(_)
            | Payload::Enum(_)
            | Payload::SignedInt(_)
            | Payload::UnsignedInt(_)
            | Payload::Float(_) => Family::Numeric,
            Payload::Char(_) | Payload::Str(_) => Family::Textual,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Payload::Bool(_) => 0,
            Payload::Enum(_) => 1,
            Payload::SignedInt(_) => 2,
            Payload::UnsignedInt(_) => 3,
            Payload::Float(_) => 4,
            Payload::Char(_) => 0,
            Payload::Str(_) => 1,
        }
    }

    fn as_i64(&self) -> i64 {
        match self {
            Payload::Bool(v) => i64::from(*v),
            Payload::Enum(v) => i64::from(*v),
            Payload::SignedInt(v) => *v,
            _ => unreachable!("integer promotion applies to bool/enum/signed only"),
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            Payload::Bool(v) => f64::from(*v),
            Payload::Enum(v) => f64::from(*v),
            Payload::SignedInt(v) => *v as f64,
            Payload::UnsignedInt(v) => *v as f64,
            Payload::Float(v) => *v,
            _ => unreachable!("float promotion applies to numeric kinds only"),
        }
    }
}

/// A scalar operand value: payload, pattern role, compiled pattern.
#[derive(Debug, Clone)]
pub(crate) struct FilterValue {
    pub payload: Payload,
    regex_kind: RegexKind,
    pattern: Option<Regex>,
}

impl FilterValue {
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            regex_kind: RegexKind::None,
            pattern: None,
        }
    }

    /// Mark this value as a LIKE/MATCH pattern operand and compile it.
    pub fn set_regex_kind(&mut self, kind: RegexKind) -> Result<(), FilterError> {
        self.regex_kind = kind;
        self.compile_pattern()
    }

    pub fn regex_kind(&self) -> RegexKind {
        self.regex_kind
    }

    /// Re-derive any cached state after the payload changed.
    ///
    /// For pattern operands the regex is recompiled; a value that no longer
    /// compiles (a field-sourced MATCH pattern can hold arbitrary text)
    /// simply stops matching.
    pub fn value_has_changed(&mut self) {
        if self.regex_kind == RegexKind::None {
            return;
        }
        if let Err(e) = self.compile_pattern() {
            log::debug!("[filter] pattern recompilation failed: {}", e);
        }
    }

    /// Compile the pattern from the current payload text.
    pub fn compile_pattern(&mut self) -> Result<(), FilterError> {
        self.pattern = None;
        if self.regex_kind == RegexKind::None {
            return Ok(());
        }
        let Some(text) = self.owned_text() else {
            return Err(FilterError::IncompatibleTypes(
                "pattern operand is not a string or char".into(),
            ));
        };
        let source = match self.regex_kind {
            RegexKind::Like => like_to_regex(&text),
            RegexKind::Match => format!("^(?:{})$", text),
            RegexKind::None => unreachable!(),
        };
        let regex = Regex::new(&source).map_err(|e| FilterError::InvalidRegex {
            pattern: source,
            reason: e.to_string(),
        })?;
        self.pattern = Some(regex);
        Ok(())
    }

    /// Owned text of string-family payloads.
    fn owned_text(&self) -> Option<String> {
        match &self.payload {
            Payload::Str(s) => Some(s.clone()),
            Payload::Char(c) => Some(c.to_string()),
            _ => None,
        }
    }

    /// Match this value's text against `pattern`'s compiled regex.
    pub fn is_like(&self, pattern: &FilterValue) -> bool {
        let Some(regex) = &pattern.pattern else {
            return false;
        };
        match &self.payload {
            Payload::Str(s) => regex.is_match(s),
            Payload::Char(c) => {
                let mut buf = [0u8; 4];
                regex.is_match(c.encode_utf8(&mut buf))
            }
            _ => false,
        }
    }

    /// Three-way comparison with single-direction promotion.
    ///
    /// When the left kind ranks below the right one, the comparison recurses
    /// with the operands swapped and the result reversed, so only one
    /// promotion direction is ever implemented.
    pub fn compare(&self, other: &FilterValue) -> Ordering {
        let (a, b) = (&self.payload, &other.payload);
        assert!(
            a.family() == b.family(),
            "cross-family comparison must be rejected at filter build time"
        );
        if a.rank() < b.rank() {
            return other.compare(self).reverse();
        }

        match (a, b) {
            (Payload::Bool(x), Payload::Bool(y)) => x.cmp(y),
            (Payload::Char(x), Payload::Char(y)) => x.cmp(y),
            (Payload::Str(x), Payload::Str(y)) => x.as_str().cmp(y.as_str()),
            (Payload::Str(x), Payload::Char(y)) => {
                let mut buf = [0u8; 4];
                x.as_str().cmp(&*y.encode_utf8(&mut buf))
            }
            (Payload::Float(_), _) | (_, Payload::Float(_)) => {
                a.as_f64().total_cmp(&b.as_f64())
            }
            (Payload::UnsignedInt(x), Payload::UnsignedInt(y)) => x.cmp(y),
            (Payload::UnsignedInt(x), y) => {
                // Sign first: a negative signed value is below any unsigned.
                let y = y.as_i64();
                if y < 0 {
                    Ordering::Greater
                } else {
                    x.cmp(&(y as u64))
                }
            }
            _ => a.as_i64().cmp(&b.as_i64()),
        }
    }
}

/// Translate a SQL LIKE pattern into an anchored regex.
///
/// `%` and `*` become `.*`; `_` and `?` become `.`; every other character
/// matches itself (regex metacharacters are escaped).
fn like_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push_str("^(?:");
    for ch in pattern.chars() {
        match ch {
            '%' | '*' => out.push_str(".*"),
            '_' | '?' => out.push('.'),
            '.' | '^' | '$' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            c => out.push(c),
        }
    }
    out.push_str(")$");
    out
}
