//! Replacement rules for date-period literals.
//!
//! Every configurable default value in the layout resource is stored inside
//! an escaped value-literal envelope:
//!
//! ```text
//! {\"Value\":\"2022L\"}     year (bare number, type-marker suffix)
//! {\"Value\":\"'Jan'\"}     month (single-quoted string)
//! {\"Value\":\"'Q1'\"}      quarter (single-quoted string)
//! ```
//!
//! Rules match only within this envelope, so a bare `Jan` in a display label
//! is never touched. The single quotes are part of the literal: they mark the
//! value as a string in the report's expression language.

use std::borrow::Cow;

use regex::Regex;

use crate::period::ResolvedPeriod;
use crate::Result;

/// Textual form of a value literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// Single-quoted string token (`'Jan'`, `'Q1'`).
    Quoted,
    /// Bare number, optionally with a type-marker suffix (`2022`, `2022L`).
    Bare,
}

/// Wraps an inner pattern in the escaped value-literal envelope.
///
/// The result is a regex source string; `inner` may contain regex syntax.
fn envelope_pattern(inner: &str) -> String {
    format!(r#"\\"Value\\":\\"{inner}\\""#)
}

/// Builds the literal replacement text for a value, envelope included.
fn envelope_literal(inner: &str) -> String {
    format!(r#"\"Value\":\"{inner}\""#)
}

/// One search-and-replace rule, matching a single literal form.
#[derive(Debug, Clone)]
pub struct ReplacementRule {
    pattern: Regex,
    replacement: String,
    kind: LiteralKind,
    label: &'static str,
}

impl ReplacementRule {
    fn new(
        inner_pattern: &str,
        inner_replacement: &str,
        kind: LiteralKind,
        label: &'static str,
    ) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(&envelope_pattern(inner_pattern))?,
            replacement: envelope_literal(inner_replacement),
            kind,
            label,
        })
    }

    /// The literal form this rule targets.
    pub fn kind(&self) -> LiteralKind {
        self.kind
    }

    /// A short name for logs and summaries.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// The full search pattern, envelope included.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// The full replacement text, envelope included.
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Applies the rule, returning the new text and the match count.
    ///
    /// Zero matches is a no-op, not an error: the literal may simply not
    /// occur in a given report.
    pub fn apply<'t>(&self, text: &'t str) -> (Cow<'t, str>, usize) {
        let matches = self.pattern.find_iter(text).count();
        if matches == 0 {
            return (Cow::Borrowed(text), 0);
        }
        (self.pattern.replace_all(text, self.replacement.as_str()), matches)
    }
}

/// The ordered rule list for one resolved period.
///
/// All rules are applied unconditionally and in order. Replacement values
/// never feed later rules: month and quarter substitutions cannot produce a
/// year literal, and the year rules search for the *old* year only.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<ReplacementRule>,
}

impl RuleSet {
    /// Builds the rule list for a resolved period.
    pub fn for_period(resolved: &ResolvedPeriod) -> Result<Self> {
        let target = resolved.target;
        let old_year = resolved.old_year;

        let rules = vec![
            ReplacementRule::new(
                "'(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)'",
                &format!("'{}'", target.month_abbr()),
                LiteralKind::Quoted,
                "month-en",
            )?,
            ReplacementRule::new(
                r"'\d{1,2}月'",
                &format!("'{}月'", target.month()),
                LiteralKind::Quoted,
                "month-cn",
            )?,
            ReplacementRule::new(
                "'Q [1-4]'",
                &format!("'Q {}'", target.quarter()),
                LiteralKind::Quoted,
                "quarter-en-spaced",
            )?,
            ReplacementRule::new(
                "'Q[1-4]'",
                &format!("'Q{}'", target.quarter()),
                LiteralKind::Quoted,
                "quarter-en",
            )?,
            ReplacementRule::new(
                "'[1-4]季度'",
                &format!("'{}季度'", target.quarter()),
                LiteralKind::Quoted,
                "quarter-cn",
            )?,
            // The closing envelope escape keeps the bare form from matching a
            // prefix of the L-suffixed form, so these two stay disjoint.
            ReplacementRule::new(
                &old_year.to_string(),
                &target.year().to_string(),
                LiteralKind::Bare,
                "year",
            )?,
            ReplacementRule::new(
                &format!("{old_year}L"),
                &format!("{}L", target.year()),
                LiteralKind::Bare,
                "year-typed",
            )?,
        ];

        Ok(Self { rules })
    }

    /// The rules in application order.
    pub fn rules(&self) -> &[ReplacementRule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the rule list is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
