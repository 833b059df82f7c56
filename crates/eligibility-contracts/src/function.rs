//! The eligibility expression model.
//!
//! An `EligibilityFunction` is a rule applied to an ordered list of
//! parameters. A parameter is either a raw token (for leaf rules) or a nested
//! function (for composite rules). Trees are built once when a trial is loaded
//! and never mutated afterwards.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rule::EligibilityRule;

/// One positional argument of an `EligibilityFunction`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FunctionParameter {
    Token(String),
    Function(EligibilityFunction),
}

impl FunctionParameter {
    pub fn as_token(&self) -> Option<&str> {
        match self {
            FunctionParameter::Token(token) => Some(token),
            FunctionParameter::Function(_) => None,
        }
    }

    pub fn as_function(&self) -> Option<&EligibilityFunction> {
        match self {
            FunctionParameter::Function(function) => Some(function),
            FunctionParameter::Token(_) => None,
        }
    }
}

impl From<&str> for FunctionParameter {
    fn from(token: &str) -> Self {
        FunctionParameter::Token(token.to_string())
    }
}

impl From<String> for FunctionParameter {
    fn from(token: String) -> Self {
        FunctionParameter::Token(token)
    }
}

impl From<EligibilityFunction> for FunctionParameter {
    fn from(function: EligibilityFunction) -> Self {
        FunctionParameter::Function(function)
    }
}

/// A rule applied to its parameters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EligibilityFunction {
    pub rule: EligibilityRule,
    #[serde(default)]
    pub parameters: Vec<FunctionParameter>,
}

impl EligibilityFunction {
    pub fn new(rule: EligibilityRule, parameters: Vec<FunctionParameter>) -> Self {
        Self { rule, parameters }
    }

    /// A leaf function over raw tokens.
    pub fn leaf<I, S>(rule: EligibilityRule, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rule,
            parameters: tokens.into_iter().map(|t| FunctionParameter::Token(t.into())).collect(),
        }
    }

    /// A composite function over nested functions.
    pub fn composite(rule: EligibilityRule, children: Vec<EligibilityFunction>) -> Self {
        Self {
            rule,
            parameters: children.into_iter().map(FunctionParameter::Function).collect(),
        }
    }

    /// Depth-first walk over this function and all nested functions.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a EligibilityFunction)) {
        visit(self);
        for parameter in &self.parameters {
            if let FunctionParameter::Function(child) = parameter {
                child.walk(visit);
            }
        }
    }

    /// Every rule used anywhere in the tree.
    pub fn rules(&self) -> BTreeSet<EligibilityRule> {
        let mut rules = BTreeSet::new();
        self.walk(&mut |f| {
            rules.insert(f.rule);
        });
        rules
    }
}

fn needs_quoting(token: &str) -> bool {
    token.is_empty() || token.contains([',', '(', ')', '"']) || token.trim() != token
}

impl fmt::Display for FunctionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionParameter::Function(function) => write!(f, "{function}"),
            FunctionParameter::Token(token) if needs_quoting(token) => {
                write!(f, "\"{}\"", token.replace('"', "\"\""))
            }
            FunctionParameter::Token(token) => f.write_str(token),
        }
    }
}

/// Renders `RULE` or `RULE(p1, p2)`; nested functions recursively.
impl fmt::Display for EligibilityFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rule.name())?;
        if self.parameters.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (index, parameter) in self.parameters.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{parameter}")?;
        }
        f.write_str(")")
    }
}

// ── Criterion references ─────────────────────────────────────────────────────

/// Pointer into the trial protocol text, e.g. `I-3` / "Age >= 18 years".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CriterionReference {
    pub id: String,
    pub text: String,
}

impl CriterionReference {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

impl Ord for CriterionReference {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_numeric_aware(&self.id, &other.id)
            .then_with(|| self.id.cmp(&other.id))
            .then_with(|| self.text.cmp(&other.text))
    }
}

impl PartialOrd for CriterionReference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compares digit runs by value and everything else by character.
pub fn compare_numeric_aware(left: &str, right: &str) -> Ordering {
    let mut a = left.chars().peekable();
    let mut b = right.chars().peekable();
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let left_run = take_digits(&mut a);
                let right_run = take_digits(&mut b);
                let ordering = compare_digit_runs(&left_run, &right_run);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        run.push(c);
        chars.next();
    }
    run
}

fn compare_digit_runs(left: &str, right: &str) -> Ordering {
    let left = left.trim_start_matches('0');
    let right = right.trim_start_matches('0');
    left.len().cmp(&right.len()).then_with(|| left.cmp(right))
}

/// A function together with the protocol criteria it encodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub references: BTreeSet<CriterionReference>,
    pub function: EligibilityFunction,
}

impl Eligibility {
    pub fn new(function: EligibilityFunction, references: Vec<CriterionReference>) -> Self {
        Self { references: references.into_iter().collect(), function }
    }
}
