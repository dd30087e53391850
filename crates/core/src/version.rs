// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maven-style version ordering.
//!
//! Versions are split into numeric and alphabetic items on `.`, `-`, and
//! digit/letter transitions. Numeric items compare numerically, well-known
//! qualifiers compare by rank, and trailing "null" items (`0`, `ga`,
//! `final`, `release`) are ignored so `1`, `1.0`, and `1.0.0` are equal.
//! The same holds before each `-`, so `1.0-rc1` equals `1.0.0-rc1`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Qualifiers that sort before a plain release, in ascending order.
const PRE_RELEASE: [&str; 5] = ["alpha", "beta", "milestone", "rc", "snapshot"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    /// Decimal digits with leading zeros stripped ("" is zero).
    Int(String),
    Qualifier(String),
}

impl Item {
    fn is_null(&self) -> bool {
        match self {
            Item::Int(digits) => digits.is_empty(),
            Item::Qualifier(q) => q.is_empty(),
        }
    }

    fn qualifier(raw: &str) -> Self {
        let lower = raw.to_ascii_lowercase();
        let canonical = match lower.as_str() {
            "a" => "alpha",
            "b" => "beta",
            "m" => "milestone",
            "cr" => "rc",
            "ga" | "final" | "release" => "",
            other => other,
        };
        Item::Qualifier(canonical.to_string())
    }

    fn int(raw: &str) -> Self {
        Item::Int(raw.trim_start_matches('0').to_string())
    }
}

/// Rank of a qualifier relative to a release (""), which ranks at
/// `PRE_RELEASE.len()`. `sp` sits just above release; unknown qualifiers
/// rank above `sp` and fall back to lexical comparison among themselves.
fn qualifier_rank(q: &str) -> usize {
    if let Some(pos) = PRE_RELEASE.iter().position(|p| *p == q) {
        return pos;
    }
    match q {
        "" => PRE_RELEASE.len(),
        "sp" => PRE_RELEASE.len() + 1,
        _ => PRE_RELEASE.len() + 2,
    }
}

fn compare_items(a: Option<&Item>, b: Option<&Item>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (Some(a), None) => compare_with_null(a),
        (None, Some(b)) => compare_with_null(b).reverse(),
        (Some(Item::Int(a)), Some(Item::Int(b))) => {
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        }
        (Some(Item::Int(_)), Some(Item::Qualifier(_))) => Ordering::Greater,
        (Some(Item::Qualifier(_)), Some(Item::Int(_))) => Ordering::Less,
        (Some(Item::Qualifier(a)), Some(Item::Qualifier(b))) => {
            qualifier_rank(a).cmp(&qualifier_rank(b)).then_with(|| a.cmp(b))
        }
    }
}

fn compare_with_null(item: &Item) -> Ordering {
    match item {
        Item::Int(digits) if digits.is_empty() => Ordering::Equal,
        Item::Int(_) => Ordering::Greater,
        Item::Qualifier(q) => qualifier_rank(q).cmp(&qualifier_rank("")),
    }
}

fn parse_items(raw: &str) -> Vec<Item> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_digits = false;

    let flush = |current: &mut String, in_digits: bool, items: &mut Vec<Item>| {
        if current.is_empty() {
            return;
        }
        items.push(if in_digits { Item::int(current) } else { Item::qualifier(current) });
        current.clear();
    };

    // items since the last `-`
    let mut group_start = 0;
    for c in raw.trim().chars() {
        if c == '-' {
            flush(&mut current, in_digits, &mut items);
            strip_nulls(&mut items, group_start);
            group_start = items.len();
            continue;
        }
        if c == '.' || c == '_' || c == '+' {
            flush(&mut current, in_digits, &mut items);
            continue;
        }
        let digit = c.is_ascii_digit();
        if !current.is_empty() && digit != in_digits {
            flush(&mut current, in_digits, &mut items);
        }
        in_digits = digit;
        current.push(c);
    }
    flush(&mut current, in_digits, &mut items);
    strip_nulls(&mut items, 0);
    items
}

/// Drop trailing null items, keeping everything before `floor`.
fn strip_nulls(items: &mut Vec<Item>, floor: usize) {
    while items.len() > floor && items.last().is_some_and(Item::is_null) {
        items.pop();
    }
}

/// A version string with Maven ordering semantics.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct MavenVersion {
    raw: String,
    items: Vec<Item>,
}

impl MavenVersion {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let items = parse_items(&raw);
        Self { raw, items }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl From<String> for MavenVersion {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for MavenVersion {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<MavenVersion> for String {
    fn from(v: MavenVersion) -> Self {
        v.raw
    }
}

impl fmt::Debug for MavenVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MavenVersion({})", self.raw)
    }
}

impl fmt::Display for MavenVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Ord for MavenVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.items.len().max(other.items.len());
        for i in 0..len {
            let ord = compare_items(self.items.get(i), other.items.get(i));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for MavenVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for MavenVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MavenVersion {}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
