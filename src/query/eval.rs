//! # Document Evaluation
//!
//! Evaluates a [`FilterProgram`] against JSON documents in process. The
//! in-memory storage backend uses this; the SQLite backend renders the same
//! semantics to SQL.
//!
//! Field values are compared through their text form: strings as-is,
//! numbers via their JSON rendering, booleans as `true`/`false`. Objects,
//! arrays, `null` and missing fields never match a comparison.

use std::cmp::Ordering;

use serde_json::Value;

use super::ast::{Comparison, FieldPath, FilterProgram, Predicate, Relation, SortDirection};

/// Resolve a dotted path inside a document
pub fn lookup<'a>(doc: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(doc, |current, segment| current.get(segment))
}

/// Check if a document matches the predicate
pub fn matches(predicate: &Predicate, doc: &Value) -> bool {
    match predicate {
        Predicate::All => true,
        Predicate::Compare(cmp) => matches_comparison(cmp, doc),
        Predicate::And(left, right) => matches(left, doc) && matches(right, doc),
        Predicate::Or(left, right) => matches(left, doc) || matches(right, doc),
        Predicate::AndNot(left, right) => matches(left, doc) && !matches(right, doc),
    }
}

fn text_form(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn matches_comparison(cmp: &Comparison, doc: &Value) -> bool {
    let field_value = match lookup(doc, &cmp.field) {
        Some(v) => v,
        None => return false,
    };
    let text = match text_form(field_value) {
        Some(t) => t,
        None => return false,
    };

    match cmp.relation {
        Relation::Contains => contains_words(&text, &cmp.value),
        Relation::Exact => wildcard_match(&text, &cmp.value),
        Relation::NotEqual => text != cmp.value,
        relation => match compare_for_relation(field_value, cmp) {
            Some(ordering) => match relation {
                Relation::Less => ordering == Ordering::Less,
                Relation::LessOrEqual => ordering != Ordering::Greater,
                Relation::Greater => ordering == Ordering::Greater,
                Relation::GreaterOrEqual => ordering != Ordering::Less,
                _ => false,
            },
            None => false,
        },
    }
}

/// Numbers compare numerically against numeric values, strings compare
/// bytewise against non-numeric values; mixed kinds do not compare.
fn compare_for_relation(field_value: &Value, cmp: &Comparison) -> Option<Ordering> {
    match (field_value, cmp.numeric_value()) {
        (Value::Number(n), Some(target)) => n.as_f64()?.partial_cmp(&target),
        (Value::String(s), None) => Some(s.as_str().cmp(cmp.value.as_str())),
        _ => None,
    }
}

/// `=` semantics: every space-separated term of `value` occurs in `text`
/// bounded by spaces, ASCII case-insensitive. An empty value matches any
/// present field. Mirrors `' ' || text || ' ' LIKE '% term %'`.
fn contains_words(text: &str, value: &str) -> bool {
    let padded = format!(" {} ", text.to_ascii_lowercase());
    value
        .to_ascii_lowercase()
        .split(' ')
        .filter(|term| !term.is_empty())
        .all(|term| wildcard_match(&padded, &format!("* {} *", term)))
}

/// Match with `*` as "any sequence of characters"
pub fn wildcard_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    let (mut t, mut p) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some((star_p, star_t)) = star {
            p = star_p + 1;
            t = star_t + 1;
            star = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

/// Sort key for one field, ordered the way SQLite orders `json_extract`
/// results: nulls, then numbers (booleans as 0/1), then text.
#[derive(Debug, Clone, PartialEq)]
enum SortValue {
    Null,
    Number(f64),
    Text(String),
}

impl SortValue {
    fn of(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => SortValue::Null,
            Some(Value::Bool(b)) => SortValue::Number(if *b { 1.0 } else { 0.0 }),
            Some(Value::Number(n)) => SortValue::Number(n.as_f64().unwrap_or(0.0)),
            Some(Value::String(s)) => SortValue::Text(s.clone()),
            Some(other) => SortValue::Text(other.to_string()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortValue::Null => 0,
            SortValue::Number(_) => 1,
            SortValue::Text(_) => 2,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Compare two documents by the program's sort keys
pub fn compare_documents(program: &FilterProgram, a: &Value, b: &Value) -> Ordering {
    for key in &program.sort {
        let va = SortValue::of(lookup(a, &key.field));
        let vb = SortValue::of(lookup(b, &key.field));
        let cmp = va.compare(&vb);
        let cmp = match key.direction {
            SortDirection::Ascending => cmp,
            SortDirection::Descending => cmp.reverse(),
        };
        if cmp != Ordering::Equal {
            return cmp;
        }
    }
    Ordering::Equal
}
