//! In-memory evaluation of filter ASTs against JSON rows
//!
//! Mirrors the SQL the compiler emits: a missing or null column fails every
//! comparison except `=isnull=`, numbers compare numerically when the
//! argument parses as a number, LIKE uses `%` / `_` after the `*`
//! translation. String comparison is byte-wise; collation is the store's
//! business, not ours.

use std::cmp::Ordering;

use serde_json::Value;

use super::ast::{Combinator, ComparisonNode, Node};
use super::operators::OperatorKind;

impl Node {
    /// Returns true if `row` satisfies this expression
    pub fn matches(&self, row: &Value) -> bool {
        match self {
            Node::Comparison(c) => c.matches(row),
            Node::Logical(l) => match l.combinator() {
                Combinator::And => l.children().iter().all(|child| child.matches(row)),
                Combinator::Or => l.children().iter().any(|child| child.matches(row)),
            },
        }
    }
}

impl ComparisonNode {
    /// Returns true if `row` satisfies this comparison
    pub fn matches(&self, row: &Value) -> bool {
        let field_value = row.get(self.selector()).filter(|v| !v.is_null());

        if self.operator() == OperatorKind::IsNull {
            let want_null = self.argument().eq_ignore_ascii_case("true");
            return want_null == field_value.is_none();
        }

        let field_value = match field_value {
            Some(v) => v,
            None => return false,
        };

        match self.operator() {
            OperatorKind::Eq => compare(field_value, self.argument()) == Some(Ordering::Equal),
            OperatorKind::NotEq => matches!(
                compare(field_value, self.argument()),
                Some(Ordering::Less | Ordering::Greater)
            ),
            OperatorKind::Gt => compare(field_value, self.argument()) == Some(Ordering::Greater),
            OperatorKind::Ge => matches!(
                compare(field_value, self.argument()),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            OperatorKind::Lt => compare(field_value, self.argument()) == Some(Ordering::Less),
            OperatorKind::Le => matches!(
                compare(field_value, self.argument()),
                Some(Ordering::Less | Ordering::Equal)
            ),
            OperatorKind::In => self
                .arguments()
                .iter()
                .any(|arg| compare(field_value, arg) == Some(Ordering::Equal)),
            OperatorKind::NotIn => self
                .arguments()
                .iter()
                .all(|arg| matches!(compare(field_value, arg), Some(o) if o != Ordering::Equal)),
            OperatorKind::Like | OperatorKind::NotLike => {
                let text = match scalar_text(field_value) {
                    Some(t) => t,
                    None => return false,
                };
                let pattern = self.argument().replace('*', "%");
                let hit = like_match(&text, &pattern);
                if self.operator() == OperatorKind::Like {
                    hit
                } else {
                    !hit
                }
            }
            OperatorKind::IsNull => false,
        }
    }
}

/// Compares a column value against a literal argument
fn compare(actual: &Value, arg: &str) -> Option<Ordering> {
    match actual {
        Value::Number(n) => {
            let a = n.as_f64()?;
            let b = arg.parse::<f64>().ok()?;
            a.partial_cmp(&b)
        }
        Value::String(s) => Some(s.as_str().cmp(arg)),
        Value::Bool(b) => Some((if *b { "true" } else { "false" }).cmp(arg)),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// SQL LIKE matching: `%` is any run, `_` is exactly one character
fn like_match(value: &str, pattern: &str) -> bool {
    let value: Vec<char> = value.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    let (mut v, mut p) = (0, 0);
    // Position of the last `%` seen and the value index it was tried against
    let mut backtrack: Option<(usize, usize)> = None;

    while v < value.len() {
        if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, v));
            p += 1;
        } else if p < pattern.len() && (pattern[p] == '_' || pattern[p] == value[v]) {
            v += 1;
            p += 1;
        } else if let Some((star_p, star_v)) = backtrack {
            p = star_p + 1;
            v = star_v + 1;
            backtrack = Some((star_p, star_v + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|c| *c == '%')
}
