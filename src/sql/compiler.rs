//! AST to parameterized SQL
//!
//! Walks a filter AST against a `FieldSchema` and emits a WHERE fragment.
//! Field names reach the output only after an allowlist hit, and only in
//! quoted form; every argument becomes a `?` placeholder.
//!
//! The walk uses an explicit stack, so output size, not nesting, bounds the
//! work done here.

use crate::rsql::{CompileError, CompileResult, ComparisonNode, Node, OperatorKind};
use crate::schema::{FieldKind, FieldSchema};

use super::dialect::Dialect;
use super::predicate::{CoercionWarning, CompiledPredicate, SqlParam};

/// Compiles `ast` for `schema` using the default dialect.
///
/// `None` (empty filter) compiles to the match-all predicate.
pub fn compile(ast: Option<&Node>, schema: &FieldSchema) -> CompileResult<CompiledPredicate> {
    compile_with_dialect(ast, schema, Dialect::default())
}

/// Compiles `ast` for `schema`, quoting identifiers for `dialect`
pub fn compile_with_dialect(
    ast: Option<&Node>,
    schema: &FieldSchema,
    dialect: Dialect,
) -> CompileResult<CompiledPredicate> {
    match ast {
        None => Ok(CompiledPredicate::match_all()),
        Some(root) => PredicateBuilder::new(schema, dialect).build(root),
    }
}

enum Frame<'n> {
    /// Compile this node
    Visit(&'n Node),
    /// Pop `count` fragments and join them
    Join { joiner: &'static str, count: usize },
}

struct PredicateBuilder<'s> {
    schema: &'s FieldSchema,
    dialect: Dialect,
    parameters: Vec<SqlParam>,
    warnings: Vec<CoercionWarning>,
}

impl<'s> PredicateBuilder<'s> {
    fn new(schema: &'s FieldSchema, dialect: Dialect) -> Self {
        Self {
            schema,
            dialect,
            parameters: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn build(mut self, root: &Node) -> CompileResult<CompiledPredicate> {
        let mut frames = vec![Frame::Visit(root)];
        let mut fragments: Vec<String> = Vec::new();

        while let Some(frame) = frames.pop() {
            match frame {
                Frame::Visit(Node::Comparison(comparison)) => {
                    fragments.push(self.emit_comparison(comparison)?);
                }
                Frame::Visit(Node::Logical(logical)) => {
                    let children = logical.children();
                    frames.push(Frame::Join {
                        joiner: logical.combinator().sql_joiner(),
                        count: children.len(),
                    });
                    // Reversed so the leftmost child is compiled first and
                    // parameters stay in placeholder order
                    frames.extend(children.iter().rev().map(Frame::Visit));
                }
                Frame::Join { joiner, count } => {
                    let start = fragments.len().saturating_sub(count);
                    let joined = fragments.split_off(start).join(joiner);
                    fragments.push(format!("({})", joined));
                }
            }
        }

        let where_fragment = fragments.pop().unwrap_or_default();
        Ok(CompiledPredicate::new(
            where_fragment,
            self.parameters,
            self.warnings,
        ))
    }

    fn emit_comparison(&mut self, comparison: &ComparisonNode) -> CompileResult<String> {
        let field = comparison.selector();
        let kind = self
            .schema
            .kind(field)
            .ok_or_else(|| CompileError::unknown_field(field))?;

        let operator = comparison.operator();
        let column = self.dialect.quote_ident(field);

        let sql = match operator {
            OperatorKind::IsNull => {
                if comparison.argument().eq_ignore_ascii_case("true") {
                    format!("{} IS NULL", column)
                } else {
                    format!("{} IS NOT NULL", column)
                }
            }
            OperatorKind::In => self.emit_list(field, kind, &column, "IN", comparison.arguments()),
            OperatorKind::NotIn => {
                self.emit_list(field, kind, &column, "NOT IN", comparison.arguments())
            }
            OperatorKind::Like => self.emit_like(&column, "LIKE", comparison.argument()),
            OperatorKind::NotLike => self.emit_like(&column, "NOT LIKE", comparison.argument()),
            OperatorKind::Eq => self.emit_binary(field, kind, &column, "=", comparison.argument()),
            OperatorKind::NotEq => {
                self.emit_binary(field, kind, &column, "!=", comparison.argument())
            }
            OperatorKind::Gt => self.emit_binary(field, kind, &column, ">", comparison.argument()),
            OperatorKind::Ge => {
                self.emit_binary(field, kind, &column, ">=", comparison.argument())
            }
            OperatorKind::Lt => self.emit_binary(field, kind, &column, "<", comparison.argument()),
            OperatorKind::Le => {
                self.emit_binary(field, kind, &column, "<=", comparison.argument())
            }
        };

        Ok(sql)
    }

    fn emit_binary(
        &mut self,
        field: &str,
        kind: FieldKind,
        column: &str,
        symbol: &str,
        raw: &str,
    ) -> String {
        let param = self.coerce(field, kind, raw);
        self.parameters.push(param);
        format!("{} {} ?", column, symbol)
    }

    fn emit_list(
        &mut self,
        field: &str,
        kind: FieldKind,
        column: &str,
        keyword: &str,
        arguments: &[String],
    ) -> String {
        let placeholders = vec!["?"; arguments.len()].join(", ");
        for raw in arguments {
            let param = self.coerce(field, kind, raw);
            self.parameters.push(param);
        }
        format!("{} {} ({})", column, keyword, placeholders)
    }

    /// LIKE patterns bind as text whatever the field kind
    fn emit_like(&mut self, column: &str, keyword: &str, raw: &str) -> String {
        self.parameters.push(SqlParam::Text(raw.replace('*', "%")));
        format!("{} {} ?", column, keyword)
    }

    fn coerce(&mut self, field: &str, kind: FieldKind, raw: &str) -> SqlParam {
        match coerce(kind, raw) {
            Some(param) => param,
            None => {
                self.warnings.push(CoercionWarning {
                    field: field.to_string(),
                    value: raw.to_string(),
                });
                SqlParam::Text(raw.to_string())
            }
        }
    }
}

/// Coerces a literal for a field kind.
///
/// Returns `None` when a numeric field gets a value that is neither an
/// integer nor a finite float.
pub(crate) fn coerce(kind: FieldKind, raw: &str) -> Option<SqlParam> {
    match kind {
        FieldKind::Text => Some(SqlParam::Text(raw.to_string())),
        FieldKind::Numeric => {
            if let Ok(n) = raw.parse::<i64>() {
                return Some(SqlParam::Integer(n));
            }
            match raw.parse::<f64>() {
                Ok(x) if x.is_finite() => Some(SqlParam::Float(x)),
                _ => None,
            }
        }
    }
}
