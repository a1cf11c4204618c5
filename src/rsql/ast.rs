//! Filter AST
//!
//! Nodes are immutable once built. Constructors enforce operator arity,
//! the two-operand minimum for logical nodes, and a hard nesting ceiling so
//! that every tree handed to the compiler or evaluator has bounded depth.

use std::fmt;

use super::errors::{CompileError, CompileResult};
use super::operators::OperatorKind;

/// Hard ceiling on logical node nesting
pub const MAX_NESTING_DEPTH: usize = 256;

/// Logical combinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `;`
    And,
    /// `,`
    Or,
}

impl Combinator {
    /// RSQL symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Combinator::And => ";",
            Combinator::Or => ",",
        }
    }

    /// SQL joiner placed between compiled children
    pub fn sql_joiner(&self) -> &'static str {
        match self {
            Combinator::And => " AND ",
            Combinator::Or => " OR ",
        }
    }
}

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Logical(LogicalNode),
    Comparison(ComparisonNode),
}

impl Node {
    /// Builds an AND node
    pub fn and(children: Vec<Node>) -> CompileResult<Self> {
        LogicalNode::new(Combinator::And, children).map(Node::Logical)
    }

    /// Builds an OR node
    pub fn or(children: Vec<Node>) -> CompileResult<Self> {
        LogicalNode::new(Combinator::Or, children).map(Node::Logical)
    }

    /// Builds a comparison node
    pub fn comparison(
        selector: impl Into<String>,
        operator: OperatorKind,
        arguments: Vec<String>,
    ) -> CompileResult<Self> {
        ComparisonNode::new(selector, operator, arguments).map(Node::Comparison)
    }

    /// Logical nesting depth (comparisons are depth 0)
    pub fn depth(&self) -> usize {
        match self {
            Node::Logical(l) => l.depth,
            Node::Comparison(_) => 0,
        }
    }

    /// Visits every comparison in left-to-right order
    pub fn comparisons(&self) -> Vec<&ComparisonNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Node::Comparison(c) => out.push(c),
                Node::Logical(l) => stack.extend(l.children.iter().rev()),
            }
        }
        out
    }
}

impl From<ComparisonNode> for Node {
    fn from(node: ComparisonNode) -> Self {
        Node::Comparison(node)
    }
}

impl From<LogicalNode> for Node {
    fn from(node: LogicalNode) -> Self {
        Node::Logical(node)
    }
}

/// AND / OR over two or more children
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalNode {
    combinator: Combinator,
    children: Vec<Node>,
    depth: usize,
}

impl LogicalNode {
    pub fn new(combinator: Combinator, children: Vec<Node>) -> CompileResult<Self> {
        if children.len() < 2 {
            return Err(CompileError::logical_arity(
                combinator.symbol(),
                children.len(),
            ));
        }

        let depth = 1 + children.iter().map(Node::depth).max().unwrap_or(0);
        if depth > MAX_NESTING_DEPTH {
            return Err(CompileError::nesting_too_deep(MAX_NESTING_DEPTH, None));
        }

        Ok(Self {
            combinator,
            children,
            depth,
        })
    }

    pub fn combinator(&self) -> Combinator {
        self.combinator
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }
}

/// `selector operator arguments`
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonNode {
    selector: String,
    operator: OperatorKind,
    arguments: Vec<String>,
}

impl ComparisonNode {
    pub fn new(
        selector: impl Into<String>,
        operator: OperatorKind,
        arguments: Vec<String>,
    ) -> CompileResult<Self> {
        let selector = selector.into();
        if selector.is_empty() {
            return Err(CompileError::syntax("Empty selector", "", None));
        }
        if !operator.arity().accepts(arguments.len()) {
            return Err(CompileError::arity(operator, arguments.len()));
        }

        Ok(Self {
            selector,
            operator,
            arguments,
        })
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn operator(&self) -> OperatorKind {
        self.operator
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// The single argument of a scalar operator
    pub fn argument(&self) -> &str {
        self.arguments.first().map(String::as_str).unwrap_or_default()
    }
}

/// Characters that end an unquoted RSQL value
pub(crate) fn is_reserved(c: char) -> bool {
    matches!(
        c,
        '"' | '\'' | '(' | ')' | ';' | ',' | '=' | '!' | '~' | '<' | '>'
    ) || c.is_whitespace()
}

fn write_argument(f: &mut fmt::Formatter<'_>, arg: &str) -> fmt::Result {
    if !arg.is_empty() && !arg.chars().any(is_reserved) {
        return write!(f, "{}", arg);
    }
    f.write_str("\"")?;
    for c in arg.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

/// Canonical RSQL rendering. Nested logical children are always
/// parenthesized, so parsing the output reproduces the same tree.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Comparison(c) => write!(f, "{}", c),
            Node::Logical(l) => {
                for (i, child) in l.children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(l.combinator.symbol())?;
                    }
                    match child {
                        Node::Logical(_) => write!(f, "({})", child)?,
                        Node::Comparison(c) => write!(f, "{}", c)?,
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ComparisonNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.selector, self.operator.symbol())?;
        if self.operator.is_multi_value() {
            f.write_str("(")?;
            for (i, arg) in self.arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write_argument(f, arg)?;
            }
            f.write_str(")")
        } else {
            write_argument(f, self.argument())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsql::errors::CompileErrorCode;

    fn eq(field: &str, value: &str) -> Node {
        Node::comparison(field, OperatorKind::Eq, vec![value.to_string()]).unwrap()
    }

    #[test]
    fn test_comparison_arity_enforced() {
        let err = ComparisonNode::new("name", OperatorKind::Eq, vec![]).unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::Arity);

        let err = ComparisonNode::new(
            "name",
            OperatorKind::Like,
            vec!["a".into(), "b".into()],
        )
        .unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::Arity);

        assert!(ComparisonNode::new(
            "region",
            OperatorKind::In,
            vec!["a".into(), "b".into(), "c".into()]
        )
        .is_ok());
    }

    #[test]
    fn test_logical_requires_two_children() {
        let err = Node::and(vec![eq("a", "1")]).unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::Arity);
        assert!(Node::or(vec![]).is_err());
    }

    #[test]
    fn test_depth_tracking() {
        let inner = Node::and(vec![eq("a", "1"), eq("b", "2")]).unwrap();
        assert_eq!(inner.depth(), 1);
        let outer = Node::or(vec![inner, eq("c", "3")]).unwrap();
        assert_eq!(outer.depth(), 2);
    }

    #[test]
    fn test_depth_ceiling() {
        let mut node = eq("a", "0");
        for i in 0..MAX_NESTING_DEPTH {
            node = Node::and(vec![node, eq("a", &i.to_string())]).unwrap();
        }
        let err = Node::or(vec![node, eq("b", "1")]).unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::NestingTooDeep);
    }

    #[test]
    fn test_comparisons_in_order() {
        let node = Node::or(vec![
            Node::and(vec![eq("a", "1"), eq("b", "2")]).unwrap(),
            eq("c", "3"),
        ])
        .unwrap();
        let comparisons = node.comparisons();
        let selectors: Vec<&str> = comparisons.iter().map(|c| c.selector()).collect();
        assert_eq!(selectors, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_display_canonical() {
        let node = Node::or(vec![
            Node::and(vec![eq("a", "1"), eq("b", "two words")]).unwrap(),
            Node::comparison(
                "region",
                OperatorKind::In,
                vec!["Beijing".into(), "Hong Kong".into()],
            )
            .unwrap(),
        ])
        .unwrap();
        assert_eq!(
            node.to_string(),
            "(a==1;b==\"two words\"),region=in=(Beijing,\"Hong Kong\")"
        );
    }
}
