//! RSQL filter language
//!
//! A restricted RSQL dialect for list filters.
//!
//! # Syntax
//!
//! ```text
//! name==John
//! name==John;age=gt=25                 (AND)
//! category==tech,category==science     (OR)
//! (a==1,b==2);c==3                     (grouping)
//! region=in=(Beijing,"Hong Kong")
//! title=like=*rust*
//! email=isnull=true
//! ```
//!
//! # Operators
//!
//! | Token | Alias | Meaning |
//! |-------|-------|---------|
//! | `==` | | Equal |
//! | `!=` | | Not equal |
//! | `=gt=` | `>` | Greater than |
//! | `=ge=` | `>=` | Greater or equal |
//! | `=lt=` | `<` | Less than |
//! | `=le=` | `<=` | Less or equal |
//! | `=in=` | | Member of list |
//! | `=out=` | | Not a member of list |
//! | `=like=` | | Pattern match, `*` wildcard |
//! | `=notlike=` | | Negated pattern match |
//! | `=isnull=` | | `true` for IS NULL, anything else IS NOT NULL |

mod ast;
mod errors;
mod eval;
mod lexer;
mod operators;
mod parser;

pub use ast::{Combinator, ComparisonNode, LogicalNode, Node, MAX_NESTING_DEPTH};
pub use errors::{CompileError, CompileErrorCode, CompileResult, Severity};
pub use operators::{Arity, OperatorKind, OperatorTable};
pub use parser::{parse, Parser, DEFAULT_MAX_DEPTH};
