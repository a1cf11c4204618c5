//! Compilation Property Tests
//!
//! End-to-end checks on filter text -> WHERE fragment + parameters:
//! - Literals only ever appear as parameters
//! - Unknown fields are rejected at any depth
//! - Grouping survives compilation, checked by evaluating the fragment
//! - Output is deterministic

use std::sync::Arc;
use std::thread;

use rsqlc::rsql::{parse, CompileErrorCode, Node, OperatorTable};
use rsqlc::schema::FieldSchema;
use rsqlc::sql::{build_order_by, compile, FilterCompiler, SqlParam};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn schema() -> FieldSchema {
    FieldSchema::builder("users")
        .numeric("id")
        .numeric("age")
        .numeric("a")
        .numeric("b")
        .text("name")
        .text("region")
        .text("status")
        .build()
        .unwrap()
}

fn compiler() -> FilterCompiler {
    FilterCompiler::new(Arc::new(schema()), Arc::new(OperatorTable::standard()))
}

/// Evaluates a compiled fragment against a row.
///
/// Understands exactly what the compiler emits for `=` comparisons and
/// AND/OR groups, consuming parameters left to right.
fn eval_fragment(fragment: &str, params: &[SqlParam], row: &Value) -> bool {
    let mut pos = 0;
    let mut next_param = 0;
    let result = eval_expr(fragment, &mut pos, params, &mut next_param, row);
    assert_eq!(pos, fragment.len(), "trailing fragment text");
    assert_eq!(next_param, params.len(), "unused parameters");
    result
}

fn eval_expr(s: &str, pos: &mut usize, params: &[SqlParam], next: &mut usize, row: &Value) -> bool {
    if s[*pos..].starts_with('(') {
        *pos += 1;
        let mut value = eval_expr(s, pos, params, next, row);
        loop {
            let rest = &s[*pos..];
            if rest.starts_with(" AND ") {
                *pos += 5;
                let rhs = eval_expr(s, pos, params, next, row);
                value = value && rhs;
            } else if rest.starts_with(" OR ") {
                *pos += 4;
                let rhs = eval_expr(s, pos, params, next, row);
                value = value || rhs;
            } else if rest.starts_with(')') {
                *pos += 1;
                return value;
            } else {
                panic!("unexpected fragment text at {}: {}", pos, rest);
            }
        }
    }

    // `field` = ?
    let rest = &s[*pos..];
    assert!(rest.starts_with('`'), "expected column at {}: {}", pos, rest);
    let close = rest[1..].find('`').unwrap() + 1;
    let field = &rest[1..close];
    let tail = " = ?";
    assert!(rest[close + 1..].starts_with(tail), "only '=' is supported here");
    *pos += close + 1 + tail.len();

    let param = &params[*next];
    *next += 1;
    match (row.get(field), param) {
        (Some(Value::Number(n)), SqlParam::Integer(i)) => n.as_i64() == Some(*i),
        (Some(Value::String(v)), SqlParam::Text(t)) => v == t,
        _ => false,
    }
}

fn sample_rows() -> Vec<Value> {
    let mut rows = Vec::new();
    for a in 0..2 {
        for b in 0..2 {
            rows.push(json!({"a": a, "b": b}));
        }
    }
    rows
}

/// 50 levels of parenthesized groups alternating AND / OR
fn nested_filter(levels: usize) -> String {
    let mut filter = "a==1".to_string();
    for i in 1..=levels {
        let (joiner, field) = if i % 2 == 0 { (";", "a") } else { (",", "b") };
        filter = format!("({}){}{}=={}", filter, joiner, field, i % 2);
    }
    filter
}

// =============================================================================
// Fragment Safety
// =============================================================================

/// Literal values never appear in the fragment text.
#[test]
fn test_literals_only_in_parameters() {
    let literals = ["zzJohn", "zz'; DROP TABLE users; --", "zz`name`", "zz\"q\""];
    for literal in literals {
        let escaped = literal.replace('\\', "\\\\").replace('"', "\\\"");
        let filters = [
            format!("name==\"{}\"", escaped),
            format!("region=in=(\"{}\",x)", escaped),
            format!("status=like=\"*{}*\"", escaped),
            format!("(age=gt=3;name!=\"{}\"),id==1", escaped),
        ];

        for filter in &filters {
            let predicate = compiler().compile_filter(Some(filter)).unwrap();
            assert!(
                !predicate.where_fragment().contains("zz"),
                "literal leaked into fragment for {}: {}",
                filter,
                predicate.where_fragment()
            );
            assert!(predicate
                .parameters()
                .iter()
                .any(|p| p.as_text().map_or(false, |t| t.contains(literal))));
        }
    }
}

/// Unknown fields are rejected no matter how deep they sit.
#[test]
fn test_unknown_field_rejected_at_any_depth() {
    let filters = [
        "password==x",
        "name==a;password==x",
        "(name==a,(age==1;(id==2,password==x)))",
        "((((((password=isnull=true))))))",
    ];
    for filter in filters {
        let err = compiler().compile_filter(Some(filter)).unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::UnknownField, "{}", filter);
        assert_eq!(err.fragment(), "password");
    }
}

// =============================================================================
// Output Shape
// =============================================================================

#[test]
fn test_empty_filter() {
    for filter in [None, Some(""), Some("  \t ")] {
        let predicate = compiler().compile_filter(filter).unwrap();
        assert_eq!(predicate.where_fragment(), "1=1");
        assert!(predicate.parameters().is_empty());
    }
}

#[test]
fn test_and_pair_left_to_right() {
    let predicate = compiler().compile_filter(Some("name==A;region==B")).unwrap();
    assert_eq!(predicate.where_fragment(), "(`name` = ? AND `region` = ?)");
    assert_eq!(
        predicate.parameters(),
        &[SqlParam::from("A"), SqlParam::from("B")]
    );
}

#[test]
fn test_list_and_like_operators() {
    let predicate = compiler().compile_filter(Some("region=in=(A,B,C)")).unwrap();
    assert_eq!(predicate.where_fragment(), "`region` IN (?, ?, ?)");
    assert_eq!(
        predicate.parameters(),
        &[SqlParam::from("A"), SqlParam::from("B"), SqlParam::from("C")]
    );

    let predicate = compiler().compile_filter(Some("region=out=(A)")).unwrap();
    assert_eq!(predicate.where_fragment(), "`region` NOT IN (?)");

    let predicate = compiler().compile_filter(Some("name=like=*Jo*")).unwrap();
    assert_eq!(predicate.where_fragment(), "`name` LIKE ?");
    assert_eq!(predicate.parameters(), &[SqlParam::from("%Jo%")]);
}

#[test]
fn test_numeric_field_binds_number() {
    let predicate = compiler().compile_filter(Some("age=gt=25")).unwrap();
    assert_eq!(predicate.parameters(), &[SqlParam::Integer(25)]);

    let json = serde_json::to_value(&predicate).unwrap();
    assert_eq!(json["parameters"][0], json!(25));
}

#[test]
fn test_alias_operators_compile_like_fiql() {
    let pairs = [
        ("age>1", "age=gt=1"),
        ("age>=1", "age=ge=1"),
        ("age<1", "age=lt=1"),
        ("age<=1", "age=le=1"),
    ];
    for (alias, fiql) in pairs {
        assert_eq!(
            compiler().compile_filter(Some(alias)).unwrap(),
            compiler().compile_filter(Some(fiql)).unwrap()
        );
    }
}

#[test]
fn test_compile_is_deterministic() {
    let filter = "(name==x,region=in=(a,b));age=ge=18;status=like=*ok*";
    let first = compiler().compile_filter(Some(filter)).unwrap();
    for _ in 0..50 {
        assert_eq!(compiler().compile_filter(Some(filter)).unwrap(), first);
    }
}

#[test]
fn test_concurrent_compilation() {
    let compiler = Arc::new(compiler());
    let expected = compiler.compile_filter(Some("age=gt=5;name==x")).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let compiler = Arc::clone(&compiler);
            thread::spawn(move || compiler.compile_filter(Some("age=gt=5;name==x")).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

// =============================================================================
// Nesting
// =============================================================================

/// 50 nested groups compile and keep their grouping.
#[test]
fn test_deep_nesting_preserves_grouping() {
    let filter = nested_filter(50);
    let table = OperatorTable::standard();
    let ast: Node = parse(&filter, &table).unwrap().unwrap();
    assert_eq!(ast.depth(), 50);

    let predicate = compile(Some(&ast), &schema()).unwrap();
    assert_eq!(predicate.parameters().len(), 51);

    // Canonical text re-parses to the same tree
    let reparsed = parse(&ast.to_string(), &table).unwrap().unwrap();
    assert_eq!(reparsed, ast);

    for row in sample_rows() {
        assert_eq!(
            eval_fragment(predicate.where_fragment(), predicate.parameters(), &row),
            ast.matches(&row),
            "row {}",
            row
        );
    }
}

/// Regrouping changes the result, and the fragment follows the grouping.
#[test]
fn test_grouping_changes_meaning() {
    let row = json!({"a": 0, "b": 1});
    for (filter, expected) in [("a==1;b==1,b==1", true), ("a==1;(b==1,b==1)", false)] {
        let predicate = compiler().compile_filter(Some(filter)).unwrap();
        let ast = compiler().parse(filter).unwrap().unwrap();
        assert_eq!(ast.matches(&row), expected);
        assert_eq!(
            eval_fragment(predicate.where_fragment(), predicate.parameters(), &row),
            expected
        );
    }
}

#[test]
fn test_nesting_limit() {
    let too_deep = format!("{}a==1{}", "(".repeat(65), ")".repeat(65));
    let err = compiler().compile_filter(Some(&too_deep)).unwrap_err();
    assert_eq!(err.code(), CompileErrorCode::NestingTooDeep);

    let ok = format!("{}a==1{}", "(".repeat(64), ")".repeat(64));
    assert!(compiler().compile_filter(Some(&ok)).is_ok());
}

// =============================================================================
// Sort
// =============================================================================

#[test]
fn test_sort_builder() {
    let schema = schema();
    assert_eq!(
        build_order_by(Some("unknownCol"), Some("desc"), &schema, "id"),
        " ORDER BY id"
    );
    assert_eq!(
        build_order_by(Some("name"), Some("DESC"), &schema, "id"),
        " ORDER BY `name` DESC"
    );
}
