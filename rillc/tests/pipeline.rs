///
/// Pipeline Integration Tests
///
/// Drives the library end to end through its public API: tokenize, parse,
/// interpret. Covers the reference scenarios plus the properties every
/// stage must keep (span round-trip, filter idempotence, lookup rules).
///
/// Run all:  `cargo test --test pipeline`
///

use rillc::ast::{BinaryOp, ContextKind, DeclTree, Expr, Stmt};
use rillc::interpreter::{Context, RuntimeError, SharedOutput, Symbol, Value};
use rillc::lexer::{TRIVIA, TokenFilter, TokenKind, Tokenizer, tokenize_raw};
use rillc::{SourceBuffer, SourceLocation, interpret_with, parse_source, parse_unit, tokenize};

fn kinds_and_text(source: &str) -> Vec<(TokenKind, String)> {
    let buffer = SourceBuffer::anonymous(source);
    tokenize(&buffer)
        .expect("tokenize failed")
        .into_iter()
        .map(|t| (t.kind, t.as_str().to_string()))
        .collect()
}

#[test]
fn test_scenario_tokenize_declaration() {
    let tokens = kinds_and_text("var i = 8;");
    assert_eq!(
        tokens,
        vec![
            (TokenKind::Identifier, "var".to_string()),
            (TokenKind::Identifier, "i".to_string()),
            (TokenKind::Other, "=".to_string()),
            (TokenKind::NumberLiteral, "8".to_string()),
            (TokenKind::Other, ";".to_string()),
        ]
    );
}

#[test]
fn test_scenario_parse_addition() {
    let buffer = SourceBuffer::anonymous("5 + 2;");
    let source = parse_source(&buffer).expect("parse failed");
    assert_eq!(source.stmts.len(), 1);

    let Stmt::Expr(stmt) = &source.stmts[0] else {
        panic!("expected an expression statement");
    };
    let Expr::Binary(binary) = &stmt.expr else {
        panic!("expected a binary expression");
    };
    assert_eq!(binary.op, BinaryOp::Add);
    assert!(matches!(*binary.lhs, Expr::IntLiteral(ref lit) if lit.value == 5));
    assert!(matches!(*binary.rhs, Expr::IntLiteral(ref lit) if lit.value == 2));
    assert_eq!(binary.range.start, SourceLocation::new(1, 1));
    assert_eq!(binary.range.end, SourceLocation::new(1, 6));
}

#[test]
fn test_scenario_main_returns_value() {
    let buffer = SourceBuffer::anonymous("func int main() { var int a = 10; return a; }");
    let unit = parse_unit(&buffer).unwrap();
    let mut ctx = Context::with_output(&unit.names, std::io::sink());
    assert_eq!(interpret_with(&unit, &mut ctx), Ok(Value::Int(10)));
}

#[test]
fn test_scenario_print() {
    let buffer = SourceBuffer::anonymous("func main() { print(1, \"x\"); }");
    let unit = parse_unit(&buffer).unwrap();
    let out = SharedOutput::new();
    let mut ctx = Context::with_output(&unit.names, out.clone());
    assert_eq!(interpret_with(&unit, &mut ctx), Ok(Value::Null));
    assert_eq!(out.contents(), "1x\n");
}

#[test]
fn test_scenario_missing_main() {
    let buffer = SourceBuffer::anonymous("func helper() { print(\"never\"); }");
    let unit = parse_unit(&buffer).unwrap();
    let out = SharedOutput::new();
    let mut ctx = Context::with_output(&unit.names, out.clone());
    assert_eq!(interpret_with(&unit, &mut ctx), Err(RuntimeError::NoMainFunction));
    assert_eq!(out.contents(), "");
}

#[test]
fn test_token_spans_round_trip() {
    let text = "func int f(char c) {\n  // note\n  var s = \"a\\tb\";\n  return 0x1F + 2.5e3 + c;\n}";
    let buffer = SourceBuffer::anonymous(text);
    for token in tokenize_raw(&buffer).unwrap() {
        let slice = buffer.slice(token.location).expect("span outside the buffer");
        match token.kind {
            TokenKind::Identifier | TokenKind::Keyword(_) | TokenKind::NumberLiteral | TokenKind::Other => {
                assert_eq!(slice, token.as_str(), "{token}");
            }
            TokenKind::StringLiteral => assert_eq!(slice, "\"a\\tb\""),
            TokenKind::Comment => assert_eq!(slice, "// note"),
            TokenKind::WhiteSpace | TokenKind::EndOfLine => {
                assert!(slice.chars().all(char::is_whitespace));
            }
            TokenKind::CharLiteral => unreachable!("no char literals in this source"),
        }
    }
}

#[test]
fn test_filter_is_idempotent() {
    let buffer = SourceBuffer::anonymous("a /* c */ + b // tail\n;");
    let once: Vec<_> = TokenFilter::new(Tokenizer::new(&buffer), TRIVIA).collect();
    let twice: Vec<_> = TokenFilter::new(TokenFilter::new(Tokenizer::new(&buffer), TRIVIA), TRIVIA).collect();
    assert_eq!(once, twice);
    assert_eq!(once.len(), 4);
}

#[test]
fn test_shadowing_across_scopes() {
    let buffer = SourceBuffer::anonymous("x;");
    let source = parse_source(&buffer).unwrap();
    let x = source.names.get("x").unwrap();
    let here = source.range;
    let mut ctx = Context::with_output(&source.names, std::io::sink());

    ctx.add_symbol(x, Symbol::variable(Value::Int(1)), here).unwrap();
    for depth in 0..3 {
        ctx.push();
        ctx.add_symbol(x, Symbol::variable(Value::Int(depth)), here).unwrap();
        assert!(matches!(
            ctx.add_symbol(x, Symbol::variable(Value::Null), here),
            Err(RuntimeError::DuplicateSymbol { .. })
        ));
    }
}

#[test]
fn test_declaration_lookup_does_not_fall_through() {
    let buffer = SourceBuffer::anonymous("var x = 1; { var x = 2; }");
    let source = parse_source(&buffer).unwrap();
    let x = source.names.get("x").unwrap();
    let Stmt::Compound(block) = &source.stmts[1] else {
        panic!("expected a block");
    };

    let mut tree: DeclTree = source.contexts.clone();
    let inner = block.context;
    assert_eq!(tree.get(inner).map(|c| c.kind), Some(ContextKind::Block));

    let outer_x = tree.find_declaration(tree.global(), x).unwrap();
    let inner_x = tree.find_declaration(inner, x).unwrap();
    assert_ne!(outer_x, inner_x);

    assert!(tree.remove_declaration(inner, inner_x));
    assert_eq!(tree.find_declaration(inner, x), None);
    assert_eq!(tree.find_declaration(tree.global(), x), Some(outer_x));
}

#[test]
fn test_recursive_program() {
    let text = r#"
        func int gcd(int a, int b) {
            while (b != 0) {
                var t = b;
                b = a % b;
                a = t;
            }
            return a;
        }
        func int main() { return gcd(1071, 462); }
    "#;
    let buffer = SourceBuffer::anonymous(text);
    let unit = parse_unit(&buffer).unwrap();
    let mut ctx = Context::with_output(&unit.names, std::io::sink());
    assert_eq!(interpret_with(&unit, &mut ctx), Ok(Value::Int(21)));
}

#[test]
fn test_context_reuse_after_reset() {
    let buffer = SourceBuffer::anonymous("func main() { var a = 1; { var b = a / 0; } }");
    let unit = parse_unit(&buffer).unwrap();
    let mut ctx = Context::with_output(&unit.names, std::io::sink());
    let err = interpret_with(&unit, &mut ctx).unwrap_err();
    assert!(matches!(err, RuntimeError::DivisionByZero { .. }));
    assert!(ctx.depth() > 1);

    ctx.reset();
    assert_eq!(ctx.depth(), 1);
}
