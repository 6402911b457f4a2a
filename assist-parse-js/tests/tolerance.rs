use assist_parse_js::ast::expr::Expr;
use assist_parse_js::ast::stmt::Stmt;
use assist_parse_js::loc::Loc;
use assist_parse_js::parse;

#[test]
fn empty_source() {
  let parsed = parse("");
  assert!(parsed.top_level.stx.body.is_empty());
  assert!(!parsed.has_errors());
  assert_eq!(parsed.top_level.loc, Loc(0, 0));
}

#[test]
fn partial_member_inside_unclosed_call_and_block() {
  let src = "if (x) {\n  foo(a, b.";
  let parsed = parse(src);
  assert!(!parsed.has_errors());
  let Stmt::If(if_stmt) = parsed.top_level.stx.body[0].stx.as_ref() else {
    panic!("expected if");
  };
  assert_eq!(if_stmt.loc.1, src.len());
  let Stmt::Block(block) = if_stmt.stx.consequent.stx.as_ref() else {
    panic!("expected block");
  };
  let Stmt::Expr(e) = block.stx.body[0].stx.as_ref() else {
    panic!("expected expression");
  };
  let Expr::Call(call) = e.stx.expr.stx.as_ref() else {
    panic!("expected call");
  };
  let Expr::Member(member) = call.stx.arguments[1].stx.as_ref() else {
    panic!("expected member");
  };
  assert!(member.stx.property.is_none());
}

#[test]
fn broken_statement_does_not_lose_neighbours() {
  let parsed = parse("var a = 1;\na = = 2;\nfunction f() {}\n");
  assert_eq!(parsed.errors.len(), 1);
  assert_eq!(parsed.errors[0].code(), "PS0002");
  let kinds: Vec<_> = parsed
    .top_level
    .stx
    .body
    .iter()
    .map(|s| matches!(s.stx.as_ref(), Stmt::FunctionDecl(_)))
    .collect();
  assert_eq!(kinds, [false, true]);
}

#[test]
fn ast_serializes_with_tags() {
  let parsed = parse("a.b;");
  let json = serde_json::to_value(&parsed.top_level).unwrap();
  assert_eq!(json["body"][0]["$t"], "Expr");
  assert_eq!(json["body"][0]["expr"]["$t"], "Member");
  assert_eq!(json["body"][0]["expr"]["property"]["name"], "b");
}
