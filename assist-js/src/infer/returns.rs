use assist_parse_js::ast::node::Node;
use assist_parse_js::ast::node::NodeId;
use assist_parse_js::ast::stmt::Stmt;

/// Finds the return statement that stands for a function body's result.
///
/// Only the last statement of a list is considered, and within a compound statement the branch that would run last wins: `else` over `then`, `finally` over the `catch` handler over the `try` block, and later `case`s over earlier ones. Nested functions are never searched.
pub fn find_return(body: &[Node<Stmt>]) -> Option<NodeId> {
  body.last().and_then(in_stmt)
}

fn in_stmt(s: &Node<Stmt>) -> Option<NodeId> {
  match s.stx.as_ref() {
    Stmt::Return(_) => Some(s.id),
    Stmt::Block(b) => find_return(&b.stx.body),
    Stmt::If(n) => n
      .stx
      .alternate
      .as_ref()
      .and_then(in_stmt)
      .or_else(|| in_stmt(&n.stx.consequent)),
    Stmt::For(n) => in_stmt(&n.stx.body),
    Stmt::ForIn(n) => in_stmt(&n.stx.body),
    Stmt::While(n) => in_stmt(&n.stx.body),
    Stmt::DoWhile(n) => in_stmt(&n.stx.body),
    Stmt::With(n) => in_stmt(&n.stx.body),
    Stmt::Label(n) => in_stmt(&n.stx.statement),
    Stmt::Try(n) => n
      .stx
      .finally
      .as_ref()
      .and_then(|f| find_return(&f.stx.body))
      .or_else(|| {
        n.stx
          .catch
          .as_ref()
          .and_then(|c| find_return(&c.stx.body.stx.body))
      })
      .or_else(|| find_return(&n.stx.wrapped.stx.body)),
    Stmt::Switch(n) => n
      .stx
      .branches
      .iter()
      .rev()
      .find_map(|b| find_return(&b.stx.body)),
    Stmt::Break(_)
    | Stmt::Continue(_)
    | Stmt::Debugger(_)
    | Stmt::Empty(_)
    | Stmt::Expr(_)
    | Stmt::FunctionDecl(_)
    | Stmt::Throw(_)
    | Stmt::VarDecl(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::find_return;
  use assist_parse_js::ast::expr::Expr;
  use assist_parse_js::ast::stmt::Stmt;
  use assist_parse_js::parse;

  // The literal returned by the statement `find_return` picks in the first function of `source`.
  fn returned(source: &str) -> Option<String> {
    let parsed = parse(source);
    let Stmt::FunctionDecl(decl) = parsed.top_level.stx.body[0].stx.as_ref() else {
      panic!("expected a function declaration");
    };
    let body = &decl.stx.function.stx.body.stx.body;
    let id = find_return(body)?;
    let mut found = None;
    let _ = assist_parse_js::walk::walk(
      &parsed.top_level,
      &mut |n: assist_parse_js::walk::NodeRef<'_>| {
        if let assist_parse_js::walk::NodeRef::Stmt(s) = n {
          if s.id == id {
            if let Stmt::Return(r) = s.stx.as_ref() {
              found = r.stx.value.as_ref().map(|v| match v.stx.as_ref() {
                Expr::LitNum(n) => n.stx.raw.clone(),
                Expr::LitStr(s) => s.stx.value.clone(),
                _ => "?".to_string(),
              });
            };
          };
        };
      },
    );
    found
  }

  #[test]
  fn test_last_statement_only() {
    assert_eq!(returned("function f() { return 1; }"), Some("1".to_string()));
    assert_eq!(returned("function f() { if (a) { return 1; } g(); }"), None);
    assert_eq!(returned("function f() {}"), None);
  }

  #[test]
  fn test_else_over_then() {
    let src = "function f() { if (a) { return 1; } else { return 'e'; } }";
    assert_eq!(returned(src), Some("e".to_string()));
    let src = "function f() { if (a) { return 1; } else { g(); } }";
    assert_eq!(returned(src), Some("1".to_string()));
  }

  #[test]
  fn test_finally_over_catch_over_try() {
    let src = "function f() { try { return 1; } catch (e) { return 2; } finally { return 3; } }";
    assert_eq!(returned(src), Some("3".to_string()));
    let src = "function f() { try { return 1; } catch (e) { return 2; } }";
    assert_eq!(returned(src), Some("2".to_string()));
    let src = "function f() { try { return 1; } finally { g(); } }";
    assert_eq!(returned(src), Some("1".to_string()));
  }

  #[test]
  fn test_later_cases_first() {
    let src = "function f(x) { switch (x) { case 1: return 1; case 2: return 2; default: g(); } }";
    assert_eq!(returned(src), Some("2".to_string()));
  }

  #[test]
  fn test_loops_and_nested_functions() {
    assert_eq!(
      returned("function f() { while (a) { return 1; } }"),
      Some("1".to_string())
    );
    assert_eq!(
      returned("function f() { function g() { return 1; } }"),
      None
    );
  }
}
