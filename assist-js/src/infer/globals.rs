//! Names assigned to without being declared in any enclosing function.
//!
//! Such an assignment creates a global, which is visible from anywhere in the file, including code that comes before it.

use crate::types::ARRAY;
use crate::types::BOOLEAN;
use crate::types::NUMBER;
use crate::types::REGEXP;
use crate::types::STRING;
use ahash::HashSet;
use ahash::HashSetExt;
use assist_parse_js::ast::expr::Expr;
use assist_parse_js::ast::node::Node;
use assist_parse_js::ast::stmt::Stmt;
use assist_parse_js::ast::stx::TopLevel;
use assist_parse_js::loc::Loc;
use assist_parse_js::operator::OperatorName;
use assist_parse_js::walk::walk;
use assist_parse_js::walk::NodeRef;
use assist_parse_js::walk::Visitor;
use std::convert::Infallible;
use std::ops::ControlFlow;

#[derive(Clone, Copy, Debug)]
pub(super) struct ImplicitGlobal<'a> {
  pub name: &'a str,
  /// The assigned name.
  pub loc: Loc,
  /// The builtin type the assigned value has on sight, if it's a literal.
  pub literal: Option<&'static str>,
}

struct Frame<'a> {
  declared: HashSet<&'a str>,
  assigned: Vec<ImplicitGlobal<'a>>,
  // Catch clauses only declare their parameter; `var` inside them belongs to the function.
  is_function: bool,
}

impl<'a> Frame<'a> {
  fn new(is_function: bool) -> Frame<'a> {
    Frame {
      declared: HashSet::new(),
      assigned: Vec::new(),
      is_function,
    }
  }
}

#[derive(Default)]
struct Collector<'a> {
  frames: Vec<Frame<'a>>,
  // Set by a function expression for the function node that follows it.
  own_name: Option<&'a str>,
  found: Vec<ImplicitGlobal<'a>>,
}

fn literal_type(e: &Node<Expr>) -> Option<&'static str> {
  match e.stx.as_ref() {
    Expr::LitArr(_) => Some(ARRAY),
    Expr::LitBool(_) => Some(BOOLEAN),
    Expr::LitNum(_) => Some(NUMBER),
    Expr::LitRegex(_) => Some(REGEXP),
    Expr::LitStr(_) | Expr::LitTemplate(_) => Some(STRING),
    _ => None,
  }
}

impl<'a> Collector<'a> {
  fn declare(&mut self, name: &'a str) {
    if let Some(frame) = self.frames.iter_mut().rev().find(|f| f.is_function) {
      frame.declared.insert(name);
    };
  }

  // Assignments the closing frame doesn't declare belong to the frame around it.
  fn close_frame(&mut self) {
    let Some(frame) = self.frames.pop() else {
      return;
    };
    let escaping = frame
      .assigned
      .into_iter()
      .filter(|a| !frame.declared.contains(a.name));
    match self.frames.last_mut() {
      Some(parent) => parent.assigned.extend(escaping),
      None => self.found.extend(escaping),
    };
  }
}

impl<'a> Visitor<'a> for Collector<'a> {
  type Break = Infallible;

  fn enter(&mut self, node: NodeRef<'a>) -> ControlFlow<Infallible> {
    match node {
      NodeRef::TopLevel(_) => self.frames.push(Frame::new(true)),
      NodeRef::Stmt(s) => {
        if let Stmt::FunctionDecl(decl) = s.stx.as_ref() {
          if let Some(name) = &decl.stx.name {
            self.declare(&name.stx.name);
          };
        };
      }
      NodeRef::Func(f) => {
        let mut frame = Frame::new(true);
        frame
          .declared
          .extend(f.stx.params.iter().map(|p| p.stx.name.as_str()));
        frame.declared.extend(self.own_name.take());
        self.frames.push(frame);
      }
      NodeRef::VarDeclarator(d) => self.declare(&d.stx.name.stx.name),
      NodeRef::CatchBlock(c) => {
        let mut frame = Frame::new(false);
        frame
          .declared
          .extend(c.stx.parameter.iter().map(|p| p.stx.name.as_str()));
        self.frames.push(frame);
      }
      NodeRef::Expr(e) => match e.stx.as_ref() {
        Expr::Func(f) => {
          self.own_name = f.stx.name.as_ref().map(|n| n.stx.name.as_str());
        }
        Expr::Binary(b) if b.stx.operator.is_assignment() => {
          if let Expr::Id(id) = b.stx.left.stx.as_ref() {
            let literal = match b.stx.operator {
              OperatorName::Assignment => literal_type(&b.stx.right),
              _ => None,
            };
            if let Some(frame) = self.frames.last_mut() {
              frame.assigned.push(ImplicitGlobal {
                name: &id.stx.name,
                loc: b.stx.left.loc,
                literal,
              });
            };
          };
        }
        _ => {}
      },
      _ => {}
    };
    ControlFlow::Continue(())
  }

  fn exit(&mut self, node: NodeRef<'a>) -> ControlFlow<Infallible> {
    if let NodeRef::TopLevel(_) | NodeRef::Func(_) | NodeRef::CatchBlock(_) = node {
      self.close_frame();
    };
    ControlFlow::Continue(())
  }
}

/// Every assignment to an undeclared name, in source order.
pub(super) fn implicit_globals(top_level: &Node<TopLevel>) -> Vec<ImplicitGlobal<'_>> {
  let mut collector = Collector::default();
  let _ = walk(top_level, &mut collector);
  collector.found.sort_by_key(|g| g.loc.0);
  collector.found
}

#[cfg(test)]
mod tests {
  use super::implicit_globals;
  use assist_parse_js::parse;

  fn names(source: &str) -> Vec<String> {
    let parsed = parse(source);
    implicit_globals(&parsed.top_level)
      .iter()
      .map(|g| g.name.to_string())
      .collect()
  }

  #[test]
  fn test_undeclared_assignments() {
    assert_eq!(names("function f() { later = 1; }\nfirst = 2;"), ["later", "first"]);
    assert_eq!(names("a.b = 1; this.c = 2;"), Vec::<String>::new());
  }

  #[test]
  fn test_declarations_hide_assignments() {
    let src = "var top;
top = 1;
function f(p) {
  p = 1;
  inner = 2;
  if (p) { var inner; }
  var g = function own() { own = 3; };
}
try {} catch (e) { e = 4; var caught; }
caught = 5;
";
    assert!(names(src).is_empty());
  }

  #[test]
  fn test_literal_types() {
    let parsed = parse("n = 1; s = 'x'; o = {}; c += 1;");
    let literals: Vec<_> = implicit_globals(&parsed.top_level)
      .iter()
      .map(|g| g.literal)
      .collect();
    assert_eq!(literals, [Some("Number"), Some("String"), None, None]);
  }
}
