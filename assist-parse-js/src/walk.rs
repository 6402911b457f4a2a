//! Pre/post-order traversal with early exit.
//!
//! [`Drive`](derive_visitor::Drive) visits every node but cannot stop or hand back a value, so analyses that end as soon as they have an answer use [`walk`] instead.

use crate::ast::expr::Expr;
use crate::ast::expr::ObjMember;
use crate::ast::func::Func;
use crate::ast::func::FuncBody;
use crate::ast::node::Node;
use crate::ast::node::NodeId;
use crate::ast::stmt::BlockStmt;
use crate::ast::stmt::CatchBlock;
use crate::ast::stmt::ForInLhs;
use crate::ast::stmt::ForInit;
use crate::ast::stmt::Stmt;
use crate::ast::stmt::SwitchBranch;
use crate::ast::stmt::VarDecl;
use crate::ast::stmt::VarDeclarator;
use crate::ast::stx::Ident;
use crate::ast::stx::TopLevel;
use crate::loc::Loc;
use std::convert::Infallible;
use std::ops::ControlFlow;

#[derive(Clone, Copy, Debug)]
pub enum NodeRef<'a> {
  TopLevel(&'a Node<TopLevel>),
  Stmt(&'a Node<Stmt>),
  /// The `try` and `finally` blocks of a try statement. Other blocks arrive as `Stmt::Block`.
  Block(&'a Node<BlockStmt>),
  Expr(&'a Node<Expr>),
  Func(&'a Node<Func>),
  FuncBody(&'a Node<FuncBody>),
  VarDeclarator(&'a Node<VarDeclarator>),
  CatchBlock(&'a Node<CatchBlock>),
  SwitchBranch(&'a Node<SwitchBranch>),
  ObjMember(&'a Node<ObjMember>),
  /// A declared name. Uses of names arrive as `Expr::Id`.
  Ident(&'a Node<Ident>),
}

impl<'a> NodeRef<'a> {
  pub fn id(&self) -> NodeId {
    match self {
      NodeRef::TopLevel(n) => n.id,
      NodeRef::Stmt(n) => n.id,
      NodeRef::Block(n) => n.id,
      NodeRef::Expr(n) => n.id,
      NodeRef::Func(n) => n.id,
      NodeRef::FuncBody(n) => n.id,
      NodeRef::VarDeclarator(n) => n.id,
      NodeRef::CatchBlock(n) => n.id,
      NodeRef::SwitchBranch(n) => n.id,
      NodeRef::ObjMember(n) => n.id,
      NodeRef::Ident(n) => n.id,
    }
  }

  pub fn loc(&self) -> Loc {
    match self {
      NodeRef::TopLevel(n) => n.loc,
      NodeRef::Stmt(n) => n.loc,
      NodeRef::Block(n) => n.loc,
      NodeRef::Expr(n) => n.loc,
      NodeRef::Func(n) => n.loc,
      NodeRef::FuncBody(n) => n.loc,
      NodeRef::VarDeclarator(n) => n.loc,
      NodeRef::CatchBlock(n) => n.loc,
      NodeRef::SwitchBranch(n) => n.loc,
      NodeRef::ObjMember(n) => n.loc,
      NodeRef::Ident(n) => n.loc,
    }
  }
}

pub trait Visitor<'a> {
  type Break;

  fn enter(&mut self, _node: NodeRef<'a>) -> ControlFlow<Self::Break> {
    ControlFlow::Continue(())
  }

  fn exit(&mut self, _node: NodeRef<'a>) -> ControlFlow<Self::Break> {
    ControlFlow::Continue(())
  }
}

// Closures see each node once, on entry.
impl<'a, F: FnMut(NodeRef<'a>)> Visitor<'a> for F {
  type Break = Infallible;

  fn enter(&mut self, node: NodeRef<'a>) -> ControlFlow<Infallible> {
    self(node);
    ControlFlow::Continue(())
  }
}

/// Visits `top_level` and everything beneath it in source order, stopping at the first `Break`.
pub fn walk<'a, V: Visitor<'a>>(top_level: &'a Node<TopLevel>, v: &mut V) -> ControlFlow<V::Break> {
  let node = NodeRef::TopLevel(top_level);
  v.enter(node)?;
  stmts(&top_level.stx.body, v)?;
  v.exit(node)
}

fn stmts<'a, V: Visitor<'a>>(body: &'a [Node<Stmt>], v: &mut V) -> ControlFlow<V::Break> {
  for s in body {
    stmt(s, v)?;
  }
  ControlFlow::Continue(())
}

fn opt_expr<'a, V: Visitor<'a>>(e: &'a Option<Node<Expr>>, v: &mut V) -> ControlFlow<V::Break> {
  match e {
    Some(e) => expr(e, v),
    None => ControlFlow::Continue(()),
  }
}

fn ident<'a, V: Visitor<'a>>(n: &'a Node<Ident>, v: &mut V) -> ControlFlow<V::Break> {
  let node = NodeRef::Ident(n);
  v.enter(node)?;
  v.exit(node)
}

fn var_decl<'a, V: Visitor<'a>>(decl: &'a VarDecl, v: &mut V) -> ControlFlow<V::Break> {
  for d in &decl.declarators {
    let node = NodeRef::VarDeclarator(d);
    v.enter(node)?;
    ident(&d.stx.name, v)?;
    opt_expr(&d.stx.initializer, v)?;
    v.exit(node)?;
  }
  ControlFlow::Continue(())
}

fn stmt<'a, V: Visitor<'a>>(s: &'a Node<Stmt>, v: &mut V) -> ControlFlow<V::Break> {
  let node = NodeRef::Stmt(s);
  v.enter(node)?;
  match s.stx.as_ref() {
    Stmt::Block(b) => stmts(&b.stx.body, v)?,
    Stmt::Break(_) | Stmt::Continue(_) | Stmt::Debugger(_) | Stmt::Empty(_) => {}
    Stmt::DoWhile(n) => {
      stmt(&n.stx.body, v)?;
      expr(&n.stx.condition, v)?;
    }
    Stmt::Expr(n) => expr(&n.stx.expr, v)?,
    Stmt::For(n) => {
      match &n.stx.init {
        Some(ForInit::Expr(e)) => expr(e, v)?,
        Some(ForInit::Decl(d)) => var_decl(&d.stx, v)?,
        None => {}
      };
      opt_expr(&n.stx.condition, v)?;
      opt_expr(&n.stx.post, v)?;
      stmt(&n.stx.body, v)?;
    }
    Stmt::ForIn(n) => {
      match &n.stx.lhs {
        ForInLhs::Expr(e) => expr(e, v)?,
        ForInLhs::Decl(d) => var_decl(&d.stx, v)?,
      };
      expr(&n.stx.rhs, v)?;
      stmt(&n.stx.body, v)?;
    }
    Stmt::FunctionDecl(n) => {
      if let Some(name) = &n.stx.name {
        ident(name, v)?;
      };
      func(&n.stx.function, v)?;
    }
    Stmt::If(n) => {
      expr(&n.stx.test, v)?;
      stmt(&n.stx.consequent, v)?;
      if let Some(alt) = &n.stx.alternate {
        stmt(alt, v)?;
      };
    }
    Stmt::Label(n) => stmt(&n.stx.statement, v)?,
    Stmt::Return(n) => opt_expr(&n.stx.value, v)?,
    Stmt::Switch(n) => {
      expr(&n.stx.test, v)?;
      for b in &n.stx.branches {
        let branch = NodeRef::SwitchBranch(b);
        v.enter(branch)?;
        opt_expr(&b.stx.case, v)?;
        stmts(&b.stx.body, v)?;
        v.exit(branch)?;
      }
    }
    Stmt::Throw(n) => expr(&n.stx.value, v)?,
    Stmt::Try(n) => {
      block(&n.stx.wrapped, v)?;
      if let Some(c) = &n.stx.catch {
        let catch = NodeRef::CatchBlock(c);
        v.enter(catch)?;
        if let Some(param) = &c.stx.parameter {
          ident(param, v)?;
        };
        stmts(&c.stx.body.stx.body, v)?;
        v.exit(catch)?;
      };
      if let Some(f) = &n.stx.finally {
        block(f, v)?;
      };
    }
    Stmt::VarDecl(n) => var_decl(&n.stx, v)?,
    Stmt::While(n) => {
      expr(&n.stx.condition, v)?;
      stmt(&n.stx.body, v)?;
    }
    Stmt::With(n) => {
      expr(&n.stx.object, v)?;
      stmt(&n.stx.body, v)?;
    }
  };
  v.exit(node)
}

fn block<'a, V: Visitor<'a>>(b: &'a Node<BlockStmt>, v: &mut V) -> ControlFlow<V::Break> {
  let node = NodeRef::Block(b);
  v.enter(node)?;
  stmts(&b.stx.body, v)?;
  v.exit(node)
}

fn func<'a, V: Visitor<'a>>(f: &'a Node<Func>, v: &mut V) -> ControlFlow<V::Break> {
  let node = NodeRef::Func(f);
  v.enter(node)?;
  for p in &f.stx.params {
    ident(p, v)?;
  }
  let body = NodeRef::FuncBody(&f.stx.body);
  v.enter(body)?;
  stmts(&f.stx.body.stx.body, v)?;
  v.exit(body)?;
  v.exit(node)
}

fn expr<'a, V: Visitor<'a>>(e: &'a Node<Expr>, v: &mut V) -> ControlFlow<V::Break> {
  let node = NodeRef::Expr(e);
  v.enter(node)?;
  match e.stx.as_ref() {
    Expr::Binary(n) => {
      expr(&n.stx.left, v)?;
      expr(&n.stx.right, v)?;
    }
    Expr::Call(n) => {
      expr(&n.stx.callee, v)?;
      for a in &n.stx.arguments {
        expr(a, v)?;
      }
    }
    Expr::New(n) => {
      expr(&n.stx.callee, v)?;
      for a in &n.stx.arguments {
        expr(a, v)?;
      }
    }
    Expr::ComputedMember(n) => {
      expr(&n.stx.object, v)?;
      expr(&n.stx.member, v)?;
    }
    Expr::Cond(n) => {
      expr(&n.stx.test, v)?;
      expr(&n.stx.consequent, v)?;
      expr(&n.stx.alternate, v)?;
    }
    Expr::Func(n) => {
      if let Some(name) = &n.stx.name {
        ident(name, v)?;
      };
      func(&n.stx.function, v)?;
    }
    // The property is visited as part of the member expression itself.
    Expr::Member(n) => expr(&n.stx.object, v)?,
    Expr::Unary(n) => expr(&n.stx.argument, v)?,
    Expr::UnaryPostfix(n) => expr(&n.stx.argument, v)?,
    Expr::LitArr(n) => {
      for el in n.stx.elements.iter().flatten() {
        expr(el, v)?;
      }
    }
    Expr::LitObj(n) => {
      for m in &n.stx.members {
        let member = NodeRef::ObjMember(m);
        v.enter(member)?;
        expr(&m.stx.value, v)?;
        v.exit(member)?;
      }
    }
    Expr::Id(_)
    | Expr::This(_)
    | Expr::LitBool(_)
    | Expr::LitNull(_)
    | Expr::LitNum(_)
    | Expr::LitRegex(_)
    | Expr::LitStr(_)
    | Expr::LitTemplate(_) => {}
  };
  v.exit(node)
}

#[cfg(test)]
mod tests {
  use super::walk;
  use super::NodeRef;
  use super::Visitor;
  use crate::ast::expr::Expr;
  use crate::parse;
  use std::ops::ControlFlow;

  #[derive(Default)]
  struct Trace(Vec<String>);

  impl<'a> Visitor<'a> for Trace {
    type Break = String;

    fn enter(&mut self, node: NodeRef<'a>) -> ControlFlow<String> {
      if let NodeRef::Expr(e) = node {
        if let Expr::Id(id) = e.stx.as_ref() {
          if id.stx.name == "stop" {
            return ControlFlow::Break(id.stx.name.clone());
          };
          self.0.push(format!("+{}", id.stx.name));
        };
      };
      ControlFlow::Continue(())
    }

    fn exit(&mut self, node: NodeRef<'a>) -> ControlFlow<String> {
      if let NodeRef::Expr(e) = node {
        if let Expr::Id(id) = e.stx.as_ref() {
          self.0.push(format!("-{}", id.stx.name));
        };
      };
      ControlFlow::Continue(())
    }
  }

  #[test]
  fn test_source_order() {
    let parsed = parse("a + b; if (c) { d(e); } else f;");
    let mut trace = Trace::default();
    assert_eq!(walk(&parsed.top_level, &mut trace), ControlFlow::Continue(()));
    assert_eq!(trace.0, [
      "+a", "-a", "+b", "-b", "+c", "-c", "+d", "-d", "+e", "-e", "+f", "-f"
    ]);
  }

  #[test]
  fn test_break_stops_walk() {
    let parsed = parse("a; function g() { stop; b; } c;");
    let mut trace = Trace::default();
    let res = walk(&parsed.top_level, &mut trace);
    assert_eq!(res, ControlFlow::Break("stop".to_string()));
    assert_eq!(trace.0, ["+a", "-a"]);
  }
}
