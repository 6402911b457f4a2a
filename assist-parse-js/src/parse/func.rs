use super::Parser;
use crate::ast::expr::FuncExpr;
use crate::ast::func::Func;
use crate::ast::func::FuncBody;
use crate::ast::node::Node;
use crate::ast::stmt::FuncDecl;
use crate::ast::stx::Ident;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::loc::Loc;
use crate::token::TokenKind;

impl<'a> Parser<'a> {
  /// Parses a declared name such as a parameter or variable.
  pub fn binding_ident(&mut self) -> SyntaxResult<Node<Ident>> {
    let t = self.consume();
    if !t.kind.is_binding_name() {
      return Err(t.error(SyntaxErrorType::ExpectedSyntax("identifier")));
    };
    let name = self.string(t.loc);
    Ok(self.node(t.loc, Ident { name }))
  }

  fn maybe_func_name(&mut self) -> SyntaxResult<Option<Node<Ident>>> {
    let t = self.peek();
    if t.kind.is_binding_name() {
      Ok(Some(self.binding_ident()?))
    } else {
      Ok(None)
    }
  }

  pub fn func_body(&mut self) -> SyntaxResult<Node<FuncBody>> {
    let start = self.require(TokenKind::LBrace)?.loc;
    let body = self.stmts_until(|kind| kind == TokenKind::RBrace);
    let end = self.require_closer(TokenKind::RBrace)?;
    Ok(self.node(Loc(start.0, end.1), FuncBody { body }))
  }

  /// Parses `(params) { body }`.
  pub fn func_params_and_body(&mut self) -> SyntaxResult<Node<Func>> {
    self.with_loc(|p| {
      p.require(TokenKind::LParen)?;
      let params = p.list(TokenKind::Comma, TokenKind::RParen, |p| p.binding_ident())?;
      let body = p.func_body()?;
      Ok(Func { params, body })
    })
  }

  pub fn func_expr(&mut self) -> SyntaxResult<Node<FuncExpr>> {
    self.with_loc(|p| {
      p.require(TokenKind::Function)?;
      let name = p.maybe_func_name()?;
      let function = p.func_params_and_body()?;
      Ok(FuncExpr { name, function })
    })
  }

  pub fn func_decl(&mut self) -> SyntaxResult<Node<FuncDecl>> {
    self.with_loc(|p| {
      p.require(TokenKind::Function)?;
      let name = p.maybe_func_name()?;
      let function = p.func_params_and_body()?;
      Ok(FuncDecl { name, function })
    })
  }
}
