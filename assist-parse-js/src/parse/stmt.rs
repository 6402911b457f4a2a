use super::Parser;
use crate::ast::node::Node;
use crate::ast::stmt::BlockStmt;
use crate::ast::stmt::BreakStmt;
use crate::ast::stmt::CatchBlock;
use crate::ast::stmt::ContinueStmt;
use crate::ast::stmt::DebuggerStmt;
use crate::ast::stmt::DoWhileStmt;
use crate::ast::stmt::EmptyStmt;
use crate::ast::stmt::ExprStmt;
use crate::ast::stmt::ForInLhs;
use crate::ast::stmt::ForInStmt;
use crate::ast::stmt::ForInit;
use crate::ast::stmt::ForStmt;
use crate::ast::stmt::IfStmt;
use crate::ast::stmt::LabelStmt;
use crate::ast::stmt::ReturnStmt;
use crate::ast::stmt::Stmt;
use crate::ast::stmt::SwitchBranch;
use crate::ast::stmt::SwitchStmt;
use crate::ast::stmt::ThrowStmt;
use crate::ast::stmt::TryStmt;
use crate::ast::stmt::VarDecl;
use crate::ast::stmt::VarDeclMode;
use crate::ast::stmt::VarDeclarator;
use crate::ast::stmt::WhileStmt;
use crate::ast::stmt::WithStmt;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::loc::Loc;
use crate::token::TokenKind;

impl<'a> Parser<'a> {
  /// Consumes a semicolon, or accepts its automatic insertion.
  fn end_of_stmt(&mut self) -> SyntaxResult<()> {
    let t = self.peek();
    if t.kind == TokenKind::Semi {
      self.consume();
      return Ok(());
    };
    if matches!(t.kind, TokenKind::RBrace | TokenKind::End) || t.preceded_by_line_terminator {
      return Ok(());
    };
    Err(t.error(SyntaxErrorType::ExpectedSyntax("semicolon")))
  }

  fn is_label_on_same_line(&mut self) -> bool {
    let t = self.peek();
    t.kind == TokenKind::Name && !t.preceded_by_line_terminator
  }

  pub fn stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    let (t0, t1) = self.peek_2();
    match t0.kind {
      // Only reachable for a missing body, e.g. `if (a)` at the end of input.
      TokenKind::End => Ok(self.node(Loc::at(t0.loc.0), EmptyStmt {}).into_wrapped()),
      TokenKind::LBrace => Ok(self.block_stmt()?.into_wrapped()),
      TokenKind::Semi => {
        self.consume();
        Ok(self.node(t0.loc, EmptyStmt {}).into_wrapped())
      }
      TokenKind::Var | TokenKind::Const => Ok(self.var_decl_stmt()?.into_wrapped()),
      // `let` is still usable as a plain identifier.
      TokenKind::Let if t1.kind == TokenKind::Name => Ok(self.var_decl_stmt()?.into_wrapped()),
      TokenKind::Function => Ok(self.func_decl()?.into_wrapped()),
      TokenKind::If => Ok(self.if_stmt()?.into_wrapped()),
      TokenKind::For => self.for_stmt(),
      TokenKind::While => Ok(self.while_stmt()?.into_wrapped()),
      TokenKind::Do => Ok(self.do_while_stmt()?.into_wrapped()),
      TokenKind::Return => Ok(self.return_stmt()?.into_wrapped()),
      TokenKind::Break => Ok(
        self
          .with_loc(|p| {
            p.consume();
            let label = p.stmt_label()?;
            p.end_of_stmt()?;
            Ok(BreakStmt { label })
          })?
          .into_wrapped(),
      ),
      TokenKind::Continue => Ok(
        self
          .with_loc(|p| {
            p.consume();
            let label = p.stmt_label()?;
            p.end_of_stmt()?;
            Ok(ContinueStmt { label })
          })?
          .into_wrapped(),
      ),
      TokenKind::Throw => Ok(
        self
          .with_loc(|p| {
            p.consume();
            let value = p.expr([TokenKind::Semi])?;
            p.end_of_stmt()?;
            Ok(ThrowStmt { value })
          })?
          .into_wrapped(),
      ),
      TokenKind::Try => Ok(self.try_stmt()?.into_wrapped()),
      TokenKind::Switch => Ok(self.switch_stmt()?.into_wrapped()),
      TokenKind::With => Ok(
        self
          .with_loc(|p| {
            p.consume();
            let object = p.grouping()?;
            let body = p.stmt()?;
            Ok(WithStmt { object, body })
          })?
          .into_wrapped(),
      ),
      TokenKind::Debugger => Ok(
        self
          .with_loc(|p| {
            p.consume();
            p.end_of_stmt()?;
            Ok(DebuggerStmt {})
          })?
          .into_wrapped(),
      ),
      TokenKind::Class => Err(t0.error(SyntaxErrorType::UnsupportedSyntax("class"))),
      TokenKind::Import | TokenKind::Export => {
        Err(t0.error(SyntaxErrorType::UnsupportedSyntax("module syntax")))
      }
      TokenKind::Name if t1.kind == TokenKind::Colon => Ok(
        self
          .with_loc(|p| {
            let name = p.consume_as_string();
            p.require(TokenKind::Colon)?;
            let statement = p.stmt()?;
            Ok(LabelStmt { name, statement })
          })?
          .into_wrapped(),
      ),
      _ => Ok(self.expr_stmt()?.into_wrapped()),
    }
  }

  fn stmt_label(&mut self) -> SyntaxResult<Option<String>> {
    if self.is_label_on_same_line() {
      Ok(Some(self.consume_as_string()))
    } else {
      Ok(None)
    }
  }

  pub fn consume_as_string(&mut self) -> String {
    let loc = self.consume().loc;
    self.string(loc)
  }

  pub fn block_stmt(&mut self) -> SyntaxResult<Node<BlockStmt>> {
    let start = self.require(TokenKind::LBrace)?.loc;
    let body = self.stmts_until(|kind| kind == TokenKind::RBrace);
    let end = self.require_closer(TokenKind::RBrace)?;
    Ok(self.node(Loc(start.0, end.1), BlockStmt { body }))
  }

  fn expr_stmt(&mut self) -> SyntaxResult<Node<ExprStmt>> {
    self.with_loc(|p| {
      let expr = p.expr([TokenKind::Semi])?;
      p.end_of_stmt()?;
      Ok(ExprStmt { expr })
    })
  }

  /// Parses `var a = 1, b` without the trailing semicolon.
  ///
  /// `no_in` stops initialisers at `in`, as needed in a `for` header.
  fn var_decl(&mut self, no_in: bool) -> SyntaxResult<Node<VarDecl>> {
    self.with_loc(|p| {
      let t = p.consume();
      let mode = match t.kind {
        TokenKind::Var => VarDeclMode::Var,
        TokenKind::Let => VarDeclMode::Let,
        TokenKind::Const => VarDeclMode::Const,
        _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("variable declaration"))),
      };
      let mut declarators = Vec::new();
      loop {
        let declarator = p.with_loc(|p| {
          let name = p.binding_ident()?;
          let initializer = if p.consume_if(TokenKind::Assign).is_match() {
            Some(if no_in {
              p.assignment_expr([TokenKind::Semi, TokenKind::Comma, TokenKind::In])?
            } else {
              p.assignment_expr([TokenKind::Semi, TokenKind::Comma])?
            })
          } else {
            None
          };
          Ok(VarDeclarator { name, initializer })
        })?;
        declarators.push(declarator);
        if !p.consume_if(TokenKind::Comma).is_match() {
          break;
        };
      }
      Ok(VarDecl { mode, declarators })
    })
  }

  fn var_decl_stmt(&mut self) -> SyntaxResult<Node<VarDecl>> {
    let mut decl = self.var_decl(false)?;
    self.end_of_stmt()?;
    decl.loc = Loc(decl.loc.0, self.prev_end().max(decl.loc.1));
    Ok(decl)
  }

  fn if_stmt(&mut self) -> SyntaxResult<Node<IfStmt>> {
    self.with_loc(|p| {
      p.require(TokenKind::If)?;
      let test = p.grouping()?;
      let consequent = p.stmt()?;
      let alternate = if p.consume_if(TokenKind::Else).is_match() {
        Some(p.stmt()?)
      } else {
        None
      };
      Ok(IfStmt {
        test,
        consequent,
        alternate,
      })
    })
  }

  fn is_of_keyword(&mut self) -> bool {
    let t = self.peek();
    t.kind == TokenKind::Name && self.str(t.loc) == "of"
  }

  fn for_stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    let start = self.require(TokenKind::For)?.loc;
    self.require(TokenKind::LParen)?;
    let t = self.peek();
    let init = match t.kind {
      TokenKind::Semi => None,
      TokenKind::Var | TokenKind::Let | TokenKind::Const => {
        Some(ForInit::Decl(self.var_decl(true)?))
      }
      _ => Some(ForInit::Expr(self.expr([TokenKind::Semi, TokenKind::In])?)),
    };
    let of = self.is_of_keyword();
    if of || self.peek().kind == TokenKind::In {
      self.consume();
      let lhs = match init {
        Some(ForInit::Decl(decl)) => ForInLhs::Decl(decl),
        Some(ForInit::Expr(expr)) => ForInLhs::Expr(expr),
        None => return Err(t.error(SyntaxErrorType::ExpectedSyntax("for-in binding"))),
      };
      let rhs = self.expr([TokenKind::RParen])?;
      self.require_closer(TokenKind::RParen)?;
      let body = self.stmt()?;
      let loc = Loc(start.0, self.prev_end());
      return Ok(
        self
          .node(loc, ForInStmt {
            of,
            lhs,
            rhs,
            body,
          })
          .into_wrapped(),
      );
    };
    self.require(TokenKind::Semi)?;
    let condition = if self.peek().kind == TokenKind::Semi {
      None
    } else {
      Some(self.expr([TokenKind::Semi])?)
    };
    self.require(TokenKind::Semi)?;
    let post = if self.peek().kind == TokenKind::RParen {
      None
    } else {
      Some(self.expr([TokenKind::RParen])?)
    };
    self.require_closer(TokenKind::RParen)?;
    let body = self.stmt()?;
    let loc = Loc(start.0, self.prev_end());
    Ok(
      self
        .node(loc, ForStmt {
          init,
          condition,
          post,
          body,
        })
        .into_wrapped(),
    )
  }

  fn while_stmt(&mut self) -> SyntaxResult<Node<WhileStmt>> {
    self.with_loc(|p| {
      p.require(TokenKind::While)?;
      let condition = p.grouping()?;
      let body = p.stmt()?;
      Ok(WhileStmt { condition, body })
    })
  }

  fn do_while_stmt(&mut self) -> SyntaxResult<Node<DoWhileStmt>> {
    self.with_loc(|p| {
      p.require(TokenKind::Do)?;
      let body = p.stmt()?;
      p.require(TokenKind::While)?;
      let condition = p.grouping()?;
      // ASI always applies after `do ... while (...)`.
      let _ = p.consume_if(TokenKind::Semi);
      Ok(DoWhileStmt { body, condition })
    })
  }

  fn return_stmt(&mut self) -> SyntaxResult<Node<ReturnStmt>> {
    self.with_loc(|p| {
      p.require(TokenKind::Return)?;
      let t = p.peek();
      let value = if t.preceded_by_line_terminator
        || matches!(t.kind, TokenKind::Semi | TokenKind::RBrace | TokenKind::End)
      {
        None
      } else {
        Some(p.expr([TokenKind::Semi])?)
      };
      p.end_of_stmt()?;
      Ok(ReturnStmt { value })
    })
  }

  fn try_stmt(&mut self) -> SyntaxResult<Node<TryStmt>> {
    self.with_loc(|p| {
      let start = p.require(TokenKind::Try)?;
      let wrapped = p.block_stmt()?;
      let catch = if p.consume_if(TokenKind::Catch).is_match() {
        Some(p.with_loc(|p| {
          p.require(TokenKind::LParen)?;
          let parameter = Some(p.binding_ident()?);
          p.require(TokenKind::RParen)?;
          let body = p.block_stmt()?;
          Ok(CatchBlock { parameter, body })
        })?)
      } else {
        None
      };
      let finally = if p.consume_if(TokenKind::Finally).is_match() {
        Some(p.block_stmt()?)
      } else {
        None
      };
      if catch.is_none() && finally.is_none() {
        // Keep the statement; the block is still worth analysing.
        p.record_error(start.error(SyntaxErrorType::TryStatementHasNoCatchOrFinally));
      };
      Ok(TryStmt {
        wrapped,
        catch,
        finally,
      })
    })
  }

  fn switch_stmt(&mut self) -> SyntaxResult<Node<SwitchStmt>> {
    self.with_loc(|p| {
      p.require(TokenKind::Switch)?;
      let test = p.grouping()?;
      p.require(TokenKind::LBrace)?;
      let mut branches = Vec::new();
      loop {
        let t = p.peek();
        match t.kind {
          TokenKind::RBrace | TokenKind::End => break,
          TokenKind::Case | TokenKind::Default => {}
          _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("case or default"))),
        };
        let branch = p.with_loc(|p| {
          let case = if p.consume_if(TokenKind::Default).is_match() {
            None
          } else {
            p.require(TokenKind::Case)?;
            Some(p.expr([TokenKind::Colon])?)
          };
          p.require(TokenKind::Colon)?;
          let body = p.stmts_until(|kind| {
            matches!(kind, TokenKind::Case | TokenKind::Default | TokenKind::RBrace)
          });
          Ok(SwitchBranch { case, body })
        })?;
        branches.push(branch);
      }
      p.require_closer(TokenKind::RBrace)?;
      Ok(SwitchStmt { test, branches })
    })
  }
}
