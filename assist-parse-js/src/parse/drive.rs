use super::Parser;
use crate::ast::node::Node;
use crate::ast::stmt::Stmt;
use crate::error::SyntaxResult;
use crate::token::TokenKind;
use derive_visitor::Drive;
use derive_visitor::DriveMut;

impl<'a> Parser<'a> {
  pub fn with_loc<S: Drive + DriveMut, F>(&mut self, f: F) -> SyntaxResult<Node<S>>
  where
    F: FnOnce(&mut Self) -> SyntaxResult<S>,
  {
    let start = self.checkpoint();
    let stx = f(self)?;
    let loc = self.since_checkpoint(&start);
    Ok(self.node(loc, stx))
  }

  /// Parse a list of items separated by a delimiter until `close`, which will also be consumed.
  /// Allows for a trailing delimiter, and for `close` to be missing at the end of input.
  pub fn list<S, F>(&mut self, delim: TokenKind, close: TokenKind, f: F) -> SyntaxResult<Vec<S>>
  where
    F: Fn(&mut Self) -> SyntaxResult<S>,
  {
    let mut items = Vec::new();
    loop {
      if self.peek().kind == TokenKind::End {
        self.require_closer(close)?;
        break;
      };
      if self.consume_if(close).is_match() {
        break;
      };
      items.push(f(self)?);
      if !self.consume_if(delim).is_match() {
        self.require_closer(close)?;
        break;
      }
    }
    Ok(items)
  }

  /// Parses statements until `stop` matches the next token, which is left unconsumed.
  ///
  /// A statement that fails to parse is recorded as an error and skipped, so one broken line does not discard the rest of the body.
  pub fn stmts_until<W>(&mut self, stop: W) -> Vec<Node<Stmt>>
  where
    W: Fn(TokenKind) -> bool,
  {
    let mut body = Vec::new();
    loop {
      let t = self.peek();
      if t.kind == TokenKind::End || stop(t.kind) {
        break;
      };
      let cp = self.checkpoint();
      match self.stmt() {
        Ok(stmt) => body.push(stmt),
        Err(err) => {
          self.record_error(err);
          self.restore_checkpoint(cp);
          self.skip_to_statement_boundary();
        }
      };
    }
    body
  }

  fn skip_to_statement_boundary(&mut self) {
    // Always make progress past the token that started the failed statement.
    let first = self.consume();
    if first.kind == TokenKind::Semi {
      return;
    };
    loop {
      let t = self.peek();
      match t.kind {
        TokenKind::End | TokenKind::RBrace => break,
        TokenKind::Semi => {
          self.consume();
          break;
        }
        _ if t.preceded_by_line_terminator => break,
        _ => {
          self.consume();
        }
      };
    }
  }
}
