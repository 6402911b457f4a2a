use crate::ast::node::Node;
use crate::ast::node::NodeId;
use crate::ast::stx::TopLevel;
use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::lex_next;
use crate::lex::LexMode;
use crate::lex::Lexer;
use crate::loc::Loc;
use crate::token::Token;
use crate::token::TokenKind;
use derive_visitor::Drive;
use derive_visitor::DriveMut;

pub mod drive;
pub mod expr;
pub mod func;
pub mod lit;
pub mod operator;
pub mod stmt;

#[derive(Debug)]
#[must_use]
pub struct MaybeToken {
  expected: TokenKind,
  loc: Loc,
  matched: bool,
}

impl MaybeToken {
  pub fn is_match(&self) -> bool {
    self.matched
  }

  pub fn match_loc(&self) -> Option<Loc> {
    if self.matched {
      Some(self.loc)
    } else {
      None
    }
  }

  pub fn error(&self, err: SyntaxErrorType) -> SyntaxError {
    debug_assert!(!self.matched);
    self.loc.error(err, Some(self.expected))
  }
}

pub struct ParserCheckpoint {
  next_tok_i: usize,
}

struct BufferedToken {
  token: Token,
  lex_mode: LexMode,
}

pub struct Parser<'a> {
  lexer: Lexer<'a>,
  buf: Vec<BufferedToken>,
  next_tok_i: usize,
  next_node_id: u32,
  // Errors recovered from; parsing carries on after each one.
  errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
  pub fn new(lexer: Lexer<'a>) -> Parser<'a> {
    Parser {
      lexer,
      buf: Vec::new(),
      next_tok_i: 0,
      next_node_id: 0,
      errors: Vec::new(),
    }
  }

  pub fn source_range(&self) -> Loc {
    self.lexer.source_range()
  }

  pub fn str(&self, loc: Loc) -> &str {
    &self.lexer[loc]
  }

  pub fn string(&self, loc: Loc) -> String {
    self.str(loc).to_string()
  }

  pub fn into_parts(mut self) -> (Vec<crate::comment::Comment>, Vec<SyntaxError>) {
    (self.lexer.take_comments(), self.errors)
  }

  pub fn record_error(&mut self, err: SyntaxError) {
    self.errors.push(err);
  }

  pub fn node_id(&mut self) -> NodeId {
    let id = NodeId(self.next_node_id);
    self.next_node_id += 1;
    id
  }

  pub fn node<S: Drive + DriveMut>(&mut self, loc: Loc, stx: S) -> Node<S> {
    let id = self.node_id();
    Node::new(id, loc, stx)
  }

  pub fn checkpoint(&self) -> ParserCheckpoint {
    ParserCheckpoint {
      next_tok_i: self.next_tok_i,
    }
  }

  /// The range covered by tokens consumed since the checkpoint, or an empty range at the next token if none were.
  pub fn since_checkpoint(&mut self, checkpoint: &ParserCheckpoint) -> Loc {
    if self.next_tok_i <= checkpoint.next_tok_i {
      return Loc::at(self.peek().loc.0);
    };
    Loc(
      self.buf[checkpoint.next_tok_i].token.loc.0,
      self.buf[self.next_tok_i - 1].token.loc.1,
    )
  }

  pub fn restore_checkpoint(&mut self, checkpoint: ParserCheckpoint) {
    self.next_tok_i = checkpoint.next_tok_i;
  }

  fn reset_to(&mut self, n: usize) {
    self.next_tok_i = n;
    self.buf.truncate(n);
    match self.buf.last() {
      Some(t) => self.lexer.set_next(t.token.loc.1),
      None => self.lexer.set_next(0),
    };
  }

  fn forward<K: FnOnce(&Token) -> bool>(&mut self, mode: LexMode, keep: K) -> (bool, Token) {
    if self
      .buf
      .get(self.next_tok_i)
      .is_some_and(|t| t.lex_mode != mode)
    {
      self.reset_to(self.next_tok_i);
    }
    assert!(self.buf.len() >= self.next_tok_i);
    if self.buf.len() == self.next_tok_i {
      let token = lex_next(&mut self.lexer, mode);
      self.buf.push(BufferedToken {
        token,
        lex_mode: mode,
      });
    }
    let t = self.buf[self.next_tok_i].token.clone();
    let k = keep(&t);
    if k {
      self.next_tok_i += 1;
    };
    (k, t)
  }

  pub fn consume_with_mode(&mut self, mode: LexMode) -> Token {
    self.forward(mode, |_| true).1
  }

  pub fn consume(&mut self) -> Token {
    self.consume_with_mode(LexMode::Standard)
  }

  pub fn peek_with_mode(&mut self, mode: LexMode) -> Token {
    self.forward(mode, |_| false).1
  }

  pub fn peek(&mut self) -> Token {
    self.peek_with_mode(LexMode::Standard)
  }

  pub fn peek_2(&mut self) -> (Token, Token) {
    let cp = self.checkpoint();
    let a = self.forward(LexMode::Standard, |_| true);
    let b = self.forward(LexMode::Standard, |_| true);
    self.restore_checkpoint(cp);
    (a.1, b.1)
  }

  pub fn consume_if(&mut self, kind: TokenKind) -> MaybeToken {
    let (matched, t) = self.forward(LexMode::Standard, |t| t.kind == kind);
    MaybeToken {
      expected: kind,
      matched,
      loc: t.loc,
    }
  }

  pub fn require(&mut self, kind: TokenKind) -> SyntaxResult<Token> {
    let t = self.consume();
    if t.kind != kind {
      Err(t.error(SyntaxErrorType::RequiredTokenNotFound(kind)))
    } else {
      Ok(t)
    }
  }

  /// Requires a closing bracket, except at the end of input where it is assumed.
  ///
  /// Code being edited is usually unfinished, and completing inside `foo(bar.` must still see the call.
  /// The EOF token is consumed in that case so every enclosing node's range extends to the end of the source.
  pub fn require_closer(&mut self, kind: TokenKind) -> SyntaxResult<Loc> {
    let t = self.peek();
    if t.kind == TokenKind::End {
      return Ok(self.consume().loc);
    };
    Ok(self.require(kind)?.loc)
  }

  /// End offset of the most recently consumed token.
  pub fn prev_end(&self) -> usize {
    self
      .next_tok_i
      .checked_sub(1)
      .map(|i| self.buf[i].token.loc.1)
      .unwrap_or(0)
  }

  pub fn parse_top_level(&mut self) -> Node<TopLevel> {
    let body = self.stmts_until(|kind| kind == TokenKind::End);
    // The program spans the whole source, including trailing whitespace and comments.
    let loc = self.source_range();
    self.node(loc, TopLevel { body })
  }
}
