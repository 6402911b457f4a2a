use crate::loc::Loc;
use crate::token::TokenKind;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Formatter;
use std::error::Error;
use std::fmt::Display;

/// A stable classification of syntax errors produced by the parser.
///
/// Diagnostic codes (prefix `PS`) are assigned per variant and are stable:
/// - `PS0001`: [`SyntaxErrorType::ExpectedNotFound`]
/// - `PS0002`: [`SyntaxErrorType::ExpectedSyntax`]
/// - `PS0003`: [`SyntaxErrorType::InvalidAssigmentTarget`]
/// - `PS0004`: [`SyntaxErrorType::LineTerminatorInRegex`]
/// - `PS0005`: [`SyntaxErrorType::LineTerminatorInString`]
/// - `PS0006`: [`SyntaxErrorType::RequiredTokenNotFound`]
/// - `PS0007`: [`SyntaxErrorType::TryStatementHasNoCatchOrFinally`]
/// - `PS0008`: [`SyntaxErrorType::UnexpectedEnd`]
/// - `PS0009`: [`SyntaxErrorType::UnsupportedSyntax`]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SyntaxErrorType {
  ExpectedNotFound,
  ExpectedSyntax(&'static str),
  InvalidAssigmentTarget,
  LineTerminatorInRegex,
  LineTerminatorInString,
  RequiredTokenNotFound(TokenKind),
  TryStatementHasNoCatchOrFinally,
  UnexpectedEnd,
  UnsupportedSyntax(&'static str),
}

#[derive(Clone)]
pub struct SyntaxError {
  pub typ: SyntaxErrorType,
  pub loc: Loc,
  pub actual_token: Option<TokenKind>,
}

impl SyntaxError {
  pub fn new(typ: SyntaxErrorType, loc: Loc, actual_token: Option<TokenKind>) -> SyntaxError {
    SyntaxError {
      typ,
      loc,
      actual_token,
    }
  }

  pub fn code(&self) -> &'static str {
    self.typ.code()
  }

  pub fn message(&self) -> String {
    self.typ.message(self.actual_token)
  }
}

impl Debug for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} around loc [{}:{}]", self, self.loc.0, self.loc.1)
  }
}

impl Display for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{:?} [token={:?}]", self.typ, self.actual_token)
  }
}

impl Error for SyntaxError {}

impl PartialEq for SyntaxError {
  fn eq(&self, other: &Self) -> bool {
    self.typ == other.typ
  }
}

impl Eq for SyntaxError {}

pub type SyntaxResult<T> = Result<T, SyntaxError>;

impl SyntaxErrorType {
  /// Stable diagnostic code for this syntax error variant.
  pub fn code(&self) -> &'static str {
    match self {
      SyntaxErrorType::ExpectedNotFound => "PS0001",
      SyntaxErrorType::ExpectedSyntax(_) => "PS0002",
      SyntaxErrorType::InvalidAssigmentTarget => "PS0003",
      SyntaxErrorType::LineTerminatorInRegex => "PS0004",
      SyntaxErrorType::LineTerminatorInString => "PS0005",
      SyntaxErrorType::RequiredTokenNotFound(_) => "PS0006",
      SyntaxErrorType::TryStatementHasNoCatchOrFinally => "PS0007",
      SyntaxErrorType::UnexpectedEnd => "PS0008",
      SyntaxErrorType::UnsupportedSyntax(_) => "PS0009",
    }
  }

  /// Human-readable message describing this syntax error.
  pub fn message(&self, actual_token: Option<TokenKind>) -> String {
    match self {
      SyntaxErrorType::ExpectedNotFound => "expected token not found".into(),
      SyntaxErrorType::ExpectedSyntax(expected) => format!("expected {}", expected),
      SyntaxErrorType::InvalidAssigmentTarget => "invalid assignment target".into(),
      SyntaxErrorType::LineTerminatorInRegex => {
        "line terminator not allowed in regular expression".into()
      }
      SyntaxErrorType::LineTerminatorInString => {
        "line terminator not allowed in string literal".into()
      }
      SyntaxErrorType::RequiredTokenNotFound(token) => format!("expected token {:?}", token),
      SyntaxErrorType::TryStatementHasNoCatchOrFinally => {
        "try statement requires a catch or finally block".into()
      }
      SyntaxErrorType::UnexpectedEnd => actual_token
        .map(|tok| format!("unexpected end before {:?}", tok))
        .unwrap_or_else(|| "unexpected end of input".into()),
      SyntaxErrorType::UnsupportedSyntax(what) => format!("{} is not supported", what),
    }
  }
}
