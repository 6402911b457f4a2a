use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::token::TokenKind;
use serde::Deserialize;
use serde::Serialize;
use std::cmp::max;
use std::cmp::min;
use std::ops::Add;
use std::ops::AddAssign;

/// A half-open range of UTF-8 byte offsets within the source file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Loc(pub usize, pub usize);

impl Loc {
  /// Creates an empty location at `offset`, used for nodes synthesised during error recovery.
  pub fn at(offset: usize) -> Loc {
    Loc(offset, offset)
  }

  pub fn error(self, typ: SyntaxErrorType, actual_token: Option<TokenKind>) -> SyntaxError {
    SyntaxError::new(typ, self, actual_token)
  }

  pub fn is_empty(&self) -> bool {
    self.0 >= self.1
  }

  pub fn len(&self) -> usize {
    self.1.saturating_sub(self.0)
  }

  /// Whether `offset` is strictly inside or at either boundary.
  ///
  /// Completion offsets sit between characters, so a cursor right after `foo` is still "on" `foo`.
  pub fn touches(&self, offset: usize) -> bool {
    self.0 <= offset && offset <= self.1
  }

  /// Whether `offset` falls after the start and at or before the end.
  pub fn contains_after_start(&self, offset: usize) -> bool {
    self.0 < offset && offset <= self.1
  }

  pub fn extend(&mut self, other: Loc) {
    self.0 = min(self.0, other.0);
    self.1 = max(self.1, other.1);
  }

  pub fn add_option(self, rhs: Option<Loc>) -> Loc {
    let mut new = self;
    if let Some(rhs) = rhs {
      new.extend(rhs);
    };
    new
  }
}

impl Add for Loc {
  type Output = Loc;

  fn add(self, rhs: Self) -> Self::Output {
    let mut new = self;
    new.extend(rhs);
    new
  }
}

impl AddAssign for Loc {
  fn add_assign(&mut self, rhs: Self) {
    self.extend(rhs);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn add_spans_both_locations() {
    assert_eq!(Loc(4, 6) + Loc(1, 2), Loc(1, 6));
    assert_eq!(Loc(3, 3).add_option(None), Loc(3, 3));
  }

  #[test]
  fn touches_includes_both_boundaries() {
    let loc = Loc(2, 5);
    assert!(loc.touches(2));
    assert!(loc.touches(5));
    assert!(!loc.touches(6));
    assert!(!loc.contains_after_start(2));
    assert!(loc.contains_after_start(5));
  }
}
