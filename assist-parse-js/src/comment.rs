use crate::loc::Loc;
use serde::Serialize;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
pub enum CommentKind {
  /// `// ...`, including the legacy `<!--` form.
  Line,
  /// `/* ... */`; `/** ... */` doc comments are a subset.
  Block,
}

/// A comment as it appears in the source, collected by the lexer in source order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Comment {
  pub loc: Loc,
  pub kind: CommentKind,
  /// The text between the delimiters. An unterminated block comment runs to the end of the source.
  pub body: String,
}

impl Comment {
  /// Whether this is a `/** ... */` documentation comment. The empty `/**/` is not one.
  pub fn is_doc(&self) -> bool {
    self.kind == CommentKind::Block && self.body.starts_with('*') && self.body != "*"
  }
}
