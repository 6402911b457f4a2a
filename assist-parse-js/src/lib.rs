use ast::node::Node;
use ast::stx::TopLevel;
use comment::Comment;
use error::SyntaxError;
use lex::Lexer;
use parse::Parser;

pub mod ast;
pub mod char;
pub mod comment;
pub mod error;
pub mod jsdoc;
pub mod lex;
pub mod loc;
pub mod operator;
pub mod parse;
pub mod token;
pub mod walk;

/// The result of parsing a buffer, which always produces a tree.
pub struct Parsed {
  pub top_level: Node<TopLevel>,
  /// Every comment in source order.
  pub comments: Vec<Comment>,
  /// Errors that were recovered from. Statements they occurred in are missing from the tree.
  pub errors: Vec<SyntaxError>,
}

impl Parsed {
  pub fn has_errors(&self) -> bool {
    !self.errors.is_empty()
  }

  /// The doc comment that ends closest before `offset`, with only whitespace in between.
  pub fn doc_comment_before(&self, source: &str, offset: usize) -> Option<&Comment> {
    let idx = self.comments.partition_point(|c| c.loc.1 <= offset);
    let comment = self.comments.get(idx.checked_sub(1)?)?;
    if !comment.is_doc() {
      return None;
    };
    let gap = source.get(comment.loc.1..offset)?;
    gap.trim().is_empty().then_some(comment)
  }
}

/// Parses a possibly incomplete script. Syntax errors are recovered from and reported alongside the tree.
pub fn parse(source: &str) -> Parsed {
  let lexer = Lexer::new(source);
  let mut parser = Parser::new(lexer);
  let top_level = parser.parse_top_level();
  let (comments, errors) = parser.into_parts();
  Parsed {
    top_level,
    comments,
    errors,
  }
}
