use crate::comment::CommentKind;
use crate::lex::lex_next;
use crate::lex::LexMode;
use crate::lex::Lexer;
use crate::loc::Loc;
use crate::token::TokenKind;
use crate::token::TokenKind::*;

fn check<const N: usize>(code: &str, expecteds: [TokenKind; N]) {
  let mut lexer = Lexer::new(code);
  for expected in expecteds {
    let t = lex_next(&mut lexer, LexMode::Standard);
    assert_eq!(t.kind, expected, "lexing {:?}", code);
  }
  let t = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(End, t.kind);
}

#[test]
fn test_lex_keywords() {
  check("function", [Function]);
  check("instanceof", [Instanceof]);
  check("instance", [Name]);
  check("typeofx", [Name]);
  check("true null", [True, Null]);
}

#[test]
fn test_lex_identifiers() {
  check("h929", [Name]);
  check("$el _x", [Name, Name]);
  check("café", [Name]);
  check("a\u{00A0}b", [Name, Name]);
}

#[test]
fn test_lex_literal_numbers() {
  check("1", [Num]);
  check(".929", [Num]);
  check("1.5e-3", [Num]);
  check("0xff", [Num]);
  check("0x", [Invalid]);
  check("1e", [Invalid]);
  check(". 929", [Dot, Num]);
}

#[test]
fn test_lex_literal_strings() {
  check("'hello world'", [Str]);
  check("\"a\\\"b\"", [Str]);
  check("'hello world\n'", [Invalid, Invalid]);
  check("'a\\\r\nb'", [Str]);
  check("`a ${b} c`", [Template]);
}

#[test]
fn test_lex_longest_punctuator() {
  check(">>>= >> >=", [UShrAssign, Shr, GtEq]);
  check("a===b", [Name, StrictEq, Name]);
  check("i++ + 1", [Name, Increment, Plus, Num]);
  check("#", [Invalid]);
}

#[test]
fn test_lex_member_access_chain() {
  check("foo.bar.", [Name, Dot, Name, Dot]);
}

#[test]
fn test_lex_regex_only_in_regex_mode() {
  let mut lexer = Lexer::new("/a[/]b+c/g.x");
  let t = lex_next(&mut lexer, LexMode::SlashIsRegex);
  assert_eq!(t.kind, Regex);
  assert_eq!(t.loc, Loc(0, 10));
  let mut lexer = Lexer::new("/ab");
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).kind, Slash);
  let mut lexer = Lexer::new("/ab\n/");
  assert_eq!(lex_next(&mut lexer, LexMode::SlashIsRegex).kind, Invalid);
}

#[test]
fn test_lex_collects_comments_once() {
  let mut lexer = Lexer::new("/** doc */ a // tail\nb");
  let a = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(a.kind, Name);
  // Relexing from the start must not duplicate the comment.
  lexer.set_next(0);
  lex_next(&mut lexer, LexMode::Standard);
  let b = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(b.kind, Name);
  assert!(b.preceded_by_line_terminator);
  let comments = lexer.comments();
  assert_eq!(comments.len(), 2);
  assert_eq!(comments[0].kind, CommentKind::Block);
  assert_eq!(comments[0].body, "* doc ");
  assert!(comments[0].is_doc());
  assert_eq!(comments[1].kind, CommentKind::Line);
  assert_eq!(comments[1].body, " tail");
}

#[test]
fn test_lex_line_break_inside_block_comment() {
  let mut lexer = Lexer::new("a /* x\n */ b /* y */ c");
  assert!(!lex_next(&mut lexer, LexMode::Standard).preceded_by_line_terminator);
  assert!(lex_next(&mut lexer, LexMode::Standard).preceded_by_line_terminator);
  assert!(!lex_next(&mut lexer, LexMode::Standard).preceded_by_line_terminator);
}

#[test]
fn test_lex_unterminated_block_comment() {
  let mut lexer = Lexer::new("a /* never closed");
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).kind, Name);
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).kind, End);
  assert_eq!(lexer.comments()[0].body, " never closed");
}
