use crate::char::is_id_continue;
use crate::char::is_id_start;
use crate::char::is_line_terminator;
use crate::char::is_whitespace;
use crate::comment::Comment;
use crate::comment::CommentKind;
use crate::loc::Loc;
use crate::token::Token;
use crate::token::TokenKind;
use aho_corasick::AhoCorasick;
use aho_corasick::Anchored;
use aho_corasick::Input;
use aho_corasick::MatchKind;
use aho_corasick::StartKind;
use core::ops::Index;
use memchr::memchr2;
use memchr::memchr3;
use memchr::memmem;
use once_cell::sync::Lazy;

#[cfg(test)]
mod tests;

/// How to read a `/` that starts a token. Only the parser knows whether an operand or an operator comes next.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum LexMode {
  SlashIsRegex,
  Standard,
}

#[rustfmt::skip]
const PUNCTUATORS: &[(&str, TokenKind)] = &[
  ("{", TokenKind::LBrace), ("}", TokenKind::RBrace),
  ("(", TokenKind::LParen), (")", TokenKind::RParen),
  ("[", TokenKind::LBracket), ("]", TokenKind::RBracket),
  (";", TokenKind::Semi), (",", TokenKind::Comma), (":", TokenKind::Colon),
  (".", TokenKind::Dot), ("?", TokenKind::Question), ("~", TokenKind::BitNot),
  ("=", TokenKind::Assign), ("==", TokenKind::Eq), ("===", TokenKind::StrictEq),
  ("!", TokenKind::Not), ("!=", TokenKind::NotEq), ("!==", TokenKind::StrictNotEq),
  ("<", TokenKind::Lt), ("<=", TokenKind::LtEq), ("<<", TokenKind::Shl), ("<<=", TokenKind::ShlAssign),
  (">", TokenKind::Gt), (">=", TokenKind::GtEq), (">>", TokenKind::Shr), (">>=", TokenKind::ShrAssign),
  (">>>", TokenKind::UShr), (">>>=", TokenKind::UShrAssign),
  ("+", TokenKind::Plus), ("+=", TokenKind::AddAssign), ("++", TokenKind::Increment),
  ("-", TokenKind::Minus), ("-=", TokenKind::SubAssign), ("--", TokenKind::Decrement),
  ("*", TokenKind::Star), ("*=", TokenKind::MulAssign),
  ("/", TokenKind::Slash), ("/=", TokenKind::DivAssign),
  ("%", TokenKind::Percent), ("%=", TokenKind::RemAssign),
  ("&", TokenKind::BitAnd), ("&=", TokenKind::BitAndAssign), ("&&", TokenKind::And),
  ("|", TokenKind::BitOr), ("|=", TokenKind::BitOrAssign), ("||", TokenKind::Or),
  ("^", TokenKind::BitXor), ("^=", TokenKind::BitXorAssign),
];

// Leftmost-longest, so `>>>=` is never read as `>>` then `>=`.
static PUNCTUATOR_MATCHER: Lazy<Option<AhoCorasick>> = Lazy::new(|| {
  AhoCorasick::builder()
    .start_kind(StartKind::Anchored)
    .match_kind(MatchKind::LeftmostLongest)
    .build(PUNCTUATORS.iter().map(|&(text, _)| text))
    .ok()
});

pub struct Lexer<'a> {
  source: &'a str,
  next: usize,
  comments: Vec<Comment>,
}

impl<'a> Lexer<'a> {
  pub fn new(code: &'a str) -> Lexer<'a> {
    Lexer {
      source: code,
      next: 0,
      comments: Vec::new(),
    }
  }

  pub fn source_range(&self) -> Loc {
    Loc(0, self.source.len())
  }

  /// Moves to `next`, which must be a token boundary. The parser uses this to relex in a different mode.
  pub fn set_next(&mut self, next: usize) {
    self.next = next;
  }

  /// Comments seen so far, in source order.
  pub fn comments(&self) -> &[Comment] {
    &self.comments
  }

  pub fn take_comments(&mut self) -> Vec<Comment> {
    std::mem::take(&mut self.comments)
  }

  fn rest(&self) -> &'a str {
    &self.source[self.next..]
  }

  fn peek(&self) -> Option<char> {
    self.rest().chars().next()
  }

  fn bump(&mut self, len: usize) {
    self.next = (self.next + len).min(self.source.len());
  }

  fn bump_char(&mut self) {
    if let Some(c) = self.peek() {
      self.bump(c.len_utf8());
    };
  }

  fn to_end(&mut self) {
    self.next = self.source.len();
  }

  fn eat(&mut self, b: u8) -> bool {
    let found = self.rest().as_bytes().first() == Some(&b);
    if found {
      self.bump(1);
    };
    found
  }

  /// Consumes ASCII bytes matching `pred` and returns how many there were.
  fn eat_while(&mut self, pred: impl Fn(u8) -> bool) -> usize {
    let len = self.rest().bytes().take_while(|&b| pred(b)).count();
    self.bump(len);
    len
  }

  // Relexing after a mode change passes over the same comments again.
  fn record_comment(&mut self, comment: Comment) {
    if self
      .comments
      .last()
      .is_some_and(|last| last.loc.0 >= comment.loc.0)
    {
      return;
    };
    self.comments.push(comment);
  }

  /// Skips whitespace and comments and reports whether a line terminator was among them.
  fn skip_trivia(&mut self) -> bool {
    let mut newline = false;
    while let Some(c) = self.peek() {
      let rest = self.rest();
      if is_line_terminator(c) {
        newline = true;
        self.bump(c.len_utf8());
      } else if is_whitespace(c) {
        self.bump(c.len_utf8());
      } else if rest.starts_with("/*") {
        newline |= self.block_comment();
      } else if rest.starts_with("//") {
        self.line_comment(2);
      } else if rest.starts_with("<!--") {
        self.line_comment(4);
      } else {
        break;
      };
    }
    newline
  }

  fn block_comment(&mut self) -> bool {
    let start = self.next;
    let body_start = start + 2;
    let (body_end, end) = match memmem::find(self.source[body_start..].as_bytes(), b"*/") {
      Some(i) => (body_start + i, body_start + i + 2),
      None => (self.source.len(), self.source.len()),
    };
    let body = &self.source[body_start..body_end];
    self.next = end;
    self.record_comment(Comment {
      loc: Loc(start, end),
      kind: CommentKind::Block,
      body: body.to_string(),
    });
    body.contains(is_line_terminator)
  }

  fn line_comment(&mut self, prefix: usize) {
    let start = self.next;
    let body_start = start + prefix;
    // The line terminator stays, so the next token sees it.
    let end = memchr2(b'\n', b'\r', self.source[body_start..].as_bytes())
      .map_or(self.source.len(), |i| body_start + i);
    self.next = end;
    self.record_comment(Comment {
      loc: Loc(start, end),
      kind: CommentKind::Line,
      body: self.source[body_start..end].to_string(),
    });
  }

  fn token(&mut self, first: char, mode: LexMode) -> TokenKind {
    match first {
      '"' | '\'' => self.string(first as u8),
      '`' => self.template(),
      '0'..='9' => self.number(),
      '.' if self.rest().as_bytes().get(1).is_some_and(u8::is_ascii_digit) => self.number(),
      '/' if mode == LexMode::SlashIsRegex => self.regex(),
      c if is_id_start(c) => self.word(),
      _ => self.punctuator(first),
    }
  }

  fn word(&mut self) -> TokenKind {
    let start = self.next;
    let rest = self.rest();
    self.bump(rest.find(|c: char| !is_id_continue(c)).unwrap_or(rest.len()));
    TokenKind::keyword(&self.source[start..self.next]).unwrap_or(TokenKind::Name)
  }

  fn number(&mut self) -> TokenKind {
    if self.rest().starts_with("0x") || self.rest().starts_with("0X") {
      self.bump(2);
      return match self.eat_while(|b| b.is_ascii_hexdigit()) {
        0 => TokenKind::Invalid,
        _ => TokenKind::Num,
      };
    };
    self.eat_while(|b| b.is_ascii_digit());
    if self.eat(b'.') {
      self.eat_while(|b| b.is_ascii_digit());
    };
    if self.eat(b'e') || self.eat(b'E') {
      let _ = self.eat(b'+') || self.eat(b'-');
      if self.eat_while(|b| b.is_ascii_digit()) == 0 {
        return TokenKind::Invalid;
      };
    };
    TokenKind::Num
  }

  // A line break ends an unterminated string, so the lines after it still lex normally.
  fn string(&mut self, quote: u8) -> TokenKind {
    self.bump(1);
    loop {
      let rest = self.rest().as_bytes();
      let Some(i) = memchr3(quote, b'\\', b'\n', rest) else {
        self.to_end();
        return TokenKind::Invalid;
      };
      match rest[i] {
        b'\\' => {
          self.bump(i + 1);
          // A backslash before CRLF continues the string on the next line.
          if self.eat(b'\r') {
            self.eat(b'\n');
          } else {
            self.bump_char();
          };
        }
        b'\n' => {
          self.bump(i);
          return TokenKind::Invalid;
        }
        _ => {
          self.bump(i + 1);
          return TokenKind::Str;
        }
      };
    }
  }

  // Substitutions are not analysed, so the whole template is one opaque token.
  fn template(&mut self) -> TokenKind {
    self.bump(1);
    loop {
      let rest = self.rest().as_bytes();
      match memchr2(b'`', b'\\', rest) {
        None => {
          self.to_end();
          return TokenKind::Invalid;
        }
        Some(i) if rest[i] == b'\\' => {
          self.bump(i + 1);
          self.bump_char();
        }
        Some(i) => {
          self.bump(i + 1);
          return TokenKind::Template;
        }
      };
    }
  }

  fn regex(&mut self) -> TokenKind {
    self.bump(1);
    let mut in_class = false;
    while let Some(c) = self.peek() {
      if is_line_terminator(c) {
        return TokenKind::Invalid;
      };
      self.bump(c.len_utf8());
      match c {
        '\\' => match self.peek() {
          Some(escaped) if !is_line_terminator(escaped) => self.bump(escaped.len_utf8()),
          _ => return TokenKind::Invalid,
        },
        '[' => in_class = true,
        ']' => in_class = false,
        '/' if !in_class => {
          self.eat_while(|b| b.is_ascii_alphanumeric() || b == b'$' || b == b'_');
          return TokenKind::Regex;
        }
        _ => {}
      };
    }
    TokenKind::Invalid
  }

  fn punctuator(&mut self, first: char) -> TokenKind {
    let input = Input::new(self.rest()).anchored(Anchored::Yes);
    match PUNCTUATOR_MATCHER.as_ref().and_then(|m| m.find(input)) {
      Some(m) => {
        self.bump(m.end());
        PUNCTUATORS[m.pattern().as_usize()].1
      }
      // Always consume something so recovery makes progress.
      None => {
        self.bump(first.len_utf8());
        TokenKind::Invalid
      }
    }
  }
}

impl<'a> Index<Loc> for Lexer<'a> {
  type Output = str;

  fn index(&self, index: Loc) -> &Self::Output {
    &self.source[index.0..index.1]
  }
}

pub fn lex_next(lexer: &mut Lexer<'_>, mode: LexMode) -> Token {
  let preceded_by_line_terminator = lexer.skip_trivia();
  let start = lexer.next;
  let kind = match lexer.peek() {
    Some(first) => lexer.token(first, mode),
    None => TokenKind::End,
  };
  Token {
    loc: Loc(start, lexer.next),
    kind,
    preceded_by_line_terminator,
  }
}
