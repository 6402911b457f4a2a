use super::Parser;
use crate::ast::expr::Expr;
use crate::ast::expr::FuncExpr;
use crate::ast::expr::IdExpr;
use crate::ast::expr::LitArrExpr;
use crate::ast::expr::LitBoolExpr;
use crate::ast::expr::LitNullExpr;
use crate::ast::expr::LitNumExpr;
use crate::ast::expr::LitObjExpr;
use crate::ast::expr::LitRegexExpr;
use crate::ast::expr::LitStrExpr;
use crate::ast::expr::LitTemplateExpr;
use crate::ast::expr::ObjKey;
use crate::ast::expr::ObjKeyKind;
use crate::ast::expr::ObjMember;
use crate::ast::expr::ObjMemberKind;
use crate::ast::node::Node;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::LexMode;
use crate::token::TokenKind;

/// Decodes the escapes of a string literal body (without quotes).
///
/// Malformed escapes are kept verbatim rather than rejected.
pub fn normalise_literal_string(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  let mut chars = raw.chars().peekable();
  while let Some(c) = chars.next() {
    if c != '\\' {
      out.push(c);
      continue;
    };
    let Some(escaped) = chars.next() else {
      break;
    };
    match escaped {
      'b' => out.push('\x08'),
      'f' => out.push('\x0c'),
      'n' => out.push('\n'),
      'r' => out.push('\r'),
      't' => out.push('\t'),
      'v' => out.push('\x0b'),
      '0' => out.push('\0'),
      // Line continuation.
      '\r' => {
        if chars.peek() == Some(&'\n') {
          chars.next();
        }
      }
      '\n' | '\u{2028}' | '\u{2029}' => {}
      'x' | 'u' => {
        let len = if escaped == 'x' { 2 } else { 4 };
        let hex: String = chars.clone().take(len).collect();
        match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
          Some(decoded) if hex.len() == len => {
            out.push(decoded);
            for _ in 0..len {
              chars.next();
            }
          }
          _ => out.push(escaped),
        };
      }
      other => out.push(other),
    };
  }
  out
}

impl<'a> Parser<'a> {
  pub fn lit_bool(&mut self) -> SyntaxResult<Node<LitBoolExpr>> {
    self.with_loc(|p| {
      let t = p.consume();
      match t.kind {
        TokenKind::True => Ok(LitBoolExpr { value: true }),
        TokenKind::False => Ok(LitBoolExpr { value: false }),
        _ => Err(t.error(SyntaxErrorType::ExpectedSyntax("boolean"))),
      }
    })
  }

  pub fn lit_null(&mut self) -> SyntaxResult<Node<LitNullExpr>> {
    self.with_loc(|p| {
      p.require(TokenKind::Null)?;
      Ok(LitNullExpr {})
    })
  }

  pub fn lit_num(&mut self) -> SyntaxResult<Node<LitNumExpr>> {
    self.with_loc(|p| {
      let t = p.require(TokenKind::Num)?;
      Ok(LitNumExpr {
        raw: p.string(t.loc),
      })
    })
  }

  pub fn lit_regex(&mut self) -> SyntaxResult<Node<LitRegexExpr>> {
    self.with_loc(|p| {
      let t = p.consume_with_mode(LexMode::SlashIsRegex);
      if t.kind != TokenKind::Regex {
        return Err(t.error(SyntaxErrorType::ExpectedSyntax("regular expression")));
      };
      Ok(LitRegexExpr {
        value: p.string(t.loc),
      })
    })
  }

  pub fn lit_str(&mut self) -> SyntaxResult<Node<LitStrExpr>> {
    self.with_loc(|p| {
      let t = p.require(TokenKind::Str)?;
      let raw = p.str(t.loc);
      Ok(LitStrExpr {
        value: normalise_literal_string(&raw[1..raw.len() - 1]),
      })
    })
  }

  pub fn lit_template(&mut self) -> SyntaxResult<Node<LitTemplateExpr>> {
    self.with_loc(|p| {
      let t = p.require(TokenKind::Template)?;
      Ok(LitTemplateExpr {
        raw: p.string(t.loc),
      })
    })
  }

  pub fn lit_arr(&mut self) -> SyntaxResult<Node<LitArrExpr>> {
    self.with_loc(|p| {
      p.require(TokenKind::LBracket)?;
      let mut elements = Vec::new();
      loop {
        if p.consume_if(TokenKind::RBracket).is_match() {
          break;
        };
        if p.peek().kind == TokenKind::End {
          p.require_closer(TokenKind::RBracket)?;
          break;
        };
        if p.consume_if(TokenKind::Comma).is_match() {
          elements.push(None);
          continue;
        };
        elements.push(Some(p.assignment_expr([TokenKind::Comma, TokenKind::RBracket])?));
        if !p.consume_if(TokenKind::Comma).is_match() {
          p.require_closer(TokenKind::RBracket)?;
          break;
        };
      }
      Ok(LitArrExpr { elements })
    })
  }

  pub fn obj_key(&mut self) -> SyntaxResult<Node<ObjKey>> {
    self.with_loc(|p| {
      let t = p.consume();
      let (kind, name) = match t.kind {
        kind if kind.is_word() => (ObjKeyKind::Ident, p.string(t.loc)),
        TokenKind::Str => {
          let raw = p.str(t.loc);
          (
            ObjKeyKind::Str,
            normalise_literal_string(&raw[1..raw.len() - 1]),
          )
        }
        TokenKind::Num => (ObjKeyKind::Num, p.string(t.loc)),
        _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("object key"))),
      };
      Ok(ObjKey { kind, name })
    })
  }

  fn obj_member(&mut self) -> SyntaxResult<Node<ObjMember>> {
    self.with_loc(|p| {
      let (t0, t1) = p.peek_2();
      let accessor = match (t0.kind, p.str(t0.loc)) {
        (TokenKind::Name, "get") => Some(ObjMemberKind::Getter),
        (TokenKind::Name, "set") => Some(ObjMemberKind::Setter),
        _ => None,
      }
      .filter(|_| {
        !matches!(
          t1.kind,
          TokenKind::Colon | TokenKind::LParen | TokenKind::Comma | TokenKind::RBrace
        )
      });
      if let Some(kind) = accessor {
        p.consume();
        let key = p.obj_key()?;
        let function = p.func_params_and_body()?;
        let loc = function.loc;
        let value = p
          .node(loc, FuncExpr {
            name: None,
            function,
          })
          .into_wrapped();
        return Ok(ObjMember { kind, key, value });
      };
      let key = p.obj_key()?;
      let value: Node<Expr> = if p.consume_if(TokenKind::Colon).is_match() {
        p.assignment_expr([TokenKind::Comma, TokenKind::RBrace])?
      } else {
        // Shorthand `{ a }`, which is also what a half-typed key looks like.
        let loc = key.loc;
        let name = key.stx.name.clone();
        p.node(loc, IdExpr { name }).into_wrapped()
      };
      Ok(ObjMember {
        kind: ObjMemberKind::Value,
        key,
        value,
      })
    })
  }

  pub fn lit_obj(&mut self) -> SyntaxResult<Node<LitObjExpr>> {
    self.with_loc(|p| {
      p.require(TokenKind::LBrace)?;
      let members = p.list(TokenKind::Comma, TokenKind::RBrace, |p| p.obj_member())?;
      Ok(LitObjExpr { members })
    })
  }
}

#[cfg(test)]
mod tests {
  use super::normalise_literal_string;

  #[test]
  fn decodes_escapes() {
    assert_eq!(normalise_literal_string(r"a\nb"), "a\nb");
    assert_eq!(normalise_literal_string(r"\x41B"), "AB");
    assert_eq!(normalise_literal_string(r"\'q\'"), "'q'");
    assert_eq!(normalise_literal_string(r"\xZZ"), "xZZ");
  }
}
