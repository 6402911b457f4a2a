//! Closure-style JSDoc tags and type expressions.
//!
//! Only the tags that carry types are understood: `@type`, `@param`, `@return` and `@returns`. Everything else in a doc comment is prose.

use serde::Serialize;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum TypeExpr {
  /// `*`, or a bare `?`.
  Any,
  /// A possibly dotted name like `String` or `ns.Widget`.
  Name(String),
  /// `Array.<T>`, `Array<T>`, `Object<K, V>` and the `T[]` shorthand (as `Array`).
  Generic { base: String, args: Vec<TypeExpr> },
  /// `{a: T, b}`. A field without a type is unknown.
  Record(Vec<(String, Option<TypeExpr>)>),
  Function {
    params: Vec<TypeExpr>,
    /// `new:T` marks a constructor producing `T`.
    new: Option<Box<TypeExpr>>,
    this: Option<Box<TypeExpr>>,
    ret: Option<Box<TypeExpr>>,
  },
  Union(Vec<TypeExpr>),
  /// `T=`.
  Optional(Box<TypeExpr>),
  /// `...T`.
  Rest(Box<TypeExpr>),
}

impl TypeExpr {
  /// Strips optional and rest markers, which don't change what a value looks like once it's there.
  pub fn unwrap_modifiers(&self) -> &TypeExpr {
    match self {
      TypeExpr::Optional(t) | TypeExpr::Rest(t) => t.unwrap_modifiers(),
      t => t,
    }
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JsdocError {
  #[error("expected {expected} at offset {offset} in type `{source_text}`")]
  Expected {
    expected: &'static str,
    offset: usize,
    source_text: String,
  },
  #[error("unterminated type for @{tag}")]
  UnterminatedType { tag: String },
  #[error("missing parameter name for @param")]
  MissingParamName,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocParam {
  pub name: String,
  pub typ: TypeExpr,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DocComment {
  /// From `@type`.
  pub typ: Option<TypeExpr>,
  pub params: Vec<DocParam>,
  /// From `@return` or `@returns`.
  pub returns: Option<TypeExpr>,
}

impl DocComment {
  pub fn param(&self, name: &str) -> Option<&TypeExpr> {
    self.params.iter().find(|p| p.name == name).map(|p| &p.typ)
  }

  pub fn is_empty(&self) -> bool {
    self.typ.is_none() && self.params.is_empty() && self.returns.is_none()
  }
}

/// Takes the text between `/*` and `*/`, i.e. what [`Comment::body`](crate::comment::Comment) holds.
pub fn parse_doc_comment(body: &str) -> Result<DocComment, JsdocError> {
  let mut doc = DocComment::default();
  let mut rest = body;
  while let Some(at) = rest.find('@') {
    rest = &rest[at + 1..];
    let tag_len = rest
      .find(|c: char| !c.is_ascii_alphanumeric())
      .unwrap_or(rest.len());
    let tag = &rest[..tag_len];
    rest = &rest[tag_len..];
    if !matches!(tag, "type" | "param" | "return" | "returns") {
      continue;
    };
    let trimmed = rest.trim_start_matches(is_doc_space);
    if !trimmed.starts_with('{') {
      // Untyped tag, e.g. `@param name`.
      continue;
    };
    let (type_text, after) = braced(trimmed).ok_or_else(|| JsdocError::UnterminatedType {
      tag: tag.to_string(),
    })?;
    let typ = parse_type_expr(type_text)?;
    rest = after;
    match tag {
      "type" => doc.typ = Some(typ),
      "param" => {
        let name = param_name(rest).ok_or(JsdocError::MissingParamName)?;
        doc.params.push(DocParam {
          name: name.to_string(),
          typ,
        });
      }
      _ => doc.returns = Some(typ),
    };
  }
  Ok(doc)
}

fn is_doc_space(c: char) -> bool {
  c.is_whitespace() || c == '*'
}

// Splits `{...} rest` into the inside of the braces and the rest, honouring nested braces.
fn braced(text: &str) -> Option<(&str, &str)> {
  let mut depth = 0usize;
  for (i, c) in text.char_indices() {
    match c {
      '{' => depth += 1,
      '}' => {
        depth -= 1;
        if depth == 0 {
          return Some((&text[1..i], &text[i + 1..]));
        };
      }
      _ => {}
    };
  }
  None
}

// `name`, `[name]` or `[name=default]`.
fn param_name(text: &str) -> Option<&str> {
  let text = text.trim_start_matches(is_doc_space);
  let text = text.strip_prefix('[').unwrap_or(text);
  let end = text
    .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$' || c == '.'))
    .unwrap_or(text.len());
  (end > 0).then(|| &text[..end])
}

pub fn parse_type_expr(text: &str) -> Result<TypeExpr, JsdocError> {
  let mut p = TypeParser { text, pos: 0 };
  let t = p.union(false)?;
  p.skip_ws();
  if p.pos < text.len() {
    return Err(p.expected("end of type"));
  };
  Ok(t)
}

struct TypeParser<'a> {
  text: &'a str,
  pos: usize,
}

impl<'a> TypeParser<'a> {
  fn expected(&self, expected: &'static str) -> JsdocError {
    JsdocError::Expected {
      expected,
      offset: self.pos,
      source_text: self.text.to_string(),
    }
  }

  fn rest(&self) -> &'a str {
    &self.text[self.pos..]
  }

  fn skip_ws(&mut self) {
    let rest = self.rest();
    self.pos += rest.len() - rest.trim_start().len();
  }

  fn peek(&mut self) -> Option<char> {
    self.skip_ws();
    self.rest().chars().next()
  }

  fn eat(&mut self, s: &str) -> bool {
    self.skip_ws();
    if self.rest().starts_with(s) {
      self.pos += s.len();
      true
    } else {
      false
    }
  }

  fn require(&mut self, s: &'static str) -> Result<(), JsdocError> {
    if self.eat(s) {
      Ok(())
    } else {
      Err(self.expected(s))
    }
  }

  fn name_part(&mut self) -> Option<&'a str> {
    self.skip_ws();
    let rest = self.rest();
    let len = rest
      .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
      .unwrap_or(rest.len());
    if len == 0 {
      return None;
    };
    self.pos += len;
    Some(&rest[..len])
  }

  fn union(&mut self, parenthesised: bool) -> Result<TypeExpr, JsdocError> {
    let mut members = vec![self.modified()?];
    while self.eat("|") {
      members.push(self.modified()?);
    }
    if parenthesised {
      self.require(")")?;
    };
    Ok(if members.len() == 1 {
      members.remove(0)
    } else {
      TypeExpr::Union(members)
    })
  }

  fn at_type_end(&mut self) -> bool {
    matches!(
      self.peek(),
      None | Some(',' | ')' | '>' | '}' | '|' | '=' | ']')
    )
  }

  fn modified(&mut self) -> Result<TypeExpr, JsdocError> {
    if self.eat("...") {
      return Ok(TypeExpr::Rest(Box::new(self.modified()?)));
    };
    if self.eat("?") || self.eat("!") {
      // A bare `?` is the unknown type; otherwise nullability is ignored.
      if self.at_type_end() {
        return self.optional(TypeExpr::Any);
      };
      return self.modified();
    };
    let t = self.primary()?;
    // Postfix nullability, e.g. `string?`.
    let _ = self.eat("?") || self.eat("!");
    self.optional(t)
  }

  fn optional(&mut self, t: TypeExpr) -> Result<TypeExpr, JsdocError> {
    Ok(if self.eat("=") {
      TypeExpr::Optional(Box::new(t))
    } else {
      t
    })
  }

  fn primary(&mut self) -> Result<TypeExpr, JsdocError> {
    let mut t = match self.peek() {
      Some('*') => {
        self.pos += 1;
        TypeExpr::Any
      }
      Some('(') => {
        self.pos += 1;
        self.union(true)?
      }
      Some('{') => {
        self.pos += 1;
        self.record()?
      }
      _ => {
        let first = self.name_part().ok_or_else(|| self.expected("type"))?;
        if first == "function" && self.peek() == Some('(') {
          self.function()?
        } else {
          self.named(first)?
        }
      }
    };
    while self.eat("[]") {
      t = TypeExpr::Generic {
        base: "Array".to_string(),
        args: vec![t],
      };
    }
    Ok(t)
  }

  fn named(&mut self, first: &str) -> Result<TypeExpr, JsdocError> {
    let mut name = first.to_string();
    loop {
      if self.eat(".<") || self.eat("<") {
        let mut args = vec![self.union(false)?];
        while self.eat(",") {
          args.push(self.union(false)?);
        }
        self.require(">")?;
        return Ok(TypeExpr::Generic { base: name, args });
      };
      if !self.eat(".") {
        break;
      };
      let part = self.name_part().ok_or_else(|| self.expected("name"))?;
      name.push('.');
      name.push_str(part);
    }
    Ok(TypeExpr::Name(name))
  }

  fn record(&mut self) -> Result<TypeExpr, JsdocError> {
    let mut fields = Vec::new();
    loop {
      if self.eat("}") {
        break;
      };
      let key = self.name_part().ok_or_else(|| self.expected("field name"))?;
      let typ = if self.eat(":") {
        Some(self.union(false)?)
      } else {
        None
      };
      fields.push((key.to_string(), typ));
      if !self.eat(",") {
        self.require("}")?;
        break;
      };
    }
    Ok(TypeExpr::Record(fields))
  }

  fn function(&mut self) -> Result<TypeExpr, JsdocError> {
    self.require("(")?;
    let mut params = Vec::new();
    let mut new = None;
    let mut this = None;
    loop {
      if self.eat(")") {
        break;
      };
      if self.eat("new:") {
        new = Some(Box::new(self.union(false)?));
      } else if self.eat("this:") {
        this = Some(Box::new(self.union(false)?));
      } else {
        params.push(self.union(false)?);
      };
      if !self.eat(",") {
        self.require(")")?;
        break;
      };
    }
    let ret = if self.eat(":") {
      Some(Box::new(self.union(false)?))
    } else {
      None
    };
    Ok(TypeExpr::Function {
      params,
      new,
      this,
      ret,
    })
  }
}
