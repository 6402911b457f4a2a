use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::loc::Loc;
use serde::Serialize;

/// What a token is. Trivia (whitespace and comments) never becomes a token.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub enum TokenKind {
  End,
  // Source the lexer could not make sense of, such as an unterminated string.
  Invalid,
  Name,

  // Literals.
  False,
  Null,
  Num,
  Regex,
  Str,
  Template,
  True,

  // Keywords, including the reserved words the parser rejects with a clearer message.
  Break,
  Case,
  Catch,
  Class,
  Const,
  Continue,
  Debugger,
  Default,
  Delete,
  Do,
  Else,
  Export,
  Extends,
  Finally,
  For,
  Function,
  If,
  Import,
  In,
  Instanceof,
  Let,
  New,
  Return,
  Super,
  Switch,
  This,
  Throw,
  Try,
  Typeof,
  Var,
  Void,
  While,
  With,

  // Brackets and separators.
  Colon,
  Comma,
  Dot,
  LBrace,
  LBracket,
  LParen,
  Question,
  RBrace,
  RBracket,
  RParen,
  Semi,

  // Operators.
  And,
  BitAnd,
  BitNot,
  BitOr,
  BitXor,
  Decrement,
  Eq,
  Gt,
  GtEq,
  Increment,
  Lt,
  LtEq,
  Minus,
  Not,
  NotEq,
  Or,
  Percent,
  Plus,
  Shl,
  Shr,
  Slash,
  Star,
  StrictEq,
  StrictNotEq,
  UShr,

  // Assignments.
  AddAssign,
  Assign,
  BitAndAssign,
  BitOrAssign,
  BitXorAssign,
  DivAssign,
  MulAssign,
  RemAssign,
  ShlAssign,
  ShrAssign,
  SubAssign,
  UShrAssign,
}

impl TokenKind {
  /// The keyword spelled by `word`, if any. `true`, `false` and `null` count as keywords.
  pub fn keyword(word: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match word {
      "break" => Break,
      "case" => Case,
      "catch" => Catch,
      "class" => Class,
      "const" => Const,
      "continue" => Continue,
      "debugger" => Debugger,
      "default" => Default,
      "delete" => Delete,
      "do" => Do,
      "else" => Else,
      "export" => Export,
      "extends" => Extends,
      "false" => False,
      "finally" => Finally,
      "for" => For,
      "function" => Function,
      "if" => If,
      "import" => Import,
      "in" => In,
      "instanceof" => Instanceof,
      "let" => Let,
      "new" => New,
      "null" => Null,
      "return" => Return,
      "super" => Super,
      "switch" => Switch,
      "this" => This,
      "throw" => Throw,
      "true" => True,
      "try" => Try,
      "typeof" => Typeof,
      "var" => Var,
      "void" => Void,
      "while" => While,
      "with" => With,
      _ => return None,
    })
  }

  /// Whether this token is spelled like a name, so it can follow a dot or be an object key.
  pub fn is_word(self) -> bool {
    use TokenKind::*;
    matches!(
      self,
      Name
        | False
        | Null
        | True
        | Break
        | Case
        | Catch
        | Class
        | Const
        | Continue
        | Debugger
        | Default
        | Delete
        | Do
        | Else
        | Export
        | Extends
        | Finally
        | For
        | Function
        | If
        | Import
        | In
        | Instanceof
        | Let
        | New
        | Return
        | Super
        | Switch
        | This
        | Throw
        | Try
        | Typeof
        | Var
        | Void
        | While
        | With
    )
  }

  /// Whether this token can name a variable or parameter. `let` is only reserved in strict code.
  pub fn is_binding_name(self) -> bool {
    matches!(self, TokenKind::Name | TokenKind::Let)
  }
}

#[derive(Clone, Debug)]
pub struct Token {
  pub loc: Loc,
  /// Whether a line terminator appears between the previous token and this one, including inside a block comment.
  pub preceded_by_line_terminator: bool,
  pub kind: TokenKind,
}

impl Token {
  pub fn error(&self, typ: SyntaxErrorType) -> SyntaxError {
    self.loc.error(typ, Some(self.kind))
  }
}
