use super::operator::infix_operator;
use super::operator::prefix_operator;
use super::Parser;
use crate::ast::expr::BinaryExpr;
use crate::ast::expr::CallExpr;
use crate::ast::expr::ComputedMemberExpr;
use crate::ast::expr::CondExpr;
use crate::ast::expr::Expr;
use crate::ast::expr::IdExpr;
use crate::ast::expr::MemberExpr;
use crate::ast::expr::NewExpr;
use crate::ast::expr::ThisExpr;
use crate::ast::expr::UnaryExpr;
use crate::ast::expr::UnaryPostfixExpr;
use crate::ast::node::Node;
use crate::ast::stx::Ident;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::LexMode;
use crate::loc::Loc;
use crate::operator::OperatorName;
use crate::operator::PRECEDENCE_ASSIGNMENT;
use crate::token::TokenKind;

fn is_assignment_target(expr: &Node<Expr>) -> bool {
  matches!(
    *expr.stx,
    Expr::Id(_) | Expr::Member(_) | Expr::ComputedMember(_)
  )
}

impl<'a> Parser<'a> {
  pub fn expr<const N: usize>(
    &mut self,
    terminators: [TokenKind; N],
  ) -> SyntaxResult<Node<Expr>> {
    self.expr_with_min_prec(1, terminators)
  }

  /// An expression that stops before a top-level comma, e.g. an argument or initializer.
  pub fn assignment_expr<const N: usize>(
    &mut self,
    terminators: [TokenKind; N],
  ) -> SyntaxResult<Node<Expr>> {
    self.expr_with_min_prec(PRECEDENCE_ASSIGNMENT, terminators)
  }

  pub fn call_args(&mut self) -> SyntaxResult<Vec<Node<Expr>>> {
    self.list(TokenKind::Comma, TokenKind::RParen, |p| {
      p.assignment_expr([TokenKind::Comma, TokenKind::RParen])
    })
  }

  pub fn id_expr(&mut self) -> SyntaxResult<Node<IdExpr>> {
    let t = self.consume();
    if !t.kind.is_binding_name() {
      return Err(t.error(SyntaxErrorType::ExpectedSyntax("identifier")));
    };
    let name = self.string(t.loc);
    Ok(self.node(t.loc, IdExpr { name }))
  }

  /// Parses a parenthesised expression like `(a + b)`, returning the inner expression.
  pub fn grouping(&mut self) -> SyntaxResult<Node<Expr>> {
    self.require(TokenKind::LParen)?;
    let expr = self.expr([TokenKind::RParen])?;
    self.require_closer(TokenKind::RParen)?;
    Ok(expr)
  }

  /// Parses the property after an already consumed dot.
  ///
  /// A dot that is not followed by a name still yields a member expression, with no property, since that is exactly what the source looks like while a member is being typed.
  pub fn member_expr(&mut self, object: Node<Expr>, dot: Loc) -> Node<Expr> {
    let t = self.peek();
    // A keyword on the next line is far more likely the next statement than a property.
    let is_name =
      t.kind == TokenKind::Name || (t.kind.is_word() && !t.preceded_by_line_terminator);
    let property = if is_name {
      self.consume();
      let name = self.string(t.loc);
      Some(self.node(t.loc, Ident { name }))
    } else {
      None
    };
    let loc = (object.loc + dot).add_option(property.as_ref().map(|p| p.loc));
    self
      .node(loc, MemberExpr { object, property })
      .into_wrapped()
  }

  fn computed_member_expr(&mut self, object: Node<Expr>) -> SyntaxResult<Node<Expr>> {
    let member = self.expr([TokenKind::RBracket])?;
    let end = self.require_closer(TokenKind::RBracket)?;
    Ok(
      self
        .node(object.loc + end, ComputedMemberExpr { object, member })
        .into_wrapped(),
    )
  }

  pub fn new_expr(&mut self) -> SyntaxResult<Node<Expr>> {
    let start = self.require(TokenKind::New)?.loc;
    let mut callee = if self.peek().kind == TokenKind::New {
      self.new_expr()?
    } else {
      self.primary_expr()?
    };
    // The callee is a member chain; the first argument list belongs to `new`.
    loop {
      if let Some(dot) = self.consume_if(TokenKind::Dot).match_loc() {
        callee = self.member_expr(callee, dot);
      } else if self.consume_if(TokenKind::LBracket).is_match() {
        callee = self.computed_member_expr(callee)?;
      } else {
        break;
      };
    }
    let arguments = if self.consume_if(TokenKind::LParen).is_match() {
      self.call_args()?
    } else {
      Vec::new()
    };
    let loc = Loc(start.0, self.prev_end());
    Ok(self.node(loc, NewExpr { callee, arguments }).into_wrapped())
  }

  pub fn this_expr(&mut self) -> SyntaxResult<Node<ThisExpr>> {
    self.with_loc(|p| {
      p.require(TokenKind::This)?;
      Ok(ThisExpr {})
    })
  }

  pub fn primary_expr(&mut self) -> SyntaxResult<Node<Expr>> {
    let t = self.peek_with_mode(LexMode::SlashIsRegex);
    match t.kind {
      kind if kind.is_binding_name() => Ok(self.id_expr()?.into_wrapped()),
      TokenKind::This => Ok(self.this_expr()?.into_wrapped()),
      TokenKind::Function => Ok(self.func_expr()?.into_wrapped()),
      TokenKind::LBrace => Ok(self.lit_obj()?.into_wrapped()),
      TokenKind::LBracket => Ok(self.lit_arr()?.into_wrapped()),
      TokenKind::LParen => self.grouping(),
      TokenKind::True | TokenKind::False => Ok(self.lit_bool()?.into_wrapped()),
      TokenKind::Null => Ok(self.lit_null()?.into_wrapped()),
      TokenKind::Num => Ok(self.lit_num()?.into_wrapped()),
      TokenKind::Regex => Ok(self.lit_regex()?.into_wrapped()),
      TokenKind::Str => Ok(self.lit_str()?.into_wrapped()),
      TokenKind::Template => Ok(self.lit_template()?.into_wrapped()),
      TokenKind::End => Err(t.error(SyntaxErrorType::UnexpectedEnd)),
      TokenKind::Class => Err(t.error(SyntaxErrorType::UnsupportedSyntax("class"))),
      TokenKind::Import => Err(t.error(SyntaxErrorType::UnsupportedSyntax("import"))),
      _ => Err(t.error(SyntaxErrorType::ExpectedSyntax("expression operand"))),
    }
  }

  fn expr_operand<const N: usize>(
    &mut self,
    terminators: [TokenKind; N],
  ) -> SyntaxResult<Node<Expr>> {
    let t = self.peek_with_mode(LexMode::SlashIsRegex);
    if let Some(operator) = prefix_operator(t.kind) {
      return Ok(
        self
          .with_loc(|p| {
            p.consume_with_mode(LexMode::SlashIsRegex);
            let argument = p.expr_with_min_prec(operator.precedence(), terminators)?;
            Ok(UnaryExpr {
              operator,
              argument,
            })
          })?
          .into_wrapped(),
      );
    };
    if t.kind == TokenKind::New {
      return self.new_expr();
    };
    self.primary_expr()
  }

  pub fn expr_with_min_prec<const N: usize>(
    &mut self,
    min_prec: u8,
    terminators: [TokenKind; N],
  ) -> SyntaxResult<Node<Expr>> {
    let mut left = self.expr_operand(terminators)?;

    loop {
      let cp = self.checkpoint();
      let t = self.consume();

      if terminators.contains(&t.kind) {
        self.restore_checkpoint(cp);
        break;
      };

      // Automatic Semicolon Insertion rules: no newline between operand and postfix operator.
      if matches!(t.kind, TokenKind::Increment | TokenKind::Decrement)
        && !t.preceded_by_line_terminator
      {
        let operator_name = if t.kind == TokenKind::Increment {
          OperatorName::PostfixIncrement
        } else {
          OperatorName::PostfixDecrement
        };
        if operator_name.precedence() < min_prec {
          self.restore_checkpoint(cp);
          break;
        };
        left = self
          .node(left.loc + t.loc, UnaryPostfixExpr {
            operator: operator_name,
            argument: left,
          })
          .into_wrapped();
        continue;
      };

      let Some(operator) = infix_operator(t.kind) else {
        // Not an operator, so the expression ends here; the caller decides whether that is valid.
        self.restore_checkpoint(cp);
        break;
      };
      if operator.precedence() < min_prec {
        self.restore_checkpoint(cp);
        break;
      };

      let next_min_prec = operator.precedence() + u8::from(!operator.is_right_associative());

      left = match operator {
        OperatorName::Call => {
          let arguments = self.call_args()?;
          let loc = Loc(left.loc.0, self.prev_end());
          self
            .node(loc, CallExpr {
              callee: left,
              arguments,
            })
            .into_wrapped()
        }
        OperatorName::ComputedMemberAccess => self.computed_member_expr(left)?,
        OperatorName::MemberAccess => self.member_expr(left, t.loc),
        OperatorName::Conditional => {
          let consequent = self.assignment_expr([TokenKind::Colon])?;
          self.require(TokenKind::Colon)?;
          let alternate = self.expr_with_min_prec(PRECEDENCE_ASSIGNMENT, terminators)?;
          self
            .node(left.loc + alternate.loc, CondExpr {
              test: left,
              consequent,
              alternate,
            })
            .into_wrapped()
        }
        _ => {
          if operator.is_assignment() && !is_assignment_target(&left) {
            return Err(left.error(SyntaxErrorType::InvalidAssigmentTarget));
          };
          let right = self.expr_with_min_prec(next_min_prec, terminators)?;
          self
            .node(left.loc + right.loc, BinaryExpr {
              operator,
              left,
              right,
            })
            .into_wrapped()
        }
      };
    }

    Ok(left)
  }
}
