use serde::Serialize;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
pub enum OperatorName {
  Addition,
  Assignment,
  AssignmentAddition,
  AssignmentBitwiseAnd,
  AssignmentBitwiseLeftShift,
  AssignmentBitwiseOr,
  AssignmentBitwiseRightShift,
  AssignmentBitwiseUnsignedRightShift,
  AssignmentBitwiseXor,
  AssignmentDivision,
  AssignmentMultiplication,
  AssignmentRemainder,
  AssignmentSubtraction,
  BitwiseAnd,
  BitwiseLeftShift,
  BitwiseNot,
  BitwiseOr,
  BitwiseRightShift,
  BitwiseUnsignedRightShift,
  BitwiseXor,
  Call,
  Comma,
  ComputedMemberAccess,
  Conditional,
  Delete,
  Division,
  Equality,
  GreaterThan,
  GreaterThanOrEqual,
  In,
  Inequality,
  Instanceof,
  LessThan,
  LessThanOrEqual,
  LogicalAnd,
  LogicalNot,
  LogicalOr,
  MemberAccess,
  Multiplication,
  New,
  PostfixDecrement,
  PostfixIncrement,
  PrefixDecrement,
  PrefixIncrement,
  Remainder,
  StrictEquality,
  StrictInequality,
  Subtraction,
  Typeof,
  UnaryNegation,
  UnaryPlus,
  Void,
}

impl OperatorName {
  pub fn is_assignment(self) -> bool {
    matches!(
      self,
      OperatorName::Assignment
        | OperatorName::AssignmentAddition
        | OperatorName::AssignmentBitwiseAnd
        | OperatorName::AssignmentBitwiseLeftShift
        | OperatorName::AssignmentBitwiseOr
        | OperatorName::AssignmentBitwiseRightShift
        | OperatorName::AssignmentBitwiseUnsignedRightShift
        | OperatorName::AssignmentBitwiseXor
        | OperatorName::AssignmentDivision
        | OperatorName::AssignmentMultiplication
        | OperatorName::AssignmentRemainder
        | OperatorName::AssignmentSubtraction
    )
  }

  pub fn is_comparison(self) -> bool {
    matches!(
      self,
      OperatorName::Equality
        | OperatorName::Inequality
        | OperatorName::StrictEquality
        | OperatorName::StrictInequality
        | OperatorName::GreaterThan
        | OperatorName::GreaterThanOrEqual
        | OperatorName::LessThan
        | OperatorName::LessThanOrEqual
        | OperatorName::In
        | OperatorName::Instanceof
    )
  }
}

/// Binding strength of an assignment, the loosest operator after the comma.
pub const PRECEDENCE_ASSIGNMENT: u8 = 2;

impl OperatorName {
  pub fn precedence(self) -> u8 {
    use OperatorName::*;
    match self {
      Comma => 1,
      Conditional => 3,
      LogicalOr => 4,
      LogicalAnd => 5,
      BitwiseOr => 6,
      BitwiseXor => 7,
      BitwiseAnd => 8,
      Equality | Inequality | StrictEquality | StrictInequality => 9,
      LessThan | LessThanOrEqual | GreaterThan | GreaterThanOrEqual | In | Instanceof => 10,
      BitwiseLeftShift | BitwiseRightShift | BitwiseUnsignedRightShift => 11,
      Addition | Subtraction => 12,
      Multiplication | Division | Remainder => 13,
      BitwiseNot | Delete | LogicalNot | PrefixDecrement | PrefixIncrement | Typeof
      | UnaryNegation | UnaryPlus | Void => 15,
      PostfixDecrement | PostfixIncrement => 16,
      New => 17,
      Call | ComputedMemberAccess | MemberAccess => 18,
      Assignment
      | AssignmentAddition
      | AssignmentBitwiseAnd
      | AssignmentBitwiseLeftShift
      | AssignmentBitwiseOr
      | AssignmentBitwiseRightShift
      | AssignmentBitwiseUnsignedRightShift
      | AssignmentBitwiseXor
      | AssignmentDivision
      | AssignmentMultiplication
      | AssignmentRemainder
      | AssignmentSubtraction => PRECEDENCE_ASSIGNMENT,
    }
  }

  /// Right-associative operators group `a = b = c` as `a = (b = c)`.
  pub fn is_right_associative(self) -> bool {
    use OperatorName::*;
    self.is_assignment()
      || matches!(
        self,
        Conditional
          | BitwiseNot
          | Delete
          | LogicalNot
          | New
          | PrefixDecrement
          | PrefixIncrement
          | Typeof
          | UnaryNegation
          | UnaryPlus
          | Void
      )
  }
}

#[cfg(test)]
mod tests {
  use super::OperatorName;

  #[test]
  fn test_precedence_order() {
    assert!(OperatorName::Multiplication.precedence() > OperatorName::Addition.precedence());
    assert!(OperatorName::LogicalAnd.precedence() > OperatorName::LogicalOr.precedence());
    assert_eq!(
      OperatorName::AssignmentBitwiseUnsignedRightShift.precedence(),
      OperatorName::Assignment.precedence()
    );
  }
}
