use crate::operator::OperatorName;
use crate::token::TokenKind;

/// The operator a token starts when it follows an operand.
///
/// `(`, `[` and `.` are included since calls and member accesses are parsed as postfix operators. Postfix `++` and `--` are not, as they depend on line breaks.
pub fn infix_operator(kind: TokenKind) -> Option<OperatorName> {
  use OperatorName::*;
  Some(match kind {
    TokenKind::AddAssign => AssignmentAddition,
    TokenKind::And => LogicalAnd,
    TokenKind::Assign => Assignment,
    TokenKind::BitAnd => BitwiseAnd,
    TokenKind::BitAndAssign => AssignmentBitwiseAnd,
    TokenKind::BitOr => BitwiseOr,
    TokenKind::BitOrAssign => AssignmentBitwiseOr,
    TokenKind::BitXor => BitwiseXor,
    TokenKind::BitXorAssign => AssignmentBitwiseXor,
    TokenKind::Comma => Comma,
    TokenKind::DivAssign => AssignmentDivision,
    TokenKind::Dot => MemberAccess,
    TokenKind::Eq => Equality,
    TokenKind::Gt => GreaterThan,
    TokenKind::GtEq => GreaterThanOrEqual,
    TokenKind::In => In,
    TokenKind::Instanceof => Instanceof,
    TokenKind::LBracket => ComputedMemberAccess,
    TokenKind::LParen => Call,
    TokenKind::Lt => LessThan,
    TokenKind::LtEq => LessThanOrEqual,
    TokenKind::Minus => Subtraction,
    TokenKind::MulAssign => AssignmentMultiplication,
    TokenKind::NotEq => Inequality,
    TokenKind::Or => LogicalOr,
    TokenKind::Percent => Remainder,
    TokenKind::Plus => Addition,
    TokenKind::Question => Conditional,
    TokenKind::RemAssign => AssignmentRemainder,
    TokenKind::Shl => BitwiseLeftShift,
    TokenKind::ShlAssign => AssignmentBitwiseLeftShift,
    TokenKind::Shr => BitwiseRightShift,
    TokenKind::ShrAssign => AssignmentBitwiseRightShift,
    TokenKind::Slash => Division,
    TokenKind::Star => Multiplication,
    TokenKind::StrictEq => StrictEquality,
    TokenKind::StrictNotEq => StrictInequality,
    TokenKind::SubAssign => AssignmentSubtraction,
    TokenKind::UShr => BitwiseUnsignedRightShift,
    TokenKind::UShrAssign => AssignmentBitwiseUnsignedRightShift,
    _ => return None,
  })
}

/// The operator a token starts in operand position. `new` is handled by the caller, as it takes a member chain rather than an operand.
pub fn prefix_operator(kind: TokenKind) -> Option<OperatorName> {
  use OperatorName::*;
  Some(match kind {
    TokenKind::BitNot => BitwiseNot,
    TokenKind::Decrement => PrefixDecrement,
    TokenKind::Delete => Delete,
    TokenKind::Increment => PrefixIncrement,
    TokenKind::Minus => UnaryNegation,
    TokenKind::Not => LogicalNot,
    TokenKind::Plus => UnaryPlus,
    TokenKind::Typeof => Typeof,
    TokenKind::Void => Void,
    _ => return None,
  })
}
