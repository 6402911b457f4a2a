use super::func::Func;
use super::node::Node;
use super::stx::Ident;
use crate::operator::OperatorName;
use derive_more::derive::From;
use derive_more::derive::TryInto;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

// We must wrap each variant with Node<T> as otherwise we won't be able to visit Node<T> instead of just T.
#[derive(Debug, Drive, DriveMut, From, Serialize, TryInto)]
#[serde(tag = "$t")]
pub enum Expr {
  Binary(Node<BinaryExpr>),
  Call(Node<CallExpr>),
  ComputedMember(Node<ComputedMemberExpr>),
  Cond(Node<CondExpr>),
  Func(Node<FuncExpr>),
  Id(Node<IdExpr>),
  Member(Node<MemberExpr>),
  New(Node<NewExpr>),
  This(Node<ThisExpr>),
  Unary(Node<UnaryExpr>),
  UnaryPostfix(Node<UnaryPostfixExpr>),

  // Literals.
  LitArr(Node<LitArrExpr>),
  LitBool(Node<LitBoolExpr>),
  LitNull(Node<LitNullExpr>),
  LitNum(Node<LitNumExpr>),
  LitObj(Node<LitObjExpr>),
  LitRegex(Node<LitRegexExpr>),
  LitStr(Node<LitStrExpr>),
  LitTemplate(Node<LitTemplateExpr>),
}

// Also used for assignments and the comma operator; see `OperatorName::is_assignment`.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct BinaryExpr {
  #[drive(skip)]
  pub operator: OperatorName,
  pub left: Node<Expr>,
  pub right: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct CallExpr {
  pub callee: Node<Expr>,
  pub arguments: Vec<Node<Expr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ComputedMemberExpr {
  pub object: Node<Expr>,
  pub member: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct CondExpr {
  pub test: Node<Expr>,
  pub consequent: Node<Expr>,
  pub alternate: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct FuncExpr {
  pub name: Option<Node<Ident>>,
  pub function: Node<Func>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct IdExpr {
  #[drive(skip)]
  pub name: String,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct MemberExpr {
  pub object: Node<Expr>,
  // None when the source ends (or breaks off) straight after the dot, e.g. `foo.`.
  pub property: Option<Node<Ident>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct NewExpr {
  pub callee: Node<Expr>,
  pub arguments: Vec<Node<Expr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ThisExpr {}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct UnaryExpr {
  #[drive(skip)]
  pub operator: OperatorName,
  pub argument: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct UnaryPostfixExpr {
  #[drive(skip)]
  pub operator: OperatorName,
  pub argument: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitArrExpr {
  // None for holes like `[a, , b]`.
  pub elements: Vec<Option<Node<Expr>>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitBoolExpr {
  #[drive(skip)]
  pub value: bool,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitNullExpr {}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitNumExpr {
  #[drive(skip)]
  pub raw: String,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitObjExpr {
  pub members: Vec<Node<ObjMember>>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
pub enum ObjMemberKind {
  Getter,
  Setter,
  Value,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ObjMember {
  #[drive(skip)]
  pub kind: ObjMemberKind,
  pub key: Node<ObjKey>,
  // Accessors hold their function here.
  pub value: Node<Expr>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
pub enum ObjKeyKind {
  Ident,
  Num,
  Str,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ObjKey {
  #[drive(skip)]
  pub kind: ObjKeyKind,
  // Unquoted and unescaped.
  #[drive(skip)]
  pub name: String,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitRegexExpr {
  #[drive(skip)]
  pub value: String,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitStrExpr {
  #[drive(skip)]
  pub value: String,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitTemplateExpr {
  #[drive(skip)]
  pub raw: String,
}
