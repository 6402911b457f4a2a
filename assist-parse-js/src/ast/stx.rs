use super::node::Node;
use super::stmt::Stmt;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct TopLevel {
  pub body: Vec<Node<Stmt>>,
}

/// A declared name: a variable, function, parameter or catch binding.
///
/// Uses of a name are [`IdExpr`](super::expr::IdExpr) instead, so a walk never confuses the two.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct Ident {
  #[drive(skip)]
  pub name: String,
}
