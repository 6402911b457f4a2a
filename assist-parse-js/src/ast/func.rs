use super::node::Node;
use super::stmt::Stmt;
use super::stx::Ident;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

// Shared by function declarations, function expressions and object accessors.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct Func {
  pub params: Vec<Node<Ident>>,
  pub body: Node<FuncBody>,
}

// Kept separate from a block statement since a function body opens the function's own scope rather than a nested one.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct FuncBody {
  pub body: Vec<Node<Stmt>>,
}
