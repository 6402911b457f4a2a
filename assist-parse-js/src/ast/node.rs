use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::loc::Loc;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;
use serde::Serializer;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;

/// Identity of a node within one parse, assigned in creation order.
///
/// Analyses keep their per-node results in side tables keyed by this instead of mutating the tree.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct NodeId(pub u32);

#[derive(Drive, DriveMut)]
pub struct Node<S: Drive + DriveMut> {
  #[drive(skip)]
  pub id: NodeId,
  #[drive(skip)]
  pub loc: Loc,
  pub stx: Box<S>,
}

impl<S: Drive + DriveMut> Node<S> {
  pub fn new(id: NodeId, loc: Loc, stx: S) -> Node<S> {
    Node {
      id,
      loc,
      stx: Box::new(stx),
    }
  }

  /// Wraps the node in an enum variant such as `Expr::Id`. The wrapper shares the id and loc, so side tables may key on either.
  pub fn into_wrapped<T: From<Node<S>> + Drive + DriveMut>(self) -> Node<T> {
    Node {
      id: self.id,
      loc: self.loc,
      stx: Box::new(T::from(self)),
    }
  }

  /// Create an error at this node's location.
  pub fn error(&self, typ: SyntaxErrorType) -> SyntaxError {
    self.loc.error(typ, None)
  }
}

impl<S: Debug + Drive + DriveMut> Debug for Node<S> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    self.stx.fmt(f)
  }
}

impl<S: Serialize + Drive + DriveMut> Serialize for Node<S> {
  fn serialize<Se: Serializer>(&self, serializer: Se) -> Result<Se::Ok, Se::Error> {
    self.stx.serialize(serializer)
  }
}
