use ahash::HashSet;
use ahash::HashSetExt;
use assist_parse_js::ast::expr::FuncExpr;
use assist_parse_js::ast::expr::LitNumExpr;
use assist_parse_js::ast::expr::LitRegexExpr;
use assist_parse_js::ast::expr::LitStrExpr;
use assist_parse_js::ast::expr::LitTemplateExpr;
use assist_parse_js::ast::expr::MemberExpr;
use assist_parse_js::ast::func::Func;
use assist_parse_js::ast::node::Node;
use assist_parse_js::ast::node::NodeId;
use assist_parse_js::ast::stmt::FuncDecl;
use assist_parse_js::ast::stx::Ident;
use assist_parse_js::comment::CommentKind;
use assist_parse_js::loc::Loc;
use assist_parse_js::Parsed;
use derive_visitor::Drive;
use derive_visitor::Visitor;

type FuncDeclNode = Node<FuncDecl>;
type FuncExprNode = Node<FuncExpr>;
type IdentNode = Node<Ident>;
type LitNumExprNode = Node<LitNumExpr>;
type LitRegexExprNode = Node<LitRegexExpr>;
type LitStrExprNode = Node<LitStrExpr>;
type LitTemplateExprNode = Node<LitTemplateExpr>;
type MemberExprNode = Node<MemberExpr>;

/// The kind of position a completion was requested at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
  /// After a member access dot, with or without part of the property typed.
  Member,
  /// Anywhere a bare name can start.
  Top,
}

#[derive(Visitor)]
#[visitor(
  FuncDeclNode(enter),
  FuncExprNode(enter),
  IdentNode(enter),
  LitNumExprNode(enter),
  LitRegexExprNode(enter),
  LitStrExprNode(enter),
  LitTemplateExprNode(enter),
  MemberExprNode(enter)
)]
struct Classifier {
  offset: usize,
  // Properties of member expressions are `Ident`s too, but are not declarations.
  member_properties: HashSet<NodeId>,
  member: bool,
  rejected: bool,
}

impl Classifier {
  fn reject_inside(&mut self, loc: Loc) {
    if loc.0 < self.offset && self.offset < loc.1 {
      self.rejected = true;
    };
  }

  fn check_signature(&mut self, loc: Loc, function: &Node<Func>) {
    if loc.0 < self.offset && self.offset <= function.stx.body.loc.0 {
      self.rejected = true;
    };
  }

  fn enter_func_decl_node(&mut self, node: &FuncDeclNode) {
    self.check_signature(node.loc, &node.stx.function);
  }

  fn enter_func_expr_node(&mut self, node: &FuncExprNode) {
    self.check_signature(node.loc, &node.stx.function);
  }

  fn enter_ident_node(&mut self, node: &IdentNode) {
    if !self.member_properties.contains(&node.id) && node.loc.touches(self.offset) {
      self.rejected = true;
    };
  }

  fn enter_lit_num_expr_node(&mut self, node: &LitNumExprNode) {
    self.reject_inside(node.loc);
  }

  fn enter_lit_regex_expr_node(&mut self, node: &LitRegexExprNode) {
    self.reject_inside(node.loc);
  }

  fn enter_lit_str_expr_node(&mut self, node: &LitStrExprNode) {
    self.reject_inside(node.loc);
  }

  fn enter_lit_template_expr_node(&mut self, node: &LitTemplateExprNode) {
    self.reject_inside(node.loc);
  }

  fn enter_member_expr_node(&mut self, node: &MemberExprNode) {
    if let Some(property) = &node.stx.property {
      self.member_properties.insert(property.id);
    };
    if node.stx.object.loc.1 < self.offset && self.offset <= node.loc.1 {
      self.member = true;
    };
  }
}

/// Decides whether completing at `offset` makes sense, and what kind of names to offer.
///
/// Positions inside declared names, function signatures, literals and comments get `None`.
pub fn classify(parsed: &Parsed, offset: usize) -> Option<Location> {
  let in_comment = parsed.comments.iter().any(|c| match c.kind {
    CommentKind::Line => c.loc.0 < offset && offset <= c.loc.1,
    CommentKind::Block => c.loc.0 < offset && offset < c.loc.1,
  });
  if in_comment {
    return None;
  };
  let mut classifier = Classifier {
    offset,
    member_properties: HashSet::new(),
    member: false,
    rejected: false,
  };
  parsed.top_level.drive(&mut classifier);
  if classifier.rejected {
    None
  } else if classifier.member {
    Some(Location::Member)
  } else {
    Some(Location::Top)
  }
}

#[cfg(test)]
mod tests {
  use super::classify;
  use super::Location;
  use assist_parse_js::parse;

  fn at_cursor(src_with_cursor: &str) -> Option<Location> {
    let offset = src_with_cursor.find('|').unwrap();
    let src = src_with_cursor.replacen('|', "", 1);
    classify(&parse(&src), offset)
  }

  #[test]
  fn test_member_positions() {
    assert_eq!(at_cursor("foo.|"), Some(Location::Member));
    assert_eq!(at_cursor("foo.ba|"), Some(Location::Member));
    assert_eq!(at_cursor("a.b(c.|)"), Some(Location::Member));
    assert_eq!(at_cursor("x = ''.char|"), Some(Location::Member));
  }

  #[test]
  fn test_top_positions() {
    assert_eq!(at_cursor("|"), Some(Location::Top));
    assert_eq!(at_cursor("var x = 1;\n|"), Some(Location::Top));
    assert_eq!(at_cursor("fo|"), Some(Location::Top));
    assert_eq!(at_cursor("f(a, |)"), Some(Location::Top));
    assert_eq!(at_cursor("{ | }"), Some(Location::Top));
    assert_eq!(at_cursor("function f() { | }"), Some(Location::Top));
  }

  #[test]
  fn test_rejected_positions() {
    assert_eq!(at_cursor("var fo|"), None);
    assert_eq!(at_cursor("function f(a|) {}"), None);
    assert_eq!(at_cursor("function f|() {}"), None);
    assert_eq!(at_cursor("try {} catch (e|) {}"), None);
    assert_eq!(at_cursor("x = 'ab|c';"), None);
    assert_eq!(at_cursor("// comm|ent\nx;"), None);
    assert_eq!(at_cursor("/* a | b */"), None);
  }
}
