//! Type inference over one file.
//!
//! [`Inference`] walks the tree once. Handlers in [`pre`] run as a node is entered, seeding scopes and declarations before the children are visited; handlers in [`post`] run as it is left, once its children's types are known. Results live in side tables keyed by [`NodeId`], so the tree itself is never touched.
//!
//! Completion and lookup walks stop as soon as they reach the offset they were asked about, by breaking out of the walk with a [`Resolution`].

mod globals;
mod post;
mod pre;
mod returns;

use crate::env::Environment;
use crate::env::NameGenerator;
use crate::indexer::Indexer;
use crate::options::EffectiveOptions;
use crate::options::GlobalFlavor;
use crate::summary::ModuleKind;
use crate::types::TypeName;
use crate::types::TypeRef;
use ahash::HashMap;
use ahash::HashMapExt;
use ahash::HashSet;
use ahash::HashSetExt;
use assist_parse_js::ast::node::NodeId;
use assist_parse_js::jsdoc::DocComment;
use assist_parse_js::loc::Loc;
use assist_parse_js::walk::walk;
use assist_parse_js::walk::NodeRef;
use assist_parse_js::walk::Visitor;
use assist_parse_js::Parsed;
use std::ops::ControlFlow;
use tracing::debug;

use returns::find_return;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
  /// Stop at the completion site and report the type whose members to offer.
  Complete,
  /// Stop at the name under the offset and report where it's bound.
  Lookup,
  /// Visit the whole file.
  Summarize,
}

/// Why a walk stopped early.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
  /// Offer the members of the value before a dot.
  Members(TypeName),
  /// Offer every name visible from the offset. Scopes run innermost first, and each is searched along its chain.
  Scopes(Vec<TypeName>),
  /// `name` as bound on `owner`, or along its chain.
  Binding { owner: TypeName, name: String },
  /// The offset is on a name that isn't bound anywhere.
  Unbound,
}

/// What a finished walk leaves behind.
#[derive(Debug)]
pub struct Outcome {
  pub env: Environment,
  /// None when the walk visited the whole file.
  pub resolution: Option<Resolution>,
  pub kind: ModuleKind,
  /// The value the file exports, as seen by dependents.
  pub provided: TypeRef,
}

// The signature a function is bound with before its body has been visited.
#[derive(Clone, Debug)]
struct Signature {
  ftype: TypeRef,
  // Set for constructors.
  instance: Option<TypeName>,
  // From `@return`, which wins over whatever the body returns.
  fixed_return: Option<TypeRef>,
}

#[derive(Debug)]
struct FunctionFrame {
  // The declaration statement or function expression.
  id: NodeId,
  // Declarations bind their name in the enclosing scope.
  declared: Option<(String, Loc)>,
  // A function expression's own name, visible only inside it.
  own_name: Option<(String, Loc)>,
  pushed_name: bool,
  params: Vec<String>,
  doc: Option<DocComment>,
  sig: Signature,
  this_type: Option<TypeRef>,
  // The function's own scope, once entered.
  scope: Option<TypeName>,
}

#[derive(Debug)]
struct ObjectFrame {
  name: TypeName,
  pushed_name: bool,
}

pub struct Inference<'a> {
  pub(crate) env: Environment,
  source: &'a str,
  parsed: &'a Parsed,
  offset: usize,
  mode: Mode,
  flavor: GlobalFlavor,
  globals: Vec<String>,
  indexer: Option<&'a dyn Indexer>,

  types: HashMap<NodeId, TypeRef>,
  // Expressions being assigned to, which are never treated as uses.
  lhs: HashSet<NodeId>,
  // The name a function or object literal is being assigned to.
  hints: HashMap<NodeId, String>,
  docs: HashMap<NodeId, Option<DocComment>>,
  // Function expression to the object expression it's assigned onto, as in `obj.f = function () {}`.
  assigned_to: HashMap<NodeId, NodeId>,
  // AMD factory function to its dependency names.
  amd_deps: HashMap<NodeId, Vec<String>>,
  // `define` and `require` in calls recognised as module definitions, which aren't globals of this file.
  module_callees: HashSet<NodeId>,
  // Bindings whose type came from JSDoc.
  fixed: HashSet<NodeId>,
  functions: Vec<FunctionFrame>,
  objects: Vec<ObjectFrame>,

  kind: ModuleKind,
  commonjs_wrapper: Option<NodeId>,
  amd_factory: Option<NodeId>,
  provided: Option<TypeRef>,
}

impl<'a> Inference<'a> {
  pub fn new(
    parsed: &'a Parsed,
    source: &'a str,
    file_uid: &str,
    options: &EffectiveOptions,
    indexer: Option<&'a dyn Indexer>,
    offset: usize,
    mode: Mode,
  ) -> Inference<'a> {
    Inference {
      env: Environment::new(NameGenerator::new(file_uid), options.flavor),
      source,
      parsed,
      offset,
      mode,
      flavor: options.flavor,
      globals: options.globals.clone(),
      indexer,
      types: HashMap::new(),
      lhs: HashSet::new(),
      hints: HashMap::new(),
      docs: HashMap::new(),
      assigned_to: HashMap::new(),
      amd_deps: HashMap::new(),
      module_callees: HashSet::new(),
      fixed: HashSet::new(),
      functions: Vec::new(),
      objects: Vec::new(),
      kind: ModuleKind::Global,
      commonjs_wrapper: None,
      amd_factory: None,
      provided: None,
    }
  }

  pub fn run(mut self) -> Outcome {
    let parsed = self.parsed;
    let resolution = match walk(&parsed.top_level, &mut self) {
      ControlFlow::Break(r) => Some(r),
      ControlFlow::Continue(()) => None,
    };
    debug!(
      mode = ?self.mode,
      types = self.env.table.len(),
      resolved = resolution.is_some(),
      "inference finished"
    );
    let provided = match self.provided {
      Some(provided) => provided,
      None => TypeRef::named(self.env.global_scope().clone()),
    };
    Outcome {
      env: self.env,
      resolution,
      kind: self.kind,
      provided,
    }
  }

  fn type_of(&self, id: NodeId) -> TypeRef {
    self
      .types
      .get(&id)
      .cloned()
      .unwrap_or_else(TypeRef::object)
  }

  /// The doc comment directly before `start`, read at most once per node.
  fn doc_of(&mut self, id: NodeId, start: usize) -> Option<DocComment> {
    if let Some(doc) = self.docs.get(&id) {
      return doc.clone();
    };
    let doc = self
      .parsed
      .doc_comment_before(self.source, start)
      .and_then(crate::jsdoc::read_doc);
    self.docs.insert(id, doc.clone());
    doc
  }

  // A function without a doc comment of its own takes the one on the statement or key it's assigned in.
  fn inherit_doc(&mut self, from: NodeId, to: NodeId, to_start: usize) {
    if self.doc_of(to, to_start).is_some() {
      return;
    };
    if let Some(Some(doc)) = self.docs.get(&from).cloned() {
      self.docs.insert(to, Some(doc));
    };
  }

  /// The type another module provides, with the types it refers to merged in.
  fn imported(&mut self, module: &str) -> Option<TypeRef> {
    let Some(summary) = self.indexer.and_then(|indexer| indexer.retrieve_summary(module)) else {
      debug!(module, "no summary for dependency");
      return None;
    };
    self.env.merge_summary(&summary, module, None);
    Some(summary.provided)
  }

  fn binding_of(&self, name: &str) -> Resolution {
    match self.env.lookup_name(name) {
      Some(found) => Resolution::Binding {
        owner: found.owner,
        name: name.to_string(),
      },
      None => Resolution::Unbound,
    }
  }

  fn binding_in(&self, name: &str, owner: &str) -> Resolution {
    match self.env.lookup_in_chain(name, owner) {
      Some(found) => Resolution::Binding {
        owner: found.owner,
        name: name.to_string(),
      },
      None => Resolution::Unbound,
    }
  }

  // Whether the offset is within `loc`'s braces. An unclosed body runs to the end of the file and includes its last offset.
  fn inside_braces(&self, loc: Loc) -> bool {
    if loc.0 >= self.offset {
      return false;
    };
    if self.offset < loc.1 {
      return true;
    };
    self.offset == loc.1
      && !self
        .source
        .get(..loc.1)
        .is_some_and(|text| text.ends_with('}'))
  }

  // Object literal scopes don't inherit from the scope around them, so the whole stack is reported.
  fn visible_names(&self) -> Resolution {
    Resolution::Scopes(self.env.visible_scopes())
  }

  // The scope is reported before it's popped.
  fn members_of_scope_if_inside(&self, loc: Loc) -> ControlFlow<Resolution> {
    if self.mode == Mode::Complete && self.inside_braces(loc) {
      return ControlFlow::Break(self.visible_names());
    };
    ControlFlow::Continue(())
  }
}

impl<'a> Visitor<'a> for Inference<'a> {
  type Break = Resolution;

  fn enter(&mut self, node: NodeRef<'a>) -> ControlFlow<Resolution> {
    match node {
      NodeRef::TopLevel(n) => self.enter_top_level(n),
      NodeRef::Stmt(n) => self.enter_stmt(n),
      NodeRef::Block(n) => {
        self.enter_block(&n.stx.body);
        ControlFlow::Continue(())
      }
      NodeRef::Expr(n) => self.enter_expr(n),
      NodeRef::Func(n) => self.enter_func(n),
      NodeRef::FuncBody(n) => {
        self.hoist(&n.stx.body);
        ControlFlow::Continue(())
      }
      NodeRef::VarDeclarator(n) => {
        self.enter_var_declarator(n);
        ControlFlow::Continue(())
      }
      NodeRef::CatchBlock(n) => self.enter_catch(n),
      NodeRef::SwitchBranch(_) | NodeRef::ObjMember(_) | NodeRef::Ident(_) => {
        ControlFlow::Continue(())
      }
    }
  }

  fn exit(&mut self, node: NodeRef<'a>) -> ControlFlow<Resolution> {
    match node {
      NodeRef::TopLevel(_) => self.exit_top_level(),
      NodeRef::Stmt(n) => self.exit_stmt(n),
      NodeRef::Block(n) => {
        self.members_of_scope_if_inside(n.loc)?;
        self.env.pop_scope();
        ControlFlow::Continue(())
      }
      NodeRef::Expr(n) => self.exit_expr(n),
      NodeRef::Func(_) => {
        self.exit_func();
        ControlFlow::Continue(())
      }
      NodeRef::FuncBody(n) => self.members_of_scope_if_inside(n.loc),
      NodeRef::VarDeclarator(n) => self.exit_var_declarator(n),
      NodeRef::CatchBlock(n) => {
        self.members_of_scope_if_inside(n.stx.body.loc)?;
        self.env.pop_scope();
        ControlFlow::Continue(())
      }
      NodeRef::SwitchBranch(_) | NodeRef::ObjMember(_) | NodeRef::Ident(_) => {
        ControlFlow::Continue(())
      }
    }
  }
}
