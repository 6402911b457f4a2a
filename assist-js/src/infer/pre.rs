//! Handlers run as a node is entered, before its children.

use super::globals::implicit_globals;
use super::FunctionFrame;
use super::Inference;
use super::Mode;
use super::ObjectFrame;
use super::Resolution;
use super::Signature;
use crate::jsdoc;
use crate::options::GlobalFlavor;
use crate::summary::ModuleKind;
use crate::types::TypeName;
use crate::types::TypeRef;
use crate::types::ARGUMENTS;
use crate::types::ERROR;
use crate::types::PROTO_SUFFIX;
use assist_parse_js::ast::expr::BinaryExpr;
use assist_parse_js::ast::expr::CallExpr;
use assist_parse_js::ast::expr::Expr;
use assist_parse_js::ast::expr::LitObjExpr;
use assist_parse_js::ast::func::Func;
use assist_parse_js::ast::node::Node;
use assist_parse_js::ast::node::NodeId;
use assist_parse_js::ast::stmt::CatchBlock;
use assist_parse_js::ast::stmt::Stmt;
use assist_parse_js::ast::stmt::VarDeclarator;
use assist_parse_js::ast::stx::TopLevel;
use assist_parse_js::jsdoc::DocComment;
use assist_parse_js::loc::Loc;
use std::ops::ControlFlow;

fn param_names(func: &Func) -> Vec<String> {
  func.params.iter().map(|p| p.stx.name.clone()).collect()
}

// `Widget` and `ns.Widget`, but not `ns.widget`.
fn is_constructor_name(name: &str) -> bool {
  name
    .rsplit('.')
    .next()
    .and_then(|last| last.chars().next())
    .is_some_and(|c| c.is_ascii_uppercase())
}

fn is_commonjs_wrapper(func: &Func) -> bool {
  let names: Vec<&str> = func
    .params
    .iter()
    .take(3)
    .map(|p| p.stx.name.as_str())
    .collect();
  names == ["require", "exports", "module"]
}

pub(super) fn require_type() -> TypeRef {
  TypeRef::function(vec!["id".to_string()], TypeRef::object())
}

/// The dotted path being assigned to, used to name what's assigned there. `this.x` is just `x`.
fn access_path(e: &Node<Expr>) -> Option<String> {
  match e.stx.as_ref() {
    Expr::Id(id) => Some(id.stx.name.clone()),
    Expr::Member(m) => {
      let prop = &m.stx.property.as_ref()?.stx.name;
      match m.stx.object.stx.as_ref() {
        Expr::This(_) => Some(prop.clone()),
        _ => Some(format!("{}.{}", access_path(&m.stx.object)?, prop)),
      }
    }
    _ => None,
  }
}

/// The trailing function of a call like `define(["a", "b"], function (a, b) {})`, with the dependency names in parameter order.
fn amd_factory(call: &CallExpr, callees: &[&str]) -> Option<(NodeId, Vec<String>)> {
  let Expr::Id(callee) = call.callee.stx.as_ref() else {
    return None;
  };
  if !callees.contains(&callee.stx.name.as_str()) {
    return None;
  };
  let [.., deps, factory] = call.arguments.as_slice() else {
    return None;
  };
  let (Expr::LitArr(deps), Expr::Func(_)) = (deps.stx.as_ref(), factory.stx.as_ref()) else {
    return None;
  };
  let names = deps
    .stx
    .elements
    .iter()
    .map(|el| match el.as_ref().map(|e| e.stx.as_ref()) {
      Some(Expr::LitStr(s)) => s.stx.value.clone(),
      _ => String::new(),
    })
    .collect();
  Some((factory.id, names))
}

impl<'a> Inference<'a> {
  pub(super) fn enter_top_level(&mut self, top: &'a Node<TopLevel>) -> ControlFlow<Resolution> {
    self.detect_module(&top.stx.body);
    self.seed_globals();
    self.hoist(&top.stx.body);
    self.bind_implicit_globals(top);
    ControlFlow::Continue(())
  }

  // Globals created by assignment are bound up front, typed by their value when it's a literal. The walk refines them once it reaches the assignment.
  fn bind_implicit_globals(&mut self, top: &'a Node<TopLevel>) {
    let global = self.env.global_scope().clone();
    for g in implicit_globals(top) {
      if self.env.lookup_in_chain(g.name, &global).is_some() {
        continue;
      };
      let t = match g.literal {
        Some(builtin) => TypeRef::named(builtin),
        None => TypeRef::object(),
      };
      self
        .env
        .add_variable(g.name, Some(global.as_str()), t, Some(g.loc));
    }
  }

  fn detect_module(&mut self, body: &'a [Node<Stmt>]) {
    let calls: Vec<&'a Node<CallExpr>> = body
      .iter()
      .filter_map(|s| match s.stx.as_ref() {
        Stmt::Expr(e) => match e.stx.expr.stx.as_ref() {
          Expr::Call(c) => Some(c),
          _ => None,
        },
        _ => None,
      })
      .collect();
    // A wrapped CommonJS module wins over AMD, as `define(function (require, exports, module) {})` is both.
    for c in &calls {
      let Some(last) = c.stx.arguments.last() else {
        continue;
      };
      if let Expr::Func(f) = last.stx.as_ref() {
        if is_commonjs_wrapper(&f.stx.function.stx) {
          self.module_callees.insert(c.stx.callee.id);
          self.commonjs_wrapper = Some(last.id);
          self.kind = ModuleKind::CommonJs;
          return;
        };
      };
    }
    for c in &calls {
      if let Some((factory, _)) = amd_factory(&c.stx, &["define"]) {
        self.module_callees.insert(c.stx.callee.id);
        self.amd_factory = Some(factory);
        self.kind = ModuleKind::Amd;
        return;
      };
    }
    if self.flavor == GlobalFlavor::Node {
      self.kind = ModuleKind::CommonJs;
    };
  }

  fn seed_globals(&mut self) {
    let global = self.env.global_scope().clone();
    if let Some(indexer) = self.indexer {
      for (file, summary) in indexer.retrieve_global_summaries() {
        self.env.merge_summary(&summary, &file, Some(global.as_str()));
      }
    };
    for name in self.globals.clone() {
      if self.env.lookup_in_chain(&name, &global).is_none() {
        let obj = self.env.new_fleeting_object();
        self
          .env
          .add_variable(&name, Some(global.as_str()), TypeRef::Named(obj), None);
      };
    }
    if self.flavor == GlobalFlavor::Node && self.commonjs_wrapper.is_none() {
      self.bind_commonjs_objects();
    };
  }

  // Fresh `exports` and `module` objects in the current scope, where `module.exports` starts out as `exports`.
  fn bind_commonjs_objects(&mut self) {
    let exports = self.env.new_fleeting_object();
    let module = self.env.new_fleeting_object();
    self.env.add_variable(
      "exports",
      Some(module.as_str()),
      TypeRef::named(exports.clone()),
      None,
    );
    self
      .env
      .add_variable("exports", None, TypeRef::Named(exports), None);
    self
      .env
      .add_variable("module", None, TypeRef::Named(module), None);
  }

  /// Binds the function declarations of a statement list up front, so they can be used before they appear.
  pub(super) fn hoist(&mut self, body: &'a [Node<Stmt>]) {
    for s in body {
      let Stmt::FunctionDecl(decl) = s.stx.as_ref() else {
        continue;
      };
      let Some(name) = &decl.stx.name else {
        continue;
      };
      let doc = self.doc_of(s.id, s.loc.0);
      let sig = self.signature(
        Some(name.stx.name.as_str()),
        &decl.stx.function.stx,
        doc.as_ref(),
      );
      let target = self.declaring_scope(&sig);
      self
        .env
        .add_variable(&name.stx.name, target.as_deref(), sig.ftype, Some(name.loc));
    }
  }

  // Constructors are reachable by name from anywhere in the file, wherever they're declared.
  pub(super) fn declaring_scope(&self, sig: &Signature) -> Option<TypeName> {
    sig
      .instance
      .as_ref()
      .map(|_| self.env.global_scope().clone())
  }

  fn signature(&mut self, name: Option<&str>, func: &Func, doc: Option<&DocComment>) -> Signature {
    let params = param_names(func);
    if let Some(name) = name.filter(|n| is_constructor_name(n)) {
      let qualified = self.env.qualify(name);
      let instance = self.env.create_constructor(&qualified);
      return Signature {
        ftype: TypeRef::constructor(params, TypeRef::named(instance.clone())),
        instance: Some(instance),
        fixed_return: None,
      };
    };
    let fixed_return = doc
      .and_then(|d| d.returns.as_ref())
      .map(|t| jsdoc::resolve(&mut self.env, t));
    let ret = fixed_return.clone().unwrap_or_else(TypeRef::undefined);
    Signature {
      ftype: TypeRef::function(params, ret),
      instance: None,
      fixed_return,
    }
  }

  // What `this` is inside a function assigned onto an object. Methods put on a constructor's prototype see its instances.
  fn receiver_of(&self, id: NodeId) -> Option<TypeRef> {
    let object = self.assigned_to.get(&id)?;
    let owner = self.env.owner_of(&self.type_of(*object));
    if let Some(instance) = owner.strip_suffix(PROTO_SUFFIX) {
      if self.env.table.contains(instance) {
        return Some(TypeRef::named(instance));
      };
    };
    Some(TypeRef::Named(owner))
  }

  fn begin_function(
    &mut self,
    id: NodeId,
    declared: Option<(String, Loc)>,
    own_name: Option<(String, Loc)>,
    func: &'a Node<Func>,
    doc: Option<DocComment>,
  ) {
    let name = declared
      .as_ref()
      .or(own_name.as_ref())
      .map(|(n, _)| n.clone())
      .or_else(|| self.hints.get(&id).cloned());
    let sig = self.signature(name.as_deref(), &func.stx, doc.as_ref());
    let this_type = match &sig.instance {
      Some(instance) => Some(TypeRef::named(instance.clone())),
      None => self.receiver_of(id),
    };
    let pushed_name = name.is_some();
    if let Some(name) = name {
      self.env.push_name(name);
    };
    self.functions.push(FunctionFrame {
      id,
      declared,
      own_name,
      pushed_name,
      params: param_names(&func.stx),
      doc,
      sig,
      this_type,
      scope: None,
    });
  }

  pub(super) fn enter_stmt(&mut self, s: &'a Node<Stmt>) -> ControlFlow<Resolution> {
    match s.stx.as_ref() {
      Stmt::Block(b) => self.enter_block(&b.stx.body),
      Stmt::FunctionDecl(decl) => {
        let declared = decl.stx.name.as_ref().map(|n| (n.stx.name.clone(), n.loc));
        let doc = self.doc_of(s.id, s.loc.0);
        self.begin_function(s.id, declared, None, &decl.stx.function, doc);
      }
      // A comment before `var` documents the first declarator.
      Stmt::VarDecl(decl) => {
        if let Some(first) = decl.stx.declarators.first() {
          if let Some(doc) = self.doc_of(s.id, s.loc.0) {
            self.docs.entry(first.id).or_insert(Some(doc));
          };
        };
      }
      // And one before an assignment statement documents the assignment.
      Stmt::Expr(e) => {
        if let Expr::Binary(b) = e.stx.expr.stx.as_ref() {
          if b.stx.operator.is_assignment() {
            if let Some(doc) = self.doc_of(s.id, s.loc.0) {
              self.docs.entry(e.stx.expr.id).or_insert(Some(doc));
            };
          };
        };
      }
      _ => {}
    };
    ControlFlow::Continue(())
  }

  pub(super) fn enter_block(&mut self, body: &'a [Node<Stmt>]) {
    self.env.new_scope();
    self.hoist(body);
  }

  pub(super) fn enter_catch(&mut self, c: &'a Node<CatchBlock>) -> ControlFlow<Resolution> {
    self.enter_block(&c.stx.body.stx.body);
    if let Some(p) = &c.stx.parameter {
      self
        .env
        .add_variable(&p.stx.name, None, TypeRef::named(ERROR), Some(p.loc));
      if self.mode == Mode::Lookup && p.loc.touches(self.offset) {
        return ControlFlow::Break(self.binding_of(&p.stx.name));
      };
    };
    ControlFlow::Continue(())
  }

  pub(super) fn enter_func(&mut self, f: &'a Node<Func>) -> ControlFlow<Resolution> {
    let scope = self.env.new_scope();
    let Some(frame) = self.functions.last_mut() else {
      return ControlFlow::Continue(());
    };
    frame.scope = Some(scope);
    let id = frame.id;
    let doc = frame.doc.clone();
    let this_type = frame.this_type.clone();
    let own_name = frame
      .own_name
      .clone()
      .map(|name| (name, frame.sig.ftype.clone()));

    self
      .env
      .add_variable("arguments", None, TypeRef::named(ARGUMENTS), None);
    if let Some(this_type) = this_type {
      self.env.add_variable("this", None, this_type, None);
    };
    if let Some(((name, loc), ftype)) = own_name {
      self.env.add_variable(&name, None, ftype, Some(loc));
    };

    let wrapper = self.commonjs_wrapper == Some(id);
    let deps = self.amd_deps.get(&id).cloned().unwrap_or_default();
    for (i, p) in f.stx.params.iter().enumerate() {
      if wrapper && i < 3 {
        continue;
      };
      let name = &p.stx.name;
      let t = match doc.as_ref().and_then(|d| d.param(name)) {
        Some(t) => jsdoc::resolve(&mut self.env, t),
        None => match deps.get(i) {
          Some(dep) => self.dependency_type(dep),
          None => TypeRef::object(),
        },
      };
      self.env.add_variable(name, None, t, Some(p.loc));
    }
    if wrapper {
      self.env.add_variable("require", None, require_type(), None);
      self.bind_commonjs_objects();
    };

    if self.mode == Mode::Lookup {
      if let Some(p) = f.stx.params.iter().find(|p| p.loc.touches(self.offset)) {
        return ControlFlow::Break(self.binding_of(&p.stx.name));
      };
    };
    ControlFlow::Continue(())
  }

  fn dependency_type(&mut self, dep: &str) -> TypeRef {
    match dep {
      "require" => require_type(),
      "exports" | "module" => TypeRef::Named(self.env.new_fleeting_object()),
      _ => match self.imported(dep) {
        Some(t) => t,
        None => TypeRef::Named(self.env.new_fleeting_object()),
      },
    }
  }

  pub(super) fn enter_var_declarator(&mut self, d: &'a Node<VarDeclarator>) {
    let doc = self.doc_of(d.id, d.loc.0);
    let name = &d.stx.name;
    if let Some(init) = &d.stx.initializer {
      match init.stx.as_ref() {
        Expr::Func(_) => {
          self.hints.insert(init.id, name.stx.name.clone());
          self.inherit_doc(d.id, init.id, init.loc.0);
        }
        Expr::LitObj(_) => {
          self.hints.insert(init.id, name.stx.name.clone());
        }
        _ => {}
      };
    };
    if let Some(t) = doc.as_ref().and_then(|doc| doc.typ.as_ref()) {
      let t = jsdoc::resolve(&mut self.env, t);
      self
        .env
        .add_variable(&name.stx.name, None, t, Some(name.loc));
      self.fixed.insert(d.id);
    };
  }

  pub(super) fn enter_expr(&mut self, e: &'a Node<Expr>) -> ControlFlow<Resolution> {
    match e.stx.as_ref() {
      Expr::Binary(b) if b.stx.operator.is_assignment() => self.enter_assignment(e, b),
      Expr::Call(c) => {
        if let Some((factory, deps)) = amd_factory(&c.stx, &["define", "require"]) {
          self.module_callees.insert(c.stx.callee.id);
          self.amd_deps.insert(factory, deps);
        };
      }
      Expr::Func(f) => {
        let own_name = f.stx.name.as_ref().map(|n| (n.stx.name.clone(), n.loc));
        let doc = self.doc_of(e.id, e.loc.0);
        self.begin_function(e.id, None, own_name, &f.stx.function, doc);
      }
      Expr::LitObj(o) => self.enter_object(e, o),
      _ => {}
    };
    ControlFlow::Continue(())
  }

  fn enter_assignment(&mut self, e: &'a Node<Expr>, b: &'a Node<BinaryExpr>) {
    let left = &b.stx.left;
    let right = &b.stx.right;
    self.lhs.insert(left.id);
    if matches!(right.stx.as_ref(), Expr::Func(_) | Expr::LitObj(_)) {
      if let Some(path) = access_path(left) {
        self.hints.insert(right.id, path);
      };
    };
    if let Expr::Func(_) = right.stx.as_ref() {
      if let Expr::Member(m) = left.stx.as_ref() {
        self.assigned_to.insert(right.id, m.stx.object.id);
      };
      self.inherit_doc(e.id, right.id, right.loc.0);
    };
  }

  fn enter_object(&mut self, e: &'a Node<Expr>, o: &'a Node<LitObjExpr>) {
    let obj = self.env.new_object(Some(e.loc));
    let hint = self.hints.get(&e.id).cloned();
    let pushed_name = hint.is_some();
    if let Some(hint) = hint {
      self.env.push_name(hint);
    };
    // Keys are bound before the values are visited, so values can refer to their siblings.
    for m in &o.stx.members {
      let key = &m.stx.key;
      let value = &m.stx.value;
      let doc = self.doc_of(m.id, m.loc.0);
      let declared = doc
        .as_ref()
        .and_then(|d| d.typ.as_ref())
        .map(|t| jsdoc::resolve(&mut self.env, t));
      if declared.is_some() {
        self.fixed.insert(m.id);
      };
      self.env.add_variable(
        &key.stx.name,
        Some(obj.as_str()),
        declared.unwrap_or_else(TypeRef::object),
        Some(key.loc),
      );
      match value.stx.as_ref() {
        Expr::Func(_) => {
          self.hints.insert(value.id, key.stx.name.clone());
          self.inherit_doc(m.id, value.id, value.loc.0);
        }
        Expr::LitObj(_) => {
          self.hints.insert(value.id, key.stx.name.clone());
        }
        _ => {}
      };
    }
    self.objects.push(ObjectFrame {
      name: obj,
      pushed_name,
    });
  }
}
