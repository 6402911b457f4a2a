//! Handlers run as a node is left, once its children's types are known.

use super::find_return;
use super::Inference;
use super::Mode;
use super::Resolution;
use crate::jsdoc;
use crate::summary::ModuleKind;
use crate::types::is_generated;
use crate::types::TypeRef;
use crate::types::ARRAY;
use crate::types::BOOLEAN;
use crate::types::NUMBER;
use crate::types::OBJECT;
use crate::types::REGEXP;
use crate::types::STATIC_SUFFIX;
use crate::types::STRING;
use assist_parse_js::ast::expr::BinaryExpr;
use assist_parse_js::ast::expr::CallExpr;
use assist_parse_js::ast::expr::ComputedMemberExpr;
use assist_parse_js::ast::expr::Expr;
use assist_parse_js::ast::expr::LitObjExpr;
use assist_parse_js::ast::expr::MemberExpr;
use assist_parse_js::ast::expr::ObjMemberKind;
use assist_parse_js::ast::func::Func;
use assist_parse_js::ast::node::Node;
use assist_parse_js::ast::stmt::Stmt;
use assist_parse_js::ast::stmt::VarDeclarator;
use assist_parse_js::loc::Loc;
use assist_parse_js::operator::OperatorName;
use std::ops::ControlFlow;

// `require("x")` with a literal module name.
fn required_module(call: &CallExpr) -> Option<&str> {
  let Expr::Id(callee) = call.callee.stx.as_ref() else {
    return None;
  };
  if callee.stx.name != "require" {
    return None;
  };
  match call.arguments.as_slice() {
    [arg] => match arg.stx.as_ref() {
      Expr::LitStr(s) => Some(&s.stx.value),
      _ => None,
    },
    _ => None,
  }
}

impl<'a> Inference<'a> {
  pub(super) fn exit_top_level(&mut self) -> ControlFlow<Resolution> {
    if self.kind == ModuleKind::CommonJs && self.commonjs_wrapper.is_none() {
      self.provided = self.commonjs_exports();
    };
    match self.mode {
      Mode::Complete => ControlFlow::Break(self.visible_names()),
      Mode::Lookup | Mode::Summarize => ControlFlow::Continue(()),
    }
  }

  // What `module.exports` holds, as seen from the current scope.
  fn commonjs_exports(&self) -> Option<TypeRef> {
    let module = self.env.lookup_name("module")?;
    let owner = self.env.owner_of(&module.def.type_ref);
    Some(self.env.lookup_in_chain("exports", &owner)?.def.type_ref)
  }

  pub(super) fn exit_stmt(&mut self, s: &'a Node<Stmt>) -> ControlFlow<Resolution> {
    match s.stx.as_ref() {
      Stmt::Block(_) => {
        self.members_of_scope_if_inside(s.loc)?;
        self.env.pop_scope();
      }
      Stmt::Return(r) => {
        let t = match &r.stx.value {
          Some(value) => self.type_of(value.id),
          None => TypeRef::undefined(),
        };
        self.types.insert(s.id, t);
      }
      Stmt::FunctionDecl(decl) => {
        self.finish_function(&decl.stx.function)?;
      }
      _ => {}
    };
    ControlFlow::Continue(())
  }

  pub(super) fn exit_func(&mut self) {
    let wrapper = self
      .functions
      .last()
      .is_some_and(|frame| self.commonjs_wrapper == Some(frame.id));
    if wrapper {
      self.provided = self.commonjs_exports();
    };
    self.env.pop_scope();
  }

  /// Settles a function's type once its body has been visited, and binds its name.
  fn finish_function(&mut self, func: &'a Node<Func>) -> ControlFlow<Resolution, TypeRef> {
    let Some(frame) = self.functions.pop() else {
      return ControlFlow::Continue(TypeRef::object());
    };
    if frame.pushed_name {
      self.env.pop_name();
    };
    let target = self.declaring_scope(&frame.sig);
    let ftype = match (&frame.sig.instance, &frame.sig.fixed_return) {
      (None, None) => {
        let ret = match find_return(&func.stx.body.stx.body) {
          Some(id) => self.type_of(id),
          None => TypeRef::undefined(),
        };
        TypeRef::function(frame.params, ret)
      }
      _ => frame.sig.ftype,
    };
    if self.amd_factory == Some(frame.id) {
      self.provided = Some(ftype.return_type());
    };
    self.types.insert(frame.id, ftype.clone());

    if let Some((name, loc)) = &frame.declared {
      self
        .env
        .add_variable(name, target.as_deref(), ftype.clone(), Some(*loc));
      if self.mode == Mode::Lookup && loc.touches(self.offset) {
        return ControlFlow::Break(self.binding_of(name));
      };
    };
    if let (Some((name, loc)), Some(scope)) = (&frame.own_name, &frame.scope) {
      self
        .env
        .add_variable(name, Some(scope.as_str()), ftype.clone(), Some(*loc));
      if self.mode == Mode::Lookup && loc.touches(self.offset) {
        return ControlFlow::Break(self.binding_in(name, scope));
      };
    };
    ControlFlow::Continue(ftype)
  }

  pub(super) fn exit_var_declarator(&mut self, d: &'a Node<VarDeclarator>) -> ControlFlow<Resolution> {
    let name = &d.stx.name;
    if !self.fixed.contains(&d.id) {
      let t = match &d.stx.initializer {
        Some(init) => self.type_of(init.id),
        None => TypeRef::object(),
      };
      self
        .env
        .add_variable(&name.stx.name, None, t, Some(name.loc));
    };
    if name.loc.touches(self.offset) {
      match self.mode {
        Mode::Complete => return ControlFlow::Break(self.visible_names()),
        Mode::Lookup => return ControlFlow::Break(self.binding_of(&name.stx.name)),
        Mode::Summarize => {}
      };
    };
    ControlFlow::Continue(())
  }

  pub(super) fn exit_expr(&mut self, e: &'a Node<Expr>) -> ControlFlow<Resolution> {
    let t = match e.stx.as_ref() {
      Expr::Id(id) => self.exit_id(e, &id.stx.name)?,
      Expr::Member(m) => self.exit_member(e, m)?,
      Expr::ComputedMember(m) => self.computed_member_type(m),
      Expr::Call(c) => self.call_type(c),
      Expr::New(n) => match self.type_of(n.stx.callee.id) {
        TypeRef::Function(f) if f.is_constructor => *f.return_type,
        _ => TypeRef::object(),
      },
      Expr::Binary(b) if b.stx.operator.is_assignment() => self.exit_assignment(e, b)?,
      Expr::Binary(b) => self.binary_type(b),
      Expr::Cond(c) => self.type_of(c.stx.consequent.id),
      Expr::Unary(u) => TypeRef::named(match u.stx.operator {
        OperatorName::LogicalNot => BOOLEAN,
        _ => NUMBER,
      }),
      Expr::UnaryPostfix(_) => TypeRef::named(NUMBER),
      Expr::This(_) => match self.env.lookup_name("this") {
        Some(found) => found.def.type_ref,
        None => TypeRef::object(),
      },
      Expr::Func(f) => self.finish_function(&f.stx.function)?,
      Expr::LitObj(o) => self.exit_object(e, o)?,
      Expr::LitArr(_) => TypeRef::named(ARRAY),
      Expr::LitBool(_) => TypeRef::named(BOOLEAN),
      Expr::LitNull(_) => TypeRef::named(OBJECT),
      Expr::LitNum(_) => TypeRef::named(NUMBER),
      Expr::LitRegex(_) => TypeRef::named(REGEXP),
      Expr::LitStr(_) | Expr::LitTemplate(_) => TypeRef::named(STRING),
    };
    self.types.insert(e.id, t);
    ControlFlow::Continue(())
  }

  fn exit_id(&mut self, e: &'a Node<Expr>, name: &str) -> ControlFlow<Resolution, TypeRef> {
    let is_lhs = self.lhs.contains(&e.id);
    // Names being assigned to are handled by the assignment, once the value's type is known.
    if !is_lhs && e.loc.touches(self.offset) {
      match self.mode {
        Mode::Complete => return ControlFlow::Break(self.visible_names()),
        Mode::Lookup => return ControlFlow::Break(self.binding_of(name)),
        Mode::Summarize => {}
      };
    };
    if let Some(found) = self.env.lookup_name(name) {
      return ControlFlow::Continue(found.def.type_ref);
    };
    if is_lhs {
      return ControlFlow::Continue(TypeRef::undefined());
    };
    if self.module_callees.contains(&e.id) {
      return ControlFlow::Continue(TypeRef::object());
    };
    // An undeclared name is an implicit global, visible everywhere in the file.
    let obj = self.env.new_fleeting_object();
    let global = self.env.global_scope().clone();
    self.env.add_variable(
      name,
      Some(global.as_str()),
      TypeRef::named(obj.clone()),
      None,
    );
    ControlFlow::Continue(TypeRef::Named(obj))
  }

  fn exit_member(
    &mut self,
    e: &'a Node<Expr>,
    m: &'a Node<MemberExpr>,
  ) -> ControlFlow<Resolution, TypeRef> {
    let object_type = self.promote_untyped(&m.stx.object);
    let owner = self.env.owner_of(&object_type);
    if self.mode == Mode::Complete && m.stx.object.loc.1 < self.offset && self.offset <= e.loc.1 {
      return ControlFlow::Break(Resolution::Members(owner));
    };
    let Some(prop) = &m.stx.property else {
      return ControlFlow::Continue(object_type);
    };
    let name = &prop.stx.name;
    let is_lhs = self.lhs.contains(&e.id);
    if self.mode == Mode::Lookup && !is_lhs && prop.loc.touches(self.offset) {
      return ControlFlow::Break(self.binding_in(name, &owner));
    };
    if let Some(found) = self.env.lookup_in_chain(name, &owner) {
      return ControlFlow::Continue(found.def.type_ref);
    };
    if is_lhs {
      return ControlFlow::Continue(TypeRef::undefined());
    };
    if !self.env.table.contains(&owner) || self.env.table.is_builtin(&owner) {
      return ControlFlow::Continue(TypeRef::object());
    };
    // Reading a property nobody has set yet makes it exist, so `a.b.c` can be completed after `a.b.c = 1`.
    let obj = self.env.new_fleeting_object();
    self
      .env
      .add_variable(name, Some(owner.as_str()), TypeRef::named(obj.clone()), None);
    ControlFlow::Continue(TypeRef::Named(obj))
  }

  // A variable known only as `Object`, such as an untyped parameter, gets an object type of its own once a member is accessed through it.
  fn promote_untyped(&mut self, object: &'a Node<Expr>) -> TypeRef {
    let t = self.type_of(object.id);
    let Expr::Id(id) = object.stx.as_ref() else {
      return t;
    };
    if !t.is_named(OBJECT) {
      return t;
    };
    let name = &id.stx.name;
    let Some(found) = self.env.lookup_name(name) else {
      return t;
    };
    if !found.def.type_ref.is_named(OBJECT) || self.env.table.is_builtin(&found.owner) {
      return t;
    };
    let promoted = TypeRef::Named(self.env.new_fleeting_object());
    self
      .env
      .add_variable(name, Some(found.owner.as_str()), promoted.clone(), None);
    let bound = self
      .env
      .lookup_in_chain(name, &found.owner)
      .is_some_and(|now| now.def.type_ref == promoted);
    if !bound {
      return t;
    };
    self.types.insert(object.id, promoted.clone());
    promoted
  }

  fn computed_member_type(&self, m: &'a Node<ComputedMemberExpr>) -> TypeRef {
    let owner = self.env.owner_of(&self.type_of(m.stx.object.id));
    let key = match m.stx.member.stx.as_ref() {
      Expr::LitStr(s) => &s.stx.value,
      Expr::LitNum(n) => &n.stx.raw,
      _ => return TypeRef::object(),
    };
    match self.env.lookup_in_chain(key, &owner) {
      Some(found) => found.def.type_ref,
      None => TypeRef::object(),
    }
  }

  fn call_type(&mut self, c: &'a Node<CallExpr>) -> TypeRef {
    if let Some(module) = required_module(&c.stx) {
      if let Some(t) = self.imported(module) {
        return t;
      };
    };
    self.type_of(c.stx.callee.id).return_type()
  }

  fn binary_type(&self, b: &'a Node<BinaryExpr>) -> TypeRef {
    let left = self.type_of(b.stx.left.id);
    let right = self.type_of(b.stx.right.id);
    TypeRef::named(match b.stx.operator {
      OperatorName::Addition => {
        if left.is_named(STRING) || right.is_named(STRING) {
          STRING
        } else {
          NUMBER
        }
      }
      OperatorName::LogicalAnd | OperatorName::LogicalOr => return left,
      OperatorName::Comma => return right,
      OperatorName::Equality
      | OperatorName::Inequality
      | OperatorName::StrictEquality
      | OperatorName::StrictInequality
      | OperatorName::LessThan
      | OperatorName::LessThanOrEqual
      | OperatorName::GreaterThan
      | OperatorName::GreaterThanOrEqual
      | OperatorName::In
      | OperatorName::Instanceof => BOOLEAN,
      _ => NUMBER,
    })
  }

  fn exit_assignment(
    &mut self,
    e: &'a Node<Expr>,
    b: &'a Node<BinaryExpr>,
  ) -> ControlFlow<Resolution, TypeRef> {
    let left = &b.stx.left;
    let right = self.type_of(b.stx.right.id);
    let mut t = match b.stx.operator {
      OperatorName::Assignment => right,
      OperatorName::AssignmentAddition => {
        if self.type_of(left.id).is_named(STRING) {
          TypeRef::named(STRING)
        } else {
          TypeRef::named(NUMBER)
        }
      }
      _ => TypeRef::named(NUMBER),
    };
    let declared = self
      .docs
      .get(&e.id)
      .cloned()
      .flatten()
      .and_then(|doc| doc.typ);
    if let Some(declared) = declared {
      t = jsdoc::resolve(&mut self.env, &declared);
    };

    match left.stx.as_ref() {
      Expr::Id(id) => {
        let name = &id.stx.name;
        self
          .env
          .add_or_set_variable(name, None, t.clone(), Some(left.loc));
        if left.loc.touches(self.offset) {
          match self.mode {
            Mode::Complete => return ControlFlow::Break(self.visible_names()),
            Mode::Lookup => return ControlFlow::Break(self.binding_of(name)),
            Mode::Summarize => {}
          };
        };
      }
      Expr::Member(m) => {
        if let Some(prop) = &m.stx.property {
          let owner = self.env.owner_of(&self.type_of(m.stx.object.id));
          self.assign_property(&owner, &prop.stx.name, t.clone(), prop.loc);
          if self.mode == Mode::Lookup && prop.loc.touches(self.offset) {
            return ControlFlow::Break(self.binding_in(&prop.stx.name, &owner));
          };
        };
      }
      Expr::ComputedMember(m) => {
        if let Expr::LitStr(key) = m.stx.member.stx.as_ref() {
          let owner = self.env.owner_of(&self.type_of(m.stx.object.id));
          self.assign_property(&owner, &key.stx.value, t.clone(), m.stx.member.loc);
        };
      }
      _ => {}
    };
    ControlFlow::Continue(t)
  }

  fn assign_property(&mut self, owner: &str, name: &str, t: TypeRef, range: Loc) {
    // `Ctor.prototype = {...}` adds to the prototype instances already inherit from, rather than replacing it.
    if name == "prototype" && owner.ends_with(STATIC_SUFFIX) {
      if let Some(source) = t.as_named().filter(|n| is_generated(n)) {
        let proto = self
          .env
          .lookup_in_chain("prototype", owner)
          .and_then(|found| found.def.type_ref.as_named().map(str::to_string));
        if let Some(proto) = proto {
          self.env.copy_members(source, &proto);
          return;
        };
      };
    };
    self
      .env
      .add_or_set_variable(name, Some(owner), t, Some(range));
  }

  fn exit_object(
    &mut self,
    e: &'a Node<Expr>,
    o: &'a Node<LitObjExpr>,
  ) -> ControlFlow<Resolution, TypeRef> {
    let Some(frame) = self.objects.pop() else {
      return ControlFlow::Continue(TypeRef::object());
    };
    let obj = frame.name;
    // Out of the object's scope, so lookups below see what the values refer to.
    self.env.pop_scope();
    if frame.pushed_name {
      self.env.pop_name();
    };
    for m in &o.stx.members {
      let key = &m.stx.key;
      let value = &m.stx.value;
      if !self.fixed.contains(&m.id) {
        let value_type = self.type_of(value.id);
        let t = match m.stx.kind {
          ObjMemberKind::Value => Some(value_type),
          ObjMemberKind::Getter => Some(value_type.return_type()),
          ObjMemberKind::Setter => None,
        };
        if let Some(t) = t {
          let is_function = t.as_function().is_some();
          self
            .env
            .add_variable(&key.stx.name, Some(obj.as_str()), t, Some(key.loc));
          // `{ Widget: Widget }` leads to where the function is declared.
          if let (true, Expr::Id(id)) = (is_function, value.stx.as_ref()) {
            if id.stx.name == key.stx.name {
              if let Some(range) = self
                .env
                .lookup_name(&id.stx.name)
                .and_then(|found| found.def.range)
              {
                self.env.set_range(&obj, &key.stx.name, range);
              };
            };
          };
        };
      };
      if self.mode == Mode::Lookup && key.loc.touches(self.offset) {
        return ControlFlow::Break(self.binding_in(&key.stx.name, &obj));
      };
    }
    if self.mode == Mode::Complete && self.inside_braces(e.loc) {
      let mut scopes = vec![obj];
      scopes.extend(self.env.visible_scopes());
      return ControlFlow::Break(Resolution::Scopes(scopes));
    };
    ControlFlow::Continue(TypeRef::Named(obj))
  }
}
