use crate::builtins;
use crate::builtins::builtin_table;
use crate::options::GlobalFlavor;
use crate::summary::Summary;
use crate::types::PropertyDefinition;
use crate::types::Type;
use crate::types::TypeName;
use crate::types::TypeRef;
use crate::types::TypeTable;
use crate::types::FUNCTION;
use crate::types::GENERATED_PREFIX;
use crate::types::MAX_CHAIN_DEPTH;
use crate::types::OBJECT;
use crate::types::PROTO_SUFFIX;
use crate::types::STATIC_SUFFIX;
use ahash::HashSet;
use ahash::HashSetExt;
use assist_parse_js::loc::Loc;

/// Hands out `gen~<file>~<n>` names, unique within one file's analysis.
#[derive(Debug)]
pub struct NameGenerator {
  file_uid: String,
  next: u32,
}

impl NameGenerator {
  pub fn new(file_uid: impl Into<String>) -> NameGenerator {
    NameGenerator {
      file_uid: file_uid.into(),
      next: 0,
    }
  }

  pub fn file_uid(&self) -> &str {
    &self.file_uid
  }

  pub fn next_name(&mut self) -> TypeName {
    self.next += 1;
    format!("{}{}~{}", GENERATED_PREFIX, self.file_uid, self.next)
  }
}

/// Where a binding was found, along with a copy of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lookup {
  pub owner: TypeName,
  pub def: PropertyDefinition,
}

/// The scope stack and type table of one analysis run.
#[derive(Debug)]
pub struct Environment {
  pub table: TypeTable,
  scopes: Vec<TypeName>,
  names: Vec<String>,
  ids: NameGenerator,
  global_scope: TypeName,
}

impl Environment {
  /// Creates an environment whose only scope is a fresh global scope inheriting from the flavor's builtin global.
  pub fn new(ids: NameGenerator, flavor: GlobalFlavor) -> Environment {
    let mut table = builtin_table();
    let mut ids = ids;
    let global_scope = ids.next_name();
    let mut global = Type::with_proto(builtins::global_type(flavor));
    global.properties.insert(
      "this".to_string(),
      PropertyDefinition::new(TypeRef::named(builtins::global_this(flavor)), None),
    );
    table.insert(global_scope.clone(), global);
    Environment {
      table,
      scopes: vec![global_scope.clone()],
      names: Vec::new(),
      ids,
      global_scope,
    }
  }

  pub fn file_uid(&self) -> &str {
    self.ids.file_uid()
  }

  pub fn scope(&self) -> &TypeName {
    // The global scope is never popped.
    self.scopes.last().unwrap_or(&self.global_scope)
  }

  pub fn global_scope(&self) -> &TypeName {
    &self.global_scope
  }

  /// The scope stack, innermost first.
  pub fn visible_scopes(&self) -> Vec<TypeName> {
    self.scopes.iter().rev().cloned().collect()
  }

  pub fn scope_depth(&self) -> usize {
    self.scopes.len()
  }

  fn add_type(&mut self, proto: &str) -> TypeName {
    let name = self.ids.next_name();
    self.table.insert(name.clone(), Type::with_proto(proto));
    name
  }

  /// Pushes a lexical scope nested in the current one.
  pub fn new_scope(&mut self) -> TypeName {
    let parent = self.scope().clone();
    let name = self.add_type(&parent);
    self.scopes.push(name.clone());
    name
  }

  /// Pushes a new object literal type, which is also the scope `this` refers to within it.
  pub fn new_object(&mut self, range: Option<Loc>) -> TypeName {
    let name = self.add_type(OBJECT);
    self.scopes.push(name.clone());
    self.set_property(&name, "this", TypeRef::named(name.clone()), range);
    name
  }

  /// Creates an empty object type without entering it.
  pub fn new_fleeting_object(&mut self) -> TypeName {
    self.add_type(OBJECT)
  }

  pub fn pop_scope(&mut self) {
    if self.scopes.len() <= 1 {
      return;
    };
    if let Some(scope) = self.scopes.pop() {
      if let Some(t) = self.table.get_mut(&scope) {
        t.properties.remove("this");
      };
    };
  }

  pub fn push_name(&mut self, name: impl Into<String>) {
    self.names.push(name.into());
  }

  pub fn pop_name(&mut self) {
    self.names.pop();
  }

  /// `name` prefixed by the names of the enclosing declarations, e.g. `outer.Inner`.
  pub fn qualify(&self, name: &str) -> String {
    let mut q = self.names.join(".");
    if !q.is_empty() {
      q.push('.');
    };
    q.push_str(name);
    q
  }

  // Unconditional write, except into builtins.
  fn set_property(&mut self, owner: &str, name: &str, t: TypeRef, range: Option<Loc>) {
    let Some(typ) = self.table.get_mut(owner) else {
      return;
    };
    if typ.is_builtin {
      return;
    };
    typ
      .properties
      .insert(name.to_string(), PropertyDefinition::new(t, range));
  }

  // Writes `name` into `owner`, keeping an existing binding that is more specific than `t`.
  fn write_guarded(&mut self, owner: &str, name: &str, t: TypeRef, range: Option<Loc>) {
    if builtins::is_object_member(name) {
      return;
    };
    let may_replace = match self.table.get(owner) {
      None => return,
      Some(typ) if typ.is_builtin => return,
      Some(typ) => match typ.properties.get(name) {
        Some(existing) => self.table.may_replace(&existing.type_ref, &t),
        None => true,
      },
    };
    if !may_replace {
      return;
    };
    let Some(typ) = self.table.get_mut(owner) else {
      return;
    };
    // The first definition site sticks, so definitions lead to the declaration.
    let def = match typ.properties.get(name) {
      Some(existing) => PropertyDefinition {
        type_ref: t,
        range: existing.range.or(range),
        origin: existing.origin.clone(),
      },
      None => PropertyDefinition::new(t, range),
    };
    typ.properties.insert(name.to_string(), def);
  }

  /// Binds `name` on `target`, or in the current scope.
  pub fn add_variable(&mut self, name: &str, target: Option<&str>, t: TypeRef, range: Option<Loc>) {
    let owner = target.unwrap_or(self.scope().as_str()).to_string();
    self.write_guarded(&owner, name, t, range);
  }

  /// Rebinds `name` wherever it's found along the chain from `target` (or from the current scope).
  ///
  /// A name not found anywhere is added to `target`, or to the global scope when there is no target, as an assignment to an undeclared variable would.
  pub fn add_or_set_variable(
    &mut self,
    name: &str,
    target: Option<&str>,
    t: TypeRef,
    range: Option<Loc>,
  ) {
    let found = match target {
      Some(target) => self.lookup_in_chain(name, target),
      None => self.lookup_name(name),
    };
    let owner = match (found, target) {
      (Some(found), _) => found.owner,
      (None, Some(target)) => target.to_string(),
      (None, None) => self.global_scope.clone(),
    };
    self.write_guarded(&owner, name, t, range);
  }

  /// Points an existing binding at a different definition site.
  pub fn set_range(&mut self, owner: &str, name: &str, range: Loc) {
    if let Some(def) = self
      .table
      .get_mut(owner)
      .filter(|t| !t.is_builtin)
      .and_then(|t| t.properties.get_mut(name))
    {
      def.range = Some(range);
    };
  }

  /// Finds `name` along the prototype chain starting at `start`.
  pub fn lookup_in_chain(&self, name: &str, start: &str) -> Option<Lookup> {
    let mut seen = HashSet::new();
    self.lookup_in_chain_with(name, start, &mut seen)
  }

  fn lookup_in_chain_with(
    &self,
    name: &str,
    start: &str,
    seen: &mut HashSet<TypeName>,
  ) -> Option<Lookup> {
    let mut cur = start.to_string();
    for _ in 0..MAX_CHAIN_DEPTH {
      if !seen.insert(cur.clone()) {
        return None;
      };
      let typ = self.table.get(&cur)?;
      if let Some(def) = typ.properties.get(name) {
        return Some(Lookup {
          owner: cur,
          def: def.clone(),
        });
      };
      cur = typ.proto.clone()?;
    }
    None
  }

  /// Resolves a bare name from the current scope outwards.
  ///
  /// Object literal scopes inherit from `Object` rather than their enclosing scope, so the enclosing scopes on the stack are searched after them.
  pub fn lookup_name(&self, name: &str) -> Option<Lookup> {
    let mut seen = HashSet::new();
    self
      .scopes
      .iter()
      .rev()
      .find_map(|scope| self.lookup_in_chain_with(name, scope, &mut seen))
  }

  /// Copies the summary's types in without replacing any already present, then its exported members onto `target` if given.
  pub fn merge_summary(&mut self, summary: &Summary, origin: &str, target: Option<&str>) {
    for (name, typ) in &summary.types {
      if self.table.contains(name) {
        continue;
      };
      let mut typ = typ.clone();
      for def in typ.properties.values_mut() {
        def.origin.get_or_insert_with(|| origin.to_string());
      }
      self.table.insert(name.clone(), typ);
    }
    let Some(target) = target else {
      return;
    };
    let Some(provided) = summary.provided_name() else {
      return;
    };
    let Some(exported) = self.table.get(provided).cloned() else {
      return;
    };
    if self.table.is_builtin(target) {
      return;
    };
    let Some(target) = self.table.get_mut(target) else {
      return;
    };
    for (name, def) in exported.properties {
      if name == "this" {
        continue;
      };
      target.properties.insert(name, def);
    }
  }

  /// Sets up the types behind a constructor and returns its instance type.
  ///
  /// Instances inherit from `<instance>~proto`, which is what `Ctor.prototype` evaluates to, so members added there are visible on instances created at any point in the file. `<instance>~static` holds members added to the constructor itself.
  pub fn create_constructor(&mut self, qualified: &str) -> TypeName {
    let instance = if self.table.is_builtin(qualified) {
      self.ids.next_name()
    } else {
      qualified.to_string()
    };
    let proto = format!("{instance}{PROTO_SUFFIX}");
    let statics = format!("{instance}{STATIC_SUFFIX}");
    if !self.table.contains(&proto) {
      self.table.insert(proto.clone(), Type::with_proto(OBJECT));
    };
    if !self.table.contains(&statics) {
      let mut t = Type::with_proto(FUNCTION);
      t.properties.insert(
        "prototype".to_string(),
        PropertyDefinition::new(TypeRef::named(proto.clone()), None),
      );
      self.table.insert(statics, t);
    };
    match self.table.get_mut(&instance) {
      Some(t) => t.proto = Some(proto),
      None => self.table.insert(instance.clone(), Type::with_proto(proto)),
    };
    instance
  }

  /// The type that holds the properties of a value of type `t`.
  pub fn owner_of(&self, t: &TypeRef) -> TypeName {
    match t {
      TypeRef::Named(n) => n.clone(),
      TypeRef::Function(f) if f.is_constructor => match f.return_type.as_named() {
        Some(instance) => {
          let statics = format!("{instance}{STATIC_SUFFIX}");
          if self.table.contains(&statics) {
            statics
          } else {
            FUNCTION.to_string()
          }
        }
        None => FUNCTION.to_string(),
      },
      TypeRef::Function(_) => FUNCTION.to_string(),
    }
  }

  /// Copies `source`'s own members onto `target`, as `Ctor.prototype = {...}` does for instances.
  pub fn copy_members(&mut self, source: &str, target: &str) {
    let Some(members) = self.table.get(source).map(|t| t.properties.clone()) else {
      return;
    };
    for (name, def) in members {
      if name == "this" {
        continue;
      };
      self.write_guarded(target, &name, def.type_ref, def.range);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::Environment;
  use super::NameGenerator;
  use crate::options::GlobalFlavor;
  use crate::summary::ModuleKind;
  use crate::summary::Summary;
  use crate::types::PropertyDefinition;
  use crate::types::Type;
  use crate::types::TypeRef;
  use assist_parse_js::loc::Loc;
  use std::collections::BTreeMap;

  fn env() -> Environment {
    Environment::new(NameGenerator::new("t"), GlobalFlavor::Plain)
  }

  #[test]
  fn test_scopes_shadow_and_pop() {
    let mut env = env();
    env.add_variable("x", None, TypeRef::named("Number"), None);
    let inner = env.new_scope();
    env.add_variable("x", None, TypeRef::named("String"), None);
    assert_eq!(env.lookup_name("x").unwrap().owner, inner);
    assert_eq!(env.lookup_name("x").unwrap().def.type_ref, TypeRef::named("String"));
    env.pop_scope();
    assert_eq!(env.lookup_name("x").unwrap().def.type_ref, TypeRef::named("Number"));
    // The global scope stays.
    env.pop_scope();
    assert_eq!(env.scope_depth(), 1);
  }

  #[test]
  fn test_object_scope_sees_enclosing_scopes() {
    let mut env = env();
    env.add_variable("outer", None, TypeRef::named("Number"), None);
    let obj = env.new_object(None);
    assert_eq!(env.lookup_name("this").unwrap().def.type_ref, TypeRef::named(obj.clone()));
    assert!(env.lookup_name("outer").is_some());
    env.pop_scope();
    assert!(env.table.get(&obj).unwrap().properties.get("this").is_none());
  }

  #[test]
  fn test_builtins_are_immutable() {
    let mut env = env();
    env.add_variable("foo", Some("String"), TypeRef::named("Number"), None);
    assert!(env.table.get("String").unwrap().properties.get("foo").is_none());
    // Found on a builtin in the chain, so the write is dropped rather than added elsewhere.
    env.add_or_set_variable("parseInt", None, TypeRef::named("String"), None);
    assert!(env.lookup_name("parseInt").unwrap().def.type_ref.as_function().is_some());
  }

  #[test]
  fn test_object_member_names_are_reserved() {
    let mut env = env();
    let obj = env.new_fleeting_object();
    env.add_variable("toString", Some(obj.as_str()), TypeRef::named("Number"), None);
    assert!(env.table.get(&obj).unwrap().properties.is_empty());
  }

  #[test]
  fn test_add_or_set_overwrites_in_place() {
    let mut env = env();
    env.add_variable("x", None, TypeRef::object(), Some(Loc(0, 1)));
    let global = env.scope().clone();
    env.new_scope();
    env.add_or_set_variable("x", None, TypeRef::named("Number"), None);
    let found = env.lookup_name("x").unwrap();
    assert_eq!(found.owner, global);
    assert_eq!(found.def.type_ref, TypeRef::named("Number"));
    // The declaration site is kept.
    assert_eq!(found.def.range, Some(Loc(0, 1)));
    // Implicit globals go to the global scope even from a nested scope.
    env.add_or_set_variable("fresh", None, TypeRef::named("Number"), None);
    assert_eq!(env.lookup_name("fresh").unwrap().owner, global);
  }

  #[test]
  fn test_constructor_types() {
    let mut env = env();
    let instance = env.create_constructor("Fun");
    assert_eq!(instance, "Fun");
    assert_eq!(env.table.chain("Fun"), ["Fun", "Fun~proto", "Object"]);
    let ctor = TypeRef::constructor(vec![], TypeRef::named("Fun"));
    let statics = env.owner_of(&ctor);
    assert_eq!(
      env.lookup_in_chain("prototype", &statics).unwrap().def.type_ref,
      TypeRef::named("Fun~proto")
    );
    // Shadowing a builtin gets a generated name instead.
    assert!(env.create_constructor("Object").starts_with("gen~t~"));
  }

  #[test]
  fn test_merge_summary() {
    let mut env = env();
    let mut exported = Type::with_proto("Object");
    exported.properties.insert(
      "helper".to_string(),
      PropertyDefinition::new(TypeRef::named("gen~other~2"), Some(Loc(4, 10))),
    );
    let mut types = BTreeMap::new();
    types.insert("gen~other~1".to_string(), exported);
    types.insert("gen~other~2".to_string(), Type::with_proto("Object"));
    let summary = Summary {
      provided: TypeRef::named("gen~other~1"),
      types,
      kind: ModuleKind::Global,
    };
    let global = env.global_scope().clone();
    env.merge_summary(&summary, "other.js", Some(global.as_str()));
    let found = env.lookup_name("helper").unwrap();
    assert_eq!(found.owner, global);
    assert_eq!(found.def.origin.as_deref(), Some("other.js"));
    assert!(env.table.contains("gen~other~2"));
  }
}
