use ahash::HashMap;
use ahash::HashMapExt;
use assist_parse_js::loc::Loc;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

pub type TypeName = String;

pub const UNDEFINED: &str = "undefined";
pub const OBJECT: &str = "Object";
pub const STRING: &str = "String";
pub const NUMBER: &str = "Number";
pub const BOOLEAN: &str = "Boolean";
pub const ARRAY: &str = "Array";
pub const FUNCTION: &str = "Function";
pub const ERROR: &str = "Error";
pub const REGEXP: &str = "RegExp";
pub const ARGUMENTS: &str = "Arguments";

/// Prefix of names for anonymous structural types, followed by the file uid and a counter.
pub const GENERATED_PREFIX: &str = "gen~";
/// Suffix of the type instances of a constructor inherit from, i.e. `Ctor.prototype`.
pub const PROTO_SUFFIX: &str = "~proto";
/// Suffix of the type holding a constructor's own properties, like `Ctor.create`.
pub const STATIC_SUFFIX: &str = "~static";

/// Walks along prototype links give up after this many steps, so a cyclic chain ends quietly.
pub const MAX_CHAIN_DEPTH: usize = 100;

pub fn is_generated(name: &str) -> bool {
  name.starts_with(GENERATED_PREFIX)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionType {
  pub is_constructor: bool,
  /// For constructors, the instance type.
  pub return_type: Box<TypeRef>,
  pub params: Vec<String>,
}

/// What a binding or expression evaluates to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeRef {
  Named(TypeName),
  Function(FunctionType),
}

impl TypeRef {
  pub fn named(name: impl Into<TypeName>) -> TypeRef {
    TypeRef::Named(name.into())
  }

  pub fn undefined() -> TypeRef {
    TypeRef::named(UNDEFINED)
  }

  pub fn object() -> TypeRef {
    TypeRef::named(OBJECT)
  }

  pub fn function(params: Vec<String>, return_type: TypeRef) -> TypeRef {
    TypeRef::Function(FunctionType {
      is_constructor: false,
      return_type: Box::new(return_type),
      params,
    })
  }

  pub fn constructor(params: Vec<String>, instance: TypeRef) -> TypeRef {
    TypeRef::Function(FunctionType {
      is_constructor: true,
      return_type: Box::new(instance),
      params,
    })
  }

  pub fn as_named(&self) -> Option<&str> {
    match self {
      TypeRef::Named(n) => Some(n),
      TypeRef::Function(_) => None,
    }
  }

  pub fn as_function(&self) -> Option<&FunctionType> {
    match self {
      TypeRef::Function(f) => Some(f),
      TypeRef::Named(_) => None,
    }
  }

  pub fn is_named(&self, name: &str) -> bool {
    self.as_named() == Some(name)
  }

  /// The result of calling or instantiating a value of this type.
  pub fn return_type(&self) -> TypeRef {
    match self {
      TypeRef::Function(f) => (*f.return_type).clone(),
      TypeRef::Named(_) => TypeRef::object(),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinition {
  pub type_ref: TypeRef,
  pub range: Option<Loc>,
  /// The file that declared it, when it came from another file's summary.
  pub origin: Option<String>,
}

impl PropertyDefinition {
  pub fn new(type_ref: TypeRef, range: Option<Loc>) -> PropertyDefinition {
    PropertyDefinition {
      type_ref,
      range,
      origin: None,
    }
  }
}

/// A property bag with a prototype link. Scopes are types too.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Type {
  pub properties: BTreeMap<String, PropertyDefinition>,
  pub proto: Option<TypeName>,
  pub is_builtin: bool,
}

impl Type {
  pub fn with_proto(proto: impl Into<TypeName>) -> Type {
    Type {
      properties: BTreeMap::new(),
      proto: Some(proto.into()),
      is_builtin: false,
    }
  }
}

#[derive(Clone, Debug, Default)]
pub struct TypeTable {
  types: HashMap<TypeName, Type>,
}

impl TypeTable {
  pub fn new() -> TypeTable {
    TypeTable {
      types: HashMap::new(),
    }
  }

  pub fn get(&self, name: &str) -> Option<&Type> {
    self.types.get(name)
  }

  pub fn get_mut(&mut self, name: &str) -> Option<&mut Type> {
    self.types.get_mut(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.types.contains_key(name)
  }

  pub fn insert(&mut self, name: TypeName, typ: Type) {
    self.types.insert(name, typ);
  }

  pub fn len(&self) -> usize {
    self.types.len()
  }

  pub fn is_empty(&self) -> bool {
    self.types.is_empty()
  }

  pub fn is_builtin(&self, name: &str) -> bool {
    self.get(name).is_some_and(|t| t.is_builtin)
  }

  /// All type names in a stable order.
  pub fn sorted_names(&self) -> Vec<&TypeName> {
    let mut names: Vec<_> = self.types.keys().collect();
    names.sort();
    names
  }

  /// `name` followed by every type on its prototype chain.
  pub fn chain(&self, name: &str) -> Vec<TypeName> {
    let mut chain = Vec::new();
    let mut next = Some(name.to_string());
    while let Some(cur) = next {
      if chain.len() >= MAX_CHAIN_DEPTH || chain.contains(&cur) {
        break;
      };
      next = self.get(&cur).and_then(|t| t.proto.clone());
      chain.push(cur);
    }
    chain
  }

  /// A generated type with no properties of its own, nor on any generated type it inherits from.
  pub fn is_empty_generated(&self, name: &str) -> bool {
    let mut cur = name;
    for _ in 0..MAX_CHAIN_DEPTH {
      if !is_generated(cur) {
        return true;
      };
      let Some(t) = self.get(cur) else {
        return true;
      };
      if !t.properties.is_empty() {
        return false;
      };
      match &t.proto {
        Some(p) => cur = p,
        None => return true,
      };
    }
    true
  }

  /// Specificity of a type, least specific first. A binding may only be rebound to a type of equal or higher rank.
  pub fn generality_rank(&self, t: &TypeRef) -> u8 {
    match t {
      TypeRef::Named(n) if n == UNDEFINED => 0,
      TypeRef::Named(n) if n == OBJECT => 1,
      TypeRef::Named(n) if is_generated(n) => {
        if self.is_empty_generated(n) {
          2
        } else {
          3
        }
      }
      _ => 4,
    }
  }

  /// Whether a binding currently of type `existing` may be rebound to `new`.
  pub fn may_replace(&self, existing: &TypeRef, new: &TypeRef) -> bool {
    self.generality_rank(existing) <= self.generality_rank(new)
  }

  pub fn render(&self, t: &TypeRef) -> String {
    self.render_with_depth(t, 0)
  }

  fn render_with_depth(&self, t: &TypeRef, depth: usize) -> String {
    match t {
      TypeRef::Function(f) => {
        let params = f.params.join(",");
        if f.is_constructor {
          format!("new {}({})", self.render_with_depth(&f.return_type, depth + 1), params)
        } else {
          format!(
            "function({}):{}",
            params,
            self.render_with_depth(&f.return_type, depth + 1)
          )
        }
      }
      TypeRef::Named(n) if is_generated(n) => {
        let Some(typ) = self.get(n) else {
          return "{}".to_string();
        };
        if typ.properties.is_empty() {
          return "{}".to_string();
        };
        if depth > 0 {
          return "{...}".to_string();
        };
        let members: Vec<_> = typ
          .properties
          .iter()
          .map(|(k, v)| format!("{}:{}", k, self.render_with_depth(&v.type_ref, depth + 1)))
          .collect();
        format!("{{{}}}", members.join(","))
      }
      TypeRef::Named(n) => match n.strip_suffix(PROTO_SUFFIX) {
        Some(ctor) => format!("{ctor}.prototype"),
        None => n.clone(),
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::PropertyDefinition;
  use super::Type;
  use super::TypeRef;
  use super::TypeTable;

  fn table() -> TypeTable {
    let mut table = TypeTable::new();
    table.insert("gen~t~1".to_string(), Type::with_proto("Object"));
    let mut a = Type::with_proto("Object");
    a.properties.insert(
      "a".to_string(),
      PropertyDefinition::new(TypeRef::named("Number"), None),
    );
    table.insert("gen~t~2".to_string(), a);
    // Empty, but inherits from a non-empty generated type.
    table.insert("gen~t~3".to_string(), Type::with_proto("gen~t~2"));
    table
  }

  #[test]
  fn test_generality_order() {
    let table = table();
    let order = [
      TypeRef::undefined(),
      TypeRef::object(),
      TypeRef::named("gen~t~1"),
      TypeRef::named("gen~t~2"),
      TypeRef::named("String"),
    ];
    for (i, lo) in order.iter().enumerate() {
      for hi in &order[i + 1..] {
        assert!(table.may_replace(lo, hi), "{lo:?} -> {hi:?}");
        assert!(!table.may_replace(hi, lo), "{hi:?} -> {lo:?}");
      }
    }
    assert!(table.may_replace(&TypeRef::named("gen~t~2"), &TypeRef::named("gen~t~3")));
  }

  #[test]
  fn test_render() {
    let table = table();
    assert_eq!(table.render(&TypeRef::named("gen~t~1")), "{}");
    assert_eq!(table.render(&TypeRef::named("gen~t~2")), "{a:Number}");
    assert_eq!(
      table.render(&TypeRef::function(
        vec!["x".to_string()],
        TypeRef::named("gen~t~2")
      )),
      "function(x):{...}"
    );
    assert_eq!(
      table.render(&TypeRef::constructor(vec![], TypeRef::named("Fun"))),
      "new Fun()"
    );
    assert_eq!(table.render(&TypeRef::named("Fun~proto")), "Fun.prototype");
  }

  #[test]
  fn test_chain_stops_on_cycle() {
    let mut table = TypeTable::new();
    table.insert("A".to_string(), Type::with_proto("B"));
    table.insert("B".to_string(), Type::with_proto("A"));
    assert_eq!(table.chain("A"), ["A", "B"]);
  }
}
