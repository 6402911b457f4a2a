use crate::types::Type;
use crate::types::TypeName;
use crate::types::TypeRef;
use crate::types::TypeTable;
use crate::types::PROTO_SUFFIX;
use crate::types::STATIC_SUFFIX;
use ahash::HashSet;
use ahash::HashSetExt;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleKind {
  #[serde(rename = "AMD")]
  Amd,
  #[serde(rename = "commonjs")]
  CommonJs,
  #[serde(rename = "global")]
  Global,
}

/// What one file offers its dependents: the exported value's type and every non-builtin type it reaches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
  pub provided: TypeRef,
  pub types: BTreeMap<TypeName, Type>,
  pub kind: ModuleKind,
}

impl Summary {
  /// Collects the types reachable from `provided`, leaving out builtins.
  pub fn build(table: &TypeTable, provided: TypeRef, kind: ModuleKind) -> Summary {
    let mut types = BTreeMap::new();
    let mut seen = HashSet::new();
    let mut queue = Vec::new();
    enqueue(&provided, &mut queue);
    while let Some(name) = queue.pop() {
      if !seen.insert(name.clone()) {
        continue;
      };
      let Some(typ) = table.get(&name) else {
        continue;
      };
      if typ.is_builtin {
        continue;
      };
      for def in typ.properties.values() {
        enqueue(&def.type_ref, &mut queue);
      }
      if let Some(proto) = &typ.proto {
        queue.push(proto.clone());
      };
      types.insert(name, typ.clone());
    }
    Summary {
      provided,
      types,
      kind,
    }
  }

  /// The provided type's name, if it is an object rather than a function.
  pub fn provided_name(&self) -> Option<&str> {
    self.provided.as_named()
  }
}

fn enqueue(t: &TypeRef, queue: &mut Vec<TypeName>) {
  match t {
    TypeRef::Named(n) => queue.push(n.clone()),
    TypeRef::Function(f) => {
      enqueue(&f.return_type, queue);
      if f.is_constructor {
        if let TypeRef::Named(instance) = f.return_type.as_ref() {
          queue.push(format!("{instance}{PROTO_SUFFIX}"));
          queue.push(format!("{instance}{STATIC_SUFFIX}"));
        };
      };
    }
  }
}

#[cfg(test)]
mod tests {
  use super::ModuleKind;
  use super::Summary;
  use crate::builtins::builtin_table;
  use crate::types::PropertyDefinition;
  use crate::types::Type;
  use crate::types::TypeRef;

  #[test]
  fn test_build_prunes_unreachable_and_builtins() {
    let mut table = builtin_table();
    let mut exported = Type::with_proto("Object");
    exported.properties.insert(
      "make".to_string(),
      PropertyDefinition::new(
        TypeRef::function(vec![], TypeRef::named("gen~f~2")),
        None,
      ),
    );
    table.insert("gen~f~1".to_string(), exported);
    table.insert("gen~f~2".to_string(), Type::with_proto("Object"));
    table.insert("gen~f~3".to_string(), Type::with_proto("Object"));
    let summary = Summary::build(&table, TypeRef::named("gen~f~1"), ModuleKind::Amd);
    let names: Vec<_> = summary.types.keys().map(|k| k.as_str()).collect();
    assert_eq!(names, ["gen~f~1", "gen~f~2"]);
  }

  #[test]
  fn test_kind_serialization() {
    let json = serde_json::to_string(&[ModuleKind::Amd, ModuleKind::CommonJs, ModuleKind::Global]).unwrap();
    assert_eq!(json, r#"["AMD","commonjs","global"]"#);
  }
}
