use crate::env::Environment;
use crate::types::TypeRef;
use crate::types::ARRAY;
use crate::types::BOOLEAN;
use crate::types::FUNCTION;
use crate::types::NUMBER;
use crate::types::OBJECT;
use crate::types::STRING;
use crate::types::UNDEFINED;
use assist_parse_js::comment::Comment;
use assist_parse_js::jsdoc::parse_doc_comment;
use assist_parse_js::jsdoc::DocComment;
use assist_parse_js::jsdoc::TypeExpr;
use tracing::warn;

/// Parses a doc comment, logging and dropping it if it's malformed.
pub fn read_doc(comment: &Comment) -> Option<DocComment> {
  match parse_doc_comment(&comment.body) {
    Ok(doc) if doc.is_empty() => None,
    Ok(doc) => Some(doc),
    Err(err) => {
      warn!(start = comment.loc.0, %err, "ignoring malformed JSDoc");
      None
    }
  }
}

fn alias(name: &str) -> Option<&'static str> {
  Some(match name {
    "string" => STRING,
    "number" => NUMBER,
    "boolean" | "bool" => BOOLEAN,
    "object" | "null" => OBJECT,
    "function" => FUNCTION,
    "array" => ARRAY,
    "undefined" | "void" => UNDEFINED,
    _ => return None,
  })
}

/// Turns a JSDoc type into a type in `env`'s table. Names that aren't known are treated as `Object`.
pub fn resolve(env: &mut Environment, t: &TypeExpr) -> TypeRef {
  match t {
    TypeExpr::Any => TypeRef::object(),
    TypeExpr::Name(name) => resolve_name(env, name),
    // Type parameters are not tracked.
    TypeExpr::Generic { base, .. } => resolve_name(env, base),
    TypeExpr::Record(fields) => {
      let record = env.new_fleeting_object();
      for (key, typ) in fields {
        let field_type = match typ {
          Some(typ) => resolve(env, typ),
          None => TypeRef::object(),
        };
        env.add_variable(key, Some(record.as_str()), field_type, None);
      }
      TypeRef::Named(record)
    }
    TypeExpr::Function {
      params,
      new,
      ret,
      ..
    } => {
      let names = (0..params.len()).map(|i| format!("arg{i}")).collect();
      match new {
        Some(instance) => TypeRef::constructor(names, resolve(env, instance)),
        None => {
          let ret = match ret {
            Some(ret) => resolve(env, ret),
            None => TypeRef::undefined(),
          };
          TypeRef::function(names, ret)
        }
      }
    }
    // The first alternative stands for the union.
    TypeExpr::Union(members) => match members.first() {
      Some(first) => resolve(env, first),
      None => TypeRef::object(),
    },
    TypeExpr::Optional(inner) | TypeExpr::Rest(inner) => resolve(env, inner),
  }
}

fn resolve_name(env: &Environment, name: &str) -> TypeRef {
  if let Some(builtin) = alias(name) {
    return TypeRef::named(builtin);
  };
  if env.table.contains(name) {
    return TypeRef::named(name);
  };
  // A constructor declared in this file, e.g. `@type {Widget}`.
  if let Some(found) = env.lookup_name(name) {
    if let Some(f) = found.def.type_ref.as_function() {
      if f.is_constructor {
        return (*f.return_type).clone();
      };
    };
  };
  TypeRef::object()
}

#[cfg(test)]
mod tests {
  use super::resolve;
  use crate::env::Environment;
  use crate::env::NameGenerator;
  use crate::options::GlobalFlavor;
  use crate::types::TypeRef;
  use assist_parse_js::jsdoc::parse_type_expr;

  fn resolved(env: &mut Environment, text: &str) -> TypeRef {
    let t = parse_type_expr(text).unwrap();
    resolve(env, &t)
  }

  #[test]
  fn test_resolve() {
    let mut env = Environment::new(NameGenerator::new("t"), GlobalFlavor::Plain);
    assert_eq!(resolved(&mut env, "string"), TypeRef::named("String"));
    assert_eq!(resolved(&mut env, "Array.<Number>"), TypeRef::named("Array"));
    assert_eq!(resolved(&mut env, "(Number|String)"), TypeRef::named("Number"));
    assert_eq!(resolved(&mut env, "Unknown"), TypeRef::object());
    assert_eq!(
      resolved(&mut env, "function(String):Boolean"),
      TypeRef::function(vec!["arg0".to_string()], TypeRef::named("Boolean"))
    );
    let record = resolved(&mut env, "{a: Number}");
    assert_eq!(env.table.render(&record), "{a:Number}");
  }

  #[test]
  fn test_resolve_constructor_name() {
    let mut env = Environment::new(NameGenerator::new("t"), GlobalFlavor::Plain);
    let instance = env.create_constructor("Widget");
    env.add_variable(
      "Widget",
      None,
      TypeRef::constructor(vec![], TypeRef::named(instance)),
      None,
    );
    assert_eq!(resolved(&mut env, "Widget"), TypeRef::named("Widget"));
    assert_eq!(
      resolved(&mut env, "function(new:Widget)"),
      TypeRef::constructor(vec![], TypeRef::named("Widget"))
    );
  }
}
