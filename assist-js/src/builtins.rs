use crate::options::GlobalFlavor;
use crate::types::PropertyDefinition;
use crate::types::Type;
use crate::types::TypeName;
use crate::types::TypeRef;
use crate::types::TypeTable;
use crate::types::ARGUMENTS;
use crate::types::ARRAY;
use crate::types::BOOLEAN;
use crate::types::ERROR;
use crate::types::FUNCTION;
use crate::types::NUMBER;
use crate::types::OBJECT;
use crate::types::REGEXP;
use crate::types::STRING;
use crate::types::UNDEFINED;
use once_cell::sync::Lazy;

pub const GLOBAL: &str = "Global";
pub const WINDOW: &str = "Window";
pub const MODULE: &str = "Module";

// One member of a builtin type: `(name, params, type)`. `params` is None for plain fields.
type Member = (&'static str, Option<&'static [&'static str]>, Kind);

#[derive(Clone, Copy)]
enum Kind {
  Is(&'static str),
  Ctor(&'static str),
}

const fn field(name: &'static str, typ: &'static str) -> Member {
  (name, None, Kind::Is(typ))
}

const fn method(name: &'static str, params: &'static [&'static str], ret: &'static str) -> Member {
  (name, Some(params), Kind::Is(ret))
}

const fn ctor(name: &'static str, params: &'static [&'static str]) -> Member {
  (name, Some(params), Kind::Ctor(name))
}

const OBJECT_MEMBERS: &[Member] = &[
  method("hasOwnProperty", &["property"], BOOLEAN),
  method("isPrototypeOf", &["object"], BOOLEAN),
  method("propertyIsEnumerable", &["property"], BOOLEAN),
  method("toLocaleString", &[], STRING),
  method("toString", &[], STRING),
  method("valueOf", &[], OBJECT),
];

const STRING_MEMBERS: &[Member] = &[
  method("charAt", &["index"], STRING),
  method("charCodeAt", &["index"], NUMBER),
  method("concat", &["str"], STRING),
  method("indexOf", &["searchString", "position"], NUMBER),
  method("lastIndexOf", &["searchString", "position"], NUMBER),
  field("length", NUMBER),
  method("localeCompare", &["that"], NUMBER),
  method("match", &["regexp"], ARRAY),
  method("replace", &["searchValue", "replaceValue"], STRING),
  method("search", &["regexp"], NUMBER),
  method("slice", &["start", "end"], STRING),
  method("split", &["separator", "limit"], ARRAY),
  method("substr", &["start", "length"], STRING),
  method("substring", &["start", "end"], STRING),
  method("toLocaleLowerCase", &[], STRING),
  method("toLocaleUpperCase", &[], STRING),
  method("toLowerCase", &[], STRING),
  method("toUpperCase", &[], STRING),
  method("trim", &[], STRING),
];

const NUMBER_MEMBERS: &[Member] = &[
  method("toExponential", &["digits"], STRING),
  method("toFixed", &["digits"], STRING),
  method("toPrecision", &["digits"], STRING),
];

const ARRAY_MEMBERS: &[Member] = &[
  method("concat", &["first", "rest"], ARRAY),
  method("every", &["callbackfn", "thisArg"], BOOLEAN),
  method("filter", &["callbackfn", "thisArg"], ARRAY),
  method("forEach", &["callbackfn", "thisArg"], UNDEFINED),
  method("indexOf", &["searchElement", "fromIndex"], NUMBER),
  method("join", &["separator"], STRING),
  method("lastIndexOf", &["searchElement", "fromIndex"], NUMBER),
  field("length", NUMBER),
  method("map", &["callbackfn", "thisArg"], ARRAY),
  method("pop", &[], OBJECT),
  method("push", &["first", "rest"], NUMBER),
  method("reduce", &["callbackfn", "initialValue"], OBJECT),
  method("reduceRight", &["callbackfn", "initialValue"], OBJECT),
  method("reverse", &[], ARRAY),
  method("shift", &[], OBJECT),
  method("slice", &["start", "end"], ARRAY),
  method("some", &["callbackfn", "thisArg"], BOOLEAN),
  method("sort", &["compareFn"], ARRAY),
  method("splice", &["start", "deleteCount", "items"], ARRAY),
  method("unshift", &["items"], NUMBER),
];

const FUNCTION_MEMBERS: &[Member] = &[
  method("apply", &["thisArg", "argArray"], OBJECT),
  method("bind", &["thisArg", "args"], FUNCTION),
  method("call", &["thisArg", "args"], OBJECT),
  field("length", NUMBER),
  field("prototype", OBJECT),
];

const ARGUMENTS_MEMBERS: &[Member] = &[field("callee", FUNCTION), field("length", NUMBER)];

const ERROR_MEMBERS: &[Member] = &[field("message", STRING), field("name", STRING)];

const REGEXP_MEMBERS: &[Member] = &[
  method("exec", &["str"], ARRAY),
  field("global", BOOLEAN),
  field("ignoreCase", BOOLEAN),
  field("lastIndex", NUMBER),
  field("multiline", BOOLEAN),
  field("source", STRING),
  method("test", &["str"], BOOLEAN),
];

const DATE_MEMBERS: &[Member] = &[
  method("getDate", &[], NUMBER),
  method("getDay", &[], NUMBER),
  method("getFullYear", &[], NUMBER),
  method("getHours", &[], NUMBER),
  method("getMilliseconds", &[], NUMBER),
  method("getMinutes", &[], NUMBER),
  method("getMonth", &[], NUMBER),
  method("getSeconds", &[], NUMBER),
  method("getTime", &[], NUMBER),
  method("getTimezoneOffset", &[], NUMBER),
  method("setDate", &["date"], NUMBER),
  method("setFullYear", &["year", "month", "date"], NUMBER),
  method("setHours", &["hours", "min", "sec", "ms"], NUMBER),
  method("setMonth", &["month", "date"], NUMBER),
  method("setTime", &["time"], NUMBER),
  method("toDateString", &[], STRING),
  method("toISOString", &[], STRING),
  method("toTimeString", &[], STRING),
  method("toUTCString", &[], STRING),
];

const MATH_MEMBERS: &[Member] = &[
  field("E", NUMBER),
  field("LN10", NUMBER),
  field("LN2", NUMBER),
  field("PI", NUMBER),
  field("SQRT2", NUMBER),
  method("abs", &["x"], NUMBER),
  method("ceil", &["x"], NUMBER),
  method("cos", &["x"], NUMBER),
  method("exp", &["x"], NUMBER),
  method("floor", &["x"], NUMBER),
  method("log", &["x"], NUMBER),
  method("max", &["a", "b"], NUMBER),
  method("min", &["a", "b"], NUMBER),
  method("pow", &["x", "y"], NUMBER),
  method("random", &[], NUMBER),
  method("round", &["x"], NUMBER),
  method("sin", &["x"], NUMBER),
  method("sqrt", &["x"], NUMBER),
  method("tan", &["x"], NUMBER),
];

const JSON_MEMBERS: &[Member] = &[
  method("parse", &["text", "reviver"], OBJECT),
  method("stringify", &["value", "replacer", "space"], STRING),
];

const CONSOLE_MEMBERS: &[Member] = &[
  method("error", &["message"], UNDEFINED),
  method("info", &["message"], UNDEFINED),
  method("log", &["message"], UNDEFINED),
  method("warn", &["message"], UNDEFINED),
];

const DOCUMENT_MEMBERS: &[Member] = &[
  field("body", OBJECT),
  method("createElement", &["tagName"], OBJECT),
  method("createTextNode", &["data"], OBJECT),
  method("getElementById", &["elementId"], OBJECT),
  method("getElementsByTagName", &["tagName"], ARRAY),
  method("querySelector", &["selectors"], OBJECT),
  method("querySelectorAll", &["selectors"], ARRAY),
  field("title", STRING),
];

const GLOBAL_MEMBERS: &[Member] = &[
  ctor(ARRAY, &["len"]),
  ctor(BOOLEAN, &["value"]),
  ctor("Date", &["val"]),
  method("decodeURI", &["encodedURI"], STRING),
  method("decodeURIComponent", &["encodedURIComponent"], STRING),
  method("encodeURI", &["uri"], STRING),
  method("encodeURIComponent", &["uriComponent"], STRING),
  ctor(ERROR, &["message"]),
  method("eval", &["x"], OBJECT),
  ctor(FUNCTION, &["body"]),
  field("Infinity", NUMBER),
  method("isFinite", &["number"], BOOLEAN),
  method("isNaN", &["number"], BOOLEAN),
  field("JSON", "JSON"),
  field("Math", "Math"),
  field("NaN", NUMBER),
  ctor(NUMBER, &["value"]),
  ctor(OBJECT, &["value"]),
  method("parseFloat", &["string"], NUMBER),
  method("parseInt", &["string", "radix"], NUMBER),
  ctor(REGEXP, &["pattern", "flags"]),
  ctor(STRING, &["value"]),
  field("undefined", UNDEFINED),
];

const WINDOW_MEMBERS: &[Member] = &[
  method("alert", &["message"], UNDEFINED),
  method("clearInterval", &["handle"], UNDEFINED),
  method("clearTimeout", &["handle"], UNDEFINED),
  method("confirm", &["message"], BOOLEAN),
  field("console", "Console"),
  field("document", "Document"),
  field("localStorage", OBJECT),
  field("location", OBJECT),
  field("navigator", OBJECT),
  method("setInterval", &["handler", "timeout"], NUMBER),
  method("setTimeout", &["handler", "timeout"], NUMBER),
  field("window", WINDOW),
];

const MODULE_MEMBERS: &[Member] = &[
  field("__dirname", STRING),
  field("__filename", STRING),
  field("console", "Console"),
  field("exports", OBJECT),
  field("module", OBJECT),
  field("process", OBJECT),
  method("require", &["id"], OBJECT),
];

// `(name, proto, members)`.
const BUILTIN_TYPES: &[(&str, Option<&str>, &[Member])] = &[
  (UNDEFINED, None, &[]),
  (OBJECT, None, OBJECT_MEMBERS),
  (STRING, Some(OBJECT), STRING_MEMBERS),
  (NUMBER, Some(OBJECT), NUMBER_MEMBERS),
  (BOOLEAN, Some(OBJECT), &[]),
  (ARRAY, Some(OBJECT), ARRAY_MEMBERS),
  (FUNCTION, Some(OBJECT), FUNCTION_MEMBERS),
  (ARGUMENTS, Some(OBJECT), ARGUMENTS_MEMBERS),
  (ERROR, Some(OBJECT), ERROR_MEMBERS),
  (REGEXP, Some(OBJECT), REGEXP_MEMBERS),
  ("Date", Some(OBJECT), DATE_MEMBERS),
  ("Math", Some(OBJECT), MATH_MEMBERS),
  ("JSON", Some(OBJECT), JSON_MEMBERS),
  ("Console", Some(OBJECT), CONSOLE_MEMBERS),
  ("Document", Some(OBJECT), DOCUMENT_MEMBERS),
  (GLOBAL, Some(OBJECT), GLOBAL_MEMBERS),
  (WINDOW, Some(GLOBAL), WINDOW_MEMBERS),
  (MODULE, Some(GLOBAL), MODULE_MEMBERS),
];

fn member_type((_, params, kind): &Member) -> TypeRef {
  let param_names = || {
    params
      .unwrap_or_default()
      .iter()
      .map(|p| p.to_string())
      .collect::<Vec<_>>()
  };
  match (params.is_some(), kind) {
    (_, Kind::Ctor(instance)) => TypeRef::constructor(param_names(), TypeRef::named(*instance)),
    (true, Kind::Is(ret)) => TypeRef::function(param_names(), TypeRef::named(*ret)),
    (false, Kind::Is(typ)) => TypeRef::named(*typ),
  }
}

static BUILTINS: Lazy<Vec<(TypeName, Type)>> = Lazy::new(|| {
  BUILTIN_TYPES
    .iter()
    .map(|(name, proto, members)| {
      let properties = members
        .iter()
        .map(|m| (m.0.to_string(), PropertyDefinition::new(member_type(m), None)))
        .collect();
      (name.to_string(), Type {
        properties,
        proto: proto.map(|p| p.to_string()),
        is_builtin: true,
      })
    })
    .collect()
});

/// A type table holding only the builtin library.
pub fn builtin_table() -> TypeTable {
  let mut table = TypeTable::new();
  for (name, typ) in BUILTINS.iter() {
    table.insert(name.clone(), typ.clone());
  }
  table
}

/// Names that can never be bound by user code, as they would shadow `Object.prototype` members on every object.
pub fn is_object_member(name: &str) -> bool {
  OBJECT_MEMBERS.iter().any(|m| m.0 == name)
}

/// The builtin type the file's global scope inherits from.
pub fn global_type(flavor: GlobalFlavor) -> &'static str {
  match flavor {
    GlobalFlavor::Browser => WINDOW,
    GlobalFlavor::Node => MODULE,
    GlobalFlavor::Plain => GLOBAL,
  }
}

/// What `this` is at the top level of a file.
pub fn global_this(flavor: GlobalFlavor) -> &'static str {
  match flavor {
    GlobalFlavor::Browser => WINDOW,
    GlobalFlavor::Node => OBJECT,
    GlobalFlavor::Plain => GLOBAL,
  }
}

#[cfg(test)]
mod tests {
  use super::builtin_table;
  use crate::types::TypeRef;

  #[test]
  fn test_builtins_are_marked_and_linked() {
    let table = builtin_table();
    let string = table.get("String").unwrap();
    assert!(string.is_builtin);
    assert_eq!(string.proto.as_deref(), Some("Object"));
    assert_eq!(table.chain("Window"), ["Window", "Global", "Object"]);
    let date = &table.get("Global").unwrap().properties["Date"].type_ref;
    assert_eq!(date, &TypeRef::constructor(vec!["val".to_string()], TypeRef::named("Date")));
    let char_at = &string.properties["charAt"].type_ref;
    assert_eq!(char_at.return_type(), TypeRef::named("String"));
  }
}
