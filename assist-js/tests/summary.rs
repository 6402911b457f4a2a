use assist_js::ContentAssist;
use assist_js::MemoryIndexer;
use assist_js::ModuleKind;
use assist_js::ProposalOptions;
use assist_js::Summary;
use assist_js::TypeRef;
use assist_parse_js::loc::Loc;
use std::sync::Arc;

fn summarize(src: &str, file_name: &str) -> Summary {
  ContentAssist::new().compute_summary(src, file_name).unwrap()
}

const AMD_MODULE: &str = "define(['dep'], function (dep) {
  var hidden = { secret: 1 };
  return { run: function () { return 1; } };
});
";

const NODE_MODULE: &str = "/*jslint node:true*/
var helper = { unused: true };
exports.answer = 42;
exports.greet = function (name) { return 'hi ' + name; };
";

const GLOBAL_SCRIPT: &str = "var Shared = { ping: function () { return 'pong'; } };\n";

#[test]
fn amd_module_provides_factory_result() {
  let summary = summarize(AMD_MODULE, "a.js");
  assert_eq!(summary.kind, ModuleKind::Amd);
  let provided = summary.provided_name().unwrap();
  // Only what the factory returns is kept.
  assert_eq!(summary.types.len(), 1);
  let run = &summary.types[provided].properties["run"];
  assert_eq!(run.type_ref.return_type(), TypeRef::named("Number"));
  assert!(summary
    .types
    .values()
    .all(|t| !t.properties.contains_key("secret")));
}

#[test]
fn node_module_provides_exports() {
  let summary = summarize(NODE_MODULE, "lib/b.js");
  assert_eq!(summary.kind, ModuleKind::CommonJs);
  let provided = summary.provided_name().unwrap();
  assert_eq!(summary.types.len(), 1);
  let exports = &summary.types[provided];
  assert_eq!(
    exports.properties["answer"].type_ref,
    TypeRef::named("Number")
  );
  assert_eq!(
    exports.properties["greet"].type_ref,
    TypeRef::function(vec!["name".to_string()], TypeRef::named("String"))
  );
}

#[test]
fn wrapped_commonjs_module() {
  let src = "define(function (require, exports, module) {
  exports.version = '1.0';
});
";
  let summary = summarize(src, "c.js");
  assert_eq!(summary.kind, ModuleKind::CommonJs);
  let provided = summary.provided_name().unwrap();
  assert_eq!(
    summary.types[provided].properties["version"].type_ref,
    TypeRef::named("String")
  );
}

#[test]
fn script_provides_its_global_scope() {
  let summary = summarize(GLOBAL_SCRIPT, "my script~1.js");
  assert_eq!(summary.kind, ModuleKind::Global);
  let provided = summary.provided_name().unwrap();
  assert!(summary.types[provided].properties.contains_key("Shared"));
  // Names stay unique per file even for awkward file names, and builtins are left out.
  for name in summary.types.keys() {
    assert!(name.starts_with("gen~my_script_1.js~"), "{name}");
  }
  assert!(!summary.types.contains_key("Object"));
}

#[test]
fn summaries_survive_json() {
  let summary = summarize(AMD_MODULE, "a.js");
  let json = serde_json::to_string(&summary).unwrap();
  assert!(json.contains("\"kind\":\"AMD\""));
  let back: Summary = serde_json::from_str(&json).unwrap();
  assert_eq!(back, summary);
}

#[test]
fn dependencies_resolve_through_the_indexer() {
  let indexer = Arc::new(MemoryIndexer::new());
  indexer.insert_module("a", summarize(AMD_MODULE, "a.js"));
  indexer.insert_module("lib", summarize(NODE_MODULE, "lib.js"));
  let assist = ContentAssist::new().with_indexer(indexer.clone());

  let src = "define(['a'], function (a) {\n  a.r\n});";
  let offset = src.find("a.r").unwrap() + 3;
  let props = assist
    .compute_proposals(src, offset, &ProposalOptions::with_prefix("r"))
    .unwrap();
  assert_eq!(props.len(), 1);
  assert_eq!(props[0].description, "run() : Number");

  let src = "/*jslint node:true*/\nvar lib = require('lib');\nlib.an";
  let props = assist
    .compute_proposals(src, src.len(), &ProposalOptions::with_prefix("an"))
    .unwrap();
  assert_eq!(props.len(), 1);
  assert_eq!(props[0].description, "answer : Number");

  // Without the indexer the dependency is just an object.
  let props = ContentAssist::new()
    .compute_proposals(src, src.len(), &ProposalOptions::with_prefix("an"))
    .unwrap();
  assert!(props.is_empty());
}

#[test]
fn global_summaries_join_the_global_scope() {
  let indexer = Arc::new(MemoryIndexer::new());
  indexer.insert_global("shared.js", summarize(GLOBAL_SCRIPT, "shared.js"));
  let assist = ContentAssist::new().with_indexer(indexer);

  let src = "Shared.pi";
  let props = assist
    .compute_proposals(src, src.len(), &ProposalOptions::with_prefix("pi"))
    .unwrap();
  assert_eq!(props.len(), 1);
  assert_eq!(props[0].description, "ping() : String");

  let def = assist.find_definition("Shared.ping();", 2).unwrap().unwrap();
  assert_eq!(def.origin.as_deref(), Some("shared.js"));
  assert_eq!(def.range, Some(Loc(4, 10)));
}
