use assist_js::AssistError;
use assist_js::ContentAssist;
use assist_js::LinkedPosition;
use assist_js::LintOptions;
use assist_js::Proposal;
use assist_js::ProposalOptions;
use assist_js::ProposalStyle;

// Completes at the `|` in `src_with_cursor`, which is removed first.
fn complete_with(assist: &ContentAssist, src_with_cursor: &str, options: &ProposalOptions) -> Vec<Proposal> {
  let offset = src_with_cursor.find('|').unwrap();
  let src = src_with_cursor.replacen('|', "", 1);
  assist.compute_proposals(&src, offset, options).unwrap()
}

fn complete(src_with_cursor: &str, prefix: &str) -> Vec<Proposal> {
  complete_with(
    &ContentAssist::new(),
    src_with_cursor,
    &ProposalOptions::with_prefix(prefix),
  )
}

fn texts(proposals: &[Proposal]) -> Vec<&str> {
  proposals.iter().map(|p| p.proposal.as_str()).collect()
}

fn description_of<'p>(proposals: &'p [Proposal], proposal: &str) -> Option<&'p str> {
  proposals
    .iter()
    .find(|p| p.proposal == proposal)
    .map(|p| p.description.as_str())
}

#[test]
fn variable_at_end_of_file() {
  let props = complete("var zzz = 9;\n|", "");
  assert_eq!(description_of(&props, "zzz"), Some("zzz : Number"));
}

#[test]
fn string_methods_by_prefix() {
  let props = complete("''.char|", "char");
  assert_eq!(texts(&props), ["charAt(index)", "charCodeAt(index)"]);
  assert_eq!(props[0].description, "charAt(index) : String");
}

#[test]
fn own_members_before_inherited() {
  let props = complete("var t = { hhh:1, hh2:8 }\nt.h|", "h");
  assert_eq!(texts(&props), ["hh2", "hhh", "", "hasOwnProperty(property)"]);
  assert_eq!(props[2].style, ProposalStyle::Separator);
  assert_eq!(props[0].description, "hh2 : Number");
}

#[test]
fn fields_set_in_constructor() {
  let props = complete(
    "function Fun(){ this.xxx=9; } var y=new Fun(); y.x|",
    "x",
  );
  assert_eq!(texts(&props), ["xxx"]);
  assert_eq!(props[0].description, "xxx : Number");
}

#[test]
fn object_may_replace_object() {
  let props = complete("var v={a:{a:9}}; v.a={b:9}; v.a|", "a");
  assert_eq!(texts(&props), ["a"]);
  assert_eq!(props[0].description, "a : {b:Number}");
}

#[test]
fn bindings_never_become_less_specific() {
  let src = "var o = { f: null };\no.f = {};\no.f = { a: 1 };\no.f = {};\no.f = null;\no.f|";
  let props = complete(src, "f");
  assert_eq!(texts(&props), ["f"]);
  assert_eq!(props[0].description, "f : {a:Number}");

  // An unknown value never replaces a concrete type either.
  let props = complete("var n = 1;\nn = null;\nn = {};\nn|", "n");
  assert_eq!(description_of(&props, "n"), Some("n : Number"));
}

#[test]
fn typed_prefix_is_not_proposed() {
  let props = complete("var zzz = 9;\nzz|", "zz");
  assert_eq!(texts(&props), ["zzz"]);
}

#[test]
fn prototype_members_reach_every_instance() {
  let src = "function Point(x) { this.x = x; }
var before = new Point(1);
Point.prototype = { norm: function () { return 1; } };
Point.prototype.scale = function (k) { return this; };
var after = new Point(2);
";
  for receiver in ["before", "after"] {
    let props = complete(&format!("{src}{receiver}.|"), "");
    assert_eq!(description_of(&props, "norm()"), Some("norm() : Number"));
    assert_eq!(description_of(&props, "scale(k)"), Some("scale(k) : Point"));
    assert_eq!(description_of(&props, "x"), Some("x : Object"));
    // Own fields rank above the prototype's members.
    let x = props.iter().find(|p| p.proposal == "x").unwrap();
    let norm = props.iter().find(|p| p.proposal == "norm()").unwrap();
    assert!(x.relevance > norm.relevance);
  }
}

#[test]
fn locals_shadow_outer_bindings() {
  let src = "var a = 1;
function f(a) {
  var inner = 2;
  g = 'implicit';
  |
}
";
  let props = complete(src, "");
  let a: Vec<_> = props.iter().filter(|p| p.proposal == "a").collect();
  assert_eq!(a.len(), 1);
  assert_eq!(a[0].description, "a : Object");
  assert_eq!(description_of(&props, "inner"), Some("inner : Number"));
  assert_eq!(description_of(&props, "g"), Some("g : String"));
  assert!(texts(&props).contains(&"f(a)"));
}

#[test]
fn locals_stay_in_their_function() {
  let src = "function setter() { var local = 1; shared = 5; }
function user() {
  |
}
";
  let props = complete(src, "");
  assert_eq!(description_of(&props, "shared"), Some("shared : Number"));
  assert!(!texts(&props).contains(&"local"));

  let props = complete("function f() { var local = 1; }\n{ var block = 1; }\n|", "");
  assert!(!texts(&props).contains(&"local"));
}

#[test]
fn object_literals_see_the_scopes_around_them() {
  let src = "var helper = 1;\nglob = 'x';\nvar o = { m: function () { var own = true; |\n} };";
  let props = complete(src, "");
  assert_eq!(description_of(&props, "own"), Some("own : Boolean"));
  assert_eq!(description_of(&props, "helper"), Some("helper : Number"));
  assert_eq!(description_of(&props, "glob"), Some("glob : String"));
  // The method's own scope ranks above the file's.
  let own = props.iter().find(|p| p.proposal == "own").unwrap();
  let helper = props.iter().find(|p| p.proposal == "helper").unwrap();
  assert!(own.relevance > helper.relevance);

  let props = complete("var helper = 1;\nvar o = { a: hel| };", "hel");
  assert_eq!(texts(&props), ["helper"]);

  let props = complete("var helper = 1;\nvar o = { a: { b: hel| } };", "hel");
  assert_eq!(texts(&props), ["helper"]);
}

#[test]
fn implicit_globals_assigned_later() {
  let props = complete(
    "function user() {\n  sha|\n}\nfunction setter() { shared = 5; }",
    "sha",
  );
  assert_eq!(texts(&props), ["shared"]);
  assert_eq!(props[0].description, "shared : Number");

  let props = complete("function user() {\n  |\n}\nlater = { a: 1 };", "");
  assert_eq!(description_of(&props, "later"), Some("later : Object"));

  // Assignments to declared names create no globals, wherever the declaration is.
  let src = "|\nfunction f(p) { p = 1; }\ntry {} catch (e) { e = 3; }";
  let props = complete(src, "");
  for name in ["p", "e"] {
    assert!(!texts(&props).contains(&name), "{name}");
  }
}

#[test]
fn constructors_are_global() {
  let props = complete(
    "function outer() { function Inner() { this.qq = 1; } }\nvar i = new Inner();\ni.q|",
    "q",
  );
  assert_eq!(texts(&props), ["qq"]);

  let src = "function outer() { function Inner() { this.qq = 1; } }\n/** @type {Inner} */\nvar v;\nv.q|";
  assert_eq!(texts(&complete(src, "q")), ["qq"]);
}

#[test]
fn members_set_on_untyped_values() {
  let props = complete("function f(opts) {\n  opts.size = 1;\n  opts.|\n}", "");
  assert_eq!(description_of(&props, "size"), Some("size : Number"));

  let props = complete("var later;\nlater.ready = true;\nlater.r|", "r");
  assert_eq!(texts(&props), ["ready"]);
}

#[test]
fn module_definitions_are_not_globals() {
  let props = complete("define(['dep'], function (dep) {\n  |\n});", "");
  assert!(!texts(&props).contains(&"define"));
  assert!(texts(&props).contains(&"dep"));

  let props = complete("require(['dep'], function (dep) {});\n|", "");
  assert!(!texts(&props).contains(&"require"));

  // Any other unknown callee is still an implicit global.
  let props = complete("setup(['dep'], function (dep) {});\n|", "");
  assert!(texts(&props).contains(&"setup"));
}

#[test]
fn function_proposals_link_their_arguments() {
  let src = "var api = { send: function (to, body) { return true; } };\napi.se|";
  let props = complete(src, "se");
  assert_eq!(texts(&props), ["send(to, body)"]);
  let send = &props[0];
  assert_eq!(send.description, "send(to, body) : Boolean");
  let start = src.find('|').unwrap() - 2;
  assert_eq!(
    send.positions.as_deref(),
    Some(&[
      LinkedPosition {
        offset: start + 5,
        length: 2,
      },
      LinkedPosition {
        offset: start + 9,
        length: 4,
      },
    ][..])
  );
  assert_eq!(send.escape_position, Some(start + 14));
}

#[test]
fn non_inferred_names_follow_when_asked_for() {
  let src = "var o = {};\nfunction F() { this.zzlong = 1; }\no.zz|";
  assert!(complete(src, "zz").is_empty());
  let props = complete_with(&ContentAssist::new(), src, &ProposalOptions {
    prefix: "zz".to_string(),
    inferred_only: false,
  });
  assert_eq!(texts(&props), ["zzlong"]);
  assert_eq!(props[0].style, ProposalStyle::NoEmphasis);
  assert_eq!(props[0].description, "zzlong : Number (non-inferred)");
}

#[test]
fn lint_globals_and_flavors() {
  let assist = ContentAssist::new().with_lint_options(LintOptions {
    global: vec!["jQuery".to_string()],
    ..Default::default()
  });
  let props = complete_with(&assist, "jQ|", &ProposalOptions::with_prefix("jQ"));
  assert_eq!(texts(&props), ["jQuery"]);

  assert!(complete("document.getE|", "getE").is_empty());
  let props = complete("/*jslint browser:true*/\ndocument.getE|", "getE");
  assert_eq!(
    texts(&props),
    ["getElementById(elementId)", "getElementsByTagName(tagName)"]
  );

  let props = complete("/*global $:true*/\n$|", "$");
  assert_eq!(texts(&props), ["$"]);
}

#[test]
fn nothing_to_propose_inside_literals_and_declarations() {
  assert!(complete("var s = 'ab|c';", "ab").is_empty());
  assert!(complete("var fo|", "fo").is_empty());
  assert!(complete("function f(a|) {}", "a").is_empty());
  assert!(complete("// x.|", "").is_empty());
}

#[test]
fn incomplete_code_still_completes() {
  let props = complete("var t = { hhh: 1 };\nif (t) {\n  f(t.h|", "h");
  assert_eq!(texts(&props)[0], "hhh");
}

#[test]
fn same_request_same_answer() {
  let src = "var t = { b: 1, a: '' };\nfunction Fun(x) { this.c = x; }\nvar f = new Fun();\nf.|";
  let first = complete(src, "");
  let second = complete(src, "");
  assert!(!first.is_empty());
  assert_eq!(first, second);
}

#[test]
fn offsets_must_fall_on_characters() {
  let assist = ContentAssist::new();
  let options = ProposalOptions::default();
  assert_eq!(
    assist.compute_proposals("é", 1, &options),
    Err(AssistError::InvalidOffset { offset: 1, len: 2 })
  );
  assert_eq!(
    assist.compute_proposals("abc", 10, &options),
    Err(AssistError::InvalidOffset { offset: 10, len: 3 })
  );
}
