use assist_parse_js::comment::CommentKind;
use assist_parse_js::jsdoc::parse_doc_comment;
use assist_parse_js::jsdoc::TypeExpr;
use assist_parse_js::parse;

#[test]
fn comments_are_collected_once_in_order() {
  // The regex forces a relex of the same region, which must not duplicate comments.
  let src = "/*global a*/\nvar x = /re/; // trailing\n/** @type {Number} */\nvar y;";
  let parsed = parse(src);
  assert!(parsed.errors.is_empty());
  let kinds: Vec<_> = parsed.comments.iter().map(|c| c.kind).collect();
  assert_eq!(kinds, [CommentKind::Block, CommentKind::Line, CommentKind::Block]);
  assert_eq!(parsed.comments[0].body, "global a");
  assert!(!parsed.comments[0].is_doc());
  assert!(parsed.comments[2].is_doc());
}

#[test]
fn doc_comment_attaches_across_whitespace_only() {
  let src = "/** @type {String} */\n  var s;\n/** @type {Number} */ x();\nvar n;";
  let parsed = parse(src);
  let s_at = src.find("var s").unwrap();
  let doc = parsed.doc_comment_before(src, s_at).unwrap();
  let parsed_doc = parse_doc_comment(&doc.body).unwrap();
  assert_eq!(parsed_doc.typ, Some(TypeExpr::Name("String".to_string())));

  let n_at = src.find("var n").unwrap();
  assert!(parsed.doc_comment_before(src, n_at).is_none());
}

#[test]
fn unterminated_block_comment_runs_to_end() {
  let parsed = parse("var a;\n/* never closed");
  assert_eq!(parsed.comments.len(), 1);
  assert_eq!(parsed.comments[0].body, " never closed");
  assert_eq!(parsed.top_level.stx.body.len(), 1);
}
