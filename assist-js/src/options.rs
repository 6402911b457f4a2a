use assist_parse_js::comment::Comment;
use assist_parse_js::comment::CommentKind;
use serde::Deserialize;
use serde::Serialize;

/// Which builtin global object a file runs against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlobalFlavor {
  Browser,
  Node,
  Plain,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvOptions {
  pub browser: bool,
  pub node: bool,
}

/// Lint-style configuration supplied by the host, in the shape JSLint/JSHint use.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintOptions {
  /// Extra global names, bound as plain objects.
  pub global: Vec<String>,
  pub options: EnvOptions,
}

/// Settings found in `/*global ...*/` and `/*jslint ...*/` comments of a file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pragmas {
  pub globals: Vec<String>,
  pub browser: Option<bool>,
  pub node: Option<bool>,
}

impl Pragmas {
  pub fn scan(comments: &[Comment]) -> Pragmas {
    let mut pragmas = Pragmas::default();
    for c in comments.iter().filter(|c| c.kind == CommentKind::Block) {
      let body = c.body.trim_start();
      if let Some(rest) = body
        .strip_prefix("globals")
        .or_else(|| body.strip_prefix("global"))
        .filter(|r| r.starts_with(char::is_whitespace))
      {
        for (name, _) in pragma_entries(rest) {
          pragmas.globals.push(name.to_string());
        }
      } else if let Some(rest) = body
        .strip_prefix("jslint")
        .filter(|r| r.starts_with(char::is_whitespace))
      {
        for (name, value) in pragma_entries(rest) {
          let enabled = value != Some("false");
          match name {
            "browser" => pragmas.browser = Some(enabled),
            "node" => pragmas.node = Some(enabled),
            _ => {}
          };
        }
      };
    }
    pragmas
  }
}

// `a, b:true c` yields `("a", None), ("b", Some("true")), ("c", None)`.
fn pragma_entries(text: &str) -> impl Iterator<Item = (&str, Option<&str>)> {
  text
    .split(|c: char| c == ',' || c.is_whitespace())
    .filter(|e| !e.is_empty())
    .map(|e| match e.split_once(':') {
      Some((name, value)) => (name, Some(value)),
      None => (e, None),
    })
    .filter(|(name, _)| !name.is_empty())
}

/// Options after applying a file's pragmas on top of the host's.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectiveOptions {
  pub globals: Vec<String>,
  pub flavor: GlobalFlavor,
}

impl LintOptions {
  pub fn merged_with_pragmas(&self, pragmas: &Pragmas) -> EffectiveOptions {
    let browser = pragmas.browser.unwrap_or(self.options.browser);
    let node = pragmas.node.unwrap_or(self.options.node);
    let flavor = if browser {
      GlobalFlavor::Browser
    } else if node {
      GlobalFlavor::Node
    } else {
      GlobalFlavor::Plain
    };
    let mut globals = self.global.clone();
    for g in &pragmas.globals {
      if !globals.contains(g) {
        globals.push(g.clone());
      };
    }
    EffectiveOptions { globals, flavor }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposalOptions {
  /// The part of the name already typed before the offset.
  pub prefix: String,
  /// When false, names found anywhere in the type table are also offered, after the inferred ones.
  pub inferred_only: bool,
}

impl Default for ProposalOptions {
  fn default() -> Self {
    ProposalOptions {
      prefix: String::new(),
      inferred_only: true,
    }
  }
}

impl ProposalOptions {
  pub fn with_prefix(prefix: impl Into<String>) -> Self {
    ProposalOptions {
      prefix: prefix.into(),
      ..Default::default()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::GlobalFlavor;
  use super::LintOptions;
  use super::Pragmas;
  use assist_parse_js::parse;

  #[test]
  fn test_scan_pragmas() {
    let parsed = parse("/*global foo bar:true, baz*/\n/* jslint node:true, browser:false */\n// global nope\n");
    let pragmas = Pragmas::scan(&parsed.comments);
    assert_eq!(pragmas.globals, ["foo", "bar", "baz"]);
    assert_eq!(pragmas.node, Some(true));
    assert_eq!(pragmas.browser, Some(false));
  }

  #[test]
  fn test_pragma_overrides_host() {
    let host: LintOptions =
      serde_json::from_str(r#"{"global": ["host"], "options": {"browser": true}}"#).unwrap();
    let pragmas = Pragmas {
      globals: vec!["file".to_string()],
      browser: Some(false),
      node: Some(true),
    };
    let merged = host.merged_with_pragmas(&pragmas);
    assert_eq!(merged.flavor, GlobalFlavor::Node);
    assert_eq!(merged.globals, ["host", "file"]);
  }

  #[test]
  fn test_browser_beats_node() {
    let host: LintOptions =
      serde_json::from_str(r#"{"options": {"browser": true, "node": true}}"#).unwrap();
    let merged = host.merged_with_pragmas(&Pragmas::default());
    assert_eq!(merged.flavor, GlobalFlavor::Browser);
  }

  #[test]
  fn test_globalvars_is_not_a_pragma() {
    let parsed = parse("/*globalvars a*/");
    assert!(Pragmas::scan(&parsed.comments).globals.is_empty());
  }
}
