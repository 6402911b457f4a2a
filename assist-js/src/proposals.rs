//! Turns the members visible on a type into ranked completion proposals.

use crate::options::ProposalOptions;
use crate::types::TypeName;
use crate::types::TypeRef;
use crate::types::TypeTable;
use ahash::HashSet;
use ahash::HashSetExt;
use serde::Deserialize;
use serde::Serialize;

// Relevance of the type's own members. Each step down the prototype chain costs `LEVEL_STEP`.
const TOP_RELEVANCE: i32 = 100;
const LEVEL_STEP: i32 = 10;
const FUNCTION_BONUS: i32 = 1;
const NON_INFERRED_RELEVANCE: i32 = -100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStyle {
  Emphasis,
  NoEmphasis,
  /// A divider between members found at different depths.
  Separator,
}

/// A range of the inserted text an editor can tab through, such as one argument name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedPosition {
  pub offset: usize,
  pub length: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
  /// The text replacing the typed prefix.
  pub proposal: String,
  pub description: String,
  pub relevance: i32,
  pub style: ProposalStyle,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub positions: Option<Vec<LinkedPosition>>,
  /// Where the cursor goes once the linked positions are done with.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub escape_position: Option<usize>,
}

impl Proposal {
  fn separator(relevance: i32) -> Proposal {
    Proposal {
      proposal: String::new(),
      description: String::new(),
      relevance,
      style: ProposalStyle::Separator,
      positions: None,
      escape_position: None,
    }
  }

  pub fn is_separator(&self) -> bool {
    self.style == ProposalStyle::Separator
  }
}

// `start` is where the prefix begins, which is where the proposal will be inserted.
fn member_proposal(
  table: &TypeTable,
  name: &str,
  t: &TypeRef,
  relevance: i32,
  start: usize,
  style: ProposalStyle,
) -> Proposal {
  let Some(f) = t.as_function() else {
    return Proposal {
      proposal: name.to_string(),
      description: format!("{} : {}", name, table.render(t)),
      relevance,
      style,
      positions: None,
      escape_position: None,
    };
  };
  let proposal = format!("{}({})", name, f.params.join(", "));
  let mut positions = Vec::with_capacity(f.params.len());
  let mut at = start + name.len() + 1;
  for p in &f.params {
    positions.push(LinkedPosition {
      offset: at,
      length: p.len(),
    });
    at += p.len() + 2;
  }
  Proposal {
    description: format!("{} : {}", proposal, table.render(&f.return_type)),
    relevance: relevance + FUNCTION_BONUS,
    style,
    positions: (!positions.is_empty()).then_some(positions),
    escape_position: Some(start + proposal.len()),
    proposal,
  }
}

// The types whose members are offered, nearest first. Builtins at the end of each chain are held back until every target's own types are listed, so an object literal's `Object` doesn't rank above the scopes around it.
fn search_order(table: &TypeTable, targets: &[TypeName]) -> Vec<TypeName> {
  let mut visited = HashSet::new();
  let mut order = Vec::new();
  let mut builtin_tails = Vec::new();
  for target in targets {
    let mut tail = Vec::new();
    for name in table.chain(target) {
      if !visited.insert(name.clone()) {
        continue;
      };
      if table.is_builtin(&name) {
        tail.push(name);
      } else {
        order.push(name);
      };
    }
    builtin_tails.push(tail);
  }
  // The outermost scope's builtins are the global ones.
  order.extend(builtin_tails.into_iter().rev().flatten());
  order
}

/// Proposals for the members of `targets` and their prototype chains that start with the prefix.
///
/// Members closer to the first target rank higher and hide same-named members further out. Unless `inferred_only` is set, members of every other non-builtin type follow with low relevance.
pub fn proposals_for(
  table: &TypeTable,
  targets: &[TypeName],
  offset: usize,
  options: &ProposalOptions,
) -> Vec<Proposal> {
  let start = offset.saturating_sub(options.prefix.len());
  let mut seen = HashSet::new();
  let mut out = Vec::new();

  for (depth, name) in search_order(table, targets).iter().enumerate() {
    let Some(typ) = table.get(name) else {
      continue;
    };
    let relevance = TOP_RELEVANCE - LEVEL_STEP * depth as i32;
    let before = out.len();
    for (prop, def) in &typ.properties {
      if prop == "this" || !prop.starts_with(&options.prefix) || !seen.insert(prop.clone()) {
        continue;
      };
      out.push(member_proposal(
        table,
        prop,
        &def.type_ref,
        relevance,
        start,
        ProposalStyle::Emphasis,
      ));
    }
    if out.len() > before {
      out.push(Proposal::separator(relevance - LEVEL_STEP / 2));
    };
  }

  if !options.inferred_only {
    out.push(Proposal::separator(NON_INFERRED_RELEVANCE + LEVEL_STEP / 2));
    for name in table.sorted_names() {
      let Some(typ) = table.get(name) else {
        continue;
      };
      if typ.is_builtin {
        continue;
      };
      for (prop, def) in &typ.properties {
        if prop == "this" || !prop.starts_with(&options.prefix) || !seen.insert(prop.clone()) {
          continue;
        };
        let mut p = member_proposal(
          table,
          prop,
          &def.type_ref,
          NON_INFERRED_RELEVANCE,
          start,
          ProposalStyle::NoEmphasis,
        );
        p.description.push_str(" (non-inferred)");
        out.push(p);
      }
    }
  };

  out.sort_by(|a, b| {
    b.relevance
      .cmp(&a.relevance)
      .then_with(|| a.proposal.cmp(&b.proposal))
  });
  strip_separators(out)
}

// Drops separators at either end and any that follow another.
fn strip_separators(sorted: Vec<Proposal>) -> Vec<Proposal> {
  let mut out: Vec<Proposal> = Vec::with_capacity(sorted.len());
  for p in sorted {
    if p.is_separator() && out.last().map_or(true, Proposal::is_separator) {
      continue;
    };
    out.push(p);
  }
  if out.last().is_some_and(Proposal::is_separator) {
    out.pop();
  };
  out
}

#[cfg(test)]
mod tests {
  use super::proposals_for;
  use super::LinkedPosition;
  use super::ProposalStyle;
  use crate::builtins::builtin_table;
  use crate::options::ProposalOptions;
  use crate::types::PropertyDefinition;
  use crate::types::Type;
  use crate::types::TypeRef;
  use crate::types::TypeTable;

  fn targets(name: &str) -> Vec<String> {
    vec![name.to_string()]
  }

  fn table() -> TypeTable {
    let mut table = builtin_table();
    let mut base = Type::with_proto("Object");
    base.properties.insert(
      "shared".to_string(),
      PropertyDefinition::new(TypeRef::named("String"), None),
    );
    base.properties.insert(
      "only".to_string(),
      PropertyDefinition::new(TypeRef::named("Boolean"), None),
    );
    table.insert("gen~t~1".to_string(), base);
    let mut derived = Type::with_proto("gen~t~1");
    derived.properties.insert(
      "shared".to_string(),
      PropertyDefinition::new(TypeRef::named("Number"), None),
    );
    derived.properties.insert(
      "send".to_string(),
      PropertyDefinition::new(
        TypeRef::function(vec!["to".to_string(), "body".to_string()], TypeRef::named("Boolean")),
        None,
      ),
    );
    derived.properties.insert(
      "this".to_string(),
      PropertyDefinition::new(TypeRef::named("gen~t~2"), None),
    );
    table.insert("gen~t~2".to_string(), derived);
    let mut elsewhere = Type::with_proto("Object");
    elsewhere.properties.insert(
      "stray".to_string(),
      PropertyDefinition::new(TypeRef::named("Number"), None),
    );
    table.insert("gen~t~3".to_string(), elsewhere);
    table
  }

  #[test]
  fn test_nearest_definition_wins() {
    let table = table();
    let props = proposals_for(&table, &targets("gen~t~2"), 2, &ProposalOptions::with_prefix("sh"));
    assert_eq!(props.len(), 1);
    assert_eq!(props[0].description, "shared : Number");
    assert_eq!(props[0].relevance, 100);
  }

  #[test]
  fn test_levels_are_separated() {
    let table = table();
    let props = proposals_for(&table, &targets("gen~t~2"), 0, &ProposalOptions::default());
    let texts: Vec<_> = props.iter().map(|p| p.proposal.as_str()).collect();
    // Functions get a small bonus over fields of the same level.
    assert_eq!(&texts[..4], ["send(to, body)", "shared", "", "only"]);
    assert_eq!(props[2].style, ProposalStyle::Separator);
    assert!(!props.iter().any(|p| p.proposal == "this"));
    assert!(!props.last().unwrap().is_separator());
  }

  #[test]
  fn test_function_positions() {
    let table = table();
    // `x.se|` with the prefix starting at 2.
    let props = proposals_for(&table, &targets("gen~t~2"), 4, &ProposalOptions::with_prefix("se"));
    assert_eq!(props.len(), 1);
    let send = &props[0];
    assert_eq!(send.proposal, "send(to, body)");
    assert_eq!(send.description, "send(to, body) : Boolean");
    assert_eq!(
      send.positions.as_deref(),
      Some(&[
        LinkedPosition {
          offset: 7,
          length: 2
        },
        LinkedPosition {
          offset: 11,
          length: 4
        },
      ][..])
    );
    assert_eq!(send.escape_position, Some(16));
  }

  #[test]
  fn test_non_inferred_pass() {
    let table = table();
    let inferred = proposals_for(&table, &targets("gen~t~2"), 2, &ProposalOptions::with_prefix("st"));
    assert!(inferred.is_empty());
    let all = proposals_for(&table, &targets("gen~t~2"), 2, &ProposalOptions {
      prefix: "st".to_string(),
      inferred_only: false,
    });
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].style, ProposalStyle::NoEmphasis);
    assert_eq!(all[0].description, "stray : Number (non-inferred)");
  }

  #[test]
  fn test_enclosing_scopes_follow_their_own_chains() {
    let mut table = table();
    let mut global = Type::with_proto("Object");
    for (name, t) in [("outer", "Number"), ("key", "String")] {
      global.properties.insert(
        name.to_string(),
        PropertyDefinition::new(TypeRef::named(t), None),
      );
    }
    table.insert("gen~t~4".to_string(), global);
    let mut object = Type::with_proto("Object");
    object.properties.insert(
      "key".to_string(),
      PropertyDefinition::new(TypeRef::named("Boolean"), None),
    );
    table.insert("gen~t~5".to_string(), object);
    let mut method = Type::with_proto("gen~t~5");
    method.properties.insert(
      "local".to_string(),
      PropertyDefinition::new(TypeRef::named("Number"), None),
    );
    table.insert("gen~t~6".to_string(), method);

    let scopes = ["gen~t~6", "gen~t~5", "gen~t~4"].map(String::from);
    let props = proposals_for(&table, &scopes, 0, &ProposalOptions::default());
    let named: Vec<_> = props.iter().filter(|p| !p.is_separator()).collect();
    assert_eq!(
      named.iter().take(3).map(|p| p.description.as_str()).collect::<Vec<_>>(),
      ["local : Number", "key : Boolean", "outer : Number"]
    );
    assert_eq!(named.iter().filter(|p| p.proposal == "key").count(), 1);
    // `Object`'s members come after every scope.
    let outer = named.iter().position(|p| p.proposal == "outer").unwrap();
    let has_own = named
      .iter()
      .position(|p| p.proposal.starts_with("hasOwnProperty"))
      .unwrap();
    assert!(outer < has_own);
  }
}
