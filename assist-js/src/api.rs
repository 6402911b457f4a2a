use crate::classify::classify;
use crate::error::check_offset;
use crate::error::AssistError;
use crate::indexer::Indexer;
use crate::infer::Inference;
use crate::infer::Mode;
use crate::infer::Outcome;
use crate::infer::Resolution;
use crate::options::LintOptions;
use crate::options::Pragmas;
use crate::options::ProposalOptions;
use crate::proposals::proposals_for;
use crate::proposals::Proposal;
use crate::summary::Summary;
use crate::types::TypeRef;
use assist_parse_js::loc::Loc;
use assist_parse_js::parse;
use assist_parse_js::Parsed;
use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use tracing::error;

// Prefix of generated type names in analyses whose types never leave the request.
const LOCAL_FILE_UID: &str = "local";

/// Where a name under the cursor is bound.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
  pub name: String,
  pub type_ref: TypeRef,
  /// None for builtins and names that were only ever used.
  pub range: Option<Loc>,
  /// The module or file the binding was merged in from, if it isn't local.
  pub origin: Option<String>,
}

/// Entry point for completion, hover, definition and summary requests.
///
/// Each request parses and analyses its buffer from scratch, so one instance can serve any number of requests concurrently.
#[derive(Clone, Default)]
pub struct ContentAssist {
  lint: LintOptions,
  indexer: Option<Arc<dyn Indexer>>,
}

fn parse_logged(buffer: &str) -> Parsed {
  let parsed = parse(buffer);
  for err in &parsed.errors {
    debug!(
      code = err.code(),
      loc = ?err.loc,
      message = %err.message(),
      "recovered from syntax error"
    );
  }
  parsed
}

// Type names must not contain the separator used inside generated names.
fn file_uid(file_name: &str) -> String {
  file_name
    .chars()
    .map(|c| match c {
      '~' => '_',
      c if c.is_whitespace() => '_',
      c => c,
    })
    .collect()
}

fn invariant_violation(message: String) -> AssistError {
  error!(%message, "internal invariant violated");
  AssistError::InvariantViolation(message)
}

impl ContentAssist {
  pub fn new() -> ContentAssist {
    ContentAssist::default()
  }

  pub fn with_lint_options(mut self, lint: LintOptions) -> ContentAssist {
    self.lint = lint;
    self
  }

  pub fn with_indexer(mut self, indexer: Arc<dyn Indexer>) -> ContentAssist {
    self.indexer = Some(indexer);
    self
  }

  fn analyze(
    &self,
    parsed: &Parsed,
    buffer: &str,
    file_uid: &str,
    offset: usize,
    mode: Mode,
  ) -> Outcome {
    let pragmas = Pragmas::scan(&parsed.comments);
    let options = self.lint.merged_with_pragmas(&pragmas);
    Inference::new(
      parsed,
      buffer,
      file_uid,
      &options,
      self.indexer.as_deref(),
      offset,
      mode,
    )
    .run()
  }

  /// Proposals for completing the name that ends at `offset`.
  ///
  /// Positions where no name can be typed, such as inside a string or a number, get no proposals.
  pub fn compute_proposals(
    &self,
    buffer: &str,
    offset: usize,
    options: &ProposalOptions,
  ) -> Result<Vec<Proposal>, AssistError> {
    let span = tracing::debug_span!(
      "assist_js.compute_proposals",
      offset,
      prefix = %options.prefix,
      location = tracing::field::Empty,
      proposals = tracing::field::Empty,
    );
    let _guard = span.enter();
    check_offset(buffer, offset)?;
    let parsed = parse_logged(buffer);
    let Some(location) = classify(&parsed, offset) else {
      return Ok(Vec::new());
    };
    span.record("location", tracing::field::debug(location));
    let outcome = self.analyze(&parsed, buffer, LOCAL_FILE_UID, offset, Mode::Complete);
    let targets = match outcome.resolution {
      Some(Resolution::Members(target)) => vec![target],
      Some(Resolution::Scopes(scopes)) => scopes,
      other => {
        return Err(invariant_violation(format!(
          "completion walk ended with {other:?}"
        )))
      }
    };
    let proposals = proposals_for(&outcome.env.table, &targets, offset, options);
    span.record("proposals", proposals.len());
    Ok(proposals)
  }

  // Runs a lookup walk and reads the binding it stops at, along with its rendered type.
  fn binding_at(
    &self,
    buffer: &str,
    offset: usize,
  ) -> Result<Option<(Definition, String)>, AssistError> {
    check_offset(buffer, offset)?;
    let parsed = parse_logged(buffer);
    let outcome = self.analyze(&parsed, buffer, LOCAL_FILE_UID, offset, Mode::Lookup);
    let (owner, name) = match outcome.resolution {
      None | Some(Resolution::Unbound) => return Ok(None),
      Some(Resolution::Binding { owner, name }) => (owner, name),
      Some(r @ (Resolution::Members(_) | Resolution::Scopes(_))) => {
        return Err(invariant_violation(format!(
          "lookup walk ended with {r:?}"
        )))
      }
    };
    let Some(found) = outcome.env.lookup_in_chain(&name, &owner) else {
      return Err(invariant_violation(format!(
        "{name} was resolved on {owner} but is not bound there"
      )));
    };
    let rendered = outcome.env.table.render(&found.def.type_ref);
    let definition = Definition {
      name,
      type_ref: found.def.type_ref,
      range: found.def.range,
      origin: found.def.origin,
    };
    Ok(Some((definition, rendered)))
  }

  /// The name under `offset` and its type, rendered as `name :: type`.
  pub fn compute_hover(&self, buffer: &str, offset: usize) -> Result<Option<String>, AssistError> {
    let span = tracing::debug_span!(
      "assist_js.compute_hover",
      offset,
      found = tracing::field::Empty
    );
    let _guard = span.enter();
    let hover = self
      .binding_at(buffer, offset)?
      .map(|(def, rendered)| format!("{} :: {}", def.name, rendered));
    span.record("found", hover.is_some());
    Ok(hover)
  }

  /// Where the name under `offset` is bound.
  pub fn find_definition(
    &self,
    buffer: &str,
    offset: usize,
  ) -> Result<Option<Definition>, AssistError> {
    let span = tracing::debug_span!(
      "assist_js.find_definition",
      offset,
      found = tracing::field::Empty
    );
    let _guard = span.enter();
    let found = self.binding_at(buffer, offset)?.map(|(def, _)| def);
    span.record("found", found.is_some());
    Ok(found)
  }

  /// The type `buffer` provides to dependents, with the types it reaches.
  pub fn compute_summary(&self, buffer: &str, file_name: &str) -> Result<Summary, AssistError> {
    let span = tracing::debug_span!(
      "assist_js.compute_summary",
      file = file_name,
      types = tracing::field::Empty,
    );
    let _guard = span.enter();
    let parsed = parse_logged(buffer);
    let outcome = self.analyze(
      &parsed,
      buffer,
      &file_uid(file_name),
      buffer.len(),
      Mode::Summarize,
    );
    if let Some(r) = outcome.resolution {
      return Err(invariant_violation(format!(
        "summary walk stopped early with {r:?}"
      )));
    };
    let summary = Summary::build(&outcome.env.table, outcome.provided, outcome.kind);
    span.record("types", summary.types.len());
    Ok(summary)
  }
}
