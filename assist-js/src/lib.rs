//! Content assist for JavaScript: completion proposals, hover and go-to-definition, plus per-file summaries that let other files see what a file exports.
//!
//! Types are inferred heuristically from a single walk over a possibly incomplete file. Scopes and object literals are structural types whose prototype links are the enclosing scope or the object's prototype, so resolving a name and resolving a property are the same search.

pub mod api;
pub mod builtins;
pub mod classify;
pub mod env;
pub mod error;
pub mod indexer;
pub mod infer;
pub mod jsdoc;
pub mod options;
pub mod proposals;
pub mod summary;
pub mod types;

pub use api::ContentAssist;
pub use api::Definition;
pub use error::AssistError;
pub use indexer::Indexer;
pub use indexer::MemoryIndexer;
pub use options::EnvOptions;
pub use options::LintOptions;
pub use options::ProposalOptions;
pub use proposals::LinkedPosition;
pub use proposals::Proposal;
pub use proposals::ProposalStyle;
pub use summary::ModuleKind;
pub use summary::Summary;
pub use types::Type;
pub use types::TypeRef;
