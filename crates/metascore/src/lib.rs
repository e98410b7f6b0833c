//! MetaScore: content-quality scoring for video upload drafts.
//!
//! [`score`] grades a [`ContentDraft`] (title, description, category,
//! hashtags) against a [`ScoringRules`] value and returns a 0–100 score with
//! ordered improvement hints. [`UploadSession`] wraps the engine with the
//! panel's editing operations and an injected [`store::KeyValueStore`].

pub mod draft;
pub mod errors;
pub mod hints;
pub mod rules;
pub mod scorer;
pub mod session;
pub mod store;
mod text;

pub use draft::{ContentDraft, TagOutcome};
pub use errors::{DraftError, SessionError, StoreError};
pub use hints::{prioritize, DEFAULT_HINT_LIMIT};
pub use rules::{Band, CategoryPolicy, RulePreset, ScoringRules, TagCapPolicy, Weights};
pub use scorer::{score, Criterion, ScoreBand, ScoreResult};
pub use session::{ExportFormat, Template, UploadSession, DEFAULT_STORAGE_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore};
