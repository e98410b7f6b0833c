//! Upload session: the state behind one floating panel.
//!
//! Owns a draft, its rules, saved templates and an injected store. Every
//! mutation is rescored synchronously and written out as a snapshot; failed
//! writes are logged and never reach the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::draft::{ContentDraft, TagOutcome};
use crate::errors::{DraftError, SessionError};
use crate::rules::{RulePreset, ScoringRules};
use crate::scorer::{score, ScoreResult};
use crate::store::{load_json, overlay_json, save_json, KeyValueStore};
use crate::text::{find_keyword, significant_words, trimmed_len};

pub const DEFAULT_STORAGE_KEY: &str = "ctk_metascore_state";

const SHORT_TITLE_CHARS: usize = 20;
const TITLE_SUFFIX: &str = " | Official Guide";
const CTA_LINE: &str = "👉 Don't forget to Subscribe and Like!";
const AUTO_TAG_COUNT: usize = 3;

/// Draft keys written by the first panel variant.
const LEGACY_DRAFT_KEYS: &[(&str, &str)] = &[("desc", "description"), ("cat", "category")];

/// A named snapshot of draft and rules the user can reload later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub draft: ContentDraft,
    #[serde(default)]
    pub rules: ScoringRules,
    pub created_at: DateTime<Utc>,
}

/// "Copy everything" layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// `Title: …`, `Category: …`, `Hashtags: …`, then the description.
    Labeled,
    /// Title, description and hashtags separated by blank lines.
    Plain,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    draft: &'a ContentDraft,
    rules: &'a ScoringRules,
    templates: &'a [Template],
}

/// The saved `{draft, rules, templates}` object, each part recovered on its own.
struct Snapshot {
    draft: ContentDraft,
    rules: ScoringRules,
    templates: Vec<Template>,
}

impl Snapshot {
    fn empty(preset: RulePreset) -> Self {
        Self {
            draft: ContentDraft::default(),
            rules: ScoringRules::preset(preset),
            templates: Vec::new(),
        }
    }

    fn recover(saved: &Value, preset: RulePreset) -> Self {
        let Some(root) = saved.as_object() else {
            warn!("Saved panel state is not an object, using defaults");
            return Self::empty(preset);
        };

        let draft = root
            .get("draft")
            .or_else(|| root.get("content"))
            .map(|value| overlay_json(ContentDraft::default(), &canonical_draft_keys(value)))
            .unwrap_or_default();

        let rules = root
            .get("rules")
            .map(|value| overlay_json(ScoringRules::preset(preset), value))
            .unwrap_or_else(|| ScoringRules::preset(preset));

        let templates = root
            .get("templates")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match serde_json::from_value::<Template>(item.clone()) {
                        Ok(template) => Some(template),
                        Err(e) => {
                            warn!(error = %e, "Dropping unreadable saved template");
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            draft,
            rules,
            templates,
        }
    }
}

/// Renames legacy draft keys unless the current key is also present.
fn canonical_draft_keys(value: &Value) -> Value {
    let Some(fields) = value.as_object() else {
        return value.clone();
    };
    let mut out = Map::with_capacity(fields.len());
    for (key, field) in fields {
        let renamed = LEGACY_DRAFT_KEYS
            .iter()
            .find(|&&(legacy, current)| key.as_str() == legacy && !fields.contains_key(current))
            .map_or(key.as_str(), |&(_, current)| current);
        out.insert(renamed.to_string(), field.clone());
    }
    Value::Object(out)
}

pub struct UploadSession<S: KeyValueStore> {
    store: S,
    key: String,
    draft: ContentDraft,
    rules: ScoringRules,
    templates: Vec<Template>,
    current: ScoreResult,
}

impl<S: KeyValueStore> UploadSession<S> {
    /// Rehydrates from [`DEFAULT_STORAGE_KEY`], or starts empty with `preset`.
    pub fn open(store: S, preset: RulePreset) -> Self {
        Self::open_with_key(store, DEFAULT_STORAGE_KEY, preset)
    }

    pub fn open_with_key(store: S, key: impl Into<String>, preset: RulePreset) -> Self {
        let key = key.into();
        let snapshot = match load_json::<Value, S>(&store, &key) {
            Ok(Some(saved)) => {
                debug!(key = %key, "Restored saved panel state");
                Snapshot::recover(&saved, preset)
            }
            Ok(None) => Snapshot::empty(preset),
            Err(e) => {
                warn!(key = %key, error = %e, "Saved panel state unreadable, using defaults");
                Snapshot::empty(preset)
            }
        };

        let rules = snapshot.rules;
        let mut draft = snapshot.draft;
        let dropped = draft.enforce_cap(&rules);
        if dropped > 0 {
            debug!(dropped, "Dropped restored tags over the cap");
        }
        let current = score(&draft, &rules);

        Self {
            store,
            key,
            draft,
            rules,
            templates: snapshot.templates,
            current,
        }
    }

    pub fn draft(&self) -> &ContentDraft {
        &self.draft
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// The score of the current draft under the current rules.
    pub fn score(&self) -> &ScoreResult {
        &self.current
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // ── Draft edits ─────────────────────────────────────────────────────────

    pub fn set_title(&mut self, title: impl Into<String>) -> &ScoreResult {
        self.draft.set_title(title);
        self.commit()
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> &ScoreResult {
        self.draft.set_description(description);
        self.commit()
    }

    pub fn set_category(&mut self, category: impl Into<String>) -> &ScoreResult {
        self.draft.set_category(category);
        self.commit()
    }

    pub fn add_tag(&mut self, raw: &str) -> Result<TagOutcome, DraftError> {
        let outcome = self.draft.add_tag(raw, &self.rules)?;
        if outcome == TagOutcome::Added {
            self.commit();
        }
        Ok(outcome)
    }

    pub fn add_tags_from_input(&mut self, raw: &str) -> Result<Vec<TagOutcome>, DraftError> {
        let outcomes = self.draft.add_tags_from_input(raw, &self.rules)?;
        if outcomes.contains(&TagOutcome::Added) {
            self.commit();
        }
        Ok(outcomes)
    }

    pub fn remove_tag(&mut self, index: usize) -> Option<String> {
        let removed = self.draft.remove_tag(index)?;
        self.commit();
        Some(removed)
    }

    /// Backspace in an empty tag field removes the last tag.
    pub fn pop_tag(&mut self) -> Option<String> {
        let removed = self.draft.pop_tag()?;
        self.commit();
        Some(removed)
    }

    /// Clears the draft. Rules and templates are kept.
    pub fn reset(&mut self) -> &ScoreResult {
        self.draft.clear();
        info!("Panel inputs cleared");
        self.commit()
    }

    pub fn set_rules(&mut self, rules: ScoringRules) -> &ScoreResult {
        self.rules = rules;
        self.draft.enforce_cap(&self.rules);
        info!("Scoring rules updated");
        self.commit()
    }

    /// Applies quick fixes: suffix on a short title, a CTA line on a
    /// description without one, and title words as tags when none exist.
    /// Returns whether anything changed.
    pub fn auto_improve(&mut self) -> bool {
        let mut changed = false;

        let title_len = trimmed_len(&self.draft.title);
        if title_len > 0 && title_len < SHORT_TITLE_CHARS {
            let title = format!("{}{TITLE_SUFFIX}", self.draft.title.trim_end());
            self.draft.set_title(title);
            changed = true;
        }

        let description = self.draft.description.to_lowercase();
        if find_keyword(&description, &self.rules.cta_keywords).is_none()
            && !self.draft.description.contains(CTA_LINE)
        {
            let mut text = self.draft.description.trim_end().to_string();
            if !text.is_empty() {
                text.push_str("\n\n");
            }
            text.push_str(CTA_LINE);
            self.draft.set_description(text);
            changed = true;
        }

        if self.draft.tags.is_empty() {
            let words: Vec<String> = significant_words(&self.draft.title)
                .take(AUTO_TAG_COUNT)
                .map(str::to_string)
                .collect();
            for word in words {
                match self.draft.add_tag(&word, &self.rules) {
                    Ok(TagOutcome::Added) => changed = true,
                    Ok(_) => {}
                    Err(_) => break,
                }
            }
        }

        if changed {
            self.commit();
            info!(score = self.current.value, "Auto-improve applied");
        }
        changed
    }

    /// Text for the clipboard "copy everything" action.
    pub fn export(&self, format: ExportFormat) -> String {
        let hashtags = self
            .draft
            .tags
            .iter()
            .map(|t| format!("#{t}"))
            .collect::<Vec<_>>()
            .join(" ");

        match format {
            ExportFormat::Labeled => format!(
                "Title: {}\nCategory: {}\nHashtags: {}\n\nDescription:\n{}",
                self.draft.title,
                self.draft.category.as_deref().unwrap_or_default(),
                hashtags,
                self.draft.description
            ),
            ExportFormat::Plain => format!(
                "{}\n\n{}\n\n{}",
                self.draft.title, self.draft.description, hashtags
            ),
        }
    }

    // ── Templates ───────────────────────────────────────────────────────────

    pub fn save_template(&mut self, name: &str) -> Result<Uuid, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyTemplateName);
        }
        let template = Template {
            id: Uuid::new_v4(),
            name: name.to_string(),
            draft: self.draft.clone(),
            rules: self.rules.clone(),
            created_at: Utc::now(),
        };
        let id = template.id;
        self.templates.push(template);
        self.persist();
        info!(template_id = %id, name, "Template saved");
        Ok(id)
    }

    /// Replaces the draft and rules with the template's copies.
    pub fn load_template(&mut self, id: Uuid) -> Result<&ScoreResult, SessionError> {
        let template = self
            .templates
            .iter()
            .find(|t| t.id == id)
            .ok_or(SessionError::TemplateNotFound(id))?;
        self.draft = template.draft.clone();
        self.rules = template.rules.clone();
        self.draft.enforce_cap(&self.rules);
        info!(template_id = %id, "Template loaded");
        Ok(self.commit())
    }

    pub fn delete_template(&mut self, id: Uuid) -> Result<Template, SessionError> {
        let index = self
            .templates
            .iter()
            .position(|t| t.id == id)
            .ok_or(SessionError::TemplateNotFound(id))?;
        let removed = self.templates.remove(index);
        self.persist();
        Ok(removed)
    }

    // ── Internals ───────────────────────────────────────────────────────────

    fn commit(&mut self) -> &ScoreResult {
        self.current = score(&self.draft, &self.rules);
        self.persist();
        &self.current
    }

    fn persist(&mut self) {
        let snapshot = SnapshotRef {
            draft: &self.draft,
            rules: &self.rules,
            templates: &self.templates,
        };
        if let Err(e) = save_json(&mut self.store, &self.key, &snapshot) {
            warn!(key = %self.key, error = %e, "Failed to save panel state");
        }
    }
}
