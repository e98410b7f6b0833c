use serde::{Deserialize, Serialize};

use crate::errors::DraftError;
use crate::rules::{ScoringRules, TagCapPolicy};

/// The title/description/category/hashtags being scored.
///
/// Every field is optional on load. `desc` and `cat` are accepted for state
/// saved by the first panel variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentDraft {
    pub title: String,
    #[serde(alias = "desc")]
    pub description: String,
    #[serde(alias = "cat")]
    pub category: Option<String>,
    /// Stored without the leading `#`. Deduplicated by exact string.
    pub tags: Vec<String>,
}

/// Result of a single tag entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOutcome {
    Added,
    /// Already present (exact, case-sensitive match).
    Duplicate,
    /// Blank after trimming and stripping `#`.
    Ignored,
    /// At the cap under [`TagCapPolicy::Truncate`].
    Dropped,
}

/// Trims whitespace and one leading `#`. Returns `None` for blank input.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let tag = trimmed.strip_prefix('#').unwrap_or(trimmed).trim();
    (!tag.is_empty()).then(|| tag.to_string())
}

impl ContentDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.set_category(category);
        self
    }

    /// Sets tags verbatim, bypassing normalization and the cap.
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// A blank category clears the selection.
    pub fn set_category(&mut self, category: impl Into<String>) {
        let category = category.into();
        self.category = (!category.trim().is_empty()).then_some(category);
    }

    pub fn has_category(&self) -> bool {
        self.category
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }

    pub fn add_tag(&mut self, raw: &str, rules: &ScoringRules) -> Result<TagOutcome, DraftError> {
        let Some(tag) = normalize_tag(raw) else {
            return Ok(TagOutcome::Ignored);
        };
        if self.tags.contains(&tag) {
            return Ok(TagOutcome::Duplicate);
        }
        if self.tags.len() >= rules.max_tags_allowed {
            return match rules.tag_cap_policy {
                TagCapPolicy::Truncate => Ok(TagOutcome::Dropped),
                TagCapPolicy::Reject => Err(DraftError::TagCapReached {
                    cap: rules.max_tags_allowed,
                }),
            };
        }
        self.tags.push(tag);
        Ok(TagOutcome::Added)
    }

    /// Adds every comma-separated tag in `raw`.
    ///
    /// Under [`TagCapPolicy::Reject`] the batch is all-or-nothing: if the new
    /// unique tags would exceed the cap, nothing is added.
    pub fn add_tags_from_input(
        &mut self,
        raw: &str,
        rules: &ScoringRules,
    ) -> Result<Vec<TagOutcome>, DraftError> {
        let candidates: Vec<String> = raw.split(',').filter_map(normalize_tag).collect();

        if rules.tag_cap_policy == TagCapPolicy::Reject {
            let mut fresh: Vec<&String> = Vec::new();
            for candidate in &candidates {
                if !self.tags.contains(candidate) && !fresh.contains(&candidate) {
                    fresh.push(candidate);
                }
            }
            if self.tags.len() + fresh.len() > rules.max_tags_allowed {
                return Err(DraftError::TagCapReached {
                    cap: rules.max_tags_allowed,
                });
            }
        }

        candidates
            .iter()
            .map(|candidate| self.add_tag(candidate, rules))
            .collect()
    }

    pub fn remove_tag(&mut self, index: usize) -> Option<String> {
        (index < self.tags.len()).then(|| self.tags.remove(index))
    }

    pub fn pop_tag(&mut self) -> Option<String> {
        self.tags.pop()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Drops blank and duplicate tags, then truncates to the cap.
    /// Returns how many tags were removed.
    pub fn enforce_cap(&mut self, rules: &ScoringRules) -> usize {
        let before = self.tags.len();
        let mut kept: Vec<String> = Vec::with_capacity(before);
        for tag in self.tags.drain(..) {
            if !tag.trim().is_empty() && !kept.contains(&tag) {
                kept.push(tag);
            }
        }
        kept.truncate(rules.max_tags_allowed);
        self.tags = kept;
        before - self.tags.len()
    }
}
