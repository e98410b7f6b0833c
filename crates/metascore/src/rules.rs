//! Scoring rules: the single configuration value that drives the scorer.
//!
//! Every panel variant is a [`RulePreset`] of the same schema rather than a
//! separate algorithm. Rules are persisted as camelCase JSON; every key is
//! optional on load and missing keys fall back to the `standard` preset.
//! Sessions merge saved rules over their own preset with
//! [`crate::store::overlay_json`].

use serde::{Deserialize, Serialize};

use crate::hints::DEFAULT_HINT_LIMIT;

/// Inclusive `[min, max]` range, used for title length and tag count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub min: usize,
    pub max: usize,
}

impl Band {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, n: usize) -> bool {
        n >= self.min && n <= self.max
    }
}

/// Maximum points per criterion. A weight of 0 disables the criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Weights {
    pub title: u32,
    pub description: u32,
    pub tags: u32,
    pub call_to_action: u32,
    pub keyword_match: u32,
    /// Only used under [`CategoryPolicy::CreditIfPresent`].
    pub category: u32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            title: 30,
            description: 30,
            tags: 20,
            call_to_action: 10,
            keyword_match: 0,
            category: 10,
        }
    }
}

/// How the category criterion participates in the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryPolicy {
    Ignore,
    /// Penalty-only: never adds points, subtracts `categoryPenalty` when missing.
    PenaltyIfMissing,
    /// Awards `weights.category` when a category is selected.
    CreditIfPresent,
}

/// What happens when a tag is added past `maxTagsAllowed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TagCapPolicy {
    /// Excess tags are dropped silently.
    Truncate,
    /// Excess tags are refused with an error the caller can surface.
    Reject,
}

/// Built-in rule sets, one per panel variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RulePreset {
    #[default]
    Standard,
    MetascorePanel,
    UploadAssistant,
    UploadPanel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringRules {
    pub title_length: Band,
    pub alt_title_credit: bool,
    pub description_min_length: usize,
    /// Lower bound for partial description credit. `None` means a quarter
    /// of `description_min_length`.
    pub description_floor: Option<usize>,
    /// Half credit for a description between the floor and the minimum and
    /// for a tag count outside the range. Off means all-or-nothing.
    pub partial_credit: bool,
    pub tag_count_range: Band,
    pub weights: Weights,
    pub cta_keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
    pub max_tags_allowed: usize,
    pub category_policy: CategoryPolicy,
    pub category_penalty: u32,
    pub negative_penalty: u32,
    pub tag_cap_policy: TagCapPolicy,
    pub hint_limit: usize,
}

const FULL_CTA_KEYWORDS: &[&str] = &["subscribe", "like", "comment", "link", "check out", "playlist"];
const SHORT_CTA_KEYWORDS: &[&str] = &["subscribe", "like"];
const NEGATIVE_KEYWORDS: &[&str] = &["scam", "fuck", "shit"];

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            title_length: Band::new(45, 75),
            alt_title_credit: true,
            description_min_length: 250,
            description_floor: None,
            partial_credit: true,
            tag_count_range: Band::new(3, 5),
            weights: Weights::default(),
            cta_keywords: words(FULL_CTA_KEYWORDS),
            negative_keywords: words(NEGATIVE_KEYWORDS),
            max_tags_allowed: 5,
            category_policy: CategoryPolicy::PenaltyIfMissing,
            category_penalty: 10,
            negative_penalty: 20,
            tag_cap_policy: TagCapPolicy::Reject,
            hint_limit: DEFAULT_HINT_LIMIT,
        }
    }
}

impl ScoringRules {
    pub fn preset(preset: RulePreset) -> Self {
        let standard = Self::default();
        match preset {
            RulePreset::Standard => standard,
            RulePreset::MetascorePanel => Self {
                description_floor: Some(50),
                cta_keywords: words(&["sub", "like"]),
                category_policy: CategoryPolicy::CreditIfPresent,
                tag_cap_policy: TagCapPolicy::Truncate,
                ..standard
            },
            RulePreset::UploadAssistant => Self {
                title_length: Band::new(40, 70),
                alt_title_credit: false,
                description_min_length: 200,
                partial_credit: false,
                tag_count_range: Band::new(3, 15),
                max_tags_allowed: 15,
                weights: Weights {
                    keyword_match: 10,
                    category: 0,
                    ..Weights::default()
                },
                category_policy: CategoryPolicy::Ignore,
                ..standard
            },
            RulePreset::UploadPanel => Self {
                title_length: Band::new(46, 79),
                alt_title_credit: false,
                description_min_length: 201,
                partial_credit: false,
                weights: Weights {
                    call_to_action: 20,
                    category: 0,
                    ..Weights::default()
                },
                cta_keywords: words(SHORT_CTA_KEYWORDS),
                tag_cap_policy: TagCapPolicy::Truncate,
                ..standard
            },
        }
    }

    /// `None` when partial credit is off.
    pub fn description_floor(&self) -> Option<usize> {
        self.partial_credit.then(|| {
            self.description_floor
                .unwrap_or(self.description_min_length / 4)
        })
    }

    /// Sum of the weights the score is normalized against.
    pub fn possible_points(&self) -> u64 {
        let w = &self.weights;
        let category = match self.category_policy {
            CategoryPolicy::CreditIfPresent => w.category,
            _ => 0,
        };
        [w.title, w.description, w.tags, w.call_to_action, w.keyword_match, category]
            .into_iter()
            .map(u64::from)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_defaults() {
        let rules = ScoringRules::default();
        assert_eq!(rules.title_length, Band::new(45, 75));
        assert_eq!(rules.description_min_length, 250);
        assert_eq!(rules.tag_count_range, Band::new(3, 5));
        assert_eq!(rules.max_tags_allowed, 5);
        assert_eq!(rules.hint_limit, 3);
        assert_eq!(rules.description_floor(), Some(62));
        // category weight is not credited under the penalty policy
        assert_eq!(rules.possible_points(), 90);
    }

    #[test]
    fn test_metascore_panel_credits_category() {
        let rules = ScoringRules::preset(RulePreset::MetascorePanel);
        assert_eq!(rules.category_policy, CategoryPolicy::CreditIfPresent);
        assert_eq!(rules.possible_points(), 100);
        assert_eq!(rules.description_floor(), Some(50));
    }

    #[test]
    fn test_upload_assistant_enables_keyword_match() {
        let rules = ScoringRules::preset(RulePreset::UploadAssistant);
        assert_eq!(rules.weights.keyword_match, 10);
        assert_eq!(rules.max_tags_allowed, 15);
        assert_eq!(rules.possible_points(), 100);
    }

    #[test]
    fn test_upload_presets_have_no_partial_credit() {
        for preset in [RulePreset::UploadAssistant, RulePreset::UploadPanel] {
            let rules = ScoringRules::preset(preset);
            assert!(!rules.partial_credit);
            assert_eq!(rules.description_floor(), None);
        }
        assert!(ScoringRules::preset(RulePreset::MetascorePanel).partial_credit);
    }

    #[test]
    fn test_partial_json_merges_over_defaults() {
        let json = r#"{"titleLength": {"min": 10, "max": 20}, "weights": {"title": 50}}"#;
        let rules: ScoringRules = serde_json::from_str(json).unwrap();
        assert_eq!(rules.title_length, Band::new(10, 20));
        assert_eq!(rules.weights.title, 50);
        assert_eq!(rules.weights.description, 30);
        assert_eq!(rules.description_min_length, 250);
    }

    #[test]
    fn test_policies_serialize_camel_case() {
        let rules = ScoringRules::default();
        let value = serde_json::to_value(&rules).unwrap();
        assert_eq!(value["categoryPolicy"], "penaltyIfMissing");
        assert_eq!(value["tagCapPolicy"], "reject");
        assert_eq!(value["weights"]["callToAction"], 10);
    }

    #[test]
    fn test_band_contains_is_inclusive() {
        let band = Band::new(3, 5);
        assert!(band.contains(3));
        assert!(band.contains(5));
        assert!(!band.contains(2));
        assert!(!band.contains(6));
    }
}
