//! ContentScorer: point accumulation over independent criteria.
//!
//! Algorithm:
//! 1. Each criterion is evaluated in a fixed order (category, title,
//!    description, tags, call to action, keyword match, negative content)
//!    and awards at most its weight, emitting a hint when it falls short.
//! 2. earned points are normalized against the enabled weights to 0–100
//! 3. Penalties (missing category, flagged words) are subtracted after
//!    normalization, then the value is clamped to [0, 100].
//!
//! `score` is pure and total: any string or tag list is valid input.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::draft::ContentDraft;
use crate::hints::prioritize;
use crate::rules::{CategoryPolicy, ScoringRules};
use crate::text::{find_keyword, significant_words, trimmed_len};

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// Criteria in evaluation order. The derived `Ord` keeps the breakdown map
/// in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Criterion {
    Category,
    Title,
    Description,
    Tags,
    CallToAction,
    KeywordMatch,
    NegativeContent,
}

/// Colour band of the panel's score card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Danger,
    Warn,
    Good,
}

impl ScoreBand {
    pub fn from_value(value: u32) -> Self {
        match value {
            v if v < 40 => ScoreBand::Danger,
            v if v < 70 => ScoreBand::Warn,
            _ => ScoreBand::Good,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    /// Always within 0–100.
    pub value: u32,
    /// The first `hint_limit` hints, in evaluation order.
    pub hints: Vec<String>,
    /// Raw points per criterion; penalties are negative.
    pub criterion_breakdown: BTreeMap<Criterion, i64>,
    #[serde(skip)]
    all_hints: Vec<String>,
}

impl ScoreResult {
    /// Every hint produced, before truncation.
    pub fn all_hints(&self) -> &[String] {
        &self.all_hints
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_value(self.value)
    }

    pub fn points(&self, criterion: Criterion) -> Option<i64> {
        self.criterion_breakdown.get(&criterion).copied()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core scoring algorithm
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Tally {
    earned: u64,
    penalty: u64,
    breakdown: BTreeMap<Criterion, i64>,
    hints: Vec<String>,
}

impl Tally {
    fn award(&mut self, criterion: Criterion, weight: u32, points: u32) {
        let points = points.min(weight);
        self.earned += u64::from(points);
        self.breakdown.insert(criterion, i64::from(points));
    }

    fn penalize(&mut self, criterion: Criterion, points: u32) {
        self.penalty += u64::from(points);
        self.breakdown.insert(criterion, -i64::from(points));
    }

    fn hint(&mut self, message: impl Into<String>) {
        self.hints.push(message.into());
    }

    fn finish(self, rules: &ScoringRules) -> ScoreResult {
        let possible = rules.possible_points();
        let normalized = if possible == 0 {
            0
        } else {
            ((self.earned as f64 * 100.0) / possible as f64).round() as i64
        };
        let penalty = i64::try_from(self.penalty).unwrap_or(i64::MAX);
        let value = normalized.saturating_sub(penalty).clamp(0, 100) as u32;

        ScoreResult {
            value,
            hints: prioritize(&self.hints, rules.hint_limit).to_vec(),
            criterion_breakdown: self.breakdown,
            all_hints: self.hints,
        }
    }
}

/// Scores a draft against a rule set.
pub fn score(draft: &ContentDraft, rules: &ScoringRules) -> ScoreResult {
    let mut tally = Tally::default();

    score_category(draft, rules, &mut tally);
    score_title(draft, rules, &mut tally);
    score_description(draft, rules, &mut tally);
    score_tags(draft, rules, &mut tally);
    score_call_to_action(draft, rules, &mut tally);
    score_keyword_match(draft, rules, &mut tally);
    score_negative_content(draft, rules, &mut tally);

    let result = tally.finish(rules);
    trace!(
        value = result.value,
        hints = result.all_hints.len(),
        "Scored draft"
    );
    result
}

fn score_category(draft: &ContentDraft, rules: &ScoringRules, tally: &mut Tally) {
    let present = draft.has_category();
    match rules.category_policy {
        CategoryPolicy::Ignore => {}
        CategoryPolicy::PenaltyIfMissing => {
            if present {
                tally.breakdown.insert(Criterion::Category, 0);
            } else {
                tally.penalize(Criterion::Category, rules.category_penalty);
                tally.hint("Select a category");
            }
        }
        CategoryPolicy::CreditIfPresent => {
            let weight = rules.weights.category;
            if weight == 0 {
                return;
            }
            if present {
                tally.award(Criterion::Category, weight, weight);
            } else {
                tally.award(Criterion::Category, weight, 0);
                tally.hint("Select a category");
            }
        }
    }
}

fn score_title(draft: &ContentDraft, rules: &ScoringRules, tally: &mut Tally) {
    let weight = rules.weights.title;
    if weight == 0 {
        return;
    }
    let len = trimmed_len(&draft.title);
    let band = rules.title_length;

    let points = if band.contains(len) {
        weight
    } else if len > 0 {
        tally.hint(format!(
            "Aim for a {}-{} character title (currently {len})",
            band.min, band.max
        ));
        if rules.alt_title_credit {
            weight / 2
        } else {
            0
        }
    } else {
        tally.hint("Add a title");
        0
    };
    tally.award(Criterion::Title, weight, points);
}

fn score_description(draft: &ContentDraft, rules: &ScoringRules, tally: &mut Tally) {
    let weight = rules.weights.description;
    if weight == 0 {
        return;
    }
    let len = trimmed_len(&draft.description);
    let min = rules.description_min_length;

    let points = if len >= min {
        weight
    } else if len == 0 {
        tally.hint(format!("Add a description (at least {min} characters)"));
        0
    } else {
        match rules.description_floor() {
            Some(floor) if len < floor => {
                tally.hint(format!("Add a description (at least {min} characters)"));
                0
            }
            floor => {
                tally.hint(format!(
                    "Add {} more characters to the description",
                    min - len
                ));
                if floor.is_some() {
                    weight / 2
                } else {
                    0
                }
            }
        }
    };
    tally.award(Criterion::Description, weight, points);
}

fn score_tags(draft: &ContentDraft, rules: &ScoringRules, tally: &mut Tally) {
    let weight = rules.weights.tags;
    if weight == 0 {
        return;
    }
    let count = draft.tags.iter().filter(|t| !t.trim().is_empty()).count();
    let range = rules.tag_count_range;

    let points = if range.contains(count) {
        weight
    } else if count > 0 {
        if count < range.min {
            tally.hint(format!(
                "Add {} more hashtags ({}-{} recommended)",
                range.min - count,
                range.min,
                range.max
            ));
        } else {
            tally.hint(format!(
                "Remove {} hashtags ({}-{} recommended)",
                count - range.max,
                range.min,
                range.max
            ));
        }
        if rules.partial_credit {
            weight / 2
        } else {
            0
        }
    } else {
        tally.hint(format!("Use {}-{} hashtags", range.min, range.max));
        0
    };
    tally.award(Criterion::Tags, weight, points);
}

fn score_call_to_action(draft: &ContentDraft, rules: &ScoringRules, tally: &mut Tally) {
    let weight = rules.weights.call_to_action;
    if weight == 0 {
        return;
    }
    let description = draft.description.to_lowercase();

    let points = if find_keyword(&description, &rules.cta_keywords).is_some() {
        weight
    } else {
        match rules.cta_keywords.iter().find(|k| !k.trim().is_empty()) {
            Some(suggestion) => tally.hint(format!(
                "Add a call to action such as \"{}\"",
                suggestion.trim()
            )),
            None => tally.hint("Add a call to action"),
        }
        0
    };
    tally.award(Criterion::CallToAction, weight, points);
}

fn score_keyword_match(draft: &ContentDraft, rules: &ScoringRules, tally: &mut Tally) {
    let weight = rules.weights.keyword_match;
    if weight == 0 {
        return;
    }
    let tags: Vec<&str> = draft
        .tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if tags.is_empty() {
        // the tag criterion already asks for hashtags
        tally.award(Criterion::KeywordMatch, weight, 0);
        return;
    }

    let title = draft.title.to_lowercase();
    let title_words: Vec<&str> = significant_words(&title).collect();
    let matches = tags
        .iter()
        .filter(|tag| {
            let tag = tag.to_lowercase();
            title.contains(&tag) || title_words.iter().any(|w| tag.contains(w))
        })
        .count() as u64;

    let per_match_base = rules.tag_count_range.min.max(1) as u64;
    let points = (u64::from(weight) * matches / per_match_base).min(u64::from(weight)) as u32;

    if matches == 0 {
        tally.hint(format!("Work \"{}\" into the title", tags[0]));
    }
    tally.award(Criterion::KeywordMatch, weight, points);
}

fn score_negative_content(draft: &ContentDraft, rules: &ScoringRules, tally: &mut Tally) {
    if rules.negative_penalty == 0 {
        return;
    }
    let title = draft.title.to_lowercase();
    let description = draft.description.to_lowercase();

    let flagged = find_keyword(&title, &rules.negative_keywords)
        .or_else(|| find_keyword(&description, &rules.negative_keywords));

    if let Some(word) = flagged {
        tally.penalize(Criterion::NegativeContent, rules.negative_penalty);
        tally.hint(format!("Remove \"{word}\" from the title or description"));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Band, RulePreset, Weights};

    const IN_BAND_TITLE: &str = "A 50-character title padded to fit the target band exactly";

    fn filler(len: usize) -> String {
        "lorem ipsum dolor sit amet ".chars().cycle().take(len).collect()
    }

    fn description_with_cta(len: usize) -> String {
        let cta = " Please subscribe for more.";
        let mut text = filler(len - cta.len());
        text.push_str(cta);
        text
    }

    fn complete_draft() -> ContentDraft {
        ContentDraft::new(IN_BAND_TITLE, description_with_cta(260))
            .with_category("tech")
            .with_tags(["tag1", "tag2", "tag3"])
    }

    #[test]
    fn test_empty_draft_scores_zero_with_title_and_description_hints() {
        let result = score(&ContentDraft::default(), &ScoringRules::default());
        assert_eq!(result.value, 0);
        assert_eq!(result.hints.len(), 3);
        assert_eq!(result.hints[0], "Select a category");
        assert_eq!(result.hints[1], "Add a title");
        assert!(result.hints[2].starts_with("Add a description"));
        assert_eq!(result.points(Criterion::Category), Some(-10));
        assert!(result.all_hints().len() > 3);
    }

    #[test]
    fn test_complete_draft_scores_full() {
        let result = score(&complete_draft(), &ScoringRules::default());
        assert_eq!(result.points(Criterion::Title), Some(30));
        assert_eq!(result.points(Criterion::Description), Some(30));
        assert_eq!(result.points(Criterion::Tags), Some(20));
        assert_eq!(result.points(Criterion::CallToAction), Some(10));
        assert_eq!(result.value, 100);
        assert!(result.hints.is_empty());
        assert_eq!(result.band(), ScoreBand::Good);
    }

    #[test]
    fn test_negative_keyword_subtracts_exact_penalty() {
        let rules = ScoringRules::default();
        let clean = complete_draft();
        let mut flagged = clean.clone();
        flagged.description = flagged.description.replacen("lorem", "scam!", 1);

        let clean_score = score(&clean, &rules).value;
        let flagged_result = score(&flagged, &rules);
        assert_eq!(clean_score - flagged_result.value, 20);
        assert_eq!(flagged_result.points(Criterion::NegativeContent), Some(-20));
        assert_eq!(
            flagged_result.all_hints().last().map(String::as_str),
            Some("Remove \"scam\" from the title or description")
        );
    }

    #[test]
    fn test_negative_keyword_is_case_insensitive_in_title() {
        let rules = ScoringRules::default();
        let mut draft = complete_draft();
        draft.title = format!("{IN_BAND_TITLE} SCAM");
        assert_eq!(score(&draft, &rules).value, 80);
    }

    #[test]
    fn test_negative_penalty_floors_at_zero() {
        let rules = ScoringRules::default();
        let draft = ContentDraft::new("scam", "");
        assert_eq!(score(&draft, &rules).value, 0);
    }

    #[test]
    fn test_title_contribution_is_monotonic_up_to_band() {
        let rules = ScoringRules::default();
        let mut last = 0;
        for len in 0..=rules.title_length.max {
            let draft = ContentDraft::new("x".repeat(len), "");
            let points = score(&draft, &rules)
                .points(Criterion::Title)
                .unwrap_or_default();
            assert!(points >= last, "title points dropped at length {len}");
            last = points;
        }
        assert_eq!(last, 30);
    }

    #[test]
    fn test_out_of_band_title_gets_half_credit_and_band_hint() {
        let rules = ScoringRules::default();
        let draft = ContentDraft::new("Short title", "").with_category("tech");
        let result = score(&draft, &rules);
        assert_eq!(result.points(Criterion::Title), Some(15));
        assert_eq!(
            result.hints[0],
            "Aim for a 45-75 character title (currently 11)"
        );
    }

    #[test]
    fn test_out_of_band_title_without_alt_credit() {
        let rules = ScoringRules {
            alt_title_credit: false,
            ..ScoringRules::default()
        };
        let result = score(&ContentDraft::new("Short title", ""), &rules);
        assert_eq!(result.points(Criterion::Title), Some(0));
    }

    #[test]
    fn test_title_length_uses_trimmed_text() {
        let rules = ScoringRules::default();
        let padded = format!("   {}   ", "x".repeat(44));
        let result = score(&ContentDraft::new(padded, ""), &rules);
        assert_eq!(result.points(Criterion::Title), Some(15));
    }

    #[test]
    fn test_short_description_reports_exact_deficit() {
        let rules = ScoringRules::default();
        let draft = ContentDraft::new(IN_BAND_TITLE, filler(100)).with_category("tech");
        let result = score(&draft, &rules);
        let trimmed = filler(100).trim().chars().count();
        assert_eq!(result.points(Criterion::Description), Some(15));
        assert_eq!(
            result.hints[0],
            format!("Add {} more characters to the description", 250 - trimmed)
        );
    }

    #[test]
    fn test_description_below_floor_gets_nothing() {
        let rules = ScoringRules::default();
        let draft = ContentDraft::new(IN_BAND_TITLE, "Too short").with_category("tech");
        let result = score(&draft, &rules);
        assert_eq!(result.points(Criterion::Description), Some(0));
        assert_eq!(result.hints[0], "Add a description (at least 250 characters)");
    }

    #[test]
    fn test_upload_presets_give_no_partial_credit() {
        for preset in [RulePreset::UploadAssistant, RulePreset::UploadPanel] {
            let rules = ScoringRules::preset(preset);
            let draft = ContentDraft::new(IN_BAND_TITLE, filler(100)).with_tags(["solo"]);
            let result = score(&draft, &rules);
            assert_eq!(result.points(Criterion::Description), Some(0), "{preset:?}");
            assert_eq!(result.points(Criterion::Tags), Some(0), "{preset:?}");
            let trimmed = filler(100).trim().chars().count();
            assert!(result.all_hints().contains(&format!(
                "Add {} more characters to the description",
                rules.description_min_length - trimmed
            )));
        }
    }

    #[test]
    fn test_tag_hints_name_target_range() {
        let rules = ScoringRules {
            max_tags_allowed: 10,
            ..ScoringRules::default()
        };
        let one = ContentDraft::default().with_tags(["solo"]);
        assert!(score(&one, &rules)
            .all_hints()
            .contains(&"Add 2 more hashtags (3-5 recommended)".to_string()));

        let many = ContentDraft::default().with_tags(["a", "b", "c", "d", "e", "f", "g"]);
        let result = score(&many, &rules);
        assert_eq!(result.points(Criterion::Tags), Some(10));
        assert!(result
            .all_hints()
            .contains(&"Remove 2 hashtags (3-5 recommended)".to_string()));

        let none = ContentDraft::default();
        assert!(score(&none, &rules)
            .all_hints()
            .contains(&"Use 3-5 hashtags".to_string()));
    }

    #[test]
    fn test_blank_tags_are_not_counted() {
        let draft = ContentDraft::default().with_tags(["", "  "]);
        let result = score(&draft, &ScoringRules::default());
        assert_eq!(result.points(Criterion::Tags), Some(0));
    }

    #[test]
    fn test_cta_detection_is_case_insensitive() {
        let rules = ScoringRules::default();
        let draft = ContentDraft::new("", "Don't forget to SUBSCRIBE!");
        assert_eq!(score(&draft, &rules).points(Criterion::CallToAction), Some(10));
    }

    #[test]
    fn test_missing_cta_suggests_first_keyword() {
        let rules = ScoringRules::default();
        let result = score(&ContentDraft::new("", "no action here"), &rules);
        assert!(result
            .all_hints()
            .contains(&"Add a call to action such as \"subscribe\"".to_string()));
    }

    #[test]
    fn test_keyword_match_awards_proportional_credit() {
        let rules = ScoringRules::preset(RulePreset::UploadAssistant);
        let title = "Rust async tutorial for beginners";

        let one = ContentDraft::new(title, "").with_tags(["rust", "cooking", "travel"]);
        assert_eq!(score(&one, &rules).points(Criterion::KeywordMatch), Some(3));

        let all = ContentDraft::new(title, "").with_tags(["Rust", "async", "tutorials"]);
        assert_eq!(score(&all, &rules).points(Criterion::KeywordMatch), Some(10));
    }

    #[test]
    fn test_keyword_match_hint_suggests_first_tag() {
        let rules = ScoringRules::preset(RulePreset::UploadAssistant);
        let draft = ContentDraft::new("Morning routine", "").with_tags(["productivity", "habits"]);
        let result = score(&draft, &rules);
        assert_eq!(result.points(Criterion::KeywordMatch), Some(0));
        assert!(result
            .all_hints()
            .contains(&"Work \"productivity\" into the title".to_string()));
    }

    #[test]
    fn test_disabled_criterion_emits_nothing() {
        let rules = ScoringRules::default();
        let draft = ContentDraft::new("Morning routine", "").with_tags(["productivity"]);
        let result = score(&draft, &rules);
        assert_eq!(result.points(Criterion::KeywordMatch), None);
        assert!(!result.all_hints().iter().any(|h| h.starts_with("Work")));
    }

    #[test]
    fn test_category_credit_policy() {
        let rules = ScoringRules::preset(RulePreset::MetascorePanel);
        let with = score(&ContentDraft::default().with_category("edu"), &rules);
        let without = score(&ContentDraft::default(), &rules);
        assert_eq!(with.points(Criterion::Category), Some(10));
        assert_eq!(with.value, 10);
        assert_eq!(without.points(Criterion::Category), Some(0));
        assert_eq!(without.value, 0);
    }

    #[test]
    fn test_category_ignored_policy() {
        let rules = ScoringRules::preset(RulePreset::UploadAssistant);
        let result = score(&ContentDraft::default(), &rules);
        assert_eq!(result.points(Criterion::Category), None);
        assert_ne!(result.hints.first().map(String::as_str), Some("Select a category"));
    }

    #[test]
    fn test_zero_weights_score_zero() {
        let rules = ScoringRules {
            weights: Weights {
                title: 0,
                description: 0,
                tags: 0,
                call_to_action: 0,
                keyword_match: 0,
                category: 0,
            },
            ..ScoringRules::default()
        };
        let result = score(&complete_draft(), &rules);
        assert_eq!(result.value, 0);
    }

    #[test]
    fn test_huge_weights_stay_in_range() {
        let rules = ScoringRules {
            weights: Weights {
                title: u32::MAX,
                description: u32::MAX,
                ..Weights::default()
            },
            category_penalty: u32::MAX,
            ..ScoringRules::default()
        };
        let value = score(&ContentDraft::new("hello", ""), &rules).value;
        assert!(value <= 100);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let rules = ScoringRules::default();
        let draft = ContentDraft::new("Short", "Like and subscribe").with_tags(["a"]);
        assert_eq!(score(&draft, &rules), score(&draft, &rules));
    }

    #[test]
    fn test_value_bounded_for_assorted_drafts() {
        let presets = [
            RulePreset::Standard,
            RulePreset::MetascorePanel,
            RulePreset::UploadAssistant,
            RulePreset::UploadPanel,
        ];
        let drafts = [
            ContentDraft::default(),
            complete_draft(),
            ContentDraft::new("scam scam", "shit").with_tags(["x"; 1]),
            ContentDraft::new("x".repeat(500), "y".repeat(5000)).with_tags(["a", "b", "c", "d"]),
        ];
        for preset in presets {
            let rules = ScoringRules::preset(preset);
            for draft in &drafts {
                assert!(score(draft, &rules).value <= 100);
            }
        }
    }

    #[test]
    fn test_hint_limit_is_configurable() {
        let rules = ScoringRules {
            hint_limit: 1,
            ..ScoringRules::default()
        };
        let result = score(&ContentDraft::default(), &rules);
        assert_eq!(result.hints, vec!["Select a category".to_string()]);
    }

    #[test]
    fn test_breakdown_serializes_in_evaluation_order() {
        let result = score(&complete_draft(), &ScoringRules::default());
        let json = serde_json::to_string(&result).unwrap();
        let category = json.find("\"category\"").unwrap();
        let title = json.find("\"title\"").unwrap();
        let cta = json.find("\"callToAction\"").unwrap();
        assert!(category < title && title < cta);
        assert!(!json.contains("allHints"));
    }

    #[test]
    fn test_band_thresholds() {
        assert_eq!(ScoreBand::from_value(39), ScoreBand::Danger);
        assert_eq!(ScoreBand::from_value(40), ScoreBand::Warn);
        assert_eq!(ScoreBand::from_value(69), ScoreBand::Warn);
        assert_eq!(ScoreBand::from_value(70), ScoreBand::Good);
    }

    #[test]
    fn test_uneven_band_used_by_upload_panel() {
        let rules = ScoringRules::preset(RulePreset::UploadPanel);
        let exact_45 = ContentDraft::new("x".repeat(45), "");
        let exact_46 = ContentDraft::new("x".repeat(46), "");
        assert_eq!(score(&exact_45, &rules).points(Criterion::Title), Some(0));
        assert_eq!(score(&exact_46, &rules).points(Criterion::Title), Some(30));
        assert_eq!(rules.title_length, Band::new(46, 79));
    }
}
