use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::person::{Notes, AUTOMATIC_LOSS_BY_MARRIAGE, NATURALIZATION_FOREIGN};
use crate::domain::{LineageLink, TransmissionStatus};

use super::expr::Context;
use super::value::truthy;

/// Facts derived from an ancestry chain.
///
/// Every flag except `parent_citizenship_status` is OR-accumulated over
/// the whole chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Facts {
    /// Someone in the chain was born in Italy
    pub italian_birth_anchor: bool,

    /// A maternal link whose child was born before 1948-01-01
    pub pre1948_maternal_link: bool,

    /// BROKEN_NATURALIZATION if the last qualifying link broke the chain
    pub parent_citizenship_status: TransmissionStatus,

    pub minor_issue_block: bool,

    pub minor_issue_edge: bool,

    pub automatic_loss_marriage: bool,

    pub tajani_non_exempt: bool,

    pub tajani_exempt: bool,

    pub alternative_path_by_residence: bool,

    /// Transmission status per link, parallel to the chain
    #[serde(skip)]
    pub link_statuses: Vec<TransmissionStatus>,
}

impl Facts {
    /// Insert every fact into a flat context, overwriting existing keys.
    pub fn extend_context(&self, ctx: &mut Context) {
        let flags = [
            ("italian_birth_anchor", self.italian_birth_anchor),
            ("pre1948_maternal_link", self.pre1948_maternal_link),
            ("minor_issue_block", self.minor_issue_block),
            ("minor_issue_edge", self.minor_issue_edge),
            ("automatic_loss_marriage", self.automatic_loss_marriage),
            ("tajani_non_exempt", self.tajani_non_exempt),
            ("tajani_exempt", self.tajani_exempt),
            (
                "alternative_path_by_residence",
                self.alternative_path_by_residence,
            ),
        ];

        for (key, flag) in flags {
            ctx.insert(key.to_string(), Value::Bool(flag));
        }
        ctx.insert(
            "parent_citizenship_status".to_string(),
            Value::String(self.parent_citizenship_status.as_str().to_string()),
        );
    }
}

/// Derives [`Facts`] from an ordered ancestry chain.
///
/// Extraction never fails and never modifies the chain: a missing date
/// or note simply leaves the corresponding fact unset.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    /// Children born on or after this date fall under the reform
    reform_date: NaiveDate,
    /// Maternal links only matter for children born before this date
    maternal_cutoff: NaiveDate,
    /// Age of majority in years
    majority_age: f64,
}

impl FeatureExtractor {
    /// Walk the chain from ancestor to applicant and accumulate facts.
    pub fn extract(&self, chain: &[LineageLink]) -> Facts {
        let mut facts = Facts {
            link_statuses: vec![TransmissionStatus::Intact; chain.len()],
            ..Facts::default()
        };

        for (index, link) in chain.iter().enumerate() {
            let parent = &link.parent;
            let child = &link.child;

            if parent.born_in("italy") || child.born_in("italy") {
                facts.italian_birth_anchor = true;
            }

            if link.is_maternal() && child.birth_date.is_some_and(|d| d < self.maternal_cutoff) {
                facts.pre1948_maternal_link = true;
            }

            let naturalization = parent.find_event(NATURALIZATION_FOREIGN);
            if let (Some(event), Some(birth)) = (naturalization, child.birth_date) {
                if let Some(naturalized) = event.date {
                    if naturalized < birth {
                        debug!(
                            link = index,
                            parent = %parent.id,
                            child = %child.id,
                            "Parent naturalized before child's birth"
                        );
                        facts.link_statuses[index] = TransmissionStatus::BrokenNaturalization;
                        facts.parent_citizenship_status = TransmissionStatus::BrokenNaturalization;
                    }

                    let age = (naturalized - birth).num_days() as f64 / 365.25;
                    if age < self.majority_age {
                        self.apply_minor_issue(&event.metadata, &mut facts);
                    }
                }
            }

            if parent.find_event(AUTOMATIC_LOSS_BY_MARRIAGE).is_some() {
                facts.automatic_loss_marriage = true;
            }

            let post_reform = child.birth_date.is_some_and(|d| d >= self.reform_date);
            if post_reform && !child.other_citizenships_at_birth.is_empty() {
                if note_flag(&child.notes, "tajani_exemption", false) {
                    facts.tajani_exempt = true;
                } else {
                    facts.tajani_non_exempt = true;
                }
            }

            if note_flag(&child.notes, "resident_in_italy_as_descendant", false) {
                facts.alternative_path_by_residence = true;
            }
        }

        facts
    }

    /// Classify a naturalization that happened while the child was a minor.
    ///
    /// The block branch wins when both would match.
    fn apply_minor_issue(&self, metadata: &Notes, facts: &mut Facts) {
        let co_resident = note_flag(metadata, "co_resident_child", true);
        let emancipated = note_flag(metadata, "child_emancipated", false);
        let jus_soli = note_flag(metadata, "jus_soli_country", false);

        if co_resident && jus_soli && !emancipated {
            facts.minor_issue_block = true;
        } else if !co_resident || emancipated {
            facts.minor_issue_edge = true;
        }
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        FeatureExtractor {
            reform_date: NaiveDate::from_ymd_opt(2024, 12, 23).unwrap_or_default(),
            maternal_cutoff: NaiveDate::from_ymd_opt(1948, 1, 1).unwrap_or_default(),
            majority_age: 18.0,
        }
    }
}

fn note_flag(notes: &Notes, key: &str, default: bool) -> bool {
    notes.get(key).map(truthy).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CitizenshipEvent, Person};
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ancestor() -> Person {
        Person::new("a1", "Giorgio").born(date(1890, 5, 1), "Italy")
    }

    fn person(id: &str, born: NaiveDate) -> Person {
        Person::new(id, id).born(born, "USA")
    }

    fn naturalized(on: NaiveDate) -> CitizenshipEvent {
        CitizenshipEvent::new(NATURALIZATION_FOREIGN, Some(on)).with_country("USA")
    }

    #[test]
    fn test_empty_chain_defaults() {
        let facts = FeatureExtractor::default().extract(&[]);
        assert_eq!(facts, Facts::default());
    }

    #[test]
    fn test_italian_anchor_any_person() {
        let child = Person::new("c", "Child").born(date(1920, 1, 1), " italy ");
        let chain = vec![LineageLink::new(person("p", date(1890, 1, 1)), child, "father")];

        assert!(FeatureExtractor::default().extract(&chain).italian_birth_anchor);

        let chain = vec![LineageLink::new(
            person("p", date(1890, 1, 1)),
            person("c", date(1920, 1, 1)),
            "father",
        )];
        assert!(!FeatureExtractor::default().extract(&chain).italian_birth_anchor);
    }

    #[test]
    fn test_pre1948_maternal_boundary() {
        let extractor = FeatureExtractor::default();

        let before = vec![LineageLink::new(ancestor(), person("c", date(1947, 12, 31)), "Mother")];
        assert!(extractor.extract(&before).pre1948_maternal_link);

        let on_cutoff = vec![LineageLink::new(ancestor(), person("c", date(1948, 1, 1)), "mother")];
        assert!(!extractor.extract(&on_cutoff).pre1948_maternal_link);

        let paternal = vec![LineageLink::new(ancestor(), person("c", date(1930, 1, 1)), "father")];
        assert!(!extractor.extract(&paternal).pre1948_maternal_link);
    }

    #[test]
    fn test_naturalization_before_birth_breaks_link() {
        let parent = ancestor().with_event(naturalized(date(1910, 1, 1)));
        let child = person("c", date(1920, 6, 1));
        let applicant = person("app", date(1950, 7, 1));
        let chain = vec![
            LineageLink::new(parent, child.clone(), "father"),
            LineageLink::new(child, applicant, "mother"),
        ];

        let facts = FeatureExtractor::default().extract(&chain);

        assert_eq!(
            facts.parent_citizenship_status,
            TransmissionStatus::BrokenNaturalization
        );
        assert_eq!(
            facts.link_statuses,
            vec![TransmissionStatus::BrokenNaturalization, TransmissionStatus::Intact]
        );
        // Negative age with default metadata triggers neither minor flag.
        assert!(!facts.minor_issue_block);
        assert!(!facts.minor_issue_edge);
    }

    #[test]
    fn test_extraction_leaves_chain_untouched() {
        let parent = ancestor().with_event(naturalized(date(1910, 1, 1)));
        let chain = vec![LineageLink::new(parent, person("c", date(1920, 6, 1)), "father")];
        let before = chain.clone();

        let _ = FeatureExtractor::default().extract(&chain);

        assert_eq!(chain, before);
    }

    #[test]
    fn test_naturalization_after_birth_is_intact() {
        let parent = ancestor().with_event(naturalized(date(1960, 1, 1)));
        let chain = vec![LineageLink::new(parent, person("c", date(1920, 6, 1)), "father")];

        let facts = FeatureExtractor::default().extract(&chain);
        assert_eq!(facts.parent_citizenship_status, TransmissionStatus::Intact);
        assert!(!facts.minor_issue_block);
        assert!(!facts.minor_issue_edge);
    }

    #[test]
    fn test_minor_issue_block() {
        let event = naturalized(date(1940, 1, 1))
            .with_metadata("co_resident_child", json!(true))
            .with_metadata("jus_soli_country", json!(true));
        let chain = vec![LineageLink::new(
            ancestor().with_event(event),
            person("c", date(1930, 6, 1)),
            "father",
        )];

        let facts = FeatureExtractor::default().extract(&chain);
        assert!(facts.minor_issue_block);
        assert!(!facts.minor_issue_edge);
    }

    #[test]
    fn test_minor_issue_edge_when_emancipated() {
        let event = naturalized(date(1940, 1, 1))
            .with_metadata("jus_soli_country", json!(true))
            .with_metadata("child_emancipated", json!(true));
        let chain = vec![LineageLink::new(
            ancestor().with_event(event),
            person("c", date(1930, 6, 1)),
            "father",
        )];

        let facts = FeatureExtractor::default().extract(&chain);
        assert!(!facts.minor_issue_block);
        assert!(facts.minor_issue_edge);
    }

    #[test]
    fn test_minor_issue_edge_when_not_co_resident() {
        let event = naturalized(date(1940, 1, 1)).with_metadata("co_resident_child", json!(false));
        let chain = vec![LineageLink::new(
            ancestor().with_event(event),
            person("c", date(1930, 6, 1)),
            "father",
        )];

        assert!(FeatureExtractor::default().extract(&chain).minor_issue_edge);
    }

    #[test]
    fn test_minor_issue_needs_minority() {
        // Child is 19.5 years old at naturalization.
        let event = naturalized(date(1950, 1, 1)).with_metadata("jus_soli_country", json!(true));
        let chain = vec![LineageLink::new(
            ancestor().with_event(event),
            person("c", date(1930, 6, 1)),
            "father",
        )];

        let facts = FeatureExtractor::default().extract(&chain);
        assert!(!facts.minor_issue_block);
        assert!(!facts.minor_issue_edge);
    }

    #[test]
    fn test_minor_issue_majority_boundary() {
        let chain_naturalized_on = |on: NaiveDate| {
            let event = naturalized(on)
                .with_metadata("co_resident_child", json!(true))
                .with_metadata("jus_soli_country", json!(true));
            vec![LineageLink::new(
                ancestor().with_event(event),
                person("c", date(1930, 6, 1)),
                "father",
            )]
        };
        let extractor = FeatureExtractor::default();

        // 18th birthday: 6575 days, no longer a minor.
        let facts = extractor.extract(&chain_naturalized_on(date(1948, 6, 1)));
        assert!(!facts.minor_issue_block);
        assert!(!facts.minor_issue_edge);

        // One day short of 18.
        let facts = extractor.extract(&chain_naturalized_on(date(1948, 5, 31)));
        assert!(facts.minor_issue_block);
        assert!(!facts.minor_issue_edge);
    }

    #[test]
    fn test_automatic_loss_by_marriage() {
        let parent = ancestor().with_event(CitizenshipEvent::new(AUTOMATIC_LOSS_BY_MARRIAGE, None));
        let chain = vec![LineageLink::new(parent, person("c", date(1930, 6, 1)), "mother")];

        assert!(FeatureExtractor::default().extract(&chain).automatic_loss_marriage);
    }

    #[test]
    fn test_reform_flags_accumulate_independently() {
        let exempt = person("c", date(2025, 1, 1))
            .with_other_citizenship("USA")
            .with_note("tajani_exemption", json!(true))
            .with_note("resident_in_italy_as_descendant", json!(true));
        let non_exempt = person("app", date(2048, 7, 1)).with_other_citizenship("USA");
        let chain = vec![
            LineageLink::new(ancestor(), exempt.clone(), "father"),
            LineageLink::new(exempt, non_exempt, "mother"),
        ];

        let facts = FeatureExtractor::default().extract(&chain);
        assert!(facts.tajani_exempt);
        assert!(facts.tajani_non_exempt);
        assert!(facts.alternative_path_by_residence);
    }

    #[test]
    fn test_reform_requires_other_citizenship() {
        let child = person("c", date(2025, 1, 1));
        let chain = vec![LineageLink::new(ancestor(), child, "father")];

        let facts = FeatureExtractor::default().extract(&chain);
        assert!(!facts.tajani_exempt);
        assert!(!facts.tajani_non_exempt);
    }

    #[test]
    fn test_reform_date_inclusive() {
        let child = person("c", date(2024, 12, 23)).with_other_citizenship("BRA");
        let chain = vec![LineageLink::new(ancestor(), child, "father")];

        assert!(FeatureExtractor::default().extract(&chain).tajani_non_exempt);
    }

    #[test]
    fn test_extend_context() {
        let facts = Facts {
            italian_birth_anchor: true,
            parent_citizenship_status: TransmissionStatus::BrokenNaturalization,
            ..Facts::default()
        };

        let mut ctx = Context::new();
        ctx.insert("italian_birth_anchor".to_string(), json!("shadowed"));
        facts.extend_context(&mut ctx);

        assert_eq!(ctx["italian_birth_anchor"], json!(true));
        assert_eq!(ctx["minor_issue_block"], json!(false));
        assert_eq!(ctx["parent_citizenship_status"], json!("BROKEN_NATURALIZATION"));
        assert_eq!(ctx.len(), 9);
    }
}
