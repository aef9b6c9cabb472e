//! Skin (38 CFR 4.118).

use super::*;

const CFR: &str = "38 CFR 4.118";

pub(super) fn criteria() -> Vec<ConditionCriteria> {
    vec![
        dermatitis("7806", "Dermatitis or Eczema", &["rash", "itching", "dry-skin", "skin-lesions", "eczema-flare"]),
        dermatitis("7816", "Psoriasis", &["psoriasis-flare", "skin-plaques", "itching", "scaling"]),
        dermatitis("7813", "Dermatophytosis", &["rash", "itching", "fungal-infection"]),
    ]
}

/// General rating formula for the skin: area affected or systemic therapy,
/// whichever is worse.
pub(super) fn dermatitis_table() -> RatingTable {
    RatingTable::new(
        "General Rating Formula for the Skin",
        Floor::Outcome(RatingOutcome::RequiresEvaluation),
        vec![
            RatingTier::new(
                RatingOutcome::Range(40, 100),
                "More than 40 percent of the body affected, or constant or near-constant systemic therapy",
                any_of(vec![
                    range("bodySurfaceArea", 40.0, None),
                    count("systemicTherapyShare", 0.8),
                ]),
            )
            .described(&[
                "At least 40 percent of the entire body or exposed areas affected",
                "Systemic therapy such as corticosteroids or immunosuppressives on at least 80 percent of days in the window",
            ]),
            RatingTier::new(
                RatingOutcome::Range(20, 39),
                "20 to 40 percent of the body affected, or systemic therapy for six weeks or more in a year",
                any_of(vec![
                    range("bodySurfaceArea", 20.0, Some(40.0)),
                    count("systemicTherapyWeeks", 6.0),
                ]),
            ),
            RatingTier::new(
                RatingOutcome::Range(5, 19),
                "5 to 20 percent of the body affected, or systemic therapy for less than six weeks",
                any_of(vec![
                    range("bodySurfaceArea", 5.0, Some(20.0)),
                    exceeds("systemicTherapyWeeks", 0.0),
                ]),
            ),
            RatingTier::new(
                RatingOutcome::Range(0, 4),
                "Less than 5 percent of the body affected, with no more than topical therapy",
                range("bodySurfaceArea", 0.0, Some(5.0)),
            ),
        ],
    )
}

fn dermatitis(
    code: &'static str,
    name: &'static str,
    symptoms: &'static [&'static str],
) -> ConditionCriteria {
    ConditionCriteria::new(code, name, CFR, BodySystem::Skin, Aggregator::Skin)
        .symptoms(symptoms)
        .measurements(&["skin-bsa"])
        .table(dermatitis_table())
        .evidence(vec![
            evidence("bodySurfaceArea", "{} percent of body surface affected"),
            evidence("systemicTherapyWeeks", "{} weeks of systemic therapy"),
            evidence("systemicTherapyShare", "Systemic therapy on {} of days in the window"),
            evidence("topicalTherapy", "Topical therapy documented"),
            evidence("symptomDaysPerMonth", "{} days per month with active skin symptoms"),
        ])
        .gaps(vec![blocking_gap(
            missing("bodySurfaceArea"),
            "No body-surface-area estimate on file. Record the percent of body or exposed area affected during a flare",
        )])
        .define(
            "Body surface area",
            "Share of the entire body or of exposed areas affected; the palm of the hand is about 1 percent",
        )
        .define(
            "Systemic therapy",
            "Treatment taken by mouth or injection, such as corticosteroids or immunosuppressive drugs",
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::*;
    use crate::selector::select_rating;
    use crate::SymptomLog;

    fn systemic_outcome(therapy_days: i64, window_days: u32) -> RatingOutcome {
        let criteria = dermatitis("7806", "Dermatitis or Eczema", &["rash"]);
        let logs: Vec<SymptomLog> = (0..therapy_days)
            .map(|d| SymptomLog::new("rash", days_ago(d)).with_meta("systemicTherapy", true))
            .collect();
        let m = run(Aggregator::Skin, criteria.symptom_ids, &logs, &[], None, window_days);
        select_rating(&m, &criteria).outcome
    }

    #[test]
    fn test_near_constant_systemic_therapy_is_top_band() {
        assert_eq!(systemic_outcome(80, 90), RatingOutcome::Range(40, 100));
        assert_eq!(systemic_outcome(71, 90), RatingOutcome::Range(20, 39));
    }

    #[test]
    fn test_six_weeks_of_systemic_therapy_is_middle_band() {
        assert_eq!(systemic_outcome(42, 365), RatingOutcome::Range(20, 39));
        assert_eq!(systemic_outcome(41, 365), RatingOutcome::Range(5, 19));
    }

    #[test]
    fn test_any_systemic_therapy_lifts_out_of_lowest_band() {
        assert_eq!(systemic_outcome(3, 365), RatingOutcome::Range(5, 19));
        assert_eq!(systemic_outcome(0, 365), RatingOutcome::RequiresEvaluation);
    }
}
