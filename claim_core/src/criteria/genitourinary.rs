//! Genitourinary system (38 CFR 4.115a, 4.115b).

use super::*;

const CFR: &str = "38 CFR 4.115b";

pub(super) fn criteria() -> Vec<ConditionCriteria> {
    vec![
        voiding_dysfunction(),
        genitourinary_malignancy(),
        erectile_dysfunction(),
        chronic_kidney_disease(),
    ]
}

pub(super) fn continence_table() -> RatingTable {
    RatingTable::new(
        "Continence",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(
                pct(60),
                "Requires an appliance or absorbent materials changed more than four times a day",
                any_of(vec![exceeds("avgPadsPerDay", 4.0), flag("applianceUse")]),
            ),
            RatingTier::new(
                pct(40),
                "Absorbent materials changed two to four times a day",
                count("avgPadsPerDay", 2.0),
            ),
            RatingTier::new(
                pct(20),
                "Absorbent materials changed less than two times a day",
                exceeds("avgPadsPerDay", 0.0),
            ),
            RatingTier::floor(pct(0), "No absorbent materials required"),
        ],
    )
}

pub(super) fn frequency_table() -> RatingTable {
    RatingTable::new(
        "Frequency",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(
                pct(40),
                "Daytime voiding interval less than one hour, or awakening to void five or more times a night",
                any_of(vec![
                    range("avgDaytimeInterval", 0.0, Some(1.0)),
                    count("avgNocturia", 5.0),
                ]),
            ),
            RatingTier::new(
                pct(20),
                "Daytime voiding interval between one and two hours, or awakening to void three to four times a night",
                any_of(vec![at_most("avgDaytimeInterval", 2.0), count("avgNocturia", 3.0)]),
            ),
            RatingTier::new(
                pct(10),
                "Daytime voiding interval between two and three hours, or awakening to void two times a night",
                any_of(vec![at_most("avgDaytimeInterval", 3.0), count("avgNocturia", 2.0)]),
            ),
            RatingTier::floor(pct(0), "Voiding frequency within normal limits"),
        ],
    )
}

pub(super) fn obstruction_table() -> RatingTable {
    RatingTable::new(
        "Obstruction",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(
                pct(30),
                "Urinary retention requiring intermittent or continuous catheterization",
                flag("catheterizationRequired"),
            ),
            RatingTier::new(
                pct(10),
                "Marked obstructive symptomatology such as hesitancy, slow or weak stream",
                count("obstructionDays", 1.0),
            ),
            RatingTier::floor(pct(0), "Obstructive symptoms without voiding dysfunction"),
        ],
    )
}

fn voiding_dysfunction() -> ConditionCriteria {
    ConditionCriteria::new(
        "7542",
        "Neurogenic Bladder (Voiding Dysfunction)",
        CFR,
        BodySystem::Genitourinary,
        Aggregator::Voiding,
    )
    .symptoms(&["urinary-frequency", "urinary-incontinence", "urinary-urgency", "nocturia", "urinary-retention"])
    .table(continence_table())
    .table(frequency_table())
    .table(obstruction_table())
    .evidence(vec![
        evidence("avgPadsPerDay", "{} absorbent pads changed per day on average"),
        evidence("avgDaytimeInterval", "Average daytime voiding interval {} hours"),
        evidence("avgNocturia", "{} nighttime voids on average"),
        evidence("obstructionDays", "{} days with obstructive symptoms"),
        evidence("catheterizationRequired", "Catheterization required"),
    ])
    .gaps(vec![blocking_gap(
        all_of(vec![
            missing("avgPadsPerDay"),
            missing("avgDaytimeInterval"),
            missing("avgNocturia"),
        ]),
        "No pad counts or voiding intervals recorded. The voiding tables rate on these numbers, not on symptom days",
    )])
    .define(
        "Voiding dysfunction",
        "Rated on whichever of continence, frequency or obstruction gives the highest evaluation; the tracks are not combined",
    )
}

fn genitourinary_malignancy() -> ConditionCriteria {
    ConditionCriteria::new(
        "7528",
        "Malignant Neoplasms of the Genitourinary System",
        CFR,
        BodySystem::Genitourinary,
        Aggregator::Malignancy,
    )
    .symptoms(&["urinary-frequency", "hematuria", "chemotherapy", "radiation"])
    .table(RatingTable::new(
        "Malignant Neoplasm",
        Floor::Outcome(RatingOutcome::Residuals),
        vec![RatingTier::new(
            pct(100),
            "Active disease or treatment; continues for six months after treatment ends",
            flag("activeTreatment"),
        )],
    ))
    .evidence(vec![evidence("activeTreatment", "Active treatment documented")])
    .define(
        "Residuals",
        "After treatment ends, the condition is rated on its lasting effects such as voiding or renal dysfunction",
    )
}

fn erectile_dysfunction() -> ConditionCriteria {
    ConditionCriteria::new(
        "7522",
        "Erectile Dysfunction",
        CFR,
        BodySystem::Genitourinary,
        Aggregator::Symptoms,
    )
    .symptoms(&["erectile-dysfunction"])
    .table(RatingTable::new(
        "Erectile Dysfunction",
        Floor::ZeroPercent,
        vec![RatingTier::floor(
            pct(0),
            "Erectile dysfunction without penile deformity; eligible for special monthly compensation",
        )],
    ))
    .evidence(vec![evidence("symptomDays", "{} days with symptoms logged")])
    .define(
        "SMC-K",
        "Special monthly compensation for loss of use of a creative organ, paid in addition to the rating",
    )
}

fn chronic_kidney_disease() -> ConditionCriteria {
    ConditionCriteria::new(
        "7530",
        "Chronic Renal Disease",
        "38 CFR 4.115a",
        BodySystem::Genitourinary,
        Aggregator::Renal,
    )
    .symptoms(&["edema", "fatigue", "nausea", "decreased-urination"])
    .measurements(&["egfr"])
    .prerequisite(
        flag("labsOnFile"),
        RatingOutcome::RequiresEvaluation,
        "Renal dysfunction is rated on eGFR; no result is on file",
    )
    .table(RatingTable::new(
        "Renal Dysfunction",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(
                pct(100),
                "Requires regular dialysis, or eGFR less than 15",
                any_of(vec![flag("onDialysis"), range("egfr", 0.0, Some(15.0))]),
            ),
            RatingTier::new(pct(80), "eGFR from 15 to 29", range("egfr", 15.0, Some(30.0))),
            RatingTier::new(pct(60), "eGFR from 30 to 44", range("egfr", 30.0, Some(45.0))),
            RatingTier::new(pct(30), "eGFR from 45 to 59", range("egfr", 45.0, Some(60.0))),
            RatingTier::floor(pct(0), "eGFR of 60 or more"),
        ],
    ))
    .evidence(vec![
        evidence("egfr", "Most recent eGFR {}"),
        evidence("onDialysis", "Dialysis documented"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::*;
    use crate::selector::select_rating;
    use crate::SymptomLog;

    fn voiding_rating(key: &str, value: f64) -> (RatingOutcome, &'static str) {
        let criteria = voiding_dysfunction();
        let logs = vec![SymptomLog::new("urinary-incontinence", days_ago(1)).with_meta(key, value)];
        let m = run(Aggregator::Voiding, criteria.symptom_ids, &logs, &[], None, 90);
        let selection = select_rating(&m, &criteria);
        (selection.outcome, selection.table)
    }

    #[test]
    fn test_four_pads_a_day_is_forty_percent() {
        assert_eq!(voiding_rating("padsPerDay", 4.0), (pct(40), "Continence"));
        assert_eq!(voiding_rating("padsPerDay", 4.5), (pct(60), "Continence"));
        assert_eq!(voiding_rating("padsPerDay", 2.0), (pct(40), "Continence"));
        assert_eq!(voiding_rating("padsPerDay", 1.0), (pct(20), "Continence"));
    }

    #[test]
    fn test_one_hour_interval_is_twenty_percent() {
        assert_eq!(voiding_rating("daytimeIntervalHours", 1.0), (pct(20), "Frequency"));
        assert_eq!(voiding_rating("daytimeIntervalHours", 0.75), (pct(40), "Frequency"));
        assert_eq!(voiding_rating("daytimeIntervalHours", 2.5), (pct(10), "Frequency"));
    }

    #[test]
    fn test_voiding_tracks_are_independent_tables() {
        let criteria = voiding_dysfunction();
        let names: Vec<&str> = criteria.tables.iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Continence", "Frequency", "Obstruction"]);
        assert!(criteria.validate().is_empty());
    }
}
