//! Gynecological conditions (38 CFR 4.116).

use super::*;

pub(super) fn criteria() -> Vec<ConditionCriteria> {
    vec![endometriosis()]
}

fn endometriosis() -> ConditionCriteria {
    ConditionCriteria::new(
        "7629",
        "Endometriosis",
        "38 CFR 4.116",
        BodySystem::Gynecological,
        Aggregator::Symptoms,
    )
    .symptoms(&["pelvic-pain", "heavy-bleeding", "irregular-bleeding", "bowel-symptoms", "bladder-symptoms"])
    .profile_aware()
    .prerequisite(
        flag("hasDiagnosis"),
        RatingOutcome::ClinicalDiagnosisRequired,
        "Endometriosis must be confirmed by laparoscopy before any rating applies",
    )
    .table(RatingTable::new(
        "Endometriosis",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(
                pct(50),
                "Lesions involving bowel or bladder, with pelvic pain or heavy bleeding not controlled by treatment",
                all_of(vec![
                    flag("treatmentRefractory"),
                    any_of(vec![
                        count("days.bowel-symptoms", 1.0),
                        count("days.bladder-symptoms", 1.0),
                    ]),
                ]),
            ),
            RatingTier::new(
                pct(30),
                "Pelvic pain or heavy or irregular bleeding not controlled by treatment",
                flag("treatmentRefractory"),
            ),
            RatingTier::new(
                pct(10),
                "Pelvic pain or heavy or irregular bleeding requiring continuous treatment for control",
                count("medicationDays", 1.0),
            ),
            RatingTier::floor(pct(0), "Controlled without continuous treatment"),
        ],
    ))
    .evidence(vec![
        evidence("days.pelvic-pain", "{} days with pelvic pain"),
        evidence("medicationDays", "{} days with treatment documented"),
        evidence("treatmentRefractory", "Symptoms not controlled by treatment"),
    ])
    .gaps(vec![next_tier_gap(
        pct(0),
        missing("hasDiagnosis"),
        "No laparoscopic diagnosis in your condition profile",
    )])
}
