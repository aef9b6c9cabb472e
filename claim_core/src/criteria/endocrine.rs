//! Endocrine system (38 CFR 4.119).

use super::*;

const CFR: &str = "38 CFR 4.119";

pub(super) fn criteria() -> Vec<ConditionCriteria> {
    vec![diabetes(), hypothyroidism(), hyperthyroidism()]
}

fn diabetes() -> ConditionCriteria {
    let insulin_diet_activity = || {
        vec![
            flag("usesInsulin"),
            flag("restrictedDiet"),
            flag("regulationOfActivities"),
        ]
    };
    let mut hundred = insulin_diet_activity();
    hundred.push(any_of(vec![
        count("hospitalizations", 3.0),
        count("providerVisitsPerMonth", 4.0),
    ]));
    let mut sixty = insulin_diet_activity();
    sixty.push(any_of(vec![
        count("hospitalizations", 1.0),
        count("providerVisitsPerMonth", 0.5),
    ]));

    ConditionCriteria::new(
        "7913",
        "Diabetes Mellitus",
        CFR,
        BodySystem::Endocrine,
        Aggregator::Diabetes,
    )
    .symptoms(&["hypoglycemia", "hyperglycemia", "fatigue", "excessive-thirst", "frequent-urination", "numbness"])
    .measurements(&["glucose", "hba1c"])
    .table(RatingTable::new(
        "Diabetes Mellitus",
        Floor::Outcome(RatingOutcome::RequiresEvaluation),
        vec![
            RatingTier::new(
                pct(100),
                "Insulin, restricted diet and regulation of activities with at least three hospitalizations a year or weekly visits",
                all_of(hundred),
            ),
            RatingTier::new(
                pct(60),
                "Insulin, restricted diet and regulation of activities with episodes requiring hospitalization or twice-monthly visits",
                all_of(sixty),
            ),
            RatingTier::new(
                pct(40),
                "Insulin, restricted diet and regulation of activities",
                all_of(insulin_diet_activity()),
            ),
            RatingTier::new(
                pct(20),
                "Insulin and restricted diet, or oral hypoglycemic agent and restricted diet",
                any_of(vec![
                    all_of(vec![flag("usesInsulin"), flag("restrictedDiet")]),
                    all_of(vec![flag("oralHypoglycemic"), flag("restrictedDiet")]),
                ]),
            ),
            RatingTier::new(pct(10), "Manageable by restricted diet only", flag("restrictedDiet")),
        ],
    ))
    .evidence(vec![
        evidence("usesInsulin", "Insulin use documented"),
        evidence("oralHypoglycemic", "Oral hypoglycemic medication documented"),
        evidence("restrictedDiet", "Restricted diet documented"),
        evidence("regulationOfActivities", "Medically required regulation of activities documented"),
        evidence("hypoglycemicDays", "{} days with a hypoglycemic reading or reaction"),
        evidence("latestHba1c", "Most recent HbA1c {}"),
    ])
    .gaps(vec![
        blocking_gap(
            missing("latestHba1c"),
            "No HbA1c result on file. A recent result confirms the diagnosis and control",
        ),
        next_tier_gap(
            pct(40),
            missing("regulationOfActivities"),
            "No medically required regulation of activities recorded. It must be a provider instruction to avoid strenuous activity",
        ),
    ])
    .define(
        "Regulation of activities",
        "A medical instruction to avoid strenuous occupational and recreational activities",
    )
}

fn hypothyroidism() -> ConditionCriteria {
    ConditionCriteria::new("7903", "Hypothyroidism", CFR, BodySystem::Endocrine, Aggregator::Thyroid)
        .symptoms(&["fatigue", "cold-intolerance", "weight-gain", "depressed-mood", "constipation"])
        .table(RatingTable::new(
            "Hypothyroidism",
            Floor::LowestCompensable,
            vec![
                RatingTier::new(pct(100), "With myxedema", flag("myxedema")),
                RatingTier::floor(pct(30), "Without myxedema"),
            ],
        ))
        .evidence(vec![
            evidence("continuousMedication", "Continuous thyroid medication documented"),
            evidence("myxedema", "Myxedema documented"),
        ])
}

fn hyperthyroidism() -> ConditionCriteria {
    ConditionCriteria::new(
        "7900",
        "Hyperthyroidism, Including Graves' Disease",
        CFR,
        BodySystem::Endocrine,
        Aggregator::Thyroid,
    )
    .symptoms(&["palpitations", "heat-intolerance", "weight-loss", "tremor", "anxiety"])
    .table(RatingTable::new(
        "Hyperthyroidism",
        Floor::Outcome(RatingOutcome::Residuals),
        vec![RatingTier::new(
            pct(30),
            "For six months after initial diagnosis while under treatment",
            flag("continuousMedication"),
        )],
    ))
    .evidence(vec![evidence(
        "continuousMedication",
        "Ongoing treatment for hyperthyroidism documented",
    )])
}
