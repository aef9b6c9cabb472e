//! Cardiovascular system (38 CFR 4.104).

use super::*;

const CFR: &str = "38 CFR 4.104";

const CARDIAC_SYMPTOMS: &[&str] = &[
    "chest-pain",
    "shortness-of-breath",
    "fatigue",
    "dizziness",
    "syncope",
    "heart-failure",
    "chf-episode",
];

pub(super) fn criteria() -> Vec<ConditionCriteria> {
    vec![
        hypertension(),
        cardiac("7005", "Arteriosclerotic Heart Disease (Coronary Artery Disease)"),
        cardiac("7006", "Myocardial Infarction"),
        cardiac("7007", "Hypertensive Heart Disease"),
        cardiac("7020", "Cardiomyopathy"),
        arrhythmia(),
        varicose_veins(),
    ]
}

fn hypertension() -> ConditionCriteria {
    ConditionCriteria::new(
        "7101",
        "Hypertensive Vascular Disease",
        CFR,
        BodySystem::Cardiovascular,
        Aggregator::Hypertension,
    )
    .symptoms(&["headache", "dizziness", "blurred-vision"])
    .measurements(&["blood-pressure"])
    .table(RatingTable::new(
        "Hypertension",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(
                pct(60),
                "Diastolic pressure predominantly 130 or more",
                count("predominantDiastolic", 130.0),
            ),
            RatingTier::new(
                pct(40),
                "Diastolic pressure predominantly 120 or more",
                count("predominantDiastolic", 120.0),
            ),
            RatingTier::new(
                pct(20),
                "Diastolic pressure predominantly 110 or more, or systolic predominantly 200 or more",
                any_of(vec![
                    count("predominantDiastolic", 110.0),
                    count("predominantSystolic", 200.0),
                ]),
            ),
            RatingTier::new(
                pct(10),
                "Diastolic predominantly 100 or more, systolic predominantly 160 or more, or continuous medication for control",
                any_of(vec![
                    count("predominantDiastolic", 100.0),
                    count("predominantSystolic", 160.0),
                    flag("onMedication"),
                ]),
            ),
            RatingTier::floor(pct(0), "Readings below the compensable thresholds"),
        ],
    ))
    .evidence(vec![
        evidence("readingCount", "{} blood pressure readings in period"),
        evidence("predominantSystolic", "Predominant systolic pressure {}"),
        evidence("predominantDiastolic", "Predominant diastolic pressure {}"),
        evidence("onMedication", "Continuous medication for blood pressure documented"),
    ])
    .gaps(vec![blocking_gap(
        at_most("readingDays", 2.0),
        "Fewer than three days of readings. Hypertension must be confirmed by readings taken on at least three different days",
    )])
    .define(
        "Predominantly",
        "The level most readings fall at over the period, not a single peak reading",
    )
}

fn cardiac(code: &'static str, name: &'static str) -> ConditionCriteria {
    ConditionCriteria::new(code, name, CFR, BodySystem::Cardiovascular, Aggregator::Cardiac)
        .symptoms(CARDIAC_SYMPTOMS)
        .measurements(&["mets", "ejection-fraction", "echocardiogram"])
        .table(RatingTable::new(
            "General Rating Formula for Diseases of the Heart",
            Floor::Outcome(RatingOutcome::RequiresEvaluation),
            vec![
                RatingTier::new(
                    pct(100),
                    "Chronic congestive heart failure, workload of 3 METs or less, or ejection fraction below 30 percent",
                    any_of(vec![
                        flag("chronicChf"),
                        at_most("metsTolerance", 3.0),
                        range("ejectionFraction", 0.0, Some(30.0)),
                    ]),
                ),
                RatingTier::new(
                    pct(60),
                    "More than one episode of acute congestive heart failure, workload of 5 METs or less, or ejection fraction of 30 to 50 percent",
                    any_of(vec![
                        count("chfEpisodes", 2.0),
                        at_most("metsTolerance", 5.0),
                        range("ejectionFraction", 30.0, Some(51.0)),
                    ]),
                ),
                RatingTier::new(
                    pct(30),
                    "Workload of 7 METs or less, or evidence of cardiac hypertrophy or dilatation",
                    any_of(vec![
                        at_most("metsTolerance", 7.0),
                        flag("cardiacHypertrophy"),
                    ]),
                ),
                RatingTier::new(
                    pct(10),
                    "Workload of 10 METs or less, or continuous medication required",
                    any_of(vec![at_most("metsTolerance", 10.0), flag("onMedication")]),
                ),
            ],
        ))
        .evidence(vec![
            evidence("metsTolerance", "Lowest workload tolerated: {} METs"),
            evidence("ejectionFraction", "Lowest ejection fraction on file: {} percent"),
            evidence("chfEpisodes", "{} episodes of congestive heart failure"),
            evidence("onMedication", "Continuous cardiac medication documented"),
        ])
        .gaps(vec![blocking_gap(
            missing("objectiveTesting"),
            "No METs or ejection-fraction test on file. An exercise or echocardiogram result is needed for a compensable rating",
        )])
        .define(
            "MET",
            "Metabolic equivalent; one MET is the oxygen used at rest. Lower tolerated workload means more severe disease",
        )
}

fn arrhythmia() -> ConditionCriteria {
    ConditionCriteria::new(
        "7010",
        "Supraventricular Arrhythmias",
        CFR,
        BodySystem::Cardiovascular,
        Aggregator::Symptoms,
    )
    .symptoms(&["palpitations", "racing-heart", "irregular-heartbeat", "dizziness"])
    .table(RatingTable::new(
        "Supraventricular Arrhythmias",
        Floor::Outcome(RatingOutcome::RequiresEvaluation),
        vec![
            RatingTier::new(
                pct(30),
                "More than four episodes per year documented by ECG or Holter monitor",
                all_of(vec![
                    count("symptomEpisodes", 5.0),
                    count("clinicallyDocumentedDays", 1.0),
                ]),
            ),
            RatingTier::new(
                pct(10),
                "Permanent atrial fibrillation, or one to four episodes per year documented by ECG",
                count("clinicallyDocumentedDays", 1.0),
            ),
        ],
    ))
    .evidence(vec![
        evidence("symptomEpisodes", "{} episodes of palpitations logged"),
        evidence("clinicallyDocumentedDays", "{} episodes documented by ECG or Holter"),
    ])
    .gaps(vec![blocking_gap(
        missing("clinicallyDocumentedDays"),
        "No episode documented by ECG or Holter monitor. Self-reported episodes alone do not meet the criteria",
    )])
}

fn varicose_veins() -> ConditionCriteria {
    ConditionCriteria::new(
        "7120",
        "Varicose Veins",
        CFR,
        BodySystem::Cardiovascular,
        Aggregator::Symptoms,
    )
    .symptoms(&["leg-swelling", "leg-aching", "leg-fatigue", "skin-discoloration"])
    .table(RatingTable::new(
        "Varicose Veins",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(
                pct(100),
                "Massive board-like edema with constant pain at rest",
                all_of(vec![
                    count("severeDaysPerMonth", 25.0),
                    flag("treatmentRefractory"),
                ]),
            ),
            RatingTier::new(
                pct(60),
                "Persistent edema or subcutaneous induration with persistent ulceration",
                count("severeDaysPerMonth", 15.0),
            ),
            RatingTier::new(
                pct(40),
                "Persistent edema and stasis pigmentation or eczema",
                count("symptomDaysPerMonth", 20.0),
            ),
            RatingTier::new(
                pct(20),
                "Persistent edema, incompletely relieved by elevation",
                count("symptomDaysPerMonth", 10.0),
            ),
            RatingTier::new(
                pct(10),
                "Intermittent edema or aching after prolonged standing",
                count("symptomDays", 1.0),
            ),
            RatingTier::floor(pct(0), "Asymptomatic palpable or visible veins"),
        ],
    ))
    .evidence(vec![
        evidence("symptomDaysPerMonth", "{} days per month with leg symptoms"),
        evidence("severeDays", "{} days with severe swelling or pain"),
    ])
}
