//! Neurological conditions and convulsive disorders (38 CFR 4.124a).

use super::*;

const CFR: &str = "38 CFR 4.124a";

pub(super) fn criteria() -> Vec<ConditionCriteria> {
    let mut all = vec![migraine(), epilepsy()];
    all.extend(peripheral_nerves());
    all.extend([
        minimum_thirty("8018", "Multiple Sclerosis", &["numbness", "weakness", "fatigue", "vision-changes", "balance-problems"]),
        minimum_thirty("8004", "Parkinson's Disease", &["tremor", "rigidity", "balance-problems", "slowed-movement"]),
        minimum_thirty("8025", "Myasthenia Gravis", &["muscle-weakness", "fatigue", "double-vision", "swallowing-difficulty"]),
    ]);
    all
}

fn migraine() -> ConditionCriteria {
    ConditionCriteria::new("8100", "Migraine", CFR, BodySystem::Neurological, Aggregator::Migraine)
        .symptoms(&["migraine", "headache", "migraine-headache"])
        .table(RatingTable::new(
            "General",
            Floor::ZeroPercent,
            vec![
                RatingTier::new(
                    pct(50),
                    "Very frequent completely prostrating and prolonged attacks productive of severe economic inadaptability",
                    all_of(vec![
                        count("prostratingPerMonth", 2.0),
                        count("prolongedAttacks", 1.0),
                        count("economicImpactAttacks", 1.0),
                    ]),
                )
                .described(&[
                    "Very frequent prostrating attacks",
                    "Attacks are prolonged",
                    "Severe economic inadaptability",
                ]),
                RatingTier::new(
                    pct(30),
                    "Characteristic prostrating attacks occurring on average once a month",
                    count("prostratingPerMonth", 1.0),
                )
                .described(&["Prostrating attacks averaging once a month over several months"]),
                RatingTier::new(
                    pct(10),
                    "Characteristic prostrating attacks averaging one in two months",
                    count("prostratingPerMonth", 0.5),
                )
                .described(&["Prostrating attacks averaging one in two months"]),
                RatingTier::floor(pct(0), "Less frequent attacks"),
            ],
        ))
        .evidence(vec![
            evidence("prostratingAttacks", "{} qualifying prostrating attacks in period"),
            evidence("prolongedAttacks", "{} prostrating attacks lasting longer than a day"),
            evidence("economicImpactAttacks", "{} attacks with documented work impact"),
        ])
        .gaps(vec![
            next_tier_gap(
                pct(10),
                missing("prostratingAttacks"),
                "No attacks marked prostrating. Record whether each attack forced you to stop activity and lie down",
            ),
            next_tier_gap(
                pct(50),
                count("undocumentedImpactAttacks", 1.0),
                "Some prostrating attacks have no work impact recorded. Note missed or shortened work days",
            ),
        ])
        .define(
            "Prostrating",
            "An attack severe enough that you had to stop what you were doing and rest",
        )
        .define(
            "Economic inadaptability",
            "Work impact such as missed shifts, leaving early or reduced productivity; it does not require unemployment",
        )
}

fn epilepsy() -> ConditionCriteria {
    ConditionCriteria::new(
        "8910",
        "Epilepsy, Grand Mal",
        CFR,
        BodySystem::Neurological,
        Aggregator::Seizures,
    )
    .symptoms(&["seizure", "seizure-major", "seizure-minor", "grand-mal"])
    .table(RatingTable::new(
        "General Rating Formula for Major and Minor Epileptic Seizures",
        Floor::LowestCompensable,
        vec![
            RatingTier::new(
                pct(100),
                "Averaging at least one major seizure per month",
                count("majorPerMonth", 1.0),
            ),
            RatingTier::new(
                pct(80),
                "At least one major seizure in three months, or more than ten minor seizures weekly",
                any_of(vec![
                    count("majorPerMonth", 1.0 / 3.0),
                    exceeds("minorPerWeek", 10.0),
                ]),
            ),
            RatingTier::new(
                pct(60),
                "At least one major seizure in four months, or nine to ten minor seizures weekly",
                any_of(vec![count("majorPerMonth", 0.25), count("minorPerWeek", 9.0)]),
            ),
            RatingTier::new(
                pct(40),
                "At least one major seizure in six months, or five to eight minor seizures weekly",
                any_of(vec![
                    count("majorPerMonth", 1.0 / 6.0),
                    count("minorPerWeek", 5.0),
                ]),
            ),
            RatingTier::new(
                pct(20),
                "At least one major seizure in two years, or at least two minor seizures in six months",
                any_of(vec![count("majorSeizures", 1.0), count("minorSeizures", 2.0)]),
            ),
            RatingTier::floor(pct(10), "A confirmed diagnosis of epilepsy with a history of seizures"),
        ],
    ))
    .evidence(vec![
        evidence("majorSeizures", "{} major seizures logged"),
        evidence("minorSeizures", "{} minor seizures logged"),
    ])
    .define(
        "Major seizure",
        "A generalized tonic-clonic convulsion with unconsciousness",
    )
    .define(
        "Minor seizure",
        "A brief interruption in consciousness or conscious control, or a brief myoclonic jerk",
    )
}

/// Grade thresholds map onto `impairmentGrade`: 5 complete, 4 severe,
/// 3 moderately severe, 2 moderate, 1 mild.
struct NerveSchedule {
    code: &'static str,
    name: &'static str,
    nerve: &'static str,
    symptoms: &'static [&'static str],
    /// (percent, minimum grade, summary), most severe first.
    rows: &'static [(u8, f64, &'static str)],
}

const NERVES: &[NerveSchedule] = &[
    NerveSchedule {
        code: "8520",
        name: "Paralysis of the Sciatic Nerve",
        nerve: "sciatic",
        symptoms: &["sciatica", "radiculopathy", "leg-numbness", "leg-tingling"],
        rows: &[
            (80, 5.0, "Complete paralysis; the foot dangles and drops"),
            (60, 4.0, "Severe incomplete paralysis with marked muscular atrophy"),
            (40, 3.0, "Moderately severe incomplete paralysis"),
            (20, 2.0, "Moderate incomplete paralysis"),
            (10, 1.0, "Mild incomplete paralysis"),
        ],
    },
    NerveSchedule {
        code: "8521",
        name: "Paralysis of the Common Peroneal Nerve",
        nerve: "peroneal",
        symptoms: &["foot-drop", "foot-numbness", "radiculopathy"],
        rows: &[
            (40, 5.0, "Complete paralysis; foot drop"),
            (30, 4.0, "Severe incomplete paralysis"),
            (20, 2.0, "Moderate incomplete paralysis"),
            (10, 1.0, "Mild incomplete paralysis"),
        ],
    },
    NerveSchedule {
        code: "8526",
        name: "Paralysis of the Anterior Crural (Femoral) Nerve",
        nerve: "femoral",
        symptoms: &["thigh-numbness", "knee-weakness", "radiculopathy"],
        rows: &[
            (40, 5.0, "Complete paralysis of the quadriceps extensor muscles"),
            (30, 4.0, "Severe incomplete paralysis"),
            (20, 2.0, "Moderate incomplete paralysis"),
            (10, 1.0, "Mild incomplete paralysis"),
        ],
    },
    NerveSchedule {
        code: "8515",
        name: "Paralysis of the Median Nerve",
        nerve: "median",
        symptoms: &["carpal-tunnel", "hand-numbness", "hand-tingling", "grip-weakness"],
        rows: &[
            (70, 5.0, "Complete paralysis"),
            (50, 4.0, "Severe incomplete paralysis"),
            (30, 2.0, "Moderate incomplete paralysis"),
            (10, 1.0, "Mild incomplete paralysis"),
        ],
    },
    NerveSchedule {
        code: "8516",
        name: "Paralysis of the Ulnar Nerve",
        nerve: "ulnar",
        symptoms: &["hand-numbness", "finger-tingling", "grip-weakness"],
        rows: &[
            (60, 5.0, "Complete paralysis; griffin claw deformity"),
            (40, 4.0, "Severe incomplete paralysis"),
            (30, 2.0, "Moderate incomplete paralysis"),
            (10, 1.0, "Mild incomplete paralysis"),
        ],
    },
    NerveSchedule {
        code: "8514",
        name: "Paralysis of the Musculospiral (Radial) Nerve",
        nerve: "radial",
        symptoms: &["wrist-drop", "hand-numbness", "arm-weakness"],
        rows: &[
            (70, 5.0, "Complete paralysis; drop of hand and fingers"),
            (50, 4.0, "Severe incomplete paralysis"),
            (30, 2.0, "Moderate incomplete paralysis"),
            (20, 1.0, "Mild incomplete paralysis"),
        ],
    },
    NerveSchedule {
        code: "8510",
        name: "Paralysis of the Upper Radicular Group",
        nerve: "upper-radicular",
        symptoms: &["arm-numbness", "shoulder-weakness", "radiculopathy"],
        rows: &[
            (70, 5.0, "Complete paralysis; all shoulder and elbow movements lost"),
            (50, 4.0, "Severe incomplete paralysis"),
            (40, 2.0, "Moderate incomplete paralysis"),
            (20, 1.0, "Mild incomplete paralysis"),
        ],
    },
    NerveSchedule {
        code: "8205",
        name: "Paralysis of the Fifth (Trigeminal) Cranial Nerve",
        nerve: "trigeminal",
        symptoms: &["facial-pain", "facial-numbness", "trigeminal-neuralgia"],
        rows: &[
            (50, 5.0, "Complete paralysis"),
            (30, 4.0, "Severe incomplete paralysis"),
            (10, 2.0, "Moderate incomplete paralysis"),
        ],
    },
];

fn peripheral_nerves() -> Vec<ConditionCriteria> {
    NERVES.iter().map(nerve_criteria).collect()
}

fn nerve_criteria(schedule: &NerveSchedule) -> ConditionCriteria {
    let tiers = schedule
        .rows
        .iter()
        .map(|&(percent, grade, summary)| {
            RatingTier::new(pct(percent), summary, count("impairmentGrade", grade))
        })
        .collect();

    ConditionCriteria::new(
        schedule.code,
        schedule.name,
        CFR,
        BodySystem::Neurological,
        Aggregator::PeripheralNerve {
            nerve: schedule.nerve,
        },
    )
    .symptoms(schedule.symptoms)
    .table(RatingTable::new(
        "Diseases of the Peripheral Nerves",
        Floor::LowestCompensable,
        tiers,
    ))
    .evidence(vec![
        evidence("symptomDays", "{} days with nerve symptoms logged"),
        evidence("atrophyDocumented", "Muscle atrophy documented"),
        evidence("bilateralDays", "{} days with symptoms on both sides"),
    ])
    .gaps(vec![blocking_gap(
        all_of(vec![missing("atrophyDocumented"), missing("completeParalysis")]),
        "No muscle atrophy or nerve conduction findings noted. Objective findings support severity beyond moderate",
    )])
    .define(
        "Incomplete paralysis",
        "A degree of lost or impaired function substantially less than complete paralysis; wholly sensory involvement is rated mild or at most moderate",
    )
}

fn minimum_thirty(
    code: &'static str,
    name: &'static str,
    symptoms: &'static [&'static str],
) -> ConditionCriteria {
    ConditionCriteria::new(code, name, CFR, BodySystem::Neurological, Aggregator::Symptoms)
        .symptoms(symptoms)
        .profile_aware()
        .prerequisite(
            flag("hasDiagnosis"),
            RatingOutcome::ClinicalDiagnosisRequired,
            "The minimum rating applies only once a neurologist has confirmed the diagnosis",
        )
        .table(RatingTable::new(
            "Minimum Rating",
            Floor::LowestCompensable,
            vec![RatingTier::floor(
                pct(30),
                "Minimum rating for a confirmed diagnosis; higher ratings come from rating residuals separately",
            )],
        ))
        .evidence(vec![
            evidence("symptomDays", "{} days with symptoms logged"),
            evidence("distinctSymptoms", "{} distinct residual symptoms tracked"),
        ])
        .gaps(vec![next_tier_gap(
            pct(30),
            missing("hasDiagnosis"),
            "Confirm the diagnosis in your condition profile to apply the minimum rating",
        )])
}
