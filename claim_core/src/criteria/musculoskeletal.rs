//! Musculoskeletal system (38 CFR 4.71a).

use super::*;

const CFR: &str = "38 CFR 4.71a";

const SPINE_ROM: Aggregator = Aggregator::RangeOfMotion {
    measurement: "thoracolumbar-rom",
    values: &["forwardFlexion", "combinedRange"],
};
const KNEE_ROM: Aggregator = Aggregator::RangeOfMotion {
    measurement: "knee-rom",
    values: &["flexion", "extension"],
};
const SHOULDER_ROM: Aggregator = Aggregator::RangeOfMotion {
    measurement: "shoulder-rom",
    values: &["abduction", "flexion"],
};
const ANKLE_ROM: Aggregator = Aggregator::RangeOfMotion {
    measurement: "ankle-rom",
    values: &["dorsiflexion", "plantarFlexion"],
};
const HIP_ROM: Aggregator = Aggregator::RangeOfMotion {
    measurement: "hip-rom",
    values: &["flexion"],
};

const BACK_SYMPTOMS: &[&str] = &["back-pain", "back-stiffness", "muscle-spasm", "radiating-pain"];

pub(super) fn criteria() -> Vec<ConditionCriteria> {
    vec![
        spine("5237", "Lumbosacral or Cervical Strain"),
        spine("5242", "Degenerative Arthritis of the Spine"),
        spine("5238", "Spinal Stenosis"),
        spine("5243", "Intervertebral Disc Syndrome").table(incapacitating_episodes_table()),
        knee_flexion(),
        knee_extension(),
        knee_instability(),
        shoulder(),
        degenerative_arthritis(),
        ankle(),
        foot_injury(),
        flatfoot(),
        fibromyalgia(),
        hip_flexion(),
    ]
}

fn rom_gap() -> GapRule {
    blocking_gap(
        missing("romOnFile"),
        "No range-of-motion measurement on file. Goniometer readings drive every tier of this schedule",
    )
}

fn spine(code: &'static str, name: &'static str) -> ConditionCriteria {
    ConditionCriteria::new(code, name, CFR, BodySystem::Musculoskeletal, SPINE_ROM)
        .symptoms(BACK_SYMPTOMS)
        .measurements(&["thoracolumbar-rom"])
        .table(RatingTable::new(
            "General Rating Formula for Diseases and Injuries of the Spine",
            Floor::ZeroPercent,
            vec![
                RatingTier::new(
                    pct(100),
                    "Unfavorable ankylosis of the entire spine",
                    count("ankylosisGrade", 3.0),
                ),
                RatingTier::new(
                    pct(50),
                    "Unfavorable ankylosis of the entire thoracolumbar spine",
                    count("ankylosisGrade", 2.0),
                ),
                RatingTier::new(
                    pct(40),
                    "Forward flexion of the thoracolumbar spine 30 degrees or less, or favorable ankylosis",
                    any_of(vec![
                        at_most("forwardFlexion", 30.0),
                        count("ankylosisGrade", 1.0),
                    ]),
                ),
                RatingTier::new(
                    pct(20),
                    "Forward flexion 60 degrees or less, combined range 120 degrees or less, or muscle spasm altering gait",
                    any_of(vec![
                        at_most("forwardFlexion", 60.0),
                        at_most("combinedRange", 120.0),
                        count("muscleSpasmDays", 1.0),
                    ]),
                ),
                RatingTier::new(
                    pct(10),
                    "Forward flexion 85 degrees or less, combined range 235 degrees or less, or painful motion",
                    any_of(vec![
                        at_most("forwardFlexion", 85.0),
                        at_most("combinedRange", 235.0),
                        count("painfulMotionDays", 1.0),
                    ]),
                ),
                RatingTier::floor(pct(0), "Full range of motion without painful motion"),
            ],
        ))
        .evidence(vec![
            evidence("forwardFlexion", "Forward flexion measured at {} degrees"),
            evidence("combinedRange", "Combined range of motion {} degrees"),
            evidence("painfulMotionDays", "{} days with painful motion"),
            evidence("muscleSpasmDays", "{} days with muscle spasm or guarding"),
            evidence("incapacitatingDays", "{} days of physician-prescribed bed rest"),
            evidence("incapacitatingWeeksPerYear", "Bed rest at a rate of {} weeks a year"),
        ])
        .gaps(vec![rom_gap()])
        .define(
            "Combined range of motion",
            "Sum of forward flexion, extension, left and right lateral flexion, and left and right rotation",
        )
        .define(
            "Ankylosis",
            "Immobility and consolidation of a joint; favorable or unfavorable by the position it is fixed in",
        )
}

fn incapacitating_episodes_table() -> RatingTable {
    RatingTable::new(
        "Incapacitating Episodes",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(
                pct(60),
                "Incapacitating episodes totaling at least 6 weeks a year",
                count("incapacitatingWeeksPerYear", 6.0),
            ),
            RatingTier::new(
                pct(40),
                "Incapacitating episodes totaling at least 4 but less than 6 weeks a year",
                count("incapacitatingWeeksPerYear", 4.0),
            ),
            RatingTier::new(
                pct(20),
                "Incapacitating episodes totaling at least 2 but less than 4 weeks a year",
                count("incapacitatingWeeksPerYear", 2.0),
            ),
            RatingTier::new(
                pct(10),
                "Incapacitating episodes totaling at least 1 but less than 2 weeks a year",
                count("incapacitatingWeeksPerYear", 1.0),
            ),
            RatingTier::floor(pct(0), "Less than one week of incapacitating episodes"),
        ],
    )
}

fn knee_flexion() -> ConditionCriteria {
    ConditionCriteria::new(
        "5260",
        "Limitation of Flexion of the Leg",
        CFR,
        BodySystem::Musculoskeletal,
        KNEE_ROM,
    )
    .symptoms(&["knee-pain", "knee-stiffness", "knee-swelling"])
    .measurements(&["knee-rom"])
    .table(RatingTable::new(
        "Flexion",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(pct(30), "Flexion limited to 15 degrees", at_most("flexion", 15.0)),
            RatingTier::new(pct(20), "Flexion limited to 30 degrees", at_most("flexion", 30.0)),
            RatingTier::new(
                pct(10),
                "Flexion limited to 45 degrees, or painful motion",
                any_of(vec![at_most("flexion", 45.0), count("painfulMotionDays", 1.0)]),
            ),
            RatingTier::floor(pct(0), "Flexion limited to 60 degrees or better"),
        ],
    ))
    .evidence(vec![
        evidence("flexion", "Knee flexion measured at {} degrees"),
        evidence("painfulMotionDays", "{} days with painful motion"),
    ])
    .gaps(vec![rom_gap()])
}

fn knee_extension() -> ConditionCriteria {
    ConditionCriteria::new(
        "5261",
        "Limitation of Extension of the Leg",
        CFR,
        BodySystem::Musculoskeletal,
        KNEE_ROM,
    )
    .symptoms(&["knee-pain", "knee-stiffness"])
    .measurements(&["knee-rom"])
    .table(RatingTable::new(
        "Extension",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(pct(50), "Extension limited to 45 degrees", count("extension", 45.0)),
            RatingTier::new(pct(40), "Extension limited to 30 degrees", count("extension", 30.0)),
            RatingTier::new(pct(30), "Extension limited to 20 degrees", count("extension", 20.0)),
            RatingTier::new(pct(20), "Extension limited to 15 degrees", count("extension", 15.0)),
            RatingTier::new(pct(10), "Extension limited to 10 degrees", count("extension", 10.0)),
            RatingTier::floor(pct(0), "Extension limited to 5 degrees or less"),
        ],
    ))
    .evidence(vec![evidence("extension", "Extension lacks {} degrees")])
    .gaps(vec![rom_gap()])
}

fn knee_instability() -> ConditionCriteria {
    ConditionCriteria::new(
        "5257",
        "Knee, Recurrent Subluxation or Lateral Instability",
        CFR,
        BodySystem::Musculoskeletal,
        KNEE_ROM,
    )
    .symptoms(&["knee-instability", "knee-giving-way"])
    .table(RatingTable::new(
        "Instability",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(pct(30), "Severe instability", count("instabilityGrade", 3.0)),
            RatingTier::new(pct(20), "Moderate instability", count("instabilityGrade", 2.0)),
            RatingTier::new(pct(10), "Slight instability", count("instabilityGrade", 1.0)),
            RatingTier::floor(pct(0), "No instability documented"),
        ],
    ))
    .evidence(vec![
        evidence("symptomDays", "{} days with giving way or instability"),
        evidence("instabilityGrade", "Instability graded {} of 3"),
    ])
    .gaps(vec![blocking_gap(
        missing("instabilityGrade"),
        "No instability grade recorded. Note slight, moderate or severe on each giving-way event",
    )])
    .define(
        "Instability grade",
        "1 slight, 2 moderate, 3 severe, as found on stability testing",
    )
}

fn shoulder() -> ConditionCriteria {
    ConditionCriteria::new(
        "5201",
        "Limitation of Motion of the Arm",
        CFR,
        BodySystem::Musculoskeletal,
        SHOULDER_ROM,
    )
    .symptoms(&["shoulder-pain", "shoulder-stiffness"])
    .measurements(&["shoulder-rom"])
    .table(RatingTable::new(
        "Arm Motion",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(pct(40), "Motion limited to 25 degrees from side", at_most("abduction", 25.0)),
            RatingTier::new(pct(30), "Motion limited midway between side and shoulder level", at_most("abduction", 45.0)),
            RatingTier::new(pct(20), "Motion limited at shoulder level", at_most("abduction", 90.0)),
            RatingTier::floor(pct(0), "Motion above shoulder level"),
        ],
    ))
    .evidence(vec![evidence("abduction", "Arm abduction measured at {} degrees")])
    .gaps(vec![rom_gap()])
}

fn degenerative_arthritis() -> ConditionCriteria {
    ConditionCriteria::new(
        "5003",
        "Degenerative Arthritis",
        CFR,
        BodySystem::Musculoskeletal,
        Aggregator::Episodes,
    )
    .symptoms(&["joint-pain", "joint-stiffness", "joint-swelling"])
    .profile_aware()
    .prerequisite(
        flag("hasDiagnosis"),
        RatingOutcome::ClinicalDiagnosisRequired,
        "Degenerative arthritis must be established by X-ray findings",
    )
    .table(RatingTable::new(
        "X-ray Evidence",
        Floor::LowestCompensable,
        vec![
            RatingTier::new(
                pct(20),
                "X-ray involvement of two or more major joints with occasional incapacitating exacerbations",
                count("incapacitatingEpisodes", 1.0),
            ),
            RatingTier::floor(pct(10), "X-ray involvement of two or more major joints"),
        ],
    ))
    .evidence(vec![
        evidence("symptomDays", "{} days with joint symptoms"),
        evidence("incapacitatingEpisodes", "{} incapacitating exacerbations"),
    ])
    .gaps(vec![next_tier_gap(
        pct(10),
        missing("hasDiagnosis"),
        "No X-ray confirmation recorded. Mark the diagnosis as confirmed in your condition profile once imaging is on file",
    )])
}

fn ankle() -> ConditionCriteria {
    ConditionCriteria::new(
        "5271",
        "Ankle, Limited Motion",
        CFR,
        BodySystem::Musculoskeletal,
        ANKLE_ROM,
    )
    .symptoms(&["ankle-pain", "ankle-stiffness", "ankle-swelling"])
    .measurements(&["ankle-rom"])
    .table(RatingTable::new(
        "Ankle Motion",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(
                pct(20),
                "Marked limitation of motion",
                any_of(vec![
                    at_most("dorsiflexion", 5.0),
                    at_most("plantarFlexion", 20.0),
                ]),
            ),
            RatingTier::new(
                pct(10),
                "Moderate limitation of motion, or painful motion",
                any_of(vec![
                    at_most("dorsiflexion", 15.0),
                    at_most("plantarFlexion", 40.0),
                    count("painfulMotionDays", 1.0),
                ]),
            ),
            RatingTier::floor(pct(0), "Full range of ankle motion"),
        ],
    ))
    .evidence(vec![
        evidence("dorsiflexion", "Dorsiflexion measured at {} degrees"),
        evidence("plantarFlexion", "Plantar flexion measured at {} degrees"),
    ])
    .gaps(vec![rom_gap()])
}

fn foot_injury() -> ConditionCriteria {
    ConditionCriteria::new("5284", "Foot Injuries, Other", CFR, BodySystem::Musculoskeletal, Aggregator::Symptoms)
        .symptoms(&["foot-pain", "foot-swelling"])
        .table(RatingTable::new(
            "Foot Injury",
            Floor::ZeroPercent,
            vec![
                RatingTier::new(pct(30), "Severe", count("severeDaysPerMonth", 8.0)),
                RatingTier::new(pct(20), "Moderately severe", count("symptomDaysPerMonth", 15.0)),
                RatingTier::new(pct(10), "Moderate", count("symptomDaysPerMonth", 4.0)),
                RatingTier::floor(pct(0), "Mild"),
            ],
        ))
        .evidence(vec![
            evidence("symptomDaysPerMonth", "{} days per month with foot symptoms"),
            evidence("severeDays", "{} days with severe foot pain"),
        ])
}

fn flatfoot() -> ConditionCriteria {
    ConditionCriteria::new("5276", "Flatfoot, Acquired", CFR, BodySystem::Musculoskeletal, Aggregator::Symptoms)
        .symptoms(&["foot-pain", "arch-pain", "foot-swelling"])
        .table(RatingTable::new(
            "Flatfoot",
            Floor::ZeroPercent,
            vec![
                RatingTier::new(
                    pct(50),
                    "Pronounced, bilateral",
                    all_of(vec![count("bilateralDays", 1.0), count("severeDaysPerMonth", 8.0)]),
                ),
                RatingTier::new(
                    pct(30),
                    "Severe, bilateral",
                    all_of(vec![count("bilateralDays", 1.0), count("symptomDaysPerMonth", 10.0)]),
                ),
                RatingTier::new(pct(20), "Severe, unilateral", count("symptomDaysPerMonth", 10.0)),
                RatingTier::new(pct(10), "Moderate", count("symptomDaysPerMonth", 2.0)),
                RatingTier::floor(pct(0), "Mild, symptoms relieved by arch support"),
            ],
        ))
        .evidence(vec![
            evidence("bilateralDays", "{} days with symptoms in both feet"),
            evidence("symptomDaysPerMonth", "{} days per month with foot symptoms"),
        ])
}

fn fibromyalgia() -> ConditionCriteria {
    ConditionCriteria::new("5025", "Fibromyalgia", CFR, BodySystem::Musculoskeletal, Aggregator::Symptoms)
        .symptoms(&["widespread-pain", "fatigue", "sleep-disturbance", "stiffness", "headache"])
        .table(RatingTable::new(
            "Fibromyalgia",
            Floor::LowestCompensable,
            vec![
                RatingTier::new(
                    pct(40),
                    "Constant or nearly so, refractory to therapy",
                    all_of(vec![count("symptomDaysPerMonth", 25.0), flag("treatmentRefractory")]),
                ),
                RatingTier::new(
                    pct(20),
                    "Episodic, present more than one-third of the time",
                    count("symptomDaysPerMonth", 10.0),
                ),
                RatingTier::floor(pct(10), "Symptoms requiring continuous medication for control"),
            ],
        ))
        .evidence(vec![
            evidence("symptomDaysPerMonth", "{} days per month with widespread pain"),
            evidence("treatmentRefractory", "Symptoms documented as not relieved by treatment"),
        ])
        .gaps(vec![next_tier_gap(
            pct(40),
            missing("treatmentRefractory"),
            "No record that treatment failed to help. Note when medication or therapy gives no relief",
        )])
}

fn hip_flexion() -> ConditionCriteria {
    ConditionCriteria::new("5252", "Thigh, Limitation of Flexion", CFR, BodySystem::Musculoskeletal, HIP_ROM)
        .symptoms(&["hip-pain", "hip-stiffness"])
        .measurements(&["hip-rom"])
        .table(RatingTable::new(
            "Hip Flexion",
            Floor::ZeroPercent,
            vec![
                RatingTier::new(pct(40), "Flexion limited to 10 degrees", at_most("flexion", 10.0)),
                RatingTier::new(pct(30), "Flexion limited to 20 degrees", at_most("flexion", 20.0)),
                RatingTier::new(pct(20), "Flexion limited to 30 degrees", at_most("flexion", 30.0)),
                RatingTier::new(
                    pct(10),
                    "Flexion limited to 45 degrees, or painful motion",
                    any_of(vec![at_most("flexion", 45.0), count("painfulMotionDays", 1.0)]),
                ),
                RatingTier::floor(pct(0), "Flexion better than 45 degrees"),
            ],
        ))
        .evidence(vec![evidence("flexion", "Hip flexion measured at {} degrees")])
        .gaps(vec![rom_gap()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::*;
    use crate::selector::select_rating;
    use crate::SymptomLog;

    fn bed_rest_outcome(days: i64, window_days: u32) -> RatingOutcome {
        let criteria = spine("5243", "Intervertebral Disc Syndrome").table(incapacitating_episodes_table());
        let logs: Vec<SymptomLog> = (0..days)
            .map(|d| SymptomLog::new("back-pain", days_ago(d)).with_meta("prescribedBedRest", true))
            .collect();
        let m = run(SPINE_ROM, criteria.symptom_ids, &logs, &[], None, window_days);
        let selection = select_rating(&m, &criteria);
        selection
            .tables
            .into_iter()
            .find(|t| t.table == "Incapacitating Episodes")
            .map(|t| t.outcome)
            .unwrap()
    }

    #[test]
    fn test_incapacitating_weeks_are_annualized() {
        assert_eq!(bed_rest_outcome(14, 365), pct(20));
        assert_eq!(bed_rest_outcome(14, 730), pct(10));
        assert_eq!(bed_rest_outcome(14, 90), pct(60));
        assert_eq!(bed_rest_outcome(3, 365), pct(0));
    }
}
