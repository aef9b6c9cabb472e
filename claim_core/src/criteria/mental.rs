//! Mental disorders (38 CFR 4.130). Every code shares the General Rating
//! Formula; only the tracked symptoms differ.

use super::*;

const CFR: &str = "38 CFR 4.130";

pub(super) fn criteria() -> Vec<ConditionCriteria> {
    vec![
        general_formula(
            "9411",
            "Post-Traumatic Stress Disorder",
            &["nightmares", "flashbacks", "hypervigilance", "anxiety", "irritability", "insomnia", "panic-attack", "avoidance"],
        ),
        general_formula(
            "9434",
            "Major Depressive Disorder",
            &["depressed-mood", "anhedonia", "fatigue", "insomnia", "hopelessness", "suicidal-ideation"],
        ),
        general_formula(
            "9400",
            "Generalized Anxiety Disorder",
            &["anxiety", "worry", "restlessness", "irritability", "insomnia", "panic-attack"],
        ),
        general_formula(
            "9432",
            "Bipolar Disorder",
            &["manic-episode", "depressed-mood", "irritability", "racing-thoughts", "insomnia"],
        ),
        general_formula(
            "9201",
            "Schizophrenia",
            &["hallucinations", "delusions", "disorganized-thinking", "social-withdrawal"],
        ),
        general_formula(
            "9413",
            "Anxiety Disorder, Unspecified",
            &["anxiety", "worry", "panic-attack", "insomnia"],
        ),
        general_formula(
            "9440",
            "Chronic Adjustment Disorder",
            &["depressed-mood", "anxiety", "irritability", "social-withdrawal"],
        ),
        general_formula(
            "9404",
            "Obsessive Compulsive Disorder",
            &["obsessive-thoughts", "compulsions", "anxiety"],
        ),
    ]
}

fn general_formula(
    code: &'static str,
    name: &'static str,
    symptoms: &'static [&'static str],
) -> ConditionCriteria {
    ConditionCriteria::new(code, name, CFR, BodySystem::MentalHealth, Aggregator::MentalHealth)
        .symptoms(symptoms)
        .table(RatingTable::new(
            "General Rating Formula for Mental Disorders",
            Floor::ZeroPercent,
            vec![
                RatingTier::new(
                    pct(100),
                    "Total occupational and social impairment",
                    all_of(vec![
                        count("severeDaysPerMonth", 20.0),
                        any_of(vec![
                            flag("psychoticSymptoms"),
                            flag("selfCareNeglect"),
                            count("memoryLossDays", 4.0),
                        ]),
                    ]),
                )
                .described(&[
                    "Gross impairment in thought processes or communication",
                    "Persistent delusions or hallucinations",
                    "Intermittent inability to perform activities of daily living",
                ]),
                RatingTier::new(
                    pct(70),
                    "Occupational and social impairment with deficiencies in most areas",
                    any_of(vec![
                        flag("suicidalIdeation"),
                        all_of(vec![
                            count("occupationalImpactDays", 8.0),
                            count("socialImpactDays", 8.0),
                        ]),
                        count("severeDaysPerMonth", 15.0),
                    ]),
                )
                .described(&[
                    "Suicidal ideation",
                    "Near-continuous panic or depression affecting independent function",
                    "Inability to establish and maintain effective relationships",
                ]),
                RatingTier::new(
                    pct(50),
                    "Occupational and social impairment with reduced reliability and productivity",
                    any_of(vec![
                        exceeds("panicAttacksPerWeek", 1.0),
                        count("occupationalImpactDays", 4.0),
                        count("severeDaysPerMonth", 8.0),
                    ]),
                )
                .described(&[
                    "Panic attacks more than once a week",
                    "Difficulty in establishing and maintaining work and social relationships",
                ]),
                RatingTier::new(
                    pct(30),
                    "Occasional decrease in work efficiency and intermittent inability to perform tasks",
                    any_of(vec![
                        count("panicAttacksPerWeek", 0.25),
                        count("symptomDaysPerMonth", 8.0),
                        count("occupationalImpactDays", 1.0),
                    ]),
                )
                .described(&[
                    "Depressed mood, anxiety, suspiciousness",
                    "Panic attacks weekly or less often",
                    "Chronic sleep impairment",
                ]),
                RatingTier::new(
                    pct(10),
                    "Mild or transient symptoms, or symptoms controlled by continuous medication",
                    any_of(vec![
                        count("symptomDaysPerMonth", 2.0),
                        count("medicationDays", 1.0),
                    ]),
                ),
                RatingTier::floor(
                    pct(0),
                    "Diagnosed, but symptoms not severe enough to interfere with functioning",
                ),
            ],
        ))
        .evidence(vec![
            evidence("symptomDays", "{} days with symptoms logged"),
            evidence("severeDays", "{} days with severe symptoms"),
            evidence("panicAttacksPerWeek", "{} panic attacks per week on average"),
            evidence("occupationalImpactDays", "{} days with work impact"),
            evidence("socialImpactDays", "{} days with social impact"),
            evidence("suicidalIdeation", "Suicidal ideation documented"),
        ])
        .gaps(vec![
            next_tier_gap(
                pct(50),
                all_of(vec![
                    missing("occupationalImpactDays"),
                    count("symptomDays", 1.0),
                ]),
                "No work impact recorded. Note missed days, conflicts or reduced productivity on the days they occur",
            ),
            next_tier_gap(
                pct(70),
                missing("socialImpactDays"),
                "No social impact recorded. Note withdrawal, strained relationships or avoided activities",
            ),
        ])
        .define(
            "Occupational and social impairment",
            "How symptoms affect your ability to work and maintain relationships, judged by frequency, severity and duration",
        )
}
