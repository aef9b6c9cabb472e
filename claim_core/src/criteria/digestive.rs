//! Digestive system (38 CFR 4.114).

use super::*;

const CFR: &str = "38 CFR 4.114";

pub(super) fn criteria() -> Vec<ConditionCriteria> {
    vec![
        hiatal_hernia(),
        irritable_bowel(),
        ulcerative_colitis(),
        hemorrhoids(),
        liver("7354", "Hepatitis C"),
        liver("7345", "Chronic Liver Disease Without Cirrhosis"),
        digestive_malignancy(),
    ]
}

fn hiatal_hernia() -> ConditionCriteria {
    ConditionCriteria::new("7346", "Hiatal Hernia / GERD", CFR, BodySystem::Digestive, Aggregator::Symptoms)
        .symptoms(&["heartburn", "acid-reflux", "regurgitation", "dysphagia", "chest-pain", "nausea"])
        .table(RatingTable::new(
            "Hiatal Hernia",
            Floor::ZeroPercent,
            vec![
                RatingTier::new(
                    pct(60),
                    "Symptoms of pain, vomiting, material weight loss or anemia productive of severe impairment of health",
                    count("severeDaysPerMonth", 15.0),
                ),
                RatingTier::new(
                    pct(30),
                    "Persistently recurrent epigastric distress with dysphagia, pyrosis and regurgitation",
                    all_of(vec![
                        count("symptomDaysPerMonth", 15.0),
                        count("distinctSymptoms", 2.0),
                    ]),
                ),
                RatingTier::new(
                    pct(10),
                    "Two or more of the symptoms for the 30 percent evaluation of less severity",
                    count("distinctSymptoms", 2.0),
                ),
                RatingTier::floor(pct(0), "Fewer symptoms than required for a compensable rating"),
            ],
        ))
        .evidence(vec![
            evidence("symptomDaysPerMonth", "{} days per month with reflux symptoms"),
            evidence("distinctSymptoms", "{} distinct symptoms documented"),
        ])
}

fn irritable_bowel() -> ConditionCriteria {
    ConditionCriteria::new(
        "7319",
        "Irritable Colon Syndrome",
        CFR,
        BodySystem::Digestive,
        Aggregator::Symptoms,
    )
    .symptoms(&["abdominal-pain", "diarrhea", "constipation", "bloating", "abdominal-cramping"])
    .table(RatingTable::new(
        "Irritable Colon Syndrome",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(
                pct(30),
                "Severe; diarrhea or alternating diarrhea and constipation with more or less constant abdominal distress",
                count("symptomDaysPerMonth", 20.0),
            ),
            RatingTier::new(
                pct(10),
                "Moderate; frequent episodes of bowel disturbance with abdominal distress",
                count("symptomDaysPerMonth", 4.0),
            ),
            RatingTier::floor(pct(0), "Mild; disturbances of bowel function with occasional episodes of abdominal distress"),
        ],
    ))
    .evidence(vec![
        evidence("symptomDaysPerMonth", "{} days per month with bowel symptoms"),
        evidence("days.abdominal-pain", "{} days with abdominal pain"),
    ])
}

fn ulcerative_colitis() -> ConditionCriteria {
    ConditionCriteria::new(
        "7323",
        "Ulcerative Colitis",
        CFR,
        BodySystem::Digestive,
        Aggregator::Symptoms,
    )
    .symptoms(&["diarrhea", "rectal-bleeding", "abdominal-pain", "urgency"])
    .table(RatingTable::new(
        "Ulcerative Colitis",
        Floor::LowestCompensable,
        vec![
            RatingTier::new(
                pct(100),
                "Pronounced; resulting in marked malnutrition, anemia and general debility",
                count("severeDaysPerMonth", 20.0),
            ),
            RatingTier::new(
                pct(60),
                "Severe; numerous attacks a year and malnutrition",
                count("severeDaysPerMonth", 8.0),
            ),
            RatingTier::new(
                pct(30),
                "Moderately severe; frequent exacerbations",
                count("symptomEpisodesPerMonth", 2.0),
            ),
            RatingTier::floor(pct(10), "Moderate; infrequent exacerbations"),
        ],
    ))
    .evidence(vec![
        evidence("symptomEpisodes", "{} flare episodes logged"),
        evidence("severeDays", "{} days with severe symptoms"),
        evidence("days.rectal-bleeding", "{} days with rectal bleeding"),
    ])
}

fn hemorrhoids() -> ConditionCriteria {
    ConditionCriteria::new(
        "7336",
        "Hemorrhoids, External or Internal",
        CFR,
        BodySystem::Digestive,
        Aggregator::Symptoms,
    )
    .symptoms(&["rectal-bleeding", "rectal-pain", "hemorrhoid-flare"])
    .table(RatingTable::new(
        "Hemorrhoids",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(
                pct(20),
                "With persistent bleeding and secondary anemia, or with fissures",
                count("symptomDaysPerMonth", 15.0),
            ),
            RatingTier::new(
                pct(10),
                "Large or thrombotic, irreducible, with frequent recurrences",
                count("symptomEpisodes", 2.0),
            ),
            RatingTier::floor(pct(0), "Mild or moderate"),
        ],
    ))
    .evidence(vec![
        evidence("symptomEpisodes", "{} flare-ups logged"),
        evidence("days.rectal-bleeding", "{} days with bleeding"),
    ])
}

fn liver(code: &'static str, name: &'static str) -> ConditionCriteria {
    ConditionCriteria::new(code, name, CFR, BodySystem::Digestive, Aggregator::Hepatic)
        .symptoms(&["fatigue", "malaise", "nausea", "abdominal-pain", "anorexia", "joint-pain"])
        .measurements(&["liver-panel"])
        .table(RatingTable::new(
            "Chronic Liver Disease",
            Floor::ZeroPercent,
            vec![
                RatingTier::new(
                    pct(100),
                    "Near-constant debilitating symptoms",
                    all_of(vec![flag("dailyFatigue"), count("severeDaysPerMonth", 20.0)]),
                ),
                RatingTier::new(
                    pct(60),
                    "Daily fatigue and malaise with substantial weight loss, or incapacitating episodes totaling at least six weeks",
                    any_of(vec![
                        all_of(vec![flag("dailyFatigue"), flag("weightLoss")]),
                        count("incapacitatingWeeksPerYear", 6.0),
                    ]),
                ),
                RatingTier::new(
                    pct(40),
                    "Daily fatigue and malaise with minor weight loss and hepatomegaly, or incapacitating episodes totaling four to six weeks",
                    any_of(vec![
                        all_of(vec![flag("dailyFatigue"), flag("hepatomegaly")]),
                        count("incapacitatingWeeksPerYear", 4.0),
                    ]),
                ),
                RatingTier::new(
                    pct(20),
                    "Daily fatigue requiring dietary restriction or continuous medication, or incapacitating episodes totaling two to four weeks",
                    any_of(vec![
                        all_of(vec![
                            flag("dailyFatigue"),
                            any_of(vec![flag("dietaryRestriction"), flag("continuousMedication")]),
                        ]),
                        count("incapacitatingWeeksPerYear", 2.0),
                    ]),
                ),
                RatingTier::new(
                    pct(10),
                    "Intermittent fatigue, malaise and anorexia, or incapacitating episodes totaling one to two weeks",
                    any_of(vec![
                        count("fatigueDaysPerMonth", 1.0),
                        count("incapacitatingWeeksPerYear", 1.0),
                    ]),
                ),
                RatingTier::floor(pct(0), "Nonsymptomatic"),
            ],
        ))
        .evidence(vec![
            evidence("fatigueDaysPerMonth", "{} days per month with fatigue"),
            evidence("incapacitatingDays", "{} days of physician-prescribed bed rest"),
            evidence("abnormalLiverPanels", "{} liver panels with elevated enzymes"),
            evidence("hepatomegaly", "Enlarged liver documented"),
            evidence("weightLoss", "Weight loss documented"),
        ])
        .gaps(vec![blocking_gap(
            missing("liverPanelOnFile"),
            "No liver panel on file. Recent ALT and AST results corroborate disease activity",
        )])
        .define(
            "Incapacitating episode",
            "A period of acute signs and symptoms severe enough to require bed rest and treatment by a physician",
        )
}

fn digestive_malignancy() -> ConditionCriteria {
    ConditionCriteria::new(
        "7343",
        "Malignant Neoplasms of the Digestive System",
        CFR,
        BodySystem::Digestive,
        Aggregator::Malignancy,
    )
    .symptoms(&["abdominal-pain", "nausea", "chemotherapy", "radiation"])
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
}
