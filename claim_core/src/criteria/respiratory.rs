//! Respiratory system (38 CFR 4.97).

use super::*;

const CFR: &str = "38 CFR 4.97";

pub(super) fn criteria() -> Vec<ConditionCriteria> {
    vec![asthma(), copd(), sleep_apnea(), sinusitis(), respiratory_malignancy()]
}

/// FEV-1 or FEV-1/FVC bands shared by the obstructive diseases.
fn pft_band(min: f64, max: f64) -> Vec<Rule> {
    vec![
        range("fev1Percent", min, Some(max)),
        range("fev1FvcPercent", min, Some(max)),
    ]
}

fn asthma() -> ConditionCriteria {
    let mut hundred = pft_band(0.0, 40.0);
    hundred.extend([count("physicianVisitsPerMonth", 1.0), flag("respiratoryFailure")]);
    let mut sixty = pft_band(40.0, 56.0);
    sixty.push(count("steroidCourses", 3.0));
    let mut thirty = pft_band(56.0, 71.0);
    thirty.push(flag("dailyInhaler"));
    let mut ten = pft_band(71.0, 81.0);
    ten.push(count("inhalerDays", 1.0));

    ConditionCriteria::new(
        "6602",
        "Asthma, Bronchial",
        CFR,
        BodySystem::Respiratory,
        Aggregator::Respiratory,
    )
    .symptoms(&["wheezing", "shortness-of-breath", "asthma-attack", "cough", "chest-tightness"])
    .measurements(&["pulmonary-function"])
    .table(RatingTable::new(
        "Bronchial Asthma",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(
                pct(100),
                "FEV-1 or FEV-1/FVC below 40 percent, more than one attack per week with respiratory failure, or daily systemic steroids",
                any_of(hundred),
            ),
            RatingTier::new(
                pct(60),
                "FEV-1 or FEV-1/FVC of 40 to 55 percent, or at least three courses of systemic corticosteroids",
                any_of(sixty),
            ),
            RatingTier::new(
                pct(30),
                "FEV-1 or FEV-1/FVC of 56 to 70 percent, or daily inhalational bronchodilator therapy",
                any_of(thirty),
            ),
            RatingTier::new(
                pct(10),
                "FEV-1 or FEV-1/FVC of 71 to 80 percent, or intermittent inhalational bronchodilator therapy",
                any_of(ten),
            ),
            RatingTier::floor(pct(0), "Normal pulmonary function without bronchodilator use"),
        ],
    ))
    .evidence(vec![
        evidence("fev1Percent", "FEV-1 at {} percent of predicted"),
        evidence("fev1FvcPercent", "FEV-1/FVC at {} percent"),
        evidence("inhalerDays", "{} days of inhaler use"),
        evidence("steroidCourses", "{} courses of oral or systemic steroids"),
        evidence("physicianVisits", "{} physician visits for exacerbations"),
    ])
    .gaps(vec![blocking_gap(
        missing("pftOnFile"),
        "No pulmonary function test on file. Spirometry results anchor every tier of the asthma schedule",
    )])
}

fn copd() -> ConditionCriteria {
    let mut hundred = pft_band(0.0, 40.0);
    hundred.push(flag("respiratoryFailure"));

    ConditionCriteria::new(
        "6604",
        "Chronic Obstructive Pulmonary Disease",
        CFR,
        BodySystem::Respiratory,
        Aggregator::Respiratory,
    )
    .symptoms(&["shortness-of-breath", "cough", "wheezing", "sputum"])
    .measurements(&["pulmonary-function"])
    .prerequisite(
        flag("pftOnFile"),
        RatingOutcome::RequiresEvaluation,
        "COPD is rated on pulmonary function testing; no test is on file",
    )
    .table(RatingTable::new(
        "General Rating Formula for Restrictive and Obstructive Lung Disease",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(
                pct(100),
                "FEV-1 or FEV-1/FVC below 40 percent, or acute respiratory failure",
                any_of(hundred),
            ),
            RatingTier::new(pct(60), "FEV-1 or FEV-1/FVC of 40 to 55 percent", any_of(pft_band(40.0, 56.0))),
            RatingTier::new(pct(30), "FEV-1 or FEV-1/FVC of 56 to 70 percent", any_of(pft_band(56.0, 71.0))),
            RatingTier::new(pct(10), "FEV-1 or FEV-1/FVC of 71 to 80 percent", any_of(pft_band(71.0, 81.0))),
            RatingTier::floor(pct(0), "Pulmonary function above 80 percent of predicted"),
        ],
    ))
    .evidence(vec![
        evidence("fev1Percent", "FEV-1 at {} percent of predicted"),
        evidence("fev1FvcPercent", "FEV-1/FVC at {} percent"),
    ])
    .gaps(vec![blocking_gap(
        missing("pftOnFile"),
        "No pulmonary function test on file. Ask for spirometry with pre- and post-bronchodilator values",
    )])
}

fn sleep_apnea() -> ConditionCriteria {
    ConditionCriteria::new(
        "6847",
        "Sleep Apnea Syndromes",
        CFR,
        BodySystem::Respiratory,
        Aggregator::SleepApnea,
    )
    .symptoms(&["daytime-sleepiness", "snoring", "apnea-episode", "morning-headache"])
    .profile_aware()
    .prerequisite(
        flag("hasDiagnosis"),
        RatingOutcome::ClinicalDiagnosisRequired,
        "Sleep apnea must be confirmed by a sleep study before any rating applies",
    )
    .table(RatingTable::new(
        "Sleep Apnea",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(
                pct(100),
                "Chronic respiratory failure with carbon dioxide retention or cor pulmonale, or tracheostomy",
                flag("chronicRespiratoryFailure"),
            ),
            RatingTier::new(
                pct(50),
                "Requires use of a breathing assistance device such as CPAP",
                flag("usesBreathingDevice"),
            ),
            RatingTier::new(
                pct(30),
                "Persistent daytime hypersomnolence",
                count("daytimeHypersomnolenceDays", 1.0),
            ),
            RatingTier::floor(pct(0), "Asymptomatic but with documented sleep disorder breathing"),
        ],
    ))
    .evidence(vec![
        evidence("usesBreathingDevice", "Breathing assistance device in use"),
        evidence("deviceType", "Device type: {}"),
        evidence("daytimeHypersomnolenceDays", "{} days with daytime sleepiness logged"),
    ])
    .gaps(vec![next_tier_gap(
        pct(0),
        missing("hasDiagnosis"),
        "No confirmed sleep study diagnosis in your condition profile",
    )])
    .define(
        "CPAP",
        "Continuous positive airway pressure machine; use of any prescribed breathing device meets the 50 percent criteria",
    )
}

fn sinusitis() -> ConditionCriteria {
    ConditionCriteria::new(
        "6513",
        "Sinusitis, Maxillary, Chronic",
        CFR,
        BodySystem::Respiratory,
        Aggregator::Episodes,
    )
    .symptoms(&["sinus-pain", "sinus-headache", "nasal-discharge", "sinus-congestion"])
    .table(RatingTable::new(
        "General Rating Formula for Sinusitis",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(
                pct(50),
                "Near constant sinusitis with headaches, pain and tenderness",
                count("symptomDaysPerMonth", 25.0),
            ),
            RatingTier::new(
                pct(30),
                "Three or more incapacitating episodes, or more than six non-incapacitating episodes",
                any_of(vec![
                    episodes("incapacitatingEpisodes", 3),
                    episodes("nonIncapacitatingEpisodes", 7),
                ]),
            ),
            RatingTier::new(
                pct(10),
                "One or two incapacitating episodes, or three to six non-incapacitating episodes",
                any_of(vec![
                    episodes("incapacitatingEpisodes", 1),
                    episodes("nonIncapacitatingEpisodes", 3),
                ]),
            ),
            RatingTier::floor(pct(0), "Detected by X-ray only"),
        ],
    ))
    .evidence(vec![
        evidence("incapacitatingEpisodes", "{} incapacitating episodes requiring antibiotics or bed rest"),
        evidence("nonIncapacitatingEpisodes", "{} non-incapacitating episodes"),
    ])
    .define(
        "Incapacitating episode",
        "An episode requiring bed rest and treatment by a physician, typically with prolonged antibiotic treatment",
    )
}

fn respiratory_malignancy() -> ConditionCriteria {
    ConditionCriteria::new(
        "6819",
        "Malignant Neoplasms of the Respiratory System",
        CFR,
        BodySystem::Respiratory,
        Aggregator::Malignancy,
    )
    .symptoms(&["cough", "shortness-of-breath", "chemotherapy", "radiation"])
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
