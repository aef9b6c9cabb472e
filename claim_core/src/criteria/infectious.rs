//! Infectious diseases and immune disorders (38 CFR 4.88b).

use super::*;

const CFR: &str = "38 CFR 4.88b";

pub(super) fn criteria() -> Vec<ConditionCriteria> {
    vec![hiv(), chronic_fatigue()]
}

fn hiv() -> ConditionCriteria {
    ConditionCriteria::new(
        "6351",
        "HIV-Related Illness",
        CFR,
        BodySystem::Infectious,
        Aggregator::Hiv,
    )
    .symptoms(&["fever", "night-sweats", "fatigue", "diarrhea", "oral-thrush", "weight-loss"])
    .measurements(&["cd4"])
    .table(RatingTable::new(
        "HIV-Related Illness",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(
                pct(100),
                "AIDS with recurrent opportunistic infections",
                count("opportunisticInfections", 2.0),
            ),
            RatingTier::new(
                pct(60),
                "Refractory constitutional symptoms with pathological weight loss, or a first opportunistic infection",
                any_of(vec![
                    count("opportunisticInfections", 1.0),
                    all_of(vec![count("constitutionalDaysPerMonth", 15.0), flag("weightLoss")]),
                ]),
            ),
            RatingTier::new(
                pct(30),
                "Recurrent constitutional symptoms, intermittent diarrhea and approved medication, or T4 count below 200, or hairy cell leukoplakia or oral candidiasis",
                any_of(vec![
                    range("cd4Count", 0.0, Some(200.0)),
                    flag("oralCandidiasis"),
                    all_of(vec![count("constitutionalDaysPerMonth", 4.0), flag("onAntiretrovirals")]),
                ]),
            ),
            RatingTier::new(
                pct(10),
                "Following development of definite medical symptoms, T4 count of 200 or more and below 500, and on approved medication",
                any_of(vec![
                    all_of(vec![range("cd4Count", 200.0, Some(500.0)), flag("onAntiretrovirals")]),
                    count("constitutionalDays", 1.0),
                ]),
            ),
            RatingTier::floor(pct(0), "Asymptomatic, following initial diagnosis"),
        ],
    ))
    .evidence(vec![
        evidence("cd4Count", "Most recent CD4 count {}"),
        evidence("onAntiretrovirals", "Antiretroviral therapy documented"),
        evidence("opportunisticInfections", "{} opportunistic infections documented"),
        evidence("constitutionalDays", "{} days with constitutional symptoms"),
        evidence("weightLoss", "Weight loss documented"),
    ])
    .gaps(vec![blocking_gap(
        missing("cd4Count"),
        "No CD4 count on file. The lower tiers are defined by T4 cell counts",
    )])
    .define("T4 cell count", "The CD4 lymphocyte count, in cells per cubic millimeter")
}

fn chronic_fatigue() -> ConditionCriteria {
    ConditionCriteria::new(
        "6354",
        "Chronic Fatigue Syndrome",
        CFR,
        BodySystem::Infectious,
        Aggregator::Episodes,
    )
    .symptoms(&["fatigue", "post-exertional-malaise", "cognitive-impairment", "unrefreshing-sleep", "muscle-pain"])
    .table(RatingTable::new(
        "Chronic Fatigue Syndrome",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(
                pct(100),
                "Debilitating fatigue restricting routine daily activities to less than 10 percent of the pre-illness level",
                at_most("activityLevel", 10.0),
            ),
            RatingTier::new(
                pct(60),
                "Daily activities restricted to 50 percent of the pre-illness level, or incapacitation totaling at least six weeks a year",
                any_of(vec![at_most("activityLevel", 50.0), count("incapacitatingWeeksPerYear", 6.0)]),
            ),
            RatingTier::new(
                pct(40),
                "Daily activities restricted to 50 to 75 percent of the pre-illness level, or incapacitation totaling four to six weeks",
                any_of(vec![at_most("activityLevel", 75.0), count("incapacitatingWeeksPerYear", 4.0)]),
            ),
            RatingTier::new(
                pct(20),
                "Nearly constant symptoms restricting daily activities by less than 25 percent, or incapacitation totaling two to four weeks",
                any_of(vec![at_most("activityLevel", 90.0), count("incapacitatingWeeksPerYear", 2.0)]),
            ),
            RatingTier::new(
                pct(10),
                "Waxing and waning symptoms, or symptoms controlled by continuous medication",
                any_of(vec![count("incapacitatingWeeksPerYear", 1.0), count("medicationDays", 1.0)]),
            ),
            RatingTier::floor(pct(0), "Symptoms do not restrict daily activities"),
        ],
    ))
    .evidence(vec![
        evidence("activityLevel", "Average activity level {} percent of pre-illness"),
        evidence("incapacitatingDays", "{} days of physician-prescribed bed rest"),
        evidence("medicationDays", "{} days with medication for fatigue"),
    ])
    .gaps(vec![next_tier_gap(
        pct(20),
        missing("activityLevel"),
        "No activity level recorded. Log daily activity as a percent of your pre-illness level",
    )])
    .define(
        "Incapacitation",
        "Bed rest and treatment prescribed by a physician",
    )
}
