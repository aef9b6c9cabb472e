//! Ear (38 CFR 4.85, 4.87).

use super::*;

pub(super) fn criteria() -> Vec<ConditionCriteria> {
    vec![hearing_loss(), tinnitus(), vestibular(), menieres()]
}

/// Worst-ear puretone average bands, most severe first.
const PTA_BANDS: &[(f64, u8, &str)] = &[
    (105.0, 100, "Puretone threshold average of 105 dB or more"),
    (98.0, 80, "Puretone threshold average of 98 dB or more"),
    (91.0, 60, "Puretone threshold average of 91 dB or more"),
    (84.0, 50, "Puretone threshold average of 84 dB or more"),
    (77.0, 40, "Puretone threshold average of 77 dB or more"),
    (70.0, 30, "Puretone threshold average of 70 dB or more"),
    (63.0, 20, "Puretone threshold average of 63 dB or more"),
    (56.0, 10, "Puretone threshold average of 56 dB or more"),
];

fn hearing_loss() -> ConditionCriteria {
    let mut tiers: Vec<RatingTier> = PTA_BANDS
        .iter()
        .map(|&(db, percent, summary)| RatingTier::new(pct(percent), summary, count("puretoneAverage", db)))
        .collect();
    tiers.push(RatingTier::floor(pct(0), "Hearing within the noncompensable range"));

    ConditionCriteria::new(
        "6100",
        "Hearing Loss",
        "38 CFR 4.85",
        BodySystem::Ear,
        Aggregator::Hearing,
    )
    .symptoms(&["hearing-loss", "difficulty-hearing"])
    .measurements(&["audiogram"])
    .prerequisite(
        flag("audiometryOnFile"),
        RatingOutcome::RequiresEvaluation,
        "Hearing loss is rated only on a controlled audiometry exam; no audiogram is on file",
    )
    .table(RatingTable::new("Hearing Impairment", Floor::ZeroPercent, tiers))
    .evidence(vec![
        evidence("puretoneAverage", "Worst-ear puretone threshold average {} dB"),
        evidence("speechDiscrimination", "Worst-ear speech discrimination {} percent"),
        evidence("symptomDays", "{} days with hearing difficulty logged"),
    ])
    .gaps(vec![blocking_gap(
        missing("audiometryOnFile"),
        "No audiogram on file. A Maryland CNC speech test with puretone audiometry is required",
    )])
    .define(
        "Puretone threshold average",
        "Average hearing threshold at 1000, 2000, 3000 and 4000 Hz",
    )
}

fn tinnitus() -> ConditionCriteria {
    ConditionCriteria::new(
        "6260",
        "Tinnitus, Recurrent",
        "38 CFR 4.87",
        BodySystem::Ear,
        Aggregator::Symptoms,
    )
    .symptoms(&["tinnitus", "ringing-ears"])
    .table(RatingTable::new(
        "Tinnitus",
        Floor::LowestCompensable,
        vec![RatingTier::new(
            pct(10),
            "Recurrent tinnitus; a single evaluation whether perceived in one ear or both",
            count("symptomDays", 1.0),
        )],
    ))
    .evidence(vec![
        evidence("symptomDays", "{} days with tinnitus logged"),
        evidence("bilateralDays", "{} days noted in both ears"),
    ])
}

fn vestibular() -> ConditionCriteria {
    ConditionCriteria::new(
        "6204",
        "Peripheral Vestibular Disorders",
        "38 CFR 4.87",
        BodySystem::Ear,
        Aggregator::Symptoms,
    )
    .symptoms(&["vertigo", "dizziness", "staggering"])
    .table(RatingTable::new(
        "Peripheral Vestibular Disorders",
        Floor::ZeroPercent,
        vec![
            RatingTier::new(pct(30), "Dizziness and occasional staggering", count("days.staggering", 1.0)),
            RatingTier::new(
                pct(10),
                "Occasional dizziness",
                any_of(vec![count("days.vertigo", 1.0), count("days.dizziness", 1.0)]),
            ),
            RatingTier::floor(pct(0), "No dizziness recorded"),
        ],
    ))
    .evidence(vec![
        evidence("days.vertigo", "{} days with vertigo"),
        evidence("days.dizziness", "{} days with dizziness"),
        evidence("days.staggering", "{} days with staggering"),
    ])
    .gaps(vec![next_tier_gap(
        pct(30),
        missing("days.staggering"),
        "No staggering or loss of balance recorded alongside dizziness",
    )])
}

fn menieres() -> ConditionCriteria {
    ConditionCriteria::new(
        "6205",
        "Meniere's Syndrome",
        "38 CFR 4.87",
        BodySystem::Ear,
        Aggregator::Symptoms,
    )
    .symptoms(&["vertigo", "hearing-loss", "tinnitus", "staggering", "ear-fullness"])
    .table(RatingTable::new(
        "Meniere's Syndrome",
        Floor::LowestCompensable,
        vec![
            RatingTier::new(
                pct(100),
                "Hearing impairment with attacks of vertigo and cerebellar gait occurring more than once weekly",
                all_of(vec![
                    count("symptomEpisodesPerMonth", 4.0),
                    count("days.staggering", 1.0),
                ]),
            ),
            RatingTier::new(
                pct(60),
                "Hearing impairment with attacks of vertigo and cerebellar gait occurring one to four times a month",
                all_of(vec![
                    count("symptomEpisodesPerMonth", 1.0),
                    count("days.staggering", 1.0),
                ]),
            ),
            RatingTier::new(
                pct(30),
                "Hearing impairment with vertigo less than once a month",
                count("symptomDays", 1.0),
            ),
        ],
    ))
    .evidence(vec![
        evidence("symptomEpisodes", "{} attacks logged"),
        evidence("days.vertigo", "{} days with vertigo"),
        evidence("days.staggering", "{} days with staggering gait"),
    ])
    .define(
        "Cerebellar gait",
        "Staggering or unsteady walking during an attack",
    )
}
