//! Hearing loss aggregator.

use super::*;

const AUDIOGRAM: &str = "audiogram";

/// Worst ear, worst test: highest puretone threshold average and lowest
/// speech discrimination score.
pub(super) fn hearing(input: &AggregationInput<'_>) -> Metrics {
    let mut m = base_metrics(input.logs, input);
    let measurements = input.measurements;

    let puretone = ["puretoneAverageLeft", "puretoneAverageRight", "puretoneAverage"]
        .iter()
        .flat_map(|key| measurement_values(measurements, AUDIOGRAM, key))
        .reduce(f64::max);
    let speech = ["speechDiscriminationLeft", "speechDiscriminationRight", "speechDiscrimination"]
        .iter()
        .flat_map(|key| measurement_values(measurements, AUDIOGRAM, key))
        .reduce(f64::min);

    m.set_flag("audiometryOnFile", has_measurement(measurements, AUDIOGRAM));
    m.set_number("puretoneAverage", puretone);
    m.set_number("speechDiscrimination", speech);
    m
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_worst_ear_governs() {
        let readings = vec![Measurement::new(AUDIOGRAM, days_ago(10))
            .with_value("puretoneAverageLeft", 45.0)
            .with_value("puretoneAverageRight", 72.0)
            .with_value("speechDiscriminationLeft", 88.0)
            .with_value("speechDiscriminationRight", 76.0)];
        let m = run(Aggregator::Hearing, &["hearing-loss"], &[], &readings, None, 90);
        assert!(m.flag("audiometryOnFile"));
        assert_eq!(m.number("puretoneAverage"), Some(72.0));
        assert_eq!(m.number("speechDiscrimination"), Some(76.0));
    }

    #[test]
    fn test_no_audiogram() {
        let logs = vec![SymptomLog::new("hearing-loss", days_ago(1))];
        let m = run(Aggregator::Hearing, &["hearing-loss"], &logs, &[], None, 90);
        assert!(!m.flag("audiometryOnFile"));
        assert_eq!(m.get("puretoneAverage"), Some(&MetricValue::Absent));
    }
}
