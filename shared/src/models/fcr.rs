//! Feed conversion ratio analytics
//!
//! Pure, read-only computation over a batch's consumption history and weight
//! samples. Metrics that depend on weight gain are `Option`al: `None` means
//! "insufficient data" and is a valid report state, distinct from zero.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::WeightSample;

/// Benchmark thresholds for FCR classification, ascending.
///
/// The table is configuration, not baked-in business logic, so different
/// livestock types can carry different targets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FcrBenchmarks {
    pub excellent: Decimal,
    pub good: Decimal,
    pub average: Decimal,
    pub poor: Decimal,
}

impl FcrBenchmarks {
    /// Typical broiler targets
    pub fn broiler() -> Self {
        Self {
            excellent: Decimal::new(16, 1),
            good: Decimal::new(18, 1),
            average: Decimal::new(20, 1),
            poor: Decimal::new(23, 1),
        }
    }

    /// Thresholds must be strictly ascending to partition the scale
    pub fn is_ordered(&self) -> bool {
        self.excellent < self.good && self.good < self.average && self.average < self.poor
    }
}

/// Ordinal performance tiers, best first
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    Excellent,
    Good,
    Average,
    BelowAverage,
    Poor,
}

impl std::fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PerformanceTier::Excellent => write!(f, "Excellent"),
            PerformanceTier::Good => write!(f, "Good"),
            PerformanceTier::Average => write!(f, "Average"),
            PerformanceTier::BelowAverage => write!(f, "Below Average"),
            PerformanceTier::Poor => write!(f, "Poor"),
        }
    }
}

/// Classify an FCR value against a benchmark table (lower FCR is better)
pub fn classify_fcr(fcr: Decimal, benchmarks: &FcrBenchmarks) -> PerformanceTier {
    if fcr <= benchmarks.excellent {
        PerformanceTier::Excellent
    } else if fcr <= benchmarks.good {
        PerformanceTier::Good
    } else if fcr <= benchmarks.average {
        PerformanceTier::Average
    } else if fcr <= benchmarks.poor {
        PerformanceTier::BelowAverage
    } else {
        PerformanceTier::Poor
    }
}

/// Batch facts needed to derive the report
#[derive(Debug, Clone)]
pub struct BatchProfile {
    pub batch_id: Uuid,
    pub arrival_date: NaiveDate,
    pub current_bird_count: i32,
    pub arrival_avg_weight_kg: Option<Decimal>,
}

/// One consumption event's contribution to the analytics input
#[derive(Debug, Clone)]
pub struct FeedIntake {
    pub event_date: NaiveDate,
    pub quantity_kg: Decimal,
    pub unit_cost: Option<Decimal>,
}

/// One charting point: cumulative FCR at a weight sample
#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub age_days: i64,
    pub avg_weight_kg: Decimal,
    pub fcr_to_date: Option<Decimal>,
}

/// Point-in-time efficiency report for a batch. Derived, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct FcrReport {
    pub batch_id: Uuid,
    pub as_of: NaiveDate,
    pub age_days: i64,
    pub bird_count: i32,
    pub total_feed_kg: Decimal,
    pub total_feed_cost: Decimal,
    pub initial_weight_kg: Option<Decimal>,
    pub current_weight_kg: Option<Decimal>,
    pub weight_gain_per_bird_kg: Option<Decimal>,
    pub total_weight_gain_kg: Option<Decimal>,
    pub fcr: Option<Decimal>,
    pub cost_per_kg_gain: Option<Decimal>,
    pub daily_gain_kg: Option<Decimal>,
    pub tier: Option<PerformanceTier>,
    pub trend: Vec<TrendPoint>,
}

/// Compute the FCR report for a batch as of a given date.
///
/// Intakes and samples dated after `as_of` are ignored, so the same inputs
/// can serve several report dates. Weight selection: with two or more
/// samples the earliest is the initial weight; with one sample the batch's
/// arrival weight stands in for day zero; otherwise gain-dependent metrics
/// stay undefined.
pub fn compute_fcr_report(
    profile: &BatchProfile,
    intakes: &[FeedIntake],
    samples: &[WeightSample],
    benchmarks: &FcrBenchmarks,
    as_of: NaiveDate,
) -> FcrReport {
    let mut samples: Vec<&WeightSample> =
        samples.iter().filter(|s| s.sample_date <= as_of).collect();
    samples.sort_by_key(|s| s.sample_date);

    let intakes: Vec<&FeedIntake> =
        intakes.iter().filter(|i| i.event_date <= as_of).collect();

    let total_feed_kg: Decimal = intakes.iter().map(|i| i.quantity_kg).sum();
    let total_feed_cost: Decimal = intakes
        .iter()
        .filter_map(|i| i.unit_cost.map(|c| c * i.quantity_kg))
        .sum();

    let current_weight_kg = samples.last().map(|s| s.avg_weight_kg);
    let initial_weight_kg = match samples.len() {
        0 => None,
        1 => profile.arrival_avg_weight_kg,
        _ => samples.first().map(|s| s.avg_weight_kg),
    };

    let weight_gain_per_bird_kg = match (initial_weight_kg, current_weight_kg) {
        (Some(initial), Some(current)) => Some(current - initial),
        _ => None,
    };

    let bird_count = Decimal::from(profile.current_bird_count);
    let total_weight_gain_kg = weight_gain_per_bird_kg.map(|g| g * bird_count);

    // Division guards: gain <= 0 yields the insufficient-data sentinel,
    // never a division error or a negative ratio
    let fcr = total_weight_gain_kg
        .filter(|g| *g > Decimal::ZERO)
        .map(|g| total_feed_kg / g);
    let cost_per_kg_gain = total_weight_gain_kg
        .filter(|g| *g > Decimal::ZERO)
        .map(|g| total_feed_cost / g);

    let age_days = (as_of - profile.arrival_date).num_days();
    let daily_gain_kg = weight_gain_per_bird_kg
        .filter(|_| age_days > 0)
        .map(|g| g / Decimal::from(age_days));

    let tier = fcr.map(|v| classify_fcr(v, benchmarks));

    let trend = build_trend(profile, &intakes, &samples);

    FcrReport {
        batch_id: profile.batch_id,
        as_of,
        age_days,
        bird_count: profile.current_bird_count,
        total_feed_kg,
        total_feed_cost,
        initial_weight_kg,
        current_weight_kg,
        weight_gain_per_bird_kg,
        total_weight_gain_kg,
        fcr,
        cost_per_kg_gain,
        daily_gain_kg,
        tier,
        trend,
    }
}

/// One point per sample in chronological order, each with the cumulative FCR
/// over consumption dated at or before that sample. Ages are strictly
/// increasing; a second sample on the same day supersedes the first. Fewer
/// than two samples produce an empty series.
fn build_trend(
    profile: &BatchProfile,
    intakes: &[&FeedIntake],
    samples: &[&WeightSample],
) -> Vec<TrendPoint> {
    if samples.len() < 2 {
        return Vec::new();
    }

    let initial_weight = samples[0].avg_weight_kg;
    let bird_count = Decimal::from(profile.current_bird_count);
    let mut points: Vec<TrendPoint> = Vec::with_capacity(samples.len());

    for sample in samples {
        let age_days = (sample.sample_date - profile.arrival_date).num_days();

        let feed_to_date: Decimal = intakes
            .iter()
            .filter(|i| i.event_date <= sample.sample_date)
            .map(|i| i.quantity_kg)
            .sum();

        let gain_to_date = (sample.avg_weight_kg - initial_weight) * bird_count;
        let fcr_to_date = if gain_to_date > Decimal::ZERO {
            Some(feed_to_date / gain_to_date)
        } else {
            None
        };

        let point = TrendPoint {
            age_days,
            avg_weight_kg: sample.avg_weight_kg,
            fcr_to_date,
        };
        match points.last() {
            Some(last) if last.age_days >= age_days => {
                *points.last_mut().unwrap() = point;
            }
            _ => points.push(point),
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn profile(birds: i32) -> BatchProfile {
        BatchProfile {
            batch_id: Uuid::new_v4(),
            arrival_date: day(1),
            current_bird_count: birds,
            arrival_avg_weight_kg: None,
        }
    }

    fn sample(d: u32, avg: &str) -> WeightSample {
        WeightSample {
            id: Uuid::new_v4(),
            batch_id: Uuid::new_v4(),
            sample_date: day(d),
            sample_size: 20,
            avg_weight_kg: dec(avg),
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn intake(d: u32, qty: &str, cost: Option<&str>) -> FeedIntake {
        FeedIntake {
            event_date: day(d),
            quantity_kg: dec(qty),
            unit_cost: cost.map(dec),
        }
    }

    #[test]
    fn test_classify_fcr_boundaries() {
        let b = FcrBenchmarks::broiler();
        assert_eq!(classify_fcr(dec("1.6"), &b), PerformanceTier::Excellent);
        assert_eq!(classify_fcr(dec("1.61"), &b), PerformanceTier::Good);
        assert_eq!(classify_fcr(dec("1.8"), &b), PerformanceTier::Good);
        assert_eq!(classify_fcr(dec("2.0"), &b), PerformanceTier::Average);
        assert_eq!(classify_fcr(dec("2.3"), &b), PerformanceTier::BelowAverage);
        assert_eq!(classify_fcr(dec("2.31"), &b), PerformanceTier::Poor);
    }

    #[test]
    fn test_report_aggregates() {
        let p = profile(1000);
        let intakes = vec![
            intake(5, "2000", Some("0.5")),
            intake(15, "4000", Some("0.5")),
        ];
        let samples = vec![sample(2, "0.2"), sample(28, "3.8")];

        let report = compute_fcr_report(&p, &intakes, &samples, &FcrBenchmarks::broiler(), day(28));

        assert_eq!(report.total_feed_kg, dec("6000"));
        assert_eq!(report.total_feed_cost, dec("3000"));
        assert_eq!(report.weight_gain_per_bird_kg, Some(dec("3.6")));
        assert_eq!(report.total_weight_gain_kg, Some(dec("3600")));
        // 6000 / 3600 = 1.666..., inside the Good band
        let fcr = report.fcr.unwrap();
        assert!(fcr > dec("1.66") && fcr < dec("1.67"));
        assert_eq!(report.tier, Some(PerformanceTier::Good));
    }

    #[test]
    fn test_as_of_cuts_history() {
        let p = profile(100);
        let intakes = vec![intake(5, "100", None), intake(20, "500", None)];
        let samples = vec![sample(2, "0.2"), sample(10, "1.0"), sample(28, "2.5")];

        let report = compute_fcr_report(&p, &intakes, &samples, &FcrBenchmarks::broiler(), day(10));
        assert_eq!(report.total_feed_kg, dec("100"));
        assert_eq!(report.current_weight_kg, Some(dec("1.0")));
        assert_eq!(report.trend.len(), 2);
    }

    #[test]
    fn test_zero_gain_yields_sentinel_not_error() {
        let p = profile(100);
        let intakes = vec![intake(5, "100", Some("0.5"))];
        let samples = vec![sample(2, "1.0"), sample(20, "1.0")];

        let report = compute_fcr_report(&p, &intakes, &samples, &FcrBenchmarks::broiler(), day(20));
        assert_eq!(report.total_weight_gain_kg, Some(dec("0")));
        assert_eq!(report.fcr, None);
        assert_eq!(report.cost_per_kg_gain, None);
        assert_eq!(report.tier, None);
    }

    #[test]
    fn test_single_sample_uses_arrival_weight() {
        let mut p = profile(100);
        p.arrival_avg_weight_kg = Some(dec("0.04"));
        let samples = vec![sample(20, "1.04")];

        let report = compute_fcr_report(
            &p,
            &[intake(5, "150", None)],
            &samples,
            &FcrBenchmarks::broiler(),
            day(20),
        );
        assert_eq!(report.weight_gain_per_bird_kg, Some(dec("1.00")));
        assert!(report.trend.is_empty());
    }

    #[test]
    fn test_single_sample_without_arrival_weight_is_undefined() {
        let p = profile(100);
        let samples = vec![sample(20, "1.0")];

        let report =
            compute_fcr_report(&p, &[], &samples, &FcrBenchmarks::broiler(), day(20));
        assert_eq!(report.weight_gain_per_bird_kg, None);
        assert_eq!(report.fcr, None);
        assert!(report.trend.is_empty());
    }

    #[test]
    fn test_trend_ages_strictly_increase() {
        let p = profile(100);
        let intakes = vec![intake(3, "50", None), intake(12, "200", None)];
        // two samples on day 10: the later entry supersedes the earlier
        let samples = vec![
            sample(5, "0.4"),
            sample(10, "0.9"),
            sample(10, "0.95"),
            sample(21, "2.0"),
        ];

        let report = compute_fcr_report(&p, &intakes, &samples, &FcrBenchmarks::broiler(), day(28));
        let ages: Vec<i64> = report.trend.iter().map(|t| t.age_days).collect();
        assert_eq!(ages, vec![4, 9, 20]);
        assert!(ages.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(report.trend[1].avg_weight_kg, dec("0.95"));
    }

    #[test]
    fn test_first_trend_point_has_no_fcr() {
        let p = profile(100);
        let samples = vec![sample(5, "0.4"), sample(21, "2.0")];
        let report = compute_fcr_report(
            &p,
            &[intake(3, "50", None)],
            &samples,
            &FcrBenchmarks::broiler(),
            day(28),
        );
        // zero gain at the first sample
        assert_eq!(report.trend[0].fcr_to_date, None);
        assert!(report.trend[1].fcr_to_date.is_some());
    }

    #[test]
    fn test_benchmark_ordering() {
        assert!(FcrBenchmarks::broiler().is_ordered());
        let bad = FcrBenchmarks {
            excellent: dec("2.0"),
            good: dec("1.8"),
            average: dec("2.0"),
            poor: dec("2.3"),
        };
        assert!(!bad.is_ordered());
    }
}
