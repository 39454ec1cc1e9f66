//! Tests for feed conversion ratio analytics
//! Verifies benchmark classification, sentinel handling, and trend shape

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, Utc};
use shared::{
    classify_fcr, compute_fcr_report, BatchProfile, FcrBenchmarks, FeedIntake,
    PerformanceTier, WeightSample,
};
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn day(d: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() + Duration::days(d)
}

fn profile(birds: i32) -> BatchProfile {
    BatchProfile {
        batch_id: Uuid::new_v4(),
        arrival_date: day(0),
        current_bird_count: birds,
        arrival_avg_weight_kg: None,
    }
}

fn sample(d: i64, avg: &str) -> WeightSample {
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

fn intake(d: i64, qty: &str, cost: &str) -> FeedIntake {
    FeedIntake {
        event_date: day(d),
        quantity_kg: dec(qty),
        unit_cost: Some(dec(cost)),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// 6000kg feed over 3600kg gain is 1.667, inside the Good band
    #[test]
    fn test_full_report_good_tier() {
        let p = profile(1000);
        let intakes = vec![
            intake(4, "1500", "0.45"),
            intake(14, "2000", "0.45"),
            intake(24, "2500", "0.45"),
        ];
        let samples = vec![sample(1, "0.2"), sample(14, "1.6"), sample(27, "3.8")];

        let report =
            compute_fcr_report(&p, &intakes, &samples, &FcrBenchmarks::broiler(), day(27));

        assert_eq!(report.total_feed_kg, dec("6000"));
        assert_eq!(report.total_feed_cost, dec("2700"));
        assert_eq!(report.total_weight_gain_kg, Some(dec("3600")));
        let fcr = report.fcr.unwrap();
        assert!(fcr > dec("1.66") && fcr < dec("1.67"));
        assert_eq!(report.tier, Some(PerformanceTier::Good));
        assert_eq!(report.age_days, 27);
        assert_eq!(report.trend.len(), 3);
    }

    /// One sample and no arrival weight: feed totals are real, everything
    /// gain-derived reports as insufficient data
    #[test]
    fn test_single_sample_without_arrival_weight() {
        let p = profile(500);
        let intakes = vec![intake(3, "400", "0.5")];
        let samples = vec![sample(10, "0.9")];

        let report =
            compute_fcr_report(&p, &intakes, &samples, &FcrBenchmarks::broiler(), day(10));

        assert_eq!(report.total_feed_kg, dec("400"));
        assert_eq!(report.current_weight_kg, Some(dec("0.9")));
        assert_eq!(report.initial_weight_kg, None);
        assert_eq!(report.fcr, None);
        assert_eq!(report.cost_per_kg_gain, None);
        assert_eq!(report.tier, None);
        assert!(report.trend.is_empty());
    }

    /// With an arrival weight on file, a single sample is enough for FCR
    #[test]
    fn test_single_sample_with_arrival_weight() {
        let mut p = profile(500);
        p.arrival_avg_weight_kg = Some(dec("0.04"));
        let intakes = vec![intake(3, "400", "0.5")];
        let samples = vec![sample(10, "0.84")];

        let report =
            compute_fcr_report(&p, &intakes, &samples, &FcrBenchmarks::broiler(), day(10));

        assert_eq!(report.weight_gain_per_bird_kg, Some(dec("0.80")));
        assert_eq!(report.total_weight_gain_kg, Some(dec("400.00")));
        assert_eq!(report.fcr, Some(dec("1")));
        assert_eq!(report.tier, Some(PerformanceTier::Excellent));
        // the trend still needs two real samples
        assert!(report.trend.is_empty());
    }

    /// No samples at all: the report carries feed totals and nothing else
    #[test]
    fn test_no_samples() {
        let p = profile(500);
        let intakes = vec![intake(3, "400", "0.5")];

        let report = compute_fcr_report(&p, &intakes, &[], &FcrBenchmarks::broiler(), day(10));
        assert_eq!(report.total_feed_kg, dec("400"));
        assert_eq!(report.current_weight_kg, None);
        assert_eq!(report.fcr, None);
        assert!(report.trend.is_empty());
    }

    /// Weight loss yields the sentinel, never a negative ratio
    #[test]
    fn test_weight_loss_yields_sentinel() {
        let p = profile(200);
        let intakes = vec![intake(5, "300", "0.5")];
        let samples = vec![sample(2, "1.5"), sample(20, "1.2")];

        let report =
            compute_fcr_report(&p, &intakes, &samples, &FcrBenchmarks::broiler(), day(20));
        assert_eq!(report.weight_gain_per_bird_kg, Some(dec("-0.3")));
        assert_eq!(report.fcr, None);
        assert_eq!(report.tier, None);
    }

    /// Tier boundaries are inclusive on the low side of each band
    #[test]
    fn test_tier_boundaries() {
        let b = FcrBenchmarks::broiler();
        assert_eq!(classify_fcr(dec("0.9"), &b), PerformanceTier::Excellent);
        assert_eq!(classify_fcr(dec("1.6"), &b), PerformanceTier::Excellent);
        assert_eq!(classify_fcr(dec("1.8"), &b), PerformanceTier::Good);
        assert_eq!(classify_fcr(dec("2.0"), &b), PerformanceTier::Average);
        assert_eq!(classify_fcr(dec("2.3"), &b), PerformanceTier::BelowAverage);
        assert_eq!(classify_fcr(dec("2.5"), &b), PerformanceTier::Poor);
    }

    #[test]
    fn test_tier_display_strings() {
        assert_eq!(format!("{}", PerformanceTier::Excellent), "Excellent");
        assert_eq!(format!("{}", PerformanceTier::Good), "Good");
        assert_eq!(format!("{}", PerformanceTier::Average), "Average");
        assert_eq!(format!("{}", PerformanceTier::BelowAverage), "Below Average");
        assert_eq!(format!("{}", PerformanceTier::Poor), "Poor");
    }

    /// Intake and samples after the report date are invisible to it
    #[test]
    fn test_as_of_excludes_later_records() {
        let p = profile(100);
        let intakes = vec![intake(5, "100", "0.5"), intake(15, "300", "0.5")];
        let samples = vec![sample(2, "0.2"), sample(10, "1.0"), sample(20, "2.2")];

        let report =
            compute_fcr_report(&p, &intakes, &samples, &FcrBenchmarks::broiler(), day(10));
        assert_eq!(report.total_feed_kg, dec("100"));
        assert_eq!(report.current_weight_kg, Some(dec("1.0")));
        assert_eq!(report.trend.len(), 2);
    }

    /// Each trend point only counts feed dated at or before its sample
    #[test]
    fn test_trend_feed_is_cumulative() {
        let p = profile(100);
        let intakes = vec![intake(3, "80", "0.5"), intake(12, "220", "0.5")];
        let samples = vec![sample(1, "0.2"), sample(10, "1.0"), sample(20, "2.2")];

        let report =
            compute_fcr_report(&p, &intakes, &samples, &FcrBenchmarks::broiler(), day(20));

        // day 10: 80kg over (1.0 - 0.2) * 100 = 80kg gain
        assert_eq!(report.trend[1].fcr_to_date, Some(dec("1")));
        // day 20: 300kg over (2.2 - 0.2) * 100 = 200kg gain
        assert_eq!(report.trend[2].fcr_to_date, Some(dec("1.5")));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating valid FCR values
    fn fcr_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=500i64).prop_map(|n| Decimal::new(n, 2)) // 0.01 to 5.00
    }

    /// Strategy for generating feed quantities
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=50000i64).prop_map(|n| Decimal::new(n, 1)) // 0.1 to 5000.0
    }

    /// Strategy for generating per-bird weights
    fn weight_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=60000i64).prop_map(|n| Decimal::new(n, 4)) // 0.0001 to 6.0 kg
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Classification is total: every FCR value lands in exactly one tier
        #[test]
        fn prop_classification_total(fcr in fcr_strategy()) {
            let b = FcrBenchmarks::broiler();
            let tier = classify_fcr(fcr, &b);
            let expected = if fcr <= b.excellent {
                PerformanceTier::Excellent
            } else if fcr <= b.good {
                PerformanceTier::Good
            } else if fcr <= b.average {
                PerformanceTier::Average
            } else if fcr <= b.poor {
                PerformanceTier::BelowAverage
            } else {
                PerformanceTier::Poor
            };
            prop_assert_eq!(tier, expected);
        }

        /// Lower FCR never classifies worse than higher FCR
        #[test]
        fn prop_classification_monotone(a in fcr_strategy(), b in fcr_strategy()) {
            fn rank(t: PerformanceTier) -> u8 {
                match t {
                    PerformanceTier::Excellent => 0,
                    PerformanceTier::Good => 1,
                    PerformanceTier::Average => 2,
                    PerformanceTier::BelowAverage => 3,
                    PerformanceTier::Poor => 4,
                }
            }
            let benchmarks = FcrBenchmarks::broiler();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                rank(classify_fcr(lo, &benchmarks)) <= rank(classify_fcr(hi, &benchmarks))
            );
        }

        /// The report never divides by a non-positive gain: any weight pair,
        /// including zero or negative gain, produces a well-formed report
        #[test]
        fn prop_report_never_panics_on_gain(
            birds in 1i32..=50000,
            feed in quantity_strategy(),
            w1 in weight_strategy(),
            w2 in weight_strategy(),
        ) {
            let p = profile(birds);
            let intakes = vec![FeedIntake {
                event_date: day(5),
                quantity_kg: feed,
                unit_cost: Some(dec("0.5")),
            }];
            let samples = vec![
                sample(2, &w1.to_string()),
                sample(20, &w2.to_string()),
            ];

            let report =
                compute_fcr_report(&p, &intakes, &samples, &FcrBenchmarks::broiler(), day(20));

            let gain = report.total_weight_gain_kg.unwrap();
            if gain > Decimal::ZERO {
                prop_assert_eq!(report.fcr, Some(feed / gain));
                prop_assert!(report.tier.is_some());
            } else {
                prop_assert_eq!(report.fcr, None);
                prop_assert_eq!(report.tier, None);
            }
        }

        /// Trend ages strictly increase regardless of sample clustering
        #[test]
        fn prop_trend_ages_strictly_increase(
            offsets in prop::collection::vec(1i64..=40, 2..12),
            weights in prop::collection::vec(weight_strategy(), 12),
        ) {
            let p = profile(100);
            let samples: Vec<WeightSample> = offsets
                .iter()
                .zip(weights.iter())
                .map(|(d, w)| sample(*d, &w.to_string()))
                .collect();

            let report =
                compute_fcr_report(&p, &[], &samples, &FcrBenchmarks::broiler(), day(41));
            prop_assert!(report
                .trend
                .windows(2)
                .all(|w| w[0].age_days < w[1].age_days));
        }

        /// Total feed is the plain sum of in-window consumption
        #[test]
        fn prop_total_feed_is_sum(
            quantities in prop::collection::vec(quantity_strategy(), 1..15),
        ) {
            let p = profile(100);
            let intakes: Vec<FeedIntake> = quantities
                .iter()
                .enumerate()
                .map(|(i, q)| FeedIntake {
                    event_date: day((i % 20) as i64),
                    quantity_kg: *q,
                    unit_cost: None,
                })
                .collect();

            let report =
                compute_fcr_report(&p, &intakes, &[], &FcrBenchmarks::broiler(), day(30));
            let expected: Decimal = quantities.iter().sum();
            prop_assert_eq!(report.total_feed_kg, expected);
        }
    }
}
