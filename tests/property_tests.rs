//! Property-based tests for the metric extractor
//!
//! - Run with ProptestConfig::with_cases(100)
//! - Logs are generated from the planner's marker grammar with noise lines mixed in

use proptest::prelude::*;
use smtbench::extract::{reports_sat, ExtractionError, MetricExtractor, SENTINEL};

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Seconds with two decimals, the way the planner prints them
fn arb_seconds() -> impl Strategy<Value = f64> {
    (0u32..100_000).prop_map(|centis| f64::from(centis) / 100.0)
}

/// Lines the planner prints that carry no metric
fn arb_noise() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z ]{0,20}", 0..4)
}

fn fmt_secs(v: f64) -> String {
    format!("{v:.2}")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: satisfiable logs yield their iterations and solution time, timeout stays at sentinel
    #[test]
    fn prop_sat_log_round_trips(
        grounded in arb_seconds(),
        iterations in 1i64..10_000,
        solution in arb_seconds(),
        total in arb_seconds(),
        noise in arb_noise(),
    ) {
        let mut lines = noise;
        lines.push(format!("Grounded: {}", fmt_secs(grounded)));
        lines.push("SAT".to_string());
        lines.push(format!("Iterations: {iterations}"));
        lines.push(format!("SAT Solution: {}", fmt_secs(solution)));
        lines.push(format!("Total time: {}", fmt_secs(total)));
        let log = lines.join("\n");

        let metrics = MetricExtractor::new().extract(&log).unwrap();
        prop_assert!(metrics.satisfiable());
        prop_assert_eq!(metrics.iterations(), iterations);
        prop_assert!((metrics.solution_time() - solution).abs() < 1e-9);
        prop_assert!((metrics.total_time - total).abs() < 1e-9);
        prop_assert_eq!(metrics.timeout_bound(), SENTINEL);
        prop_assert_eq!(metrics.grounded_time.map(|g| (g - grounded).abs() < 1e-9), Some(true));
    }

    /// Property: unsatisfiable logs yield the timeout bound, iterations stay at sentinel
    #[test]
    fn prop_unsat_log_round_trips(
        bound in 1i64..1_000,
        total in arb_seconds(),
        say_unsat in any::<bool>(),
    ) {
        let verdict = if say_unsat { "UNSAT\n" } else { "" };
        let log = format!("{verdict}Timeout at {bound}\nTotal time: {}", fmt_secs(total));

        let metrics = MetricExtractor::new().extract(&log).unwrap();
        prop_assert!(!metrics.satisfiable());
        prop_assert_eq!(metrics.timeout_bound(), bound);
        prop_assert_eq!(metrics.iterations(), SENTINEL);
    }

    /// Property: without `Total time:` extraction never succeeds
    #[test]
    fn prop_missing_total_time_fails(
        iterations in 1i64..100,
        solution in arb_seconds(),
        sat in any::<bool>(),
    ) {
        let log = if sat {
            format!("SAT\nIterations: {iterations}\nSAT Solution: {}", fmt_secs(solution))
        } else {
            format!("UNSAT\nTimeout at {iterations}")
        };
        let err = MetricExtractor::new().extract(&log).unwrap_err();
        let is_missing_total = matches!(err, ExtractionError::MissingMarker { field: "total_time", .. });
        prop_assert!(is_missing_total);
    }

    /// Property: text made only of UNSAT tokens and non-S letters never reports SAT
    #[test]
    fn prop_unsat_only_never_sat(words in proptest::collection::vec("UNSAT|[a-rt-z ]{1,8}", 0..10)) {
        let text = words.join(" ");
        prop_assert!(!reports_sat(&text));
    }
}
