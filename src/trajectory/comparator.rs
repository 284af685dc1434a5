//! Test-versus-reference trajectory comparison.

use super::tolerance::{self, ChannelStatus, ChannelVerdict, RegressionVerdict, ToleranceTable};
use super::Trajectory;
use crate::error::{Result, SimforgeError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Piecewise-linear interpolation of `(xp, fp)` at `x`, clamped at the ends
///
/// `xp` must be ascending and the same length as `fp`.
pub fn interpolate(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return f64::NAN;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }
    // first index with xp[i] > x; 1 <= i <= n - 1 here
    let i = xp[..n].partition_point(|&v| v <= x);
    let (x0, x1) = (xp[i - 1], xp[i]);
    let (y0, y1) = (fp[i - 1], fp[i]);
    if x1 == x0 {
        return y1;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Errors of every common channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub common_channels: Vec<String>,
    pub rms: BTreeMap<String, f64>,
    pub max: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<RegressionVerdict>,
}

impl ComparisonResult {
    pub fn passed(&self) -> Option<bool> {
        self.verdict.as_ref().map(|v| v.passed)
    }
}

/// Compares a test trajectory against a reference resampled onto its time base
#[derive(Debug, Clone)]
pub struct TrajectoryComparator {
    test: Trajectory,
    reference: Trajectory,
    common: BTreeSet<String>,
    resampled: BTreeMap<String, Vec<f64>>,
}

impl TrajectoryComparator {
    pub fn new(test: Trajectory, reference: Trajectory) -> Result<Self> {
        let test_names: BTreeSet<&str> = test.data().keys().map(String::as_str).collect();
        let common: BTreeSet<String> = reference
            .data()
            .keys()
            .filter(|k| test_names.contains(k.as_str()))
            .cloned()
            .collect();
        if common.is_empty() {
            return Err(SimforgeError::Comparison(format!(
                "no common channels (test: [{}], reference: [{}])",
                test.variables().join(", "),
                reference.variables().join(", ")
            )));
        }

        let resampled = common
            .iter()
            .filter_map(|name| {
                let samples = reference.get(name)?;
                let values = test
                    .time()
                    .iter()
                    .map(|&t| interpolate(t, reference.time(), samples))
                    .collect();
                Some((name.clone(), values))
            })
            .collect();

        Ok(Self {
            test,
            reference,
            common,
            resampled,
        })
    }

    /// Load the reference from disk and compare
    pub fn against_file(test: Trajectory, reference: &Path) -> Result<Self> {
        if !reference.exists() {
            return Err(SimforgeError::Comparison(format!(
                "reference trajectory not found: {}",
                reference.display()
            )));
        }
        Self::new(test, Trajectory::from_file(reference)?)
    }

    pub fn test(&self) -> &Trajectory {
        &self.test
    }

    pub fn reference(&self) -> &Trajectory {
        &self.reference
    }

    pub fn common_channels(&self) -> &BTreeSet<String> {
        &self.common
    }

    fn differences<'a>(&'a self, channel: &str) -> Option<impl Iterator<Item = f64> + 'a> {
        let test = self.test.get(channel)?;
        let reference = self.resampled.get(channel)?;
        Some(test.iter().zip(reference).map(|(a, b)| a - b))
    }

    fn reduce<F>(&self, channel: Option<&str>, f: F) -> BTreeMap<String, f64>
    where
        F: Fn(&mut dyn Iterator<Item = f64>) -> f64,
    {
        let names: Vec<&str> = match channel {
            Some(name) => vec![name],
            None => self.common.iter().map(String::as_str).collect(),
        };
        names
            .into_iter()
            .filter(|n| self.common.contains(*n))
            .filter_map(|n| {
                let mut diffs = self.differences(n)?;
                Some((n.to_string(), f(&mut diffs)))
            })
            .collect()
    }

    /// Root-mean-square error per channel; empty for a non-common channel
    pub fn rms_error(&self, channel: Option<&str>) -> BTreeMap<String, f64> {
        self.reduce(channel, |diffs| {
            let (sum, count) = diffs.fold((0.0, 0usize), |(s, c), d| (s + d * d, c + 1));
            if count == 0 {
                0.0
            } else {
                (sum / count as f64).sqrt()
            }
        })
    }

    /// Maximum absolute error per channel; empty for a non-common channel
    ///
    /// A NaN difference makes the channel's maximum NaN.
    pub fn max_error(&self, channel: Option<&str>) -> BTreeMap<String, f64> {
        self.reduce(channel, |diffs| {
            diffs.fold(0.0, |m: f64, d| {
                if m.is_nan() || d.abs() <= m {
                    m
                } else {
                    d.abs()
                }
            })
        })
    }

    /// Check every tolerance-table channel, and every compared channel when
    /// the table has a default
    pub fn evaluate(&self, tolerances: &ToleranceTable) -> RegressionVerdict {
        let rms = self.rms_error(None);
        let max = self.max_error(None);

        let mut names: BTreeSet<&str> = tolerances.channels.keys().map(String::as_str).collect();
        if tolerances.default.is_some() {
            names.extend(self.common.iter().map(String::as_str));
        }

        let channels = names
            .into_iter()
            .filter_map(|name| {
                let allowed = tolerances.get(name)?;
                Some(match (rms.get(name), max.get(name)) {
                    (Some(&r), Some(&m)) => tolerance::check(name, r, m, allowed),
                    _ => ChannelVerdict {
                        channel: name.to_string(),
                        rms: None,
                        max: None,
                        tolerance: allowed,
                        status: ChannelStatus::Missing,
                    },
                })
            })
            .collect();
        RegressionVerdict::from_channels(channels)
    }

    pub fn result(&self, tolerances: Option<&ToleranceTable>) -> ComparisonResult {
        ComparisonResult {
            common_channels: self.common.iter().cloned().collect(),
            rms: self.rms_error(None),
            max: self.max_error(None),
            verdict: tolerances.map(|t| self.evaluate(t)),
        }
    }

    /// Fixed-width table of RMS and max error per channel
    pub fn summary(&self) -> String {
        let rms = self.rms_error(None);
        let max = self.max_error(None);
        let mut lines = vec![
            "Trajectory Comparison Summary".to_string(),
            "=".repeat(50),
            format!("Common variables: {}", self.common.len()),
            String::new(),
            format!("{:<20} {:<15} {:<15}", "Variable", "RMS Error", "Max Error"),
            "-".repeat(50),
        ];
        for name in &self.common {
            lines.push(format!(
                "{:<20} {:<15.6e} {:<15.6e}",
                name,
                rms.get(name).copied().unwrap_or(0.0),
                max.get(name).copied().unwrap_or(0.0)
            ));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::Tolerance;
    use indexmap::IndexMap;

    fn traj(time: Vec<f64>, channels: &[(&str, Vec<f64>)]) -> Trajectory {
        let data: IndexMap<String, Vec<f64>> = channels
            .iter()
            .map(|(n, v)| (n.to_string(), v.clone()))
            .collect();
        Trajectory::new(time, data).unwrap()
    }

    // ============================================================================
    // INTERPOLATION
    // ============================================================================

    #[test]
    fn test_interpolate_inside_and_clamped() {
        let xp = [0.0, 1.0, 2.0];
        let fp = [0.0, 10.0, 0.0];
        assert_eq!(interpolate(0.5, &xp, &fp), 5.0);
        assert_eq!(interpolate(1.0, &xp, &fp), 10.0);
        assert_eq!(interpolate(1.5, &xp, &fp), 5.0);
        assert_eq!(interpolate(-3.0, &xp, &fp), 0.0);
        assert_eq!(interpolate(9.0, &xp, &fp), 0.0);
    }

    #[test]
    fn test_interpolate_single_point() {
        assert_eq!(interpolate(4.0, &[1.0], &[7.0]), 7.0);
        assert!(interpolate(4.0, &[], &[]).is_nan());
    }

    // ============================================================================
    // COMPARISON
    // ============================================================================

    #[test]
    fn test_identical_trajectories_have_zero_error() {
        let t = traj(vec![0.0, 1.0, 2.0], &[("alt", vec![3.0, 2.0, 1.0])]);
        let cmp = TrajectoryComparator::new(t.clone(), t).unwrap();
        assert_eq!(cmp.rms_error(None)["alt"], 0.0);
        assert_eq!(cmp.max_error(None)["alt"], 0.0);
    }

    #[test]
    fn test_no_common_channels_is_error() {
        let a = traj(vec![0.0], &[("alt", vec![1.0])]);
        let b = traj(vec![0.0], &[("vel", vec![1.0])]);
        let err = TrajectoryComparator::new(a, b).unwrap_err();
        assert!(matches!(err, SimforgeError::Comparison(_)));
    }

    #[test]
    fn test_reference_resampled_onto_test_time() {
        let reference = traj(vec![0.0, 2.0], &[("x", vec![0.0, 4.0])]);
        let test = traj(vec![0.0, 0.5, 1.0, 1.5, 2.0], &[("x", vec![0.0, 1.0, 2.0, 3.0, 4.0])]);
        let cmp = TrajectoryComparator::new(test, reference).unwrap();
        assert!(cmp.rms_error(Some("x"))["x"].abs() < 1e-12);
    }

    #[test]
    fn test_rms_and_max_values() {
        let reference = traj(vec![0.0, 1.0], &[("x", vec![0.0, 0.0]), ("y", vec![1.0, 1.0])]);
        let test = traj(vec![0.0, 1.0], &[("x", vec![3.0, -4.0]), ("z", vec![0.0, 0.0])]);
        let cmp = TrajectoryComparator::new(test, reference).unwrap();

        assert_eq!(cmp.common_channels().len(), 1);
        let rms = cmp.rms_error(None)["x"];
        assert!((rms - (12.5f64).sqrt()).abs() < 1e-12);
        assert_eq!(cmp.max_error(None)["x"], 4.0);
        assert!(cmp.rms_error(Some("y")).is_empty());
        assert!(cmp.max_error(Some("z")).is_empty());
    }

    #[test]
    fn test_nan_samples_propagate_to_max_and_fail_verdict() {
        let test = traj(vec![0.0, 1.0], &[("alt", vec![f64::NAN, f64::NAN])]);
        let reference = traj(vec![0.0, 1.0], &[("alt", vec![1.0, 1.0])]);
        let cmp = TrajectoryComparator::new(test, reference).unwrap();
        assert!(cmp.max_error(None)["alt"].is_nan());
        assert!(cmp.rms_error(None)["alt"].is_nan());

        let table = ToleranceTable::new().with("alt", Tolerance::rms(1.0).with_max(1.0));
        assert_eq!(cmp.evaluate(&table).channels[0].status, ChannelStatus::Fail);
    }

    #[test]
    fn test_single_nan_sample_sticks_in_max() {
        let test = traj(vec![0.0, 1.0, 2.0], &[("alt", vec![f64::NAN, 5.0, 1.0])]);
        let reference = traj(vec![0.0, 1.0, 2.0], &[("alt", vec![0.0, 0.0, 0.0])]);
        let cmp = TrajectoryComparator::new(test, reference).unwrap();
        assert!(cmp.max_error(Some("alt"))["alt"].is_nan());
    }

    #[test]
    fn test_summary_table() {
        let t = traj(vec![0.0, 1.0], &[("alt", vec![1.0, 2.0]), ("vel", vec![0.0, 1.0])]);
        let summary = TrajectoryComparator::new(t.clone(), t).unwrap().summary();
        assert!(summary.starts_with("Trajectory Comparison Summary\n"));
        assert!(summary.contains("Common variables: 2"));
        assert!(summary.contains(&format!("{:<20} {:<15} {:<15}", "Variable", "RMS Error", "Max Error")));
        assert!(summary.contains(&format!("{:<20} {:<15.6e}", "alt", 0.0)));
    }

    // ============================================================================
    // VERDICTS
    // ============================================================================

    #[test]
    fn test_required_channel_over_tolerance_fails_verdict() {
        let reference = traj(
            vec![0.0, 1.0],
            &[("altitude", vec![0.0, 0.0]), ("vel", vec![1.0, 1.0])],
        );
        let test = traj(
            vec![0.0, 1.0],
            &[("altitude", vec![0.2, -0.2]), ("vel", vec![1.0, 1.0])],
        );
        let cmp = TrajectoryComparator::new(test, reference).unwrap();
        let table = ToleranceTable::new()
            .with("altitude", Tolerance::rms(0.1).required())
            .with("vel", Tolerance::rms(0.1));

        let verdict = cmp.evaluate(&table);
        assert!(!verdict.passed);
        assert_eq!(verdict.channel("altitude").unwrap().status, ChannelStatus::Fail);
        assert_eq!(verdict.channel("vel").unwrap().status, ChannelStatus::Pass);
    }

    #[test]
    fn test_missing_required_channel_is_reported() {
        let t = traj(vec![0.0, 1.0], &[("alt", vec![1.0, 2.0])]);
        let cmp = TrajectoryComparator::new(t.clone(), t).unwrap();

        let optional = cmp.evaluate(&ToleranceTable::new().with("mach", Tolerance::rms(0.1)));
        assert_eq!(optional.channel("mach").unwrap().status, ChannelStatus::Missing);
        assert!(optional.passed);

        let required = cmp.evaluate(&ToleranceTable::new().require("mach"));
        assert!(!required.passed);
    }

    #[test]
    fn test_default_tolerance_checks_all_common_channels() {
        let reference = traj(vec![0.0, 1.0], &[("a", vec![0.0, 0.0]), ("b", vec![0.0, 0.0])]);
        let test = traj(vec![0.0, 1.0], &[("a", vec![0.0, 0.0]), ("b", vec![1.0, 1.0])]);
        let cmp = TrajectoryComparator::new(test, reference).unwrap();
        let verdict = cmp.evaluate(&ToleranceTable::new().with_default(Tolerance::rms(0.5)));
        assert_eq!(verdict.channels.len(), 2);
        assert!(!verdict.passed);
        assert_eq!(verdict.failures().next().unwrap().channel, "b");
    }

    #[test]
    fn test_result_carries_verdict() {
        let t = traj(vec![0.0], &[("alt", vec![1.0])]);
        let cmp = TrajectoryComparator::new(t.clone(), t).unwrap();
        assert_eq!(cmp.result(None).passed(), None);
        let table = ToleranceTable::new().with("alt", Tolerance::rms(0.0));
        assert_eq!(cmp.result(Some(&table)).passed(), Some(true));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_identical_trajectories_zero_error(
                values in prop::collection::vec(-1e6f64..1e6, 1..50)
            ) {
                let time: Vec<f64> = (0..values.len()).map(|i| i as f64 * 0.1).collect();
                let t = traj(time, &[("x", values)]);
                let cmp = TrajectoryComparator::new(t.clone(), t).unwrap();
                prop_assert_eq!(cmp.rms_error(None)["x"], 0.0);
                prop_assert_eq!(cmp.max_error(None)["x"], 0.0);
            }

            #[test]
            fn prop_linear_reference_interpolates_exactly(
                slope in -100.0f64..100.0,
                offset in -100.0f64..100.0,
                n in 2usize..30,
            ) {
                let f = |t: f64| slope * t + offset;
                let ref_time: Vec<f64> = (0..n).map(|i| i as f64).collect();
                let reference = traj(ref_time.clone(), &[("x", ref_time.iter().map(|&t| f(t)).collect())]);
                let test_time: Vec<f64> = (0..(2 * n - 1)).map(|i| i as f64 * 0.5).collect();
                let test = traj(test_time.clone(), &[("x", test_time.iter().map(|&t| f(t)).collect())]);
                let cmp = TrajectoryComparator::new(test, reference).unwrap();
                prop_assert!(cmp.rms_error(None)["x"] < 1e-9);
            }
        }
    }
}
