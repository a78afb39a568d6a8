//! Adaptive bucket sizing
//!
//! The source's first pass partitions a field at its own granularity. Unless
//! that partition already matches the requested bucket count, boundaries are
//! recomputed in integer units of the data's decimal resolution so that
//! bucket widths stay round and the observed maximum always lands strictly
//! inside the last bucket.

use super::planner::{BucketBoundaries, BucketBoundaryPlanner};
use super::types::Bucket;

/// Finest decimal resolution probed (1e-9)
const MAX_DECIMAL_PLACES: i32 = 9;

/// Largest magnitude still exact as an integer in an f64
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Relative tolerance for uniform first-pass widths
const WIDTH_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdaptiveBucketSizeEvaluator {
    target_number_of_buckets: u32,
}

impl AdaptiveBucketSizeEvaluator {
    pub fn new(target_number_of_buckets: u32) -> Self {
        Self {
            target_number_of_buckets,
        }
    }

    /// Boundaries for the requested bucket count covering
    /// `[observed_min, observed_max]`.
    ///
    /// A zero target yields no boundaries regardless of the data.
    pub fn evaluate(
        &self,
        observed_min: f64,
        observed_max: f64,
        first_pass: &[Bucket],
    ) -> BucketBoundaries {
        let n = self.target_number_of_buckets;
        if n == 0 {
            return BucketBoundaries::empty();
        }

        let (min, max) = if observed_min <= observed_max {
            (observed_min, observed_max)
        } else {
            (observed_max, observed_min)
        };

        if let Some(accepted) = self.accept_first_pass(min, max, first_pass) {
            tracing::debug!(
                "Accepting first-pass partition of {} buckets over [{}, {})",
                n,
                min,
                accepted.max().unwrap_or(max)
            );
            return accepted;
        }

        match Resolution::of(min, max) {
            Some(resolution) => resolution.partition(min, max, n),
            None => {
                // Not representable in decimal units; nudge the upper edge
                // so the maximum is still strictly inside the last bucket
                let nudge = (max.abs() * WIDTH_TOLERANCE).max(WIDTH_TOLERANCE);
                BucketBoundaryPlanner::plan(min, max + nudge, n)
            }
        }
    }

    fn accept_first_pass(
        &self,
        min: f64,
        max: f64,
        first_pass: &[Bucket],
    ) -> Option<BucketBoundaries> {
        if first_pass.len() != self.target_number_of_buckets as usize {
            return None;
        }

        let boundaries = BucketBoundaries::from_buckets(first_pass)?;
        let reference = first_pass[0].width();
        let uniform = first_pass
            .iter()
            .all(|b| (b.width() - reference).abs() <= reference * WIDTH_TOLERANCE);

        let covers = boundaries.min()? <= min && boundaries.max()? > max;
        (uniform && covers).then_some(boundaries)
    }
}

/// Decimal unit in which a pair of bounds is exact, e.g. 1 for `[1, 21]`
/// and 0.1 for `[0.5, 2.3]`
#[derive(Debug, Clone, Copy, PartialEq)]
struct Resolution {
    scale: f64,
}

impl Resolution {
    fn of(min: f64, max: f64) -> Option<Self> {
        (0..=MAX_DECIMAL_PLACES)
            .map(|places| 10f64.powi(places))
            .find(|&scale| to_units(min, scale).is_some() && to_units(max, scale).is_some())
            .map(|scale| Self { scale })
    }

    fn partition(&self, min: f64, max: f64, n: u32) -> BucketBoundaries {
        let (Some(min_units), Some(max_units)) =
            (to_units(min, self.scale), to_units(max, self.scale))
        else {
            return BucketBoundaryPlanner::plan(min, max, n);
        };

        let buckets = i64::from(n);
        let upper = max_units + 1;
        let span = upper - min_units;

        if span <= buckets {
            // Fewer distinct units than buckets: one unit per bucket
            let edges = (0..=buckets)
                .map(|i| self.to_value(min_units + i))
                .collect();
            return BucketBoundaries::from_edges(edges)
                .unwrap_or_else(|| BucketBoundaryPlanner::plan(min, max, n));
        }

        // Both positive here
        let width = (span + buckets - 1) / buckets;
        if min_units + (buckets - 1) * width < upper {
            // Edges come from whole units so they stay exact decimals
            let mut edges: Vec<f64> = (0..buckets)
                .map(|i| self.to_value(min_units + i * width))
                .collect();
            edges.push(self.to_value(upper));
            return BucketBoundaries::from_edges(edges).unwrap_or_else(|| {
                BucketBoundaryPlanner::plan_stepped(
                    min,
                    self.to_value(width),
                    self.to_value(upper),
                    n,
                )
            });
        }

        // Ceiling width overshoots: spread the units evenly instead. Steps
        // differ by at most one unit and never by zero since span > n.
        let edges = (0..=i128::from(n))
            .map(|i| {
                let offset = i * i128::from(span) / i128::from(n);
                self.to_value(min_units + offset as i64)
            })
            .collect();
        BucketBoundaries::from_edges(edges)
            .unwrap_or_else(|| BucketBoundaryPlanner::plan(min, self.to_value(upper), n))
    }

    fn to_value(&self, units: i64) -> f64 {
        units as f64 / self.scale
    }
}

fn to_units(value: f64, scale: f64) -> Option<i64> {
    let scaled = value * scale;
    if !scaled.is_finite() || scaled.abs() >= MAX_EXACT_INTEGER {
        return None;
    }
    let rounded = scaled.round();
    // Units must map back onto the exact same f64
    (rounded / scale == value).then_some(rounded as i64)
}
