use super::types::Bucket;

/// Attempts at widening a degenerate step before giving up on growth
const MAX_STEP_DOUBLINGS: u32 = 64;

/// Ordered, strictly increasing bucket edges.
///
/// `n` buckets are described by `n + 1` boundaries; bucket `i` covers
/// `[boundaries[i], boundaries[i + 1])`, the last bucket also includes its
/// upper edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketBoundaries(Vec<f64>);

impl BucketBoundaries {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Accept `edges` only if they describe at least one bucket and are
    /// strictly increasing
    pub fn from_edges(edges: Vec<f64>) -> Option<Self> {
        (edges.len() >= 2 && is_strictly_increasing(&edges)).then_some(Self(edges))
    }

    /// Edges of a contiguous, ascending bucket list
    pub fn from_buckets(buckets: &[Bucket]) -> Option<Self> {
        let first = buckets.first()?;
        let contiguous = buckets
            .windows(2)
            .all(|pair| pair[0].range_end == pair[1].range_start);
        if !contiguous {
            return None;
        }

        let mut edges = Vec::with_capacity(buckets.len() + 1);
        edges.push(first.range_start);
        edges.extend(buckets.iter().map(|b| b.range_end));
        Self::from_edges(edges)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn min(&self) -> Option<f64> {
        self.0.first().copied()
    }

    pub fn max(&self) -> Option<f64> {
        self.0.last().copied()
    }

    /// `(start, end)` of every bucket in ascending order
    pub fn ranges(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.0.windows(2).map(|pair| (pair[0], pair[1]))
    }
}

/// Splits a numeric range into a fixed number of contiguous buckets
pub struct BucketBoundaryPlanner;

impl BucketBoundaryPlanner {
    /// Evenly partition `[min, max]` into `bucket_count` buckets.
    ///
    /// Degenerate ranges (`min == max`, inverted, or steps lost to floating
    /// point rounding) fall back to unit-wide buckets starting at `min`.
    pub fn plan(min: f64, max: f64, bucket_count: u32) -> BucketBoundaries {
        if bucket_count == 0 {
            return BucketBoundaries::empty();
        }

        let min = if min.is_finite() { min } else { 0.0 };
        let width = (max - min) / f64::from(bucket_count);

        if width.is_finite() && width > 0.0 {
            let mut edges = stepped_edges(min, width, bucket_count);
            edges.push(max);
            if let Some(boundaries) = BucketBoundaries::from_edges(edges) {
                return boundaries;
            }
        }

        Self::unit_buckets(min, bucket_count)
    }

    /// Buckets of `width` starting at `min`, the last one clamped to `upper`.
    ///
    /// Falls back to [`plan`](Self::plan) over `[min, upper]` if the stepped
    /// edges would not stay strictly below `upper`.
    pub fn plan_stepped(min: f64, width: f64, upper: f64, bucket_count: u32) -> BucketBoundaries {
        if bucket_count == 0 {
            return BucketBoundaries::empty();
        }

        if width.is_finite() && width > 0.0 {
            let mut edges = stepped_edges(min, width, bucket_count);
            edges.push(upper);
            if let Some(boundaries) = BucketBoundaries::from_edges(edges) {
                return boundaries;
            }
        }

        Self::plan(min, upper, bucket_count)
    }

    fn unit_buckets(min: f64, bucket_count: u32) -> BucketBoundaries {
        let mut step = 1.0;
        for _ in 0..MAX_STEP_DOUBLINGS {
            let mut edges = stepped_edges(min, step, bucket_count);
            edges.push(min + f64::from(bucket_count) * step);
            if let Some(boundaries) = BucketBoundaries::from_edges(edges) {
                return boundaries;
            }
            step *= 2.0;
        }
        // Only reachable for magnitudes near f64::MAX; unit buckets from zero
        BucketBoundaries::from_edges((0..=bucket_count).map(f64::from).collect())
            .unwrap_or_else(BucketBoundaries::empty)
    }
}

fn stepped_edges(min: f64, width: f64, bucket_count: u32) -> Vec<f64> {
    let mut edges = Vec::with_capacity(bucket_count as usize + 1);
    edges.extend((0..bucket_count).map(|i| min + f64::from(i) * width));
    edges
}

fn is_strictly_increasing(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite()) && values.windows(2).all(|pair| pair[0] < pair[1])
}
