use super::entry::RawEntry;
use super::planner::BucketBoundaries;
use super::types::{Bucket, RangeInfo, TagValue};

/// Credits raw value counts into planned buckets.
///
/// A sub-range credits its full count to every bucket it overlaps; there is
/// no proportional splitting, so coarse source ranges may be counted in more
/// than one bucket.
pub struct RangeAggregator;

impl RangeAggregator {
    pub fn aggregate(field: &str, boundaries: &BucketBoundaries, values: &[TagValue]) -> RangeInfo {
        let mut buckets: Vec<Bucket> = boundaries
            .ranges()
            .map(|(start, end)| Bucket::new(0, start, end))
            .collect();
        let last = buckets.len().saturating_sub(1);
        let mut count = 0u64;

        for tag in values {
            let entry = match RawEntry::classify(tag) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping value for field '{}': {}", field, e);
                    crate::metrics::record_malformed_value(field);
                    continue;
                }
            };

            count = count.saturating_add(entry.count());

            let Some((low, high)) = entry.span() else {
                continue;
            };
            let mut credited = false;
            for (i, bucket) in buckets.iter_mut().enumerate() {
                if overlaps(low, high, bucket, i == last) {
                    bucket.count = bucket.count.saturating_add(entry.count());
                    credited = true;
                }
            }
            if !credited {
                if let Some(bucket) = clamp_open_range(&entry, &mut buckets) {
                    bucket.count = bucket.count.saturating_add(entry.count());
                }
            }
        }

        RangeInfo {
            id: field.to_string(),
            count,
            min: boundaries.min().unwrap_or(0.0),
            max: boundaries.max().unwrap_or(0.0),
            values: buckets,
        }
    }
}

/// Open-ended range lying wholly outside the buckets: `"x,"` past the end
/// goes to the last bucket, `",x"` before the start to the first
fn clamp_open_range<'a>(entry: &RawEntry, buckets: &'a mut [Bucket]) -> Option<&'a mut Bucket> {
    match *entry {
        RawEntry::SubRange {
            low: Some(low),
            high: None,
            ..
        } => buckets.last_mut().filter(|b| low >= b.range_end),
        RawEntry::SubRange {
            low: None,
            high: Some(high),
            ..
        } => buckets.first_mut().filter(|b| high <= b.range_start),
        _ => None,
    }
}

fn overlaps(low: f64, high: f64, bucket: &Bucket, is_last: bool) -> bool {
    if low == high {
        low >= bucket.range_start
            && (low < bucket.range_end || (is_last && low == bucket.range_end))
    } else {
        low < bucket.range_end && high > bucket.range_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundaries(edges: &[f64]) -> BucketBoundaries {
        BucketBoundaries::from_edges(edges.to_vec()).unwrap()
    }

    fn counts(info: &RangeInfo) -> Vec<u64> {
        info.values.iter().map(|b| b.count).collect()
    }

    #[test]
    fn test_sub_ranges_and_open_end() {
        let edges = boundaries(&[1.0, 6.0, 11.0, 16.0, 21.0, 22.0]);
        let values = [
            TagValue::new("1,6", 5),
            TagValue::new("6,11", 2),
            TagValue::new("21,", 1),
        ];

        let info = RangeAggregator::aggregate("PRICE", &edges, &values);

        assert_eq!(info.id, "PRICE");
        assert_eq!(info.count, 8);
        assert_eq!(info.min, 1.0);
        assert_eq!(info.max, 22.0);
        assert_eq!(
            info.values,
            vec![
                Bucket::new(5, 1.0, 6.0),
                Bucket::new(2, 6.0, 11.0),
                Bucket::new(0, 11.0, 16.0),
                Bucket::new(0, 16.0, 21.0),
                Bucket::new(1, 21.0, 22.0),
            ]
        );
    }

    #[test]
    fn test_single_values_use_half_open_buckets() {
        let edges = boundaries(&[0.0, 10.0, 20.0]);
        let values = [
            TagValue::new("0", 1),
            TagValue::new("9.5", 2),
            TagValue::new("10", 4),
            TagValue::new("20", 8),
            TagValue::new("25", 16),
        ];

        let info = RangeAggregator::aggregate("F", &edges, &values);

        // 20 sits on the closed upper edge of the last bucket, 25 is outside
        assert_eq!(counts(&info), vec![3, 12]);
        assert_eq!(info.count, 31);
    }

    #[test]
    fn test_coarse_range_credits_every_overlapping_bucket() {
        let edges = boundaries(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let values = [TagValue::new("0.5,2.5", 6)];

        let info = RangeAggregator::aggregate("F", &edges, &values);

        assert_eq!(counts(&info), vec![6, 6, 6, 0]);
        assert_eq!(info.count, 6);
    }

    #[test]
    fn test_open_low_range_reaches_first_bucket() {
        let edges = boundaries(&[0.0, 5.0, 10.0]);
        let info = RangeAggregator::aggregate("F", &edges, &[TagValue::new(",3", 2)]);
        assert_eq!(counts(&info), vec![2, 0]);
    }

    #[test]
    fn test_open_high_range_past_end_clamps_to_last_bucket() {
        let info = RangeAggregator::aggregate(
            "PRICE",
            &boundaries(&[1.0, 2.0, 3.0]),
            &[TagValue::new("5,", 4), TagValue::new("3,", 1)],
        );
        assert_eq!(info.count, 5);
        assert_eq!(counts(&info), vec![0, 5]);
    }

    #[test]
    fn test_open_low_range_before_start_clamps_to_first_bucket() {
        let info = RangeAggregator::aggregate(
            "PRICE",
            &boundaries(&[1.0, 2.0, 3.0]),
            &[TagValue::new(",0", 2), TagValue::new(",1", 3)],
        );
        assert_eq!(info.count, 5);
        assert_eq!(counts(&info), vec![5, 0]);
    }

    #[test]
    fn test_decimal_max_lands_in_last_bucket() {
        let edges = crate::aggregations::AdaptiveBucketSizeEvaluator::new(2).evaluate(0.1, 0.3, &[]);
        let info = RangeAggregator::aggregate(
            "WEIGHT",
            &edges,
            &[TagValue::new("0.1", 1), TagValue::new("0.3", 1)],
        );
        assert_eq!(counts(&info), vec![1, 1]);
    }

    #[test]
    fn test_malformed_values_are_skipped() {
        let edges = boundaries(&[0.0, 5.0, 10.0]);
        let values = [
            TagValue::new("banana", 100),
            TagValue::new("1,2", 3),
            TagValue::new("9,4", 50),
        ];

        let info = RangeAggregator::aggregate("F", &edges, &values);

        assert_eq!(counts(&info), vec![3, 0]);
        assert_eq!(info.count, 3);
    }

    #[test]
    fn test_no_values_keeps_explicit_empty_buckets() {
        let edges = boundaries(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let info = RangeAggregator::aggregate("F", &edges, &[]);

        assert_eq!(info.count, 0);
        assert_eq!(info.min, 1.0);
        assert_eq!(info.max, 6.0);
        assert_eq!(counts(&info), vec![0; 5]);
    }

    #[test]
    fn test_empty_boundaries_still_count_values() {
        let info =
            RangeAggregator::aggregate("F", &BucketBoundaries::empty(), &[TagValue::new("3", 2)]);
        assert!(info.values.is_empty());
        assert_eq!(info.count, 2);
    }
}
