//! Classification of raw source entries
//!
//! Sources report numeric fields as a mix of plain values (`"7"`),
//! pre-aggregated sub-ranges (`"1,6"`, open-ended `"21,"` / `",5"`) and
//! summary markers (min, max, total count). Everything is classified into a
//! [`RawEntry`] before any bucketing math runs.

use super::types::{Bucket, NumericSummary, TagValue};
use crate::error::{Error, Result};

const RANGE_SEPARATOR: char = ',';

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawEntry {
    SingleValue {
        value: f64,
        count: u64,
    },
    /// `None` bounds are open on that side
    SubRange {
        low: Option<f64>,
        high: Option<f64>,
        count: u64,
    },
    MinMarker(f64),
    MaxMarker(f64),
    CountMarker(u64),
}

impl RawEntry {
    /// Classify a value-bearing tag as a single value or a sub-range
    pub fn classify(tag: &TagValue) -> Result<Self> {
        let raw = tag.value.trim();
        if raw.is_empty() {
            return Err(malformed(&tag.value, "empty value"));
        }

        let Some((low, high)) = raw.split_once(RANGE_SEPARATOR) else {
            return Ok(RawEntry::SingleValue {
                value: parse_number(raw, &tag.value)?,
                count: tag.count,
            });
        };

        if high.contains(RANGE_SEPARATOR) {
            return Err(malformed(&tag.value, "more than two range bounds"));
        }

        let low = parse_bound(low, &tag.value)?;
        let high = parse_bound(high, &tag.value)?;

        match (low, high) {
            (None, None) => Err(malformed(&tag.value, "range has no bounds")),
            (Some(l), Some(h)) if l > h => Err(malformed(&tag.value, "range low exceeds high")),
            (Some(l), Some(h)) if l == h => Ok(RawEntry::SingleValue {
                value: l,
                count: tag.count,
            }),
            (low, high) => Ok(RawEntry::SubRange {
                low,
                high,
                count: tag.count,
            }),
        }
    }

    /// Occurrence count carried by a value-bearing entry; markers carry none
    pub fn count(&self) -> u64 {
        match self {
            RawEntry::SingleValue { count, .. } | RawEntry::SubRange { count, .. } => *count,
            _ => 0,
        }
    }

    /// Covered span with open ends widened to infinity
    pub fn span(&self) -> Option<(f64, f64)> {
        match *self {
            RawEntry::SingleValue { value, .. } => Some((value, value)),
            RawEntry::SubRange { low, high, .. } => Some((
                low.unwrap_or(f64::NEG_INFINITY),
                high.unwrap_or(f64::INFINITY),
            )),
            _ => None,
        }
    }
}

impl NumericSummary {
    /// Fold classified entries into a first-pass summary.
    ///
    /// Explicit markers win over bounds observed in value entries. Closed
    /// sub-ranges become the coarse partition.
    pub fn from_entries(entries: impl IntoIterator<Item = RawEntry>) -> Self {
        let mut min_marker = None;
        let mut max_marker = None;
        let mut count_marker = None;
        let mut observed_min: Option<f64> = None;
        let mut observed_max: Option<f64> = None;
        let mut value_total = 0u64;
        let mut buckets = Vec::new();

        for entry in entries {
            match entry {
                RawEntry::MinMarker(v) => min_marker = Some(v),
                RawEntry::MaxMarker(v) => max_marker = Some(v),
                RawEntry::CountMarker(c) => count_marker = Some(c),
                RawEntry::SingleValue { value, count } => {
                    value_total = value_total.saturating_add(count);
                    observed_min = Some(observed_min.map_or(value, |m| m.min(value)));
                    observed_max = Some(observed_max.map_or(value, |m| m.max(value)));
                }
                RawEntry::SubRange { low, high, count } => {
                    value_total = value_total.saturating_add(count);
                    if let Some(l) = low {
                        observed_min = Some(observed_min.map_or(l, |m| m.min(l)));
                    }
                    if let Some(h) = high {
                        observed_max = Some(observed_max.map_or(h, |m| m.max(h)));
                    }
                    if let (Some(l), Some(h)) = (low, high) {
                        buckets.push(Bucket::new(count, l, h));
                    }
                }
            }
        }

        buckets.sort_by(|a, b| a.range_start.total_cmp(&b.range_start));

        NumericSummary {
            min: min_marker.or(observed_min),
            max: max_marker.or(observed_max),
            total_count: count_marker.unwrap_or(value_total),
            buckets,
        }
    }
}

fn parse_bound(raw: &str, whole: &str) -> Result<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        Ok(None)
    } else {
        parse_number(raw, whole).map(Some)
    }
}

fn parse_number(raw: &str, whole: &str) -> Result<f64> {
    let value: f64 = raw
        .parse()
        .map_err(|_| malformed(whole, &format!("'{raw}' is not a number")))?;
    if !value.is_finite() {
        return Err(malformed(whole, "value is not finite"));
    }
    Ok(value)
}

fn malformed(value: &str, reason: &str) -> Error {
    Error::MalformedValue {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(value: &str) -> Result<RawEntry> {
        RawEntry::classify(&TagValue::new(value, 3))
    }

    #[test]
    fn test_classify_single_value() {
        assert_eq!(
            classify(" 42.5 ").unwrap(),
            RawEntry::SingleValue {
                value: 42.5,
                count: 3
            }
        );
    }

    #[test]
    fn test_classify_closed_and_open_ranges() {
        assert_eq!(
            classify("1,6").unwrap(),
            RawEntry::SubRange {
                low: Some(1.0),
                high: Some(6.0),
                count: 3
            }
        );
        assert_eq!(
            classify("21,").unwrap(),
            RawEntry::SubRange {
                low: Some(21.0),
                high: None,
                count: 3
            }
        );
        assert_eq!(
            classify(",5").unwrap(),
            RawEntry::SubRange {
                low: None,
                high: Some(5.0),
                count: 3
            }
        );
    }

    #[test]
    fn test_classify_degenerate_range_is_single_value() {
        assert_eq!(
            classify("4,4").unwrap(),
            RawEntry::SingleValue {
                value: 4.0,
                count: 3
            }
        );
    }

    #[test]
    fn test_classify_rejects_malformed() {
        for bad in ["", "abc", ",", "1,2,3", "6,1", "NaN", "inf,"] {
            assert!(
                matches!(classify(bad), Err(Error::MalformedValue { .. })),
                "expected '{bad}' to be malformed"
            );
        }
    }

    #[test]
    fn test_open_span_widens_to_infinity() {
        let entry = classify("21,").unwrap();
        assert_eq!(entry.span(), Some((21.0, f64::INFINITY)));
        assert_eq!(RawEntry::MinMarker(1.0).span(), None);
        assert_eq!(RawEntry::CountMarker(8).count(), 0);
    }

    #[test]
    fn test_summary_markers_win() {
        let summary = NumericSummary::from_entries([
            RawEntry::MinMarker(1.0),
            RawEntry::MaxMarker(21.0),
            RawEntry::CountMarker(8),
            classify("6,11").unwrap(),
            classify("1,6").unwrap(),
        ]);

        assert_eq!(summary.min, Some(1.0));
        assert_eq!(summary.max, Some(21.0));
        assert_eq!(summary.total_count, 8);
        assert_eq!(
            summary.buckets,
            vec![Bucket::new(3, 1.0, 6.0), Bucket::new(3, 6.0, 11.0)]
        );
    }

    #[test]
    fn test_summary_derived_from_values() {
        let summary = NumericSummary::from_entries([
            RawEntry::SingleValue {
                value: 7.0,
                count: 2,
            },
            RawEntry::SingleValue {
                value: 3.0,
                count: 1,
            },
            RawEntry::SubRange {
                low: Some(10.0),
                high: None,
                count: 4,
            },
        ]);

        assert_eq!(summary.min, Some(3.0));
        assert_eq!(summary.max, Some(7.0));
        assert_eq!(summary.total_count, 7);
        assert!(summary.buckets.is_empty());
    }

    #[test]
    fn test_summary_of_nothing_is_empty() {
        assert!(NumericSummary::from_entries([]).is_empty());
    }
}
