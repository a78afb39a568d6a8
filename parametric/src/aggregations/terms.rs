use super::entry::RawEntry;
use super::types::{QueryTagInfo, TagValue};
use crate::request::{FieldName, SortParam};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Build the categorical result for one field.
///
/// Duplicate values are merged, zero counts dropped, the rest sorted and
/// truncated to `max_values`. Returns `None` when nothing is left, so empty
/// fields never appear in results.
pub fn aggregate_tag_values(
    field: &FieldName,
    values: Vec<TagValue>,
    sort: SortParam,
    max_values: Option<usize>,
) -> Option<QueryTagInfo> {
    let mut merged: Vec<TagValue> = Vec::with_capacity(values.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for tag in values {
        if tag.count == 0 {
            continue;
        }
        match positions.get(&tag.value) {
            Some(&i) => merged[i].count = merged[i].count.saturating_add(tag.count),
            None => {
                positions.insert(tag.value.clone(), merged.len());
                merged.push(tag);
            }
        }
    }

    sort_values(&mut merged, sort);
    if let Some(limit) = max_values {
        merged.truncate(limit);
    }

    if merged.is_empty() {
        return None;
    }

    Some(QueryTagInfo {
        id: field.id().to_string(),
        name: field.display_name(),
        values: merged,
    })
}

fn sort_values(values: &mut [TagValue], sort: SortParam) {
    match sort {
        SortParam::DocumentCount => values.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| alphabetical(&a.value, &b.value))
        }),
        SortParam::Alphabetical => values.sort_by(|a, b| alphabetical(&a.value, &b.value)),
        SortParam::ReverseAlphabetical => {
            values.sort_by(|a, b| alphabetical(&b.value, &a.value))
        }
        SortParam::NumberIncreasing => values.sort_by(|a, b| numeric(a, b, false)),
        SortParam::NumberDecreasing => values.sort_by(|a, b| numeric(a, b, true)),
        SortParam::Off => {}
    }
}

fn alphabetical(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Numbers (or range lower bounds) first in numeric order, then anything
/// non-numeric alphabetically
fn numeric(a: &TagValue, b: &TagValue, descending: bool) -> Ordering {
    match (numeric_key(a), numeric_key(b)) {
        (Some(x), Some(y)) => {
            let ord = x.total_cmp(&y);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => alphabetical(&a.value, &b.value),
    }
}

fn numeric_key(tag: &TagValue) -> Option<f64> {
    RawEntry::classify(tag).ok()?.span().map(|(low, _)| low)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, u64)]) -> Vec<TagValue> {
        pairs.iter().map(|(v, c)| TagValue::new(*v, *c)).collect()
    }

    fn keys(info: &QueryTagInfo) -> Vec<&str> {
        info.values.iter().map(|t| t.value.as_str()).collect()
    }

    #[test]
    fn test_document_count_order_with_ties() {
        let field = FieldName::from("DOCUMENT/CATEGORY");
        let info = aggregate_tag_values(
            &field,
            values(&[("beta", 2), ("alpha", 2), ("gamma", 9)]),
            SortParam::DocumentCount,
            None,
        )
        .unwrap();

        assert_eq!(info.id, "CATEGORY");
        assert_eq!(info.name, "Category");
        assert_eq!(keys(&info), vec!["gamma", "alpha", "beta"]);
    }

    #[test]
    fn test_zero_counts_dropped_and_duplicates_merged() {
        let info = aggregate_tag_values(
            &FieldName::from("F"),
            values(&[("a", 1), ("b", 0), ("a", 4)]),
            SortParam::Off,
            None,
        )
        .unwrap();

        assert_eq!(info.values, vec![TagValue::new("a", 5)]);
    }

    #[test]
    fn test_all_zero_is_none() {
        let result = aggregate_tag_values(
            &FieldName::from("F"),
            values(&[("a", 0), ("b", 0)]),
            SortParam::DocumentCount,
            None,
        );
        assert!(result.is_none());
        assert!(
            aggregate_tag_values(&FieldName::from("F"), vec![], SortParam::Off, None).is_none()
        );
    }

    #[test]
    fn test_truncation() {
        let info = aggregate_tag_values(
            &FieldName::from("F"),
            values(&[("a", 1), ("b", 3), ("c", 2)]),
            SortParam::DocumentCount,
            Some(2),
        )
        .unwrap();
        assert_eq!(keys(&info), vec!["b", "c"]);
    }

    #[test]
    fn test_alphabetical_orders() {
        let raw = values(&[("banana", 1), ("Apple", 1), ("cherry", 1)]);
        let field = FieldName::from("F");

        let asc =
            aggregate_tag_values(&field, raw.clone(), SortParam::Alphabetical, None).unwrap();
        assert_eq!(keys(&asc), vec!["Apple", "banana", "cherry"]);

        let desc =
            aggregate_tag_values(&field, raw, SortParam::ReverseAlphabetical, None).unwrap();
        assert_eq!(keys(&desc), vec!["cherry", "banana", "Apple"]);
    }

    #[test]
    fn test_numeric_orders_put_text_last() {
        let raw = values(&[("10", 1), ("n/a", 1), ("2", 1), ("5,7", 1)]);
        let field = FieldName::from("F");

        let inc =
            aggregate_tag_values(&field, raw.clone(), SortParam::NumberIncreasing, None).unwrap();
        assert_eq!(keys(&inc), vec!["2", "5,7", "10", "n/a"]);

        let dec = aggregate_tag_values(&field, raw, SortParam::NumberDecreasing, None).unwrap();
        assert_eq!(keys(&dec), vec!["10", "5,7", "2", "n/a"]);
    }
}
