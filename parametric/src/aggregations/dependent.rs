use super::types::RecursiveField;

/// Drop zero-count nodes at every depth of a dependent value tree
pub fn prune_zero_counts(fields: Vec<RecursiveField>) -> Vec<RecursiveField> {
    fields
        .into_iter()
        .filter(|field| field.count > 0)
        .map(|field| RecursiveField {
            fields: prune_zero_counts(field.fields),
            ..field
        })
        .collect()
}
