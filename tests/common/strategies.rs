//! Proptest strategies for claim status strings.

use proptest::prelude::*;

/// Lowercase alphanumeric core of a status label
pub fn status_core_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,16}"
}

/// Separators that normalisation must ignore
pub fn separator_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec![' ', '-', '_', '.', '/', '(', ')']), 0..3)
        .prop_map(|chars| chars.into_iter().collect())
}

/// `core` re-cased at random with separators sprinkled between characters
pub fn decorated_status_strategy(core: String) -> impl Strategy<Value = String> {
    let len = core.len();
    (
        prop::collection::vec(any::<bool>(), len),
        prop::collection::vec(separator_strategy(), len + 1),
    )
        .prop_map(move |(upper, separators)| {
            let mut decorated = separators[0].clone();
            for (i, c) in core.chars().enumerate() {
                decorated.push(if upper[i] { c.to_ascii_uppercase() } else { c });
                decorated.push_str(&separators[i + 1]);
            }
            decorated
        })
}
