use proptest::prelude::*;

/// Strategy for priorities drawn from a small band so that ties are common
pub fn priority_strategy() -> impl Strategy<Value = i64> {
    0i64..4
}

/// Strategy for the priorities of a chain, in registration order
pub fn chain_priorities_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(priority_strategy(), 1..12)
}

/// Strategy for a chain plus the 0-based chain position that calls `complete()`
pub fn chain_with_completer_strategy() -> impl Strategy<Value = (Vec<i64>, usize)> {
    chain_priorities_strategy().prop_flat_map(|priorities| {
        let len = priorities.len();
        (Just(priorities), 0..len)
    })
}

/// Expected visit order: stable sort of registration indices by priority
pub fn expected_order(priorities: &[i64]) -> Vec<String> {
    let mut indexed: Vec<(i64, usize)> = priorities
        .iter()
        .enumerate()
        .map(|(index, priority)| (*priority, index))
        .collect();
    indexed.sort();
    indexed
        .into_iter()
        .map(|(_, index)| handler_name(index))
        .collect()
}

pub fn handler_name(index: usize) -> String {
    format!("handler-{index:02}")
}
