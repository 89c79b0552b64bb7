/// Number of combinations across pools of the given sizes; 1 when there are no pools.
///
/// Saturates at `u64::MAX` instead of overflowing.
pub fn total_combinations(pool_sizes: &[usize]) -> u64 {
    pool_sizes
        .iter()
        .fold(1u64, |acc, &size| acc.saturating_mul(size as u64))
}

/// Decomposes `global_index` into one local index per pool (mixed-radix addressing).
///
/// The last pool varies fastest, matching the order of a cartesian product. Pools of size
/// zero cannot be addressed and are skipped, so the result can be shorter than the input.
pub fn mixed_radix_indices(global_index: u64, pool_sizes: &[usize]) -> Vec<usize> {
    let mut remaining = global_index;
    let mut local_indices = Vec::with_capacity(pool_sizes.len());

    for &size in pool_sizes.iter().rev() {
        if size == 0 {
            continue;
        }
        let radix = size as u64;
        local_indices.push((remaining % radix) as usize);
        remaining /= radix;
    }

    local_indices.reverse();
    local_indices
}

/// Picks the `global_index`-th combination, one entry per non-empty pool.
pub fn combination_by_index(global_index: u64, pools: &[Vec<String>]) -> Vec<String> {
    let non_empty: Vec<&Vec<String>> = pools.iter().filter(|p| !p.is_empty()).collect();
    let sizes: Vec<usize> = non_empty.iter().map(|p| p.len()).collect();
    mixed_radix_indices(global_index, &sizes)
        .into_iter()
        .zip(non_empty)
        .map(|(local, pool)| pool[local].clone())
        .collect()
}
