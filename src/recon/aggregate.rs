//! Per-Pool Aggregation
//!
//! Pure summation used identically for raw snapshot totals and for delta
//! rows. A pool id with no entry counts as zero, so pool sets whose
//! membership differs across report variants (two pools vs three) sum
//! without special cases.

use num_bigint::BigInt;
use num_traits::Zero;
use std::collections::BTreeMap;

use crate::models::PoolId;

/// Value for one pool, zero if the map has no entry for it.
pub fn pool_value(values: &BTreeMap<PoolId, BigInt>, pool: PoolId) -> BigInt {
    values.get(&pool).cloned().unwrap_or_else(BigInt::zero)
}

/// Sum the values of the given pools; missing pools contribute zero.
pub fn sum_pools(pools: &[PoolId], values: &BTreeMap<PoolId, BigInt>) -> BigInt {
    pools
        .iter()
        .fold(BigInt::zero(), |acc, &pool| acc + pool_value(values, pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(PoolId, i64)]) -> BTreeMap<PoolId, BigInt> {
        pairs
            .iter()
            .map(|&(pool, v)| (pool, BigInt::from(v)))
            .collect()
    }

    #[test]
    fn test_sum_pools() {
        let v = values(&[(167, 300), (168, 200), (169, 100)]);
        assert_eq!(sum_pools(&[167, 168, 169], &v), BigInt::from(600));
    }

    #[test]
    fn test_missing_pool_counts_as_zero() {
        let v = values(&[(167, 300), (168, 200)]);
        // Report tracks three pools, snapshot only has two.
        assert_eq!(sum_pools(&[167, 168, 169], &v), BigInt::from(500));
        assert_eq!(pool_value(&v, 169), BigInt::from(0));
    }

    #[test]
    fn test_sum_respects_pool_selection() {
        let v = values(&[(167, 300), (168, 200), (169, 100)]);
        // Two-pool report variant ignores the third pool entirely.
        assert_eq!(sum_pools(&[167, 168], &v), BigInt::from(500));
    }

    #[test]
    fn test_negative_values_sum() {
        let v = values(&[(167, -150), (168, 50)]);
        assert_eq!(sum_pools(&[167, 168], &v), BigInt::from(-100));
    }

    #[test]
    fn test_empty() {
        assert_eq!(sum_pools(&[], &values(&[(167, 300)])), BigInt::from(0));
        assert_eq!(sum_pools(&[167], &BTreeMap::new()), BigInt::from(0));
    }
}
