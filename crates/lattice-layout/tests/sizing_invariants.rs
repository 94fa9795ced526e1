//! Property-based invariant tests for proportional sizing.
//!
//! 1. Relative sizes always come back complete, non-negative and summing to 100
//! 2. Totals already at 100 with nothing missing are returned unchanged
//! 3. Absolute sizes fill the available extent exactly
//! 4. Splitters plus children occupy the whole container when it fits them
//! 5. The minimum item width is honoured whenever the row can afford it

use lattice_layout::sizing::{
    available_extent, calculate_absolute_sizes, calculate_relative_sizes, respect_min_item_width,
};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn size_strategy() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        1 => Just(None),
        4 => (0.0f64..400.0).prop_map(Some),
    ]
}

fn sizes_strategy() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(size_strategy(), 1..12)
}

/// Shares that already sum to 100.
fn shares_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..100.0, 1..12).prop_map(|raw| {
        let mut sizes: Vec<Option<f64>> = raw.into_iter().map(Some).collect();
        calculate_relative_sizes(&mut sizes)
    })
}

// ═══════════════════════════════════════════════════════════════════════
// 1-2. Relative sizes
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn relative_sizes_are_complete_and_sum_to_hundred(mut sizes in sizes_strategy()) {
        let shares = calculate_relative_sizes(&mut sizes);
        prop_assert_eq!(shares.len(), sizes.len());
        prop_assert!(sizes.iter().all(Option::is_some));
        prop_assert!(shares.iter().all(|s| s.is_finite() && *s >= 0.0));
        let total: f64 = shares.iter().sum();
        prop_assert!((total - 100.0).abs() < 1e-6, "total {}", total);
    }

    #[test]
    fn normalised_sizes_are_a_fixed_point(mut sizes in sizes_strategy()) {
        let shares = calculate_relative_sizes(&mut sizes);
        let mut again: Vec<Option<f64>> = shares.iter().copied().map(Some).collect();
        prop_assert_eq!(calculate_relative_sizes(&mut again), shares);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3-4. Absolute sizes
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn absolute_sizes_fill_available(
        shares in shares_strategy(),
        total in 0u32..4000,
        splitter in 0u32..12,
    ) {
        let sizes = calculate_absolute_sizes(&shares, total, splitter);
        prop_assert_eq!(sizes.item_sizes.len(), shares.len());
        prop_assert_eq!(sizes.available, available_extent(total, shares.len(), splitter));
        let sum: u32 = sizes.item_sizes.iter().sum();
        prop_assert_eq!(sum, sizes.available);
    }

    #[test]
    fn children_and_splitters_cover_the_container(
        shares in shares_strategy(),
        total in 200u32..4000,
        splitter in 0u32..12,
    ) {
        let sizes = calculate_absolute_sizes(&shares, total, splitter);
        prop_assert_eq!(sizes.occupied(splitter), u64::from(total));
    }

    #[test]
    fn additional_pixels_stay_below_child_count(
        shares in shares_strategy(),
        total in 0u32..4000,
    ) {
        let sizes = calculate_absolute_sizes(&shares, total, 5);
        prop_assert!((sizes.additional_pixel as usize) <= shares.len());
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5. Minimum item width
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn min_width_is_honoured_when_affordable(
        mut shares in shares_strategy(),
        available in 100u32..3000,
        min in 1u32..60,
    ) {
        prop_assume!(shares.len() > 1);
        prop_assume!(u64::from(min) * shares.len() as u64 <= u64::from(available));
        respect_min_item_width(&mut shares, available, min);
        let px = calculate_absolute_sizes(&shares, available, 0).item_sizes;
        prop_assert!(px.iter().all(|&w| w >= min), "{:?}", px);
        prop_assert_eq!(px.iter().sum::<u32>(), available);
    }

    #[test]
    fn min_width_leaves_unaffordable_rows_alone(
        shares in shares_strategy(),
        min in 1u32..60,
    ) {
        prop_assume!(shares.len() > 1);
        let available = (min * shares.len() as u32).saturating_sub(1).max(1);
        let mut adjusted = shares.clone();
        respect_min_item_width(&mut adjusted, available, min);
        prop_assert_eq!(adjusted, shares);
    }
}
