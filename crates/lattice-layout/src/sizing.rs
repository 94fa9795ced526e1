#![forbid(unsafe_code)]

//! Proportional sizing for rows and columns.
//!
//! Children of a row or column carry relative sizes that should sum to 100.
//! [`calculate_relative_sizes`] repairs missing or inconsistent values,
//! [`respect_min_item_width`] pulls narrow row children up to the minimum,
//! and [`calculate_absolute_sizes`] turns shares into whole pixels that fill
//! the container exactly once splitters are subtracted.

/// Floor slack so shares like `33.333...` of 300 land on 100, not 99.
const FLOOR_EPSILON: f64 = 1e-6;

/// Totals within this distance of 100 are left untouched.
///
/// Float sums such as three thirds land a few ulps off 100 and must keep
/// their saved values. Rounded totals such as `33 + 33 + 33` are off by a
/// whole share and still get rescaled.
const TOTAL_TOLERANCE: f64 = 1e-6;

/// Normalize relative sizes so every entry is set and they sum to 100.
///
/// 1. Sum the defined sizes.
/// 2. Total already 100 with nothing missing: keep values as they are.
/// 3. Total below 100 with entries missing: split the remainder evenly
///    among the missing entries.
/// 4. Otherwise give every missing entry 50.
/// 5. Rescale everything to a total of 100.
///
/// All-zero input becomes equal shares.
pub fn calculate_relative_sizes(sizes: &mut [Option<f64>]) -> Vec<f64> {
    if sizes.is_empty() {
        return Vec::new();
    }
    let sanitize = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
    let mut total: f64 = sizes.iter().flatten().copied().map(sanitize).sum();
    let missing = sizes.iter().filter(|s| s.is_none()).count();

    if missing == 0 && (total - 100.0).abs() <= TOTAL_TOLERANCE {
        return sizes.iter().flatten().copied().collect();
    }

    if missing > 0 {
        let fill = if total < 100.0 {
            (100.0 - total) / missing as f64
        } else {
            50.0
        };
        for size in sizes.iter_mut().filter(|s| s.is_none()) {
            *size = Some(fill);
            total += fill;
        }
        if (total - 100.0).abs() <= TOTAL_TOLERANCE {
            return sizes.iter().flatten().copied().collect();
        }
    }

    let count = sizes.len() as f64;
    for size in sizes.iter_mut() {
        let value = sanitize(size.unwrap_or(0.0));
        *size = Some(if total > 0.0 {
            value / total * 100.0
        } else {
            100.0 / count
        });
    }
    sizes.iter().flatten().copied().collect()
}

/// Pixel split of a row or column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsoluteSizes {
    /// Per-child pixel sizes along the layout axis.
    pub item_sizes: Vec<u32>,
    /// Extent left for children after splitters.
    pub available: u32,
    /// Pixels handed out one by one to the leading children.
    pub additional_pixel: u32,
}

impl AbsoluteSizes {
    /// Sum of child sizes plus the splitters between them.
    #[must_use]
    pub fn occupied(&self, splitter: u32) -> u64 {
        let gaps = self.item_sizes.len().saturating_sub(1) as u64 * u64::from(splitter);
        self.item_sizes.iter().map(|&s| u64::from(s)).sum::<u64>() + gaps
    }
}

/// Extent left for `count` children once `count - 1` splitters are removed.
#[must_use]
pub fn available_extent(total: u32, count: usize, splitter: u32) -> u32 {
    let gaps = u32::try_from(count.saturating_sub(1)).unwrap_or(u32::MAX);
    total.saturating_sub(gaps.saturating_mul(splitter))
}

/// Convert shares (summing to 100) into whole pixels filling `total`.
///
/// Each child gets `floor(available * share / 100)`; the pixels lost to
/// flooring go one each to the first children.
#[must_use]
pub fn calculate_absolute_sizes(shares: &[f64], total: u32, splitter: u32) -> AbsoluteSizes {
    let available = available_extent(total, shares.len(), splitter);
    let mut item_sizes: Vec<u32> = shares
        .iter()
        .map(|&share| {
            let px = (f64::from(available) * share / 100.0 + FLOOR_EPSILON).floor();
            px.clamp(0.0, f64::from(available)) as u32
        })
        .collect();
    let assigned: u64 = item_sizes.iter().map(|&s| u64::from(s)).sum();
    let mut additional_pixel = 0;
    if !item_sizes.is_empty() {
        let n = item_sizes.len();
        if assigned <= u64::from(available) {
            additional_pixel = available - assigned as u32;
            for k in 0..additional_pixel as usize {
                item_sizes[k % n] += 1;
            }
        } else {
            let mut excess = assigned - u64::from(available);
            for size in item_sizes.iter_mut().rev() {
                let take = excess.min(u64::from(*size));
                *size -= take as u32;
                excess -= take;
                if excess == 0 {
                    break;
                }
            }
        }
    }
    AbsoluteSizes {
        item_sizes,
        available,
        additional_pixel,
    }
}

/// Raise row children narrower than `min_item_width` and take the pixels
/// proportionally from the children that have room to spare.
///
/// Does nothing for a single child, when nothing is under the minimum, or
/// when the row cannot fit every child at the minimum. Rounding leftovers
/// are absorbed from the last children that can give them up.
pub fn respect_min_item_width(shares: &mut [f64], available: u32, min_item_width: u32) {
    let n = shares.len();
    if n <= 1 || min_item_width == 0 || available == 0 {
        return;
    }
    let min = i64::from(min_item_width);
    let sizes = calculate_absolute_sizes(shares, available, 0).item_sizes;

    let mut entries: Vec<i64> = Vec::with_capacity(n);
    let mut under = 0_i64;
    let mut over = 0_i64;
    let mut over_indices = Vec::new();
    for (index, &size) in sizes.iter().enumerate() {
        let size = i64::from(size);
        if size < min {
            under += min - size;
            entries.push(min);
        } else {
            over += size - min;
            over_indices.push(index);
            entries.push(size);
        }
    }
    if under == 0 || under > over {
        return;
    }

    let ratio = under as f64 / over as f64;
    let mut remaining = under;
    for &index in &over_indices {
        let reduce = ((entries[index] - min) as f64 * ratio).round() as i64;
        entries[index] -= reduce;
        remaining -= reduce;
    }
    if remaining > 0 {
        for entry in entries.iter_mut().rev() {
            let take = (*entry - min).clamp(0, remaining);
            *entry -= take;
            remaining -= take;
            if remaining == 0 {
                break;
            }
        }
    } else if remaining < 0 {
        if let Some(last) = entries.last_mut() {
            *last -= remaining;
        }
    }

    let available = f64::from(available);
    for (share, entry) in shares.iter_mut().zip(entries) {
        *share = entry as f64 / available * 100.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn exact_hundred_is_untouched() {
        let mut sizes = [Some(30.0), Some(70.0)];
        assert_eq!(calculate_relative_sizes(&mut sizes), vec![30.0, 70.0]);
    }

    #[test]
    fn float_thirds_keep_their_saved_values() {
        let third = 100.0 / 3.0;
        let mut sizes = [Some(third), Some(third), Some(third)];
        assert_eq!(calculate_relative_sizes(&mut sizes), vec![third, third, third]);
    }

    #[test]
    fn rounded_thirds_are_rescaled() {
        let mut sizes = [Some(33.0), Some(33.0), Some(33.0)];
        let shares = calculate_relative_sizes(&mut sizes);
        assert!(shares.iter().all(|&s| close(s, 100.0 / 3.0)));
    }

    #[test]
    fn all_missing_become_equal() {
        let mut sizes = [None, None, None];
        let shares = calculate_relative_sizes(&mut sizes);
        assert!(shares.iter().all(|&s| close(s, 100.0 / 3.0)));
    }

    #[test]
    fn missing_share_the_remainder() {
        let mut sizes = [Some(40.0), None, None];
        assert_eq!(calculate_relative_sizes(&mut sizes), vec![40.0, 30.0, 30.0]);
    }

    #[test]
    fn missing_with_full_total_get_fifty_then_rescale() {
        let mut sizes = [Some(50.0), Some(50.0), None];
        let shares = calculate_relative_sizes(&mut sizes);
        for share in shares {
            assert!(close(share, 100.0 / 3.0));
        }
    }

    #[test]
    fn oversized_total_rescales() {
        let mut sizes = [Some(100.0), Some(100.0)];
        assert_eq!(calculate_relative_sizes(&mut sizes), vec![50.0, 50.0]);
    }

    #[test]
    fn undersized_total_rescales() {
        let mut sizes = [Some(20.0), Some(20.0)];
        assert_eq!(calculate_relative_sizes(&mut sizes), vec![50.0, 50.0]);
    }

    #[test]
    fn zero_total_gives_equal_shares() {
        let mut sizes = [Some(0.0), Some(0.0)];
        assert_eq!(calculate_relative_sizes(&mut sizes), vec![50.0, 50.0]);
    }

    #[test]
    fn three_thirds_of_300_with_splitters() {
        let shares = [100.0 / 3.0; 3];
        let sizes = calculate_absolute_sizes(&shares, 300, 5);
        assert_eq!(sizes.available, 290);
        assert_eq!(sizes.item_sizes, vec![97, 97, 96]);
        assert_eq!(sizes.additional_pixel, 2);
        assert_eq!(sizes.occupied(5), 300);
    }

    #[test]
    fn single_child_has_no_splitter() {
        let sizes = calculate_absolute_sizes(&[100.0], 123, 5);
        assert_eq!(sizes.item_sizes, vec![123]);
    }

    #[test]
    fn tiny_container_saturates() {
        let sizes = calculate_absolute_sizes(&[50.0, 50.0], 3, 5);
        assert_eq!(sizes.available, 0);
        assert_eq!(sizes.item_sizes, vec![0, 0]);
    }

    #[test]
    fn min_width_pulls_narrow_child_up() {
        let mut shares = [2.0, 49.0, 49.0];
        respect_min_item_width(&mut shares, 400, 50);
        let px = calculate_absolute_sizes(&shares, 400, 0).item_sizes;
        assert_eq!(px[0], 50);
        assert_eq!(px.iter().sum::<u32>(), 400);
        assert!(px.iter().all(|&w| w >= 50));
        assert!(close(shares.iter().sum::<f64>(), 100.0));
    }

    #[test]
    fn min_width_gives_up_when_row_too_small() {
        let mut shares = [10.0, 90.0];
        respect_min_item_width(&mut shares, 60, 40);
        assert_eq!(shares, [10.0, 90.0]);
    }

    #[test]
    fn min_width_noop_when_all_fit() {
        let mut shares = [50.0, 50.0];
        respect_min_item_width(&mut shares, 400, 10);
        assert_eq!(shares, [50.0, 50.0]);
    }
}
