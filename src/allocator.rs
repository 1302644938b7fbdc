//! Smallest-fit allocator: given the ranges currently occupied by live
//! entries, choose where a new entry of a given size should land.
//!
//! Only entry-to-entry gaps are considered — not the gap between the
//! 20-byte archive prefix and the first entry. This mirrors the original
//! allocator exactly (an open question in spec.md, resolved by preserving
//! the behavior as documented there): the very first entry in an archive
//! always lands at end-of-file, and only deletions open interior gaps
//! this policy can later reuse.

use crate::error::{ArchiveError, Result};

/// Pick an absolute offset for a new entry of `entry_size` bytes, given the
/// `[begin, end)` ranges currently occupied by live entries and the
/// current end-of-file offset.
pub fn place(entry_size: u64, occupied: &[(u64, u64)], end_offset: u64) -> Result<u64> {
    let mut ranges = occupied.to_vec();
    ranges.sort_unstable();
    check_no_overlaps(&ranges)?;

    let mut best: Option<(u64, u64)> = None; // (gap_size, gap_start)
    for w in ranges.windows(2) {
        let (_, prev_end) = w[0];
        let (next_start, _) = w[1];
        let gap = next_start - prev_end;
        if gap == 0 || gap < entry_size {
            continue;
        }
        if gap == entry_size {
            return Ok(prev_end);
        }
        match best {
            Some((best_gap, _)) if best_gap <= gap => {}
            _ => best = Some((gap, prev_end)),
        }
    }

    Ok(best.map(|(_, start)| start).unwrap_or(end_offset))
}

/// Check a set of `[begin, end)` ranges for pairwise overlap. `ranges` must
/// already be sorted.
pub fn check_no_overlaps(ranges: &[(u64, u64)]) -> Result<()> {
    for w in ranges.windows(2) {
        let (_, prev_end) = w[0];
        let (next_start, _) = w[1];
        if next_start < prev_end {
            return Err(ArchiveError::Corrupted(
                "entry ranges overlap".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_archive_appends_at_end() {
        assert_eq!(place(100, &[], 20).unwrap(), 20);
    }

    #[test]
    fn no_fitting_hole_appends_at_end() {
        let occupied = [(20u64, 50u64), (50, 80)];
        assert_eq!(place(100, &occupied, 200).unwrap(), 200);
    }

    #[test]
    fn exact_fit_hole_reused() {
        let occupied = [(20u64, 50u64), (150, 200)];
        // gap between 50 and 150 is exactly 100 bytes
        assert_eq!(place(100, &occupied, 300).unwrap(), 50);
    }

    #[test]
    fn smallest_fitting_hole_chosen_over_larger() {
        let occupied = [(0u64, 10u64), (60, 70), (200, 210)];
        // gaps: [10,60)=50, [70,200)=130; need >=40, smallest fit is 50
        assert_eq!(place(40, &occupied, 1000).unwrap(), 10);
    }

    #[test]
    fn ties_pick_earliest_gap() {
        let occupied = [(0u64, 10u64), (30, 40), (60, 70)];
        // gaps: [10,30)=20, [40,60)=20 -- tie, earliest wins
        assert_eq!(place(20, &occupied, 1000).unwrap(), 10);
    }

    #[test]
    fn overlapping_ranges_are_corrupted() {
        let occupied = [(0u64, 50u64), (20, 80)];
        assert!(place(10, &occupied, 1000).is_err());
    }

    #[test]
    fn adjacent_touching_ranges_are_not_a_gap() {
        let occupied = [(0u64, 50u64), (50, 100)];
        assert_eq!(place(1, &occupied, 1000).unwrap(), 1000);
    }
}
