use serde::{Deserialize, Deserializer, Serialize};

use crate::EPSILON;
use crate::error::InputError;

/// One finished-length requirement: cut `qty` bars of `length`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandLine {
    pub length: f64,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub qty: u32,
}

impl DemandLine {
    pub fn new(length: f64, qty: u32) -> Self {
        Self { length, qty }
    }
}

impl std::fmt::Display for DemandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v {}", self.qty, self.length)
    }
}

/// Multiset of demand lines, at most one line per distinct length and never
/// a line with quantity zero. Ordering is only meaningful after an explicit
/// sort; equality ignores it.
#[derive(Debug, Clone, Default)]
pub struct DemandSet {
    lines: Vec<DemandLine>,
}

impl DemandSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = DemandLine>,
    {
        let mut set = Self::new();
        for line in lines {
            set.add(line.length, line.qty);
        }
        set
    }

    pub fn lines(&self) -> &[DemandLine] {
        &self.lines
    }

    pub fn add(&mut self, length: f64, qty: u32) {
        if qty == 0 {
            return;
        }
        for line in &mut self.lines {
            if line.length == length {
                line.qty += qty;
                return;
            }
        }
        self.lines.push(DemandLine::new(length, qty));
    }

    /// Add a single bar of the given length.
    pub fn add_len(&mut self, length: f64) {
        self.add(length, 1);
    }

    pub fn merge(&mut self, other: &DemandSet) {
        for line in &other.lines {
            self.add(line.length, line.qty);
        }
    }

    /// Subtract `other` from this set. Returns false and leaves `self`
    /// untouched if any quantity would go negative.
    pub fn try_subtract(&mut self, other: &DemandSet) -> bool {
        let mut result = self.lines.clone();
        for line in &other.lines {
            let Some(own) = result.iter_mut().find(|l| l.length == line.length) else {
                return false;
            };
            if own.qty < line.qty {
                return false;
            }
            own.qty -= line.qty;
        }
        result.retain(|l| l.qty > 0);
        self.lines = result;
        true
    }

    pub fn sort_asc(&mut self) {
        self.lines.sort_by(|a, b| a.length.total_cmp(&b.length));
    }

    pub fn sort_desc(&mut self) {
        self.lines.sort_by(|a, b| b.length.total_cmp(&a.length));
    }

    /// Remove and return one bar's length from the first line.
    pub fn pop_len(&mut self) -> Option<f64> {
        let first = self.lines.first_mut()?;
        let length = first.length;
        first.qty -= 1;
        if first.qty == 0 {
            self.lines.remove(0);
        }
        Some(length)
    }

    /// Total consumed length over all lines.
    pub fn total_len(&self) -> f64 {
        self.lines
            .iter()
            .map(|l| l.length * f64::from(l.qty))
            .sum()
    }

    /// Total number of finished bars.
    pub fn unit_count(&self) -> u32 {
        self.lines.iter().map(|l| l.qty).sum()
    }

    pub fn qty_of(&self, length: f64) -> u32 {
        self.lines
            .iter()
            .find(|l| l.length == length)
            .map_or(0, |l| l.qty)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub(crate) fn shift_lengths(&mut self, delta: f64) {
        for line in &mut self.lines {
            line.length += delta;
        }
    }
}

impl PartialEq for DemandSet {
    fn eq(&self, other: &Self) -> bool {
        let mut a = self.clone();
        let mut b = other.clone();
        a.sort_asc();
        b.sort_asc();
        a.lines == b.lines
    }
}

/// The cuts taken from a single stock bar. Construction enforces that the
/// cuts fit the stock length.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    cuts: DemandSet,
}

impl Pattern {
    /// Returns None if the cuts exceed the stock length.
    pub fn new(cuts: DemandSet, stock_len: f64) -> Option<Self> {
        if cuts.total_len() > stock_len + EPSILON {
            return None;
        }
        Some(Self { cuts })
    }

    pub fn cuts(&self) -> &DemandSet {
        &self.cuts
    }

    pub fn total_len(&self) -> f64 {
        self.cuts.total_len()
    }

    pub fn leftover(&self, stock_len: f64) -> f64 {
        stock_len - self.total_len()
    }

    pub fn qty_of(&self, length: f64) -> u32 {
        self.cuts.qty_of(length)
    }

    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.cuts.lines().iter().map(|l| l.to_string()).collect();
        write!(f, "{}", parts.join(" + "))
    }
}

/// How many stock bars to cut with each pattern. Backed by a Vec so that
/// iteration order is deterministic; patterns are deduplicated structurally
/// on insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Solution {
    entries: Vec<(Pattern, u32)>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pattern: Pattern, count: u32) {
        if count == 0 {
            return;
        }
        for (existing, n) in &mut self.entries {
            if *existing == pattern {
                *n += count;
                return;
            }
        }
        self.entries.push((pattern, count));
    }

    pub fn entries(&self) -> &[(Pattern, u32)] {
        &self.entries
    }

    /// Number of stock bars consumed.
    pub fn total_stock_bars(&self) -> u32 {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    /// Units of `length` cut across all patterns.
    pub fn covered_qty(&self, length: f64) -> u32 {
        self.entries
            .iter()
            .map(|(p, n)| p.qty_of(length) * n)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn denormalize(&mut self, kerf: f64) {
        for (pattern, _) in &mut self.entries {
            pattern.cuts.shift_lengths(-kerf);
        }
    }
}

/// Forbidden leftover band: waste strictly between the bounds is illegal,
/// because it is too large to ignore and too small to reuse as stock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub min_leftover: f64,
    pub max_leftover: f64,
}

impl Window {
    pub fn new(min_leftover: f64, max_leftover: f64) -> Result<Self, InputError> {
        if !(min_leftover >= 0.0 && max_leftover >= min_leftover) {
            return Err(InputError::InvalidWindow {
                min: min_leftover,
                max: max_leftover,
            });
        }
        Ok(Self {
            min_leftover,
            max_leftover,
        })
    }

    /// True when the leftover falls outside the forbidden band.
    pub fn permits(&self, leftover: f64) -> bool {
        leftover <= self.min_leftover + EPSILON || leftover >= self.max_leftover - EPSILON
    }
}

/// Accepts JSON numbers like `3.0` for quantities, rejecting negatives and
/// fractions.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative integer, got {value}"
        )));
    }
    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pairs: &[(f64, u32)]) -> DemandSet {
        DemandSet::from_lines(pairs.iter().map(|&(l, q)| DemandLine::new(l, q)))
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = set(&[(5.0, 2)]);
        let mut copy = original.clone();
        assert_eq!(copy.pop_len(), Some(5.0));
        assert_eq!(copy.unit_count(), 1);
        assert_eq!(original.unit_count(), 2);
        assert_eq!(original.pop_len(), Some(5.0));
    }

    #[test]
    fn test_merge_sums_shared_lengths() {
        let mut a = set(&[(5.0, 2), (6.0, 1)]);
        let b = set(&[(6.0, 1), (7.0, 2)]);
        a.merge(&b);
        a.sort_asc();
        for expected in [5.0, 5.0, 6.0, 6.0, 7.0, 7.0] {
            assert_eq!(a.pop_len(), Some(expected));
        }
        assert!(a.is_empty());
    }

    #[test]
    fn test_merge_into_empty() {
        let mut a = DemandSet::new();
        a.merge(&set(&[(5.0, 2)]));
        assert_eq!(a.unit_count(), 2);
    }

    #[test]
    fn test_add_len() {
        let mut sut = set(&[(5.0, 2), (6.0, 1)]);
        sut.add_len(7.0);
        assert_eq!(sut.unit_count(), 4);
        sut.sort_asc();
        for expected in [5.0, 5.0, 6.0, 7.0] {
            assert_eq!(sut.pop_len(), Some(expected));
        }
    }

    #[test]
    fn test_add_zero_qty_is_dropped() {
        let mut sut = DemandSet::new();
        sut.add(5.0, 0);
        assert!(sut.is_empty());
        assert!(sut.lines().is_empty());
    }

    #[test]
    fn test_sort_asc_then_pop() {
        let mut sut = set(&[(6.0, 1), (5.0, 2)]);
        sut.sort_asc();
        for expected in [5.0, 5.0, 6.0] {
            assert_eq!(sut.pop_len(), Some(expected));
        }
        assert_eq!(sut.pop_len(), None);
    }

    #[test]
    fn test_sort_desc() {
        let mut sut = set(&[(5.0, 1), (8.0, 1), (6.0, 1)]);
        sut.sort_desc();
        let lens: Vec<f64> = sut.lines().iter().map(|l| l.length).collect();
        assert_eq!(lens, vec![8.0, 6.0, 5.0]);
    }

    #[test]
    fn test_pop_len_removes_exhausted_line() {
        let mut sut = set(&[(5.0, 1), (6.0, 1)]);
        assert_eq!(sut.pop_len(), Some(5.0));
        assert_eq!(sut.lines().len(), 1);
        assert_eq!(sut.pop_len(), Some(6.0));
        assert!(sut.is_empty());
    }

    #[test]
    fn test_total_len() {
        assert_eq!(set(&[(5.0, 2)]).total_len(), 10.0);
        assert_eq!(set(&[(5.0, 2), (6.0, 1)]).total_len(), 16.0);
        assert_eq!(DemandSet::new().total_len(), 0.0);
    }

    #[test]
    fn test_unit_count() {
        assert_eq!(set(&[(5.0, 2), (6.0, 1)]).unit_count(), 3);
        assert_eq!(DemandSet::new().unit_count(), 0);
    }

    #[test]
    fn test_try_subtract_success() {
        let mut sut = set(&[(5.0, 3), (6.0, 1)]);
        assert!(sut.try_subtract(&set(&[(5.0, 2), (6.0, 1)])));
        assert_eq!(sut.qty_of(5.0), 1);
        assert_eq!(sut.qty_of(6.0), 0);
        assert_eq!(sut.lines().len(), 1);
    }

    #[test]
    fn test_try_subtract_failure_leaves_set_untouched() {
        let mut sut = set(&[(5.0, 1)]);
        assert!(!sut.try_subtract(&set(&[(5.0, 2)])));
        assert_eq!(sut.qty_of(5.0), 1);
        assert!(!sut.try_subtract(&set(&[(9.0, 1)])));
        assert_eq!(sut.unit_count(), 1);
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = set(&[(5.0, 2), (6.0, 1)]);
        let b = set(&[(6.0, 1), (5.0, 2)]);
        assert_eq!(a, b);
        assert_ne!(a, set(&[(5.0, 2)]));
        assert_ne!(a, set(&[(5.0, 2), (6.0, 2)]));
    }

    #[test]
    fn test_pattern_rejects_overfull_cuts() {
        assert!(Pattern::new(set(&[(600.0, 2)]), 1000.0).is_none());
        let p = Pattern::new(set(&[(600.0, 1), (200.0, 2)]), 1000.0).unwrap();
        assert_eq!(p.total_len(), 1000.0);
        assert_eq!(p.leftover(1000.0), 0.0);
    }

    #[test]
    fn test_solution_merges_structurally_equal_patterns() {
        let mut solution = Solution::new();
        let p1 = Pattern::new(set(&[(600.0, 1), (200.0, 2)]), 1000.0).unwrap();
        let p2 = Pattern::new(set(&[(200.0, 2), (600.0, 1)]), 1000.0).unwrap();
        solution.add(p1, 1);
        solution.add(p2, 2);
        assert_eq!(solution.entries().len(), 1);
        assert_eq!(solution.total_stock_bars(), 3);
        assert_eq!(solution.covered_qty(200.0), 6);
    }

    #[test]
    fn test_window_permits() {
        let window = Window::new(30.0, 200.0).unwrap();
        assert!(window.permits(0.0));
        assert!(window.permits(30.0));
        assert!(!window.permits(100.0));
        assert!(window.permits(200.0));
        assert!(window.permits(350.0));
    }

    #[test]
    fn test_window_rejects_inverted_bounds() {
        assert!(Window::new(200.0, 30.0).is_err());
        assert!(Window::new(-1.0, 30.0).is_err());
    }

    #[test]
    fn test_display_contract() {
        let line = DemandLine::new(600.0, 4);
        assert_eq!(line.to_string(), "4v 600");
        let p = Pattern::new(set(&[(600.0, 1), (200.5, 2)]), 1001.5).unwrap();
        assert_eq!(p.to_string(), "1v 600 + 2v 200.5");
    }
}
