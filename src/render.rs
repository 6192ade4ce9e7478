//! Plain-text report of a solution. The line format
//! `"{stock} {count} {pattern}"` (with patterns as `"{qty}v {length}"`
//! joined by `" + "`) is a stable contract for downstream reporting.

use crate::types::{Pattern, Solution};

pub fn render_entry(stock_len: f64, count: u32, pattern: &Pattern) -> String {
    format!("{} {} {}", stock_len, count, pattern)
}

pub fn render_solution(solution: &Solution, stock_len: f64) -> String {
    let mut out = String::new();
    for (pattern, count) in solution.entries() {
        out.push_str(&render_entry(stock_len, *count, pattern));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DemandLine, DemandSet};

    fn pattern(pairs: &[(f64, u32)], stock_len: f64) -> Pattern {
        let cuts = DemandSet::from_lines(pairs.iter().map(|&(l, q)| DemandLine::new(l, q)));
        Pattern::new(cuts, stock_len).unwrap()
    }

    #[test]
    fn test_render_entry() {
        let p = pattern(&[(600.0, 1), (200.0, 2)], 1000.0);
        assert_eq!(render_entry(1000.0, 3, &p), "1000 3 1v 600 + 2v 200");
    }

    #[test]
    fn test_render_fractional_lengths() {
        let p = pattern(&[(601.5, 1)], 1001.5);
        assert_eq!(render_entry(1001.5, 1, &p), "1001.5 1 1v 601.5");
    }

    #[test]
    fn test_render_solution_one_line_per_entry() {
        let mut solution = Solution::new();
        solution.add(pattern(&[(600.0, 1)], 1000.0), 2);
        solution.add(pattern(&[(200.0, 5)], 1000.0), 1);
        let text = render_solution(&solution, 1000.0);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["1000 2 1v 600", "1000 1 5v 200"]);
    }

    #[test]
    fn test_render_empty_solution() {
        assert_eq!(render_solution(&Solution::new(), 1000.0), "");
    }
}
