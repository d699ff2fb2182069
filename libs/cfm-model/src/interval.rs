use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed integer interval `[lower, upper]`, with `upper = None` meaning
/// unbounded (`∞`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub lower: u32,
    pub upper: Option<u32>,
}

impl Interval {
    pub fn new(lower: u32, upper: Option<u32>) -> Result<Self> {
        if let Some(upper) = upper {
            if lower > upper {
                return Err(Error::InvalidInterval { lower, upper });
            }
        }
        Ok(Self { lower, upper })
    }

    /// Unbounded interval `[lower, ∞)`.
    pub fn unbounded(lower: u32) -> Self {
        Self { lower, upper: None }
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.lower && self.upper.map_or(true, |upper| value <= upper)
    }

    pub fn is_unbound(&self) -> bool {
        self.upper.is_none()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upper {
            Some(upper) => write!(f, "{}..{}", self.lower, upper),
            None => write!(f, "{}..*", self.lower),
        }
    }
}

/// An ordered, non-overlapping disjunction of [`Interval`]s. A value
/// satisfies the cardinality iff it falls within any one interval; an
/// empty cardinality accepts nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cardinality {
    intervals: Vec<Interval>,
}

impl Cardinality {
    /// Build a cardinality from intervals already in sorted,
    /// non-overlapping order; validates the ordering invariant (§3.3).
    pub fn new(intervals: Vec<Interval>) -> Result<Self> {
        for window in intervals.windows(2) {
            let [a, b] = window else { unreachable!() };
            let overlaps = match a.upper {
                Some(upper) => upper >= b.lower,
                None => true,
            };
            if a.lower > b.lower || overlaps {
                return Err(Error::UnsortedIntervals(intervals));
            }
        }
        Ok(Self { intervals })
    }

    pub fn empty() -> Self {
        Self { intervals: Vec::new() }
    }

    pub fn single(interval: Interval) -> Self {
        Self { intervals: vec![interval] }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn contains(&self, value: u32) -> bool {
        self.intervals.iter().any(|i| i.contains(value))
    }

    /// The last interval's upper bound, or `None` both when it is
    /// unbounded and when the cardinality itself is empty.
    pub fn last_upper(&self) -> Option<u32> {
        self.intervals.last().and_then(|i| i.upper)
    }

    pub fn is_unbound(&self) -> bool {
        self.intervals.last().is_some_and(Interval::is_unbound)
    }

    /// Every interval endpoint (lower, and upper when finite) across the
    /// whole cardinality, used by the one-wise sampler (§4.4) to build
    /// its assignment set.
    pub fn endpoints(&self) -> impl Iterator<Item = u32> + '_ {
        self.intervals
            .iter()
            .flat_map(|i| std::iter::once(i.lower).chain(i.upper))
    }

    /// Replace the upper bound of the last interval. Used by Big-M (§4.2)
    /// to turn an unbounded cardinality into a bounded one in place.
    pub fn set_last_upper(&mut self, upper: u32) {
        if let Some(last) = self.intervals.last_mut() {
            last.upper = Some(upper);
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.intervals.iter().map(Interval::to_string).collect();
        write!(f, "{}", rendered.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_interval_semantics() {
        let card = Cardinality::new(vec![
            Interval::new(1, Some(10)).unwrap(),
            Interval::new(20, Some(30)).unwrap(),
            Interval::new(40, Some(50)).unwrap(),
        ])
        .unwrap();

        for accepted in [5, 25, 45] {
            assert!(card.contains(accepted), "{accepted} should be accepted");
        }
        for rejected in [15, 35, 55] {
            assert!(!card.contains(rejected), "{rejected} should be rejected");
        }
    }

    #[test]
    fn empty_cardinality_contains_nothing() {
        let card = Cardinality::empty();
        assert!(!card.contains(0));
        assert!(!card.contains(1));
    }

    #[test]
    fn unbound_interval_contains_large_values() {
        let interval = Interval::unbounded(5);
        assert!(interval.contains(5));
        assert!(interval.contains(1_000_000));
        assert!(!interval.contains(4));
    }

    #[test]
    fn rejects_inverted_interval() {
        assert_eq!(
            Interval::new(10, Some(5)),
            Err(Error::InvalidInterval { lower: 10, upper: 5 })
        );
    }

    #[test]
    fn rejects_overlapping_intervals() {
        let result = Cardinality::new(vec![
            Interval::new(0, Some(10)).unwrap(),
            Interval::new(5, Some(15)).unwrap(),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn endpoints_include_lower_and_finite_upper() {
        let card = Cardinality::new(vec![
            Interval::new(0, Some(2)).unwrap(),
            Interval::new(5, Some(7)).unwrap(),
            Interval::new(10, Some(10)).unwrap(),
        ])
        .unwrap();
        let mut endpoints: Vec<u32> = card.endpoints().collect();
        endpoints.sort_unstable();
        endpoints.dedup();
        assert_eq!(endpoints, vec![0, 2, 5, 7, 10]);
    }

    #[test]
    fn display_renders_star_for_unbounded() {
        let interval = Interval::unbounded(3);
        assert_eq!(interval.to_string(), "3..*");
    }
}
