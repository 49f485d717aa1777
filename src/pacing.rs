//! Repaint interval rotation.
//!
//! A producer that fires at a near-periodic rate (a simulation ticking at 20 Hz, say) would beat
//! against a single fixed repaint interval and produce visible judder. Rotating through a handful
//! of mutually non-multiple intervals near the nominal value breaks that lock-step.

use crate::error::{PacerError, Result};
use std::time::Duration;

/// Default rotation in milliseconds: primes clustered around 50 ms.
pub const DEFAULT_INTERVALS_MS: [u64; 4] = [47, 53, 43, 59];

/// Cycling list of minimum spacings between redraw starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalRotation {
    intervals: Vec<Duration>,
    cursor: usize,
}

impl IntervalRotation {
    /// Create a rotation from an explicit list. The list must be non-empty and every interval
    /// positive.
    pub fn new(intervals: Vec<Duration>) -> Result<Self> {
        if intervals.is_empty() {
            return Err(PacerError::config("interval rotation must not be empty"));
        }
        if intervals.contains(&Duration::ZERO) {
            return Err(PacerError::config("interval rotation entries must be positive"));
        }
        Ok(Self {
            intervals,
            cursor: 0,
        })
    }

    /// Create a rotation from millisecond values.
    pub fn from_millis(intervals_ms: &[u64]) -> Result<Self> {
        Self::new(
            intervals_ms
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
        )
    }

    /// A rotation that always yields the same interval. A zero interval is raised to one
    /// nanosecond.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            intervals: vec![interval.max(Duration::from_nanos(1))],
            cursor: 0,
        }
    }

    /// Return the current interval and advance, wrapping at the end.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Duration {
        let interval = self.intervals[self.cursor];
        self.cursor = (self.cursor + 1) % self.intervals.len();
        interval
    }

    /// Mean of the rotation, used for display.
    pub fn nominal(&self) -> Duration {
        let total: u128 = self.intervals.iter().map(Duration::as_nanos).sum();
        let mean = total / self.intervals.len() as u128;
        Duration::from_nanos(u64::try_from(mean).unwrap_or(u64::MAX))
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

impl Default for IntervalRotation {
    fn default() -> Self {
        Self {
            intervals: DEFAULT_INTERVALS_MS
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
            cursor: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_wraps_around() {
        let mut rotation = IntervalRotation::from_millis(&[10, 20, 30]).unwrap();
        let taken: Vec<u64> = (0..7).map(|_| rotation.next().as_millis() as u64).collect();
        assert_eq!(taken, vec![10, 20, 30, 10, 20, 30, 10]);
    }

    #[test]
    fn test_fixed_rotation_is_constant() {
        let mut rotation = IntervalRotation::fixed(Duration::from_millis(50));
        for _ in 0..5 {
            assert_eq!(rotation.next(), Duration::from_millis(50));
        }
        assert_eq!(rotation.len(), 1);

        let mut zero = IntervalRotation::fixed(Duration::ZERO);
        assert!(zero.next() > Duration::ZERO);
    }

    #[test]
    fn test_empty_rotation_rejected() {
        assert!(matches!(
            IntervalRotation::new(Vec::new()),
            Err(PacerError::Config { .. })
        ));
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(matches!(
            IntervalRotation::new(vec![Duration::from_millis(40), Duration::ZERO]),
            Err(PacerError::Config { .. })
        ));
        assert!(IntervalRotation::from_millis(&[0]).is_err());
    }

    #[test]
    fn test_nominal_is_mean_of_rotation() {
        let rotation = IntervalRotation::from_millis(&[10, 20, 33]).unwrap();
        assert_eq!(rotation.nominal(), Duration::from_millis(21));

        // Means beyond u64 nanoseconds saturate instead of wrapping.
        let long = IntervalRotation::new(vec![Duration::from_secs(u64::MAX / 2); 3]).unwrap();
        assert_eq!(long.nominal(), Duration::from_nanos(u64::MAX));
    }

    #[test]
    fn test_default_rotation_is_near_fifty_and_non_aligned() {
        let rotation = IntervalRotation::default();
        let nominal = rotation.nominal().as_millis();
        assert!((45..=55).contains(&nominal), "nominal was {nominal}ms");

        for (i, a) in DEFAULT_INTERVALS_MS.iter().enumerate() {
            for b in DEFAULT_INTERVALS_MS.iter().skip(i + 1) {
                assert_ne!(a % b, 0);
                assert_ne!(b % a, 0);
            }
        }
    }
}
