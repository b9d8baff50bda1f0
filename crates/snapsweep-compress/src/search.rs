//! Binary search for the highest JPEG quality that fits a byte budget.
//!
//! The search only sees a size function `f(q)`, so it is independent of the
//! encoder. For any `f` that is non-decreasing in `q` the result is the largest
//! `q` in `[Quality::MIN, Quality::MAX]` with `f(q) <= budget`, or
//! `Quality::MIN` when no level fits.

use std::fmt;

use serde::{Deserialize, Serialize};

/// JPEG quality level used by the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quality(u8);

impl Quality {
    /// Lowest level the search will go down to.
    pub const MIN: Quality = Quality(10);
    /// Level tried first; also the ceiling of the search range.
    pub const MAX: Quality = Quality(95);

    /// Create a quality level, clamped to `[MIN, MAX]`.
    pub fn new(value: u8) -> Self {
        Self(value.clamp(Self::MIN.0, Self::MAX.0))
    }

    /// Get the raw encoder value.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Iterate every level from `MIN` to `MAX` inclusive.
    pub fn all() -> impl DoubleEndedIterator<Item = Quality> {
        (Self::MIN.0..=Self::MAX.0).map(Quality)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One measurement taken during the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probe {
    /// Search bounds when the probe was taken (equal to `quality` on the fast path).
    pub low: u8,
    pub high: u8,
    /// Level that was encoded.
    pub quality: Quality,
    /// Encoded size in bytes.
    pub size_bytes: u64,
    /// Whether `size_bytes` was within the budget.
    pub accepted: bool,
}

/// Result of a quality search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Best level found (`Quality::MIN` if nothing fit).
    pub quality: Quality,
    /// True when the single probe at `Quality::MAX` already fit.
    pub fast_path: bool,
    /// Every probe in the order it was taken.
    pub probes: Vec<Probe>,
}

impl SearchOutcome {
    /// Check whether any probe fit the budget.
    pub fn found_fit(&self) -> bool {
        self.probes.iter().any(|p| p.accepted)
    }

    /// Size measured for the chosen quality, if it was probed.
    pub fn size_at_choice(&self) -> Option<u64> {
        self.probes
            .iter()
            .rev()
            .find(|p| p.quality == self.quality)
            .map(|p| p.size_bytes)
    }
}

/// Find the highest quality whose encoded size is at most `budget` bytes.
///
/// `size_at` is called once at `Quality::MAX`; if that fits, the search stops
/// there. Otherwise it runs an integer binary search with `low = 10`,
/// `high = 95`, `mid = (low + high) / 2`. Errors from `size_at` abort the
/// search.
pub fn search_quality<F, E>(budget: u64, mut size_at: F) -> Result<SearchOutcome, E>
where
    F: FnMut(Quality) -> Result<u64, E>,
{
    let mut probes = Vec::new();

    let top = Quality::MAX;
    let size = size_at(top)?;
    let accepted = size <= budget;
    probes.push(Probe {
        low: top.0,
        high: top.0,
        quality: top,
        size_bytes: size,
        accepted,
    });
    if accepted {
        tracing::debug!(quality = top.0, size, budget, "fast path");
        return Ok(SearchOutcome {
            quality: top,
            fast_path: true,
            probes,
        });
    }

    let mut low = Quality::MIN.0;
    let mut high = Quality::MAX.0;
    let mut best = Quality::MIN;

    while low <= high {
        let mid = Quality((low + high) / 2);
        let size = size_at(mid)?;
        let accepted = size <= budget;
        tracing::debug!(low, high, quality = mid.0, size, budget, accepted, "probe");
        probes.push(Probe {
            low,
            high,
            quality: mid,
            size_bytes: size,
            accepted,
        });

        if accepted {
            best = mid;
            low = mid.0 + 1;
        } else {
            // mid >= 10 here, so this cannot underflow.
            high = mid.0 - 1;
        }
    }

    Ok(SearchOutcome {
        quality: best,
        fast_path: false,
        probes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn linear(q: Quality) -> Result<u64, Infallible> {
        Ok(q.get() as u64 * 1000)
    }

    #[test]
    fn test_quality_clamps() {
        assert_eq!(Quality::new(0), Quality::MIN);
        assert_eq!(Quality::new(100), Quality::MAX);
        assert_eq!(Quality::new(50).get(), 50);
        assert_eq!(Quality::all().count(), 86);
    }

    #[test]
    fn test_fast_path_single_probe() {
        let outcome = search_quality(95_000, linear).unwrap();
        assert_eq!(outcome.quality, Quality::MAX);
        assert!(outcome.fast_path);
        assert_eq!(outcome.probes.len(), 1);
    }

    #[test]
    fn test_probe_sequence() {
        // Fits at q <= 60.
        let outcome = search_quality(60_000, linear).unwrap();
        let mids: Vec<u8> = outcome.probes.iter().map(|p| p.quality.get()).collect();
        assert_eq!(mids, vec![95, 52, 74, 63, 57, 60, 61]);
        assert_eq!(outcome.quality.get(), 60);
        assert!(!outcome.fast_path);
        assert_eq!(outcome.size_at_choice(), Some(60_000));

        let bounds: Vec<(u8, u8)> = outcome.probes[1..].iter().map(|p| (p.low, p.high)).collect();
        assert_eq!(
            bounds,
            vec![(10, 95), (53, 95), (53, 73), (53, 62), (58, 62), (61, 62)]
        );
    }

    #[test]
    fn test_nothing_fits_returns_min() {
        let outcome = search_quality(5, linear).unwrap();
        assert_eq!(outcome.quality, Quality::MIN);
        assert!(!outcome.found_fit());
        // Last probe drives high below low at the bottom of the range.
        assert_eq!(outcome.probes.last().unwrap().quality, Quality::MIN);
    }

    #[test]
    fn test_error_aborts_search() {
        let mut calls = 0;
        let result: Result<SearchOutcome, &str> = search_quality(10, |_| {
            calls += 1;
            if calls == 2 {
                Err("encoder failed")
            } else {
                Ok(1_000)
            }
        });
        assert_eq!(result.unwrap_err(), "encoder failed");
        assert_eq!(calls, 2);
    }
}
