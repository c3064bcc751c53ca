//! Unique-number raffle: each name draws a number from `1..=max` no one else holds

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{RecordsError, Result};
use crate::export;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaffleEntry {
    pub name: String,
    pub number: u32,
}

#[derive(Debug, Clone, Default)]
pub struct RaffleDraw {
    max: Option<u32>,
    results: Vec<RaffleEntry>,
    used: BTreeSet<u32>,
}

impl RaffleDraw {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the upper bound of the range.
    ///
    /// Moving an existing range while results exist discards them, so it is
    /// refused unless `force` is set. Returns whether results were discarded.
    pub fn set_range(&mut self, max: i64, force: bool) -> Result<bool> {
        if max < 1 {
            return Err(RecordsError::InvalidRange(max));
        }
        let requested = u32::try_from(max).map_err(|_| RecordsError::InvalidRange(max))?;

        let mut cleared = false;
        if let Some(current) = self.max {
            if current != requested && !self.results.is_empty() {
                if !force {
                    return Err(RecordsError::RangeChangeNeedsConfirmation {
                        current,
                        requested,
                        drawn: self.results.len(),
                    });
                }
                tracing::info!(
                    "Raffle range {} -> {} cleared {} results",
                    current,
                    requested,
                    self.results.len()
                );
                self.results.clear();
                self.used.clear();
                cleared = true;
            }
        }

        self.max = Some(requested);
        Ok(cleared)
    }

    /// Draw a free number for `name`
    pub fn draw(&mut self, name: &str, rng: &mut fastrand::Rng) -> Result<&RaffleEntry> {
        let max = self.max.ok_or(RecordsError::RangeNotSet)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(RecordsError::EmptyName);
        }

        let free = (max as usize).saturating_sub(self.used.len());
        if free == 0 {
            return Err(RecordsError::Exhausted { max });
        }

        let number = if self.used.len() * 2 <= max as usize {
            // sparse: retry until a free number comes up, two tries on average at worst
            loop {
                let candidate = rng.u32(1..=max);
                if !self.used.contains(&candidate) {
                    break candidate;
                }
            }
        } else {
            // dense: k-th unused number, uniform over the free set
            let k = rng.usize(..free);
            (1..=max)
                .filter(|n| !self.used.contains(n))
                .nth(k)
                .ok_or(RecordsError::Exhausted { max })?
        };

        self.used.insert(number);
        self.results.push(RaffleEntry { name: name.to_string(), number });
        tracing::debug!("Raffle: {} drew {}", name, number);

        let idx = self.results.len() - 1;
        Ok(&self.results[idx])
    }

    pub fn max(&self) -> Option<u32> {
        self.max
    }

    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    /// Results in draw order
    pub fn results(&self) -> &[RaffleEntry] {
        &self.results
    }

    pub fn results_sorted(&self) -> Vec<&RaffleEntry> {
        let mut sorted: Vec<&RaffleEntry> = self.results.iter().collect();
        sorted.sort_by_key(|entry| entry.number);
        sorted
    }

    pub fn summary(&self) -> String {
        match self.max {
            Some(max) => format!("range 1 ~ {} (used: {})", max, self.used.len()),
            None => "range not set".to_string(),
        }
    }

    /// Export body: `name : number` lines ascending by number
    pub fn export_lines(&self) -> Result<String> {
        if self.results.is_empty() {
            return Err(RecordsError::NothingToExport);
        }
        Ok(export::raffle_lines(&self.results))
    }

    pub fn clear(&mut self) {
        self.results.clear();
        self.used.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> fastrand::Rng {
        fastrand::Rng::with_seed(7)
    }

    #[test]
    fn test_draw_requires_range_and_name() {
        let mut raffle = RaffleDraw::new();
        let mut rng = rng();
        assert!(matches!(raffle.draw("Kim", &mut rng), Err(RecordsError::RangeNotSet)));

        raffle.set_range(10, false).unwrap();
        assert!(matches!(raffle.draw("   ", &mut rng), Err(RecordsError::EmptyName)));
        assert_eq!(raffle.used_count(), 0);
    }

    #[test]
    fn test_invalid_range() {
        let mut raffle = RaffleDraw::new();
        assert!(matches!(raffle.set_range(0, false), Err(RecordsError::InvalidRange(0))));
        assert!(matches!(raffle.set_range(-4, true), Err(RecordsError::InvalidRange(-4))));
        assert_eq!(raffle.max(), None);
    }

    #[test]
    fn test_draws_every_number_once_then_exhausts() {
        let mut raffle = RaffleDraw::new();
        let mut rng = rng();
        raffle.set_range(5, false).unwrap();

        for i in 0..5 {
            let entry = raffle.draw(&format!(" p{} ", i), &mut rng).unwrap();
            assert!((1..=5).contains(&entry.number));
            assert_eq!(entry.name, format!("p{}", i));
        }
        assert!(matches!(raffle.draw("late", &mut rng), Err(RecordsError::Exhausted { max: 5 })));

        let numbers: Vec<u32> = raffle.results_sorted().iter().map(|e| e.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert_eq!(raffle.summary(), "range 1 ~ 5 (used: 5)");
    }

    #[test]
    fn test_range_change_needs_confirmation() {
        let mut raffle = RaffleDraw::new();
        let mut rng = rng();
        raffle.set_range(10, false).unwrap();
        raffle.draw("Kim", &mut rng).unwrap();

        // same range is a no-op
        assert!(!raffle.set_range(10, false).unwrap());
        assert!(matches!(
            raffle.set_range(20, false),
            Err(RecordsError::RangeChangeNeedsConfirmation { current: 10, requested: 20, drawn: 1 })
        ));
        assert_eq!(raffle.results().len(), 1);

        assert!(raffle.set_range(20, true).unwrap());
        assert!(raffle.results().is_empty());
        assert_eq!(raffle.summary(), "range 1 ~ 20 (used: 0)");
    }

    #[test]
    fn test_range_change_without_results_is_free() {
        let mut raffle = RaffleDraw::new();
        raffle.set_range(10, false).unwrap();
        assert!(!raffle.set_range(3, false).unwrap());
        assert_eq!(raffle.max(), Some(3));
    }

    #[test]
    fn test_export_lines() {
        let mut raffle = RaffleDraw::new();
        assert!(matches!(raffle.export_lines(), Err(RecordsError::NothingToExport)));

        let mut rng = rng();
        raffle.set_range(2, false).unwrap();
        let first = raffle.draw("Kim", &mut rng).unwrap().number;
        raffle.draw("Lee", &mut rng).unwrap();

        let expected = if first == 1 { "Kim : 1\nLee : 2" } else { "Lee : 1\nKim : 2" };
        assert_eq!(raffle.export_lines().unwrap(), expected);
    }

    #[test]
    fn test_draws_from_a_huge_range_are_quick() {
        let mut raffle = RaffleDraw::new();
        let mut rng = rng();
        raffle.set_range(i64::from(u32::MAX), false).unwrap();

        let started = std::time::Instant::now();
        for i in 0..1000 {
            raffle.draw(&format!("p{}", i), &mut rng).unwrap();
        }
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
        assert_eq!(raffle.used_count(), 1000);
    }

    #[test]
    fn test_draws_cover_the_range() {
        // each number in a small range shows up as a first draw eventually
        let mut seen = BTreeSet::new();
        let mut rng = rng();
        for _ in 0..200 {
            let mut raffle = RaffleDraw::new();
            raffle.set_range(4, false).unwrap();
            seen.insert(raffle.draw("x", &mut rng).unwrap().number);
        }
        assert_eq!(seen.into_iter().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }
}
