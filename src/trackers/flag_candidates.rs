//! One-shot scored list of road-building candidates
//!
//! Built fresh for every shortcut-road search from one origin flag and
//! discarded after the winner (if any) is chosen. The score favors
//! candidates that shorten logistics while penalizing physically long new
//! roads:
//!
//! `different_economy * 2000 + (start_dist - cand_dist)
//!  + (flag_to_flag_dist - 2 * possible_road_dist)`

use crate::core::types::{Coords, FlagId};

/// Assumed current road distance when the candidate sits in another economy
/// and no road connection exists at all
const DISCONNECTED_ROAD_DIST: u32 = 500;
/// Score bonus for connecting a separate economy
const DIFFERENT_ECONOMY_BONUS: i32 = 2000;

/// One reachable flag considered as road target
#[derive(Debug, Clone)]
pub struct FlagCandidate {
    pub flag: FlagId,
    pub coords: Coords,
    /// Candidate belongs to an economy not yet connected to ours
    pub different_economy: bool,
    /// Candidate flag's cached distance to its nearest warehouse
    pub dist_to_warehouse: u32,
    /// Current road distance between origin and candidate, if connected
    pub flag_to_flag_dist: Option<u32>,
    /// Length of a feasible new road; unset means unbuildable
    pub possible_road_dist: Option<u32>,
    pub air_dist: u32,
}

impl FlagCandidate {
    /// Candidate score given the origin flag's distance to its warehouse
    ///
    /// Only meaningful once `possible_road_dist` is set.
    pub fn score(&self, start_dist: u32) -> i32 {
        let possible = self
            .possible_road_dist
            .expect("score of candidate without feasible road");
        let current = self.flag_to_flag_dist.unwrap_or(DISCONNECTED_ROAD_DIST);
        let economy_bonus = if self.different_economy {
            DIFFERENT_ECONOMY_BONUS
        } else {
            0
        };
        economy_bonus + (start_dist as i32 - self.dist_to_warehouse as i32)
            + (current as i32 - 2 * possible as i32)
    }
}

/// Candidate list for one road search
#[derive(Debug)]
pub struct FlagCandidates {
    /// Origin flag's distance to its nearest warehouse
    start_dist: u32,
    candidates: Vec<FlagCandidate>,
}

impl FlagCandidates {
    pub fn new(start_dist: u32) -> Self {
        Self {
            start_dist,
            candidates: Vec::new(),
        }
    }

    pub fn start_dist(&self) -> u32 {
        self.start_dist
    }

    /// Register a candidate; duplicates are ignored
    pub fn add(
        &mut self,
        flag: FlagId,
        coords: Coords,
        different_economy: bool,
        dist_to_warehouse: u32,
        air_dist: u32,
    ) -> bool {
        if self.has_candidate(flag) {
            return false;
        }
        self.candidates.push(FlagCandidate {
            flag,
            coords,
            different_economy,
            dist_to_warehouse,
            flag_to_flag_dist: None,
            possible_road_dist: None,
            air_dist,
        });
        true
    }

    pub fn has_candidate(&self, flag: FlagId) -> bool {
        self.candidates.iter().any(|c| c.flag == flag)
    }

    pub fn set_road_distance(&mut self, flag: FlagId, distance: u32) {
        if let Some(candidate) = self.candidates.iter_mut().find(|c| c.flag == flag) {
            candidate.flag_to_flag_dist = Some(distance);
        }
    }

    /// Mark the candidate buildable with the given feasible road length
    pub fn set_road_possible(&mut self, flag: FlagId, length: u32) {
        if let Some(candidate) = self.candidates.iter_mut().find(|c| c.flag == flag) {
            candidate.possible_road_dist = Some(length);
        }
    }

    /// Nearest-first order for the expensive feasibility probes
    pub fn sort_by_air_distance(&mut self) {
        self.candidates.sort_by_key(|c| c.air_dist);
    }

    /// Best buildable candidate clearing the threshold
    ///
    /// Candidates without a feasible road length never win; ties break by
    /// insertion order.
    pub fn get_winner(&self, min_score: i32) -> Option<&FlagCandidate> {
        let mut winner: Option<(&FlagCandidate, i32)> = None;
        for candidate in &self.candidates {
            if candidate.possible_road_dist.is_none() {
                continue;
            }
            let score = candidate.score(self.start_dist);
            if score < min_score {
                continue;
            }
            match winner {
                Some((_, best)) if score <= best => {}
                _ => winner = Some((candidate, score)),
            }
        }
        winner.map(|(candidate, _)| candidate)
    }

    pub fn count(&self) -> usize {
        self.candidates.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlagCandidate> {
        self.candidates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords() -> Coords {
        Coords::new(0, 0)
    }

    #[test]
    fn test_no_feasible_road_no_winner() {
        let mut candidates = FlagCandidates::new(10);
        candidates.add(FlagId(1), coords(), false, 5, 3);
        candidates.set_road_distance(FlagId(1), 5);
        // possible_road_dist never set
        assert!(candidates.get_winner(i32::MIN).is_none());
    }

    #[test]
    fn test_score_formula_exact() {
        let mut candidates = FlagCandidates::new(10);
        candidates.add(FlagId(1), coords(), true, 4, 3);
        candidates.set_road_distance(FlagId(1), 7);
        candidates.set_road_possible(FlagId(1), 3);
        let candidate = candidates.iter().next().unwrap();
        // 2000 + (10 - 4) + (7 - 2*3) = 2007
        assert_eq!(candidate.score(10), 2007);
    }

    #[test]
    fn test_shorter_feasible_road_wins() {
        // Identical starting distance (10) and current road distance (5);
        // A needs a road of 4, B one of 2 - B must win.
        let mut candidates = FlagCandidates::new(10);
        candidates.add(FlagId(1), coords(), false, 10, 4);
        candidates.add(FlagId(2), coords(), false, 10, 4);
        candidates.set_road_distance(FlagId(1), 5);
        candidates.set_road_distance(FlagId(2), 5);
        candidates.set_road_possible(FlagId(1), 4);
        candidates.set_road_possible(FlagId(2), 2);
        let winner = candidates.get_winner(i32::MIN).expect("winner expected");
        assert_eq!(winner.flag, FlagId(2));
    }

    #[test]
    fn test_threshold_filters_winner() {
        let mut candidates = FlagCandidates::new(10);
        candidates.add(FlagId(1), coords(), false, 10, 4);
        candidates.set_road_distance(FlagId(1), 5);
        candidates.set_road_possible(FlagId(1), 2);
        // Score: (10-10) + (5-4) = 1
        assert!(candidates.get_winner(2).is_none());
        assert!(candidates.get_winner(1).is_some());
    }

    #[test]
    fn test_tie_breaks_by_insertion_order() {
        let mut candidates = FlagCandidates::new(10);
        candidates.add(FlagId(7), coords(), false, 10, 4);
        candidates.add(FlagId(8), coords(), false, 10, 4);
        for flag in [FlagId(7), FlagId(8)] {
            candidates.set_road_distance(flag, 6);
            candidates.set_road_possible(flag, 3);
        }
        let winner = candidates.get_winner(i32::MIN).expect("winner expected");
        assert_eq!(winner.flag, FlagId(7));
    }

    #[test]
    fn test_duplicate_candidates_rejected() {
        let mut candidates = FlagCandidates::new(10);
        assert!(candidates.add(FlagId(1), coords(), false, 5, 3));
        assert!(!candidates.add(FlagId(1), coords(), false, 5, 3));
        assert_eq!(candidates.count(), 1);
    }

    #[test]
    fn test_sort_by_air_distance() {
        let mut candidates = FlagCandidates::new(10);
        candidates.add(FlagId(1), coords(), false, 5, 9);
        candidates.add(FlagId(2), coords(), false, 5, 2);
        candidates.sort_by_air_distance();
        let first = candidates.iter().next().unwrap();
        assert_eq!(first.flag, FlagId(2));
    }

    #[test]
    fn test_different_economy_dominates() {
        let mut candidates = FlagCandidates::new(10);
        candidates.add(FlagId(1), coords(), false, 2, 3);
        candidates.add(FlagId(2), coords(), true, 30, 3);
        candidates.set_road_distance(FlagId(1), 8);
        candidates.set_road_possible(FlagId(1), 2);
        candidates.set_road_possible(FlagId(2), 9);
        let winner = candidates.get_winner(i32::MIN).expect("winner expected");
        assert_eq!(winner.flag, FlagId(2));
    }
}
