//! Branch selection
//!
//! Picks the solver branch that moves the joints the least from the last
//! commanded pose.

use super::solver::JointSolution;

/// Result of choosing between two candidates
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Selection {
    /// Index of the chosen candidate (0 or 1)
    pub index: usize,
    /// The chosen candidate
    pub chosen: JointSolution,
    /// Travel cost of each candidate (radians)
    pub costs: [f32; 2],
}

/// Travel cost of a candidate
///
/// Without a previous pose only the platform rotation counts, which keeps
/// the first move close to the platform zero.
pub fn travel_cost(current: Option<JointSolution>, candidate: &JointSolution) -> f32 {
    match current {
        None => libm::fabsf(candidate.platform_angle),
        Some(current) => {
            libm::fabsf(candidate.lever_angle - current.lever_angle)
                + libm::fabsf(candidate.platform_angle - current.platform_angle)
        }
    }
}

/// Choose the cheaper candidate; ties go to the first
///
/// `current` is `None` before the first move.
pub fn select(current: Option<JointSolution>, candidates: &[JointSolution; 2]) -> Selection {
    let costs = [
        travel_cost(current, &candidates[0]),
        travel_cost(current, &candidates[1]),
    ];
    let index = if costs[0] <= costs[1] { 0 } else { 1 };
    Selection {
        index,
        chosen: candidates[index],
        costs,
    }
}
