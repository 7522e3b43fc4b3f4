//! Servo actuator trait
//!
//! This trait abstracts over the smart-servo bus (goal position registers,
//! moving flag, present position). The core never frames bus packets
//! itself; it only issues these capability calls.

use crate::config::JointId;

/// Trait for a bus of position-controlled servos
///
/// Raw positions use 4096 ticks per revolution. Single-turn joints accept
/// 0-4095; joints in extended position mode accept any signed value.
pub trait ActuatorPort {
    /// Error type for bus operations
    type Error;

    /// Command a joint to a raw goal position
    fn set_goal_raw_position(&mut self, joint: JointId, raw: i32) -> Result<(), Self::Error>;

    /// Set the profile velocity used for subsequent moves
    fn set_profile_velocity(&mut self, joint: JointId, velocity: u16) -> Result<(), Self::Error>;

    /// Check if a joint is currently in motion
    fn is_moving(&mut self, joint: JointId) -> Result<bool, Self::Error>;

    /// Read the measured raw position of a joint
    fn present_raw_position(&mut self, joint: JointId) -> Result<i32, Self::Error>;

    /// Check if any joint in the set is moving
    ///
    /// Every joint is read even after a moving one is found, matching a
    /// full status sweep of the bus.
    fn any_moving(&mut self, joints: JointSet<'_>) -> Result<bool, Self::Error> {
        let mut moving = false;
        for joint in joints.iter() {
            moving |= self.is_moving(joint)?;
        }
        Ok(moving)
    }
}

/// Joints polled by a motion barrier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointSet<'a> {
    /// A single joint
    One(JointId),
    /// An explicit list of joints
    Some(&'a [JointId]),
    /// Every joint on the machine
    All,
}

impl<'a> JointSet<'a> {
    /// Iterate over the joints in this set
    pub fn iter(self) -> impl Iterator<Item = JointId> + 'a {
        let (single, list): (Option<JointId>, &'a [JointId]) = match self {
            JointSet::One(joint) => (Some(joint), &[]),
            JointSet::Some(joints) => (None, joints),
            JointSet::All => (None, &JointId::ALL),
        };
        single.into_iter().chain(list.iter().copied())
    }

    /// Check if the set contains a joint
    pub fn contains(self, joint: JointId) -> bool {
        self.iter().any(|j| j == joint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_set_one() {
        let set = JointSet::One(JointId::Platform);
        assert_eq!(set.iter().count(), 1);
        assert!(set.contains(JointId::Platform));
        assert!(!set.contains(JointId::PolarArm));
    }

    #[test]
    fn test_joint_set_some() {
        let joints = [JointId::PolarArm, JointId::Platform];
        let set = JointSet::Some(&joints);
        assert_eq!(set.iter().count(), 2);
        assert!(set.contains(JointId::PolarArm));
        assert!(!set.contains(JointId::Handler));
    }

    #[test]
    fn test_joint_set_all() {
        let set = JointSet::All;
        assert_eq!(set.iter().count(), JointId::ALL.len());
        for joint in JointId::ALL {
            assert!(set.contains(joint));
        }
    }
}
