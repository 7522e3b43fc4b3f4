//! Simulated multi-joint servo bus
//!
//! Joints travel toward their goal at a constant speed derived from the
//! profile velocity (0.229 rpm per unit, 4096 ticks per revolution). A
//! velocity of zero means "as fast as possible" and completes instantly.

use core::cell::RefCell;

use heapless::Deque;
use streaker_core::config::{JointId, JointTable, MAX_JOINTS};
use streaker_core::traits::ActuatorPort;

use super::clock::SimDelay;

/// Goal writes kept in the history
pub const HISTORY_LEN: usize = 256;

/// Default profile velocity for joints not in a table
pub const DEFAULT_VELOCITY: u16 = 100;

/// Milliticks per second for one unit of profile velocity
///
/// 0.229 rpm / 60 * 4096 ticks = 15.633 ticks/s
const MILLITICKS_PER_S_PER_UNIT: i64 = 15_633;

const NANOS_PER_S: i64 = 1_000_000_000;

/// Simulated bus errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SimError {
    /// Joint did not answer
    NoResponse(JointId),
}

/// Injected joint fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Healthy joint
    #[default]
    None,
    /// Accepts commands but never moves or reports motion
    Unresponsive,
    /// Reaches its goal the moment it is written
    Instant,
    /// Every bus access fails
    BusError,
}

/// State of one simulated servo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoState {
    /// Goal position (raw)
    pub goal: i32,
    /// Present position (raw / 1000)
    pub position_milliticks: i64,
    /// Profile velocity
    pub velocity: u16,
    /// Injected fault
    pub fault: Fault,
    /// Number of goal writes received
    pub goal_writes: u32,
}

impl ServoState {
    const fn at(raw: i32, velocity: u16) -> Self {
        Self {
            goal: raw,
            position_milliticks: raw as i64 * 1000,
            velocity,
            fault: Fault::None,
            goal_writes: 0,
        }
    }

    /// Present position rounded to whole ticks
    pub fn position(&self) -> i32 {
        let p = self.position_milliticks;
        let rounded = if p >= 0 { (p + 500) / 1000 } else { (p - 500) / 1000 };
        rounded as i32
    }

    /// Check if the servo is travelling
    pub fn is_moving(&self) -> bool {
        self.fault != Fault::Unresponsive && self.position_milliticks != self.goal as i64 * 1000
    }

    fn advance(&mut self, nanos: u64) {
        if self.fault == Fault::Unresponsive {
            return;
        }
        let target = self.goal as i64 * 1000;
        if self.velocity == 0 || self.fault == Fault::Instant {
            self.position_milliticks = target;
            return;
        }
        let step = (self.velocity as i64 * MILLITICKS_PER_S_PER_UNIT)
            .saturating_mul(nanos.min(i64::MAX as u64) as i64)
            / NANOS_PER_S;
        let remaining = target - self.position_milliticks;
        if remaining.abs() <= step {
            self.position_milliticks = target;
        } else {
            self.position_milliticks += step * remaining.signum();
        }
    }
}

/// One recorded goal write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GoalWrite {
    /// Target joint
    pub joint: JointId,
    /// Raw goal
    pub raw: i32,
    /// Bus time of the write (ns)
    pub at_ns: u64,
}

#[derive(Debug)]
struct BusState {
    servos: [ServoState; MAX_JOINTS],
    elapsed_ns: u64,
    moving_reads: u32,
    history: Deque<GoalWrite, HISTORY_LEN>,
}

/// Simulated servo bus shared by a port and a delay handle
#[derive(Debug)]
pub struct SimBus {
    state: RefCell<BusState>,
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBus {
    /// Create a bus with every joint at zero
    pub fn new() -> Self {
        Self {
            state: RefCell::new(BusState {
                servos: [ServoState::at(0, DEFAULT_VELOCITY); MAX_JOINTS],
                elapsed_ns: 0,
                moving_reads: 0,
                history: Deque::new(),
            }),
        }
    }

    /// Create a bus with every table joint resting at its home position
    pub fn from_table(table: &JointTable) -> Self {
        let bus = Self::new();
        {
            let mut state = bus.state.borrow_mut();
            for joint in table.iter() {
                state.servos[joint.id.index()] = ServoState::at(joint.home_raw, joint.profile_velocity);
            }
        }
        bus
    }

    /// Actuator handle
    pub fn port(&self) -> SimPort<'_> {
        SimPort { bus: self }
    }

    /// Delay handle that advances this bus
    pub fn delay(&self) -> SimDelay<'_> {
        SimDelay::new(self)
    }

    /// Inject a fault on a joint
    pub fn set_fault(&self, joint: JointId, fault: Fault) {
        self.state.borrow_mut().servos[joint.index()].fault = fault;
    }

    /// Teleport a joint without commanding it (simulates slip or drift)
    pub fn set_position(&self, joint: JointId, raw: i32) {
        let mut state = self.state.borrow_mut();
        let servo = &mut state.servos[joint.index()];
        servo.position_milliticks = raw as i64 * 1000;
        servo.goal = raw;
    }

    /// Snapshot of a joint
    pub fn servo(&self, joint: JointId) -> ServoState {
        self.state.borrow().servos[joint.index()]
    }

    /// Present position of a joint
    pub fn position(&self, joint: JointId) -> i32 {
        self.servo(joint).position()
    }

    /// Last goal written to a joint
    pub fn goal(&self, joint: JointId) -> i32 {
        self.servo(joint).goal
    }

    /// Goal writes received by a joint
    pub fn goal_writes(&self, joint: JointId) -> u32 {
        self.servo(joint).goal_writes
    }

    /// Moving-flag reads served so far
    pub fn moving_reads(&self) -> u32 {
        self.state.borrow().moving_reads
    }

    /// Simulated time since creation (ms)
    pub fn elapsed_ms(&self) -> u64 {
        self.state.borrow().elapsed_ns / 1_000_000
    }

    /// Most recent goal writes, oldest first
    ///
    /// Only the last [`HISTORY_LEN`] writes are kept.
    pub fn history(&self) -> heapless::Vec<GoalWrite, HISTORY_LEN> {
        self.state.borrow().history.iter().copied().collect()
    }

    /// Advance the clock and move every joint
    pub fn advance_ns(&self, nanos: u64) {
        let mut state = self.state.borrow_mut();
        state.elapsed_ns = state.elapsed_ns.saturating_add(nanos);
        for servo in state.servos.iter_mut() {
            servo.advance(nanos);
        }
    }

    fn access(&self, joint: JointId) -> Result<(), SimError> {
        if self.state.borrow().servos[joint.index()].fault == Fault::BusError {
            return Err(SimError::NoResponse(joint));
        }
        Ok(())
    }
}

/// `ActuatorPort` handle onto a [`SimBus`]
#[derive(Debug, Clone, Copy)]
pub struct SimPort<'a> {
    bus: &'a SimBus,
}

impl ActuatorPort for SimPort<'_> {
    type Error = SimError;

    fn set_goal_raw_position(&mut self, joint: JointId, raw: i32) -> Result<(), SimError> {
        self.bus.access(joint)?;
        let mut state = self.bus.state.borrow_mut();
        let at_ns = state.elapsed_ns;

        let servo = &mut state.servos[joint.index()];
        servo.goal = raw;
        servo.goal_writes += 1;
        if servo.fault == Fault::Instant {
            servo.position_milliticks = raw as i64 * 1000;
        }

        if state.history.is_full() {
            state.history.pop_front();
        }
        let _ = state.history.push_back(GoalWrite { joint, raw, at_ns });
        Ok(())
    }

    fn set_profile_velocity(&mut self, joint: JointId, velocity: u16) -> Result<(), SimError> {
        self.bus.access(joint)?;
        self.bus.state.borrow_mut().servos[joint.index()].velocity = velocity;
        Ok(())
    }

    fn is_moving(&mut self, joint: JointId) -> Result<bool, SimError> {
        self.bus.access(joint)?;
        let mut state = self.bus.state.borrow_mut();
        state.moving_reads += 1;
        Ok(state.servos[joint.index()].is_moving())
    }

    fn present_raw_position(&mut self, joint: JointId) -> Result<i32, SimError> {
        self.bus.access(joint)?;
        Ok(self.bus.servo(joint).position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_travels_at_velocity() {
        let bus = SimBus::new();
        let mut port = bus.port();
        port.set_goal_raw_position(JointId::Platform, 1000).unwrap();
        assert!(port.is_moving(JointId::Platform).unwrap());

        // 100 units = 1563.3 ticks/s
        bus.advance_ns(100_000_000);
        assert_eq!(bus.position(JointId::Platform), 156);
        assert!(port.is_moving(JointId::Platform).unwrap());

        bus.advance_ns(1_000_000_000);
        assert_eq!(bus.position(JointId::Platform), 1000);
        assert!(!port.is_moving(JointId::Platform).unwrap());
    }

    #[test]
    fn test_negative_travel() {
        let bus = SimBus::new();
        let mut port = bus.port();
        port.set_goal_raw_position(JointId::Platform, -500).unwrap();
        bus.advance_ns(2_000_000_000);
        assert_eq!(port.present_raw_position(JointId::Platform), Ok(-500));
    }

    #[test]
    fn test_zero_velocity_is_instant() {
        let bus = SimBus::new();
        let mut port = bus.port();
        port.set_profile_velocity(JointId::PolarArm, 0).unwrap();
        port.set_goal_raw_position(JointId::PolarArm, 3000).unwrap();
        bus.advance_ns(1);
        assert_eq!(bus.position(JointId::PolarArm), 3000);
    }

    #[test]
    fn test_faults() {
        let bus = SimBus::new();
        let mut port = bus.port();

        bus.set_fault(JointId::Handler, Fault::Unresponsive);
        port.set_goal_raw_position(JointId::Handler, 2000).unwrap();
        bus.advance_ns(5_000_000_000);
        assert_eq!(bus.position(JointId::Handler), 0);
        assert!(!port.is_moving(JointId::Handler).unwrap());

        bus.set_fault(JointId::PolarArm, Fault::Instant);
        port.set_goal_raw_position(JointId::PolarArm, 2000).unwrap();
        assert_eq!(bus.position(JointId::PolarArm), 2000);
        assert!(!port.is_moving(JointId::PolarArm).unwrap());

        bus.set_fault(JointId::Platform, Fault::BusError);
        assert_eq!(
            port.is_moving(JointId::Platform),
            Err(SimError::NoResponse(JointId::Platform))
        );
    }

    #[test]
    fn test_from_table_starts_at_home() {
        let table = JointTable::default();
        let bus = SimBus::from_table(&table);
        assert_eq!(bus.position(JointId::Platform), 1238);
        assert_eq!(bus.servo(JointId::LidLifter).velocity, 50);
        assert!(!bus.servo(JointId::Restacker).is_moving());
    }

    #[test]
    fn test_history_is_bounded() {
        let bus = SimBus::new();
        let mut port = bus.port();
        for raw in 0..(HISTORY_LEN as i32 + 10) {
            port.set_goal_raw_position(JointId::Platform, raw).unwrap();
        }
        let history = bus.history();
        assert_eq!(history.len(), HISTORY_LEN);
        assert_eq!(history[0].raw, 10);
        assert_eq!(bus.goal_writes(JointId::Platform), HISTORY_LEN as u32 + 10);
    }
}
