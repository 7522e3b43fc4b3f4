//! Simulated delay source
//!
//! Implements `embedded_hal::delay::DelayNs` by advancing the bus clock
//! instead of sleeping.

use embedded_hal::delay::DelayNs;

use super::bus::SimBus;

/// Delay handle onto a [`SimBus`]
#[derive(Debug, Clone, Copy)]
pub struct SimDelay<'a> {
    bus: &'a SimBus,
}

impl<'a> SimDelay<'a> {
    /// Create a delay that advances `bus`
    pub fn new(bus: &'a SimBus) -> Self {
        Self { bus }
    }
}

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.bus.advance_ns(ns as u64);
    }

    fn delay_us(&mut self, us: u32) {
        self.bus.advance_ns(us as u64 * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.bus.advance_ns(ms as u64 * 1_000_000);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streaker_core::config::JointId;
    use streaker_core::traits::ActuatorPort;

    #[test]
    fn test_delay_advances_clock() {
        let bus = SimBus::new();
        let mut delay = bus.delay();
        delay.delay_ms(250);
        delay.delay_us(500);
        delay.delay_ns(500_000);
        assert_eq!(bus.elapsed_ms(), 251);
    }

    #[test]
    fn test_delay_moves_joints() {
        let bus = SimBus::new();
        let mut port = bus.port();
        let mut delay = bus.delay();
        port.set_goal_raw_position(JointId::PolarArm, 100).unwrap();
        delay.delay_ms(1000);
        assert_eq!(bus.position(JointId::PolarArm), 100);
    }
}
