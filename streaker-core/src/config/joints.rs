//! Joint table
//!
//! Every servo on the machine is described by one small record (bus id,
//! operating mode, home position, speed, named positions) and looked up
//! by [`JointId`].

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum joints per config
pub const MAX_JOINTS: usize = 8;

/// Named servo on the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum JointId {
    /// Lid lifter arm
    LidLifter,
    /// Polar arm (the lever)
    PolarArm,
    /// Rotating platform
    Platform,
    /// Dish handler carousel
    Handler,
    /// Storage restacker lift
    Restacker,
    /// Cartridge 1 lift (normal agar)
    Cartridge1,
    /// Cartridge 2 lift (blood agar)
    Cartridge2,
    /// Cartridge 3 lift (chocolate agar)
    Cartridge3,
}

impl JointId {
    /// Every joint, in bus polling order
    pub const ALL: [JointId; MAX_JOINTS] = [
        JointId::LidLifter,
        JointId::PolarArm,
        JointId::Platform,
        JointId::Handler,
        JointId::Restacker,
        JointId::Cartridge1,
        JointId::Cartridge2,
        JointId::Cartridge3,
    ];

    /// Position of this joint in [`JointId::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Servo operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OperatingMode {
    /// Single-turn position control, raw 0-4095
    #[default]
    Position,
    /// Multi-turn position control, unbounded signed raw
    ExtendedPosition,
}

/// Named target for a joint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NamedPosition {
    /// Position reached by homing
    Home,
    /// Raised position
    Up,
    /// Middle position
    Mid,
    /// Top position
    Top,
}

/// Per-joint configuration record
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointConfig {
    /// Joint identity
    pub id: JointId,
    /// Servo bus id
    pub bus_id: u8,
    /// Operating mode
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: OperatingMode,
    /// Home position (raw units)
    pub home_raw: i32,
    /// Profile velocity (servo units)
    pub profile_velocity: u16,
    /// Raised position (raw units)
    #[cfg_attr(feature = "serde", serde(default))]
    pub up_raw: Option<i32>,
    /// Middle position (raw units)
    #[cfg_attr(feature = "serde", serde(default))]
    pub mid_raw: Option<i32>,
    /// Top position (raw units)
    #[cfg_attr(feature = "serde", serde(default))]
    pub top_raw: Option<i32>,
}

impl JointConfig {
    /// Create a joint record with only a home position
    pub const fn new(
        id: JointId,
        bus_id: u8,
        mode: OperatingMode,
        home_raw: i32,
        profile_velocity: u16,
    ) -> Self {
        Self {
            id,
            bus_id,
            mode,
            home_raw,
            profile_velocity,
            up_raw: None,
            mid_raw: None,
            top_raw: None,
        }
    }

    /// Add the lift positions (up, mid, top)
    pub const fn with_lift(mut self, up_raw: i32, mid_raw: i32, top_raw: i32) -> Self {
        self.up_raw = Some(up_raw);
        self.mid_raw = Some(mid_raw);
        self.top_raw = Some(top_raw);
        self
    }

    /// Look up the raw value of a named position
    pub fn position(&self, name: NamedPosition) -> Option<i32> {
        match name {
            NamedPosition::Home => Some(self.home_raw),
            NamedPosition::Up => self.up_raw,
            NamedPosition::Mid => self.mid_raw,
            NamedPosition::Top => self.top_raw,
        }
    }

    /// Check if a raw target is legal for this joint's mode
    pub fn accepts(&self, raw: i32) -> bool {
        match self.mode {
            OperatingMode::Position => (0..=4095).contains(&raw),
            OperatingMode::ExtendedPosition => true,
        }
    }
}

/// Table of joint records
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct JointTable {
    joints: Vec<JointConfig, MAX_JOINTS>,
}

impl Default for JointTable {
    /// The production streaker: bus ids and positions from the bench build
    fn default() -> Self {
        use JointId::*;
        use OperatingMode::*;

        let mut table = Self::new();
        let records = [
            JointConfig::new(LidLifter, 1, Position, 3849, 50),
            JointConfig::new(PolarArm, 2, Position, 2042, 100),
            JointConfig::new(Platform, 3, ExtendedPosition, 1238, 100),
            JointConfig::new(Handler, 4, ExtendedPosition, 1947, 100),
            JointConfig::new(Restacker, 5, ExtendedPosition, 2700, 100).with_lift(4900, 4300, 6000),
            JointConfig::new(Cartridge1, 8, ExtendedPosition, 1320, 100).with_lift(4095, 4095, 4095),
            JointConfig::new(Cartridge2, 6, ExtendedPosition, 0, 100).with_lift(1976, 1976, 1976),
            JointConfig::new(Cartridge3, 7, ExtendedPosition, 2650, 100).with_lift(4095, 4095, 6000),
        ];
        for record in records {
            // Capacity equals the number of joints
            let _ = table.insert(record);
        }
        table
    }
}

impl JointTable {
    /// Create an empty table
    pub const fn new() -> Self {
        Self { joints: Vec::new() }
    }

    /// Insert or replace a joint record
    ///
    /// Returns the record back if the table is full.
    pub fn insert(&mut self, config: JointConfig) -> Result<(), JointConfig> {
        if let Some(slot) = self.joints.iter_mut().find(|j| j.id == config.id) {
            *slot = config;
            return Ok(());
        }
        self.joints.push(config)
    }

    /// Get the record for a joint
    pub fn get(&self, id: JointId) -> Option<&JointConfig> {
        self.joints.iter().find(|j| j.id == id)
    }

    /// Iterate over all records
    pub fn iter(&self) -> impl Iterator<Item = &JointConfig> {
        self.joints.iter()
    }

    /// Number of configured joints
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Ids of the configured joints, in table order
    pub fn ids(&self) -> Vec<JointId, MAX_JOINTS> {
        self.joints.iter().map(|j| j.id).collect()
    }

    /// Find the joint driven by a bus id
    pub fn by_bus_id(&self, bus_id: u8) -> Option<&JointConfig> {
        self.joints.iter().find(|j| j.bus_id == bus_id)
    }
}
