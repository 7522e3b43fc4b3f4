//! Machine configuration
//!
//! Aggregates geometry, the joint table and the motion barrier presets.
//! Stored to flash with postcard and optionally loaded from TOML text.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::geometry::{GeometryError, LinkGeometry};
use super::joints::{JointId, JointTable, OperatingMode};

/// Current machine config version
pub const CONFIG_VERSION: u8 = 1;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Geometry failed validation
    Geometry(GeometryError),
    /// A joint the planner needs is missing from the table
    MissingJoint(JointId),
    /// A joint is configured with the wrong operating mode
    WrongMode(JointId),
    /// Barrier needs a non-zero poll delay and at least one idle read
    InvalidBarrier,
    /// Stored config has an unknown version
    UnsupportedVersion(u8),
    /// Buffer too small or value not encodable
    Encode,
    /// Stored bytes could not be decoded
    Decode,
    /// TOML text could not be parsed
    Parse,
}

impl From<GeometryError> for ConfigError {
    fn from(e: GeometryError) -> Self {
        ConfigError::Geometry(e)
    }
}

/// Motion barrier timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BarrierConfig {
    /// Delay after issuing commands before the first status read (ms)
    pub settle_ms: u32,
    /// Delay between status reads (ms)
    pub poll_ms: u32,
    /// Consecutive idle reads that end the wait when no motion was seen
    pub idle_reads: u8,
    /// Give up after this long (ms); `None` waits forever
    pub timeout_ms: Option<u32>,
}

impl BarrierConfig {
    /// Preset used after every platform point
    pub const fn point() -> Self {
        Self {
            settle_ms: 10,
            poll_ms: 5,
            idle_reads: 2,
            timeout_ms: None,
        }
    }

    /// Preset used while homing
    pub const fn homing() -> Self {
        Self {
            settle_ms: 50,
            poll_ms: 5,
            idle_reads: 2,
            timeout_ms: Some(5000),
        }
    }

    /// Set a timeout
    pub const fn with_timeout(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    fn is_valid(&self) -> bool {
        self.poll_ms > 0 && self.idle_reads > 0
    }
}

impl Default for BarrierConfig {
    fn default() -> Self {
        Self::point()
    }
}

/// Complete configuration of the streaking machine
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MachineConfig {
    /// Config version
    #[cfg_attr(feature = "serde", serde(default = "default_version"))]
    pub version: u8,
    /// Lever and platform geometry
    #[cfg_attr(feature = "serde", serde(default))]
    pub geometry: LinkGeometry,
    /// Servo table
    #[cfg_attr(feature = "serde", serde(default))]
    pub joints: JointTable,
    /// Barrier used after each point move
    #[cfg_attr(feature = "serde", serde(default = "BarrierConfig::point"))]
    pub point_barrier: BarrierConfig,
    /// Barrier used while homing and for named joint moves
    #[cfg_attr(feature = "serde", serde(default = "BarrierConfig::homing"))]
    pub homing_barrier: BarrierConfig,
    /// Treat a move that was never observed in motion as an error
    #[cfg_attr(feature = "serde", serde(default))]
    pub strict_confirmation: bool,
}

#[cfg(feature = "serde")]
fn default_version() -> u8 {
    CONFIG_VERSION
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            geometry: LinkGeometry::default(),
            joints: JointTable::default(),
            point_barrier: BarrierConfig::point(),
            homing_barrier: BarrierConfig::homing(),
            strict_confirmation: false,
        }
    }
}

impl MachineConfig {
    /// Create a config for the given geometry with the default joint table
    pub fn new(geometry: LinkGeometry) -> Self {
        Self {
            geometry,
            ..Self::default()
        }
    }

    /// Enable or disable strict motion confirmation
    pub fn with_strict_confirmation(mut self, strict: bool) -> Self {
        self.strict_confirmation = strict;
        self
    }

    /// Validate the configuration
    ///
    /// The polar arm must be a single-turn joint and the platform must be
    /// in extended position mode.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion(self.version));
        }
        self.geometry.validate()?;

        let arm = self
            .joints
            .get(JointId::PolarArm)
            .ok_or(ConfigError::MissingJoint(JointId::PolarArm))?;
        if arm.mode != OperatingMode::Position {
            return Err(ConfigError::WrongMode(JointId::PolarArm));
        }

        let platform = self
            .joints
            .get(JointId::Platform)
            .ok_or(ConfigError::MissingJoint(JointId::Platform))?;
        if platform.mode != OperatingMode::ExtendedPosition {
            return Err(ConfigError::WrongMode(JointId::Platform));
        }

        if !self.point_barrier.is_valid() || !self.homing_barrier.is_valid() {
            return Err(ConfigError::InvalidBarrier);
        }
        Ok(())
    }

    /// Serialize into `buf` with postcard, returning the used bytes
    #[cfg(feature = "serde")]
    pub fn to_postcard<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Encode)
    }

    /// Deserialize a postcard image and validate it
    #[cfg(feature = "serde")]
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Decode)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration and validate it
    ///
    /// Missing sections fall back to the shipped machine.
    #[cfg(feature = "toml")]
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }
}
