//! Room configuration: grid limits, fleet quotas and the boat-class table.

use alloc::string::String;

use crate::common::GameError;
use crate::ship::BoatClass;

/// Grid side used when a room is created without an explicit size.
pub const DEFAULT_MAP_SIZE: usize = 10;
/// Largest grid side a room may be created with.
pub const MAX_MAP_SIZE: usize = 26;
/// Upper bound on players sharing one room.
pub const MAX_PLAYERS_PER_ROOM: usize = 8;
/// Upper bound on the configured count of a single boat class.
pub const MAX_QUOTA_PER_CLASS: u8 = 4;
/// Number of boat classes.
pub const NUM_CLASSES: usize = 5;
/// Every boat class in table order.
pub const CLASSES: [BoatClass; NUM_CLASSES] = [
    BoatClass::AircraftCarrier,
    BoatClass::Battleship,
    BoatClass::Frigate,
    BoatClass::Submarine,
    BoatClass::PatrolBoat,
];

/// Environment variable holding the log level filter.
pub const LOG_ENV: &str = "BATTLEROOM_LOG";

/// Number of boats of each class a player must place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct FleetQuota {
    counts: [u8; NUM_CLASSES],
}

impl FleetQuota {
    /// A quota with `count` boats of every class.
    pub const fn uniform(count: u8) -> Self {
        Self {
            counts: [count; NUM_CLASSES],
        }
    }

    /// Configured count for `class`.
    pub fn get(&self, class: BoatClass) -> usize {
        self.counts[class.index()] as usize
    }

    /// Builder-style override of a single class count.
    pub fn with(mut self, class: BoatClass, count: u8) -> Self {
        self.counts[class.index()] = count;
        self
    }

    /// Total number of boats across all classes.
    pub fn total_boats(&self) -> usize {
        self.counts.iter().map(|&c| c as usize).sum()
    }

    /// Total number of cells the full fleet occupies.
    pub fn total_cells(&self) -> usize {
        CLASSES.iter().map(|c| self.get(*c) * c.length()).sum()
    }
}

impl Default for FleetQuota {
    fn default() -> Self {
        Self::uniform(1)
    }
}

/// Parameters supplied when a room is created.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomSettings {
    pub name: String,
    pub map_size: usize,
    pub quota: FleetQuota,
}

impl RoomSettings {
    pub fn new(name: impl Into<String>, map_size: usize) -> Self {
        Self {
            name: name.into(),
            map_size,
            quota: FleetQuota::default(),
        }
    }

    pub fn with_quota(mut self, quota: FleetQuota) -> Self {
        self.quota = quota;
        self
    }

    /// Reject settings no room can be built from.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.name.trim().is_empty() {
            return Err(GameError::InvalidSettings("room name is empty"));
        }
        if self.map_size == 0 || self.map_size > MAX_MAP_SIZE {
            return Err(GameError::InvalidSettings("map size out of range"));
        }
        if self.quota.counts.iter().any(|&c| c > MAX_QUOTA_PER_CLASS) {
            return Err(GameError::InvalidSettings("class quota too large"));
        }
        if self.quota.total_boats() == 0 {
            return Err(GameError::InvalidSettings("fleet quota is empty"));
        }
        Ok(())
    }
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self::new("room", DEFAULT_MAP_SIZE)
    }
}
