//! Memory budget for resident tile content
//!
//! Tracks bytes and tile count of resident content and reports pressure so the
//! traversal engine knows when to unload tiles.

use crate::core::config::TilesConfig;

/// Resident content budget
#[derive(Clone, Debug)]
pub struct TileBudget {
    /// Maximum bytes of resident content
    max_bytes: u64,
    /// Maximum number of resident tiles
    max_tiles: usize,
    /// Pressure above which eviction is requested
    eviction_threshold: f32,
    used_bytes: u64,
    resident_tiles: usize,
}

impl TileBudget {
    pub fn new(max_bytes: u64, max_tiles: usize, eviction_threshold: f32) -> Self {
        Self {
            max_bytes,
            max_tiles,
            eviction_threshold,
            used_bytes: 0,
            resident_tiles: 0,
        }
    }

    pub fn from_config(config: &TilesConfig) -> Self {
        Self::new(config.max_bytes as u64, config.max_tiles, config.eviction_threshold)
    }

    // --- Tracking methods ---

    /// Register a tile that became resident with `bytes` of content
    pub fn add_tile(&mut self, bytes: u64) {
        self.used_bytes = self.used_bytes.saturating_add(bytes);
        self.resident_tiles = self.resident_tiles.saturating_add(1);
    }

    /// Unregister a tile whose content was released
    pub fn remove_tile(&mut self, bytes: u64) {
        self.used_bytes = self.used_bytes.saturating_sub(bytes);
        self.resident_tiles = self.resident_tiles.saturating_sub(1);
    }

    // --- Query methods ---

    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    pub fn resident_tiles(&self) -> usize {
        self.resident_tiles
    }

    pub fn available_bytes(&self) -> u64 {
        self.max_bytes.saturating_sub(self.used_bytes)
    }

    /// Byte pressure (0.0 to 1.0+). Above 1.0 is over budget.
    pub fn pressure(&self) -> f32 {
        if self.max_bytes == 0 {
            return 0.0;
        }
        (self.used_bytes as f64 / self.max_bytes as f64) as f32
    }

    // --- Decision methods ---

    /// True when byte pressure exceeds the threshold or too many tiles are resident
    pub fn should_evict(&self) -> bool {
        self.pressure() > self.eviction_threshold || self.resident_tiles > self.max_tiles
    }

    /// True when `bytes` more content fits in the byte budget
    pub fn can_load(&self, bytes: u64) -> bool {
        self.available_bytes() >= bytes && self.resident_tiles < self.max_tiles
    }
}

impl Default for TileBudget {
    fn default() -> Self {
        Self::from_config(&TilesConfig::default())
    }
}
