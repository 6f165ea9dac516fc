//! Konfigurasi device table dan batas kapasitas

use crate::core::page_size;
use crate::error::{Error, Result};

/// Jumlah device default di table
pub const DEFAULT_DEVICE_COUNT: usize = 4;

/// Batas kapasitas ring buffer (inklusif)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityBounds {
    pub min: usize,
    pub default: usize,
    pub max: usize,
}

impl Default for CapacityBounds {
    /// 1 byte, satu page, empat page
    fn default() -> Self {
        let page = page_size();
        Self {
            min: 1,
            default: page,
            max: 4 * page,
        }
    }
}

impl CapacityBounds {
    /// Pastikan `1 <= min <= default <= max`
    pub fn validate(&self) -> Result<()> {
        if self.min == 0 {
            return Err(Error::InvalidArgument(
                "minimum capacity must be at least 1".into(),
            ));
        }
        if !(self.min <= self.default && self.default <= self.max) {
            return Err(Error::InvalidArgument(format!(
                "capacity bounds out of order: min {} default {} max {}",
                self.min, self.default, self.max
            )));
        }
        Ok(())
    }

    /// Cek satu kapasitas terhadap `[min, max]`
    #[inline]
    pub fn check(&self, capacity: usize) -> Result<()> {
        if capacity < self.min || capacity > self.max {
            return Err(Error::InvalidArgument(format!(
                "capacity {} outside [{}, {}]",
                capacity, self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Konfigurasi device table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub device_count: usize,
    pub bounds: CapacityBounds,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_count: DEFAULT_DEVICE_COUNT,
            bounds: CapacityBounds::default(),
        }
    }
}

impl DeviceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.device_count == 0 {
            return Err(Error::InvalidArgument("device count must be non-zero".into()));
        }
        self.bounds.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let bounds = CapacityBounds::default();
        assert_eq!(bounds.min, 1);
        assert_eq!(bounds.default, page_size());
        assert_eq!(bounds.max, 4 * page_size());
        bounds.validate().unwrap();
    }

    #[test]
    fn test_invalid_bounds() {
        let zero_min = CapacityBounds {
            min: 0,
            default: 8,
            max: 16,
        };
        assert!(zero_min.validate().is_err());

        let inverted = CapacityBounds {
            min: 8,
            default: 32,
            max: 16,
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_check_inclusive() {
        let bounds = CapacityBounds {
            min: 4,
            default: 8,
            max: 16,
        };
        assert!(bounds.check(4).is_ok());
        assert!(bounds.check(16).is_ok());
        assert!(bounds.check(3).is_err());
        assert!(bounds.check(17).is_err());
    }

    #[test]
    fn test_device_config_validate() {
        DeviceConfig::default().validate().unwrap();
        let empty = DeviceConfig {
            device_count: 0,
            ..DeviceConfig::default()
        };
        assert!(matches!(empty.validate(), Err(Error::InvalidArgument(_))));
    }
}
