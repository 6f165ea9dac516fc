//! Device table: kumpulan coordinator independen, di-index dengan minor number

use std::sync::Arc;

use crate::config::DeviceConfig;
use crate::core::{AccessCoordinator, AccessMode, Session};
use crate::error::{Error, Result};

use super::SizeAttribute;

/// Semua device endpoint yang dibuat saat inisialisasi
#[derive(Debug)]
pub struct DeviceTable {
    devices: Vec<Arc<AccessCoordinator>>,
    config: DeviceConfig,
}

impl DeviceTable {
    /// Buat `config.device_count` device dengan kapasitas default
    pub fn new(config: &DeviceConfig) -> Result<Self> {
        config.validate()?;

        let mut devices = Vec::with_capacity(config.device_count);
        for minor in 0..config.device_count {
            let device = AccessCoordinator::new(config.bounds).inspect_err(|e| {
                tracing::error!(minor, error = %e, "failed to create device");
            })?;
            devices.push(Arc::new(device));
        }

        tracing::info!(
            devices = config.device_count,
            capacity = config.bounds.default,
            min = config.bounds.min,
            max = config.bounds.max,
            "device table ready"
        );

        Ok(Self {
            devices,
            config: config.clone(),
        })
    }

    pub fn get(&self, minor: usize) -> Result<&Arc<AccessCoordinator>> {
        self.devices.get(minor).ok_or(Error::NoDevice(minor))
    }

    /// Open device `minor`, setara dengan `open(2)` di node-nya
    pub fn open(&self, minor: usize, mode: AccessMode, nonblocking: bool) -> Result<Session> {
        let session = self.get(minor)?.open(mode, nonblocking);
        tracing::debug!(minor, ?mode, nonblocking, "session opened");
        Ok(session)
    }

    /// Endpoint ukuran untuk device `minor`
    pub fn size_attribute(&self, minor: usize) -> Result<SizeAttribute> {
        Ok(SizeAttribute::new(minor, self.get(minor)?.resizer()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Arc<AccessCoordinator>)> {
        self.devices.iter().enumerate()
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CapacityBounds;

    fn config(count: usize) -> DeviceConfig {
        DeviceConfig {
            device_count: count,
            bounds: CapacityBounds {
                min: 1,
                default: 128,
                max: 512,
            },
        }
    }

    #[test]
    fn test_table_creates_independent_devices() {
        let table = DeviceTable::new(&config(3)).unwrap();
        assert_eq!(table.len(), 3);

        let mut w = table.open(0, AccessMode::Write, false).unwrap();
        w.write(b"only on zero").unwrap();

        assert_eq!(table.get(0).unwrap().occupied_len(), 12);
        assert_eq!(table.get(1).unwrap().occupied_len(), 0);
        assert_eq!(table.get(2).unwrap().capacity(), 128);
    }

    #[test]
    fn test_unknown_minor() {
        let table = DeviceTable::new(&config(2)).unwrap();
        assert!(matches!(table.get(2), Err(Error::NoDevice(2))));
        assert!(matches!(
            table.open(7, AccessMode::Read, false),
            Err(Error::NoDevice(7))
        ));
    }

    #[test]
    fn test_zero_devices_rejected() {
        assert!(matches!(
            DeviceTable::new(&config(0)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_iter_minors() {
        let table = DeviceTable::new(&config(4)).unwrap();
        let minors: Vec<usize> = table.iter().map(|(minor, _)| minor).collect();
        assert_eq!(minors, vec![0, 1, 2, 3]);
    }
}
