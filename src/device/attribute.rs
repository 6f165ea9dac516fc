//! Sizing attribute (gaya sysfs)
//!
//! Read: kapasitas sekarang sebagai string desimal + newline.
//! Write: string desimal, diteruskan ke `resize`.

use crate::core::ResizeController;
use crate::error::{Error, Result};

/// Endpoint teks untuk membaca dan mengubah kapasitas satu device
#[derive(Debug, Clone)]
pub struct SizeAttribute {
    minor: usize,
    resizer: ResizeController,
}

impl SizeAttribute {
    pub fn new(minor: usize, resizer: ResizeController) -> Self {
        Self { minor, resizer }
    }

    #[inline]
    pub fn minor(&self) -> usize {
        self.minor
    }

    /// Kapasitas sekarang, misalnya `"4096\n"`
    pub fn show(&self) -> String {
        format!("{}\n", self.resizer.capacity())
    }

    /// Parse `input` dan resize. Returns jumlah byte input yang dikonsumsi.
    pub fn store(&self, input: &str) -> Result<usize> {
        let trimmed = input.trim();
        let capacity: usize = trimmed.parse().map_err(|_| {
            tracing::warn!(minor = self.minor, input = trimmed, "size attribute: not a decimal integer");
            Error::InvalidArgument(format!("not a decimal capacity: {trimmed:?}"))
        })?;

        let previous = self.resizer.capacity();
        match self.resizer.resize(capacity) {
            Ok(()) => {
                tracing::info!(minor = self.minor, previous, capacity, "device resized");
                Ok(input.len())
            }
            Err(e) => {
                tracing::warn!(minor = self.minor, capacity, error = %e, "resize rejected");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CapacityBounds;
    use crate::core::{AccessCoordinator, AccessMode};
    use std::sync::Arc;

    fn attribute() -> (Arc<AccessCoordinator>, SizeAttribute) {
        let bounds = CapacityBounds {
            min: 1,
            default: 4096,
            max: 16384,
        };
        let dev = Arc::new(AccessCoordinator::new(bounds).unwrap());
        let attr = SizeAttribute::new(0, dev.resizer());
        (dev, attr)
    }

    #[test]
    fn test_show_reports_capacity() {
        let (_dev, attr) = attribute();
        assert_eq!(attr.show(), "4096\n");
    }

    #[test]
    fn test_store_resizes() {
        let (dev, attr) = attribute();
        assert_eq!(attr.store("8192\n").unwrap(), 5);
        assert_eq!(dev.capacity(), 8192);
        assert_eq!(attr.show(), "8192\n");
    }

    #[test]
    fn test_store_rejects_garbage() {
        let (dev, attr) = attribute();
        assert!(matches!(attr.store("lots"), Err(Error::InvalidArgument(_))));
        assert!(matches!(attr.store("-5"), Err(Error::InvalidArgument(_))));
        assert!(matches!(attr.store(""), Err(Error::InvalidArgument(_))));
        assert_eq!(dev.capacity(), 4096);
    }

    #[test]
    fn test_store_out_of_bounds() {
        let (_dev, attr) = attribute();
        assert!(matches!(attr.store("0"), Err(Error::InvalidArgument(_))));
        assert!(matches!(attr.store("16385"), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_store_with_open_session() {
        let (dev, attr) = attribute();
        let _session = dev.open(AccessMode::ReadWrite, false);
        assert!(matches!(
            attr.store("100"),
            Err(Error::PermissionDenied { .. })
        ));
    }
}
