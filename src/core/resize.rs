//! Resize Controller
//!
//! Mengganti storage ring buffer secara utuh: alokasi baru, swap di bawah
//! lock coordinator, lalu storage lama di-drop. Ditolak selama masih ada
//! session terbuka, jadi tidak ada reader/writer yang sedang memakai
//! storage lama.
//!
//! Resize yang berhasil membuang data yang belum dibaca.

use std::sync::Arc;

use super::coordinator::AccessCoordinator;
use super::ring_buffer::RingBuffer;
use crate::config::CapacityBounds;
use crate::error::{Error, Result};

/// Validasi dan eksekusi perubahan kapasitas
#[derive(Debug, Clone)]
pub struct ResizeController {
    coordinator: Arc<AccessCoordinator>,
}

impl ResizeController {
    pub fn new(coordinator: Arc<AccessCoordinator>) -> Self {
        Self { coordinator }
    }

    #[inline]
    pub fn bounds(&self) -> CapacityBounds {
        self.coordinator.bounds()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.coordinator.capacity()
    }

    /// Ganti kapasitas ke `new_capacity`
    ///
    /// - `InvalidArgument` kalau di luar `[min, max]`
    /// - `PermissionDenied` kalau `reader_count + writer_count > 0`
    /// - `Storage` kalau alokasi gagal; storage lama tetap dipakai
    pub fn resize(&self, new_capacity: usize) -> Result<()> {
        self.coordinator.bounds().check(new_capacity)?;

        let mut state = self.coordinator.lock_state();
        if state.readers + state.writers > 0 {
            return Err(Error::PermissionDenied {
                readers: state.readers,
                writers: state.writers,
            });
        }

        // Cursor baru mulai dari 0; data lama ikut hilang bersama storage lama
        let fresh = RingBuffer::with_capacity(new_capacity)?;
        let old = std::mem::replace(&mut state.ring, fresh);
        let waiters = state.waiters.snapshot();
        drop(state);
        drop(old);

        self.coordinator.stats_ref().record_resize();
        self.coordinator.signal_all(waiters);
        Ok(())
    }
}
