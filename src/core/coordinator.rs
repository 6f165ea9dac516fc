//! Access Coordinator: satu lock, dua condition
//!
//! Semua state ring buffer, counter session, dan daftar waiter dijaga
//! oleh satu Mutex. Dua Condvar dipakai untuk blocking:
//! - `readable_changed`: buffer baru saja jadi tidak kosong
//! - `writable_changed`: buffer baru saja punya ruang kosong
//!
//! Lock tidak pernah dipegang selama blocking: `Condvar::wait` melepas
//! lock secara atomik dan predicate selalu di-cek ulang setelah bangun.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex, MutexGuard};

use super::readiness::{wake_all, ReadinessFlags, ReadinessNotifier, Waiter, WaiterList};
use super::resize::ResizeController;
use super::ring_buffer::RingBuffer;
use super::session::{AccessMode, Interrupt, Session};
use crate::config::CapacityBounds;
use crate::error::{Error, Result};

/// State yang dijaga oleh lock coordinator
#[derive(Debug)]
pub(crate) struct DeviceState {
    pub(crate) ring: RingBuffer,
    pub(crate) readers: usize,
    pub(crate) writers: usize,
    pub(crate) waiters: WaiterList,
}

/// Counter transfer per device
#[derive(Debug, Default)]
pub struct DeviceStats {
    bytes_read: AtomicU64,
    bytes_written: AtomicU64,
    reads: AtomicU64,
    writes: AtomicU64,
    would_block: AtomicU64,
    cancelled: AtomicU64,
    resizes: AtomicU64,
}

/// Salinan counter pada satu titik waktu
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub reads: u64,
    pub writes: u64,
    pub would_block: u64,
    pub cancelled: u64,
    pub resizes: u64,
}

impl DeviceStats {
    #[inline(always)]
    fn record_read(&self, n: usize) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(n as u64, Ordering::Relaxed);
    }

    #[inline(always)]
    fn record_write(&self, n: usize) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(n as u64, Ordering::Relaxed);
    }

    #[inline(always)]
    fn record_would_block(&self) {
        self.would_block.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    fn record_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn record_resize(&self) {
        self.resizes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            would_block: self.would_block.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            resizes: self.resizes.load(Ordering::Relaxed),
        }
    }
}

/// Shared FIFO byte stream dengan backpressure
///
/// Banyak reader dan writer boleh memakai buffer yang sama secara
/// bersamaan; urutan antar mereka hanya ditentukan oleh urutan lock.
pub struct AccessCoordinator {
    state: Mutex<DeviceState>,
    readable_changed: Condvar,
    writable_changed: Condvar,
    bounds: CapacityBounds,
    stats: DeviceStats,
}

impl AccessCoordinator {
    /// Membuat coordinator dengan `bounds.default` sebagai kapasitas awal
    pub fn new(bounds: CapacityBounds) -> Result<Self> {
        bounds.validate()?;
        Self::with_capacity(bounds, bounds.default)
    }

    /// Membuat coordinator dengan kapasitas awal tertentu (harus di dalam bounds)
    pub fn with_capacity(bounds: CapacityBounds, capacity: usize) -> Result<Self> {
        bounds.check(capacity)?;

        Ok(Self {
            state: Mutex::new(DeviceState {
                ring: RingBuffer::with_capacity(capacity)?,
                readers: 0,
                writers: 0,
                waiters: WaiterList::default(),
            }),
            readable_changed: Condvar::new(),
            writable_changed: Condvar::new(),
            bounds,
            stats: DeviceStats::default(),
        })
    }

    /// Buka session baru. Tidak pernah gagal, tidak pernah blocking.
    pub fn open(self: &Arc<Self>, mode: AccessMode, nonblocking: bool) -> Session {
        {
            let mut state = self.state.lock();
            if mode.is_readable() {
                state.readers += 1;
            }
            if mode.is_writable() {
                state.writers += 1;
            }
        }
        Session::new(Arc::clone(self), mode, nonblocking)
    }

    /// Dipanggil oleh `Session` saat ditutup
    pub(crate) fn release(&self, mode: AccessMode) {
        let mut state = self.state.lock();
        if mode.is_readable() {
            debug_assert!(state.readers > 0);
            state.readers = state.readers.saturating_sub(1);
        }
        if mode.is_writable() {
            debug_assert!(state.writers > 0);
            state.writers = state.writers.saturating_sub(1);
        }
    }

    /// Baca maksimal `dst.len()` byte
    ///
    /// Blocking selama buffer kosong kecuali `nonblocking`. Hanya satu span
    /// contiguous yang di-copy per call, jadi hasil bisa lebih kecil dari
    /// yang diminta walaupun data masih ada setelah wrap.
    pub fn read(&self, dst: &mut [u8], nonblocking: bool, interrupt: &Interrupt) -> Result<usize> {
        if dst.is_empty() {
            return Ok(0);
        }

        let mut state = self.state.lock();
        while state.ring.is_empty() {
            self.wait_or_bail(&mut state, &self.readable_changed, nonblocking, interrupt)?;
        }

        let n = state.ring.pop_into(dst);
        let waiters = state.waiters.snapshot();
        drop(state);

        // Consumer baru saja membebaskan ruang
        self.writable_changed.notify_all();
        wake_all(waiters);

        self.stats.record_read(n);
        Ok(n)
    }

    /// Tulis maksimal `src.len()` byte
    ///
    /// Simetris dengan [`read`](Self::read): blocking selama penuh,
    /// satu span contiguous per call.
    pub fn write(&self, src: &[u8], nonblocking: bool, interrupt: &Interrupt) -> Result<usize> {
        if src.is_empty() {
            return Ok(0);
        }

        let mut state = self.state.lock();
        while state.ring.is_full() {
            self.wait_or_bail(&mut state, &self.writable_changed, nonblocking, interrupt)?;
        }

        let n = state.ring.push_from(src);
        let waiters = state.waiters.snapshot();
        drop(state);

        // Producer baru saja menambah data
        self.readable_changed.notify_all();
        wake_all(waiters);

        self.stats.record_write(n);
        Ok(n)
    }

    /// Satu putaran wait loop. Predicate di-cek oleh pemanggil.
    fn wait_or_bail(
        &self,
        state: &mut MutexGuard<'_, DeviceState>,
        condition: &Condvar,
        nonblocking: bool,
        interrupt: &Interrupt,
    ) -> Result<()> {
        if nonblocking {
            self.stats.record_would_block();
            return Err(Error::WouldBlock);
        }
        // Dicek di bawah lock, jadi tidak ada lost wakeup dengan `interrupt()`
        if interrupt.take() {
            self.stats.record_cancelled();
            return Err(Error::Cancelled);
        }
        condition.wait(state);
        Ok(())
    }

    /// Raise `interrupt` dan bangunkan semua thread yang parkir di sini
    pub fn interrupt(&self, interrupt: &Interrupt) {
        interrupt.raise();
        // Sinkronisasi dengan waiter yang sedang cek flag di bawah lock
        let waiters = self.state.lock().waiters.snapshot();
        self.signal_all(waiters);
    }

    /// Readiness level-triggered saat ini. Tidak pernah blocking.
    pub fn poll_state(&self) -> ReadinessFlags {
        let state = self.state.lock();
        ReadinessFlags {
            readable: !state.ring.is_empty(),
            writable: !state.ring.is_full(),
        }
    }

    /// Notifier untuk multiplexer eksternal
    pub fn notifier(self: &Arc<Self>) -> ReadinessNotifier {
        ReadinessNotifier::new(Arc::clone(self))
    }

    /// Controller untuk mengubah kapasitas
    pub fn resizer(self: &Arc<Self>) -> ResizeController {
        ResizeController::new(Arc::clone(self))
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock()
    }

    pub(crate) fn attach_waiter(&self, waiter: Arc<dyn Waiter>) -> u64 {
        self.state.lock().waiters.insert(waiter)
    }

    pub(crate) fn detach_waiter(&self, key: u64) -> bool {
        self.state.lock().waiters.remove(key)
    }

    /// Bangunkan semua pihak (resize, interrupt)
    pub(crate) fn signal_all(&self, waiters: Option<Vec<Arc<dyn Waiter>>>) {
        self.readable_changed.notify_all();
        self.writable_changed.notify_all();
        wake_all(waiters);
    }

    #[inline]
    pub fn bounds(&self) -> CapacityBounds {
        self.bounds
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().ring.capacity()
    }

    pub fn occupied_len(&self) -> usize {
        self.state.lock().ring.occupied_len()
    }

    pub fn free_len(&self) -> usize {
        self.state.lock().ring.free_len()
    }

    /// `(reader_count, writer_count)`
    pub fn session_counts(&self) -> (usize, usize) {
        let state = self.state.lock();
        (state.readers, state.writers)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub(crate) fn stats_ref(&self) -> &DeviceStats {
        &self.stats
    }
}

impl std::fmt::Debug for AccessCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("AccessCoordinator")
            .field("capacity", &state.ring.capacity())
            .field("occupied", &state.ring.occupied_len())
            .field("readers", &state.readers)
            .field("writers", &state.writers)
            .field("bounds", &self.bounds)
            .finish()
    }
}
