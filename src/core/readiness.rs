//! Readiness Notifier untuk multiplexer eksternal
//!
//! Level-triggered: waiter yang bangun wajib snapshot ulang, tidak boleh
//! menganggap kondisi yang membangunkannya masih berlaku.
//!
//! Waiter selalu didaftarkan ke kedua kondisi (readable dan writable),
//! apa pun interest-nya, karena satu panggilan multiplexer bisa memantau
//! banyak sumber sekaligus.

use std::sync::Arc;
use std::thread::Thread;

use super::coordinator::AccessCoordinator;

/// Hasil query readiness
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ReadinessFlags {
    pub readable: bool,
    pub writable: bool,
}

impl ReadinessFlags {
    pub const NONE: Self = Self {
        readable: false,
        writable: false,
    };
    pub const READABLE: Self = Self {
        readable: true,
        writable: false,
    };
    pub const WRITABLE: Self = Self {
        readable: false,
        writable: true,
    };
    pub const BOTH: Self = Self {
        readable: true,
        writable: true,
    };

    #[inline(always)]
    pub fn is_empty(self) -> bool {
        !self.readable && !self.writable
    }

    #[inline(always)]
    pub fn intersection(self, other: Self) -> Self {
        Self {
            readable: self.readable && other.readable,
            writable: self.writable && other.writable,
        }
    }

    /// Apakah ada interest yang terpenuhi
    #[inline(always)]
    pub fn intersects(self, interest: Self) -> bool {
        !self.intersection(interest).is_empty()
    }

    /// Mask gaya `poll(2)`, seperti yang dikembalikan driver
    #[cfg(unix)]
    pub fn poll_mask(self) -> libc::c_short {
        let mut mask = 0;
        if self.readable {
            mask |= libc::POLLIN | libc::POLLRDNORM;
        }
        if self.writable {
            mask |= libc::POLLOUT | libc::POLLWRNORM;
        }
        mask
    }
}

/// Sesuatu yang bisa dibangunkan saat readiness mungkin berubah
pub trait Waiter: Send + Sync {
    fn wake(&self);
}

impl Waiter for mio::Waker {
    fn wake(&self) {
        if let Err(e) = mio::Waker::wake(self) {
            tracing::warn!("mio waker failed: {}", e);
        }
    }
}

impl Waiter for Thread {
    fn wake(&self) {
        self.unpark();
    }
}

/// Daftar waiter di dalam state coordinator (dijaga lock yang sama)
#[derive(Default)]
pub(crate) struct WaiterList {
    next_key: u64,
    entries: Vec<(u64, Arc<dyn Waiter>)>,
}

impl WaiterList {
    pub(crate) fn insert(&mut self, waiter: Arc<dyn Waiter>) -> u64 {
        let key = self.next_key;
        self.next_key += 1;
        self.entries.push((key, waiter));
        key
    }

    pub(crate) fn remove(&mut self, key: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| *k != key);
        self.entries.len() != before
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Clone semua waiter supaya bisa dibangunkan setelah lock dilepas
    #[inline]
    pub(crate) fn snapshot(&self) -> Option<Vec<Arc<dyn Waiter>>> {
        if self.entries.is_empty() {
            return None;
        }
        Some(self.entries.iter().map(|(_, w)| Arc::clone(w)).collect())
    }
}

impl std::fmt::Debug for WaiterList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaiterList")
            .field("len", &self.entries.len())
            .finish()
    }
}

#[inline]
pub(crate) fn wake_all(waiters: Option<Vec<Arc<dyn Waiter>>>) {
    if let Some(waiters) = waiters {
        for waiter in waiters {
            waiter.wake();
        }
    }
}

/// Permukaan query/park untuk select/poll/epoll-equivalent
#[derive(Debug, Clone)]
pub struct ReadinessNotifier {
    coordinator: Arc<AccessCoordinator>,
}

impl ReadinessNotifier {
    pub fn new(coordinator: Arc<AccessCoordinator>) -> Self {
        Self { coordinator }
    }

    /// Sama dengan `poll_state()`
    #[inline]
    pub fn snapshot(&self) -> ReadinessFlags {
        self.coordinator.poll_state()
    }

    /// Daftarkan waiter ke kedua kondisi
    ///
    /// `interest` hanya disimpan untuk pemanggil; waiter tetap dibangunkan
    /// untuk setiap perubahan. Drop [`Registration`] untuk melepas.
    pub fn register_waiter(&self, waiter: Arc<dyn Waiter>, interest: ReadinessFlags) -> Registration {
        let key = self.coordinator.attach_waiter(waiter);
        Registration {
            coordinator: Arc::clone(&self.coordinator),
            key,
            interest,
        }
    }

    /// Jumlah waiter yang sedang terdaftar
    pub fn waiter_count(&self) -> usize {
        self.coordinator.lock_state().waiters.len()
    }
}

/// Pendaftaran waiter yang aktif sampai di-drop
#[derive(Debug)]
pub struct Registration {
    coordinator: Arc<AccessCoordinator>,
    key: u64,
    interest: ReadinessFlags,
}

impl Registration {
    #[inline]
    pub fn interest(&self) -> ReadinessFlags {
        self.interest
    }

    /// Snapshot device yang didaftarkan, dipotong ke interest
    pub fn ready(&self) -> ReadinessFlags {
        self.coordinator.poll_state().intersection(self.interest)
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.coordinator.detach_waiter(self.key);
    }
}
