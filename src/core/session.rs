//! Session: satu akses terbuka ke device
//!
//! Session hanya bookkeeping. Mode akses menentukan counter mana yang naik
//! saat open dan turun saat close; counter ini dipakai sebagai gerbang
//! resize, bukan access control.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::coordinator::AccessCoordinator;
use super::readiness::ReadinessFlags;
use crate::error::Result;

/// Mode akses yang diminta saat open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
    ReadWrite,
}

impl AccessMode {
    #[inline(always)]
    pub fn is_readable(self) -> bool {
        matches!(self, AccessMode::Read | AccessMode::ReadWrite)
    }

    #[inline(always)]
    pub fn is_writable(self) -> bool {
        matches!(self, AccessMode::Write | AccessMode::ReadWrite)
    }

    /// Mapping dari flag `open(2)` (`O_RDONLY` / `O_WRONLY` / `O_RDWR`)
    #[cfg(unix)]
    pub fn from_open_flags(flags: libc::c_int) -> Result<Self> {
        match flags & libc::O_ACCMODE {
            libc::O_RDONLY => Ok(AccessMode::Read),
            libc::O_WRONLY => Ok(AccessMode::Write),
            libc::O_RDWR => Ok(AccessMode::ReadWrite),
            other => Err(crate::error::Error::InvalidArgument(format!(
                "unsupported access mode bits {other:#o}"
            ))),
        }
    }
}

/// Token pembatalan untuk wait yang sedang blocking
///
/// Raise dari thread lain lewat [`Interrupter`] supaya waiter ikut dibangunkan.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    raised: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set flag saja, tanpa membangunkan siapa pun
    #[inline]
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Konsumsi flag. Returns true kalau tadinya raised.
    #[inline]
    pub fn take(&self) -> bool {
        self.raised.swap(false, Ordering::AcqRel)
    }
}

/// Handle untuk membatalkan wait milik satu session dari thread lain
#[derive(Debug, Clone)]
pub struct Interrupter {
    coordinator: Arc<AccessCoordinator>,
    interrupt: Interrupt,
}

impl Interrupter {
    pub fn interrupt(&self) {
        self.coordinator.interrupt(&self.interrupt);
    }
}

/// Akses terbuka ke satu coordinator
///
/// Close terjadi saat [`close`](Session::close) atau saat di-drop,
/// counter hanya turun sekali.
#[derive(Debug)]
pub struct Session {
    coordinator: Arc<AccessCoordinator>,
    mode: AccessMode,
    nonblocking: bool,
    interrupt: Interrupt,
}

impl Session {
    pub(crate) fn new(coordinator: Arc<AccessCoordinator>, mode: AccessMode, nonblocking: bool) -> Self {
        Self {
            coordinator,
            mode,
            nonblocking,
            interrupt: Interrupt::new(),
        }
    }

    #[inline]
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    #[inline]
    pub fn is_nonblocking(&self) -> bool {
        self.nonblocking
    }

    /// Setara dengan toggle `O_NONBLOCK` setelah open
    pub fn set_nonblocking(&mut self, nonblocking: bool) {
        self.nonblocking = nonblocking;
    }

    pub fn coordinator(&self) -> &Arc<AccessCoordinator> {
        &self.coordinator
    }

    /// Baca dengan mode blocking milik session ini
    pub fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        self.coordinator.read(dst, self.nonblocking, &self.interrupt)
    }

    /// Tulis dengan mode blocking milik session ini
    pub fn write(&mut self, src: &[u8]) -> Result<usize> {
        self.coordinator.write(src, self.nonblocking, &self.interrupt)
    }

    pub fn poll(&self) -> ReadinessFlags {
        self.coordinator.poll_state()
    }

    pub fn interrupter(&self) -> Interrupter {
        Interrupter {
            coordinator: Arc::clone(&self.coordinator),
            interrupt: self.interrupt.clone(),
        }
    }

    /// Tutup session secara eksplisit
    pub fn close(self) {}
}

impl Drop for Session {
    fn drop(&mut self) {
        self.coordinator.release(self.mode);
    }
}

// Adapter byte-stream untuk transport yang bicara std::io.
// Catatan: `write_all`/`read_exact` bawaan std mengulang ErrorKind::Interrupted.
impl io::Read for Session {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Session::read(self, buf).map_err(io::Error::from)
    }
}

impl io::Write for Session {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Session::write(self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CapacityBounds;
    use std::io::{Read, Write};

    fn device() -> Arc<AccessCoordinator> {
        Arc::new(AccessCoordinator::new(CapacityBounds::default()).unwrap())
    }

    #[test]
    fn test_access_mode_flags() {
        assert!(AccessMode::Read.is_readable());
        assert!(!AccessMode::Read.is_writable());
        assert!(AccessMode::Write.is_writable());
        assert!(!AccessMode::Write.is_readable());
        assert!(AccessMode::ReadWrite.is_readable());
        assert!(AccessMode::ReadWrite.is_writable());
    }

    #[cfg(unix)]
    #[test]
    fn test_from_open_flags() {
        assert_eq!(
            AccessMode::from_open_flags(libc::O_RDONLY).unwrap(),
            AccessMode::Read
        );
        assert_eq!(
            AccessMode::from_open_flags(libc::O_WRONLY | libc::O_NONBLOCK).unwrap(),
            AccessMode::Write
        );
        assert_eq!(
            AccessMode::from_open_flags(libc::O_RDWR).unwrap(),
            AccessMode::ReadWrite
        );
    }

    #[test]
    fn test_interrupt_take() {
        let token = Interrupt::new();
        assert!(!token.take());
        token.raise();
        assert!(token.is_raised());
        assert!(token.take());
        assert!(!token.is_raised());
    }

    #[test]
    fn test_io_traits() {
        let dev = device();
        let mut writer = dev.open(AccessMode::Write, false);
        let mut reader = dev.open(AccessMode::Read, true);

        writer.write_all(b"hello ringdev").unwrap();
        writer.flush().unwrap();

        let mut out = [0u8; 13];
        reader.read_exact(&mut out).unwrap();
        assert_eq!(&out, b"hello ringdev");

        let err = Read::read(&mut reader, &mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
    }

    #[test]
    fn test_set_nonblocking() {
        let dev = device();
        let mut session = dev.open(AccessMode::Read, false);
        assert!(!session.is_nonblocking());
        session.set_nonblocking(true);

        let mut buf = [0u8; 4];
        assert!(matches!(
            session.read(&mut buf),
            Err(crate::error::Error::WouldBlock)
        ));
    }

    #[test]
    fn test_close_releases_once() {
        let dev = device();
        let session = dev.open(AccessMode::ReadWrite, false);
        assert_eq!(dev.session_counts(), (1, 1));
        session.close();
        assert_eq!(dev.session_counts(), (0, 0));
    }
}
