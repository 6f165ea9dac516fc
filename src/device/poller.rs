//! Multiplexer: select/poll-equivalent di atas banyak device
//!
//! Menggunakan mio::Poll + mio::Waker. Satu Waker didaftarkan ke
//! ReadinessNotifier setiap device; setiap perubahan readiness menulis ke
//! waker dan membangunkan `poll`. Setelah bangun, semua device di-snapshot
//! ulang (level-triggered).

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use mio::{Events, Poll, Token, Waker};

use crate::core::{AccessCoordinator, ReadinessFlags, Registration};

/// Token internal untuk waker, tidak boleh dipakai pemanggil
pub const WAKE_TOKEN: Token = Token(usize::MAX);
const EVENTS_CAPACITY: usize = 64;

/// Satu device yang siap, dipotong ke interest-nya
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyEvent {
    pub token: Token,
    pub readiness: ReadinessFlags,
}

struct Entry {
    token: Token,
    registration: Registration,
}

/// Multiplexer readiness untuk device ring buffer
pub struct Multiplexer {
    poll: Poll,
    events: Events,
    waker: Arc<Waker>,
    entries: Vec<Entry>,
}

impl Multiplexer {
    pub fn new() -> io::Result<Self> {
        let poll = Poll::new()?;
        let waker = Arc::new(Waker::new(poll.registry(), WAKE_TOKEN)?);

        Ok(Self {
            poll,
            events: Events::with_capacity(EVENTS_CAPACITY),
            waker,
            entries: Vec::new(),
        })
    }

    /// Pantau `device` dengan `interest` di bawah `token`
    pub fn add(
        &mut self,
        token: Token,
        device: &Arc<AccessCoordinator>,
        interest: ReadinessFlags,
    ) -> io::Result<()> {
        if token == WAKE_TOKEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "token reserved for the multiplexer waker",
            ));
        }
        if interest.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "empty interest",
            ));
        }
        if self.entries.iter().any(|e| e.token == token) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("token {:?} already registered", token),
            ));
        }

        let registration = device
            .notifier()
            .register_waiter(self.waker.clone(), interest);
        self.entries.push(Entry {
            token,
            registration,
        });

        tracing::debug!(?token, ?interest, "device added to multiplexer");
        Ok(())
    }

    /// Lepas device. Returns false kalau token tidak dikenal.
    pub fn remove(&mut self, token: Token) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.token != token);
        self.entries.len() != before
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Waker milik multiplexer, untuk membangunkan `wait` dari luar
    pub fn waker(&self) -> Arc<Waker> {
        Arc::clone(&self.waker)
    }

    /// Snapshot semua device tanpa blocking
    pub fn ready_now(&self) -> Vec<ReadyEvent> {
        self.entries
            .iter()
            .filter_map(|e| {
                let readiness = e.registration.ready();
                (!readiness.is_empty()).then_some(ReadyEvent {
                    token: e.token,
                    readiness,
                })
            })
            .collect()
    }

    /// Tunggu sampai minimal satu device siap atau timeout
    ///
    /// `None` berarti tunggu tanpa batas. Returns list kosong saat timeout.
    pub fn wait(&mut self, timeout: Option<Duration>) -> io::Result<Vec<ReadyEvent>> {
        let deadline = timeout.map(|t| Instant::now() + t);

        loop {
            let ready = self.ready_now();
            if !ready.is_empty() {
                return Ok(ready);
            }

            let remaining = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(Vec::new());
                    }
                    Some(deadline - now)
                }
                None => None,
            };

            match self.poll.poll(&mut self.events, remaining) {
                Ok(()) => {}
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }

            tracing::trace!(
                woken = self.events.iter().any(|ev| ev.token() == WAKE_TOKEN),
                "multiplexer poll returned"
            );
        }
    }
}

impl std::fmt::Debug for Multiplexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Multiplexer")
            .field("devices", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CapacityBounds;
    use crate::core::Interrupt;
    use std::thread;

    fn device(capacity: usize) -> Arc<AccessCoordinator> {
        let bounds = CapacityBounds {
            min: 1,
            default: capacity,
            max: capacity,
        };
        Arc::new(AccessCoordinator::new(bounds).unwrap())
    }

    #[test]
    fn test_timeout_when_nothing_ready() {
        let dev = device(16);
        let mut mux = Multiplexer::new().unwrap();
        mux.add(Token(1), &dev, ReadinessFlags::READABLE).unwrap();

        let start = Instant::now();
        let ready = mux.wait(Some(Duration::from_millis(30))).unwrap();
        assert!(ready.is_empty());
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_immediate_when_already_ready() {
        let dev = device(16);
        let mut mux = Multiplexer::new().unwrap();
        mux.add(Token(3), &dev, ReadinessFlags::BOTH).unwrap();

        let ready = mux.wait(Some(Duration::from_secs(5))).unwrap();
        assert_eq!(
            ready,
            vec![ReadyEvent {
                token: Token(3),
                readiness: ReadinessFlags::WRITABLE,
            }]
        );
    }

    #[test]
    fn test_wakes_on_write_from_other_thread() {
        let quiet = device(16);
        let busy = device(16);
        let mut mux = Multiplexer::new().unwrap();
        mux.add(Token(0), &quiet, ReadinessFlags::READABLE).unwrap();
        mux.add(Token(1), &busy, ReadinessFlags::READABLE).unwrap();

        let writer = {
            let busy = Arc::clone(&busy);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                busy.write(b"wake", false, &Interrupt::new()).unwrap();
            })
        };

        let ready = mux.wait(Some(Duration::from_secs(5))).unwrap();
        writer.join().unwrap();

        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].token, Token(1));
        assert!(ready[0].readiness.readable);
    }

    #[test]
    fn test_add_rejects_duplicates_and_reserved() {
        let dev = device(16);
        let mut mux = Multiplexer::new().unwrap();
        mux.add(Token(1), &dev, ReadinessFlags::READABLE).unwrap();

        let err = mux.add(Token(1), &dev, ReadinessFlags::READABLE).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);

        let err = mux.add(WAKE_TOKEN, &dev, ReadinessFlags::READABLE).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let err = mux.add(Token(2), &dev, ReadinessFlags::NONE).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_remove_detaches_waiter() {
        let dev = device(16);
        let notifier = dev.notifier();
        let mut mux = Multiplexer::new().unwrap();

        mux.add(Token(5), &dev, ReadinessFlags::WRITABLE).unwrap();
        assert_eq!(notifier.waiter_count(), 1);

        assert!(mux.remove(Token(5)));
        assert!(!mux.remove(Token(5)));
        assert_eq!(notifier.waiter_count(), 0);
        assert!(mux.is_empty());
    }
}
