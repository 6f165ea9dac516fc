//! Property tests untuk ring buffer dan coordinator
//!
//! Model pembanding: VecDeque<u8>.

use std::collections::VecDeque;

use proptest::prelude::*;
use ringdev::core::RingBuffer;
use ringdev::{AccessCoordinator, CapacityBounds, Error, Interrupt};

#[derive(Debug, Clone)]
enum Op {
    Write(Vec<u8>),
    Read(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 0..40).prop_map(Op::Write),
        (0usize..40).prop_map(Op::Read),
    ]
}

proptest! {
    #[test]
    fn capacity_invariant_and_fifo_hold(
        capacity in 1usize..80,
        ops in prop::collection::vec(op_strategy(), 0..200),
    ) {
        let mut rb = RingBuffer::with_capacity(capacity).unwrap();
        let mut model: VecDeque<u8> = VecDeque::new();

        for op in ops {
            match op {
                Op::Write(data) => {
                    let (offset, span) = rb.write_slice(data.len());
                    prop_assert!(offset + span <= capacity);

                    let n = rb.push_from(&data);
                    prop_assert_eq!(n, span);
                    model.extend(&data[..n]);
                }
                Op::Read(len) => {
                    let (offset, span) = rb.read_slice(len);
                    // Satu call tidak pernah melewati akhir storage
                    prop_assert!(offset + span <= capacity);

                    let mut out = vec![0u8; len];
                    let n = rb.pop_into(&mut out);
                    prop_assert_eq!(n, span);
                    let expected: Vec<u8> = model.drain(..n).collect();
                    prop_assert_eq!(&out[..n], &expected[..]);
                }
            }

            prop_assert_eq!(rb.occupied_len() + rb.free_len(), capacity - 1);
            prop_assert_eq!(rb.occupied_len(), model.len());
            prop_assert_eq!(rb.is_empty(), model.is_empty());
            prop_assert_eq!(rb.is_full(), model.len() == capacity - 1);
        }
    }

    #[test]
    fn fifo_round_trip_within_usable_capacity(
        capacity in 2usize..300,
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..50), 1..20),
        read_size in 1usize..64,
    ) {
        let bounds = CapacityBounds { min: 1, default: capacity, max: capacity };
        let dev = AccessCoordinator::new(bounds).unwrap();
        let token = Interrupt::new();

        // Potong input supaya total <= capacity - 1
        let mut written = Vec::new();
        for chunk in chunks {
            let room = capacity - 1 - written.len();
            let take = chunk.len().min(room);
            let mut sent = 0;
            while sent < take {
                sent += dev.write(&chunk[sent..take], true, &token).unwrap();
            }
            written.extend_from_slice(&chunk[..take]);
        }

        let mut read_back = Vec::new();
        let mut buf = vec![0u8; read_size];
        loop {
            match dev.read(&mut buf, true, &token) {
                Ok(n) => read_back.extend_from_slice(&buf[..n]),
                Err(Error::WouldBlock) => break,
                Err(e) => return Err(TestCaseError::fail(e.to_string())),
            }
        }

        prop_assert_eq!(read_back, written);
    }
}
