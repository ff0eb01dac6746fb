//! Lock-free settings hand-off between the control and audio contexts.
//!
//! A triple buffer holding the most recent value. The control context
//! [`publish`](Mailbox::publish)es complete snapshots, each one replacing
//! whatever the audio context has not picked up yet. The audio context calls
//! [`take_latest`](Mailbox::take_latest) at the block boundary and gets the
//! newest snapshot, or `None` when nothing changed since the last call.
//!
//! ```text
//!   producer            shared              consumer
//!  ┌────────┐  swap   ┌────────┐   swap   ┌────────┐
//!  │ write  │ ──────→ │ ready  │ ───────→ │  read  │
//!  └────────┘         └────────┘          └────────┘
//! ```
//!
//! Each side owns one slot outright; the third is exchanged through a single
//! atomic byte whose `FRESH` bit marks an unread value. Neither side ever
//! waits for the other and a publish can never fail.
//!
//! # Safety Contract
//!
//! - Only ONE context may call [`publish()`](Mailbox::publish).
//! - Only ONE context may call [`take_latest()`](Mailbox::take_latest).

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicU8, Ordering};

use crate::settings::SystemSettings;

const INDEX_MASK: u8 = 0b011;
const FRESH: u8 = 0b100;

/// Mailbox carrying complete [`SystemSettings`] snapshots.
pub type SettingsMailbox = Mailbox<SystemSettings>;

/// Latest-value slot shared by one producer and one consumer.
pub struct Mailbox<T: Copy> {
    slots: [UnsafeCell<MaybeUninit<T>>; 3],
    /// Slot the producer fills next. Touched by the producer only.
    write: AtomicU8,
    /// Slot index in transit between the two sides, plus `FRESH`.
    ready: AtomicU8,
    /// Slot the consumer read last. Touched by the consumer only.
    read: AtomicU8,
}

// SAFETY: values are copied across contexts, hence T: Send. The three slot
// indices are always a permutation of {0, 1, 2}, so the producer's write slot
// and the consumer's read slot never alias; the AcqRel swap on `ready`
// publishes the slot contents together with its index.
unsafe impl<T: Copy + Send> Sync for Mailbox<T> {}
unsafe impl<T: Copy + Send> Send for Mailbox<T> {}

impl<T: Copy> Mailbox<T> {
    pub const fn new() -> Self {
        Mailbox {
            // SAFETY: an array of uninitialized MaybeUninit<T> is always valid.
            slots: unsafe { MaybeUninit::<[UnsafeCell<MaybeUninit<T>>; 3]>::uninit().assume_init() },
            write: AtomicU8::new(0),
            ready: AtomicU8::new(1),
            read: AtomicU8::new(2),
        }
    }

    /// Make `value` the newest snapshot (producer side). An unread older
    /// snapshot is discarded.
    pub fn publish(&self, value: T) {
        let slot = self.write.load(Ordering::Relaxed);

        // SAFETY: sole producer, and `slot` is owned by the producer until
        // the swap below hands it over.
        unsafe {
            (*self.slots[slot as usize].get()).write(value);
        }

        let previous = self.ready.swap(slot | FRESH, Ordering::AcqRel);
        self.write.store(previous & INDEX_MASK, Ordering::Relaxed);
    }

    /// Newest snapshot published since the last call (consumer side).
    pub fn take_latest(&self) -> Option<T> {
        if self.ready.load(Ordering::Relaxed) & FRESH == 0 {
            return None;
        }

        let mine = self.read.load(Ordering::Relaxed);
        let incoming = self.ready.swap(mine, Ordering::AcqRel) & INDEX_MASK;
        self.read.store(incoming, Ordering::Relaxed);

        // SAFETY: sole consumer; the slot came in with `FRESH` set, so the
        // producer wrote it before its release swap.
        Some(unsafe { (*self.slots[incoming as usize].get()).assume_init_read() })
    }
}

impl<T: Copy> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_until_published() {
        let mb: Mailbox<u32> = Mailbox::new();
        assert_eq!(mb.take_latest(), None);
        mb.publish(7);
        assert_eq!(mb.take_latest(), Some(7));
        assert_eq!(mb.take_latest(), None);
    }

    #[test]
    fn newest_value_wins() {
        let mb: Mailbox<u32> = Mailbox::new();
        mb.publish(1);
        mb.publish(2);
        mb.publish(3);
        assert_eq!(mb.take_latest(), Some(3));
        assert_eq!(mb.take_latest(), None);
    }

    #[test]
    fn interleaved_publish_and_take() {
        let mb: Mailbox<u32> = Mailbox::new();
        for round in 0..20u32 {
            mb.publish(round * 10);
            if round % 3 != 0 {
                mb.publish(round * 10 + 1);
            }
            let expected = if round % 3 != 0 { round * 10 + 1 } else { round * 10 };
            assert_eq!(mb.take_latest(), Some(expected), "round {}", round);
        }
    }

    #[test]
    fn slots_stay_a_permutation() {
        let mb: Mailbox<u8> = Mailbox::new();
        for i in 0..50u8 {
            mb.publish(i);
            if i % 2 == 0 {
                mb.take_latest();
            }
            let w = mb.write.load(Ordering::Relaxed);
            let r = mb.read.load(Ordering::Relaxed);
            let t = mb.ready.load(Ordering::Relaxed) & INDEX_MASK;
            let mut seen = [false; 3];
            for idx in [w, r, t] {
                seen[idx as usize] = true;
            }
            assert_eq!(seen, [true; 3], "write {} read {} ready {}", w, r, t);
        }
    }

    #[test]
    fn carries_system_settings() {
        let mb = SettingsMailbox::new();
        let mut s = SystemSettings::new();
        s.crossover.cutoffs[0] = 120.0;
        mb.publish(SystemSettings::new());
        mb.publish(s);
        let got = mb.take_latest();
        assert_eq!(got.map(|v| v.crossover.cutoffs[0]), Some(120.0));
    }

    #[test]
    fn usable_from_static() {
        static MAILBOX: Mailbox<u16> = Mailbox::new();
        MAILBOX.publish(7);
        MAILBOX.publish(8);
        assert_eq!(MAILBOX.take_latest(), Some(8));
    }
}
