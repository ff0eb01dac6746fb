//! Audio and control data crossing into the DSP core.
//!
//! | Item | Direction | Description |
//! |------|-----------|-------------|
//! | [`AudioBuffer`] | codec ↔ core | One block of interleaved stereo `i16` |
//! | [`SettingsMailbox`] | control → audio | Lock-free settings hand-off |
//!
//! ## Utilities
//!
//! - [`interleave`]: interleaved `i16` ↔ planar `f32` conversion
//! - [`mailbox`]: latest-value settings slot (triple buffer)

pub mod interleave;
pub mod mailbox;

pub use mailbox::{Mailbox, SettingsMailbox};

use crate::constants::{AUDIO_BLOCK_FRAMES, AUDIO_BUFFER_SIZE};

/// One block of interleaved stereo audio: `[L0, R0, L1, R1, ...]`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AudioBuffer {
    pub data: [i16; AUDIO_BUFFER_SIZE],
}

impl AudioBuffer {
    /// A silent buffer.
    pub const fn new() -> Self {
        AudioBuffer {
            data: [0; AUDIO_BUFFER_SIZE],
        }
    }

    /// Build a buffer from per-frame `(left, right)` samples.
    pub fn from_fn<F: FnMut(usize) -> (i16, i16)>(mut f: F) -> Self {
        let mut buf = Self::new();
        for (i, frame) in buf.data.chunks_exact_mut(2).enumerate() {
            let (l, r) = f(i);
            frame[0] = l;
            frame[1] = r;
        }
        buf
    }

    pub fn silence(&mut self) {
        self.data.fill(0);
    }

    /// Number of stereo frames.
    pub const fn frames(&self) -> usize {
        AUDIO_BLOCK_FRAMES
    }

    /// Sample `frame` of `channel` (0 = left, 1 = right).
    pub fn sample(&self, frame: usize, channel: usize) -> i16 {
        self.data[frame * 2 + channel]
    }
}

impl Default for AudioBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for AudioBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AudioBuffer")
            .field("frames", &AUDIO_BLOCK_FRAMES)
            .field("head", &&self.data[..8])
            .finish()
    }
}
