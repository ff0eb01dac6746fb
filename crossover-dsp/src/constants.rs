/// Number of interleaved 16-bit samples per audio buffer (L, R, L, R, ...).
pub const AUDIO_BUFFER_SIZE: usize = 256;

/// Number of stereo frames per audio buffer.
pub const AUDIO_BLOCK_FRAMES: usize = AUDIO_BUFFER_SIZE / NUM_CHANNELS;

/// Number of audio channels (left, right).
pub const NUM_CHANNELS: usize = 2;

/// Number of crossover bands (sub, low, mid, high).
pub const NUM_BANDS: usize = 4;

/// Nominal sample rate in Hz (I2S master clock configuration of the board).
pub const SAMPLE_RATE: f32 = 48_000.0;

/// Longest per-band delay in milliseconds.
pub const MAX_DELAY_MS: f32 = 100.0;

/// Longest per-band delay in samples at [`SAMPLE_RATE`].
pub const MAX_DELAY_SAMPLES: usize = 4800;

/// Delay line storage per channel: the longest delay plus the current sample
/// and one sample of interpolation headroom.
pub const DELAY_LINE_CAPACITY: usize = MAX_DELAY_SAMPLES + 2;

/// Full-scale value used for `i16` ↔ `f32` conversion.
pub const FULL_SCALE: f32 = 32767.0;
