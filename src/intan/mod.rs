//! Intan acquisition format readers.
//!
//! Three on-disk layouts are supported, all little-endian:
//!
//! * [`rhd2000`] — block-structured RHD2000 traditional format (caller
//!   supplies the geometry parsed from the RHD header),
//! * [`rhd64`] — the FAST 64-channel sample-interleaved variant,
//! * [`ofps`] — one-file-per-signal (`time.dat` + `amplifier.dat`).
//!
//! # Quick start
//! ```no_run
//! use spikekit::intan::rhd64::read_rhd64_batch;
//!
//! let batch = read_rhd64_batch("session.rhd", 0, 30_000).unwrap();
//! println!("{} samples x {} channels", batch.time.len(), batch.amp.ncols());
//! ```
pub mod ofps;
pub mod rhd2000;
pub mod rhd64;

pub use ofps::read_ofps_batch;
pub use rhd2000::{read_rhd2000_batch, Rhd2000Layout};
pub use rhd64::read_rhd64_batch;

use ndarray::{Array1, Array2};

/// One decoded batch of a recording. All four arrays are temporally aligned.
#[derive(Debug, Clone)]
pub struct RecordingBatch {
    /// Timestamps as stored in the file, one per sample.
    pub time: Array1<i64>,
    /// Amplifier data in µV, shape `[N, n_channels]`.
    pub amp: Array2<f32>,
    /// Auxiliary analog data in V, shape `[N, n_analog_channels]`,
    /// upsampled to the amplifier rate by sample-and-hold.
    pub analog: Array2<f32>,
    /// Digital input bitmask per sample.
    pub digital: Array1<u16>,
}

/// ADC microvolt scale shared by all amplifier formats.
pub(crate) const AMP_UV_PER_BIT: f32 = 0.195;
/// Auxiliary ADC volt scale.
pub(crate) const AUX_V_PER_BIT: f32 = 3.74e-5;

#[inline]
pub(crate) fn read_i32_le(buf: &[u8], at: usize) -> i32 {
    i32::from_le_bytes(buf[at..at + 4].try_into().unwrap())
}

#[inline]
pub(crate) fn read_i16_le(buf: &[u8], at: usize) -> i16 {
    i16::from_le_bytes(buf[at..at + 2].try_into().unwrap())
}

#[inline]
pub(crate) fn read_u16_le(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes(buf[at..at + 2].try_into().unwrap())
}
