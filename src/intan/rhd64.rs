//! FAST-format RHD64 reader.
//!
//! Fixed geometry: 64 amplifier channels across two 32-channel chips, one
//! 176-byte record per sample:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ 8 header │ i32 timestamp │ 4 unused │ 2 VDD/temp │ 2 acc   │
//! │ 4 unused │ 128 amplifier (inter-chip interleaved:          │
//! │   chip0 ch0, chip1 ch0, chip0 ch1, chip1 ch1, …)           │
//! │ 20 unused │ u16 digital │ 2 trailing                       │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The three accelerometer channels are interleaved across consecutive
//! samples in a four-phase cycle (NONE, X, Y, Z, NONE, X, Y, Z, …). A triplet
//! is buffered and back-filled over the contiguous output rows once the Z
//! phase lands; rows before the first complete triplet and after the last one
//! are zero.
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use anyhow::{bail, Context, Result};
use ndarray::{Array1, Array2};

use super::{read_i32_le, read_u16_le, RecordingBatch, AMP_UV_PER_BIT, AUX_V_PER_BIT};

const N_CHIPS: usize = 2;
const CHANNELS_PER_CHIP: usize = 32;
const N_CHANNELS: usize = N_CHIPS * CHANNELS_PER_CHIP;
const N_ACC_CHANNELS: usize = 3;
const BYTES_PER_SAMPLE: usize = 176;

/// Read the sample range `[start_sample, stop_sample)` from a FAST RHD64 file.
pub fn read_rhd64_batch<P: AsRef<Path>>(
    path: P,
    start_sample: usize,
    stop_sample: usize,
) -> Result<RecordingBatch> {
    let path = path.as_ref();
    if start_sample > stop_sample {
        bail!("Stop sample cannot occur before start sample");
    }

    let n = stop_sample - start_sample;
    let mut time = Array1::<i64>::zeros(n);
    let mut amp = Array2::<f32>::zeros((n, N_CHANNELS));
    let mut acc = Array2::<f32>::zeros((n, N_ACC_CHANNELS));
    let mut digital = Array1::<u16>::zeros(n);
    if n == 0 {
        return Ok(RecordingBatch { time, amp, analog: acc, digital });
    }

    let buf_size = n * BYTES_PER_SAMPLE;
    let buf_offset = start_sample * BYTES_PER_SAMPLE;

    let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    file.seek(SeekFrom::Start(buf_offset as u64))
        .with_context(|| format!("seek to sample data @ {buf_offset:#x}"))?;
    let mut buffer = vec![0u8; buf_size];
    file.read_exact(&mut buffer)
        .with_context(|| format!("read {n} samples from {}", path.display()))?;

    let mut buf_i = 0usize;
    let mut acc_buffer = [0.0_f32; N_ACC_CHANNELS];
    let mut acc_i = 0usize; // next accelerometer output row to backfill
    let mut quad_i = start_sample % 4; // absolute four-phase index
    let mut acc_started = quad_i == 1; // first complete triplet reached

    for sample_i in 0..n {
        // Header
        buf_i += 8;
        // Timestamp
        time[sample_i] = read_i32_le(&buffer, buf_i) as i64;
        buf_i += 4;
        // Unused, VDD/temp
        buf_i += 4 + 2;
        // Accelerometer: skip the NONE phase, and wait for the first complete
        // triplet so no partial triplet is ever emitted.
        if quad_i > 0 && acc_started {
            acc_buffer[quad_i - 1] =
                AUX_V_PER_BIT * (read_u16_le(&buffer, buf_i) as f32 - 32768.0);
            if quad_i == 3 {
                while acc_i < sample_i {
                    for (c, &v) in acc_buffer.iter().enumerate() {
                        acc[[acc_i, c]] = v;
                    }
                    acc_i += 1;
                }
            }
        }
        buf_i += 2;
        // Unused
        buf_i += 4;
        // Amplifier: channels across the two chips are interleaved.
        for chip_i in 0..N_CHIPS {
            let buf_i_chip = buf_i + chip_i * 2;
            for channel_i in 0..CHANNELS_PER_CHIP {
                let buf_i_chan = buf_i_chip + channel_i * N_CHIPS * 2;
                amp[[sample_i, chip_i * CHANNELS_PER_CHIP + channel_i]] =
                    AMP_UV_PER_BIT * (read_u16_le(&buffer, buf_i_chan) as f32 - 32768.0);
            }
        }
        buf_i += 2 * N_CHANNELS;
        // Unused
        buf_i += 20;
        // Digital word; the cursor advance covers the trailing bytes.
        digital[sample_i] = read_u16_le(&buffer, buf_i);
        buf_i += 4;

        quad_i = (quad_i + 1) % 4;
        acc_started = acc_started || quad_i == 1;
    }

    if buf_i != buf_size {
        bail!("Inconsistent index after reading sample records");
    }

    Ok(RecordingBatch { time, amp, analog: acc, digital })
}
