//! One-file-per-signal reader.
//!
//! `time.dat` holds one i32 timestamp per sample; `amplifier.dat` holds i16
//! amplifier samples in sample-major order (`[N, n_channels]` row-major).
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use anyhow::{bail, Context, Result};
use ndarray::{Array1, Array2};

use super::{read_i16_le, read_i32_le, AMP_UV_PER_BIT};

/// Read the sample range `[start_sample, stop_sample)` from an OFPS pair.
///
/// Returns `(time, amp)` with amplifier data in µV.
pub fn read_ofps_batch<P: AsRef<Path>>(
    time_path: P,
    amp_path: P,
    start_sample: usize,
    stop_sample: usize,
    n_channels: usize,
) -> Result<(Array1<i64>, Array2<f32>)> {
    if start_sample > stop_sample {
        bail!("stop_sample cannot occur before start_sample");
    }
    let n = stop_sample - start_sample;
    let m = n_channels;
    let mut time = Array1::<i64>::zeros(n);
    let mut amp = Array2::<f32>::zeros((n, m));
    if n == 0 {
        return Ok((time, amp));
    }

    let time_buf = read_at(time_path.as_ref(), start_sample * 4, n * 4)?;
    let amp_buf = read_at(amp_path.as_ref(), start_sample * m * 2, n * m * 2)?;

    for sample_i in 0..n {
        time[sample_i] = read_i32_le(&time_buf, sample_i * 4) as i64;
        for channel_i in 0..m {
            let at = (sample_i * m + channel_i) * 2;
            amp[[sample_i, channel_i]] = AMP_UV_PER_BIT * read_i16_le(&amp_buf, at) as f32;
        }
    }

    Ok((time, amp))
}

fn read_at(path: &Path, offset: usize, len: usize) -> Result<Vec<u8>> {
    let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    file.seek(SeekFrom::Start(offset as u64))
        .with_context(|| format!("seek to {offset:#x} in {}", path.display()))?;
    let mut buf = vec![0u8; len];
    file.read_exact(&mut buf)
        .with_context(|| format!("read {len} bytes from {}", path.display()))?;
    Ok(buf)
}
