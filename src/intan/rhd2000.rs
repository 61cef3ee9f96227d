//! RHD2000 traditional-format reader.
//!
//! The file is a header followed by fixed-size data blocks. Per block:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ samples_per_block × i32   timestamps                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │ n_channels × samples_per_block × u16   amplifier,            │
//! │   column-major: all samples of ch 0, then ch 1, …            │
//! ├──────────────────────────────────────────────────────────────┤
//! │ aux region, bytes_after_amp bytes total:                     │
//! │   n_analog_channels × (samples_per_block / 4) × u16 analog   │
//! │   (quarter-rate), computed gap, then if digital input is     │
//! │   enabled samples_per_block × u16 digital words              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The geometry is caller-supplied; it comes out of the RHD file header,
//! which is parsed at a higher level.
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use anyhow::{bail, Context, Result};
use ndarray::{Array1, Array2};

use super::{read_i32_le, read_u16_le, RecordingBatch, AMP_UV_PER_BIT, AUX_V_PER_BIT};

/// On-disk geometry of one RHD2000 file, as derived from its header.
#[derive(Debug, Clone)]
pub struct Rhd2000Layout {
    /// Byte offset of the first data block.
    pub header_offset: usize,
    /// Total bytes per data block.
    pub bytes_per_block: usize,
    /// Bytes of auxiliary data following the amplifier region per block.
    pub bytes_after_amp: usize,
    /// Amplifier samples per data block.
    pub samples_per_block: usize,
    /// Number of amplifier channels.
    pub n_channels: usize,
    /// Number of auxiliary analog input channels.
    pub n_analog_channels: usize,
    /// Whether the digital input stream is present.
    pub digital_in_enabled: bool,
}

/// Read the sample range `[start_sample, stop_sample)` from an RHD2000 file.
///
/// Reads are block-aligned: the enclosing blocks are pulled from disk and the
/// start/stop offsets skip or truncate within them, so the output arrays have
/// exactly `stop_sample - start_sample` rows. Analog aux channels are stored
/// at one quarter of the amplifier rate and are upsampled by sample-and-hold.
pub fn read_rhd2000_batch<P: AsRef<Path>>(
    path: P,
    layout: &Rhd2000Layout,
    start_sample: usize,
    stop_sample: usize,
) -> Result<RecordingBatch> {
    let path = path.as_ref();
    if start_sample > stop_sample {
        bail!("stop_sample cannot occur before start_sample");
    }
    let spb = layout.samples_per_block;
    if spb == 0 {
        bail!("samples_per_block must be positive");
    }

    let n = stop_sample - start_sample;
    let m = layout.n_channels;
    let ma = layout.n_analog_channels;
    let md = usize::from(layout.digital_in_enabled);

    let mut time = Array1::<i64>::zeros(n);
    let mut amp = Array2::<f32>::zeros((n, m));
    let mut analog = Array2::<f32>::zeros((n, ma));
    let mut digital = Array1::<u16>::zeros(n);
    if n == 0 {
        return Ok(RecordingBatch { time, amp, analog, digital });
    }

    let gap = layout
        .bytes_after_amp
        .checked_sub(md * 2 * spb + 2 * ma * (spb / 4))
        .context("bytes_after_amp too small for the aux channel layout")?;

    let start_block = start_sample / spb;
    // Snap the stop to its enclosing block; a block-aligned stop keeps the
    // final block whole instead of touching the next one.
    let (stop_block, stop_offset) = if stop_sample % spb == 0 {
        (stop_sample / spb, spb)
    } else {
        (stop_sample / spb + 1, stop_sample % spb)
    };
    let start_offset = start_sample % spb;
    if start_block >= stop_block {
        bail!("Start block must occur before stop block");
    }

    let n_blocks = stop_block - start_block;
    let buf_size = n_blocks * layout.bytes_per_block;
    let buf_offset = layout.header_offset + start_block * layout.bytes_per_block;

    let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    file.seek(SeekFrom::Start(buf_offset as u64))
        .with_context(|| format!("seek to block data @ {buf_offset:#x}"))?;
    let mut buffer = vec![0u8; buf_size];
    file.read_exact(&mut buffer)
        .with_context(|| format!("read {n_blocks} blocks from {}", path.display()))?;

    // Cursor state across blocks
    let mut buf_i = 4 * start_offset; // skip start offset for time
    let mut amp_t_i = 0usize;
    let mut digital_i = 0usize;
    let mut sample_i_start = start_offset;

    for block_i in 0..n_blocks {
        let sample_i_stop = if block_i == n_blocks - 1 { stop_offset } else { spb };

        // Time
        for _ in sample_i_start..sample_i_stop {
            time[amp_t_i] = read_i32_le(&buffer, buf_i) as i64;
            amp_t_i += 1;
            buf_i += 4;
        }
        buf_i += (spb - sample_i_stop) * 4;

        // Amplifier: the block stores each channel's samples contiguously.
        for channel_i in 0..m {
            buf_i += sample_i_start * 2;
            for sample_i in sample_i_start..sample_i_stop {
                let row = block_i * spb + sample_i - start_offset;
                amp[[row, channel_i]] =
                    AMP_UV_PER_BIT * (read_u16_le(&buffer, buf_i) as f32 - 32768.0);
                buf_i += 2;
            }
            buf_i += (spb - sample_i_stop) * 2;
        }

        let old_buf_i = buf_i;

        // Analog aux: quarter-rate storage, sample-and-hold upsample.
        for channel_i in 0..ma {
            let mut analog_value = 0.0_f32;
            for sample_i in 0..spb {
                if sample_i % 4 == 0 {
                    analog_value = AUX_V_PER_BIT * read_u16_le(&buffer, buf_i) as f32;
                    buf_i += 2;
                }
                if sample_i >= sample_i_start && sample_i < sample_i_stop {
                    let row = block_i * spb + sample_i - start_offset;
                    analog[[row, channel_i]] = analog_value;
                }
            }
        }

        buf_i += gap;

        // Digital words
        if md > 0 {
            buf_i += sample_i_start * 2;
            for _ in sample_i_start..sample_i_stop {
                digital[digital_i] = read_u16_le(&buffer, buf_i);
                digital_i += 1;
                buf_i += 2;
            }
            buf_i += (spb - sample_i_stop) * 2;
            if digital_i != amp_t_i {
                bail!("Digital index data inconsistent");
            }
        }

        if old_buf_i + layout.bytes_after_amp != buf_i {
            bail!("Inconsistent index after reading aux data");
        }
        sample_i_start = 0;
    }

    Ok(RecordingBatch { time, amp, analog, digital })
}
