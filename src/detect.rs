//! Single-channel refractory threshold detection.
//!
//! The detector is a two-state machine: in the idle state it fires whenever
//! the rectified signal exceeds `thr`, emitting the timestamp of the crossing
//! sample; it then stays silent for `refr` samples (strictly greater than)
//! before rearming. Used for event channels where full waveform snippeting
//! (see [`crate::snippet`]) is unnecessary.
use anyhow::{bail, Result};

/// Detect threshold crossings on a single channel with a refractory period.
///
/// * `time` – timestamps, one per sample.
/// * `data` – amplifier samples (µV), same length as `time`.
/// * `thr`  – detection threshold, applied to `|x|`. Must be positive.
/// * `refr` – number of samples to hold off after a detection.
///
/// Returns the ordered timestamps of detected events. Consecutive outputs are
/// guaranteed to be more than `refr` samples apart.
pub fn detect_channel(time: &[i64], data: &[f32], thr: f32, refr: usize) -> Result<Vec<i64>> {
    if !(thr > 0.0) {
        bail!("thr must be positive");
    }
    if time.len() != data.len() {
        bail!("time and data must have the same length");
    }

    let mut detected = false;
    let mut since_detected: usize = 0;
    let mut detected_times = Vec::new();

    for (t, &x) in time.iter().zip(data.iter()) {
        if detected {
            since_detected += 1;
            if since_detected > refr {
                detected = false;
                since_detected = 0;
            }
        } else if x.abs() > thr {
            detected = true;
            detected_times.push(*t);
        }
    }

    Ok(detected_times)
}
