//! Spike snippeting over contiguous channel groups.
//!
//! Channels are processed in contiguous groups of `n_channels` (typically a
//! tetrode of 4); a spike on any channel of a group triggers waveform capture
//! on all of them. Detection uses hysteresis: a group enters the detected
//! state when any channel's rectified value exceeds `hi_thr`, and returns to
//! idle only after all channels have stayed below `lo_thr` for `return_n`
//! consecutive samples. While detected, the across-group peak is tracked; on
//! return, a window of `s_length` samples centered on the peak is emitted.
//!
//! State per group:
//!
//! ```text
//!            any |x| > hi_thr                 all |x| < lo_thr
//!   idle ────────────────────────► detected ──────────────────► returned++
//!    ▲                                │  ▲        any |x| ≥ lo_thr resets
//!    └──── returned ≥ return_n ◄──────┘  └──────── returned to 0
//!          (emit snippet at peak)
//! ```
use anyhow::{bail, Result};
use ndarray::{Array1, Array2, ArrayView2};

/// Parameters of the snippeting state machine.
///
/// Construct with struct-update syntax off [`SnippetConfig::default()`]:
///
/// ```
/// use spikekit::SnippetConfig;
///
/// let cfg = SnippetConfig {
///     hi_thr: 50.0,
///     lo_thr: 20.0,
///     ..SnippetConfig::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct SnippetConfig {
    /// Samples per snippet window. The window extends `s_length / 2` samples
    /// left of the peak and the remainder right.
    pub s_length: usize,
    /// Detection threshold in µV, applied to `|x|`. Must be positive.
    pub hi_thr: f32,
    /// Return threshold in µV, applied to `|x|`. Must be positive.
    pub lo_thr: f32,
    /// Consecutive sub-`lo_thr` samples required before a snippet finalizes.
    pub return_n: usize,
    /// Channels per contiguous group. The total channel count must be a
    /// whole multiple of this.
    pub n_channels: usize,
}

impl Default for SnippetConfig {
    /// Tetrode defaults: 64-sample windows, 4 channels per group.
    fn default() -> Self {
        Self {
            s_length: 64,
            hi_thr: 50.0,
            lo_thr: 20.0,
            return_n: 8,
            n_channels: 4,
        }
    }
}

/// Snippets extracted from one batch, one entry per channel group.
#[derive(Debug, Clone)]
pub struct SnippetBatch {
    /// Peak timestamps per group.
    pub times: Vec<Array1<i64>>,
    /// Waveforms per group, one row per event, flattened channel-major:
    /// `[c0 s0..sL, c1 s0..sL, …]`, row width `n_channels * s_length`.
    pub waveforms: Vec<Array2<f32>>,
    /// Largest event count over all groups.
    pub max_len: usize,
}

/// Detect and snippet spikes on a per-channel-group basis.
///
/// * `time` – timestamps, length N.
/// * `data` – amplifier data, shape `[N, M]` (µV).
///
/// For each group, `times` and `waveforms` have equal length. A snippet whose
/// peak sits closer than half a window to either edge of the batch is
/// dropped, but the group state still resets.
pub fn snippet_channel_groups(
    time: &[i64],
    data: ArrayView2<f32>,
    cfg: &SnippetConfig,
) -> Result<SnippetBatch> {
    if !(cfg.hi_thr > 0.0) {
        bail!("hi_thr must be positive");
    }
    if !(cfg.lo_thr > 0.0) {
        bail!("lo_thr must be positive");
    }

    let (n, m) = data.dim();
    if time.len() != n {
        bail!("time and data must have the same number of samples");
    }
    if m % cfg.n_channels != 0 {
        bail!("snippet_channel_groups did not receive a whole number of channel groups");
    }

    let t = m / cfg.n_channels;
    let snip_left = cfg.s_length / 2;
    let snip_right = cfg.s_length - snip_left;

    // Per-group state
    let mut detected = vec![false; t];
    let mut returned = vec![0usize; t];
    let mut peak_vals = vec![0.0_f32; t];
    let mut peak_idxs = vec![0usize; t];

    // Results
    let mut group_times: Vec<Vec<i64>> = vec![Vec::new(); t];
    let mut group_snippets: Vec<Vec<f32>> = vec![Vec::new(); t];

    for sample_i in 0..n {
        for t_i in 0..t {
            let c_g = t_i * cfg.n_channels; // start channel of this group
            if detected[t_i] {
                let mut below = true;
                let mut max = 0.0_f32;
                for chan_i in c_g..c_g + cfg.n_channels {
                    let val = data[[sample_i, chan_i]].abs();
                    below = below && (val < cfg.lo_thr);
                    max = max.max(val);
                }
                if max > peak_vals[t_i] {
                    peak_vals[t_i] = max;
                    peak_idxs[t_i] = sample_i;
                }
                if below {
                    returned[t_i] += 1;
                    if returned[t_i] >= cfg.return_n {
                        let peak_i = peak_idxs[t_i];
                        // Emit only if the window fits within the batch
                        if peak_i >= snip_left && peak_i + snip_right < n {
                            for c_i in c_g..c_g + cfg.n_channels {
                                for w_i in peak_i - snip_left..peak_i + snip_right {
                                    group_snippets[t_i].push(data[[w_i, c_i]]);
                                }
                            }
                            group_times[t_i].push(time[peak_i]);
                        }
                        detected[t_i] = false;
                        returned[t_i] = 0;
                        peak_vals[t_i] = 0.0;
                    }
                } else {
                    returned[t_i] = 0;
                }
            } else {
                let mut above = false;
                let mut max = 0.0_f32;
                for chan_i in c_g..c_g + cfg.n_channels {
                    let val = data[[sample_i, chan_i]].abs();
                    above = above || (val > cfg.hi_thr);
                    max = max.max(val);
                }
                if above {
                    detected[t_i] = true;
                    peak_vals[t_i] = max;
                    peak_idxs[t_i] = sample_i;
                }
            }
        }
    }

    let row_len = cfg.n_channels * cfg.s_length;
    let mut times = Vec::with_capacity(t);
    let mut waveforms = Vec::with_capacity(t);
    let mut max_len = 0usize;
    for (ts, ws) in group_times.into_iter().zip(group_snippets) {
        let s_n = ts.len();
        max_len = max_len.max(s_n);
        times.push(Array1::from_vec(ts));
        waveforms.push(
            Array2::from_shape_vec((s_n, row_len), ws)
                .expect("snippet row count mismatch"),
        );
    }

    Ok(SnippetBatch { times, waveforms, max_len })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn cfg() -> SnippetConfig {
        SnippetConfig {
            s_length: 8,
            hi_thr: 10.0,
            lo_thr: 5.0,
            return_n: 2,
            n_channels: 2,
        }
    }

    /// One clean spike on channel 0 of the first group.
    fn one_spike_data(n: usize, peak_at: usize) -> (Vec<i64>, Array2<f32>) {
        let time: Vec<i64> = (0..n as i64).collect();
        let mut data = Array2::<f32>::zeros((n, 4));
        data[[peak_at - 1, 0]] = 12.0;
        data[[peak_at, 0]] = 20.0;
        data[[peak_at + 1, 0]] = 11.0;
        (time, data)
    }

    #[test]
    fn single_spike_snippeted_at_peak() {
        let (time, data) = one_spike_data(64, 20);
        let out = snippet_channel_groups(&time, data.view(), &cfg()).unwrap();
        assert_eq!(out.times.len(), 2);
        assert_eq!(out.times[0].as_slice().unwrap(), &[20]);
        assert_eq!(out.times[1].len(), 0);
        assert_eq!(out.max_len, 1);
        // Waveform is [c0 s0..s7, c1 s0..s7]; peak lands at offset s_length/2.
        let w = &out.waveforms[0];
        assert_eq!(w.dim(), (1, 16));
        approx::assert_abs_diff_eq!(w[[0, 4]], 20.0, epsilon = 1e-6);
    }

    #[test]
    fn peak_has_group_maximum() {
        let (time, data) = one_spike_data(64, 30);
        let out = snippet_channel_groups(&time, data.view(), &cfg()).unwrap();
        let w = &out.waveforms[0];
        let max: f32 = w.iter().map(|v| v.abs()).fold(0.0, f32::max);
        approx::assert_abs_diff_eq!(max, 20.0, epsilon = 1e-6);
    }

    #[test]
    fn edge_spike_dropped_but_state_resets() {
        // Peak at sample 1: too close to the left edge for an 8-sample window.
        let (time, data) = one_spike_data(64, 2);
        let out = snippet_channel_groups(&time, data.view(), &cfg()).unwrap();
        assert_eq!(out.times[0].len(), 0);
        assert_eq!(out.waveforms[0].dim().0, 0);
    }

    #[test]
    fn rearm_above_lo_thr_resets_return_counter() {
        let time: Vec<i64> = (0..64).collect();
        let mut data = Array2::<f32>::zeros((64, 2));
        let cfg = SnippetConfig { n_channels: 2, ..cfg() };
        data[[20, 0]] = 20.0;
        data[[21, 0]] = 6.0; // above lo_thr: keeps the group detected
        data[[22, 0]] = 25.0; // new, larger peak
        let out = snippet_channel_groups(&time, data.view(), &cfg).unwrap();
        assert_eq!(out.times[0].as_slice().unwrap(), &[22]);
    }

    #[test]
    fn emitted_peaks_exceed_threshold_on_noise() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(5);
        let n = 4096;
        let time: Vec<i64> = (0..n as i64).collect();
        let data = Array2::from_shape_fn((n, 4), |_| rng.gen_range(-30.0_f32..30.0));
        let cfg = SnippetConfig {
            s_length: 16,
            hi_thr: 28.0,
            lo_thr: 25.0,
            return_n: 3,
            n_channels: 4,
        };
        let out = snippet_channel_groups(&time, data.view(), &cfg).unwrap();
        assert_eq!(out.times.len(), 1);
        assert!(out.max_len > 0, "noise above threshold produced no snippets");
        for (&t, w) in out.times[0].iter().zip(out.waveforms[0].rows()) {
            let s = t as usize;
            // The peak sample crossed the detection threshold on some channel
            let max: f32 = (0..4).map(|c| data[[s, c]].abs()).fold(0.0, f32::max);
            assert!(max > cfg.hi_thr, "peak at {s} below hi_thr");
            // and the waveform center reproduces the original data.
            for c in 0..4 {
                assert_eq!(w[c * cfg.s_length + cfg.s_length / 2], data[[s, c]]);
            }
        }
    }

    #[test]
    fn ragged_group_count_rejected() {
        let time: Vec<i64> = (0..4).collect();
        let data = Array2::<f32>::zeros((4, 3));
        let cfg = SnippetConfig { n_channels: 2, ..cfg() };
        assert!(snippet_channel_groups(&time, data.view(), &cfg).is_err());
    }
}
