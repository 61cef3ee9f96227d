//! Zero-phase forward-backward IIR filtering with second-order sections.
//!
//! Port of scipy's `sosfiltfilt`: the biquad cascade runs forward over a
//! reflected extension of the signal, then backward, cancelling the phase
//! response. Sections use the transposed direct-form-II update:
//!
//! ```text
//! y      = b0·x + z0
//! z0     = b1·x − a1·y + z1
//! z1     = b2·x − a2·y
//! ```
//!
//! Each channel (column) of the `[N, M]` buffer is filtered independently.
use anyhow::{bail, Result};
use ndarray::{Array2, ArrayView2};

/// Signal extension at the buffer edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadType {
    /// Sign-flipped reflection: `−x[i]` mirrored about the edge.
    Odd,
    /// Plain reflection: `x[i]` mirrored about the edge.
    Even,
}

/// Apply a forward-backward second-order-section filter in place.
///
/// * `sos` – section coefficients `[n_sections, 6]` as `b0 b1 b2 a0 a1 a2`
///   (normalized, `a0 == 1`).
/// * `zi`  – unit-step initial conditions `[n_sections, 2]`; scaled by the
///   first padded sample of each channel and pass.
/// * `x`   – data `[N, M]`, filtered along axis 0, modified in place.
/// * `pad_len` – extension length at each end; must be less than `N`.
pub fn sosfiltfilt(
    sos: ArrayView2<f32>,
    zi: ArrayView2<f32>,
    x: &mut Array2<f32>,
    pad: PadType,
    pad_len: usize,
) -> Result<()> {
    let (n, m) = x.dim();
    let n_sections = sos.nrows();
    if sos.ncols() != 6 {
        bail!("sos must have 6 coefficients per section");
    }
    if zi.dim() != (n_sections, 2) {
        bail!("zi must have shape [n_sections, 2]");
    }
    if pad_len == 0 {
        bail!("pad_len must be positive");
    }
    if n <= pad_len {
        bail!("signal length must exceed pad_len");
    }

    let sgn = match pad {
        PadType::Odd => -1.0_f32,
        PadType::Even => 1.0_f32,
    };

    // Reflected extensions, one row per padded sample.
    let mut l_ext = Array2::<f32>::zeros((pad_len, m));
    let mut r_ext = Array2::<f32>::zeros((pad_len, m));
    for c in 0..m {
        for i in 0..pad_len {
            l_ext[[pad_len - i - 1, c]] = x[[i, c]] * sgn;
            r_ext[[i, c]] = x[[n - i - 1, c]] * sgn;
        }
    }

    // Per-channel, per-section filter state.
    let mut state = vec![[0.0_f32; 2]; m * n_sections];

    // Forward pass: left extension, data, right extension.
    init_state(&mut state, zi, &l_ext, 0);
    for c in 0..m {
        cascade(sos, &mut state, &mut l_ext, 0..pad_len, c);
        cascade(sos, &mut state, x, 0..n, c);
        cascade(sos, &mut state, &mut r_ext, 0..pad_len, c);
    }

    // Backward pass: right extension reversed, data reversed.
    init_state(&mut state, zi, &r_ext, pad_len - 1);
    for c in 0..m {
        cascade(sos, &mut state, &mut r_ext, (0..pad_len).rev(), c);
        cascade(sos, &mut state, x, (0..n).rev(), c);
    }

    Ok(())
}

/// Scale the unit-step initial conditions by the first processed sample.
fn init_state(state: &mut [[f32; 2]], zi: ArrayView2<f32>, ext: &Array2<f32>, row: usize) {
    let n_sections = zi.nrows();
    for s in 0..n_sections {
        for c in 0..ext.ncols() {
            state[c * n_sections + s][0] = zi[[s, 0]] * ext[[row, c]];
            state[c * n_sections + s][1] = zi[[s, 1]] * ext[[row, c]];
        }
    }
}

/// Run the section cascade over one channel for the given row order.
fn cascade(
    sos: ArrayView2<f32>,
    state: &mut [[f32; 2]],
    buf: &mut Array2<f32>,
    rows: impl Iterator<Item = usize>,
    c: usize,
) {
    let n_sections = sos.nrows();
    for i in rows {
        for s in 0..n_sections {
            let zi = c * n_sections + s;
            let x_i = buf[[i, c]];
            let y = sos[[s, 0]] * x_i + state[zi][0];
            state[zi][0] = sos[[s, 1]] * x_i - sos[[s, 4]] * y + state[zi][1];
            state[zi][1] = sos[[s, 2]] * x_i - sos[[s, 5]] * y;
            buf[[i, c]] = y;
        }
    }
}
