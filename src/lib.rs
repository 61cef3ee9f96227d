//! # spikekit — spike-sorting compute kernels in pure Rust
//!
//! `spikekit` implements the CPU-bound primitives of an extracellular
//! electrophysiology pipeline: binary acquisition decoding, spike detection
//! and snippeting, zero-phase IIR filtering, super-paramagnetic clustering,
//! timestamped-stream alignment, and the label-linkage graph operations that
//! stitch block-wise clustering results into a global labeling.
//!
//! ## Pipeline overview
//!
//! ```text
//! session.rhd / time.dat + amplifier.dat
//!   │
//!   ├─ intan::read_*_batch()     time, µV amplifier, aux, digital arrays
//!   ├─ sosfilt::sosfiltfilt()    zero-phase bandpass (biquad cascade)
//!   ├─ snippet_channel_groups()  hysteresis detection → waveforms per group
//!   ├─ spc / external sorter     per-block cluster labels
//!   └─ linkage / split / align   stitch, split and align labels across blocks
//! ```
//!
//! Every kernel is a batch operation over `ndarray` buffers: inputs are
//! borrowed views with documented shapes, outputs are owned arrays handed to
//! the caller. Kernels neither spawn threads nor keep state between calls;
//! the only randomness is SPC's, which owns a seedable per-call generator.
//!
//! ## Quick start
//!
//! ```no_run
//! use spikekit::{snippet_channel_groups, SnippetConfig};
//! use spikekit::intan::read_ofps_batch;
//!
//! let (time, amp) = read_ofps_batch("time.dat", "amplifier.dat", 0, 600_000, 64).unwrap();
//!
//! let cfg = SnippetConfig { hi_thr: 50.0, lo_thr: 20.0, ..SnippetConfig::default() };
//! let batch = snippet_channel_groups(
//!     time.as_slice().unwrap(),
//!     amp.view(),
//!     &cfg,
//! ).unwrap();
//!
//! for (g, times) in batch.times.iter().enumerate() {
//!     println!("group {g}: {} spikes", times.len());
//! }
//! ```

pub mod align;
pub mod detect;
pub mod intan;
pub mod linkage;
pub mod mask;
pub mod snippet;
pub mod sosfilt;
pub mod spc;
pub mod split;

// ── Crate-root re-exports ─────────────────────────────────────────────────
//
// Everything a downstream user is likely to need is available directly as
// `spikekit::Foo` without having to know the internal module layout.

// align
pub use align::{align_sequences, pair_sequences};

// detect
pub use detect::detect_channel;

// intan — format readers and the shared batch type
pub use intan::{
    read_ofps_batch, read_rhd2000_batch, read_rhd64_batch, RecordingBatch, Rhd2000Layout,
};

// linkage + split + mask — label graph operations
pub use linkage::Linkage;
pub use mask::{apply_venn_mask, Venn};
pub use split::{find_next_label, relabel, split_block_1d, split_blocks_2d};

// snippet
pub use snippet::{snippet_channel_groups, SnippetBatch, SnippetConfig};

// sosfilt
pub use sosfilt::{sosfiltfilt, PadType};

// spc
pub use spc::{
    super_paramagnetic_clustering, super_paramagnetic_clustering_with_rng, SpcParams,
};
