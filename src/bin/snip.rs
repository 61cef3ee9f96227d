use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use spikekit::intan::read_ofps_batch;
use spikekit::{snippet_channel_groups, SnippetConfig};

#[derive(Parser)]
#[command(name = "snip", about = "Detect and snippet spikes from an OFPS recording")]
struct Args {
    /// time.dat from the Intan one-file-per-signal session
    #[arg(long)]
    time: PathBuf,

    /// amplifier.dat from the same session
    #[arg(long)]
    amplifier: PathBuf,

    /// Number of amplifier channels in the recording
    #[arg(long)]
    channels: usize,

    /// First sample to read (inclusive)
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Last sample to read (exclusive)
    #[arg(long)]
    stop: usize,

    /// Detection threshold in µV (default: 50)
    #[arg(long, default_value_t = 50.0)]
    hi_thr: f32,

    /// Return threshold in µV (default: 20)
    #[arg(long, default_value_t = 20.0)]
    lo_thr: f32,

    /// Snippet length in samples (default: 64)
    #[arg(long, default_value_t = 64)]
    length: usize,

    /// Channels per detection group (default: 4)
    #[arg(long, default_value_t = 4)]
    group: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (time, amp) = read_ofps_batch(
        &args.time,
        &args.amplifier,
        args.start,
        args.stop,
        args.channels,
    )?;
    println!("Loaded {} samples × {} channels", amp.nrows(), amp.ncols());

    let cfg = SnippetConfig {
        s_length: args.length,
        hi_thr: args.hi_thr,
        lo_thr: args.lo_thr,
        n_channels: args.group,
        ..SnippetConfig::default()
    };

    let batch = snippet_channel_groups(time.as_slice().unwrap(), amp.view(), &cfg)?;
    for (g, times) in batch.times.iter().enumerate() {
        println!("group {g}: {} spikes", times.len());
    }
    println!("busiest group: {} spikes", batch.max_len);

    Ok(())
}
