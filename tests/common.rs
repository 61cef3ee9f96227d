/// Shared helpers for synthesized binary fixtures.
use std::path::PathBuf;

#[allow(unused)]
pub fn fixture_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("spikekit_{}_{name}", std::process::id()))
}

#[allow(unused)]
pub fn write_fixture(name: &str, bytes: &[u8]) -> PathBuf {
    let path = fixture_path(name);
    std::fs::write(&path, bytes)
        .unwrap_or_else(|e| panic!("writing fixture {}: {e}", path.display()));
    path
}
