//! Benchmark-only crate. See `benches/`.
