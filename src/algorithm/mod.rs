/// Weighted color and weight sums split into per-cell slots
pub mod accumulator;
/// Parallel per-cell matching and blending
pub mod compositor;
/// Nearest average-color tile lookup
pub mod matching;
/// Stage orchestration from reference and tile pool to encoded output
pub mod pipeline;
