pub mod lyrics;
pub mod midi;
