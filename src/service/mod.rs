pub mod prediction;
pub mod recalculation;
pub mod refresh;
