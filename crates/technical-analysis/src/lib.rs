pub mod indicators;
pub mod oscillator;

#[cfg(test)]
mod indicators_tests;

pub use indicators::*;
pub use oscillator::*;
