//! examples of usage of RustedPolar
/// double integrals in polar coordinates
pub mod polar_examples;
