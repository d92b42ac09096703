//! Provide various utility functions and structs.
//!
//! The utility objects in this submodule are not documented.
//! Use at your own risk.
#![allow(missing_docs)]

pub(crate) mod hash;
mod number_theory;
mod random_generator;

// gather utilities in this module
pub use number_theory::*;
pub use random_generator::{key_material_rng, BlakeRngFactory, BlakeRng, PrngSeed, PRNG_SEED_BYTES};
