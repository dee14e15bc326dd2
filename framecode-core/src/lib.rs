//! # Framecode Core
//!
//! Core numeric primitives for the framecode crates.
//!
//! Timestamps, frame rates and frame counts are all carried as exact
//! [`Rational`] values so that repeated conversions between notations never
//! accumulate floating point error.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod error;
pub mod rational;

pub use error::{Error, Result};
pub use rational::Rational;
