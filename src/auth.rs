//! Bearer credential models handed from token sources to signers.

pub mod token;

pub use token::{secret::*, *};
