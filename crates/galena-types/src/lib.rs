//! Galena Types - primitive types shared across the contract engine.

pub mod address;
pub mod error;
pub mod hash;

#[cfg(feature = "serde")]
mod serialization;

pub use address::Address;
pub use error::TypesError;
pub use hash::Hash;
