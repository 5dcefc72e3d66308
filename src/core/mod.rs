//! CarrotLink - Core constants, error types, and host seams.
//!
//! This module provides the foundational pieces shared by every layer.
//! It has minimal dependencies and defines the protocol constants, the
//! error taxonomy, and the host-capability traits.

mod constants;
mod error;
mod traits;

pub use constants::*;
pub use error::*;
pub use traits::*;
