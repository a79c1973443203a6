// programs/parasol_pool/src/instructions/mod.rs

pub mod claims;
pub mod initialize;
pub mod vault;

pub use claims::*;
pub use initialize::*;
pub use vault::*;
