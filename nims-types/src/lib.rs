pub mod encoding;
pub mod endianness;
pub mod error;
pub mod header;
pub mod sample_block;

pub use encoding::*;
pub use endianness::*;
pub use error::*;
pub use header::*;
pub use sample_block::*;
