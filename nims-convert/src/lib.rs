pub mod config;
pub mod driver;
pub mod error;
pub mod inputs;
pub mod metrics;

pub use config::*;
pub use driver::*;
pub use error::*;
pub use inputs::*;
pub use metrics::*;
