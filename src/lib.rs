pub mod error;
pub mod net;
pub mod queue;
pub mod sim;

pub use error::{Result, SimError};

#[cfg(test)]
mod test;
