pub mod aggregator;
pub mod coursera;
pub mod edx;
pub mod provider;
pub mod udemy;
pub mod youtube;

pub use aggregator::*;
pub use coursera::*;
pub use edx::*;
pub use provider::*;
pub use udemy::*;
pub use youtube::*;
