pub mod comparison;
pub mod harness;
pub mod worker;

pub use comparison::compare;
pub use harness::Harness;
