pub mod actions;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use actions::{deduction, entry, record_results};
#[allow(unused_imports)]
pub use mocks::FlakyResultsRepository;
#[allow(unused_imports)]
pub use setup::{TestLeague, TestSetup, TestSetupBuilder};
