pub mod cache;
pub mod core;
pub mod edgar;

// Re-exports
pub use edgar::assemble::{CompanyFinancials, FilingFinancials};
pub use edgar::FactEngine;
