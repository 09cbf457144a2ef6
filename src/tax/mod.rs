//! Annual income tax, levy and study-loan repayment

mod engine;
mod offsets;
mod result;

pub use engine::{TaxEngine, TaxInput};
pub use offsets::{franking_offset, negative_gearing, NegativeGearing};
pub use result::TaxResult;
