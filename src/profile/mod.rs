//! Household profile data structures and loading

mod data;
pub mod loader;

pub use data::{
    Asset, AssetClass, FinancialProfile, Frequency, IncomeSources, InvestmentProperty, Liability,
    ProposedLoan,
};
pub use loader::{load_households, load_households_from_reader, load_profile, load_profile_from_reader};
