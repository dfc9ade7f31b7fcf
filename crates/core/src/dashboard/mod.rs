//! Dashboard module - everything the savings overview renders, loaded in one go.

mod overview;


pub use overview::SavingsOverview;
