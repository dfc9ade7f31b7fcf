//! Utils module - display helpers shared by the views.

mod currency;

pub use currency::{format_currency, format_percent};
