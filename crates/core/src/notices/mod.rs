//! Notices module.
//!
//! Controllers report outcomes (success, relayed remote errors, celebration)
//! through a `NoticeSink`; the view layer decides how to display them.

mod notice;
mod sink;

pub use notice::*;
pub use sink::*;
