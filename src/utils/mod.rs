//! Various useful things.

pub mod date;
pub mod net;
