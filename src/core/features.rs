//! Feature modules
//!
//! Each feature owns its own service types; presentation layers only talk to the façade a
//! feature exposes.

pub mod translator;
