//! mapscout - on-demand geospatial scanning service
//!
//! Clients submit coordinates over HTTP; a pool of account-bound workers walks
//! a jittered spiral around each one, queries the remote map source per
//! sample, and pushes the classified map items to a downstream sink.

pub mod aggregate;
pub mod config;
pub mod geo;
pub mod ingress;
pub mod queue;
pub mod sink;
pub mod source;
pub mod worker;

#[cfg(test)]
mod test_support;
