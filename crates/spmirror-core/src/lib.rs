//! spmirror core - domain types and ports
//!
//! Provider-independent building blocks for mirroring a local directory
//! tree into a remote document library:
//!
//! - [`domain`] - validated newtypes and domain errors
//! - [`config`] - transfer and retry policy configuration
//! - [`ports`] - the [`ports::remote_store::RemoteStore`] seam implemented
//!   by remote adapters (and by fakes in tests)
//!
//! No network code lives in this crate.

pub mod config;
pub mod domain;
pub mod ports;
