//! Ports - interfaces between the core and the outside world

pub mod remote_store;
