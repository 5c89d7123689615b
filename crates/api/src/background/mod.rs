//! Background tasks spawned by the API binary.

pub mod lease_reaper;
