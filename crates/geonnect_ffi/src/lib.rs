//! Flutter-facing FFI crate for the Geonnect core.

pub mod api;
