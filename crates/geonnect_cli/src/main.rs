//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `geonnect_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("geonnect_core ping={}", geonnect_core::ping());
    println!("geonnect_core version={}", geonnect_core::core_version());
}
