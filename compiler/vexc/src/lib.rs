//! Vex Checker Driver
//!
//! Loads a serialized [`CheckInput`], runs [`vex_borrowck::check_module`],
//! renders the diagnostics, and on success writes the annotated module.
//!
//! The binary in `main.rs` is a thin argument parser over [`commands`].

pub mod commands;
mod error;
mod input;

pub use error::DriverError;
pub use input::CheckInput;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=vex_borrowck=debug`; add `VEX_LOG_TREE=1` for
/// indented span trees instead of flat lines.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_err() {
            return;
        }

        let filter = EnvFilter::from_default_env();
        let tree = std::env::var("VEX_LOG_TREE").is_ok_and(|v| v == "1");
        let tree_layer = tree.then(|| {
            tracing_tree::HierarchicalLayer::new(2)
                .with_writer(std::io::stderr)
                .with_targets(true)
                .with_bracketed_fields(true)
        });
        let flat_layer = (!tree).then(|| {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
        });

        tracing_subscriber::registry()
            .with(filter)
            .with(tree_layer)
            .with(flat_layer)
            .init();
    });
}
