//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `flowdeck_core` linkage.
//! - Print the resolved standalone context for quick local sanity checks.

use flowdeck_core::{initialize, InitMode};

fn main() {
    let context = initialize(InitMode::Standalone { root_path: None });
    println!("flowdeck_core version={}", flowdeck_core::core_version());
    println!("root={}", context.root_path());
    println!("id={}", context.id().unwrap_or("<absent>"));
    println!("plugin_version={}", context.version().unwrap_or("<absent>"));
    println!("libs={}", context.libs_path());
    println!("shapes={}", context.shapes_path());
    println!("graph_engine={}", context.graph_engine_base_path());
    println!("partials={}", context.partials_path());
}
