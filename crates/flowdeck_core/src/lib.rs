//! Core context and bootstrap for the FlowDeck diagram panel plugin.
//! This crate is the single source of truth for plugin paths, descriptor
//! metadata, and diagnostic gating.

pub mod context;
pub mod descriptor;
pub mod logging;
pub mod paths;
pub mod popover;

pub use context::{
    active, clear_active, initialize, install_active, ContextMode, HostBindings, HostInjector,
    HostScope, InitMode, PluginContext, TemplateService, DEFAULT_PUBLIC_PATH, ROOT_PATH_ENV,
};
pub use descriptor::{
    load_descriptor, DescriptorError, DescriptorInfo, DescriptorLink, DescriptorResult,
    PluginDescriptor,
};
pub use logging::{
    default_log_level, init_logging, logging_status, PluginLog, LOG_DEBUG, LOG_ERROR, LOG_INFO,
    LOG_WARN,
};
pub use popover::{escape_html, render_popover};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
