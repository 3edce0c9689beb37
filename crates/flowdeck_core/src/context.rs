//! Plugin context construction and the process-wide access point.
//!
//! # Responsibility
//! - Select the install root for standalone and hosted initialization.
//! - Own descriptor metadata, derived asset paths, and the diagnostic
//!   facility for one plugin instance.
//! - Publish the active context for unrelated UI collaborators.
//!
//! # Invariants
//! - `root_path` never changes after construction; derived paths are pure
//!   functions of it.
//! - `repository_url` is derived exactly once, at construction.
//! - Construction never fails; a missing descriptor degrades the metadata
//!   getters to `None`.
//! - The process-wide slot is replaced whole on publish; last writer wins.

use crate::descriptor::{load_descriptor, PluginDescriptor};
use crate::logging::PluginLog;
use crate::paths;
use crate::popover;
use log::warn;
use once_cell::sync::Lazy;
use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::sync::{Arc, RwLock};

/// Fixed public install location of the FlowDeck panel under the host's
/// asset root. Fallback root in standalone mode, suffix in hosted mode.
pub const DEFAULT_PUBLIC_PATH: &str = "/public/plugins/flowdeck-panel/";

/// Environment override for the standalone install root.
pub const ROOT_PATH_ENV: &str = "FLOWDECK_PLUGIN_ROOT";

static ACTIVE_CONTEXT: Lazy<RwLock<Option<Arc<PluginContext>>>> =
    Lazy::new(|| RwLock::new(None));

/// Host dashboard scope handle.
pub trait HostScope: Send + Sync {
    /// Base URL prefix the host application is served under.
    fn app_sub_url(&self) -> String;
}

/// Host dependency injector handle.
pub trait HostInjector: Send + Sync {
    /// Resolves one host service by name; `None` when the host does not
    /// provide it.
    fn resolve(&self, service: &str) -> Option<Arc<dyn Any + Send + Sync>>;
}

/// Host template interpolation service.
pub trait TemplateService: Send + Sync {
    /// Expands host template variables inside `input`.
    fn replace(&self, input: &str) -> String;
}

/// Handles into the surrounding dashboard application.
///
/// Present only on contexts initialized in hosted mode.
#[derive(Clone)]
pub struct HostBindings {
    pub scope: Arc<dyn HostScope>,
    pub injector: Arc<dyn HostInjector>,
    pub root_scope: Arc<dyn HostScope>,
    pub template_service: Arc<dyn TemplateService>,
}

impl Debug for HostBindings {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostBindings").finish_non_exhaustive()
    }
}

/// Execution environment the context was constructed for.
#[derive(Debug, Clone)]
pub enum ContextMode {
    /// No host application; filesystem/execution root only.
    Standalone,
    /// Bound into the dashboard host scope/injection system.
    Hosted(HostBindings),
}

/// Initialization mode for [`initialize`].
#[derive(Debug, Clone)]
pub enum InitMode {
    /// Derive the root from the explicit override, the
    /// [`ROOT_PATH_ENV`] environment variable, the executable's own
    /// directory, or [`DEFAULT_PUBLIC_PATH`], in that order.
    Standalone { root_path: Option<String> },
    /// Root is `scope.app_sub_url()` joined with [`DEFAULT_PUBLIC_PATH`].
    Hosted(HostBindings),
}

/// The single stateful context object for the plugin.
///
/// Everything the rest of the extension needs at runtime hangs off this
/// type: the install root and paths derived from it, descriptor metadata,
/// the diagnostic facility, and host bindings in hosted mode.
#[derive(Debug)]
pub struct PluginContext {
    root_path: String,
    descriptor: Option<PluginDescriptor>,
    repository_url: Option<String>,
    log: PluginLog,
    mode: ContextMode,
}

impl PluginContext {
    /// Constructs a context over `root_path`, loading the descriptor once.
    ///
    /// Construction always succeeds: a descriptor that cannot be read or
    /// parsed is reported through the log facade and left absent, and every
    /// descriptor-derived getter returns `None`.
    ///
    /// Direct construction bypasses the process-wide slot; use
    /// [`initialize`] to publish the context for global lookup.
    pub fn new(root_path: impl Into<String>, mode: ContextMode) -> Self {
        let root_path = root_path.into();
        let descriptor = match load_descriptor(&root_path) {
            Ok(descriptor) => Some(descriptor),
            Err(err) => {
                warn!(
                    "event=descriptor_load module=context status=error root={root_path} error={err}"
                );
                None
            }
        };
        let repository_url = descriptor
            .as_ref()
            .and_then(PluginDescriptor::repository_url)
            .map(str::to_string);

        Self {
            root_path,
            descriptor,
            repository_url,
            log: PluginLog::new(),
            mode,
        }
    }

    /// Base path the plugin was loaded from.
    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    /// Loaded descriptor metadata; `None` when loading failed.
    pub fn descriptor(&self) -> Option<&PluginDescriptor> {
        self.descriptor.as_ref()
    }

    /// Documentation repository URL cached at construction.
    pub fn repository_url(&self) -> Option<&str> {
        self.repository_url.as_deref()
    }

    /// Plugin semantic version from the descriptor.
    pub fn version(&self) -> Option<&str> {
        self.descriptor().map(|d| d.info.version.as_str())
    }

    /// Plugin identifier from the descriptor.
    pub fn id(&self) -> Option<&str> {
        self.descriptor().map(|d| d.id.as_str())
    }

    /// Bundled library directory.
    pub fn libs_path(&self) -> String {
        paths::libs_path(&self.root_path)
    }

    /// Shape library directory.
    pub fn shapes_path(&self) -> String {
        paths::shapes_path(&self.root_path)
    }

    /// Graph engine distribution prefix.
    pub fn graph_engine_base_path(&self) -> String {
        paths::graph_engine_base_path(&self.root_path)
    }

    /// Graph engine stencil image prefix.
    pub fn graph_engine_image_path(&self) -> String {
        paths::graph_engine_image_path(&self.root_path)
    }

    /// Partial template prefix.
    pub fn partials_path(&self) -> String {
        paths::partials_path(&self.root_path)
    }

    /// Execution environment this context was constructed for.
    pub fn mode(&self) -> &ContextMode {
        &self.mode
    }

    /// Host application handles; `None` in standalone mode.
    pub fn host_bindings(&self) -> Option<&HostBindings> {
        match &self.mode {
            ContextMode::Hosted(bindings) => Some(bindings),
            ContextMode::Standalone => None,
        }
    }

    /// Host template service handle; `None` in standalone mode.
    pub fn template_service(&self) -> Option<Arc<dyn TemplateService>> {
        self.host_bindings()
            .map(|bindings| Arc::clone(&bindings.template_service))
    }

    /// Emits one diagnostic event; see [`PluginLog::log`].
    pub fn log(&self, level: i32, title: &str, payload: impl Debug) {
        self.log.log(level, title, payload);
    }

    /// Current diagnostic severity threshold.
    pub fn log_level(&self) -> i32 {
        self.log.level()
    }

    /// Replaces the diagnostic severity threshold.
    pub fn set_log_level(&self, level: i32) {
        self.log.set_level(level);
    }

    /// Returns whether diagnostics are emitted at all.
    pub fn is_log_enabled(&self) -> bool {
        self.log.is_enabled()
    }

    /// Switches diagnostics on or off.
    pub fn set_log_enabled(&self, enabled: bool) {
        self.log.set_enabled(enabled);
    }

    /// Renders the help popover against the cached repository URL.
    pub fn render_popover(
        &self,
        text: &str,
        help_suffix: Option<&str>,
        image_suffix: Option<&str>,
    ) -> String {
        popover::render_popover(self.repository_url(), text, help_suffix, image_suffix)
    }
}

/// Builds the context for `mode`, publishes it as the active process-wide
/// instance (overwriting any previous one), and returns it.
///
/// Callers are expected to initialize once per process; repeated calls are
/// last-writer-wins on the published slot.
pub fn initialize(mode: InitMode) -> Arc<PluginContext> {
    let context = match mode {
        InitMode::Standalone { root_path } => {
            let root = root_path.unwrap_or_else(standalone_root);
            Arc::new(PluginContext::new(root, ContextMode::Standalone))
        }
        InitMode::Hosted(bindings) => {
            let root = hosted_root(bindings.scope.app_sub_url().as_str());
            Arc::new(PluginContext::new(root, ContextMode::Hosted(bindings)))
        }
    };
    install_active(Arc::clone(&context));
    context
}

/// Replaces the process-wide active context. Last writer wins.
pub fn install_active(context: Arc<PluginContext>) {
    let mut slot = match ACTIVE_CONTEXT.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *slot = Some(context);
}

/// Returns the active context published by [`initialize`], when any.
///
/// Compatibility accessor for collaborators that cannot take the context as
/// a parameter; new code should prefer passing the context explicitly.
pub fn active() -> Option<Arc<PluginContext>> {
    let slot = match ACTIVE_CONTEXT.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    slot.clone()
}

/// Clears the process-wide active context.
pub fn clear_active() {
    let mut slot = match ACTIVE_CONTEXT.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *slot = None;
}

fn hosted_root(app_sub_url: &str) -> String {
    format!("{}{}", app_sub_url.trim_end_matches('/'), DEFAULT_PUBLIC_PATH)
}

fn standalone_root() -> String {
    if let Ok(root) = std::env::var(ROOT_PATH_ENV) {
        if !root.trim().is_empty() {
            return root;
        }
    }
    if let Some(dir) = install_dir() {
        return dir;
    }
    DEFAULT_PUBLIC_PATH.to_string()
}

/// Directory the running executable was loaded from, when determinable.
fn install_dir() -> Option<String> {
    let exe = std::env::current_exe().ok()?;
    let dir = exe.parent()?;
    Some(dir.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::{
        hosted_root, ContextMode, HostBindings, HostInjector, HostScope, PluginContext,
        TemplateService, DEFAULT_PUBLIC_PATH,
    };
    use std::any::Any;
    use std::sync::Arc;

    struct MockScope {
        app_sub_url: String,
    }

    impl HostScope for MockScope {
        fn app_sub_url(&self) -> String {
            self.app_sub_url.clone()
        }
    }

    struct MockInjector;

    impl HostInjector for MockInjector {
        fn resolve(&self, _service: &str) -> Option<Arc<dyn Any + Send + Sync>> {
            None
        }
    }

    struct MockTemplateService;

    impl TemplateService for MockTemplateService {
        fn replace(&self, input: &str) -> String {
            input.replace("$panel", "flowdeck")
        }
    }

    fn mock_bindings(app_sub_url: &str) -> HostBindings {
        HostBindings {
            scope: Arc::new(MockScope {
                app_sub_url: app_sub_url.to_string(),
            }),
            injector: Arc::new(MockInjector),
            root_scope: Arc::new(MockScope {
                app_sub_url: app_sub_url.to_string(),
            }),
            template_service: Arc::new(MockTemplateService),
        }
    }

    fn write_descriptor(dir: &std::path::Path) {
        std::fs::write(
            dir.join("plugin.json"),
            r#"{
                "id": "flowdeck-panel",
                "info": {
                    "version": "1.4.2",
                    "links": [{"name": "Documentation", "url": "https://docs.flowdeck.dev/"}]
                }
            }"#,
        )
        .expect("descriptor fixture write");
    }

    #[test]
    fn context_exposes_descriptor_metadata() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_descriptor(dir.path());
        let root = dir.path().to_str().expect("temp dir should be UTF-8");

        let context = PluginContext::new(root, ContextMode::Standalone);
        assert_eq!(context.id(), Some("flowdeck-panel"));
        assert_eq!(context.version(), Some("1.4.2"));
        assert_eq!(context.repository_url(), Some("https://docs.flowdeck.dev/"));
    }

    #[test]
    fn context_tolerates_missing_descriptor() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = dir.path().to_str().expect("temp dir should be UTF-8");

        let context = PluginContext::new(root, ContextMode::Standalone);
        assert!(context.descriptor().is_none());
        assert_eq!(context.id(), None);
        assert_eq!(context.version(), None);
        assert_eq!(context.repository_url(), None);

        // Paths are derived from the root alone and still work.
        assert_eq!(context.libs_path(), format!("{root}/libs"));

        // Popover renders without anchors when no repository URL is cached.
        let html = context.render_popover("desc", Some("/doc"), Some("ex"));
        assert!(!html.contains("<a href"));
    }

    #[test]
    fn derived_paths_are_stable_per_context() {
        let context = PluginContext::new("/public/plugins/flowdeck-panel/", ContextMode::Standalone);
        assert_eq!(context.shapes_path(), context.shapes_path());
        assert_eq!(context.partials_path(), context.partials_path());
        assert_eq!(
            context.shapes_path(),
            "/public/plugins/flowdeck-panel/libs/shapes"
        );
        assert_eq!(
            context.partials_path(),
            "/public/plugins/flowdeck-panel/partials/"
        );
    }

    #[test]
    fn hosted_root_joins_sub_url_and_public_path() {
        assert_eq!(hosted_root(""), DEFAULT_PUBLIC_PATH);
        assert_eq!(hosted_root("/dash"), "/dash/public/plugins/flowdeck-panel/");
        assert_eq!(hosted_root("/dash/"), "/dash/public/plugins/flowdeck-panel/");
    }

    #[test]
    fn hosted_context_retains_host_bindings() {
        let context = PluginContext::new(
            "/dash/public/plugins/flowdeck-panel/",
            ContextMode::Hosted(mock_bindings("/dash")),
        );

        let bindings = context.host_bindings().expect("hosted context has bindings");
        assert_eq!(bindings.scope.app_sub_url(), "/dash");
        assert!(bindings.injector.resolve("timeSrv").is_none());

        let template = context.template_service().expect("template service handle");
        assert_eq!(template.replace("panel=$panel"), "panel=flowdeck");
    }

    #[test]
    fn standalone_context_has_no_host_bindings() {
        let context = PluginContext::new("/public/plugins/flowdeck-panel/", ContextMode::Standalone);
        assert!(context.host_bindings().is_none());
        assert!(context.template_service().is_none());
        assert!(matches!(context.mode(), ContextMode::Standalone));
    }

    #[test]
    fn logging_state_round_trips_through_setters() {
        let context = PluginContext::new("/public/plugins/flowdeck-panel/", ContextMode::Standalone);
        assert_eq!(context.log_level(), crate::logging::LOG_ERROR);
        assert!(context.is_log_enabled());

        context.set_log_level(crate::logging::LOG_DEBUG);
        context.set_log_enabled(false);
        assert_eq!(context.log_level(), crate::logging::LOG_DEBUG);
        assert!(!context.is_log_enabled());

        // Emitting while disabled is a silent no-op.
        context.log(crate::logging::LOG_ERROR, "load", "payload");
    }
}
