//! Asset path derivation for the plugin install root.
//!
//! # Responsibility
//! - Derive bundled asset locations from one immutable root path string.
//! - Keep `/` join semantics free of duplicate or missing separators.
//!
//! # Invariants
//! - Every function is total and side-effect-free; no filesystem access.
//! - Results depend on the root string alone.

/// Segment under the root that holds bundled third-party libraries.
const LIBS_SEGMENT: &str = "libs";
/// Shape library segment under the libs directory.
const SHAPES_SEGMENT: &str = "shapes";
/// Graph engine distribution segment under the libs directory.
const GRAPH_ENGINE_DIST_SEGMENT: &str = "mxgraph/javascript/dist";
/// Partial template segment under the root.
const PARTIALS_SEGMENT: &str = "partials";

/// Joins one segment onto a base path with exactly one `/` between them.
///
/// Roots may be URL path prefixes, so joining always uses `/` and never the
/// platform separator.
pub(crate) fn join_segment(base: &str, segment: &str) -> String {
    let segment = segment.trim_start_matches('/');
    let head = base.trim_end_matches('/');
    if head.is_empty() {
        if base.starts_with('/') {
            return format!("/{segment}");
        }
        return segment.to_string();
    }
    format!("{head}/{segment}")
}

/// Joins one segment onto a base path and keeps a trailing `/`.
///
/// Used for directory prefixes that consumers append file names onto.
pub(crate) fn join_dir(base: &str, segment: &str) -> String {
    format!("{}/", join_segment(base, segment))
}

/// Bundled library directory: `<root>/libs`.
pub fn libs_path(root: &str) -> String {
    join_segment(root, LIBS_SEGMENT)
}

/// Shape library directory: `<root>/libs/shapes`.
pub fn shapes_path(root: &str) -> String {
    join_segment(&libs_path(root), SHAPES_SEGMENT)
}

/// Graph engine distribution prefix: `<root>/libs/mxgraph/javascript/dist/`.
pub fn graph_engine_base_path(root: &str) -> String {
    join_dir(&libs_path(root), GRAPH_ENGINE_DIST_SEGMENT)
}

/// Graph engine stencil image prefix: `<graph engine base>/images/`.
pub fn graph_engine_image_path(root: &str) -> String {
    join_dir(&graph_engine_base_path(root), "images")
}

/// Partial template prefix: `<root>/partials/`.
pub fn partials_path(root: &str) -> String {
    join_dir(root, PARTIALS_SEGMENT)
}

#[cfg(test)]
mod tests {
    use super::{
        graph_engine_base_path, graph_engine_image_path, join_segment, libs_path, partials_path,
        shapes_path,
    };

    #[test]
    fn join_segment_inserts_exactly_one_separator() {
        assert_eq!(join_segment("/a/b", "c"), "/a/b/c");
        assert_eq!(join_segment("/a/b/", "c"), "/a/b/c");
        assert_eq!(join_segment("/a/b/", "/c"), "/a/b/c");
        assert_eq!(join_segment("/a/b", "/c"), "/a/b/c");
    }

    #[test]
    fn join_segment_handles_degenerate_bases() {
        assert_eq!(join_segment("", "c"), "c");
        assert_eq!(join_segment("/", "c"), "/c");
    }

    #[test]
    fn derived_paths_follow_fixed_layout() {
        let root = "/public/plugins/flowdeck-panel/";
        assert_eq!(libs_path(root), "/public/plugins/flowdeck-panel/libs");
        assert_eq!(shapes_path(root), "/public/plugins/flowdeck-panel/libs/shapes");
        assert_eq!(
            graph_engine_base_path(root),
            "/public/plugins/flowdeck-panel/libs/mxgraph/javascript/dist/"
        );
        assert_eq!(
            graph_engine_image_path(root),
            "/public/plugins/flowdeck-panel/libs/mxgraph/javascript/dist/images/"
        );
        assert_eq!(partials_path(root), "/public/plugins/flowdeck-panel/partials/");
    }

    #[test]
    fn derived_paths_are_stable_for_same_root() {
        let root = "/srv/dash/plugins/flowdeck";
        assert_eq!(shapes_path(root), shapes_path(root));
        assert_eq!(partials_path(root), partials_path(root));
    }
}
