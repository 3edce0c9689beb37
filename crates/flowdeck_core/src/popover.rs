//! Help popover HTML fragment rendering.
//!
//! # Responsibility
//! - Escape description text for safe HTML embedding.
//! - Emit the fixed three-region flex layout with optional help and example
//!   anchors.
//!
//! # Invariants
//! - The layout is identical whether or not links are present; absent links
//!   leave their slot empty.
//! - Rendering is a pure function of its inputs.

/// Escapes text for HTML embedding.
///
/// `&` is replaced first so entities produced by the later substitutions are
/// not escaped a second time.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Renders the three-region help popover fragment.
///
/// `repository_url` is the documentation URL cached on the plugin context.
/// When it is absent, both link slots stay empty regardless of the suffix
/// arguments; a missing suffix leaves its individual slot empty.
pub fn render_popover(
    repository_url: Option<&str>,
    text: &str,
    help_suffix: Option<&str>,
    image_suffix: Option<&str>,
) -> String {
    let description = escape_html(text);
    let mut help_anchor = String::new();
    let mut example_anchor = String::new();

    if let Some(repo) = repository_url {
        if let Some(suffix) = help_suffix {
            help_anchor = format!(
                "<a href=\"{repo}{suffix}\" target=\"_blank\"><i class=\"fa fa-book fa-fw\"></i>Help</a>"
            );
        }
        if let Some(suffix) = image_suffix {
            example_anchor = format!(
                "<a href=\"{repo}images/{suffix}.png\" target=\"_blank\"><i class=\"fa fa-image fa-fw\"></i>Example</a>"
            );
        }
    }

    format!(
        concat!(
            "\n    <div id=\"popover\" style=\"display:flex;flex-wrap:wrap;width: 100%;\">",
            "\n      <div style=\"flex:1;height:100px;margin-bottom: 20px;\">{description}</div>",
            "\n      <div style=\"flex:1;height:100px;margin-bottom: 20px;\">{help}</div>",
            "\n      <div style=\"flex-basis: 100%;height:100px;margin-bottom:20px;\">{example}</div>",
            "\n    </div>"
        ),
        description = description,
        help = help_anchor,
        example = example_anchor,
    )
}
