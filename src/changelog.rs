//! Changelog generation.
//!
//! Rendering is a pure function of the release history; writing the
//! result anywhere is left to the caller.

use std::fmt::Write;

use pulldown_cmark::{html, Parser};

use crate::domain::{display_version, ReleaseHistory};

/// Render the history as Markdown.
///
/// ```text
/// # Widget 1.2.4
///
/// ## 1.2.4
///
/// * **Bug fix**: Fixed widget rendering
/// ```
pub fn render_markdown(history: &ReleaseHistory) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "# {} {}",
        history.product_name(),
        display_version(history.current_version())
    );

    for release in history.releases() {
        let _ = write!(output, "\n## {}\n", release.version());
        if !release.changes().is_empty() {
            output.push('\n');
        }
        for change in release.changes() {
            let _ = writeln!(output, "* **{}**: {}", change.kind.label(), change.description);
        }
    }

    output
}

/// Convert Markdown into an HTML fragment
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut body = String::new();
    html::push_html(&mut body, parser);
    body
}

/// Render the history as a standalone HTML page
pub fn render_html(history: &ReleaseHistory) -> String {
    let body = markdown_to_html(&render_markdown(history));
    let title = format!(
        "{} {}",
        history.product_name(),
        display_version(history.current_version())
    );

    format!(
        "<!DOCTYPE html>
<html>
<head>
<meta charset='utf-8' />
<title>{}</title>
</head>
<body>
<!-- DO NOT EDIT THIS FILE! It is automatically generated and your changes will be lost when the next release is made -->
<div class='container'>
{}</div>
</body>
</html>
",
        html_escape::encode_text(&title),
        body
    )
}
