//! HTML helper functions

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape text and turn line breaks into `<br />`
pub fn text_with_breaks(s: &str) -> String {
    html_escape(s).replace('\n', "<br />")
}

/// Generate an image tag
///
/// # Examples
/// ```ignore
/// image_tag("https://images.prismic.io/a.png", Some("Banner")) // -> <img src="..." alt="Banner" />
/// ```
pub fn image_tag(src: &str, alt: Option<&str>) -> String {
    format!(
        r#"<img src="{}" alt="{}" />"#,
        html_escape(src),
        html_escape(alt.unwrap_or(""))
    )
}

/// Opening anchor tag; external targets get `rel="noopener noreferrer"`
pub fn link_open(href: &str, target: Option<&str>) -> String {
    match target {
        Some(target) if !target.is_empty() => format!(
            r#"<a href="{}" target="{}" rel="noopener noreferrer">"#,
            html_escape(href),
            html_escape(target)
        ),
        _ => format!(r#"<a href="{}">"#, html_escape(href)),
    }
}
