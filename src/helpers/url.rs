//! URL helper functions

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped in a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for("/blog/", "/post/hello/") // -> "/blog/post/hello/"
/// ```
pub fn url_for(root: &str, path: &str) -> String {
    let root = root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Public URL of a post page
pub fn post_url(root: &str, uid: &str) -> String {
    url_for(root, &format!("post/{}/", utf8_percent_encode(uid, SEGMENT)))
}

/// Extract the uid from a `/post/{uid}` request path.
///
/// Returns `None` for anything that is not a single, safe path segment.
pub fn uid_from_path(path: &str) -> Option<String> {
    let rest = path.strip_prefix("/post/")?;
    let segment = rest.strip_suffix('/').unwrap_or(rest);
    let segment = segment.strip_suffix("/index.html").unwrap_or(segment);
    let uid = percent_decode_str(segment).decode_utf8().ok()?.into_owned();

    let safe = !uid.is_empty()
        && uid != "."
        && uid != ".."
        && !uid.contains(['/', '\\', '\0']);
    safe.then_some(uid)
}
