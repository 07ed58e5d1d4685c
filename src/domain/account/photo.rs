//! Profile photo references.

/// Derives the media public id from a stored photo URL.
///
/// The public id is the last path segment with its extension removed, so
/// `https://cdn.example.com/media/abc123.png` yields `abc123`. Query strings
/// and fragments are ignored.
pub fn public_id_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segment = path.trim_end_matches('/').rsplit('/').next()?;
    let id = segment.split('.').next()?;

    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}
