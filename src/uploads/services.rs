/// Map an image content type to the extension stored files get.
pub(crate) fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

/// Extension of an uploaded file's original name, if it has one.
pub(crate) fn ext_from_filename(name: &str) -> Option<&str> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.contains('/') {
        return None;
    }
    Some(ext)
}

/// Extension of the file a link points at; query and fragment do not count
/// towards it.
pub(crate) fn ext_from_link(link: &str) -> Option<&str> {
    let path = link.split(['?', '#']).next().unwrap_or(link);
    ext_from_filename(path.trim_end_matches('/'))
}
