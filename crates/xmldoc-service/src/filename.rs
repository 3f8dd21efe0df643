//! Filename canonicalisation and traversal detection.

/// Strip any directory prefix from an uploaded filename.
///
/// Both `/` and `\` count as separators, and `.` segments are dropped, so
/// `./docs\\report.xml` becomes `report.xml`. The result may still be
/// unsafe (for example `..`); callers check the raw name with
/// [`has_traversal`].
pub fn sanitize_filename(raw: &str) -> String {
    raw.split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .last()
        .unwrap_or_default()
        .to_string()
}

/// Returns `true` if `raw` could escape the storage directory.
pub fn has_traversal(raw: &str) -> bool {
    raw.contains("..") || raw.contains('/') || raw.contains('\\')
}
