use crate::ids::UserId;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Prefix under which derived preview copies are stored.
pub const PREVIEW_PREFIX: &str = "previews";

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, 'æ' | 'ø' | 'å' | 'Æ' | 'Ø' | 'Å' | '-' | '_')
}

/// Replace anything outside `[A-Za-z0-9æøåÆØÅ-_]` with `_`, collapse runs of
/// underscores and trim them from both ends.
pub fn sanitize_filename(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let c = if is_allowed(c) { c } else { '_' };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('_').to_string()
}

/// Download name for a document: `<COURSE>_<title>_<username>.pdf`.
pub fn document_filename(course_code: &str, title: &str, username: &str) -> String {
    format!(
        "{}_{}_{}.pdf",
        sanitize_filename(&course_code.to_uppercase()),
        sanitize_filename(title),
        sanitize_filename(username)
    )
}

/// Storage key for a new upload owned by `owner`.
pub fn storage_path_for(owner: &UserId, object_name: &str) -> String {
    format!("{owner}/{object_name}.pdf")
}

/// Storage key of the truncated preview derived from `file_path`.
pub fn preview_path_for(file_path: &str) -> String {
    format!("{PREVIEW_PREFIX}/{file_path}")
}
