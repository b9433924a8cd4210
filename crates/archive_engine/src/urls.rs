use url::Url;

/// Resolve an href/src found on a page against that page's URL.
///
/// Fragment-only and `javascript:` references lead nowhere and yield `None`.
/// A query-only reference such as `?page=2` keeps the base path.
pub(crate) fn resolve_url(reference: &str, base: Option<&Url>) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url);
    }
    base.and_then(|base| base.join(trimmed).ok())
}
