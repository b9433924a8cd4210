use url::Url;

/// Longest name, in characters, that `sanitize` produces.
pub const MAX_NAME_CHARS: usize = 100;

const FALLBACK_MEDIA_EXTENSION: &str = "jpg";

/// Filesystem-safe name used for every author, title and media path segment.
///
/// Each of `< > : " / \ | ? *` becomes `_`, then the result is cut to
/// [`MAX_NAME_CHARS`] characters. The mapping is idempotent, so the same
/// function serves both the existence check and the write.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .take(MAX_NAME_CHARS)
        .collect()
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
}

/// File name for a downloaded media item: the last path segment of its URL,
/// or a random hex name with a `.jpg` extension when the path has none.
pub fn media_filename(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .unwrap_or_else(random_media_name)
}

fn random_media_name() -> String {
    use std::fmt::Write;

    let bytes: [u8; 8] = rand::random();
    let mut name = String::with_capacity(20);
    for byte in bytes {
        let _ = write!(&mut name, "{byte:02x}");
    }
    name.push('.');
    name.push_str(FALLBACK_MEDIA_EXTENSION);
    name
}
