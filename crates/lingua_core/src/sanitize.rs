/// Strips the Unicode line and paragraph separators (U+2028, U+2029) that
/// some JSON transports reject inside string literals. Ordinary newlines
/// pass through untouched.
pub fn sanitize_for_transport(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\u{2028}' | '\u{2029}'))
        .collect()
}
