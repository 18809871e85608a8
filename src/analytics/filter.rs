//! Platform filter normalization for feedback retrieval.

/// Returns the `source` value to filter on, or `None` for "everything".
/// "twitter" and "TWITTER" both become "Twitter".
pub fn platform_filter(raw: Option<&str>) -> Option<String> {
    match raw {
        None | Some("") | Some("all") => None,
        Some(p) => Some(capitalize(p)),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
