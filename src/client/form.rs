//! `application/x-www-form-urlencoded` encoding

/// Percent-encode `key=value` pairs and join them with `&`
///
/// Keys and values are encoded the way a browser's `encodeURIComponent`
/// would, so spaces become `%20` rather than `+`.
pub fn encode_form(payload: &[(&str, String)]) -> String {
    payload
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
