/// Resolve a download filename from a `Content-Disposition` header value.
///
/// The RFC 5987 form `filename*=UTF-8''<percent-encoded>` wins over the plain
/// `filename=` parameter. Returns `None` when neither is present or the value
/// is empty.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let params: Vec<(&str, &str)> = header
        .split(';')
        .filter_map(|part| part.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
        .collect();

    for (key, value) in &params {
        if key.eq_ignore_ascii_case("filename*") {
            let value = value.trim_matches('"');
            // charset'language'encoded-value
            let encoded = match value.split_once('\'') {
                Some((_charset, rest)) => rest.split_once('\'').map(|(_, v)| v).unwrap_or(rest),
                None => value,
            };
            if let Ok(decoded) = urlencoding::decode(encoded) {
                if !decoded.is_empty() {
                    return Some(decoded.into_owned());
                }
            }
        }
    }

    params
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("filename"))
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_filename_is_decoded() {
        let header = "attachment; filename*=UTF-8''a%20b.gz";
        assert_eq!(filename_from_disposition(header), Some("a b.gz".to_string()));
    }

    #[test]
    fn test_quoted_filename() {
        let header = r#"attachment; filename="c.gz""#;
        assert_eq!(filename_from_disposition(header), Some("c.gz".to_string()));
    }

    #[test]
    fn test_no_filename() {
        assert_eq!(filename_from_disposition("attachment"), None);
        assert_eq!(filename_from_disposition(""), None);
    }

    #[test]
    fn test_encoded_form_wins_regardless_of_order() {
        let header = r#"attachment; filename="fallback.gz"; filename*=UTF-8''%E3%83%AD%E3%82%B0.gz"#;
        assert_eq!(filename_from_disposition(header), Some("ログ.gz".to_string()));
    }

    #[test]
    fn test_unquoted_filename() {
        let header = "attachment; filename=waf-20250101.ndjson.gz";
        assert_eq!(
            filename_from_disposition(header),
            Some("waf-20250101.ndjson.gz".to_string())
        );
    }
}
