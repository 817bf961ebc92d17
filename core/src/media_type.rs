//! `Content-Type` header parsing.
//!
//! Registry keys and lookups both go through [`normalize`], so
//! `Application/JSON; charset=utf-8` and `application/json` land on the same
//! entry.

use std::collections::BTreeMap;

/// Split a raw header value into its media type and parameters.
///
/// The media type is the lowercase `type/subtype` essence. Parameter names are
/// lowercased and quoted values unquoted. Values `mime` cannot parse fall back
/// to everything before the first `;`, with no parameters.
pub fn parse_options_header(value: &str) -> (String, BTreeMap<String, String>) {
    match value.trim().parse::<mime::Mime>() {
        Ok(parsed) => {
            let params = parsed
                .params()
                .map(|(name, value)| {
                    (
                        name.as_str().to_ascii_lowercase(),
                        value.as_str().trim_matches('"').to_string(),
                    )
                })
                .collect();
            (parsed.essence_str().to_ascii_lowercase(), params)
        }
        Err(_) => (fallback_essence(value), BTreeMap::new()),
    }
}

/// The lookup key for a media type: essence only, lowercase.
pub fn normalize(media_type: &str) -> String {
    parse_options_header(media_type).0
}

fn fallback_essence(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_parameters() {
        let (media_type, params) = parse_options_header("application/json; charset=utf-8");
        assert_eq!(media_type, "application/json");
        assert_eq!(params.get("charset").map(String::as_str), Some("utf-8"));
    }

    #[test]
    fn lowercases_essence_and_parameter_names() {
        let (media_type, params) = parse_options_header("Application/Vnd.Todo+JSON; Profile=\"v2\"");
        assert_eq!(media_type, "application/vnd.todo+json");
        assert_eq!(params.get("profile").map(String::as_str), Some("v2"));
    }

    #[test]
    fn malformed_value_falls_back_to_prefix() {
        let (media_type, params) = parse_options_header(" Garbage ; x=1");
        assert_eq!(media_type, "garbage");
        assert!(params.is_empty());
    }

    #[test]
    fn normalize_matches_parsed_essence() {
        assert_eq!(normalize("APPLICATION/JSON;charset=latin1"), "application/json");
        assert_eq!(normalize("application/json"), "application/json");
    }
}
