use leadgen_common::canonicalize_url;
use url::Url;

/// Platforms whose bare `@handle` form `post_process_url` can expand into a
/// canonical profile URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlePlatform {
    Twitter,
    TikTok,
    Other,
}

/// Post-process a raw string extracted by the LLM into a well-formed URL or
/// `None` (spec §4.6 step 4): strip whitespace, treat "unknown"/"n/a"/empty
/// as null, expand a bare `@handle` into a canonical URL for platforms that
/// support it, prepend `https://` to a schemeless domain, and finally
/// validate the result parses as a URL — anything that still doesn't
/// becomes null.
pub fn post_process_url(raw: Option<&str>, platform: HandlePlatform) -> Option<String> {
    let value = raw?.trim();
    if value.is_empty() {
        return None;
    }
    let lowered = value.to_lowercase();
    if matches!(lowered.as_str(), "unknown" | "n/a" | "na" | "none" | "null") {
        return None;
    }

    let expanded = if let Some(handle) = value.strip_prefix('@') {
        match platform {
            HandlePlatform::Twitter => format!("https://twitter.com/{handle}"),
            HandlePlatform::TikTok => format!("https://tiktok.com/@{handle}"),
            HandlePlatform::Other => value.to_string(),
        }
    } else if value.contains("://") {
        value.to_string()
    } else {
        format!("https://{value}")
    };

    if Url::parse(&expanded).is_err() {
        return None;
    }

    canonicalize_url(&expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn treats_sentinel_strings_as_null() {
        assert_eq!(post_process_url(Some("unknown"), HandlePlatform::Other), None);
        assert_eq!(post_process_url(Some(""), HandlePlatform::Other), None);
        assert_eq!(post_process_url(Some("  N/A  "), HandlePlatform::Other), None);
    }

    #[test]
    fn expands_bare_twitter_handle() {
        let result = post_process_url(Some("@someshow"), HandlePlatform::Twitter);
        assert_eq!(result.as_deref(), Some("https://twitter.com/someshow"));
    }

    #[test]
    fn prepends_scheme_to_bare_domain() {
        let result = post_process_url(Some("instagram.com/someshow"), HandlePlatform::Other);
        assert_eq!(result.as_deref(), Some("https://instagram.com/someshow"));
    }

    #[test]
    fn rejects_unparseable_strings() {
        assert_eq!(post_process_url(Some("not a url at all!!"), HandlePlatform::Other), None);
    }
}
