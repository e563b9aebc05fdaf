use url::Url;

/// Canonicalize a URL for identity comparison (spec §4.5, §4.8): force
/// `https`, strip a leading `www.` host label, strip a trailing `/` from
/// the path, drop query/fragment, and case-fold the whole result
/// (mirroring the original's `_normalize_url`, which ends with
/// `return url.lower()`). Idempotent — canonicalizing an already-canonical
/// URL returns the same string. Returns `None` if `raw` does not parse.
pub fn canonicalize_url(raw: &str) -> Option<String> {
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    let mut url = Url::parse(&with_scheme).ok()?;

    let _ = url.set_scheme("https");
    if let Some(host) = url.host_str() {
        let stripped = host.strip_prefix("www.").unwrap_or(host).to_string();
        let _ = url.set_host(Some(&stripped));
    }
    url.set_query(None);
    url.set_fragment(None);

    let path = url.path().trim_end_matches('/').to_string();
    url.set_path(&path);

    Some(url.as_str().to_lowercase())
}

/// Twitter/X-specific canonicalization (spec §4.6, grounded on the
/// enrichment social-discovery step): in addition to [`canonicalize_url`],
/// rewrites an `x.com` host to `twitter.com` so both domains collapse to
/// one identity.
pub fn canonicalize_twitter_url(raw: &str) -> Option<String> {
    let canonical = canonicalize_url(raw)?;
    let mut url = Url::parse(&canonical).ok()?;
    if url.host_str() == Some("x.com") {
        let _ = url.set_host(Some("twitter.com"));
    }
    Some(url.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_is_idempotent() {
        let once = canonicalize_url("HTTP://Example.com/Feed/").unwrap();
        let twice = canonicalize_url(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn canonicalize_strips_trailing_slash_and_forces_https() {
        let got = canonicalize_url("http://example.com/rss/").unwrap();
        assert_eq!(got, "https://example.com/rss");
    }

    #[test]
    fn canonicalize_drops_query_and_fragment() {
        let got = canonicalize_url("https://example.com/rss?utm=1#top").unwrap();
        assert_eq!(got, "https://example.com/rss");
    }

    #[test]
    fn twitter_canonicalize_maps_x_dot_com() {
        let got = canonicalize_twitter_url("https://x.com/SomeShow").unwrap();
        assert_eq!(got, "https://twitter.com/someshow");
    }

    #[test]
    fn canonicalize_rejects_garbage() {
        assert!(canonicalize_url("not a url at all \n\t").is_none());
    }

    #[test]
    fn canonicalize_strips_www_and_case_folds() {
        let got = canonicalize_url("https://WWW.Example.com/Feed").unwrap();
        assert_eq!(got, "https://example.com/feed");
    }

    #[test]
    fn canonicalize_is_case_insensitive_across_variants() {
        let a = canonicalize_url("https://x.com/Show").unwrap();
        let b = canonicalize_url("https://www.X.com/show").unwrap();
        assert_eq!(a, b);
    }
}
