use url::Url;

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only anchors
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url)
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

/// Derives a human-readable title from the last path segment of an article URL
///
/// Article slugs on the scraped sites look like `/article/12345-some-title` or
/// `/some-title,520,123,3`: a leading numeric id and trailing comma-separated
/// ids are dropped, dashes become spaces.
pub fn title_from_slug(url: &Url) -> Option<String> {
    let segment = url
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()?;

    let decoded = urlencoding_decode(segment);
    let slug = decoded.split(',').next().unwrap_or_default();

    let slug = match slug.split_once('-') {
        Some((id, rest)) if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) => rest,
        _ => slug,
    };

    let slug = slug
        .trim_end_matches(".html")
        .trim_end_matches(".htm")
        .trim_end_matches(".php");

    let title = slug
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() || title.chars().all(|c| c.is_ascii_digit() || c == ' ') {
        None
    } else {
        Some(title)
    }
}

/// Percent-decodes a path segment, keeping the raw text when it is not valid UTF-8
fn urlencoding_decode(segment: &str) -> String {
    let decoded: Vec<u8> = url::form_urlencoded::parse(format!("s={}", segment).as_bytes())
        .next()
        .map(|(_, v)| v.into_owned().into_bytes())
        .unwrap_or_default();
    String::from_utf8(decoded).unwrap_or_else(|_| segment.to_string())
}
