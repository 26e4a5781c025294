use url::Url;

/// List of tracking query parameters removed when computing a dedup key
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "mc_eid",
];

/// Computes the key used to decide whether an article URL was already seen
///
/// The key is only ever compared, never fetched, so it can be more aggressive
/// than a fetchable URL:
///
/// 1. Scheme is folded to `https`
/// 2. Host is lowercased and a leading `www.` removed
/// 3. Dot segments, empty segments and the trailing slash are removed
/// 4. Fragment is dropped
/// 5. Tracking parameters are dropped and the rest sorted by key
///
/// # Examples
///
/// ```
/// use kiosque::url::dedup_key;
/// use url::Url;
///
/// let url = Url::parse("http://WWW.Leaders.com.tn/article/1-x/?utm_source=fb#top").unwrap();
/// assert_eq!(dedup_key(&url), "https://leaders.com.tn/article/1-x");
/// ```
pub fn dedup_key(url: &Url) -> String {
    let host = url
        .host_str()
        .map(|h| h.to_lowercase())
        .map(|h| h.strip_prefix("www.").map(str::to_string).unwrap_or(h))
        .unwrap_or_default();

    let mut key = String::from("https://");
    key.push_str(&host);
    if let Some(port) = url.port() {
        key.push(':');
        key.push_str(&port.to_string());
    }
    key.push_str(&normalize_path(url.path()));

    let params = filter_and_sort_query_params(url);
    if !params.is_empty() {
        key.push('?');
        key.push_str(
            &params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&"),
        );
    }

    key
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut normalized_segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                normalized_segments.pop();
            }
            _ => normalized_segments.push(segment),
        }
    }

    if normalized_segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", normalized_segments.join("/"))
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort();
    params
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
