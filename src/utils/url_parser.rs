/// Extract the query part of a URL string
///
/// Everything after the first `?` and before any `#` is the query.
/// Returns `None` when the URL has no `?`.
pub fn query_of(u: &str) -> Option<&str> {
    let s = u.trim();
    let s = s.split('#').next().unwrap_or(s);
    s.split_once('?').map(|(_, query)| query)
}
