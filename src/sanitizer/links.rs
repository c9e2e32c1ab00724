use url::Url;

/// Schemes a rewritten link may carry. Anything else (`javascript:`, `data:`)
/// is dropped together with its attribute.
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ftp", "mailto", "tel"];

/// Attributes that hold a URL and are rewritten against the base.
pub fn is_link_attribute(tag: &str, attr: &str) -> bool {
    matches!((tag, attr), ("a", "href") | ("img", "src"))
}

/// Resolve `value` against `base` into an absolute URL.
///
/// Returns `None` when the value cannot be resolved or resolves to a scheme
/// outside [`ALLOWED_SCHEMES`]. Without a base only absolute values resolve.
pub fn resolve(value: &str, base: Option<&Url>) -> Option<String> {
    let resolved = match base {
        Some(base) => base.join(value),
        None => Url::parse(value),
    }
    .ok()?;

    if ALLOWED_SCHEMES.contains(&resolved.scheme()) {
        Some(resolved.into())
    } else {
        None
    }
}
