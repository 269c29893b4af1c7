use url::Url;

/// Route the viewer lives under
pub const VIEW_ROUTE: &str = "/view/";

pub fn share_url(origin: &str, slug: &str) -> String {
    format!("{}{}{}", origin.trim_end_matches('/'), VIEW_ROUTE, slug)
}

/// Pull the snippet identifier out of a share link, or accept a bare identifier.
pub fn slug_from_source(source: &str) -> Option<String> {
    let source = source.trim();
    if source.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(source) {
        if matches!(url.scheme(), "http" | "https") {
            let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
            let position = segments.iter().position(|s| *s == "view")?;
            return segments.get(position + 1).map(|s| s.to_string());
        }
    }

    if let Some((_, rest)) = source.split_once(VIEW_ROUTE) {
        return rest
            .split(['/', '?', '#'])
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }

    if source.contains(['/', '?', '#']) {
        return None;
    }

    Some(source.to_string())
}
