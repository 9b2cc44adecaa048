// ABOUTME: Friendly placeholder names and their PresentationML placeholder types
// ABOUTME: Resolves names like "content", "subtitle" or "body_2" to concrete placeholders on a slide

use crate::oxml::shapes::PlaceholderInfo;

/// Friendly alias -> candidate `p:ph/@type` values, most specific first.
const ALIASES: &[(&str, &[&str])] = &[
    ("title", &["title", "ctrTitle"]),
    ("centered_title", &["ctrTitle"]),
    ("center_title", &["ctrTitle"]),
    ("subtitle", &["subTitle"]),
    ("sub_title", &["subTitle"]),
    ("body", &["body", "obj"]),
    ("content", &["body", "obj"]),
    ("text", &["body", "obj"]),
    ("bullets", &["body"]),
    ("picture", &["pic"]),
    ("image", &["pic"]),
    ("chart", &["chart"]),
    ("table", &["tbl"]),
    ("diagram", &["dgm"]),
    ("media", &["media"]),
    ("date", &["dt"]),
    ("footer", &["ftr"]),
    ("slide_number", &["sldNum"]),
    ("header", &["hdr"]),
];

const FRIENDLY: &[(&str, &str)] = &[
    ("ctrTitle", "centered_title"),
    ("subTitle", "subtitle"),
    ("obj", "content"),
    ("pic", "picture"),
    ("tbl", "table"),
    ("dgm", "diagram"),
    ("dt", "date"),
    ("ftr", "footer"),
    ("sldNum", "slide_number"),
    ("hdr", "header"),
    ("clipArt", "clip_art"),
    ("sldImg", "slide_image"),
];

/// Placeholder types that hold slide metadata rather than content.
pub const METADATA_TYPES: &[&str] = &["dt", "ftr", "sldNum", "hdr", "sldImg"];

fn clean(name: &str) -> String {
    name.trim().to_lowercase().replace(|c: char| c == '-' || c == ' ', "_")
}

/// Candidate placeholder types for a friendly or raw name.
pub fn candidates(name: &str) -> Vec<String> {
    let name = clean(name);
    match ALIASES.iter().find(|(alias, _)| *alias == name) {
        Some((_, types)) => types.iter().map(|t| t.to_string()).collect(),
        None => vec![name],
    }
}

/// Primary placeholder type for a name (`content` -> `body`).
pub fn normalize(name: &str) -> String {
    candidates(name)
        .into_iter()
        .next()
        .unwrap_or_default()
}

pub fn friendly_name(ph_type: &str) -> &str {
    FRIENDLY
        .iter()
        .find(|(t, _)| *t == ph_type)
        .map(|(_, f)| *f)
        .unwrap_or(ph_type)
}

/// Splits `body_2` into (`body`, Some(2)); plain names carry no index.
pub fn split_indexed(name: &str) -> (String, Option<u32>) {
    let name = clean(name);
    if let Some((base, idx)) = name.rsplit_once('_') {
        if !idx.is_empty() && idx.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(n) = idx.parse() {
                return (base.to_string(), Some(n));
            }
        }
    }
    (name, None)
}

/// The placeholders of one slide or layout, in document order.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderMap {
    entries: Vec<PlaceholderInfo>,
}

impl PlaceholderMap {
    pub fn new<I: IntoIterator<Item = PlaceholderInfo>>(entries: I) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a friendly name. Candidates are tried in order; with an
    /// explicit index only that index matches, otherwise the first
    /// placeholder of the type wins.
    pub fn find(&self, name: &str) -> Option<&PlaceholderInfo> {
        let (base, idx) = split_indexed(name);
        for candidate in candidates(&base) {
            let mut of_type = self
                .entries
                .iter()
                .filter(|p| p.effective_type().eq_ignore_ascii_case(&candidate));
            let found = match idx {
                Some(i) => of_type.find(|p| p.idx == i),
                None => of_type.next(),
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Friendly names; repeated types get an `_idx` suffix.
    pub fn list_all(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|p| {
                let ty = p.effective_type();
                let repeated = self
                    .entries
                    .iter()
                    .filter(|o| o.effective_type() == ty)
                    .count()
                    > 1;
                let friendly = friendly_name(ty);
                if repeated {
                    format!("{}_{}", friendly, p.idx)
                } else {
                    friendly.to_string()
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ph(ty: Option<&str>, idx: u32) -> PlaceholderInfo {
        PlaceholderInfo {
            ph_type: ty.map(|t| t.to_string()),
            idx,
        }
    }

    #[test]
    fn test_aliases_resolve_to_types() {
        assert_eq!(normalize("Content"), "body");
        assert_eq!(normalize("sub-title"), "subTitle");
        assert_eq!(candidates("title"), vec!["title", "ctrTitle"]);
        assert_eq!(friendly_name("sldNum"), "slide_number");
        assert_eq!(friendly_name("title"), "title");
        assert_eq!(split_indexed("body_2"), ("body".to_string(), Some(2)));
        assert_eq!(split_indexed("slide_number"), ("slide_number".to_string(), None));
    }

    #[test]
    fn test_find_with_index_and_fallback_type() {
        let map = PlaceholderMap::new(vec![
            ph(Some("ctrTitle"), 0),
            ph(Some("obj"), 1),
            ph(None, 2),
        ]);
        assert_eq!(map.find("title").unwrap().ph_type.as_deref(), Some("ctrTitle"));
        // untyped placeholders count as body, which is tried before obj
        assert_eq!(map.find("content").unwrap().idx, 2);
        assert_eq!(map.find("content_1").unwrap().idx, 1);
        assert!(map.find("picture").is_none());
        assert!(map.find("body_7").is_none());
        assert_eq!(map.list_all(), vec!["centered_title", "content", "body"]);
    }
}
