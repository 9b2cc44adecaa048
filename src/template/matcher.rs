// ABOUTME: Fuzzy matching of user-supplied layout names against template layouts
// ABOUTME: Exact, canonical-family, containment and bigram-similarity passes with suggestions

use log::debug;
use serde::Serialize;
use std::collections::HashSet;

pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Canonical layout families and the names people use for them. Order
/// matters: the first family whose alias overlaps the query wins.
pub const LAYOUT_FAMILIES: &[(&str, &[&str])] = &[
    (
        "title slide",
        &["title slide", "titleslide", "title page", "cover", "cover slide", "opening"],
    ),
    (
        "title and content",
        &[
            "title and content",
            "titleandcontent",
            "title content",
            "content",
            "title & content",
            "title + content",
            "bullets",
        ],
    ),
    (
        "section header",
        &["section header", "sectionheader", "section", "section slide", "divider"],
    ),
    (
        "two content",
        &[
            "two content",
            "twocontent",
            "two column",
            "twocolumn",
            "2 content",
            "2 column",
            "dual content",
        ],
    ),
    (
        "comparison",
        &["comparison", "compare", "side by side", "versus", "vs"],
    ),
    ("title only", &["title only", "titleonly", "just title", "heading only"]),
    ("blank", &["blank", "empty", "none", "no content"]),
    (
        "content with caption",
        &["content with caption", "caption", "captioned"],
    ),
    (
        "picture with caption",
        &["picture with caption", "image with caption", "photo with caption", "picture", "image"],
    ),
];

/// Lowercases, turns `_`/`-` into spaces, collapses whitespace and strips
/// "slide layout " style prefixes.
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase().replace(|c: char| c == '_' || c == '-', " ");
    let mut name = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    for prefix in ["slide master ", "slide layout ", "layout "] {
        if let Some(rest) = name.strip_prefix(prefix) {
            name = rest.to_string();
        }
    }
    name
}

/// Canonical family of a layout name, if any.
pub fn canonical_family(name: &str) -> Option<&'static str> {
    let normalized = normalize_name(name);
    if normalized.is_empty() {
        return None;
    }
    if let Some((family, _)) = LAYOUT_FAMILIES.iter().find(|(f, _)| *f == normalized) {
        return Some(*family);
    }
    for (family, aliases) in LAYOUT_FAMILIES {
        if aliases.contains(&normalized.as_str()) {
            return Some(*family);
        }
        if aliases
            .iter()
            .any(|a| a.contains(normalized.as_str()) || normalized.contains(a))
        {
            return Some(*family);
        }
    }
    None
}

fn bigrams(s: &str) -> HashSet<String> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < 2 {
        return std::iter::once(s.to_string()).collect();
    }
    chars.windows(2).map(|w| w.iter().collect()).collect()
}

/// Jaccard similarity of character bigrams, in 0.0..=1.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = bigrams(a);
    let b = bigrams(b);
    let union = a.union(&b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Options similar to `name`, best first. Containment counts as a strong
/// match so "sub" still suggests "subtitle".
pub fn find_similar(name: &str, options: &[String], threshold: f64) -> Vec<String> {
    let query = normalize_name(name);
    let mut scored: Vec<(f64, usize)> = options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let candidate = normalize_name(option);
            let mut score = similarity(&query, &candidate);
            if !query.is_empty() && (candidate.contains(&query) || query.contains(&candidate)) {
                score = score.max(0.8);
            }
            (score, i)
        })
        .filter(|(score, _)| *score >= threshold)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, i)| options[i].clone()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutMatch {
    pub layout_name: Option<String>,
    pub layout_index: Option<usize>,
    pub confidence: f64,
    /// On a miss: every layout, most similar first.
    pub alternatives: Vec<String>,
}

impl LayoutMatch {
    pub fn found(&self) -> bool {
        self.layout_index.is_some()
    }

    fn hit(name: &str, index: usize, confidence: f64) -> Self {
        Self {
            layout_name: Some(name.to_string()),
            layout_index: Some(index),
            confidence,
            alternatives: Vec::new(),
        }
    }
}

pub struct LayoutMatcher {
    names: Vec<String>,
    normalized: Vec<String>,
    threshold: f64,
}

impl LayoutMatcher {
    pub fn new(names: &[String]) -> Self {
        Self {
            names: names.to_vec(),
            normalized: names.iter().map(|n| normalize_name(n)).collect(),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn match_name(&self, query: &str) -> LayoutMatch {
        let wanted = normalize_name(query);

        if !wanted.is_empty() {
            if let Some(i) = self.normalized.iter().position(|n| *n == wanted) {
                return LayoutMatch::hit(&self.names[i], i, 1.0);
            }

            if let Some(family) = canonical_family(query) {
                if let Some(i) = self
                    .names
                    .iter()
                    .position(|n| canonical_family(n) == Some(family))
                {
                    debug!("'{}' matched '{}' via family '{}'", query, self.names[i], family);
                    return LayoutMatch::hit(&self.names[i], i, 0.9);
                }
            }

            if let Some(i) = self
                .normalized
                .iter()
                .position(|n| n.contains(&wanted) || wanted.contains(n.as_str()))
            {
                return LayoutMatch::hit(&self.names[i], i, 0.8);
            }

            let best = self
                .normalized
                .iter()
                .enumerate()
                .map(|(i, n)| (similarity(&wanted, n), i))
                .fold(None::<(f64, usize)>, |best, (score, i)| match best {
                    Some((s, _)) if s >= score => best,
                    _ => Some((score, i)),
                });
            if let Some((score, i)) = best {
                if score >= self.threshold {
                    return LayoutMatch::hit(&self.names[i], i, score);
                }
            }
        }

        let mut alternatives = find_similar(query, &self.names, 0.0);
        alternatives.retain(|n| !n.is_empty());
        LayoutMatch {
            layout_name: None,
            layout_index: None,
            confidence: 0.0,
            alternatives,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office_layouts() -> Vec<String> {
        [
            "Title Slide",
            "Title and Content",
            "Section Header",
            "Two Content",
            "Comparison",
            "Title Only",
            "Blank",
            "Content with Caption",
            "Picture with Caption",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Title_and-Content "), "title and content");
        assert_eq!(normalize_name("Slide Layout Two   Content"), "two content");
        assert_eq!(normalize_name("LAYOUT blank"), "blank");
    }

    #[test]
    fn test_title_resolves_to_title_slide() {
        let matcher = LayoutMatcher::new(&office_layouts());
        let m = matcher.match_name("title");
        assert_eq!(m.layout_name.as_deref(), Some("Title Slide"));
        assert_eq!(m.layout_index, Some(0));
        assert!(m.confidence >= 0.9);
    }

    #[test]
    fn test_match_passes_in_order() {
        let matcher = LayoutMatcher::new(&office_layouts());
        assert_eq!(matcher.match_name("title_only").confidence, 1.0);

        let family = matcher.match_name("two column");
        assert_eq!(family.layout_name.as_deref(), Some("Two Content"));
        assert_eq!(family.confidence, 0.9);

        let divider = matcher.match_name("Divider");
        assert_eq!(divider.layout_name.as_deref(), Some("Section Header"));

        let fuzzy = matcher.match_name("Comparisn");
        assert_eq!(fuzzy.layout_name.as_deref(), Some("Comparison"));
    }

    #[test]
    fn test_custom_layout_names() {
        let names = vec!["Agenda".to_string(), "Quote Big".to_string()];
        let matcher = LayoutMatcher::new(&names);
        assert_eq!(matcher.match_name("quote").layout_name.as_deref(), Some("Quote Big"));
        assert_eq!(matcher.match_name("agendas").confidence, 0.8);
    }

    #[test]
    fn test_miss_lists_alternatives() {
        let matcher = LayoutMatcher::new(&office_layouts());
        let m = matcher.match_name("zzzz");
        assert!(!m.found());
        assert_eq!(m.alternatives.len(), 9);
        assert!(!matcher.match_name("").found());
    }

    #[test]
    fn test_find_similar() {
        let options = vec!["title".to_string(), "subtitle".to_string(), "body".to_string()];
        assert_eq!(find_similar("subtitel", &options, 0.4)[0], "subtitle");
        assert_eq!(find_similar("sub", &options, 0.4), vec!["subtitle"]);
        assert!(find_similar("xyz", &options, 0.4).is_empty());
        assert_eq!(similarity("abc", "abc"), 1.0);
    }
}
