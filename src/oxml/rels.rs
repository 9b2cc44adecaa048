// ABOUTME: Relationship collections stored in `_rels/*.rels` package parts
// ABOUTME: Tracks rId allocation, lookup by id or type, and XML round-tripping

use crate::errors::Result;
use crate::oxml::ns::NS_PKG_RELS;
use crate::oxml::xml::Element;

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// Ordered set of relationships belonging to one source part.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relationships {
    rels: Vec<Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    pub fn len(&self) -> usize {
        self.rels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.id == id)
    }

    pub fn find_by_type<'a>(&'a self, rel_type: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.rels.iter().filter(move |r| r.rel_type == rel_type)
    }

    /// Next unused `rIdN`, one past the highest numeric id present.
    pub fn next_id(&self) -> String {
        let max = self
            .rels
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("rId{}", max + 1)
    }

    /// Adds an internal relationship and returns its id.
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let id = self.next_id();
        self.rels.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external: false,
        });
        id
    }

    pub fn add_external(&mut self, rel_type: &str, target: &str) -> String {
        let id = self.next_id();
        self.rels.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external: true,
        });
        id
    }

    /// Inserts a relationship keeping its id; used when copying parts.
    pub fn insert(&mut self, rel: Relationship) {
        self.rels.retain(|r| r.id != rel.id);
        self.rels.push(rel);
    }

    pub fn remove(&mut self, id: &str) -> Option<Relationship> {
        let pos = self.rels.iter().position(|r| r.id == id)?;
        Some(self.rels.remove(pos))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let root = Element::parse(bytes)?;
        let rels = root
            .children_named("Relationship")
            .filter_map(|r| {
                Some(Relationship {
                    id: r.attr("Id")?.to_string(),
                    rel_type: r.attr("Type")?.to_string(),
                    target: r.attr("Target")?.to_string(),
                    external: r.attr("TargetMode") == Some("External"),
                })
            })
            .collect();
        Ok(Self { rels })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut root = Element::new("Relationships").with_attr("xmlns", NS_PKG_RELS);
        for rel in &self.rels {
            let mut el = Element::new("Relationship")
                .with_attr("Id", &rel.id)
                .with_attr("Type", &rel.rel_type)
                .with_attr("Target", &rel.target);
            if rel.external {
                el.set_attr("TargetMode", "External");
            }
            root.push(el);
        }
        root.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oxml::ns::rel_type;

    #[test]
    fn test_ids_allocate_past_highest() {
        let mut rels = Relationships::new();
        assert_eq!(rels.add(rel_type::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml"), "rId1");
        rels.insert(Relationship {
            id: "rId7".to_string(),
            rel_type: rel_type::IMAGE.to_string(),
            target: "../media/image1.png".to_string(),
            external: false,
        });
        assert_eq!(rels.add(rel_type::IMAGE, "../media/image2.png"), "rId8");
        assert_eq!(rels.find_by_type(rel_type::IMAGE).count(), 2);
        assert!(rels.remove("rId7").is_some());
        assert!(rels.get("rId7").is_none());
    }

    #[test]
    fn test_xml_round_trip_keeps_external_mode() {
        let mut rels = Relationships::new();
        rels.add(rel_type::SLIDE, "slides/slide1.xml");
        rels.add_external(rel_type::HYPERLINK, "https://example.com/?a=1&b=2");
        let parsed = Relationships::from_bytes(&rels.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed, rels);
    }
}
