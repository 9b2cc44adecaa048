// ABOUTME: In-memory Open Packaging container for .pptx files
// ABOUTME: Loads every ZIP part into memory, tracks content types and relationships, and re-zips on save

use crate::errors::{Result, SlideError};
use crate::oxml::ns::{content_type, rel_type, NS_CONTENT_TYPES};
use crate::oxml::rels::Relationships;
use crate::oxml::xml::Element;
use crate::utils::{validate_file_exists, write_file_atomic};
use log::{debug, info};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const PACKAGE_RELS_PART: &str = "_rels/.rels";

/// The `[Content_Types].xml` registry.
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    pub fn add_default(&mut self, extension: &str, ct: &str) {
        let ext = extension.to_ascii_lowercase();
        if !self.defaults.iter().any(|(e, _)| *e == ext) {
            self.defaults.push((ext, ct.to_string()));
        }
    }

    pub fn add_override(&mut self, part: &str, ct: &str) {
        let key = format!("/{}", part.trim_start_matches('/'));
        match self.overrides.iter_mut().find(|(p, _)| *p == key) {
            Some(slot) => slot.1 = ct.to_string(),
            None => self.overrides.push((key, ct.to_string())),
        }
    }

    pub fn remove_override(&mut self, part: &str) {
        let key = format!("/{}", part.trim_start_matches('/'));
        self.overrides.retain(|(p, _)| *p != key);
    }

    /// Override first, then the extension default.
    pub fn content_type(&self, part: &str) -> Option<&str> {
        let key = format!("/{}", part.trim_start_matches('/'));
        if let Some((_, ct)) = self.overrides.iter().find(|(p, _)| p.eq_ignore_ascii_case(&key)) {
            return Some(ct);
        }
        let ext = part.rsplit('.').next()?.to_ascii_lowercase();
        self.defaults
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, ct)| ct.as_str())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let root = Element::parse(bytes)?;
        let mut types = ContentTypes::default();
        for el in root.elements() {
            match el.local_name() {
                "Default" => {
                    if let (Some(ext), Some(ct)) = (el.attr("Extension"), el.attr("ContentType")) {
                        types.defaults.push((ext.to_ascii_lowercase(), ct.to_string()));
                    }
                }
                "Override" => {
                    if let (Some(part), Some(ct)) = (el.attr("PartName"), el.attr("ContentType")) {
                        types.overrides.push((part.to_string(), ct.to_string()));
                    }
                }
                _ => {}
            }
        }
        Ok(types)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut root = Element::new("Types").with_attr("xmlns", NS_CONTENT_TYPES);
        for (ext, ct) in &self.defaults {
            root.push(
                Element::new("Default")
                    .with_attr("Extension", ext)
                    .with_attr("ContentType", ct),
            );
        }
        for (part, ct) in &self.overrides {
            root.push(
                Element::new("Override")
                    .with_attr("PartName", part)
                    .with_attr("ContentType", ct),
            );
        }
        root.to_bytes()
    }
}

/// A fully materialized .pptx package.
#[derive(Debug, Clone)]
pub struct Package {
    parts: BTreeMap<String, Vec<u8>>,
    pub content_types: ContentTypes,
}

impl Package {
    /// Open a package from disk. Any unreadable container is reported as an
    /// invalid template carrying the path.
    pub fn open(path: &Path) -> Result<Self> {
        validate_file_exists(path)?;
        info!("Opening package {:?}", path);
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes).map_err(|e| match e {
            SlideError::InvalidTemplate { reason, .. } => SlideError::InvalidTemplate {
                path: path.display().to_string(),
                reason,
            },
            other => SlideError::InvalidTemplate {
                path: path.display().to_string(),
                reason: other.to_string(),
            },
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
            SlideError::InvalidTemplate {
                path: "<memory>".to_string(),
                reason: format!("not a ZIP container: {}", e),
            }
        })?;

        let mut parts = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().trim_start_matches('/').to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            parts.insert(name, data);
        }
        debug!("Loaded {} parts", parts.len());

        let content_types = match parts.remove(CONTENT_TYPES_PART) {
            Some(ct) => ContentTypes::from_bytes(&ct)?,
            None => {
                return Err(SlideError::InvalidTemplate {
                    path: "<memory>".to_string(),
                    reason: "missing [Content_Types].xml".to_string(),
                })
            }
        };

        let package = Self {
            parts,
            content_types,
        };
        let main = package.main_part()?;
        if !package.has_part(&main) {
            return Err(SlideError::InvalidTemplate {
                path: "<memory>".to_string(),
                reason: format!("missing main presentation part {}", main),
            });
        }
        Ok(package)
    }

    /// An empty package; callers are expected to fill in every part.
    pub fn empty() -> Self {
        let mut content_types = ContentTypes::default();
        content_types.add_default("rels", content_type::RELS);
        content_types.add_default("xml", content_type::XML);
        Self {
            parts: BTreeMap::new(),
            content_types,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        write_file_atomic(path, &bytes)?;
        info!("Saved package to {:?} ({} bytes)", path, bytes.len());
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(CONTENT_TYPES_PART, options)?;
        zip.write_all(&self.content_types.to_bytes()?)?;

        // Package relationships go first after content types, as Office does.
        if let Some(rels) = self.parts.get(PACKAGE_RELS_PART) {
            zip.start_file(PACKAGE_RELS_PART, options)?;
            zip.write_all(rels)?;
        }
        for (name, data) in &self.parts {
            if name == PACKAGE_RELS_PART {
                continue;
            }
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.parts.contains_key(name.trim_start_matches('/'))
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .get(name.trim_start_matches('/'))
            .map(|v| v.as_slice())
    }

    /// Parse a part as XML, failing when it is absent.
    pub fn xml_part(&self, name: &str) -> Result<Element> {
        let bytes = self
            .part(name)
            .ok_or_else(|| SlideError::PackageError(format!("missing part {}", name)))?;
        Element::parse(bytes)
    }

    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        self.parts.insert(name.trim_start_matches('/').to_string(), data);
    }

    pub fn set_xml_part(&mut self, name: &str, root: &Element) -> Result<()> {
        let bytes = root.to_bytes()?;
        self.set_part(name, bytes);
        Ok(())
    }

    /// Removes a part together with its relationships and content type override.
    pub fn remove_part(&mut self, name: &str) {
        let name = name.trim_start_matches('/');
        self.parts.remove(name);
        self.parts.remove(&rels_part_name(name));
        self.content_types.remove_override(name);
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(|k| k.as_str())
    }

    /// Relationships of a part (empty if it has none). Use `""` for the
    /// package-level relationships.
    pub fn part_rels(&self, part: &str) -> Result<Relationships> {
        match self.part(&rels_part_name(part)) {
            Some(bytes) => Relationships::from_bytes(bytes),
            None => Ok(Relationships::new()),
        }
    }

    pub fn set_part_rels(&mut self, part: &str, rels: &Relationships) -> Result<()> {
        let name = rels_part_name(part);
        if rels.is_empty() {
            self.parts.remove(&name);
            return Ok(());
        }
        let bytes = rels.to_bytes()?;
        self.set_part(&name, bytes);
        Ok(())
    }

    /// Resolves the main document part from the package relationships.
    pub fn main_part(&self) -> Result<String> {
        let rels = self.part_rels("")?;
        let found = rels
            .find_by_type(rel_type::OFFICE_DOCUMENT)
            .next()
            .map(|r| resolve_target("", &r.target));
        Ok(found.unwrap_or_else(|| "ppt/presentation.xml".to_string()))
    }

    /// First `{prefix}{n}.{ext}` that is not yet taken, counting from 1.
    pub fn next_part_name(&self, prefix: &str, ext: &str) -> String {
        let mut n = 1;
        loop {
            let candidate = format!("{}{}.{}", prefix, n, ext);
            if !self.has_part(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Parts with a given content type, sorted by trailing number.
    pub fn parts_of_type(&self, ct: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .parts
            .keys()
            .filter(|name| self.content_types.content_type(name) == Some(ct))
            .cloned()
            .collect();
        names.sort_by_key(|n| (part_number(n), n.clone()));
        names
    }
}

/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`.
pub fn rels_part_name(part: &str) -> String {
    let part = part.trim_start_matches('/');
    if part.is_empty() {
        return PACKAGE_RELS_PART.to_string();
    }
    match part.rfind('/') {
        Some(pos) => format!("{}/_rels/{}.rels", &part[..pos], &part[pos + 1..]),
        None => format!("_rels/{}.rels", part),
    }
}

/// Directory of a part, without trailing slash.
fn part_dir(part: &str) -> &str {
    match part.rfind('/') {
        Some(pos) => &part[..pos],
        None => "",
    }
}

/// Resolves a relationship target relative to its source part.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = part_dir(source_part.trim_start_matches('/'))
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    for seg in target.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Relative path from a source part to a target part.
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let from: Vec<&str> = part_dir(source_part)
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    let to: Vec<&str> = target_part.split('/').filter(|s| !s.is_empty()).collect();
    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let mut out: Vec<&str> = vec![".."; from.len() - common];
    out.extend(&to[common..]);
    out.join("/")
}

/// Trailing number of a part file name (`slideLayout12.xml` -> 12).
pub fn part_number(part: &str) -> u32 {
    let file = part.rsplit('/').next().unwrap_or(part);
    let stem = file.split('.').next().unwrap_or(file);
    let digits: String = stem
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rels_part_name() {
        assert_eq!(rels_part_name(""), "_rels/.rels");
        assert_eq!(
            rels_part_name("ppt/slides/slide3.xml"),
            "ppt/slides/_rels/slide3.xml.rels"
        );
        assert_eq!(
            rels_part_name("/ppt/presentation.xml"),
            "ppt/_rels/presentation.xml.rels"
        );
    }

    #[test]
    fn test_resolve_and_relative_targets() {
        assert_eq!(
            resolve_target("ppt/slides/slide1.xml", "../slideLayouts/slideLayout2.xml"),
            "ppt/slideLayouts/slideLayout2.xml"
        );
        assert_eq!(
            resolve_target("ppt/presentation.xml", "slides/slide1.xml"),
            "ppt/slides/slide1.xml"
        );
        assert_eq!(resolve_target("", "ppt/presentation.xml"), "ppt/presentation.xml");
        assert_eq!(
            relative_target("ppt/slides/slide1.xml", "ppt/media/image1.png"),
            "../media/image1.png"
        );
        assert_eq!(
            relative_target("ppt/presentation.xml", "ppt/slides/slide4.xml"),
            "slides/slide4.xml"
        );
    }

    #[test]
    fn test_part_number() {
        assert_eq!(part_number("ppt/slideLayouts/slideLayout12.xml"), 12);
        assert_eq!(part_number("ppt/presentation.xml"), 0);
    }

    #[test]
    fn test_content_type_lookup_prefers_override() {
        let mut ct = ContentTypes::default();
        ct.add_default("xml", content_type::XML);
        ct.add_default("PNG", content_type::PNG);
        ct.add_override("ppt/slides/slide1.xml", content_type::SLIDE);
        assert_eq!(ct.content_type("ppt/slides/slide1.xml"), Some(content_type::SLIDE));
        assert_eq!(ct.content_type("ppt/other.xml"), Some(content_type::XML));
        assert_eq!(ct.content_type("ppt/media/image1.png"), Some(content_type::PNG));
        ct.remove_override("/ppt/slides/slide1.xml");
        assert_eq!(ct.content_type("ppt/slides/slide1.xml"), Some(content_type::XML));
    }

    #[test]
    fn test_from_bytes_rejects_non_zip() {
        let err = Package::from_bytes(b"definitely not a zip").unwrap_err();
        assert_eq!(err.code(), "INVALID_TEMPLATE");
    }
}
