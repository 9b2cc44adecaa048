// ABOUTME: Presentation object model over an in-memory .pptx package
// ABOUTME: Opens, creates and saves decks and performs slide-level structural edits

use crate::core::layout::{self, LayoutInfo};
use crate::core::placeholder::METADATA_TYPES;
use crate::core::slide::{NotesPage, Slide};
use crate::errors::{Result, SlideError};
use crate::oxml::blank::{blank_package, DEFAULT_SLIDE_HEIGHT, DEFAULT_SLIDE_WIDTH};
use crate::oxml::notes;
use crate::oxml::ns::{content_type, rel_type, NS_A, NS_P, NS_R};
use crate::oxml::package::{relative_target, resolve_target, Package};
use crate::oxml::rels::Relationships;
use crate::oxml::shapes::{self, Position};
use crate::oxml::theme::{self, ThemeInfo};
use crate::oxml::xml::Element;
use crate::template::matcher::LayoutMatcher;
use log::{debug, info, warn};
use std::path::Path;

const FIRST_SLIDE_ID: u32 = 256;
const CORE_PROPS: &str = "docProps/core.xml";

/// How a caller names the layout for a new slide.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutRef {
    /// Fuzzy-matched against layout names.
    Name(String),
    /// 0-based position in layout order.
    Index(usize),
}

impl From<&str> for LayoutRef {
    fn from(name: &str) -> Self {
        LayoutRef::Name(name.to_string())
    }
}

impl From<usize> for LayoutRef {
    fn from(index: usize) -> Self {
        LayoutRef::Index(index)
    }
}

#[derive(Debug)]
pub struct Presentation {
    package: Package,
    main_part: String,
    root: Element,
    rels: Relationships,
    slides: Vec<Slide>,
    layouts: Vec<LayoutInfo>,
}

impl Presentation {
    /// A new deck on the built-in blank template.
    pub fn new() -> Result<Self> {
        Self::from_package(blank_package("Presentation")?)
    }

    pub fn open(path: &Path) -> Result<Self> {
        let package = Package::open(path)?;
        let pres = Self::from_package(package).map_err(|e| match e {
            SlideError::XmlError(reason) | SlideError::PackageError(reason) => {
                SlideError::InvalidTemplate {
                    path: path.display().to_string(),
                    reason,
                }
            }
            other => other,
        })?;
        info!("Opened {:?}: {} slides, {} layouts", path, pres.slide_count(), pres.layouts.len());
        Ok(pres)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_package(Package::from_bytes(bytes)?)
    }

    /// Opens a template and drops its existing slides, keeping masters,
    /// layouts and theme.
    pub fn from_template(path: &Path) -> Result<Self> {
        let mut pres = Self::open(path)?;
        let existing = pres.slide_count();
        for n in (1..=existing).rev() {
            pres.delete_slide(n)?;
        }
        // Templates saved as .potx carry the template main content type.
        let main = pres.main_part.clone();
        pres.package
            .content_types
            .add_override(&main, content_type::PRESENTATION);
        debug!("Removed {} template slides", existing);
        Ok(pres)
    }

    fn from_package(package: Package) -> Result<Self> {
        let main_part = package.main_part()?;
        let root = package.xml_part(&main_part)?;
        let rels = package.part_rels(&main_part)?;
        let layouts = layout::load_layouts(&package)?;

        let mut slides = Vec::new();
        if let Some(list) = root.child("sldIdLst") {
            for (i, entry) in list.children_named("sldId").enumerate() {
                let r_id = entry.attr("r:id").unwrap_or_default().to_string();
                let rel = rels.get(&r_id).ok_or_else(|| {
                    SlideError::PackageError(format!("slide relationship {} is missing", r_id))
                })?;
                let part_name = resolve_target(&main_part, &rel.target);
                let slide_root = package.xml_part(&part_name)?;
                let slide_rels = package.part_rels(&part_name)?;
                let layout = slide_rels
                    .find_by_type(rel_type::SLIDE_LAYOUT)
                    .next()
                    .map(|r| resolve_target(&part_name, &r.target))
                    .and_then(|target| layouts.iter().find(|l| l.part_name == target).cloned());
                let notes = load_notes(&package, &part_name, &slide_rels);
                slides.push(Slide {
                    number: i + 1,
                    part_name,
                    slide_id: entry.attr_i64("id").unwrap_or(0).max(0) as u32,
                    r_id,
                    layout,
                    root: slide_root,
                    rels: slide_rels,
                    notes,
                });
            }
        }

        Ok(Self {
            package,
            main_part,
            root,
            rels,
            slides,
            layouts,
        })
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.flush()?;
        self.package.save(path)?;
        info!("Saved {} slides to {:?}", self.slides.len(), path);
        Ok(())
    }

    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.flush()?;
        self.package.to_bytes()
    }

    /// Writes the in-memory slide graph back into package parts.
    fn flush(&mut self) -> Result<()> {
        for slide in &self.slides {
            self.package.set_xml_part(&slide.part_name, &slide.root)?;
            self.package.set_part_rels(&slide.part_name, &slide.rels)?;
            if let Some(page) = &slide.notes {
                self.package.set_xml_part(&page.part_name, &page.root)?;
            }
        }
        self.package.set_xml_part(&self.main_part, &self.root)?;
        self.package.set_part_rels(&self.main_part, &self.rels)?;
        self.update_app_slide_count()
    }

    fn update_app_slide_count(&mut self) -> Result<()> {
        let app = "docProps/app.xml";
        if !self.package.has_part(app) {
            return Ok(());
        }
        let mut root = self.package.xml_part(app)?;
        if let Some(slides) = root.child_mut("Slides") {
            slides.set_text(&self.slides.len().to_string());
            self.package.set_xml_part(app, &root)?;
        }
        Ok(())
    }

    /// Document title from `docProps/core.xml`.
    pub fn title(&self) -> Option<String> {
        let root = self.package.xml_part(CORE_PROPS).ok()?;
        root.child("title")
            .map(|t| t.text())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        if !self.package.has_part(CORE_PROPS) {
            return Err(SlideError::PackageError(
                "Package has no core properties part".to_string(),
            ));
        }
        let mut root = self.package.xml_part(CORE_PROPS)?;
        root.get_or_create("dc:title").set_text(title);
        self.package.set_xml_part(CORE_PROPS, &root)
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    fn check_number(&self, number: usize) -> Result<usize> {
        if number == 0 || number > self.slides.len() {
            return Err(SlideError::SlideNotFound {
                requested: number,
                total: self.slides.len(),
            });
        }
        Ok(number - 1)
    }

    pub fn slide(&self, number: usize) -> Result<&Slide> {
        let i = self.check_number(number)?;
        Ok(&self.slides[i])
    }

    pub fn slide_mut(&mut self, number: usize) -> Result<&mut Slide> {
        let i = self.check_number(number)?;
        Ok(&mut self.slides[i])
    }

    pub fn layouts(&self) -> &[LayoutInfo] {
        &self.layouts
    }

    pub fn layout_names(&self) -> Vec<String> {
        self.layouts.iter().map(|l| l.name.clone()).collect()
    }

    pub fn resolve_layout(&self, layout: &LayoutRef) -> Result<&LayoutInfo> {
        match layout {
            LayoutRef::Index(i) => self.layouts.get(*i).ok_or_else(|| SlideError::LayoutNotFound {
                requested: format!("#{}", i),
                available: self.layout_names(),
                suggestion: None,
            }),
            LayoutRef::Name(name) => {
                let names = self.layout_names();
                let found = LayoutMatcher::new(&names).match_name(name);
                match found.layout_index {
                    Some(i) => Ok(&self.layouts[i]),
                    None => Err(SlideError::LayoutNotFound {
                        requested: name.clone(),
                        suggestion: found.alternatives.first().cloned(),
                        available: names,
                    }),
                }
            }
        }
    }

    /// (width, height) in EMUs.
    pub fn slide_size(&self) -> (i64, i64) {
        self.root
            .child("sldSz")
            .map(|s| {
                (
                    s.attr_i64("cx").unwrap_or(DEFAULT_SLIDE_WIDTH),
                    s.attr_i64("cy").unwrap_or(DEFAULT_SLIDE_HEIGHT),
                )
            })
            .unwrap_or((DEFAULT_SLIDE_WIDTH, DEFAULT_SLIDE_HEIGHT))
    }

    pub fn set_slide_size(&mut self, width: i64, height: i64) -> Result<()> {
        if width <= 0 || height <= 0 {
            return Err(SlideError::InvalidArgument(format!(
                "Slide size must be positive, got {}x{}",
                width, height
            )));
        }
        let sz = self.root.get_or_create("p:sldSz");
        sz.set_attr("cx", width);
        sz.set_attr("cy", height);
        sz.remove_attr("type");
        Ok(())
    }

    /// Theme of the first slide master, or Office defaults when absent.
    pub fn theme(&self) -> ThemeInfo {
        let from_rels = self
            .rels
            .find_by_type(rel_type::THEME)
            .next()
            .map(|r| resolve_target(&self.main_part, &r.target));
        let part = from_rels.or_else(|| {
            self.package
                .parts_of_type(content_type::THEME)
                .into_iter()
                .next()
        });
        part.and_then(|p| self.package.part(&p))
            .and_then(|bytes| theme::parse_theme(bytes).ok())
            .unwrap_or_default()
    }

    fn next_slide_id(&self) -> u32 {
        let from_xml = self
            .root
            .child("sldIdLst")
            .map(|l| {
                l.children_named("sldId")
                    .filter_map(|s| s.attr_i64("id"))
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0);
        let from_slides = self.slides.iter().map(|s| s.slide_id as i64).max().unwrap_or(0);
        (from_xml.max(from_slides) + 1).max(FIRST_SLIDE_ID as i64) as u32
    }

    /// Rebuilds `p:sldIdLst` from slide order and renumbers slides.
    fn sync_slide_list(&mut self) {
        let mut list = Element::new("p:sldIdLst");
        for (i, slide) in self.slides.iter_mut().enumerate() {
            slide.number = i + 1;
            list.push(
                Element::new("p:sldId")
                    .with_attr("id", slide.slide_id)
                    .with_attr("r:id", &slide.r_id),
            );
        }
        self.root.remove_children("sldIdLst");
        self.root.insert_after(
            &["sldMasterIdLst", "notesMasterIdLst", "handoutMasterIdLst"],
            list,
        );
    }

    /// Registers a slide part with the presentation and inserts it at
    /// `index` (0-based).
    fn insert_slide(&mut self, index: usize, part_name: String, root: Element, rels: Relationships, layout: Option<LayoutInfo>) -> usize {
        let target = relative_target(&self.main_part, &part_name);
        let r_id = self.rels.add(rel_type::SLIDE, &target);
        let slide_id = self.next_slide_id();
        self.package
            .content_types
            .add_override(&part_name, content_type::SLIDE);
        // Reserve the part name now so the next allocation skips it.
        self.package.set_part(&part_name, Vec::new());
        self.slides.insert(
            index,
            Slide {
                number: index + 1,
                part_name,
                slide_id,
                r_id,
                layout,
                root,
                rels,
                notes: None,
            },
        );
        self.sync_slide_list();
        index + 1
    }

    /// Adds a slide built from a layout and returns its 1-based number.
    /// `position` is the 1-based number the slide should get; `None` appends.
    pub fn add_slide(&mut self, layout: &LayoutRef, position: Option<usize>) -> Result<usize> {
        let layout = self.resolve_layout(layout)?.clone();
        let index = match position {
            Some(p) if p == 0 || p > self.slides.len() + 1 => {
                return Err(SlideError::InvalidArgument(format!(
                    "Position {} out of range (1..={})",
                    p,
                    self.slides.len() + 1
                )))
            }
            Some(p) => p - 1,
            None => self.slides.len(),
        };

        let part_name = self.package.next_part_name("ppt/slides/slide", "xml");
        let mut root = empty_slide_root()?;
        if let Some(tree) = root.find_mut(&["cSld", "spTree"]) {
            for ph in layout
                .placeholders
                .iter()
                .filter(|p| !METADATA_TYPES.contains(&p.ph_type.as_str()))
            {
                let id = shapes::next_shape_id(tree);
                tree.push(shapes::placeholder_shape(id, &ph.name, &ph.ph_element(), None));
            }
        }
        let mut rels = Relationships::new();
        rels.add(
            rel_type::SLIDE_LAYOUT,
            &relative_target(&part_name, &layout.part_name),
        );

        info!("Adding slide with layout '{}' as {}", layout.name, part_name);
        Ok(self.insert_slide(index, part_name, root, rels, Some(layout)))
    }

    pub fn delete_slide(&mut self, number: usize) -> Result<()> {
        let i = self.check_number(number)?;
        let slide = self.slides.remove(i);
        self.rels.remove(&slide.r_id);
        for rel in slide.rels.find_by_type(rel_type::NOTES_SLIDE).filter(|r| !r.external) {
            self.package
                .remove_part(&resolve_target(&slide.part_name, &rel.target));
        }
        self.package.remove_part(&slide.part_name);
        self.sync_slide_list();
        debug!("Deleted slide {} ({})", number, slide.part_name);
        Ok(())
    }

    /// Copies a slide, placing the copy directly after it. Returns the
    /// copy's number.
    pub fn duplicate_slide(&mut self, number: usize) -> Result<usize> {
        let i = self.check_number(number)?;
        let source = &self.slides[i];
        let root = source.root.clone();
        let layout = source.layout.clone();
        let source_part = source.part_name.clone();

        let part_name = self.package.next_part_name("ppt/slides/slide", "xml");
        let mut rels = Relationships::new();
        for rel in source.rels.iter() {
            // Notes belong to the original slide only.
            if rel.rel_type == rel_type::NOTES_SLIDE {
                continue;
            }
            let mut copy = rel.clone();
            if !rel.external {
                let absolute = resolve_target(&source_part, &rel.target);
                copy.target = relative_target(&part_name, &absolute);
            }
            rels.insert(copy);
        }
        info!("Duplicating slide {} as {}", number, part_name);
        Ok(self.insert_slide(i + 1, part_name, root, rels, layout))
    }

    /// Reorders slides. `order` lists current slide numbers in their new
    /// order and must be a permutation of 1..=count.
    pub fn reorder_slides(&mut self, order: &[usize]) -> Result<()> {
        let count = self.slides.len();
        let mut seen = vec![false; count];
        if order.len() != count {
            return Err(SlideError::InvalidArgument(format!(
                "Order lists {} slides but the presentation has {}",
                order.len(),
                count
            )));
        }
        for &n in order {
            if n == 0 || n > count || seen[n - 1] {
                return Err(SlideError::InvalidArgument(format!(
                    "Order must be a permutation of 1..={}, got {:?}",
                    count, order
                )));
            }
            seen[n - 1] = true;
        }
        let mut old: Vec<Option<Slide>> = self.slides.drain(..).map(Some).collect();
        for &n in order {
            if let Some(slide) = old[n - 1].take() {
                self.slides.push(slide);
            }
        }
        self.sync_slide_list();
        Ok(())
    }

    /// Sets a slide's speaker notes, creating its notes page on first use.
    pub fn set_notes(&mut self, number: usize, value: &str) -> Result<()> {
        let i = self.check_number(number)?;
        if self.slides[i].notes.is_none() {
            let page = self.new_notes_page(i)?;
            let slide = &mut self.slides[i];
            let target = relative_target(&slide.part_name, &page.part_name);
            slide.rels.add(rel_type::NOTES_SLIDE, &target);
            debug!("Created {} for slide {}", page.part_name, number);
            slide.notes = Some(page);
        }
        self.slides[i].set_notes(value)
    }

    fn new_notes_page(&mut self, index: usize) -> Result<NotesPage> {
        let slide_part = self.slides[index].part_name.clone();
        let part_name = self
            .package
            .next_part_name("ppt/notesSlides/notesSlide", "xml");
        let root = notes::new_notes_root()?;

        let mut rels = Relationships::new();
        rels.add(rel_type::SLIDE, &relative_target(&part_name, &slide_part));
        match self
            .package
            .parts_of_type(content_type::NOTES_MASTER)
            .into_iter()
            .next()
        {
            Some(master) => {
                rels.add(rel_type::NOTES_MASTER, &relative_target(&part_name, &master));
            }
            None => debug!("No notes master; {} links to its slide only", part_name),
        }

        // Writing the part now reserves its name.
        self.package.set_xml_part(&part_name, &root)?;
        self.package.set_part_rels(&part_name, &rels)?;
        self.package
            .content_types
            .add_override(&part_name, content_type::NOTES_SLIDE);
        Ok(NotesPage { part_name, root })
    }

    /// Embeds image bytes and places a picture on a slide.
    pub fn add_image_bytes(&mut self, number: usize, data: Vec<u8>, extension: &str, position: Position, alt_text: Option<&str>) -> Result<u32> {
        let ct = content_type::for_image_extension(extension).ok_or_else(|| {
            SlideError::ImageError(format!("Unsupported image format: .{}", extension))
        })?;
        let i = self.check_number(number)?;
        let ext = extension.to_ascii_lowercase();
        let media = self.package.next_part_name("ppt/media/image", &ext);
        self.package.set_part(&media, data);
        self.package.content_types.add_default(&ext, ct);

        let slide = &mut self.slides[i];
        let target = relative_target(&slide.part_name, &media);
        let r_id = slide.rels.add(rel_type::IMAGE, &target);
        let id = slide.add_picture(&r_id, position, alt_text)?;
        debug!("Embedded {} on slide {} as {}", media, number, r_id);
        Ok(id)
    }
}

/// The notes page a slide links to, if it can be read.
fn load_notes(package: &Package, slide_part: &str, slide_rels: &Relationships) -> Option<NotesPage> {
    let rel = slide_rels.find_by_type(rel_type::NOTES_SLIDE).next()?;
    let part_name = resolve_target(slide_part, &rel.target);
    match package.xml_part(&part_name) {
        Ok(root) => Some(NotesPage { part_name, root }),
        Err(e) => {
            warn!("Ignoring notes of {}: {}", slide_part, e);
            None
        }
    }
}

fn empty_slide_root() -> Result<Element> {
    let xml = format!(
        r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        NS_A, NS_R, NS_P
    );
    Element::parse(xml.as_bytes())
}
