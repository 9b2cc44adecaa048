// ABOUTME: Builds a minimal but complete blank .pptx package
// ABOUTME: Supplies master, theme and the standard layout set when no template is given

use crate::errors::Result;
use crate::oxml::ns::{content_type, rel_type, NS_A, NS_P, NS_R};
use crate::oxml::package::Package;
use crate::oxml::rels::Relationships;
use crate::oxml::shapes::Position;
use crate::oxml::theme::{COLOR_SLOTS, DEFAULT_BODY_FONT, DEFAULT_COLORS, DEFAULT_HEADING_FONT};
use log::info;
use quick_xml::escape::escape;

pub const DEFAULT_SLIDE_WIDTH: i64 = 9_144_000;
pub const DEFAULT_SLIDE_HEIGHT: i64 = 6_858_000;
pub const FIRST_MASTER_ID: u64 = 2_147_483_648;
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// One placeholder in a built-in layout: (`type`, `idx`, name, geometry).
type LayoutPlaceholder = (Option<&'static str>, u32, &'static str, Position);

struct LayoutDef {
    name: &'static str,
    kind: &'static str,
    placeholders: Vec<LayoutPlaceholder>,
}

const TITLE_POS: Position = Position {
    x: 457_200,
    y: 274_638,
    cx: 8_229_600,
    cy: 1_143_000,
};

fn default_layouts() -> Vec<LayoutDef> {
    vec![
        LayoutDef {
            name: "Title Slide",
            kind: "title",
            placeholders: vec![
                (Some("ctrTitle"), 0, "Title 1", Position::new(685_800, 2_130_425, 7_772_400, 1_470_025)),
                (Some("subTitle"), 1, "Subtitle 2", Position::new(1_371_600, 3_886_200, 6_400_800, 1_752_600)),
            ],
        },
        LayoutDef {
            name: "Title and Content",
            kind: "obj",
            placeholders: vec![
                (Some("title"), 0, "Title 1", TITLE_POS),
                (None, 1, "Content Placeholder 2", Position::new(457_200, 1_600_200, 8_229_600, 4_525_963)),
            ],
        },
        LayoutDef {
            name: "Section Header",
            kind: "secHead",
            placeholders: vec![
                (Some("title"), 0, "Title 1", Position::new(722_313, 4_406_900, 7_772_400, 1_362_075)),
                (Some("body"), 1, "Text Placeholder 2", Position::new(722_313, 2_906_713, 7_772_400, 1_500_187)),
            ],
        },
        LayoutDef {
            name: "Two Content",
            kind: "twoObj",
            placeholders: vec![
                (Some("title"), 0, "Title 1", TITLE_POS),
                (None, 1, "Content Placeholder 2", Position::new(457_200, 1_600_200, 4_038_600, 4_525_963)),
                (None, 2, "Content Placeholder 3", Position::new(4_648_200, 1_600_200, 4_038_600, 4_525_963)),
            ],
        },
        LayoutDef {
            name: "Comparison",
            kind: "twoTxTwoObj",
            placeholders: vec![
                (Some("title"), 0, "Title 1", TITLE_POS),
                (Some("body"), 1, "Text Placeholder 2", Position::new(457_200, 1_535_113, 4_040_188, 639_762)),
                (None, 2, "Content Placeholder 3", Position::new(457_200, 2_174_875, 4_040_188, 3_951_288)),
                (Some("body"), 3, "Text Placeholder 4", Position::new(4_645_025, 1_535_113, 4_041_775, 639_762)),
                (None, 4, "Content Placeholder 5", Position::new(4_645_025, 2_174_875, 4_041_775, 3_951_288)),
            ],
        },
        LayoutDef {
            name: "Title Only",
            kind: "titleOnly",
            placeholders: vec![(Some("title"), 0, "Title 1", TITLE_POS)],
        },
        LayoutDef {
            name: "Blank",
            kind: "blank",
            placeholders: vec![],
        },
        LayoutDef {
            name: "Content with Caption",
            kind: "objTx",
            placeholders: vec![
                (Some("title"), 0, "Title 1", Position::new(457_200, 273_050, 3_008_313, 1_162_050)),
                (None, 1, "Content Placeholder 2", Position::new(3_575_050, 273_050, 5_111_750, 5_853_113)),
                (Some("body"), 2, "Text Placeholder 3", Position::new(457_200, 1_435_100, 3_008_313, 4_691_063)),
            ],
        },
        LayoutDef {
            name: "Picture with Caption",
            kind: "picTx",
            placeholders: vec![
                (Some("title"), 0, "Title 1", Position::new(1_792_288, 4_800_600, 5_486_400, 566_738)),
                (Some("pic"), 1, "Picture Placeholder 2", Position::new(1_792_288, 612_775, 5_486_400, 4_114_800)),
                (Some("body"), 2, "Text Placeholder 3", Position::new(1_792_288, 5_367_338, 5_486_400, 804_862)),
            ],
        },
    ]
}

fn namespaces() -> String {
    format!(r#"xmlns:a="{}" xmlns:r="{}" xmlns:p="{}""#, NS_A, NS_R, NS_P)
}

const EMPTY_GROUP: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#;

fn placeholder_xml(id: u32, ph: &LayoutPlaceholder, prompt: &str) -> String {
    let (ph_type, idx, name, pos) = ph;
    let mut attrs = String::new();
    if let Some(t) = ph_type {
        attrs.push_str(&format!(r#" type="{}""#, t));
    }
    if *idx > 0 {
        attrs.push_str(&format!(r#" idx="{}""#, idx));
    }
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph{attrs}/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US"/><a:t>{prompt}</a:t></a:r></a:p></p:txBody></p:sp>"#,
        id = id,
        name = name,
        attrs = attrs,
        x = pos.x,
        y = pos.y,
        cx = pos.cx,
        cy = pos.cy,
        prompt = prompt,
    )
}

fn prompt_for(ph_type: Option<&str>) -> &'static str {
    match ph_type {
        Some("title") | Some("ctrTitle") => "Click to edit Master title style",
        Some("subTitle") => "Click to edit Master subtitle style",
        Some("pic") => "Click icon to add picture",
        _ => "Click to edit Master text styles",
    }
}

fn layout_xml(def: &LayoutDef) -> String {
    let shapes: String = def
        .placeholders
        .iter()
        .enumerate()
        .map(|(i, ph)| placeholder_xml(i as u32 + 2, ph, prompt_for(ph.0)))
        .collect();
    format!(
        r#"{decl}<p:sldLayout {ns} type="{kind}" preserve="1"><p:cSld name="{name}"><p:spTree>{group}{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        decl = XML_DECL,
        ns = namespaces(),
        kind = def.kind,
        name = def.name,
        group = EMPTY_GROUP,
        shapes = shapes,
    )
}

fn master_xml(layout_count: usize) -> String {
    let layout_ids: String = (0..layout_count)
        .map(|i| {
            format!(
                r#"<p:sldLayoutId id="{}" r:id="rId{}"/>"#,
                FIRST_MASTER_ID + 1 + i as u64,
                i + 1
            )
        })
        .collect();
    let title = placeholder_xml(
        2,
        &(Some("title"), 0, "Title Placeholder 1", TITLE_POS),
        prompt_for(Some("title")),
    );
    let body = placeholder_xml(
        3,
        &(
            Some("body"),
            1,
            "Text Placeholder 2",
            Position::new(457_200, 1_600_200, 8_229_600, 4_525_963),
        ),
        prompt_for(Some("body")),
    );
    let level = |lvl: u32, size: u32, indent: i64| {
        format!(
            r#"<a:lvl{lvl}pPr marL="{mar}" indent="-{ind}" algn="l"><a:buFont typeface="Arial"/><a:buChar char="&#8226;"/><a:defRPr sz="{size}" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl{lvl}pPr>"#,
            lvl = lvl,
            mar = indent * lvl as i64,
            ind = indent,
            size = size,
        )
    };
    format!(
        r#"{decl}<p:sldMaster {ns}><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>{group}{title}{body}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst>{ids}</p:sldLayoutIdLst><p:txStyles><p:titleStyle><a:lvl1pPr algn="l"><a:defRPr sz="4400" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mj-lt"/></a:defRPr></a:lvl1pPr></p:titleStyle><p:bodyStyle>{l1}{l2}{l3}</p:bodyStyle><p:otherStyle><a:lvl1pPr><a:defRPr sz="1800"/></a:lvl1pPr></p:otherStyle></p:txStyles></p:sldMaster>"#,
        decl = XML_DECL,
        ns = namespaces(),
        group = EMPTY_GROUP,
        title = title,
        body = body,
        ids = layout_ids,
        l1 = level(1, 3200, 342_900),
        l2 = level(2, 2800, 285_750),
        l3 = level(3, 2400, 228_600),
    )
}

fn theme_xml() -> String {
    let colors: String = COLOR_SLOTS
        .iter()
        .zip(DEFAULT_COLORS.iter())
        .map(|(slot, hex)| match *slot {
            "dk1" => format!(r#"<a:dk1><a:sysClr val="windowText" lastClr="{}"/></a:dk1>"#, hex),
            "lt1" => format!(r#"<a:lt1><a:sysClr val="window" lastClr="{}"/></a:lt1>"#, hex),
            _ => format!(r#"<a:{slot}><a:srgbClr val="{hex}"/></a:{slot}>"#, slot = slot, hex = hex),
        })
        .collect();
    let fill = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let line = r#"<a:ln w="6350" cap="flat" cmpd="sng" algn="ctr"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:prstDash val="solid"/><a:miter lim="800000"/></a:ln>"#;
    let effect = r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#;
    format!(
        r#"{decl}<a:theme xmlns:a="{ns_a}" name="Office Theme"><a:themeElements><a:clrScheme name="Office">{colors}</a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="{major}"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="{minor}"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst>{fill}{fill}{fill}</a:fillStyleLst><a:lnStyleLst>{line}{line}{line}</a:lnStyleLst><a:effectStyleLst>{effect}{effect}{effect}</a:effectStyleLst><a:bgFillStyleLst>{fill}{fill}{fill}</a:bgFillStyleLst></a:fmtScheme></a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"#,
        decl = XML_DECL,
        ns_a = NS_A,
        colors = colors,
        major = DEFAULT_HEADING_FONT,
        minor = DEFAULT_BODY_FONT,
        fill = fill,
        line = line,
        effect = effect,
    )
}

fn presentation_xml() -> String {
    format!(
        r#"{decl}<p:presentation {ns} saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="{master_id}" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst/><p:sldSz cx="{cx}" cy="{cy}" type="screen4x3"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
        decl = XML_DECL,
        ns = namespaces(),
        master_id = FIRST_MASTER_ID,
        cx = DEFAULT_SLIDE_WIDTH,
        cy = DEFAULT_SLIDE_HEIGHT,
    )
}

fn core_props_xml(title: &str) -> String {
    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        r#"{decl}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{title}</dc:title><dc:creator>slidesmith</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">{now}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{now}</dcterms:modified><cp:revision>1</cp:revision></cp:coreProperties>"#,
        decl = XML_DECL,
        title = escape(title),
        now = now,
    )
}

fn app_props_xml() -> String {
    format!(
        r#"{decl}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes"><Application>slidesmith</Application><Slides>0</Slides></Properties>"#,
        decl = XML_DECL,
    )
}

/// A blank package with one master, one theme and the standard layouts.
pub fn blank_package(title: &str) -> Result<Package> {
    info!("Creating blank presentation package");
    let mut pkg = Package::empty();
    let layouts = default_layouts();

    let mut root_rels = Relationships::new();
    root_rels.add(rel_type::OFFICE_DOCUMENT, "ppt/presentation.xml");
    root_rels.add(rel_type::CORE_PROPS, "docProps/core.xml");
    root_rels.add(rel_type::EXT_PROPS, "docProps/app.xml");
    pkg.set_part_rels("", &root_rels)?;

    pkg.set_part("docProps/core.xml", core_props_xml(title).into_bytes());
    pkg.content_types
        .add_override("docProps/core.xml", content_type::CORE_PROPS);
    pkg.set_part("docProps/app.xml", app_props_xml().into_bytes());
    pkg.content_types
        .add_override("docProps/app.xml", content_type::EXT_PROPS);

    pkg.set_part("ppt/presentation.xml", presentation_xml().into_bytes());
    pkg.content_types
        .add_override("ppt/presentation.xml", content_type::PRESENTATION);
    let mut pres_rels = Relationships::new();
    pres_rels.add(rel_type::SLIDE_MASTER, "slideMasters/slideMaster1.xml");
    pres_rels.add(rel_type::THEME, "theme/theme1.xml");
    pres_rels.add(rel_type::PRES_PROPS, "presProps.xml");
    pres_rels.add(rel_type::VIEW_PROPS, "viewProps.xml");
    pres_rels.add(rel_type::TABLE_STYLES, "tableStyles.xml");
    pkg.set_part_rels("ppt/presentation.xml", &pres_rels)?;

    let ns = namespaces();
    pkg.set_part(
        "ppt/presProps.xml",
        format!("{}<p:presentationPr {}/>", XML_DECL, ns).into_bytes(),
    );
    pkg.content_types
        .add_override("ppt/presProps.xml", content_type::PRES_PROPS);
    pkg.set_part(
        "ppt/viewProps.xml",
        format!("{}<p:viewPr {}/>", XML_DECL, ns).into_bytes(),
    );
    pkg.content_types
        .add_override("ppt/viewProps.xml", content_type::VIEW_PROPS);
    pkg.set_part(
        "ppt/tableStyles.xml",
        format!(
            r#"{}<a:tblStyleLst xmlns:a="{}" def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#,
            XML_DECL, NS_A
        )
        .into_bytes(),
    );
    pkg.content_types
        .add_override("ppt/tableStyles.xml", content_type::TABLE_STYLES);

    pkg.set_part("ppt/theme/theme1.xml", theme_xml().into_bytes());
    pkg.content_types
        .add_override("ppt/theme/theme1.xml", content_type::THEME);

    let master = "ppt/slideMasters/slideMaster1.xml";
    pkg.set_part(master, master_xml(layouts.len()).into_bytes());
    pkg.content_types
        .add_override(master, content_type::SLIDE_MASTER);
    let mut master_rels = Relationships::new();

    for (i, def) in layouts.iter().enumerate() {
        let part = format!("ppt/slideLayouts/slideLayout{}.xml", i + 1);
        pkg.set_part(&part, layout_xml(def).into_bytes());
        pkg.content_types
            .add_override(&part, content_type::SLIDE_LAYOUT);

        let mut layout_rels = Relationships::new();
        layout_rels.add(rel_type::SLIDE_MASTER, "../slideMasters/slideMaster1.xml");
        pkg.set_part_rels(&part, &layout_rels)?;

        master_rels.add(
            rel_type::SLIDE_LAYOUT,
            &format!("../slideLayouts/slideLayout{}.xml", i + 1),
        );
    }
    master_rels.add(rel_type::THEME, "../theme/theme1.xml");
    pkg.set_part_rels(master, &master_rels)?;

    Ok(pkg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oxml::xml::Element;

    #[test]
    fn test_blank_package_parts_parse() {
        let pkg = blank_package("Q3 <Review>").unwrap();
        let names: Vec<&str> = pkg.part_names().collect();
        for part in names {
            if part.ends_with(".xml") || part.ends_with(".rels") {
                let bytes = pkg.part(part).unwrap();
                assert!(Element::parse(bytes).is_ok(), "part {} should parse", part);
            }
        }
        assert_eq!(
            pkg.parts_of_type(content_type::SLIDE_LAYOUT).len(),
            default_layouts().len()
        );
        assert_eq!(pkg.main_part().unwrap(), "ppt/presentation.xml");
    }

    #[test]
    fn test_blank_package_survives_zip_round_trip() {
        let pkg = blank_package("Deck").unwrap();
        let bytes = pkg.to_bytes().unwrap();
        let reopened = Package::from_bytes(&bytes).unwrap();
        assert!(reopened.has_part("ppt/slideMasters/slideMaster1.xml"));
        let master_rels = reopened.part_rels("ppt/slideMasters/slideMaster1.xml").unwrap();
        assert_eq!(master_rels.len(), default_layouts().len() + 1);
    }
}
