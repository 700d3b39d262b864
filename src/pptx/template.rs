//! The fixed parts of every package: the slide master, its layouts and the theme.

use std::fmt::Write;

const SLIDE_MASTER: &str = include_str!("../../resources/slideMaster1.xml");
pub(crate) const THEME: &str = include_str!("../../resources/theme1.xml");

/// The first slide layout id, as the package format requires ids above 2^31.
const FIRST_LAYOUT_ID: u64 = 2_147_483_649;

/// A master slide layout.
pub(crate) struct Layout {
    pub(crate) name: &'static str,
    pub(crate) kind: &'static str,
}

/// The layouts every presentation has, in index order.
pub(crate) const LAYOUTS: &[Layout] = &[
    Layout { name: "Title Slide", kind: "title" },
    Layout { name: "Title and Content", kind: "obj" },
    Layout { name: "Section Header", kind: "secHead" },
    Layout { name: "Two Content", kind: "twoObj" },
    Layout { name: "Title Only", kind: "titleOnly" },
    Layout { name: "Blank", kind: "blank" },
];

pub(crate) fn slide_master() -> String {
    let mut ids = String::new();
    for index in 0..LAYOUTS.len() {
        let _ = writeln!(
            ids,
            r#"    <p:sldLayoutId id="{}" r:id="rId{}"/>"#,
            FIRST_LAYOUT_ID + index as u64,
            index + 1
        );
    }
    SLIDE_MASTER.replace("{{LAYOUT_IDS}}\n", &ids)
}

pub(crate) fn slide_master_rels() -> String {
    let mut rels = String::from(RELS_HEADER);
    for index in 0..LAYOUTS.len() {
        let _ = write!(
            rels,
            r#"<Relationship Id="rId{}" Type="{SLIDE_LAYOUT_REL}" Target="../slideLayouts/slideLayout{}.xml"/>"#,
            index + 1,
            index + 1
        );
    }
    let _ = write!(
        rels,
        r#"<Relationship Id="rId{}" Type="{THEME_REL}" Target="../theme/theme1.xml"/>"#,
        LAYOUTS.len() + 1
    );
    rels.push_str("</Relationships>");
    rels
}

pub(crate) fn slide_layout(layout: &Layout) -> String {
    format!(
        concat!(
            r#"{}<p:sldLayout {} type="{}" preserve="1"><p:cSld name="{}"><p:spTree>"#,
            r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#,
            r#"</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        ),
        XML_HEADER, NAMESPACES, layout.kind, layout.name
    )
}

pub(crate) fn slide_layout_rels() -> String {
    format!(
        r#"{RELS_HEADER}<Relationship Id="rId1" Type="{SLIDE_MASTER_REL}" Target="{}"/></Relationships>"#,
        "../slideMasters/slideMaster1.xml"
    )
}

pub(crate) const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
pub(crate) const RELS_HEADER: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#
);
pub(crate) const NAMESPACES: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);

pub(crate) const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub(crate) const CORE_PROPERTIES_REL: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub(crate) const EXTENDED_PROPERTIES_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
pub(crate) const SLIDE_MASTER_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub(crate) const SLIDE_LAYOUT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub(crate) const SLIDE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub(crate) const THEME_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
