use super::{
    shape::{AutoShape, Bullet, Font, Insets, LineStyle, Paragraph, Shape, ShapeKind, Table, TextFrame},
    slide::{Slide, Transition},
    template::{self, LAYOUTS, NAMESPACES, RELS_HEADER, XML_HEADER},
    Emu, Presentation, PptxError, Rect, Rgb,
};
use std::{
    fmt::{self, Write as _},
    fs,
    io::{Seek, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use zip::{
    write::{SimpleFileOptions, ZipWriter},
    CompressionMethod,
};

const PRESENTATION_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const SLIDE_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const SLIDE_LAYOUT_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const SLIDE_MASTER_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const THEME_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CORE_CONTENT_TYPE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const APP_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";

/// Save a presentation into the given path.
///
/// The package is written into a temporary file in the destination directory, which is then
/// renamed over the destination.
pub(crate) fn save_presentation(presentation: &Presentation, path: &Path) -> Result<PathBuf, PptxError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    let mut file = NamedTempFile::new_in(parent)?;
    write_package(presentation, file.as_file_mut())?;
    file.as_file_mut().flush()?;
    file.persist(path).map_err(|e| PptxError::Persist { path: path.into(), error: e.error })?;
    Ok(path.to_path_buf())
}

/// Write the whole package into the given writer.
pub(crate) fn write_package<W: Write + Seek>(presentation: &Presentation, writer: W) -> Result<(), PptxError> {
    let mut package = PackageWriter::new(writer);
    let slide_count = presentation.slide_count();
    package.add("[Content_Types].xml", content_types(slide_count))?;
    package.add("_rels/.rels", root_rels())?;
    package.add("docProps/core.xml", core_properties(presentation)?)?;
    package.add("docProps/app.xml", app_properties(slide_count))?;
    package.add("ppt/presentation.xml", presentation_part(presentation)?)?;
    package.add("ppt/_rels/presentation.xml.rels", presentation_rels(slide_count)?)?;
    package.add("ppt/slideMasters/slideMaster1.xml", template::slide_master())?;
    package.add("ppt/slideMasters/_rels/slideMaster1.xml.rels", template::slide_master_rels())?;
    for (index, layout) in LAYOUTS.iter().enumerate() {
        let number = index + 1;
        package.add(&format!("ppt/slideLayouts/slideLayout{number}.xml"), template::slide_layout(layout))?;
        package.add(&format!("ppt/slideLayouts/_rels/slideLayout{number}.xml.rels"), template::slide_layout_rels())?;
    }
    package.add("ppt/theme/theme1.xml", template::THEME.to_string())?;
    for (index, slide) in presentation.slides().iter().enumerate() {
        let number = index + 1;
        let part = format!("ppt/slides/slide{number}.xml");
        let xml = slide_part(slide).map_err(|e| xml_error(&part, e))?;
        package.add(&part, xml)?;
        package.add(&format!("ppt/slides/_rels/slide{number}.xml.rels"), slide_rels(slide))?;
    }
    package.finish()
}

struct PackageWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: SimpleFileOptions,
}

impl<W: Write + Seek> PackageWriter<W> {
    fn new(writer: W) -> Self {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        Self { zip: ZipWriter::new(writer), options }
    }

    fn add(&mut self, part: &str, contents: String) -> Result<(), PptxError> {
        self.zip.start_file(part, self.options)?;
        self.zip.write_all(contents.as_bytes())?;
        Ok(())
    }

    fn finish(self) -> Result<(), PptxError> {
        self.zip.finish()?;
        Ok(())
    }
}

fn xml_error(part: &str, error: fmt::Error) -> PptxError {
    PptxError::Xml { part: part.into(), reason: error.to_string() }
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&apos;"),
            _ => output.push(c),
        }
    }
    output
}

fn content_types(slide_count: usize) -> String {
    let mut xml = String::from(XML_HEADER);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    );
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    let mut overrides = vec![
        ("/ppt/presentation.xml".to_string(), PRESENTATION_CONTENT_TYPE),
        ("/ppt/slideMasters/slideMaster1.xml".to_string(), SLIDE_MASTER_CONTENT_TYPE),
        ("/ppt/theme/theme1.xml".to_string(), THEME_CONTENT_TYPE),
        ("/docProps/core.xml".to_string(), CORE_CONTENT_TYPE),
        ("/docProps/app.xml".to_string(), APP_CONTENT_TYPE),
    ];
    overrides.extend(
        (1..=LAYOUTS.len()).map(|n| (format!("/ppt/slideLayouts/slideLayout{n}.xml"), SLIDE_LAYOUT_CONTENT_TYPE)),
    );
    overrides.extend((1..=slide_count).map(|n| (format!("/ppt/slides/slide{n}.xml"), SLIDE_CONTENT_TYPE)));
    for (part, content_type) in overrides {
        xml.push_str(&format!(r#"<Override PartName="{part}" ContentType="{content_type}"/>"#));
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels() -> String {
    format!(
        concat!(
            "{}",
            r#"<Relationship Id="rId1" Type="{}" Target="ppt/presentation.xml"/>"#,
            r#"<Relationship Id="rId2" Type="{}" Target="docProps/core.xml"/>"#,
            r#"<Relationship Id="rId3" Type="{}" Target="docProps/app.xml"/>"#,
            "</Relationships>"
        ),
        RELS_HEADER,
        template::OFFICE_DOCUMENT_REL,
        template::CORE_PROPERTIES_REL,
        template::EXTENDED_PROPERTIES_REL
    )
}

fn core_properties(presentation: &Presentation) -> Result<String, PptxError> {
    let properties = presentation.properties();
    let mut xml = String::from(XML_HEADER);
    xml.push_str(concat!(
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
        r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
        r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#
    ));
    let fields = [
        ("dc:title", &properties.title),
        ("dc:subject", &properties.subject),
        ("dc:creator", &properties.author),
        ("cp:keywords", &properties.keywords),
        ("dc:description", &properties.comments),
    ];
    for (tag, value) in fields {
        if let Some(value) = value {
            write!(xml, "<{tag}>{}</{tag}>", escape_xml(value)).map_err(|e| xml_error("docProps/core.xml", e))?;
        }
    }
    xml.push_str("</cp:coreProperties>");
    Ok(xml)
}

fn app_properties(slide_count: usize) -> String {
    format!(
        concat!(
            "{}",
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#,
            "<Application>{}</Application><Slides>{}</Slides></Properties>"
        ),
        XML_HEADER,
        env!("CARGO_PKG_NAME"),
        slide_count
    )
}

fn presentation_part(presentation: &Presentation) -> Result<String, PptxError> {
    let error = |e| xml_error("ppt/presentation.xml", e);
    let mut xml = String::from(XML_HEADER);
    write!(xml, r#"<p:presentation {NAMESPACES} saveSubsetFonts="1">"#).map_err(error)?;
    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
    if !presentation.slides().is_empty() {
        xml.push_str("<p:sldIdLst>");
        for (index, slide) in presentation.slides().iter().enumerate() {
            write!(xml, r#"<p:sldId id="{}" r:id="rId{}"/>"#, slide.id(), index + 3).map_err(error)?;
        }
        xml.push_str("</p:sldIdLst>");
    }
    write!(xml, r#"<p:sldSz cx="{}" cy="{}"/>"#, presentation.width().0, presentation.height().0).map_err(error)?;
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#);
    Ok(xml)
}

fn presentation_rels(slide_count: usize) -> Result<String, PptxError> {
    let error = |e| xml_error("ppt/_rels/presentation.xml.rels", e);
    let mut xml = String::from(RELS_HEADER);
    write!(
        xml,
        r#"<Relationship Id="rId1" Type="{}" Target="slideMasters/slideMaster1.xml"/>"#,
        template::SLIDE_MASTER_REL
    )
    .map_err(error)?;
    write!(xml, r#"<Relationship Id="rId2" Type="{}" Target="theme/theme1.xml"/>"#, template::THEME_REL)
        .map_err(error)?;
    for number in 1..=slide_count {
        write!(
            xml,
            r#"<Relationship Id="rId{}" Type="{}" Target="slides/slide{number}.xml"/>"#,
            number + 2,
            template::SLIDE_REL
        )
        .map_err(error)?;
    }
    xml.push_str("</Relationships>");
    Ok(xml)
}

fn slide_rels(slide: &Slide) -> String {
    format!(
        r#"{RELS_HEADER}<Relationship Id="rId1" Type="{}" Target="../slideLayouts/slideLayout{}.xml"/>"#,
        template::SLIDE_LAYOUT_REL,
        slide.layout_index() + 1
    ) + "</Relationships>"
}

fn slide_part(slide: &Slide) -> Result<String, fmt::Error> {
    let mut xml = String::from(XML_HEADER);
    write!(xml, r#"<p:sld {NAMESPACES}><p:cSld name="{}">"#, escape_xml(slide.name()))?;
    if let Some(color) = slide.background() {
        write!(xml, "<p:bg><p:bgPr>{}<a:effectLst/></p:bgPr></p:bg>", solid_fill(color))?;
    }
    xml.push_str(concat!(
        r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
        r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
        r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
    ));
    for shape in slide.shapes() {
        write_shape(&mut xml, shape)?;
    }
    xml.push_str("</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    if let Some(transition) = slide.transition() {
        write_transition(&mut xml, transition)?;
    }
    xml.push_str("</p:sld>");
    Ok(xml)
}

fn write_transition(xml: &mut String, transition: &Transition) -> fmt::Result {
    write!(xml, r#"<p:transition spd="{}""#, transition.speed.as_ooxml())?;
    if let Some(after) = transition.advance_after_ms {
        write!(xml, r#" advTm="{after}""#)?;
    }
    match transition.kind.element() {
        Some(element) => write!(xml, "><p:{element}/></p:transition>"),
        None => write!(xml, "/>"),
    }
}

fn write_shape(xml: &mut String, shape: &Shape) -> fmt::Result {
    let name = escape_xml(shape.name());
    match shape.kind() {
        ShapeKind::TextBox(text) => {
            write!(xml, r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{name}"/>"#, shape.id())?;
            xml.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>"#);
            write_xfrm(xml, "a", &shape.rect())?;
            xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#);
            write_text_body(xml, "p", text, true)?;
            xml.push_str("</p:sp>");
        }
        ShapeKind::AutoShape(auto) => write_auto_shape(xml, shape, &name, auto)?,
        ShapeKind::Table(table) => write_table(xml, shape, &name, table)?,
    };
    Ok(())
}

fn write_auto_shape(xml: &mut String, shape: &Shape, name: &str, auto: &AutoShape) -> fmt::Result {
    write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{name}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>"#,
        shape.id()
    )?;
    write_xfrm(xml, "a", &shape.rect())?;
    write!(xml, r#"<a:prstGeom prst="{}"><a:avLst/></a:prstGeom>"#, auto.geometry.preset())?;
    if let Some(fill) = auto.fill {
        xml.push_str(&solid_fill(fill));
    }
    if let Some(line) = &auto.line {
        write_line(xml, "a:ln", line)?;
    }
    xml.push_str("</p:spPr>");
    write_text_body(xml, "p", &auto.text, true)?;
    xml.push_str("</p:sp>");
    Ok(())
}

fn write_table(xml: &mut String, shape: &Shape, name: &str, table: &Table) -> fmt::Result {
    write!(xml, r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{}" name="{name}"/>"#, shape.id())?;
    xml.push_str(r#"<p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr>"#);
    xml.push_str("<p:nvPr/></p:nvGraphicFramePr>");
    write_xfrm(xml, "p", &shape.rect())?;
    xml.push_str(r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table">"#);
    xml.push_str(r#"<a:tbl><a:tblPr firstRow="1" bandRow="1"/><a:tblGrid>"#);
    for width in &table.columns {
        write!(xml, r#"<a:gridCol w="{}"/>"#, width.0)?;
    }
    xml.push_str("</a:tblGrid>");
    for row in &table.rows {
        write!(xml, r#"<a:tr h="{}">"#, row.height.0)?;
        for cell in &row.cells {
            xml.push_str("<a:tc>");
            write_text_body(xml, "a", &cell.text, false)?;
            xml.push_str("<a:tcPr");
            if let Some(margins) = &cell.margins {
                write_insets(xml, ["marL", "marR", "marT", "marB"], margins)?;
            }
            write!(xml, r#" anchor="{}">"#, cell.anchor.as_ooxml())?;
            if let Some(border) = &table.border {
                for side in ["a:lnL", "a:lnR", "a:lnT", "a:lnB"] {
                    write_line(xml, side, border)?;
                }
            }
            if let Some(fill) = cell.fill {
                xml.push_str(&solid_fill(fill));
            }
            xml.push_str("</a:tcPr></a:tc>");
        }
        xml.push_str("</a:tr>");
    }
    xml.push_str("</a:tbl></a:graphicData></a:graphic></p:graphicFrame>");
    Ok(())
}

fn write_xfrm(xml: &mut String, prefix: &str, rect: &Rect) -> fmt::Result {
    write!(
        xml,
        r#"<{prefix}:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></{prefix}:xfrm>"#,
        rect.x.0, rect.y.0, rect.width.0, rect.height.0
    )
}

fn write_line(xml: &mut String, tag: &str, line: &LineStyle) -> fmt::Result {
    write!(xml, r#"<{tag} w="{}">{}</{tag}>"#, Emu::from_points(line.width).0, solid_fill(line.color))
}

fn write_insets(xml: &mut String, names: [&str; 4], insets: &Insets) -> fmt::Result {
    let values = [insets.left, insets.right, insets.top, insets.bottom];
    for (name, value) in names.iter().zip(values) {
        write!(xml, r#" {name}="{}""#, value.0)?;
    }
    Ok(())
}

fn solid_fill(color: Rgb) -> String {
    format!(r#"<a:solidFill><a:srgbClr val="{color}"/></a:solidFill>"#)
}

/// Write a text body. Shapes use `p:txBody` and table cells `a:txBody`; cells take their anchor
/// and margins from the cell properties instead.
fn write_text_body(xml: &mut String, prefix: &str, frame: &TextFrame, frame_properties: bool) -> fmt::Result {
    write!(xml, "<{prefix}:txBody>")?;
    if frame_properties {
        let wrap = if frame.wrap { "square" } else { "none" };
        write!(xml, r#"<a:bodyPr wrap="{wrap}" rtlCol="0" anchor="{}""#, frame.anchor.as_ooxml())?;
        if let Some(insets) = &frame.insets {
            write_insets(xml, ["lIns", "rIns", "tIns", "bIns"], insets)?;
        }
        xml.push_str("/>");
    } else {
        xml.push_str("<a:bodyPr/>");
    }
    xml.push_str("<a:lstStyle/>");
    if frame.paragraphs.is_empty() {
        xml.push_str("<a:p/>");
    }
    for paragraph in &frame.paragraphs {
        write_paragraph(xml, paragraph)?;
    }
    write!(xml, "</{prefix}:txBody>")
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph) -> fmt::Result {
    xml.push_str("<a:p><a:pPr");
    if paragraph.level > 0 {
        write!(xml, r#" lvl="{}""#, paragraph.level)?;
    }
    if let Some(Bullet::Char(_)) = paragraph.bullet {
        xml.push_str(r#" marL="342900" indent="-342900""#);
    }
    if let Some(alignment) = paragraph.alignment {
        write!(xml, r#" algn="{}""#, alignment.as_ooxml())?;
    }
    xml.push('>');
    if let Some(spacing) = paragraph.line_spacing {
        write!(xml, r#"<a:lnSpc><a:spcPct val="{}"/></a:lnSpc>"#, (spacing * 100_000.0).round() as i64)?;
    }
    match &paragraph.bullet {
        Some(Bullet::Char(c)) => {
            write!(xml, r#"<a:buFont typeface="Arial"/><a:buChar char="{}"/>"#, escape_xml(&c.to_string()))?
        }
        Some(Bullet::None) => xml.push_str("<a:buNone/>"),
        None => (),
    };
    xml.push_str("</a:pPr>");
    for run in &paragraph.runs {
        for (index, line) in run.text.split('\n').enumerate() {
            if index > 0 {
                xml.push_str("<a:br>");
                write_run_properties(xml, &run.font)?;
                xml.push_str("</a:br>");
            }
            xml.push_str("<a:r>");
            write_run_properties(xml, &run.font)?;
            write!(xml, "<a:t>{}</a:t></a:r>", escape_xml(line))?;
        }
    }
    xml.push_str("</a:p>");
    Ok(())
}

fn write_run_properties(xml: &mut String, font: &Font) -> fmt::Result {
    xml.push_str(r#"<a:rPr lang="en-US""#);
    if let Some(size) = font.size {
        write!(xml, r#" sz="{}""#, (size * 100.0).round() as i64)?;
    }
    if let Some(bold) = font.bold {
        write!(xml, r#" b="{}""#, bold as u8)?;
    }
    if let Some(italic) = font.italic {
        write!(xml, r#" i="{}""#, italic as u8)?;
    }
    xml.push_str(r#" dirty="0">"#);
    if let Some(color) = font.color {
        xml.push_str(&solid_fill(color));
    }
    if let Some(name) = &font.name {
        let name = escape_xml(name);
        write!(xml, r#"<a:latin typeface="{name}"/><a:ea typeface="{name}"/>"#)?;
    }
    xml.push_str("</a:rPr>");
    Ok(())
}
