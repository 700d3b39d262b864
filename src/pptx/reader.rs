use super::{
    shape::{
        AutoShape, Bullet, Font, Geometry, Insets, LineStyle, Paragraph, Run, Shape, ShapeKind, ShapeRole, Table,
        TableCell, TableRow, TextFrame,
    },
    slide::{Slide, Transition, TransitionKind, TransitionSpeed},
    template::LAYOUTS,
    Alignment, CoreProperties, Emu, Presentation, PptxError, Rect, Rgb, VerticalAnchor,
};
use quick_xml::{
    escape::resolve_predefined_entity,
    events::{BytesRef, BytesStart, Event},
    Reader,
};
use std::{
    borrow::Cow,
    collections::HashMap,
    fmt,
    fs::File,
    io::{BufReader, Read, Seek},
    path::Path,
};
use zip::{result::ZipError, ZipArchive};

/// Open the presentation at the given path.
pub(crate) fn read_presentation(path: &Path) -> Result<Presentation, PptxError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    let mut presentation = Presentation::new();

    let part = "ppt/presentation.xml";
    let (size, slide_ids) = parse_presentation(&read_part(&mut archive, part)?, part)?;
    if let Some((width, height)) = size {
        presentation.set_size(width, height);
    }
    let part = "ppt/_rels/presentation.xml.rels";
    let relationships = parse_relationships(&read_part(&mut archive, part)?, part)?;
    for id in slide_ids {
        let target = relationships.get(&id).ok_or_else(|| PptxError::MissingPart(format!("relationship {id}")))?;
        let part = resolve_target("ppt", target);
        let layout_index = read_layout_index(&mut archive, &part)?;
        let slide = SlideParser::new(layout_index).parse(&read_part(&mut archive, &part)?, &part)?;
        presentation.push_slide(slide);
    }

    let part = "docProps/core.xml";
    match read_part(&mut archive, part) {
        Ok(xml) => *presentation.properties_mut() = parse_core_properties(&xml, part)?,
        Err(PptxError::MissingPart(_)) => (),
        Err(e) => return Err(e),
    };
    Ok(presentation)
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String, PptxError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Err(PptxError::MissingPart(name.into())),
        Err(e) => return Err(e.into()),
    };
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

// Slides point at their layout through their relationships; layouts are numbered in index order.
fn read_layout_index<R: Read + Seek>(archive: &mut ZipArchive<R>, slide_part: &str) -> Result<usize, PptxError> {
    let (directory, file_name) = slide_part.rsplit_once('/').unwrap_or(("", slide_part));
    let part = format!("{directory}/_rels/{file_name}.rels");
    let xml = match read_part(archive, &part) {
        Ok(xml) => xml,
        Err(PptxError::MissingPart(_)) => return Ok(0),
        Err(e) => return Err(e),
    };
    let relationships = parse_relationships(&xml, &part)?;
    let index = relationships
        .values()
        .filter_map(|target| target.rsplit('/').next()?.strip_prefix("slideLayout")?.strip_suffix(".xml"))
        .find_map(|number| number.parse::<usize>().ok())
        .map(|number| number.saturating_sub(1))
        .unwrap_or_default();
    Ok(index.min(LAYOUTS.len() - 1))
}

fn resolve_target(base: &str, target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("{base}/{target}"),
    }
}

fn xml_error(part: &str, error: impl fmt::Display) -> PptxError {
    PptxError::Xml { part: part.into(), reason: error.to_string() }
}

fn attribute(element: &BytesStart, key: &[u8]) -> Option<String> {
    let attr = element.attributes().flatten().find(|attr| attr.key.as_ref() == key)?;
    attr.unescape_value().ok().map(Cow::into_owned)
}

fn number_attribute<T: std::str::FromStr>(element: &BytesStart, key: &[u8]) -> Option<T> {
    attribute(element, key)?.parse().ok()
}

// Unknown entities are dropped.
fn push_reference(text: &mut String, reference: &BytesRef, part: &str) -> Result<(), PptxError> {
    if let Some(c) = reference.resolve_char_ref().map_err(|e| xml_error(part, e))? {
        text.push(c);
        return Ok(());
    }
    let name = reference.decode().map_err(|e| xml_error(part, e))?;
    if let Some(value) = resolve_predefined_entity(&name) {
        text.push_str(value);
    }
    Ok(())
}

type SlideSize = Option<(Emu, Emu)>;

fn parse_presentation(xml: &str, part: &str) -> Result<(SlideSize, Vec<String>), PptxError> {
    let mut reader = Reader::from_str(xml);
    let mut size = None;
    let mut slide_ids = Vec::new();
    loop {
        match reader.read_event().map_err(|e| xml_error(part, e))? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"sldSz" => {
                    let width = number_attribute(&e, b"cx").map(Emu);
                    let height = number_attribute(&e, b"cy").map(Emu);
                    size = width.zip(height);
                }
                b"sldId" => {
                    let id = attribute(&e, b"r:id").ok_or_else(|| xml_error(part, "slide without relationship"))?;
                    slide_ids.push(id);
                }
                _ => (),
            },
            Event::Eof => break,
            _ => (),
        }
    }
    Ok((size, slide_ids))
}

fn parse_relationships(xml: &str, part: &str) -> Result<HashMap<String, String>, PptxError> {
    let mut reader = Reader::from_str(xml);
    let mut relationships = HashMap::new();
    loop {
        match reader.read_event().map_err(|e| xml_error(part, e))? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let Some((id, target)) = attribute(&e, b"Id").zip(attribute(&e, b"Target")) {
                    relationships.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => (),
        }
    }
    Ok(relationships)
}

fn parse_core_properties(xml: &str, part: &str) -> Result<CoreProperties, PptxError> {
    let mut reader = Reader::from_str(xml);
    let mut properties = CoreProperties::default();
    let mut current: Option<(Vec<u8>, String)> = None;
    loop {
        match reader.read_event().map_err(|e| xml_error(part, e))? {
            Event::Start(e) => current = Some((e.local_name().as_ref().to_vec(), String::new())),
            Event::Text(e) => {
                if let Some((_, text)) = &mut current {
                    text.push_str(&e.decode().map_err(|e| xml_error(part, e))?);
                }
            }
            Event::GeneralRef(e) => {
                if let Some((_, text)) = &mut current {
                    push_reference(text, &e, part)?;
                }
            }
            Event::End(_) => {
                let Some((name, text)) = current.take() else {
                    continue;
                };
                let field = match name.as_slice() {
                    b"title" => &mut properties.title,
                    b"subject" => &mut properties.subject,
                    b"creator" => &mut properties.author,
                    b"keywords" => &mut properties.keywords,
                    b"description" => &mut properties.comments,
                    _ => continue,
                };
                *field = Some(text);
            }
            Event::Eof => break,
            _ => (),
        }
    }
    Ok(properties)
}

#[derive(Default)]
struct ShapeBuilder {
    id: u32,
    name: String,
    placeholder: Option<ShapeRole>,
    rect: Rect,
    text_box: bool,
    geometry: Option<Geometry>,
    fill: Option<Rgb>,
    line: Option<LineStyle>,
    text: Option<TextFrame>,
    table: Option<Table>,
    frame: bool,
}

impl ShapeBuilder {
    fn build(self) -> Option<Shape> {
        let kind = match self.table {
            Some(table) => ShapeKind::Table(table),
            // Graphic frames only hold tables here.
            None if self.frame => return None,
            None if self.text_box => ShapeKind::TextBox(self.text.unwrap_or_default()),
            None => ShapeKind::AutoShape(AutoShape {
                geometry: self.geometry.unwrap_or_default(),
                fill: self.fill,
                line: self.line,
                text: self.text.unwrap_or_default(),
            }),
        };
        let role = match ShapeRole::from_name(&self.name) {
            ShapeRole::Other => self.placeholder.unwrap_or(ShapeRole::Other),
            role => role,
        };
        Some(Shape { id: self.id, name: self.name, role, rect: self.rect, kind })
    }
}

/// Parses a slide part by walking its elements while keeping track of the open ones.
struct SlideParser {
    slide: Slide,
    stack: Vec<Vec<u8>>,
    shape: Option<ShapeBuilder>,
    frame: Option<TextFrame>,
    paragraph: Option<Paragraph>,
    run: Option<Run>,
    in_text: bool,
    line: Option<LineStyle>,
    table: Option<Table>,
    row: Option<TableRow>,
    cell: Option<TableCell>,
}

impl SlideParser {
    fn new(layout_index: usize) -> Self {
        Self {
            slide: Slide::new(0, layout_index, String::new()),
            stack: Vec::new(),
            shape: None,
            frame: None,
            paragraph: None,
            run: None,
            in_text: false,
            line: None,
            table: None,
            row: None,
            cell: None,
        }
    }

    fn parse(mut self, xml: &str, part: &str) -> Result<Slide, PptxError> {
        let mut reader = Reader::from_str(xml);
        loop {
            match reader.read_event().map_err(|e| xml_error(part, e))? {
                Event::Start(e) => {
                    self.open(&e);
                    self.stack.push(e.local_name().as_ref().to_vec());
                }
                Event::Empty(e) => {
                    self.open(&e);
                    self.close(e.local_name().as_ref());
                }
                Event::End(e) => {
                    self.stack.pop();
                    self.close(e.local_name().as_ref());
                }
                Event::Text(e) if self.in_text => {
                    let text = e.decode().map_err(|e| xml_error(part, e))?;
                    if let Some(run) = &mut self.run {
                        run.text.push_str(&text);
                    }
                }
                Event::GeneralRef(e) if self.in_text => {
                    if let Some(run) = &mut self.run {
                        push_reference(&mut run.text, &e, part)?;
                    }
                }
                Event::Eof => break,
                _ => (),
            }
        }
        Ok(self.slide)
    }

    /// The name of the `n`th open ancestor, 0 being the parent of the current element.
    fn ancestor(&self, n: usize) -> Option<&[u8]> {
        let index = self.stack.len().checked_sub(n + 1)?;
        self.stack.get(index).map(Vec::as_slice)
    }

    fn open(&mut self, e: &BytesStart) {
        let parent = self.ancestor(0).map(<[u8]>::to_vec).unwrap_or_default();
        match e.local_name().as_ref() {
            b"sp" => self.shape = Some(ShapeBuilder::default()),
            b"graphicFrame" => self.shape = Some(ShapeBuilder { frame: true, ..Default::default() }),
            b"cSld" => self.slide.name = attribute(e, b"name").unwrap_or_default(),
            b"cNvPr" => {
                if let Some(shape) = &mut self.shape {
                    shape.id = number_attribute(e, b"id").unwrap_or_default();
                    shape.name = attribute(e, b"name").unwrap_or_default();
                }
            }
            b"cNvSpPr" => {
                if let Some(shape) = &mut self.shape {
                    shape.text_box = attribute(e, b"txBox").is_some_and(|value| value == "1" || value == "true");
                }
            }
            b"ph" => {
                if let Some(shape) = &mut self.shape {
                    shape.placeholder = match attribute(e, b"type").as_deref() {
                        Some("title" | "ctrTitle") => Some(ShapeRole::Title),
                        Some("subTitle") => Some(ShapeRole::Subtitle),
                        Some("body") | None => Some(ShapeRole::Body),
                        _ => None,
                    };
                }
            }
            b"off" if parent == b"xfrm" => {
                if let Some(shape) = &mut self.shape {
                    shape.rect.x = Emu(number_attribute(e, b"x").unwrap_or_default());
                    shape.rect.y = Emu(number_attribute(e, b"y").unwrap_or_default());
                }
            }
            b"ext" if parent == b"xfrm" => {
                if let Some(shape) = &mut self.shape {
                    shape.rect.width = Emu(number_attribute(e, b"cx").unwrap_or_default());
                    shape.rect.height = Emu(number_attribute(e, b"cy").unwrap_or_default());
                }
            }
            b"prstGeom" => {
                if let Some(shape) = &mut self.shape {
                    shape.geometry = attribute(e, b"prst").and_then(|preset| Geometry::from_preset(&preset));
                }
            }
            b"srgbClr" => self.color(e),
            b"ln" | b"lnL" | b"lnR" | b"lnT" | b"lnB" => {
                let width = number_attribute(e, b"w").map(|w| Emu(w).as_points()).unwrap_or(0.75);
                self.line = Some(LineStyle { color: Rgb::BLACK, width });
            }
            b"txBody" => self.frame = Some(TextFrame::default()),
            b"bodyPr" => {
                if let Some(frame) = &mut self.frame {
                    frame.wrap = attribute(e, b"wrap").as_deref() != Some("none");
                    if let Some(anchor) = attribute(e, b"anchor").and_then(|a| VerticalAnchor::from_ooxml(&a)) {
                        frame.anchor = anchor;
                    }
                    frame.insets = insets(e, [b"lIns", b"rIns", b"tIns", b"bIns"]);
                }
            }
            b"p" if parent == b"txBody" => self.paragraph = Some(Paragraph::default()),
            b"pPr" => {
                if let Some(paragraph) = &mut self.paragraph {
                    paragraph.level = number_attribute(e, b"lvl").unwrap_or_default();
                    paragraph.alignment = attribute(e, b"algn").and_then(|a| Alignment::from_ooxml(&a));
                }
            }
            b"spcPct" if parent == b"lnSpc" => {
                if let Some(paragraph) = &mut self.paragraph {
                    paragraph.line_spacing = number_attribute::<f64>(e, b"val").map(|val| val / 100_000.0);
                }
            }
            b"buChar" => {
                if let Some(paragraph) = &mut self.paragraph {
                    let c = attribute(e, b"char").and_then(|value| value.chars().next()).unwrap_or('•');
                    paragraph.bullet = Some(Bullet::Char(c));
                }
            }
            b"buNone" => {
                if let Some(paragraph) = &mut self.paragraph {
                    paragraph.bullet = Some(Bullet::None);
                }
            }
            b"r" => self.run = Some(Run::new(String::new(), Font::default())),
            b"rPr" if parent == b"r" => {
                if let Some(run) = &mut self.run {
                    run.font.size = number_attribute::<f64>(e, b"sz").map(|size| size / 100.0);
                    run.font.bold = attribute(e, b"b").map(|value| value == "1" || value == "true");
                    run.font.italic = attribute(e, b"i").map(|value| value == "1" || value == "true");
                }
            }
            b"latin" if parent == b"rPr" && matches!(self.ancestor(1), Some(b"r")) => {
                if let Some(run) = &mut self.run {
                    run.font.name = attribute(e, b"typeface");
                }
            }
            b"t" if parent == b"r" => self.in_text = true,
            b"br" => {
                if let Some(paragraph) = &mut self.paragraph {
                    match paragraph.runs.last_mut() {
                        Some(run) => run.text.push('\n'),
                        None => paragraph.runs.push(Run::new("\n", Font::default())),
                    }
                }
            }
            b"tbl" => self.table = Some(Table::default()),
            b"gridCol" => {
                if let Some(table) = &mut self.table {
                    table.columns.push(Emu(number_attribute(e, b"w").unwrap_or_default()));
                }
            }
            b"tr" => {
                let height = Emu(number_attribute(e, b"h").unwrap_or_default());
                self.row = Some(TableRow { height, cells: Vec::new() });
            }
            b"tc" => self.cell = Some(TableCell::default()),
            b"tcPr" => {
                if let Some(cell) = &mut self.cell {
                    cell.margins = insets(e, [b"marL", b"marR", b"marT", b"marB"]);
                    if let Some(anchor) = attribute(e, b"anchor").and_then(|a| VerticalAnchor::from_ooxml(&a)) {
                        cell.anchor = anchor;
                    }
                }
            }
            b"transition" => {
                let speed = attribute(e, b"spd").map(|spd| TransitionSpeed::from_ooxml(&spd)).unwrap_or_default();
                let advance_after_ms = number_attribute(e, b"advTm");
                self.slide.transition = Some(Transition { kind: TransitionKind::None, speed, advance_after_ms });
            }
            name if parent == b"transition" => {
                let kind = TransitionKind::from_element(name);
                if let (Some(transition), Some(kind)) = (&mut self.slide.transition, kind) {
                    transition.kind = kind;
                }
            }
            _ => (),
        }
    }

    // Colors land wherever their enclosing fill belongs.
    fn color(&mut self, e: &BytesStart) {
        if !matches!(self.ancestor(0), Some(b"solidFill")) {
            return;
        }
        let Some(color) = attribute(e, b"val").and_then(|val| val.parse::<Rgb>().ok()) else {
            return;
        };
        match self.ancestor(1) {
            Some(b"bgPr") => self.slide.background = Some(color),
            Some(b"ln" | b"lnL" | b"lnR" | b"lnT" | b"lnB") => {
                if let Some(line) = &mut self.line {
                    line.color = color;
                }
            }
            Some(b"spPr") => {
                if let Some(shape) = &mut self.shape {
                    shape.fill = Some(color);
                }
            }
            Some(b"tcPr") => {
                if let Some(cell) = &mut self.cell {
                    cell.fill = Some(color);
                }
            }
            Some(b"rPr") if matches!(self.ancestor(2), Some(b"r")) => {
                if let Some(run) = &mut self.run {
                    run.font.color = Some(color);
                }
            }
            _ => (),
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"t" => self.in_text = false,
            b"r" => {
                let (Some(run), Some(paragraph)) = (self.run.take(), &mut self.paragraph) else {
                    return;
                };
                // Text split around a line break goes back into a single run.
                match paragraph.runs.last_mut() {
                    Some(last) if last.text.ends_with('\n') && last.font == run.font => last.text.push_str(&run.text),
                    _ => paragraph.runs.push(run),
                }
            }
            b"p" => {
                if let (Some(paragraph), Some(frame)) = (self.paragraph.take(), &mut self.frame) {
                    frame.paragraphs.push(paragraph);
                }
            }
            b"txBody" => {
                let Some(mut frame) = self.frame.take() else {
                    return;
                };
                if frame.paragraphs.len() == 1 && frame.paragraphs[0] == Paragraph::default() {
                    frame.paragraphs.clear();
                }
                if let Some(cell) = &mut self.cell {
                    cell.text = frame;
                } else if let Some(shape) = &mut self.shape {
                    shape.text = Some(frame);
                }
            }
            b"ln" => {
                if let Some(shape) = &mut self.shape {
                    shape.line = self.line.take();
                }
            }
            b"lnL" | b"lnR" | b"lnT" | b"lnB" => {
                if let (Some(table), Some(line)) = (&mut self.table, self.line.take()) {
                    table.border.get_or_insert(line);
                }
            }
            b"tc" => {
                if let (Some(cell), Some(row)) = (self.cell.take(), &mut self.row) {
                    row.cells.push(cell);
                }
            }
            b"tr" => {
                if let (Some(row), Some(table)) = (self.row.take(), &mut self.table) {
                    table.rows.push(row);
                }
            }
            b"tbl" => {
                if let Some(shape) = &mut self.shape {
                    shape.table = self.table.take();
                }
            }
            b"sp" | b"graphicFrame" => {
                if let Some(shape) = self.shape.take().and_then(ShapeBuilder::build) {
                    self.slide.push_parsed_shape(shape);
                }
            }
            _ => (),
        }
    }
}

fn insets(e: &BytesStart, keys: [&[u8]; 4]) -> Option<Insets> {
    let [left, right, top, bottom] = keys.map(|key| number_attribute::<i64>(e, key));
    if [left, right, top, bottom].iter().all(Option::is_none) {
        return None;
    }
    Some(Insets {
        left: Emu(left.unwrap_or_default()),
        right: Emu(right.unwrap_or_default()),
        top: Emu(top.unwrap_or_default()),
        bottom: Emu(bottom.unwrap_or_default()),
    })
}
