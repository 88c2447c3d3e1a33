pub mod media;

use std::collections::HashMap;
use std::io::{Cursor, Read};

use crate::error::Error;
use crate::model::ParagraphEntry;
use crate::quiz::marker::{MarkerPolicy, is_marking_color};

use media::{REL_NS, materialize_images, parse_image_rels};

pub(crate) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const DML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const MC_NS: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const FOOTNOTES_PART: &str = "word/footnotes.xml";
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
const FOOTNOTES_RELS_PART: &str = "word/_rels/footnotes.xml.rels";

pub(crate) fn wml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(WML_NS))
}

pub(crate) fn wml_attr<'a>(node: roxmltree::Node<'a, 'a>, child: &str) -> Option<&'a str> {
    wml(node, child).and_then(|n| n.attribute((WML_NS, "val")))
}

fn is_wml(node: roxmltree::Node, name: &str) -> bool {
    node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

/// Paragraphs under `root` in document order.
///
/// Text boxes are stored twice, under `mc:Choice` and again under `mc:Fallback`;
/// only the first copy is visited.
fn paragraphs<'a>(root: roxmltree::Node<'a, 'a>) -> impl Iterator<Item = roxmltree::Node<'a, 'a>> {
    root.descendants().filter(|n| {
        is_wml(*n, "p")
            && !n.ancestors().any(|a| {
                a.tag_name().name() == "Fallback" && a.tag_name().namespace() == Some(MC_NS)
            })
    })
}

/// Read-only view over the parts of an OOXML package.
pub struct DocxArchive<'a> {
    zip: zip::ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> DocxArchive<'a> {
    /// Open a package; fails unless it is a zip that contains `word/document.xml`.
    pub fn open(bytes: &'a [u8]) -> Result<Self, Error> {
        let zip = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|_| Error::InvalidDocx("file is not a ZIP archive".into()))?;
        if zip.index_for_name(DOCUMENT_PART).is_none() {
            return Err(Error::InvalidDocx(
                "missing word/document.xml (is this a DOCX file?)".into(),
            ));
        }
        Ok(Self { zip })
    }

    pub fn read_text(&mut self, name: &str) -> Option<String> {
        let mut content = String::new();
        self.zip.by_name(name).ok()?.read_to_string(&mut content).ok()?;
        Some(content)
    }

    pub fn read_bytes(&mut self, name: &str) -> Option<Vec<u8>> {
        let mut data = Vec::new();
        self.zip.by_name(name).ok()?.read_to_end(&mut data).ok()?;
        Some(data)
    }

    pub fn entries(&self) -> Vec<String> {
        self.zip.file_names().map(String::from).collect()
    }

    fn read_document(&mut self) -> Result<String, Error> {
        self.read_text(DOCUMENT_PART)
            .ok_or_else(|| Error::InvalidDocx("word/document.xml is not readable UTF-8".into()))
    }
}

/// Extract the flat list of logical lines from a `.docx` buffer.
pub fn extract_entries(
    bytes: &[u8],
    markers: &MarkerPolicy,
    include_footnotes: bool,
    parallel_images: bool,
) -> Result<Vec<ParagraphEntry>, Error> {
    let mut archive = DocxArchive::open(bytes)?;
    log::debug!("Opened DOCX package with {} entries", archive.entries().len());

    let rels = archive
        .read_text(DOCUMENT_RELS_PART)
        .map(|xml| parse_image_rels(&xml))
        .unwrap_or_default();
    let images = materialize_images(&mut archive, &rels, parallel_images);
    log::info!("Resolved {}/{} image relationships", images.len(), rels.len());

    let xml_content = archive.read_document()?;
    let xml = roxmltree::Document::parse(&xml_content)?;
    let body = wml(xml.root_element(), "body")
        .ok_or_else(|| Error::InvalidDocx("missing w:body".into()))?;

    let mut extractor = LineExtractor::new(markers, &images);
    for para in paragraphs(body) {
        extractor.paragraph(para);
    }
    let mut entries = extractor.entries;

    if include_footnotes {
        entries.extend(extract_footnotes(&mut archive, markers, parallel_images));
    }

    Ok(entries)
}

fn extract_footnotes(
    archive: &mut DocxArchive,
    markers: &MarkerPolicy,
    parallel_images: bool,
) -> Vec<ParagraphEntry> {
    let Some(xml_content) = archive.read_text(FOOTNOTES_PART) else {
        return Vec::new();
    };
    let Ok(xml) = roxmltree::Document::parse(&xml_content) else {
        log::warn!("Ignoring malformed {FOOTNOTES_PART}");
        return Vec::new();
    };
    let rels = archive
        .read_text(FOOTNOTES_RELS_PART)
        .map(|xml| parse_image_rels(&xml))
        .unwrap_or_default();
    let images = materialize_images(archive, &rels, parallel_images);

    let mut extractor = LineExtractor::new(markers, &images);
    for note in xml.root_element().children().filter(|n| is_wml(*n, "footnote")) {
        // separator, continuationSeparator, continuationNotice
        if note.attribute((WML_NS, "type")).is_some() {
            continue;
        }
        for para in paragraphs(note) {
            extractor.paragraph(para);
        }
    }
    extractor.entries
}

#[derive(Default)]
struct LineBuffer {
    text: String,
    is_marked: bool,
    is_red: bool,
    image_ref: Option<String>,
}

struct ListInfo {
    id: Option<String>,
    level: Option<String>,
}

struct LineExtractor<'p> {
    markers: &'p MarkerPolicy,
    images: &'p HashMap<String, String>,
    entries: Vec<ParagraphEntry>,
}

impl<'p> LineExtractor<'p> {
    fn new(markers: &'p MarkerPolicy, images: &'p HashMap<String, String>) -> Self {
        Self {
            markers,
            images,
            entries: Vec::new(),
        }
    }

    fn paragraph(&mut self, para: roxmltree::Node) {
        let num_pr = wml(para, "pPr").and_then(|ppr| wml(ppr, "numPr"));
        // numId 0 removes numbering inherited from the style
        let id = num_pr
            .and_then(|n| wml_attr(n, "numId"))
            .filter(|id| *id != "0")
            .map(String::from);
        let level = id
            .as_ref()
            .and(num_pr)
            .and_then(|n| wml_attr(n, "ilvl"))
            .map(String::from);
        let list = ListInfo { id, level };

        let mut run_nodes = Vec::new();
        collect_run_nodes(para, &mut run_nodes);

        let mut line = LineBuffer::default();
        for run in run_nodes {
            self.run(run, &mut line, &list);
        }
        self.flush(&mut line, &list);
    }

    fn run(&mut self, run: roxmltree::Node, line: &mut LineBuffer, list: &ListInfo) {
        let color = wml(run, "rPr").and_then(|rpr| wml_attr(rpr, "color"));
        let marking = color.is_some_and(is_marking_color);
        let red = marking && color.is_some_and(|c| self.markers.is_red(c));

        for child in run.children() {
            let name = child.tag_name().name();
            if child.tag_name().namespace() == Some(WML_NS) {
                match name {
                    "t" => {
                        let Some(t) = child.text() else { continue };
                        line.text.push_str(&t.replace('\n', " "));
                        if !t.trim().is_empty() {
                            line.is_marked |= marking;
                            line.is_red |= red;
                        }
                    }
                    "tab" => line.text.push(' '),
                    "sym" => {
                        if let Some(c) = child
                            .attribute((WML_NS, "char"))
                            .and_then(|v| u32::from_str_radix(v, 16).ok())
                            .and_then(symbol_char)
                        {
                            line.text.push(c);
                            line.is_marked |= marking;
                            line.is_red |= red;
                        }
                    }
                    "br" | "cr" => self.flush(line, list),
                    "drawing" | "pict" | "object" => self.attach_image(child, line),
                    _ => {}
                }
            } else if name == "AlternateContent" {
                self.attach_image(child, line);
            }
        }
    }

    fn attach_image(&self, container: roxmltree::Node, line: &mut LineBuffer) {
        let Some(rel_id) = find_image_rel(container) else {
            return;
        };
        if line.image_ref.is_some() {
            log::debug!("Line already carries an image, ignoring {rel_id}");
            return;
        }
        let resolved = match self.images.get(rel_id) {
            Some(uri) => uri.clone(),
            None => {
                log::debug!("Image relationship {rel_id} is unresolved, keeping the raw id");
                rel_id.to_string()
            }
        };
        line.image_ref = Some(resolved);
    }

    fn flush(&mut self, line: &mut LineBuffer, list: &ListInfo) {
        let buffered = std::mem::take(line);
        let text = buffered.text.replace('\u{a0}', " ").trim().to_string();
        if text.is_empty() && buffered.image_ref.is_none() {
            return;
        }
        self.entries.push(ParagraphEntry {
            text,
            is_marked: buffered.is_marked,
            is_red: buffered.is_red,
            list_id: list.id.clone(),
            list_level: list.level.clone(),
            image_ref: buffered.image_ref,
        });
    }
}

/// Runs of a paragraph in document order, looking through inline wrappers.
fn collect_run_nodes<'a>(parent: roxmltree::Node<'a, 'a>, out: &mut Vec<roxmltree::Node<'a, 'a>>) {
    for child in parent.children() {
        if child.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match child.tag_name().name() {
            "r" => out.push(child),
            "hyperlink" | "ins" | "smartTag" | "fldSimple" => collect_run_nodes(child, out),
            "sdt" => {
                if let Some(content) = wml(child, "sdtContent") {
                    collect_run_nodes(content, out);
                }
            }
            _ => {}
        }
    }
}

/// Relationship id of the first picture under a drawing, VML picture or OLE object.
fn find_image_rel<'a>(container: roxmltree::Node<'a, 'a>) -> Option<&'a str> {
    container.descendants().find_map(|n| match n.tag_name().name() {
        "blip" if n.tag_name().namespace() == Some(DML_NS) => n.attribute((REL_NS, "embed")),
        "imagedata" => n.attribute((REL_NS, "id")),
        _ => None,
    })
}

/// Map a `w:sym` code point to Unicode. Symbol-font glyphs live in the F0xx private use area.
fn symbol_char(cp: u32) -> Option<char> {
    let sym = if (0xF000..=0xF0FF).contains(&cp) { cp - 0xF000 } else { cp };
    let mapped = match sym {
        0xAE => '\u{2192}', // →
        0xDE => '\u{21D2}', // ⇒
        0xAC => '\u{2190}', // ←
        0xB4 => '\u{00D7}', // ×
        0xB8 => '\u{00F7}', // ÷
        0xB3 => '\u{2265}', // ≥
        0xA3 => '\u{2264}', // ≤
        0xB9 => '\u{2260}', // ≠
        0xB1 => '\u{00B1}', // ±
        0xD6 => '\u{221A}', // √
        0xB7 => '\u{2022}', // •
        _ => return char::from_u32(sym),
    };
    Some(mapped)
}
