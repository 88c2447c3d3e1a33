#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const DML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const WPD_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const MC_NS: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";
const WPS_NS: &str = "http://schemas.microsoft.com/office/word/2010/wordprocessingShape";
const VML_NS: &str = "urn:schemas-microsoft-com:vml";
const IMAGE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

pub const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn run(text: &str, color: Option<&str>) -> String {
    let rpr = color
        .map(|c| format!(r#"<w:rPr><w:color w:val="{c}"/></w:rPr>"#))
        .unwrap_or_default();
    format!(r#"<w:r>{rpr}<w:t xml:space="preserve">{}</w:t></w:r>"#, escape(text))
}

fn drawing(rel_id: &str) -> String {
    format!(
        r#"<w:r><w:drawing><wp:inline><wp:extent cx="952500" cy="952500"/><a:graphic><a:graphicData><a:blip r:embed="{rel_id}"/></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#
    )
}

/// Assembles a minimal `.docx` package in memory.
#[derive(Default)]
pub struct DocxBuilder {
    body: String,
    media: Vec<(String, String, Vec<u8>)>,
    footnotes: Vec<String>,
    omit_document: bool,
    document_override: Option<String>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paragraph(mut self, text: &str) -> Self {
        self.body.push_str(&format!("<w:p>{}</w:p>", run(text, None)));
        self
    }

    pub fn colored(mut self, text: &str, color: &str) -> Self {
        self.body.push_str(&format!("<w:p>{}</w:p>", run(text, Some(color))));
        self
    }

    /// A paragraph whose runs are `(text, color)` pairs.
    pub fn runs(mut self, runs: &[(&str, Option<&str>)]) -> Self {
        let inner: String = runs.iter().map(|(t, c)| run(t, *c)).collect();
        self.body.push_str(&format!("<w:p>{inner}</w:p>"));
        self
    }

    pub fn listed(mut self, text: &str, num_id: u32, color: Option<&str>) -> Self {
        self.body.push_str(&format!(
            r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="{num_id}"/></w:numPr></w:pPr>{}</w:p>"#,
            run(text, color)
        ));
        self
    }

    /// Register a media part and its image relationship.
    pub fn media(mut self, rel_id: &str, target: &str, data: &[u8]) -> Self {
        self.media
            .push((rel_id.to_string(), target.to_string(), data.to_vec()));
        self
    }

    /// A paragraph with optional text followed by an inline picture.
    pub fn picture(mut self, text: &str, rel_id: &str) -> Self {
        let text_run = if text.is_empty() { String::new() } else { run(text, None) };
        self.body
            .push_str(&format!("<w:p>{text_run}{}</w:p>", drawing(rel_id)));
        self
    }

    /// A paragraph anchoring a text box, written the way Word does: the
    /// DrawingML shape under `mc:Choice` and a VML copy under `mc:Fallback`.
    pub fn textbox(mut self, paragraphs: &[&str]) -> Self {
        let inner: String = paragraphs
            .iter()
            .map(|t| format!("<w:p>{}</w:p>", run(t, None)))
            .collect();
        self.body.push_str(&format!(
            r#"<w:p><w:r><mc:AlternateContent><mc:Choice Requires="wps"><w:drawing><wp:anchor><a:graphic><a:graphicData><wps:wsp><wps:txbx><w:txbxContent>{inner}</w:txbxContent></wps:txbx></wps:wsp></a:graphicData></a:graphic></wp:anchor></w:drawing></mc:Choice><mc:Fallback><w:pict><v:shape><v:textbox><w:txbxContent>{inner}</w:txbxContent></v:textbox></v:shape></w:pict></mc:Fallback></mc:AlternateContent></w:r></w:p>"#
        ));
        self
    }

    pub fn footnote(mut self, paragraphs: &[&str]) -> Self {
        let inner: String = paragraphs
            .iter()
            .map(|t| format!("<w:p>{}</w:p>", run(t, None)))
            .collect();
        self.footnotes.push(inner);
        self
    }

    pub fn without_document(mut self) -> Self {
        self.omit_document = true;
        self
    }

    pub fn raw_document(mut self, xml: &str) -> Self {
        self.document_override = Some(xml.to_string());
        self
    }

    fn document_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{WML_NS}" xmlns:r="{REL_NS}" xmlns:a="{DML_NS}" xmlns:wp="{WPD_NS}" xmlns:mc="{MC_NS}" xmlns:wps="{WPS_NS}" xmlns:v="{VML_NS}"><w:body>{}<w:sectPr/></w:body></w:document>"#,
            self.body
        )
    }

    fn rels_xml(&self) -> String {
        let mut rels: String = self
            .media
            .iter()
            .map(|(id, target, _)| {
                format!(r#"<Relationship Id="{id}" Type="{IMAGE_REL}" Target="{target}"/>"#)
            })
            .collect();
        rels.push_str(r#"<Relationship Id="rIdStyles" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#);
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
        )
    }

    fn footnotes_xml(&self) -> String {
        let notes: String = self
            .footnotes
            .iter()
            .enumerate()
            .map(|(i, inner)| format!(r#"<w:footnote w:id="{}">{inner}</w:footnote>"#, i + 1))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:footnotes xmlns:w="{WML_NS}"><w:footnote w:type="separator" w:id="-1"><w:p><w:r><w:separator/></w:r></w:p></w:footnote>{notes}</w:footnotes>"#
        )
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let mut add = |name: &str, data: &[u8]| {
            zip.start_file(name, SimpleFileOptions::default())
                .expect("start zip entry");
            zip.write_all(data).expect("write zip entry");
        };

        add("[Content_Types].xml", br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#);
        if !self.omit_document {
            let document = self
                .document_override
                .clone()
                .unwrap_or_else(|| self.document_xml());
            add("word/document.xml", document.as_bytes());
        }
        add("word/_rels/document.xml.rels", self.rels_xml().as_bytes());
        for (_, target, data) in &self.media {
            add(&format!("word/{target}"), data);
        }
        if !self.footnotes.is_empty() {
            add("word/footnotes.xml", self.footnotes_xml().as_bytes());
        }

        zip.finish().expect("finish zip").into_inner()
    }
}

pub fn texts(q: &docx_quiz::SanitizedQuestion) -> Vec<&str> {
    q.options.iter().map(|o| o.text.as_str()).collect()
}

pub fn correct(q: &docx_quiz::SanitizedQuestion) -> Vec<usize> {
    q.options
        .iter()
        .filter(|o| o.is_correct)
        .map(|o| o.order)
        .collect()
}
