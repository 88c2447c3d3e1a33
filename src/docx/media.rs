use std::collections::HashMap;

use base64::Engine;
use rayon::prelude::*;

use super::DocxArchive;

pub(super) const REL_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Parse a relationships part into `rId -> target`, keeping image relationships only.
/// Entries without an id or target, and external links, are skipped.
pub(super) fn parse_image_rels(xml_content: &str) -> HashMap<String, String> {
    let mut rels = HashMap::new();
    let Ok(xml) = roxmltree::Document::parse(xml_content) else {
        log::warn!("Relationships part is not well-formed XML, images will stay unresolved");
        return rels;
    };
    for node in xml.root_element().children() {
        if node.tag_name().name() != "Relationship" {
            continue;
        }
        let (Some(id), Some(target), Some(rel_type)) = (
            node.attribute("Id"),
            node.attribute("Target"),
            node.attribute("Type"),
        ) else {
            continue;
        };
        if !rel_type.contains("image") || node.attribute("TargetMode") == Some("External") {
            continue;
        }
        rels.insert(id.to_string(), target.to_string());
    }
    rels
}

/// Resolve a relationship target of `word/document.xml` to a zip entry name.
pub(super) fn part_path(target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(abs) => abs.to_string(),
        None => format!("word/{target}"),
    };
    let mut parts: Vec<&str> = Vec::new();
    for seg in joined.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

fn mime_from_extension(target: &str) -> &'static str {
    let ext = target
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "emf" => "image/emf",
        "wmf" => "image/wmf",
        _ => "image/png",
    }
}

/// Determine the MIME type from magic bytes, falling back to the target's extension.
pub fn sniff_mime(data: &[u8], target: &str) -> &'static str {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return "image/png";
    }
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }
    if data.starts_with(b"GIF8") {
        return "image/gif";
    }
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return "image/webp";
    }
    if data.starts_with(b"BM") {
        return "image/bmp";
    }
    mime_from_extension(target)
}

pub fn data_uri(data: &[u8], mime: &str) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(data);
    format!("data:{mime};base64,{payload}")
}

/// Read every referenced media part and encode it as a data URI, keyed by relationship id.
/// Unreadable or empty media is logged and left out of the map.
pub(super) fn materialize_images(
    archive: &mut DocxArchive,
    rels: &HashMap<String, String>,
    parallel: bool,
) -> HashMap<String, String> {
    let mut raw: Vec<(String, String, Vec<u8>)> = Vec::with_capacity(rels.len());
    for (rel_id, target) in rels {
        let path = part_path(target);
        match archive.read_bytes(&path) {
            Some(data) if !data.is_empty() => raw.push((rel_id.clone(), path, data)),
            Some(_) => log::warn!("Skipping empty image {path} ({rel_id})"),
            None => log::warn!("Skipping unreadable image {path} ({rel_id})"),
        }
    }

    let encode = |(rel_id, path, data): (String, String, Vec<u8>)| {
        let mime = sniff_mime(&data, &path);
        log::debug!("Image {rel_id}: {path} as {mime} ({} bytes)", data.len());
        (rel_id, data_uri(&data, mime))
    };

    if parallel {
        raw.into_par_iter().map(encode).collect()
    } else {
        raw.into_iter().map(encode).collect()
    }
}
