use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use crate::book::{Book, Fragment, SemanticMap};
use crate::epub::semantics::{parse_landmarks, parse_ncx_titles};
use crate::epub::text::{extract_heading_title, extract_title_element, html_to_plain};
use crate::epub::{local_name, resolve_entity};
use crate::error::{Error, Result};
use crate::util::{decode_text, extract_xml_encoding};

const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// Manifest entry: href, media type, and the space-separated properties list.
struct ManifestItem {
    href: String,
    media_type: String,
    properties: Option<String>,
}

/// Parsed package document.
struct OpfData {
    title: String,
    author: String,
    manifest: HashMap<String, ManifestItem>,
    spine_ids: Vec<String>,
    /// Legacy `<guide>` references: (semantic type, href).
    guide_refs: Vec<(String, String)>,
}

/// Read an EPUB file from disk into a [`Book`].
///
/// Extracts metadata, the spine-ordered content fragments, and the semantic
/// map merged from guide references and landmark navigation.
///
/// # Example
///
/// ```no_run
/// use narro::read_epub;
///
/// let book = read_epub("path/to/book.epub")?;
/// println!("{} by {}: {} fragments", book.title, book.author, book.fragments.len());
/// # Ok::<(), narro::Error>(())
/// ```
pub fn read_epub<P: AsRef<Path>>(path: P) -> Result<Book> {
    let file = std::fs::File::open(path)?;
    read_epub_from_reader(file)
}

/// Read an EPUB from any [`Read`] + [`Seek`] source.
///
/// Useful for reading from memory buffers or network streams.
pub fn read_epub_from_reader<R: Read + Seek>(reader: R) -> Result<Book> {
    let mut archive = ZipArchive::new(reader)
        .map_err(|_| Error::InvalidEpub("could not parse archive as a document".into()))?;

    // 1. Find the OPF path from the container descriptor
    let opf_path = find_opf_path(&mut archive)?;
    let opf_dir = Path::new(&opf_path)
        .parent()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default();

    // 2. Parse the package document
    let opf_content = read_archive_file(&mut archive, &opf_path)
        .map_err(|_| Error::InvalidEpub(format!("no package document at {opf_path}")))?;
    let opf = parse_opf(&opf_content)?;

    // 3. Merge guide references and landmark entries into one semantic map
    let mut semantics = SemanticMap::new();
    for (semantic_type, href) in &opf.guide_refs {
        semantics.insert_reference(href, semantic_type.clone());
    }
    if let Some(nav_href) = find_nav_href(&opf.manifest) {
        let nav_path = resolve_path(&opf_dir, &nav_href);
        match read_archive_file(&mut archive, &nav_path) {
            Ok(nav_content) => parse_landmarks(&nav_content, &mut semantics),
            Err(err) => tracing::debug!("navigation document {nav_path} unreadable: {err}"),
        }
    }

    // 4. Build the NCX title map (content src -> navigation label)
    let mut title_map = HashMap::new();
    if let Some(ncx_href) = find_ncx_href(&opf.manifest) {
        let ncx_path = resolve_path(&opf_dir, &ncx_href);
        match read_archive_file(&mut archive, &ncx_path) {
            Ok(ncx_content) => title_map = parse_ncx_titles(&ncx_content),
            Err(err) => tracing::debug!("NCX document {ncx_path} unreadable: {err}"),
        }
    }

    // 5. Walk the spine in order, skipping entries that cannot be resolved
    let mut fragments = Vec::new();
    for spine_id in &opf.spine_ids {
        let Some(item) = opf.manifest.get(spine_id) else {
            tracing::debug!("spine id {spine_id} missing from manifest, skipping");
            continue;
        };
        let full_path = resolve_path(&opf_dir, &item.href);
        let raw = match read_archive_file(&mut archive, &full_path) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::debug!("spine entry {full_path} unreadable, skipping: {err}");
                continue;
            }
        };

        let title = resolve_title(&item.href, &raw, &title_map, fragments.len() + 1);
        let plain = html_to_plain(&raw);
        fragments.push(Fragment::new(title, item.href.clone(), raw, plain));
    }

    Ok(Book {
        title: opf.title,
        author: opf.author,
        fragments,
        semantics,
    })
}

/// Resolve a fragment title with the fixed fallback chain: navigation label
/// (exact href, then percent-decoded) -> first h1/h2 -> `<title>` element ->
/// synthesized placeholder from the 1-based position.
fn resolve_title(
    href: &str,
    raw: &str,
    title_map: &HashMap<String, String>,
    position: usize,
) -> String {
    if let Some(label) = title_map.get(href) {
        return label.clone();
    }
    if let Ok(decoded) = percent_encoding::percent_decode_str(href).decode_utf8()
        && let Some(label) = title_map.get(decoded.as_ref())
    {
        return label.clone();
    }
    if let Some(heading) = extract_heading_title(raw) {
        return heading;
    }
    if let Some(title) = extract_title_element(raw) {
        return title;
    }
    format!("Section {position}")
}

/// The navigation document: a manifest item flagged with the `nav` property,
/// or conventionally id'd `nav`/`toc`.
fn find_nav_href(manifest: &HashMap<String, ManifestItem>) -> Option<String> {
    let by_property = manifest.values().find(|item| {
        item.properties
            .as_ref()
            .is_some_and(|props| props.split_ascii_whitespace().any(|p| p == "nav"))
    });
    if let Some(item) = by_property {
        return Some(item.href.clone());
    }

    manifest
        .iter()
        .find(|(id, _)| id.as_str() == "nav" || id.as_str() == "toc")
        .map(|(_, item)| item.href.clone())
}

fn find_ncx_href(manifest: &HashMap<String, ManifestItem>) -> Option<String> {
    manifest
        .values()
        .find(|item| item.media_type == NCX_MEDIA_TYPE)
        .map(|item| item.href.clone())
}

fn find_opf_path<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<String> {
    let container = read_archive_file(archive, "META-INF/container.xml")
        .map_err(|_| Error::InvalidEpub("no container descriptor (META-INF/container.xml)".into()))?;

    let mut reader = Reader::from_str(&container);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"rootfile" => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"full-path" {
                        return Ok(String::from_utf8(attr.value.to_vec())?);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => {
                return Err(Error::InvalidEpub(
                    "container descriptor is not valid XML".into(),
                ));
            }
            _ => {}
        }
    }

    Err(Error::InvalidEpub(
        "no rootfile found in container descriptor".into(),
    ))
}

fn parse_opf(content: &str) -> Result<OpfData> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut title: Option<String> = None;
    let mut author: Option<String> = None;
    let mut manifest: HashMap<String, ManifestItem> = HashMap::new();
    let mut spine_ids: Vec<String> = Vec::new();
    let mut guide_refs: Vec<(String, String)> = Vec::new();

    let mut in_metadata = false;
    let mut current_element: Option<&'static str> = None;
    let mut buf_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"metadata" => in_metadata = true,
                    b"title" if in_metadata => {
                        current_element = Some("title");
                        buf_text.clear();
                    }
                    b"creator" if in_metadata => {
                        current_element = Some("creator");
                        buf_text.clear();
                    }
                    b"item" => record_manifest_item(&e, &mut manifest)?,
                    b"itemref" => record_spine_idref(&e, &mut spine_ids)?,
                    b"reference" => record_guide_reference(&e, &mut guide_refs)?,
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"item" => record_manifest_item(&e, &mut manifest)?,
                    b"itemref" => record_spine_idref(&e, &mut spine_ids)?,
                    b"reference" => record_guide_reference(&e, &mut guide_refs)?,
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if current_element.is_some() {
                    buf_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if current_element.is_some() {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        buf_text.push_str(&resolved);
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                if local_name(name.as_ref()) == b"metadata" {
                    in_metadata = false;
                }

                if let Some(elem) = current_element {
                    // First value wins when metadata carries multiple
                    // localized titles/creators.
                    match elem {
                        "title" if title.is_none() => title = Some(buf_text.clone()),
                        "creator" if author.is_none() => author = Some(buf_text.clone()),
                        _ => {}
                    }
                    current_element = None;
                    buf_text.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => {
                return Err(Error::InvalidEpub(
                    "package document is not valid XML".into(),
                ));
            }
            _ => {}
        }
    }

    Ok(OpfData {
        title: title.filter(|t| !t.trim().is_empty()).unwrap_or_else(|| "Unknown".into()),
        author: author.filter(|a| !a.trim().is_empty()).unwrap_or_else(|| "Unknown".into()),
        manifest,
        spine_ids,
        guide_refs,
    })
}

fn record_manifest_item(
    e: &quick_xml::events::BytesStart<'_>,
    manifest: &mut HashMap<String, ManifestItem>,
) -> Result<()> {
    let mut id = String::new();
    let mut href = String::new();
    let mut media_type = String::new();
    let mut properties: Option<String> = None;

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"id" => id = String::from_utf8(attr.value.to_vec())?,
            b"href" => href = String::from_utf8(attr.value.to_vec())?,
            b"media-type" => media_type = String::from_utf8(attr.value.to_vec())?,
            b"properties" => properties = Some(String::from_utf8(attr.value.to_vec())?),
            _ => {}
        }
    }

    if !id.is_empty() {
        manifest.insert(
            id,
            ManifestItem {
                href,
                media_type,
                properties,
            },
        );
    }
    Ok(())
}

fn record_spine_idref(
    e: &quick_xml::events::BytesStart<'_>,
    spine_ids: &mut Vec<String>,
) -> Result<()> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"idref" {
            spine_ids.push(String::from_utf8(attr.value.to_vec())?);
        }
    }
    Ok(())
}

fn record_guide_reference(
    e: &quick_xml::events::BytesStart<'_>,
    guide_refs: &mut Vec<(String, String)>,
) -> Result<()> {
    let mut semantic_type: Option<String> = None;
    let mut href: Option<String> = None;

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"type" => semantic_type = Some(String::from_utf8(attr.value.to_vec())?),
            b"href" => href = Some(String::from_utf8(attr.value.to_vec())?),
            _ => {}
        }
    }

    if let (Some(semantic_type), Some(href)) = (semantic_type, href) {
        guide_refs.push((semantic_type, href));
    }
    Ok(())
}

fn read_archive_file<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let bytes = read_archive_file_bytes(archive, path)?;
    let hint = extract_xml_encoding(&bytes).map(str::to_owned);
    Ok(decode_text(&bytes, hint.as_deref()).into_owned())
}

fn read_archive_file_bytes<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<Vec<u8>> {
    // Try direct lookup first
    match archive.by_name(path) {
        Ok(mut file) => {
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            return Ok(contents);
        }
        Err(zip::result::ZipError::FileNotFound) => {}
        Err(e) => return Err(e.into()),
    }

    // Fallback: try percent-decoded path (handles malformed EPUBs)
    let decoded = percent_encoding::percent_decode_str(path)
        .decode_utf8()
        .map_err(|_| Error::InvalidEpub(format!("Invalid UTF-8 in path: {path}")))?;

    let mut file = archive.by_name(&decoded)?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;
    Ok(contents)
}

fn resolve_path(base: &str, href: &str) -> String {
    if base.is_empty() {
        href.to_string()
    } else {
        format!("{base}/{href}")
    }
}
