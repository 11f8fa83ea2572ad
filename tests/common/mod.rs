//! In-memory EPUB fixtures.
//!
//! Tests build small archives with `zip::ZipWriter` instead of shipping
//! binary fixtures, so every case states exactly the structure it needs.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

/// Zip up named text entries in order.
pub fn build_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (name, data) in entries {
        writer.start_file(*name, options).expect("start zip entry");
        writer.write_all(data.as_bytes()).expect("write zip entry");
    }

    writer.finish().expect("finish zip").into_inner()
}

/// Assemble a package document from its sections.
pub fn opf(metadata: &str, manifest: &str, spine: &str, tail: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
{metadata}
  </metadata>
  <manifest>
{manifest}
  </manifest>
  <spine>
{spine}
  </spine>
{tail}
</package>"#
    )
}

pub fn chapter_html(heading: &str, body: &str) -> String {
    format!(
        "<html><head><title>{heading}</title></head><body><h1>{heading}</h1><p>{body}</p></body></html>"
    )
}

/// Repeated filler prose long enough to clear the word-count heuristic.
pub fn prose(words: usize) -> String {
    vec!["meanwhile the story continued along the shore"; words.div_ceil(7)]
        .join(" ")
}

/// A complete EPUB: `(href, heading, body)` per chapter, default metadata.
pub fn simple_epub(chapters: &[(&str, &str, &str)]) -> Vec<u8> {
    let manifest: String = chapters
        .iter()
        .enumerate()
        .map(|(i, (href, _, _))| {
            format!(r#"    <item id="ch{i}" href="{href}" media-type="application/xhtml+xml"/>"#)
        })
        .collect::<Vec<_>>()
        .join("\n");
    let spine: String = chapters
        .iter()
        .enumerate()
        .map(|(i, _)| format!(r#"    <itemref idref="ch{i}"/>"#))
        .collect::<Vec<_>>()
        .join("\n");

    let package = opf(
        "    <dc:title>Fixture Book</dc:title>\n    <dc:creator>Fixture Author</dc:creator>",
        &manifest,
        &spine,
        "",
    );

    let mut entries: Vec<(String, String)> = vec![
        ("META-INF/container.xml".to_string(), CONTAINER_XML.to_string()),
        ("OEBPS/content.opf".to_string(), package),
    ];
    for (href, heading, body) in chapters {
        entries.push((format!("OEBPS/{href}"), chapter_html(heading, body)));
    }

    let borrowed: Vec<(&str, &str)> = entries
        .iter()
        .map(|(name, data)| (name.as_str(), data.as_str()))
        .collect();
    build_archive(&borrowed)
}
