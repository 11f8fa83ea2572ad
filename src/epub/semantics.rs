//! Semantic navigation parsing: EPUB 3 landmarks and NCX title maps.
//!
//! Both sources are optional. Failures here degrade the parse (fewer
//! annotations, generic titles) rather than failing it.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::book::SemanticMap;
use crate::epub::{local_name, resolve_entity};

/// Nesting bound for NCX navPoint walks. Real documents stay in single
/// digits; anything deeper is malformed input.
const MAX_NAV_DEPTH: usize = 64;

/// Parse `landmarks` entries out of an EPUB 3 navigation document and merge
/// them into `map`.
///
/// Looks for `<nav epub:type="landmarks">` and records each `<a epub:type="..."
/// href="...">` inside it. Anything unparsable is skipped.
pub fn parse_landmarks(content: &str, map: &mut SemanticMap) {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut in_landmarks = false;
    // Nested nav elements inside the landmarks nav (unusual, but balanced
    // end-tag tracking needs it).
    let mut nav_depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                match local {
                    b"nav" => {
                        if in_landmarks {
                            nav_depth += 1;
                        } else {
                            let is_landmarks = e.attributes().flatten().any(|attr| {
                                local_name(attr.key.as_ref()) == b"type"
                                    && attr.value.as_ref() == b"landmarks"
                            });
                            if is_landmarks {
                                in_landmarks = true;
                                nav_depth = 0;
                            }
                        }
                    }
                    b"a" if in_landmarks => record_landmark_link(&e, map),
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                if in_landmarks && local_name(e.name().as_ref()) == b"a" {
                    record_landmark_link(&e, map);
                }
            }
            Ok(Event::End(e)) => {
                if in_landmarks && local_name(e.name().as_ref()) == b"nav" {
                    if nav_depth == 0 {
                        in_landmarks = false;
                    } else {
                        nav_depth -= 1;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                tracing::warn!("landmarks navigation unparsable, skipping: {err}");
                break;
            }
            _ => {}
        }
    }
}

fn record_landmark_link(e: &quick_xml::events::BytesStart<'_>, map: &mut SemanticMap) {
    let mut semantic_type: Option<String> = None;
    let mut href: Option<String> = None;

    for attr in e.attributes().flatten() {
        match local_name(attr.key.as_ref()) {
            b"type" => semantic_type = String::from_utf8(attr.value.to_vec()).ok(),
            b"href" => href = String::from_utf8(attr.value.to_vec()).ok(),
            _ => {}
        }
    }

    if let (Some(semantic_type), Some(href)) = (semantic_type, href) {
        map.insert_reference(&href, semantic_type);
    }
}

/// Walk an NCX document and build a flat map from content src (anchor
/// stripped) to its human-readable navigation label.
///
/// navPoints nest arbitrarily; the walk uses an explicit stack bounded at
/// [`MAX_NAV_DEPTH`] so malformed input cannot recurse without limit. Entries
/// beyond the bound are skipped, keeping whatever was collected.
pub fn parse_ncx_titles(content: &str) -> HashMap<String, String> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    #[derive(Default)]
    struct NavPointState {
        label: Option<String>,
        src: Option<String>,
    }

    let mut titles = HashMap::new();
    let mut stack: Vec<NavPointState> = Vec::new();
    // Unbalanced-depth counter for navPoints past the cap.
    let mut skipped = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"navPoint" => {
                        if skipped > 0 || stack.len() >= MAX_NAV_DEPTH {
                            skipped += 1;
                        } else {
                            stack.push(NavPointState::default());
                        }
                    }
                    b"text" if !stack.is_empty() => in_text = true,
                    b"content" => {
                        if let Some(src) = content_src(&e)
                            && let Some(state) = stack.last_mut()
                        {
                            state.src = Some(src);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                if local_name(e.name().as_ref()) == b"content"
                    && let Some(src) = content_src(&e)
                    && let Some(state) = stack.last_mut()
                {
                    state.src = Some(src);
                }
            }
            Ok(Event::Text(e)) => {
                if in_text && let Some(state) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(e.as_ref());
                    match &mut state.label {
                        Some(existing) => existing.push_str(&raw),
                        None => state.label = Some(raw.into_owned()),
                    }
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if in_text && let Some(state) = stack.last_mut() {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        match &mut state.label {
                            Some(existing) => existing.push_str(&resolved),
                            None => state.label = Some(resolved),
                        }
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"text" => in_text = false,
                    b"navPoint" => {
                        if skipped > 0 {
                            skipped -= 1;
                        } else if let Some(state) = stack.pop()
                            && let (Some(label), Some(src)) = (state.label, state.src)
                        {
                            titles.insert(src, label);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                tracing::warn!("NCX navigation unparsable, keeping partial title map: {err}");
                break;
            }
            _ => {}
        }
    }

    titles
}

/// Anchor-stripped `src` attribute of an NCX `<content>` element.
fn content_src(e: &quick_xml::events::BytesStart<'_>) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"src"
            && let Ok(src) = String::from_utf8(attr.value.to_vec())
        {
            return Some(src.split('#').next().unwrap_or(&src).to_string());
        }
    }
    None
}
