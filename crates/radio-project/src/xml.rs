//! Project XML codec.
//!
//! The pretty-printed layout is part of the file format: TuneInCrew reads it
//! and users diff saved projects, so output must stay byte-stable.
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <project>
//!   <fmod>…</fmod>
//!   <radio>
//!     <id>…</id>  <name>…</name>  <logo>…</logo>
//!     <jingles> <file>…</file>* </jingles>     (only if a jingle has a path)
//!     <songs> <song> file name artist year length force </song>* </songs>
//!   </radio>
//! </project>
//! ```

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::document::{ProjectDocument, Song, SongField};
use crate::error::{ProjectError, Result};

pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
const INDENT: &str = "  ";

// ── Element tree ──────────────────────────────────────────────────────────────

/// Minimal element tree: tag, direct text, children. No attributes; the
/// project format has none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Element {
    tag: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    fn leaf(tag: &str, text: &str) -> Self {
        Self {
            tag: tag.to_string(),
            text: text.to_string(),
            children: Vec::new(),
        }
    }

    fn parent(tag: &str, children: Vec<Element>) -> Self {
        Self {
            tag: tag.to_string(),
            text: String::new(),
            children,
        }
    }

    /// First child with this tag.
    fn child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.tag == tag)
    }

    fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }
}

// ── Serialize ─────────────────────────────────────────────────────────────────

/// Render the document, declaration included.
///
/// Placeholder rows (empty path) and songs hidden by the active search are
/// left out. Saving mid-search therefore drops the hidden songs from the file.
pub fn to_xml_string(doc: &ProjectDocument) -> String {
    let mut out = String::from(XML_DECLARATION);
    write_element(&mut out, &document_tree(doc), 0);
    out
}

pub fn serialize(doc: &ProjectDocument) -> Vec<u8> {
    to_xml_string(doc).into_bytes()
}

fn document_tree(doc: &ProjectDocument) -> Element {
    let radio = doc.radio();
    let mut radio_el = Element::parent(
        "radio",
        vec![
            Element::leaf("id", radio.id()),
            Element::leaf("name", radio.name()),
            Element::leaf("logo", radio.logo_path()),
        ],
    );

    let jingles: Vec<Element> = doc
        .persisted_jingles()
        .map(|j| Element::leaf("file", &j.file_path))
        .collect();
    if !jingles.is_empty() {
        radio_el.children.push(Element::parent("jingles", jingles));
    }

    let songs = doc.persisted_songs().map(song_element).collect();
    radio_el.children.push(Element::parent("songs", songs));

    Element::parent(
        "project",
        vec![Element::leaf("fmod", doc.fmod_path()), radio_el],
    )
}

fn song_element(song: &Song) -> Element {
    Element::parent(
        "song",
        SongField::ALL
            .iter()
            .map(|f| Element::leaf(f.tag(), song.get(*f)))
            .collect(),
    )
}

fn write_element(out: &mut String, el: &Element, level: usize) {
    let indent = INDENT.repeat(level);
    let tag = &el.tag;
    let text = escape(el.text.as_str());
    let has_text = !text.trim().is_empty();

    if el.children.is_empty() {
        if has_text {
            out.push_str(&format!("{indent}<{tag}>{text}</{tag}>\n"));
        } else {
            out.push_str(&format!("{indent}<{tag}></{tag}>\n"));
        }
        return;
    }

    out.push_str(&format!("{indent}<{tag}>\n"));
    if has_text {
        out.push_str(&format!("{indent}{INDENT}{text}\n"));
    }
    for child in &el.children {
        write_element(out, child, level + 1);
    }
    out.push_str(&format!("{indent}</{tag}>\n"));
}

// ── Parse ─────────────────────────────────────────────────────────────────────

/// Parse project XML. Missing elements leave blank fields; broken XML is
/// `MalformedDocument`.
pub fn parse(bytes: &[u8]) -> Result<ProjectDocument> {
    let root = read_tree(bytes)?;
    if root.tag != "project" {
        warn!("Root element is <{}>, expected <project>; reading anyway", root.tag);
    }
    Ok(document_from_tree(&root))
}

fn malformed(msg: impl Into<String>) -> ProjectError {
    ProjectError::MalformedDocument(msg.into())
}

fn read_tree(bytes: &[u8]) -> Result<Element> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            malformed(format!("{} at byte {}", e, reader.buffer_position()))
        })?;

        match event {
            Event::Start(e) => {
                if root.is_some() {
                    return Err(malformed("content after the root element"));
                }
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                stack.push(Element::new(tag));
            }
            Event::Empty(e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                attach(&mut stack, &mut root, Element::new(tag))?;
            }
            Event::End(_) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| malformed("closing tag without an open element"))?;
                attach(&mut stack, &mut root, el)?;
            }
            Event::Text(t) => match stack.last_mut() {
                Some(current) => {
                    let text = t
                        .unescape()
                        .map_err(|e| malformed(format!("bad text content: {e}")))?;
                    current.text.push_str(&text);
                }
                None => {
                    if !t.iter().all(u8::is_ascii_whitespace) {
                        return Err(malformed("text outside the root element"));
                    }
                }
            },
            Event::CData(c) => {
                if let Some(current) = stack.last_mut() {
                    let text = std::str::from_utf8(&c)
                        .map_err(|e| malformed(format!("CDATA is not UTF-8: {e}")))?;
                    current.text.push_str(text);
                }
            }
            Event::Eof => break,
            // Declaration, comments, processing instructions, doctype
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(malformed(format!("unclosed element <{}>", open.tag)));
    }
    root.ok_or_else(|| malformed("no root element"))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, el: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(el),
        None if root.is_some() => return Err(malformed("more than one root element")),
        None => *root = Some(el),
    }
    Ok(())
}

fn document_from_tree(root: &Element) -> ProjectDocument {
    let mut doc = ProjectDocument::default();

    if let Some(fmod) = root.child("fmod") {
        doc.set_fmod_path(fmod.text.as_str());
    }

    let Some(radio) = root.child("radio") else {
        debug!("No <radio> element; document has no identity, jingles or songs");
        return doc;
    };

    if let Some(id) = radio.child("id") {
        doc.set_radio_id(&id.text);
    }
    if let Some(name) = radio.child("name") {
        doc.set_radio_name(name.text.as_str());
    }
    if let Some(logo) = radio.child("logo") {
        doc.set_radio_logo(logo.text.as_str());
    }

    if let Some(jingles) = radio.child("jingles") {
        for file in jingles.children_named("file") {
            doc.add_jingle(file.text.as_str());
        }
    }

    if let Some(songs) = radio.child("songs") {
        for song_el in songs.children_named("song") {
            let mut song = Song::new();
            for field in SongField::ALL {
                if let Some(child) = song_el.child(field.tag()) {
                    song.set(field, child.text.as_str());
                }
            }
            doc.add_song(song);
        }
    }

    doc
}

// ── Files ─────────────────────────────────────────────────────────────────────

pub fn read_file(path: &Path) -> Result<ProjectDocument> {
    let bytes = std::fs::read(path).map_err(|e| ProjectError::io(path, e))?;
    let doc = parse(&bytes)?;
    info!(
        "Loaded {}: {} jingles, {} songs",
        path.display(),
        doc.jingles().len(),
        doc.songs().len()
    );
    Ok(doc)
}

/// Serialize and replace `path` in one step.
///
/// The bytes go to a temp file in the destination directory which is then
/// renamed over the target, so a failed save never leaves a truncated file.
pub fn write_file(doc: &ProjectDocument, path: &Path) -> Result<()> {
    let bytes = serialize(doc);
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = temp_file_in(dir).map_err(|e| ProjectError::io(dir, e))?;
    // Saving over a project keeps its mode.
    if let Ok(existing) = std::fs::metadata(path) {
        if existing.is_file() {
            tmp.as_file()
                .set_permissions(existing.permissions())
                .map_err(|e| ProjectError::io(tmp.path(), e))?;
        }
    }
    tmp.write_all(&bytes)
        .map_err(|e| ProjectError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| ProjectError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| ProjectError::io(path, e.error))?;

    info!(
        "Saved {} ({} bytes, {} songs)",
        path.display(),
        bytes.len(),
        doc.persisted_songs().count()
    );
    Ok(())
}

/// Temp file for [`write_file`]. A new project gets the same mode as any
/// freshly created file (0666 less the umask), not tempfile's private 0600.
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".radio-").suffix(".xml.tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}
