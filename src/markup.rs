//! Markup Scanner - Start Tags Only
//!
//! Streams the text through `quick_xml::Reader` and keeps each event's source
//! span, so untouched markup is re-emitted byte for byte. A reader error
//! ends the scan; the rest is passed through as text.

use quick_xml::events::attributes::Attribute as XmlAttribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// Raw (still escaped) value; empty for a bare attribute
    pub value: String,
}

impl Attribute {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag<'a> {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub self_closing: bool,
    /// Source text of the tag, `<` through `>`
    pub raw: &'a str,
}

impl StartTag<'_> {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Replace the value in place, or append when absent.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value.to_string(),
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    pub fn insert_attr(&mut self, index: usize, attribute: Attribute) {
        let index = index.min(self.attributes.len());
        self.attributes.insert(index, attribute);
    }

    /// Remove every attribute named `name`. Returns true if any was removed.
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|a| a.name != name);
        self.attributes.len() != before
    }

    /// Re-emit the tag with double-quoted attributes.
    pub fn serialize(&self) -> String {
        let mut start = BytesStart::new(self.name.as_str());
        for attribute in &self.attributes {
            // Values are kept escaped; only a quote from a single-quoted source needs escaping
            let value = attribute.value.replace('"', "&quot;");
            start.push_attribute(XmlAttribute {
                key: QName(attribute.name.as_bytes()),
                value: Cow::Owned(value.into_bytes()),
            });
        }
        let event = if self.self_closing { Event::Empty(start) } else { Event::Start(start) };

        let mut writer = Writer::new(Vec::new());
        // Writing into a Vec does not fail
        let _ = writer.write_event(event);
        String::from_utf8(writer.into_inner()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Tag(StartTag<'a>),
    /// XML declaration, `<?xml…?>` processing instruction, comment or DOCTYPE
    NonStructural(&'a str),
}

/// Split `text` into text runs, start tags and non-structural markup.
///
/// Concatenating every segment's source text reproduces the input exactly.
pub fn scan(text: &str) -> Vec<Segment<'_>> {
    let mut reader = Reader::from_str(text);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut segments = vec![];
    let mut start = 0;

    loop {
        let event = reader.read_event();
        let end = usize::try_from(reader.buffer_position()).unwrap_or(text.len());
        let Some(raw) = text.get(start..end) else {
            break;
        };

        match event {
            Ok(Event::Eof) | Err(_) => break,
            Ok(Event::Start(e)) => segments.push(tag_segment(&e, false, raw)),
            Ok(Event::Empty(e)) => segments.push(tag_segment(&e, true, raw)),
            Ok(Event::Decl(_) | Event::Comment(_) | Event::DocType(_)) => {
                segments.push(Segment::NonStructural(raw));
            }
            Ok(Event::PI(_)) if raw.starts_with("<?xml") => segments.push(Segment::NonStructural(raw)),
            Ok(_) => segments.push(Segment::Text(raw)),
        }
        start = end;
    }

    if start < text.len() {
        segments.push(Segment::Text(&text[start..]));
    }
    segments
}

/// Rebuild text from segments, re-serializing only the tags flagged dirty.
pub fn render(segments: &[(Segment<'_>, bool)]) -> String {
    let mut out = String::new();
    for (segment, dirty) in segments {
        match segment {
            Segment::Text(text) | Segment::NonStructural(text) => out.push_str(text),
            Segment::Tag(tag) if *dirty => out.push_str(&tag.serialize()),
            Segment::Tag(tag) => out.push_str(tag.raw),
        }
    }
    out
}

/// A start tag whose attributes do not parse stays verbatim text.
fn tag_segment<'a>(start: &BytesStart<'_>, self_closing: bool, raw: &'a str) -> Segment<'a> {
    let mut parsed = start.html_attributes();
    parsed.with_checks(false);

    let mut attributes = vec![];
    for attribute in parsed {
        let Ok(attribute) = attribute else {
            return Segment::Text(raw);
        };
        attributes.push(Attribute {
            name: String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
            value: String::from_utf8_lossy(&attribute.value).into_owned(),
        });
    }

    Segment::Tag(StartTag {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        attributes,
        self_closing,
        raw,
    })
}
