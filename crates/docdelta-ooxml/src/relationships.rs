//! Relationship resolution for `word/document.xml`
//!
//! Drawings reference their picture by relationship ID. This module turns
//! such an ID into either an archive part path or an external link.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ExtractionError, Result};

/// Where a relationship points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// A part inside the container, as a full archive path
    Part(String),
    /// A URL outside the container (`TargetMode="External"`)
    External(String),
}

/// Relationship ID to target map for the main document part
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    links: HashMap<String, LinkTarget>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `word/_rels/document.xml.rels`
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut links = HashMap::new();
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf).map_err(ExtractionError::Xml)? {
                Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"Relationship" => {
                    if let Some((id, target)) = read_link(&e) {
                        links.insert(id, target);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { links })
    }

    /// Target of a relationship ID
    pub fn resolve(&self, id: &str) -> Option<&LinkTarget> {
        self.links.get(id)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

fn read_link(element: &BytesStart<'_>) -> Option<(String, LinkTarget)> {
    let mut id = None;
    let mut target = None;
    let mut external = false;

    for attr in element.attributes().flatten() {
        let Ok(value) = attr.unescape_value() else {
            continue;
        };
        match attr.key.as_ref() {
            b"Id" => id = Some(value.into_owned()),
            b"Target" => target = Some(value.into_owned()),
            b"TargetMode" => external = value == "External",
            _ => {}
        }
    }

    let target = target?;
    let link = if external {
        LinkTarget::External(target)
    } else {
        LinkTarget::Part(part_path(&target))
    };
    Some((id?, link))
}

/// Archive path of a target relative to the `word/` folder
///
/// Targets starting with `/` are already rooted at the container.
pub fn part_path(target: &str) -> String {
    if let Some(rooted) = target.strip_prefix('/') {
        return rooted.to_string();
    }

    let mut segments = vec!["word"];
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}
