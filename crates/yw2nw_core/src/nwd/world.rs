//! Location and object sheet codec (WORLD and OBJECT class files).

use super::character::TAG_KEYWORD;
use super::lines::{tokenize, Line};
use super::{join_paragraphs, tag, untag, ReadSession};
use crate::config::ConverterConfig;
use crate::model::novel::WorldElement;
use crate::nwx::item::NwItem;

/// Roster a world sheet belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldKind {
    Location,
    Object,
}

pub struct WorldCodec<'c> {
    config: &'c ConverterConfig,
    kind: WorldKind,
}

impl<'c> WorldCodec<'c> {
    pub fn new(config: &'c ConverterConfig, kind: WorldKind) -> Self {
        Self { config, kind }
    }

    /// Decodes one sheet and appends the element to the matching roster.
    pub fn decode(&self, text: &str, item: &NwItem, session: &mut ReadSession) {
        let mut element = WorldElement {
            title: item.name.clone(),
            ..WorldElement::default()
        };
        let mut desc = Vec::new();

        for (raw, line) in tokenize(text) {
            match line {
                Line::Keyword { key, value } if key.eq_ignore_ascii_case(TAG_KEYWORD) => {
                    element.title = untag(value);
                }
                Line::Command { value, .. } if line.is_command(&self.config.ywriter_aka_keyword) => {
                    element.aka = value.to_string();
                }
                Line::Command { value, .. } if line.is_command(&self.config.ywriter_tag_keyword) => {
                    element.tags.push(value.to_string());
                }
                Line::Text(_) | Line::Blank => desc.push(raw),
                _ => {}
            }
        }
        element.desc = join_paragraphs(&desc);

        match self.kind {
            WorldKind::Location => {
                let id = session.next_location_id();
                session.novel.locations.insert(id.clone(), element);
                session.novel.srt_locations.push(id);
            }
            WorldKind::Object => {
                let id = session.next_item_id();
                session.novel.items.insert(id.clone(), element);
                session.novel.srt_items.push(id);
            }
        }
    }

    pub fn encode(&self, element: &WorldElement) -> String {
        let mut lines = vec![
            format!("# {}", element.title),
            String::new(),
            format!("@{TAG_KEYWORD}: {}", tag(&element.title)),
        ];
        if !element.aka.is_empty() {
            lines.push(format!("%{}: {}", self.config.ywriter_aka_keyword, element.aka));
        }
        for element_tag in &element.tags {
            lines.push(format!("%{}: {element_tag}", self.config.ywriter_tag_keyword));
        }
        if !element.desc.is_empty() {
            lines.push(String::new());
            lines.push(element.desc.clone());
        }
        lines.join("\n")
    }
}
