//! Character sheet codec for CHARACTER class files.
//!
//! # Responsibility
//! - Decode one character sheet into a `Character` and encode it back.
//!
//! # Invariants
//! - Text before the first configured section heading is the description.
//! - Any other heading switches back to the description.
//! - Blank lines inside a section are kept; those around it are dropped.
//! - `is_major` follows the item's importance, or its status before 1.5.

use super::lines::{tokenize, Line};
use super::{join_paragraphs, tag, untag, ReadSession};
use crate::config::ConverterConfig;
use crate::model::novel::Character;
use crate::nwx::item::NwItem;

/// Keyword of the line that carries the short reference title.
pub const TAG_KEYWORD: &str = "tag";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Desc = 0,
    Bio = 1,
    Goals = 2,
    Notes = 3,
}

pub struct CharacterCodec<'c> {
    config: &'c ConverterConfig,
}

impl<'c> CharacterCodec<'c> {
    pub fn new(config: &'c ConverterConfig) -> Self {
        Self { config }
    }

    fn section_of(&self, raw: &str) -> Section {
        let config = self.config;
        if raw.starts_with(&config.character_bio_heading) {
            Section::Bio
        } else if raw.starts_with(&config.character_goals_heading) {
            Section::Goals
        } else if raw.starts_with(&config.character_notes_heading) {
            Section::Notes
        } else {
            Section::Desc
        }
    }

    /// Decodes one sheet and appends the character to the session's roster.
    pub fn decode(&self, text: &str, item: &NwItem, session: &mut ReadSession) {
        let mut character = Character {
            title: item.name.clone(),
            full_name: item.name.clone(),
            ..Character::default()
        };
        let mut sections: [Vec<&str>; 4] = Default::default();
        let mut section = Section::Desc;

        for (raw, line) in tokenize(text) {
            match line {
                Line::Comment | Line::Note(_) => {}
                Line::Blank => sections[section as usize].push(raw),
                Line::Heading { .. } => {
                    let lines = &mut sections[section as usize];
                    while lines.last().is_some_and(|last| last.trim().is_empty()) {
                        lines.pop();
                    }
                    section = self.section_of(raw);
                }
                Line::Keyword { key, value } => {
                    if key.eq_ignore_ascii_case(TAG_KEYWORD) {
                        character.title = untag(value);
                    }
                }
                Line::Command { value, .. } => {
                    if line.is_command(&self.config.ywriter_aka_keyword) {
                        character.aka = value.to_string();
                    } else if line.is_command(&self.config.ywriter_tag_keyword) {
                        character.tags.push(value.to_string());
                    }
                }
                Line::Text(_) => sections[section as usize].push(raw),
            }
        }

        let [desc, bio, goals, notes] = sections.map(|lines| join_paragraphs(&lines));
        character.desc = desc;
        character.bio = bio;
        character.goals = goals;
        character.notes = notes;
        let rank = item.importance.as_deref().or(item.status.as_deref());
        character.is_major = rank.is_some_and(|label| {
            self.config
                .major_character_status
                .iter()
                .any(|major| major == label)
        });

        let id = session.next_character_id();
        session.novel.characters.insert(id.clone(), character);
        session.novel.srt_characters.push(id);
    }

    pub fn encode(&self, character: &Character) -> String {
        let config = self.config;
        let heading = if character.full_name.is_empty() {
            &character.title
        } else {
            &character.full_name
        };
        let mut lines = vec![
            format!("# {heading}"),
            String::new(),
            format!("@{TAG_KEYWORD}: {}", tag(&character.title)),
        ];
        if !character.aka.is_empty() {
            lines.push(format!("%{}: {}", config.ywriter_aka_keyword, character.aka));
        }
        for character_tag in &character.tags {
            lines.push(format!("%{}: {character_tag}", config.ywriter_tag_keyword));
        }
        let sections = [
            (None, &character.desc),
            (Some(&config.character_bio_heading), &character.bio),
            (Some(&config.character_goals_heading), &character.goals),
            (Some(&config.character_notes_heading), &character.notes),
        ];
        for (section_heading, body) in sections {
            if body.is_empty() {
                continue;
            }
            lines.push(String::new());
            if let Some(section_heading) = section_heading {
                lines.push(section_heading.clone());
            }
            lines.push(body.clone());
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::CharacterCodec;
    use crate::config::ConverterConfig;
    use crate::nwd::ReadSession;
    use crate::nwx::item::NwItem;

    #[test]
    fn headings_switch_sections() {
        let config = ConverterConfig::default();
        let mut item = NwItem::new("0000000000001", "None", 0);
        item.name = "Jane Doe".to_string();
        item.importance = Some("Major".to_string());
        let text = "%%~name: Jane Doe\n# Jane Doe\n\n@tag: Jane\nTall.\n\n## Bio\nBorn.\n### Aside\nAlso tall.\n## Notes\nNone.";

        let mut session = ReadSession::new();
        CharacterCodec::new(&config).decode(text, &item, &mut session);

        let character = &session.novel.characters["1"];
        assert_eq!(character.title, "Jane");
        assert_eq!(character.full_name, "Jane Doe");
        assert_eq!(character.desc, "Tall.\nAlso tall.");
        assert_eq!(character.bio, "Born.");
        assert_eq!(character.notes, "None.");
        assert!(character.is_major);
    }
}
