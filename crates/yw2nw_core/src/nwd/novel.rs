//! Chapter and scene codec for NOVEL class files.
//!
//! # Responsibility
//! - Decode heading-structured text into chapters and scenes.
//! - Encode one chapter heading file or one scene file.
//!
//! # Invariants
//! - `#` opens a part, `##` a chapter, `###` a scene and `####` a scene that
//!   continues the previous one. Scene headings seen before any chapter exist
//!   open a chapter instead.
//! - Body text after a chapter heading but before the first scene heading
//!   lands in an auto-titled scene ("Scene N"), never dropped.
//! - Synopsis lines seen outside any scene describe the chapter of the file.
//! - Scene references are captured as titles; ids are resolved by the caller.

use super::lines::{tokenize, Line};
use super::{join_trimmed, tag, untag, NwdError, ReadSession};
use crate::config::ConverterConfig;
use crate::markup;
use crate::model::novel::{
    Chapter, ChapterLevel, ChapterType, ElementId, Novel, Scene, SceneStatus,
};
use crate::nwx::item::{ItemLayout, NwItem};

pub const POV_KEYWORD: &str = "pov";
pub const CHARACTER_KEYWORD: &str = "char";
pub const LOCATION_KEYWORD: &str = "location";
pub const OBJECT_KEYWORD: &str = "object";
pub const SYNOPSIS_KEYWORD: &str = "synopsis";

/// Maps a novelWriter status label to a scene status.
///
/// The five configured label sets are checked in ordinal order and the first
/// match wins. A missing or unknown label maps to `SceneStatus::Outline`.
pub fn map_status(config: &ConverterConfig, label: Option<&str>) -> SceneStatus {
    let Some(label) = label else {
        return SceneStatus::Outline;
    };
    let sets = [
        (&config.outline_status, SceneStatus::Outline),
        (&config.draft_status, SceneStatus::Draft),
        (&config.first_edit_status, SceneStatus::FirstEdit),
        (&config.second_edit_status, SceneStatus::SecondEdit),
        (&config.done_status, SceneStatus::Done),
    ];
    sets.iter()
        .find(|(labels, _)| labels.iter().any(|candidate| candidate == label))
        .map_or(SceneStatus::Outline, |(_, status)| *status)
}

/// Chapter/scene attributes implied by the item that holds the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileRole {
    chapter_type: ChapterType,
    is_notes: bool,
    is_unused: bool,
    status: SceneStatus,
}

impl FileRole {
    fn of(item: &NwItem, config: &ConverterConfig) -> Self {
        let (chapter_type, is_notes, layout_unused) = match &item.layout {
            Some(ItemLayout::Document) => (ChapterType::Normal, false, false),
            Some(ItemLayout::Note) => (ChapterType::Notes, true, false),
            _ => (ChapterType::Normal, false, true),
        };
        Self {
            chapter_type,
            is_notes,
            is_unused: layout_unused || item.active != Some(true),
            status: map_status(config, item.status.as_deref()),
        }
    }
}

#[derive(Debug, Default)]
struct SceneRefs {
    characters: Vec<String>,
    locations: Vec<String>,
    items: Vec<String>,
    tags: Vec<String>,
}

/// Title of the next scene and whether a heading announced it.
#[derive(Debug)]
struct PendingScene {
    title: String,
    append_to_prev: bool,
    explicit: bool,
}

/// Decoder state for one file.
struct Decoder<'s, 'c> {
    session: &'s mut ReadSession,
    config: &'c ConverterConfig,
    role: FileRole,
    chapter_in_file: Option<ElementId>,
    open_scene: Option<ElementId>,
    pending: Option<PendingScene>,
    refs: SceneRefs,
    synopsis: Vec<String>,
    content: Vec<String>,
}

impl Decoder<'_, '_> {
    fn auto_title(&self) -> String {
        format!("Scene {}", self.session.scene_count() + 1)
    }

    fn open_chapter(&mut self, title: &str, level: ChapterLevel) {
        let chapter = Chapter {
            title: title.to_string(),
            level,
            chapter_type: self.role.chapter_type,
            is_unused: self.role.is_unused,
            ..Chapter::default()
        };
        let id = self.session.next_chapter_id();
        self.session.novel.chapters.insert(id.clone(), chapter);
        self.session.novel.srt_chapters.push(id.clone());
        self.session.current_chapter = Some(id.clone());
        self.chapter_in_file = Some(id);
        self.pending = Some(PendingScene {
            title: self.auto_title(),
            append_to_prev: false,
            explicit: false,
        });
    }

    fn start_scene(&mut self, pending: PendingScene) -> ElementId {
        let scene = Scene {
            title: pending.title,
            status: Some(self.role.status),
            is_notes_scene: self.role.is_notes,
            is_unused: self.role.is_unused,
            append_to_prev: pending.append_to_prev,
            ..Scene::default()
        };
        let id = self.session.next_scene_id();
        self.session.novel.scenes.insert(id.clone(), scene);
        if let Some(ch_id) = self.session.current_chapter.clone() {
            if let Some(chapter) = self.session.novel.chapters.get_mut(&ch_id) {
                chapter.srt_scenes.push(id.clone());
            }
        }
        id
    }

    fn text_line(&mut self, raw: &str) {
        if self.open_scene.is_none() {
            let pending = match self.pending.take() {
                Some(pending) => pending,
                None if self.session.current_chapter.is_some() => PendingScene {
                    title: self.auto_title(),
                    append_to_prev: false,
                    explicit: false,
                },
                None => return,
            };
            if !pending.explicit {
                self.describe_chapter();
            }
            let id = self.start_scene(pending);
            self.open_scene = Some(id);
        }
        self.content.push(raw.to_string());
    }

    fn describe_chapter(&mut self) {
        if self.synopsis.is_empty() {
            return;
        }
        if let Some(ch_id) = &self.chapter_in_file {
            if let Some(chapter) = self.session.novel.chapters.get_mut(ch_id) {
                chapter.desc = self.synopsis.join("\n");
            }
        }
        self.synopsis.clear();
    }

    /// Closes the open scene, or the pending one, and resets per-scene state.
    fn finish(&mut self) {
        let scene_id = match (self.open_scene.take(), self.pending.take()) {
            (Some(id), _) => Some(id),
            (None, Some(pending)) if pending.explicit => Some(self.start_scene(pending)),
            _ => {
                self.describe_chapter();
                None
            }
        };

        if let Some(scene) = scene_id
            .as_ref()
            .and_then(|id| self.session.novel.scenes.get_mut(id))
        {
            let lines: Vec<&str> = self.content.iter().map(String::as_str).collect();
            scene.content = markup::to_yw(&join_trimmed(&lines), self.config.double_linebreaks);
            scene.desc = self.synopsis.join("\n");
            let refs = std::mem::take(&mut self.refs);
            scene.characters = refs.characters;
            scene.locations = refs.locations;
            scene.items = refs.items;
            scene.tags = refs.tags;
        }

        self.refs = SceneRefs::default();
        self.synopsis.clear();
        self.content.clear();
    }
}

/// Codec for NOVEL class content files.
pub struct NovelCodec<'c> {
    config: &'c ConverterConfig,
}

impl<'c> NovelCodec<'c> {
    pub fn new(config: &'c ConverterConfig) -> Self {
        Self { config }
    }

    /// Decodes one file into the session's novel.
    pub fn decode(&self, text: &str, item: &NwItem, session: &mut ReadSession) {
        let mut decoder = Decoder {
            session,
            config: self.config,
            role: FileRole::of(item, self.config),
            chapter_in_file: None,
            open_scene: None,
            pending: None,
            refs: SceneRefs::default(),
            synopsis: Vec::new(),
            content: Vec::new(),
        };

        for (raw, line) in tokenize(text) {
            match line {
                Line::Comment => {}
                Line::Keyword { key, value } => {
                    let refs = &mut decoder.refs;
                    match key.to_ascii_lowercase().as_str() {
                        POV_KEYWORD => refs.characters.insert(0, untag(value)),
                        CHARACTER_KEYWORD => refs.characters.push(untag(value)),
                        LOCATION_KEYWORD => refs.locations.push(untag(value)),
                        OBJECT_KEYWORD => refs.items.push(untag(value)),
                        _ => {}
                    }
                }
                Line::Command { value, .. } if line.is_command(&self.config.ywriter_tag_keyword) => {
                    decoder.refs.tags.push(value.to_string());
                }
                Line::Command { value, .. } if line.is_command(SYNOPSIS_KEYWORD) => {
                    decoder.synopsis.push(value.to_string());
                }
                Line::Command { .. } | Line::Note(_) => {}
                Line::Heading { level, title }
                    if level >= 3 && decoder.session.current_chapter.is_some() =>
                {
                    decoder.finish();
                    decoder.pending = Some(PendingScene {
                        title: title.to_string(),
                        append_to_prev: level >= 4,
                        explicit: true,
                    });
                }
                Line::Heading { level, title } => {
                    decoder.finish();
                    let level = if level == 1 {
                        ChapterLevel::Part
                    } else {
                        ChapterLevel::Chapter
                    };
                    decoder.open_chapter(title, level);
                }
                Line::Blank => {
                    if decoder.open_scene.is_some() {
                        decoder.content.push(raw.to_string());
                    }
                }
                Line::Text(_) => decoder.text_line(raw),
            }
        }
        decoder.finish();
    }

    /// Encodes the heading file of a chapter or part.
    pub fn encode_chapter(&self, chapter: &Chapter) -> String {
        let marker = match chapter.level {
            ChapterLevel::Part => "#",
            ChapterLevel::Chapter => "##",
        };
        let mut lines = vec![format!("{marker} {}", chapter.title), String::new()];
        if !chapter.desc.is_empty() {
            lines.extend(synopsis_lines(&chapter.desc));
            lines.push(String::new());
        }
        lines.join("\n")
    }

    /// Encodes one scene file; references are written as tagged titles.
    pub fn encode_scene(
        &self,
        scene_id: &str,
        scene: &Scene,
        novel: &Novel,
    ) -> Result<String, NwdError> {
        let marker = if scene.append_to_prev { "####" } else { "###" };
        let mut lines = vec![format!("{marker} {}", scene.title), String::new()];

        for (index, cr_id) in scene.characters.iter().enumerate() {
            let character = novel.characters.get(cr_id).ok_or_else(|| {
                unknown_reference(scene_id, "character", cr_id)
            })?;
            let keyword = if index == 0 {
                POV_KEYWORD
            } else {
                CHARACTER_KEYWORD
            };
            lines.push(format!("@{keyword}: {}", tag(&character.title)));
        }
        for lc_id in &scene.locations {
            let location = novel
                .locations
                .get(lc_id)
                .ok_or_else(|| unknown_reference(scene_id, "location", lc_id))?;
            lines.push(format!("@{LOCATION_KEYWORD}: {}", tag(&location.title)));
        }
        for it_id in &scene.items {
            let item = novel
                .items
                .get(it_id)
                .ok_or_else(|| unknown_reference(scene_id, "item", it_id))?;
            lines.push(format!("@{OBJECT_KEYWORD}: {}", tag(&item.title)));
        }
        for scene_tag in &scene.tags {
            lines.push(format!("%{}: {scene_tag}", self.config.ywriter_tag_keyword));
        }
        if !scene.desc.is_empty() {
            lines.push(String::new());
            lines.extend(synopsis_lines(&scene.desc));
        }
        lines.push(String::new());

        let body = markup::to_markdown(&scene.content, self.config.double_linebreaks);
        if !body.is_empty() {
            lines.push(body);
        }
        Ok(lines.join("\n"))
    }
}

fn synopsis_lines(desc: &str) -> impl Iterator<Item = String> + '_ {
    desc.lines()
        .map(|line| format!("% {SYNOPSIS_KEYWORD}: {line}"))
}

fn unknown_reference(scene_id: &str, kind: &'static str, id: &str) -> NwdError {
    NwdError::UnknownReference {
        scene: scene_id.to_string(),
        kind,
        id: id.to_string(),
    }
}
