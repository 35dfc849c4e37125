//! Novel entities.
//!
//! # Responsibility
//! - Define chapter, scene, character and world element records.
//! - Mint sequential string ids for new entities.
//!
//! # Invariants
//! - Ids are decimal strings starting at `1`, unique per collection.
//! - The first id in `Scene::characters` is the point-of-view character.

use std::collections::{HashMap, HashSet};

/// Identifier of any novel entity. yWriter stores them as decimal numbers.
pub type ElementId = String;

/// Nesting level of a chapter heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChapterLevel {
    /// Section start that groups the following chapters.
    Part,
    /// Regular chapter.
    #[default]
    Chapter,
}

/// Chapter kind as far as both formats can express it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChapterType {
    #[default]
    Normal,
    Notes,
    Todo,
}

/// Scene completion status, ordinal `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SceneStatus {
    Outline = 1,
    Draft = 2,
    FirstEdit = 3,
    SecondEdit = 4,
    Done = 5,
}

impl SceneStatus {
    /// All statuses in ordinal order.
    pub const ALL: [SceneStatus; 5] = [
        SceneStatus::Outline,
        SceneStatus::Draft,
        SceneStatus::FirstEdit,
        SceneStatus::SecondEdit,
        SceneStatus::Done,
    ];

    /// Returns the status for an ordinal, `None` when out of range.
    pub fn from_ordinal(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Outline),
            2 => Some(Self::Draft),
            3 => Some(Self::FirstEdit),
            4 => Some(Self::SecondEdit),
            5 => Some(Self::Done),
            _ => None,
        }
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Chapter {
    pub title: String,
    pub desc: String,
    pub level: ChapterLevel,
    pub chapter_type: ChapterType,
    pub is_unused: bool,
    /// Scene ids in reading order.
    pub srt_scenes: Vec<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scene {
    pub title: String,
    /// Synopsis.
    pub desc: String,
    /// Body text in yWriter inline markup.
    pub content: String,
    pub status: Option<SceneStatus>,
    pub is_notes_scene: bool,
    pub is_todo_scene: bool,
    pub is_unused: bool,
    /// Rendered as a continuation of the previous scene.
    pub append_to_prev: bool,
    /// Character references. During a novelWriter read these hold titles until
    /// the reference repair pass replaces them with ids.
    pub characters: Vec<String>,
    pub locations: Vec<String>,
    pub items: Vec<String>,
    pub tags: Vec<String>,
    pub word_count: Option<u32>,
    pub letter_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Character {
    /// Short name used for scene references.
    pub title: String,
    pub full_name: String,
    pub aka: String,
    pub desc: String,
    pub bio: String,
    pub goals: String,
    pub notes: String,
    pub tags: Vec<String>,
    pub is_major: bool,
}

/// Location or item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorldElement {
    pub title: String,
    pub aka: String,
    pub desc: String,
    pub tags: Vec<String>,
}

/// Complete novel project.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Novel {
    pub title: String,
    pub author_name: String,
    pub desc: String,
    pub chapters: HashMap<ElementId, Chapter>,
    pub scenes: HashMap<ElementId, Scene>,
    pub characters: HashMap<ElementId, Character>,
    pub locations: HashMap<ElementId, WorldElement>,
    pub items: HashMap<ElementId, WorldElement>,
    pub srt_chapters: Vec<ElementId>,
    pub srt_characters: Vec<ElementId>,
    pub srt_locations: Vec<ElementId>,
    pub srt_items: Vec<ElementId>,
}

impl Novel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chapter under a fresh id and returns the id.
    pub fn push_chapter(&mut self, chapter: Chapter) -> ElementId {
        let id = next_id(&self.chapters);
        self.chapters.insert(id.clone(), chapter);
        self.srt_chapters.push(id.clone());
        id
    }

    /// Appends a scene to `chapter_id` under a fresh id.
    ///
    /// The scene is stored even when the chapter is unknown, so that yWriter
    /// orphan scenes survive a round trip.
    pub fn push_scene(&mut self, chapter_id: &str, scene: Scene) -> ElementId {
        let id = next_id(&self.scenes);
        self.scenes.insert(id.clone(), scene);
        if let Some(chapter) = self.chapters.get_mut(chapter_id) {
            chapter.srt_scenes.push(id.clone());
        }
        id
    }

    pub fn push_character(&mut self, character: Character) -> ElementId {
        let id = next_id(&self.characters);
        self.characters.insert(id.clone(), character);
        self.srt_characters.push(id.clone());
        id
    }

    pub fn push_location(&mut self, location: WorldElement) -> ElementId {
        let id = next_id(&self.locations);
        self.locations.insert(id.clone(), location);
        self.srt_locations.push(id.clone());
        id
    }

    pub fn push_item(&mut self, item: WorldElement) -> ElementId {
        let id = next_id(&self.items);
        self.items.insert(id.clone(), item);
        self.srt_items.push(id.clone());
        id
    }

    /// Scene ids in novel order, followed by scenes no chapter refers to.
    /// A scene listed more than once appears at its first position only.
    pub fn scene_ids_in_order(&self) -> Vec<ElementId> {
        let mut seen = HashSet::new();
        let mut ordered: Vec<ElementId> = self
            .srt_chapters
            .iter()
            .filter_map(|ch_id| self.chapters.get(ch_id))
            .flat_map(|chapter| chapter.srt_scenes.iter().cloned())
            .filter(|sc_id| self.scenes.contains_key(sc_id) && seen.insert(sc_id.clone()))
            .collect();
        let mut orphans: Vec<ElementId> = self
            .scenes
            .keys()
            .filter(|sc_id| !seen.contains(*sc_id))
            .cloned()
            .collect();
        orphans.sort_by_key(|id| numeric_key(id));
        ordered.extend(orphans);
        ordered
    }
}

/// Returns the smallest unused decimal id above every existing numeric id.
pub fn next_id<T>(collection: &HashMap<ElementId, T>) -> ElementId {
    let highest = collection
        .keys()
        .filter_map(|id| id.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    (highest + 1).to_string()
}

fn numeric_key(id: &str) -> (u64, String) {
    (id.parse::<u64>().unwrap_or(u64::MAX), id.to_string())
}

#[cfg(test)]
mod tests {
    use super::{next_id, Chapter, Novel, Scene, SceneStatus};
    use std::collections::HashMap;

    #[test]
    fn next_id_starts_at_one_and_skips_gaps() {
        let mut ids: HashMap<String, ()> = HashMap::new();
        assert_eq!(next_id(&ids), "1");
        ids.insert("7".to_string(), ());
        ids.insert("3".to_string(), ());
        assert_eq!(next_id(&ids), "8");
    }

    #[test]
    fn scene_order_follows_chapters_then_orphans() {
        let mut novel = Novel::new();
        let ch = novel.push_chapter(Chapter::default());
        let orphan = novel.push_scene("missing", Scene::default());
        let first = novel.push_scene(&ch, Scene::default());
        assert_eq!(novel.scene_ids_in_order(), vec![first, orphan]);
    }

    #[test]
    fn scene_listed_twice_is_ordered_once() {
        let mut novel = Novel::new();
        let one = novel.push_chapter(Chapter::default());
        let two = novel.push_chapter(Chapter::default());
        let shared = novel.push_scene(&one, Scene::default());
        let own = novel.push_scene(&two, Scene::default());
        if let Some(chapter) = novel.chapters.get_mut(&two) {
            chapter.srt_scenes.push(shared.clone());
        }
        assert_eq!(novel.scene_ids_in_order(), vec![shared, own]);
    }

    #[test]
    fn status_ordinals_round_trip() {
        for status in SceneStatus::ALL {
            assert_eq!(SceneStatus::from_ordinal(status.ordinal()), Some(status));
        }
        assert_eq!(SceneStatus::from_ordinal(0), None);
        assert_eq!(SceneStatus::from_ordinal(6), None);
    }
}
