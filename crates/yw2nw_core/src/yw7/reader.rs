use super::{split_tags, Yw7Error, SCENE_TYPE_NOTES, SCENE_TYPE_TODO, YW7_TAG};
use crate::model::novel::{
    Chapter, ChapterLevel, ChapterType, Character, Novel, Scene, SceneStatus, WorldElement,
};
use crate::xml::{child, child_text, children};
use log::{error, info};
use roxmltree::Node;
use std::path::Path;
use std::time::Instant;

/// Reads a yWriter 7 project.
///
/// # Side effects
/// - Emits `yw7_read` logging events with duration and status.
pub fn read_yw7(path: &Path) -> Result<Novel, Yw7Error> {
    let started_at = Instant::now();
    info!("event=yw7_read module=yw7 status=start path={}", path.display());
    match read_file(path) {
        Ok(novel) => {
            info!(
                "event=yw7_read module=yw7 status=ok duration_ms={} chapters={} scenes={}",
                started_at.elapsed().as_millis(),
                novel.chapters.len(),
                novel.scenes.len()
            );
            Ok(novel)
        }
        Err(err) => {
            error!(
                "event=yw7_read module=yw7 status=error duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                err.code(),
                err
            );
            Err(err)
        }
    }
}

fn read_file(path: &Path) -> Result<Novel, Yw7Error> {
    let text = std::fs::read_to_string(path).map_err(|source| Yw7Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let malformed = |reason: String| Yw7Error::Malformed {
        path: path.to_path_buf(),
        reason,
    };
    let document = roxmltree::Document::parse(&text).map_err(|err| malformed(err.to_string()))?;
    let root = document.root_element();
    if !root.has_tag_name(YW7_TAG) {
        return Err(malformed(format!(
            "root element is `{}`",
            root.tag_name().name()
        )));
    }

    let mut novel = Novel::new();
    if let Some(project) = child(root, "PROJECT") {
        novel.title = text_of(project, "Title");
        novel.author_name = text_of(project, "AuthorName");
        novel.desc = text_of(project, "Desc");
    }

    for node in section(root, "LOCATIONS", "LOCATION") {
        let id = element_id(node).ok_or_else(|| malformed("location without ID".to_string()))?;
        novel.locations.insert(id.clone(), world_element(node));
        novel.srt_locations.push(id);
    }
    for node in section(root, "ITEMS", "ITEM") {
        let id = element_id(node).ok_or_else(|| malformed("item without ID".to_string()))?;
        novel.items.insert(id.clone(), world_element(node));
        novel.srt_items.push(id);
    }
    for node in section(root, "CHARACTERS", "CHARACTER") {
        let id = element_id(node).ok_or_else(|| malformed("character without ID".to_string()))?;
        novel.characters.insert(id.clone(), character(node));
        novel.srt_characters.push(id);
    }
    for node in section(root, "SCENES", "SCENE") {
        let id = element_id(node).ok_or_else(|| malformed("scene without ID".to_string()))?;
        novel.scenes.insert(id, scene(node));
    }
    for node in section(root, "CHAPTERS", "CHAPTER") {
        let id = element_id(node).ok_or_else(|| malformed("chapter without ID".to_string()))?;
        novel.chapters.insert(id.clone(), chapter(node));
        novel.srt_chapters.push(id);
    }
    Ok(novel)
}

fn section<'a, 'input: 'a>(
    root: Node<'a, 'input>,
    list_tag: &'a str,
    entry_tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    child(root, list_tag)
        .into_iter()
        .flat_map(move |list| children(list, entry_tag))
}

fn text_of(node: Node<'_, '_>, tag: &str) -> String {
    child_text(node, tag).unwrap_or_default()
}

fn element_id(node: Node<'_, '_>) -> Option<String> {
    child_text(node, "ID")
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}

fn flag(node: Node<'_, '_>, tag: &str) -> bool {
    child_text(node, tag).is_some_and(|value| value.trim() != "0")
}

fn count(node: Node<'_, '_>, tag: &str) -> Option<u32> {
    child_text(node, tag).and_then(|value| value.trim().parse().ok())
}

fn id_list(node: Node<'_, '_>, list_tag: &str, entry_tag: &str) -> Vec<String> {
    child(node, list_tag)
        .map(|list| {
            children(list, entry_tag)
                .filter_map(|entry| entry.text())
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn world_element(node: Node<'_, '_>) -> WorldElement {
    WorldElement {
        title: text_of(node, "Title"),
        aka: text_of(node, "AKA"),
        desc: text_of(node, "Desc"),
        tags: split_tags(&text_of(node, "Tags")),
    }
}

fn character(node: Node<'_, '_>) -> Character {
    Character {
        title: text_of(node, "Title"),
        full_name: text_of(node, "FullName"),
        aka: text_of(node, "AKA"),
        desc: text_of(node, "Desc"),
        bio: text_of(node, "Bio"),
        goals: text_of(node, "Goals"),
        notes: text_of(node, "Notes"),
        tags: split_tags(&text_of(node, "Tags")),
        is_major: flag(node, "Major"),
    }
}

fn scene(node: Node<'_, '_>) -> Scene {
    let scene_type = child(node, "Fields").and_then(|fields| child_text(fields, "Field_SceneType"));
    let scene_type = scene_type.as_deref().map(str::trim);
    Scene {
        title: text_of(node, "Title"),
        desc: text_of(node, "Desc"),
        content: text_of(node, "SceneContent"),
        status: count(node, "Status")
            .and_then(|value| u8::try_from(value).ok())
            .and_then(SceneStatus::from_ordinal),
        is_notes_scene: scene_type == Some(SCENE_TYPE_NOTES),
        is_todo_scene: scene_type == Some(SCENE_TYPE_TODO),
        is_unused: flag(node, "Unused"),
        append_to_prev: flag(node, "AppendToPrev"),
        characters: id_list(node, "Characters", "CharID"),
        locations: id_list(node, "Locations", "LocID"),
        items: id_list(node, "Items", "ItemID"),
        tags: split_tags(&text_of(node, "Tags")),
        word_count: count(node, "WordCount"),
        letter_count: count(node, "LetterCount"),
    }
}

fn chapter(node: Node<'_, '_>) -> Chapter {
    let chapter_type = count(node, "ChapterType").or_else(|| count(node, "Type"));
    Chapter {
        title: text_of(node, "Title"),
        desc: text_of(node, "Desc"),
        level: if flag(node, "SectionStart") {
            ChapterLevel::Part
        } else {
            ChapterLevel::Chapter
        },
        chapter_type: match chapter_type {
            Some(1) => ChapterType::Notes,
            Some(2) => ChapterType::Todo,
            _ => ChapterType::Normal,
        },
        is_unused: flag(node, "Unused"),
        srt_scenes: id_list(node, "Scenes", "ScID"),
    }
}
