use super::{Yw7Error, SCENE_TYPE_NOTES, SCENE_TYPE_TODO, TAG_SEPARATOR, YW7_TAG};
use crate::model::novel::{Chapter, ChapterLevel, ChapterType, Character, Novel, Scene, WorldElement};
use crate::xml::XmlElement;
use log::{error, info};
use std::io::Write;
use std::path::Path;
use std::time::Instant;

const SET: &str = "-1";

/// Writes `novel` to `path` as a yWriter 7 project.
///
/// # Side effects
/// - Writes through a temporary file next to `path`, then renames it.
/// - Emits `yw7_write` logging events with duration and status.
pub fn write_yw7(novel: &Novel, path: &Path) -> Result<(), Yw7Error> {
    let started_at = Instant::now();
    info!("event=yw7_write module=yw7 status=start path={}", path.display());
    match write_file(novel, path) {
        Ok(()) => {
            info!(
                "event=yw7_write module=yw7 status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=yw7_write module=yw7 status=error duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                err.code(),
                err
            );
            Err(err)
        }
    }
}

fn write_file(novel: &Novel, path: &Path) -> Result<(), Yw7Error> {
    let text = to_document(novel);
    let write_error = |source: std::io::Error| Yw7Error::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(write_error)?;
    file.write_all(text.as_bytes()).map_err(write_error)?;
    file.flush().map_err(write_error)?;
    file.persist(path).map_err(|err| write_error(err.error))?;
    Ok(())
}

/// Serializes the whole project.
pub(crate) fn to_document(novel: &Novel) -> String {
    let mut root = XmlElement::new(YW7_TAG);

    let project = root.push(XmlElement::new("PROJECT"));
    project.push_text("Ver", "7");
    project.push_text("Title", novel.title.as_str());
    push_optional(project, "AuthorName", &novel.author_name);
    push_optional(project, "Desc", &novel.desc);

    let locations = root.push(XmlElement::new("LOCATIONS"));
    for id in &novel.srt_locations {
        if let Some(location) = novel.locations.get(id) {
            locations.push(world_element("LOCATION", id, location));
        }
    }
    let items = root.push(XmlElement::new("ITEMS"));
    for id in &novel.srt_items {
        if let Some(item) = novel.items.get(id) {
            items.push(world_element("ITEM", id, item));
        }
    }
    let characters = root.push(XmlElement::new("CHARACTERS"));
    for id in &novel.srt_characters {
        if let Some(character) = novel.characters.get(id) {
            characters.push(character_element(id, character));
        }
    }
    let scenes = root.push(XmlElement::new("SCENES"));
    for id in novel.scene_ids_in_order() {
        if let Some(scene) = novel.scenes.get(&id) {
            scenes.push(scene_element(&id, scene));
        }
    }
    let chapters = root.push(XmlElement::new("CHAPTERS"));
    for id in &novel.srt_chapters {
        if let Some(chapter) = novel.chapters.get(id) {
            chapters.push(chapter_element(id, chapter));
        }
    }
    root.to_document()
}

fn push_optional(parent: &mut XmlElement, tag: &str, value: &str) {
    if !value.is_empty() {
        parent.push_text(tag, value);
    }
}

fn push_flag(parent: &mut XmlElement, tag: &str, value: bool) {
    if value {
        parent.push_text(tag, SET);
    }
}

fn push_tags(parent: &mut XmlElement, tags: &[String]) {
    if !tags.is_empty() {
        parent.push_text("Tags", tags.join(TAG_SEPARATOR));
    }
}

fn push_ids(parent: &mut XmlElement, list_tag: &str, entry_tag: &str, ids: &[String]) {
    if ids.is_empty() {
        return;
    }
    let list = parent.push(XmlElement::new(list_tag));
    for id in ids {
        list.push_text(entry_tag, id.as_str());
    }
}

fn world_element(tag: &str, id: &str, element: &WorldElement) -> XmlElement {
    let mut node = XmlElement::new(tag);
    node.push_text("ID", id);
    node.push_text("Title", element.title.as_str());
    push_optional(&mut node, "Desc", &element.desc);
    push_optional(&mut node, "AKA", &element.aka);
    push_tags(&mut node, &element.tags);
    node
}

fn character_element(id: &str, character: &Character) -> XmlElement {
    let mut node = XmlElement::new("CHARACTER");
    node.push_text("ID", id);
    node.push_text("Title", character.title.as_str());
    push_optional(&mut node, "Desc", &character.desc);
    push_optional(&mut node, "AKA", &character.aka);
    push_tags(&mut node, &character.tags);
    push_optional(&mut node, "Notes", &character.notes);
    push_optional(&mut node, "Bio", &character.bio);
    push_optional(&mut node, "Goals", &character.goals);
    push_optional(&mut node, "FullName", &character.full_name);
    push_flag(&mut node, "Major", character.is_major);
    node
}

fn scene_element(id: &str, scene: &Scene) -> XmlElement {
    let mut node = XmlElement::new("SCENE");
    node.push_text("ID", id);
    node.push_text("Title", scene.title.as_str());
    push_optional(&mut node, "Desc", &scene.desc);
    push_flag(&mut node, "Unused", scene.is_unused);

    let scene_type = if scene.is_notes_scene {
        Some(SCENE_TYPE_NOTES)
    } else if scene.is_todo_scene {
        Some(SCENE_TYPE_TODO)
    } else {
        None
    };
    if let Some(scene_type) = scene_type {
        node.push(XmlElement::new("Fields")).push_text("Field_SceneType", scene_type);
    }
    if let Some(status) = scene.status {
        node.push_text("Status", status.ordinal().to_string());
    }
    if let Some(words) = scene.word_count {
        node.push_text("WordCount", words.to_string());
    }
    if let Some(letters) = scene.letter_count {
        node.push_text("LetterCount", letters.to_string());
    }
    push_flag(&mut node, "AppendToPrev", scene.append_to_prev);
    push_tags(&mut node, &scene.tags);
    node.push_text("SceneContent", scene.content.as_str());
    push_ids(&mut node, "Characters", "CharID", &scene.characters);
    push_ids(&mut node, "Locations", "LocID", &scene.locations);
    push_ids(&mut node, "Items", "ItemID", &scene.items);
    node
}

fn chapter_element(id: &str, chapter: &Chapter) -> XmlElement {
    let mut node = XmlElement::new("CHAPTER");
    node.push_text("ID", id);
    node.push_text("Title", chapter.title.as_str());
    push_optional(&mut node, "Desc", &chapter.desc);
    push_flag(&mut node, "SectionStart", chapter.level == ChapterLevel::Part);
    let (kind, chapter_type) = match chapter.chapter_type {
        ChapterType::Normal => ("0", "0"),
        ChapterType::Notes => ("1", "1"),
        ChapterType::Todo => ("1", "2"),
    };
    node.push_text("Type", kind);
    node.push_text("ChapterType", chapter_type);
    push_flag(&mut node, "Unused", chapter.is_unused);
    push_ids(&mut node, "Scenes", "ScID", &chapter.srt_scenes);
    node
}
