//! Novel to project tree mapping for the write direction.
//!
//! # Responsibility
//! - Build an outline of items (with content bodies) from a `Novel`.
//! - Emit the outline depth-first as `<item>` elements and `.nwd` files.
//!
//! # Invariants
//! - Top-level order: novel, characters, locations, objects.
//! - `order` is the position of an item among its siblings.
//! - Handles are seeded from element ids and titles, so the same novel always
//!   yields the same handles.

use super::item::{
    FileVersion, ItemClass, ItemLayout, ItemType, NwItem, StatusLookup, ROOT_PARENT,
};
use super::{NwxError, NWX_TAG, PROJECT_FILE};
use crate::config::ConverterConfig;
use crate::handles::Handles;
use crate::model::novel::{Chapter, ChapterLevel, ChapterType, Novel, Scene};
use crate::nwd::character::CharacterCodec;
use crate::nwd::novel::NovelCodec;
use crate::nwd::world::{WorldCodec, WorldKind};
use crate::nwd::{write_content, CONTENT_DIR};
use crate::xml::XmlElement;
use log::warn;
use std::path::{Path, PathBuf};

/// RGB values of the scene status entries, by ordinal.
const STATUS_COLOURS: [(u8, u8, u8); 6] = [
    (230, 230, 230),
    (0, 0, 0),
    (170, 40, 0),
    (240, 140, 0),
    (250, 190, 90),
    (58, 180, 58),
];

/// Character importance labels and their RGB values.
const IMPORTANCE: [(&str, (u8, u8, u8)); 3] = [
    ("None", (220, 220, 220)),
    ("Minor", (0, 122, 188)),
    ("Major", (21, 0, 180)),
];

const MAJOR: &str = "Major";
const MINOR: &str = "Minor";
const DEFAULT_PROJECT_TITLE: &str = "New project";

/// One item to emit, with the text of its content file for FILE items.
#[derive(Debug)]
struct OutlineNode {
    item: NwItem,
    body: Option<String>,
    children: Vec<OutlineNode>,
}

impl OutlineNode {
    fn container(handle: String, name: &str, item_type: ItemType, class: ItemClass) -> Self {
        let mut item = NwItem::new(handle, ROOT_PARENT, 0);
        item.name = name.to_string();
        item.item_type = Some(item_type);
        item.class = Some(class);
        item.expanded = Some(true);
        Self {
            item,
            body: None,
            children: Vec::new(),
        }
    }

    fn file(handle: String, name: &str, class: ItemClass, body: String) -> Self {
        let mut item = NwItem::new(handle, ROOT_PARENT, 0);
        item.name = name.to_string();
        item.item_type = Some(ItemType::File);
        item.class = Some(class);
        item.active = Some(true);
        item.layout = Some(ItemLayout::Note);
        Self {
            item,
            body: Some(body),
            children: Vec::new(),
        }
    }
}

struct OutlineBuilder<'a> {
    novel: &'a Novel,
    config: &'a ConverterConfig,
    handles: Handles,
}

impl OutlineBuilder<'_> {
    fn build(mut self) -> Result<Vec<OutlineNode>, NwxError> {
        Ok(vec![
            self.novel_root()?,
            self.character_root()?,
            self.world_root(WorldKind::Location)?,
            self.world_root(WorldKind::Object)?,
        ])
    }

    fn novel_root(&mut self) -> Result<OutlineNode, NwxError> {
        let novel = self.novel;
        let mut root = OutlineNode::container(
            self.handles.create("novelFolderHandle")?,
            "Novel",
            ItemType::Root,
            ItemClass::Novel,
        );
        let mut current_part: Option<usize> = None;

        for ch_id in &novel.srt_chapters {
            let Some(chapter) = novel.chapters.get(ch_id) else {
                warn!("event=nwx_outline module=nwx status=skip chapter={ch_id}");
                continue;
            };
            let seed = format!("{ch_id}{}", chapter.title);
            let mut folder = OutlineNode::container(
                self.handles.create(&format!("{seed}Folder"))?,
                &chapter.title,
                ItemType::Folder,
                ItemClass::Novel,
            );
            folder.children.push(self.heading_file(&seed, chapter)?);

            let mut number = 0;
            for sc_id in &chapter.srt_scenes {
                let Some(scene) = novel.scenes.get(sc_id) else {
                    warn!("event=nwx_outline module=nwx status=skip chapter={ch_id} scene={sc_id}");
                    continue;
                };
                number += 1;
                folder.children.push(self.scene_file(sc_id, scene, number)?);
            }

            match (chapter.level, current_part) {
                (ChapterLevel::Part, _) => {
                    root.children.push(folder);
                    current_part = Some(root.children.len() - 1);
                }
                (ChapterLevel::Chapter, Some(part)) => root.children[part].children.push(folder),
                (ChapterLevel::Chapter, None) => root.children.push(folder),
            }
        }
        Ok(root)
    }

    fn heading_file(&mut self, seed: &str, chapter: &Chapter) -> Result<OutlineNode, NwxError> {
        let body = NovelCodec::new(self.config).encode_chapter(chapter);
        let mut node =
            OutlineNode::file(self.handles.create(seed)?, &chapter.title, ItemClass::Novel, body);
        node.item.layout = Some(match chapter.chapter_type {
            ChapterType::Normal => ItemLayout::Document,
            ChapterType::Notes | ChapterType::Todo => ItemLayout::Note,
        });
        node.item.active = Some(!chapter.is_unused);
        node.item.status = self.config.scene_status_label(0).map(str::to_string);
        Ok(node)
    }

    fn scene_file(
        &mut self,
        sc_id: &str,
        scene: &Scene,
        number: usize,
    ) -> Result<OutlineNode, NwxError> {
        let body = NovelCodec::new(self.config).encode_scene(sc_id, scene, self.novel)?;
        let name = if scene.title.is_empty() {
            format!("Scene {number}")
        } else {
            scene.title.clone()
        };
        let handle = self.handles.create(&format!("{sc_id}{}", scene.title))?;
        let mut node = OutlineNode::file(handle, &name, ItemClass::Novel, body);
        let item = &mut node.item;
        item.status = scene
            .status
            .and_then(|status| self.config.scene_status_label(status.ordinal()))
            .map(str::to_string);
        item.active = Some(!scene.is_unused);
        item.layout = Some(if scene.is_notes_scene || scene.is_todo_scene {
            ItemLayout::Note
        } else {
            ItemLayout::Document
        });
        item.word_count = scene.word_count.filter(|count| *count > 0);
        item.char_count = scene.letter_count.filter(|count| *count > 0);
        Ok(node)
    }

    fn character_root(&mut self) -> Result<OutlineNode, NwxError> {
        let novel = self.novel;
        let codec = CharacterCodec::new(self.config);
        let mut root = OutlineNode::container(
            self.handles.create("characterFolderHandle")?,
            "Characters",
            ItemType::Root,
            ItemClass::Character,
        );
        for cr_id in &novel.srt_characters {
            let Some(character) = novel.characters.get(cr_id) else {
                continue;
            };
            let name = if !character.full_name.is_empty() {
                character.full_name.clone()
            } else if !character.title.is_empty() {
                character.title.clone()
            } else {
                format!("Character {}", root.children.len() + 1)
            };
            let handle = self.handles.create(&format!("{cr_id}{}", character.title))?;
            let mut node =
                OutlineNode::file(handle, &name, ItemClass::Character, codec.encode(character));
            let rank = if character.is_major { MAJOR } else { MINOR };
            match self.config.file_version {
                FileVersion::V1_5 => node.item.importance = Some(rank.to_string()),
                FileVersion::V1_3 | FileVersion::V1_4 => node.item.status = Some(rank.to_string()),
            }
            root.children.push(node);
        }
        Ok(root)
    }

    fn world_root(&mut self, kind: WorldKind) -> Result<OutlineNode, NwxError> {
        let novel = self.novel;
        let (seed, name, class, order, elements, fallback) = match kind {
            WorldKind::Location => (
                "worldFolderHandle",
                "Locations",
                ItemClass::World,
                &novel.srt_locations,
                &novel.locations,
                "Place",
            ),
            WorldKind::Object => (
                "objectFolderHandle",
                "Items",
                ItemClass::Object,
                &novel.srt_items,
                &novel.items,
                "Object",
            ),
        };
        let codec = WorldCodec::new(self.config, kind);
        let mut root =
            OutlineNode::container(self.handles.create(seed)?, name, ItemType::Root, class.clone());
        for id in order {
            let Some(element) = elements.get(id) else {
                continue;
            };
            let title = if element.title.is_empty() {
                format!("{fallback} {}", root.children.len() + 1)
            } else {
                element.title.clone()
            };
            let handle = self.handles.create(&format!("{id}{}", element.title))?;
            root.children
                .push(OutlineNode::file(handle, &title, class.clone(), codec.encode(element)));
        }
        Ok(root)
    }
}

/// Emission state: the `<content>` element and the running item count.
struct Emitter<'a> {
    project_dir: &'a Path,
    version: FileVersion,
    lookup: StatusLookup,
    content: XmlElement,
    count: usize,
}

impl Emitter<'_> {
    fn emit(&mut self, node: OutlineNode, parent: &str, order: u32) -> Result<(), NwxError> {
        let OutlineNode {
            mut item,
            body,
            children,
        } = node;
        item.parent = parent.to_string();
        item.order = order;
        item.write(&mut self.content, self.version, &self.lookup);
        if let Some(body) = body {
            write_content(self.project_dir, &item, &body)?;
        }
        self.count += 1;

        for (child_order, child) in (0u32..).zip(children) {
            self.emit(child, &item.handle, child_order)?;
        }
        Ok(())
    }
}

fn project_element(novel: &Novel, version: FileVersion) -> XmlElement {
    let mut project = XmlElement::new("project");
    if version == FileVersion::V1_5 {
        project.set("id", uuid::Uuid::new_v4().to_string());
    }
    let title = if novel.title.is_empty() {
        DEFAULT_PROJECT_TITLE
    } else {
        novel.title.as_str()
    };
    project.push_text("name", title);
    project.push_text("title", title);
    let authors: Vec<&str> = if novel.author_name.is_empty() {
        vec![""]
    } else {
        novel.author_name.split(',').map(str::trim).collect()
    };
    for author in authors {
        project.push_text("author", author);
    }
    project
}

fn settings_element(lookup: &StatusLookup, version: FileVersion) -> XmlElement {
    let entry = |key: &str, label: &str, (red, green, blue): (u8, u8, u8)| {
        let mut entry = XmlElement::new("entry");
        if version == FileVersion::V1_5 {
            entry.set("key", key);
        }
        entry
            .attr("red", red.to_string())
            .attr("green", green.to_string())
            .attr("blue", blue.to_string())
            .with_text(label)
    };

    let mut settings = XmlElement::new("settings");
    let status = settings.push(XmlElement::new("status"));
    for ((key, label), colour) in lookup.status.iter().zip(STATUS_COLOURS) {
        status.push(entry(key, label, colour));
    }
    let importance = settings.push(XmlElement::new("importance"));
    for ((key, label), (_, colour)) in lookup.importance.iter().zip(IMPORTANCE) {
        importance.push(entry(key, label, colour));
    }
    settings
}

/// Writes the whole project; returns the index path and the item count.
pub(super) fn write_project(
    novel: &Novel,
    project_dir: &Path,
    config: &ConverterConfig,
) -> Result<(PathBuf, usize), NwxError> {
    let content_dir = project_dir.join(CONTENT_DIR);
    std::fs::create_dir_all(&content_dir).map_err(|source| NwxError::Write {
        path: content_dir.clone(),
        source,
    })?;

    let version = config.file_version;
    let roots = OutlineBuilder {
        novel,
        config,
        handles: Handles::new(),
    }
    .build()?;

    let status_labels: Vec<String> = config
        .scene_status
        .iter()
        .take(STATUS_COLOURS.len())
        .cloned()
        .collect();
    let importance_labels: Vec<String> =
        IMPORTANCE.iter().map(|(label, _)| label.to_string()).collect();
    let lookup = StatusLookup::generate(&status_labels, &importance_labels);

    let mut emitter = Emitter {
        project_dir,
        version,
        lookup,
        content: XmlElement::new("content"),
        count: 0,
    };
    for (order, root) in (0u32..).zip(roots) {
        emitter.emit(root, ROOT_PARENT, order)?;
    }
    let count = emitter.count;
    let count_key = if version == FileVersion::V1_5 {
        "items"
    } else {
        "count"
    };
    emitter.content.set(count_key, count.to_string());

    let (app_version, hex_version) = version.app_version();
    let time_stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let mut root = XmlElement::new(NWX_TAG)
        .attr("appVersion", app_version)
        .attr("hexVersion", hex_version)
        .attr("fileVersion", version.as_str())
        .attr("timeStamp", time_stamp);
    root.push(project_element(novel, version));
    root.push(settings_element(&emitter.lookup, version));
    root.push(emitter.content);

    let path = project_dir.join(PROJECT_FILE);
    std::fs::write(&path, root.to_document()).map_err(|source| NwxError::Write {
        path: path.clone(),
        source,
    })?;
    Ok((path, count))
}
