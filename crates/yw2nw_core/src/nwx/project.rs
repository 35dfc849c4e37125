//! Project read and write entry points.
//!
//! # Responsibility
//! - Parse the index, rebuild the item tree and drive the content codecs.
//! - Replace scene reference titles with roster ids once all rosters exist.
//!
//! # Invariants
//! - Rosters are decoded before novel files: characters, locations, objects.
//! - Archive and trash subtrees are never read.
//! - Any item or content file error aborts the read.

use super::item::{FileVersion, ItemClass, ItemMap, NwItem, StatusLookup, ROOT_PARENT};
use super::outline;
use super::{NwxError, NWX_TAG, PROJECT_FILE};
use crate::config::ConverterConfig;
use crate::handles::Handles;
use crate::model::novel::{ElementId, Novel};
use crate::nwd::character::CharacterCodec;
use crate::nwd::novel::NovelCodec;
use crate::nwd::world::{WorldCodec, WorldKind};
use crate::nwd::{read_content, ReadSession};
use crate::xml::{child, child_text, children};
use log::{error, info};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// FILE handles of each convertible subtree, in tree order.
#[derive(Debug, Default)]
struct Rosters {
    characters: Vec<String>,
    locations: Vec<String>,
    objects: Vec<String>,
    novel: Vec<String>,
}

/// Items of one index arranged as a tree.
struct ProjectTree {
    items: ItemMap,
    children: HashMap<String, Vec<String>>,
}

impl ProjectTree {
    /// Validates parents and sorts every sibling list by `order`.
    fn build(items: ItemMap, document_order: &[String]) -> Result<Self, NwxError> {
        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        for handle in document_order {
            let item = &items[handle];
            if item.parent != ROOT_PARENT && !items.contains_key(&item.parent) {
                return Err(NwxError::UnknownParent {
                    handle: handle.clone(),
                    parent: item.parent.clone(),
                });
            }
            children
                .entry(item.parent.clone())
                .or_default()
                .push(handle.clone());
        }
        for siblings in children.values_mut() {
            siblings.sort_by_key(|handle| items[handle].order);
        }
        Ok(Self { items, children })
    }

    fn children_of(&self, handle: &str) -> &[String] {
        self.children.get(handle).map_or(&[], Vec::as_slice)
    }

    /// Depth-first FILE handles below and including `handle`.
    fn collect_files(&self, handle: &str, out: &mut Vec<String>, visited: &mut HashSet<String>) {
        if !visited.insert(handle.to_string()) {
            return;
        }
        if self.items[handle].is_file() {
            out.push(handle.to_string());
        }
        for child in self.children_of(handle) {
            self.collect_files(child, out, visited);
        }
    }

    fn partition(&self) -> Rosters {
        let mut rosters = Rosters::default();
        let mut visited = HashSet::new();
        for handle in self.children_of(ROOT_PARENT) {
            let target = match &self.items[handle].class {
                Some(ItemClass::Character) => &mut rosters.characters,
                Some(ItemClass::World) => &mut rosters.locations,
                Some(ItemClass::Object) => &mut rosters.objects,
                Some(ItemClass::Novel) => &mut rosters.novel,
                Some(class) if class.is_trailer() => {
                    info!("event=nwx_partition module=nwx status=skip handle={handle} class={class}");
                    continue;
                }
                _ => continue,
            };
            self.collect_files(handle, target, &mut visited);
        }
        rosters
    }
}

/// novelWriter project reader and writer.
pub struct NwxProject;

impl NwxProject {
    /// Reads the project whose index is `path` into a novel.
    ///
    /// # Side effects
    /// - Reads the index and every convertible content file.
    /// - Emits `nwx_read` logging events with duration and status.
    pub fn read(path: &Path, config: &ConverterConfig) -> Result<Novel, NwxError> {
        let started_at = Instant::now();
        info!("event=nwx_read module=nwx status=start path={}", path.display());
        match read_project(path, config) {
            Ok(novel) => {
                info!(
                    "event=nwx_read module=nwx status=ok duration_ms={} chapters={} scenes={} characters={} locations={} items={}",
                    started_at.elapsed().as_millis(),
                    novel.chapters.len(),
                    novel.scenes.len(),
                    novel.characters.len(),
                    novel.locations.len(),
                    novel.items.len()
                );
                Ok(novel)
            }
            Err(err) => {
                error!(
                    "event=nwx_read module=nwx status=error duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Writes `novel` as a new project into `project_dir` and returns the
    /// index path. The directory and its `content` folder must be writable.
    ///
    /// # Side effects
    /// - Creates `content/` and writes one `.nwd` file per element.
    /// - Emits `nwx_write` logging events with duration and status.
    pub fn write(
        novel: &Novel,
        project_dir: &Path,
        config: &ConverterConfig,
    ) -> Result<PathBuf, NwxError> {
        let started_at = Instant::now();
        info!(
            "event=nwx_write module=nwx status=start path={} file_version={}",
            project_dir.display(),
            config.file_version
        );
        match outline::write_project(novel, project_dir, config) {
            Ok((path, count)) => {
                info!(
                    "event=nwx_write module=nwx status=ok duration_ms={} items={count}",
                    started_at.elapsed().as_millis()
                );
                Ok(path)
            }
            Err(err) => {
                error!(
                    "event=nwx_write module=nwx status=error duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Project title as the yWriter side names it: `title`, else `name`.
    pub fn read_title(path: &Path) -> Result<Option<String>, NwxError> {
        let text = read_index(path)?;
        let document = parse_index(path, &text)?;
        let root = document.root_element();
        Ok(child(root, "project").and_then(project_title))
    }

    /// Index path of the project folder `project_dir`.
    pub fn index_path(project_dir: &Path) -> PathBuf {
        project_dir.join(PROJECT_FILE)
    }
}

fn read_index(path: &Path) -> Result<String, NwxError> {
    std::fs::read_to_string(path).map_err(|source| NwxError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_index<'input>(
    path: &Path,
    text: &'input str,
) -> Result<roxmltree::Document<'input>, NwxError> {
    let document = roxmltree::Document::parse(text).map_err(|source| NwxError::Xml {
        path: path.to_path_buf(),
        source,
    })?;
    if !document.root_element().has_tag_name(NWX_TAG) {
        return Err(NwxError::NotNovelWriter {
            path: path.to_path_buf(),
        });
    }
    Ok(document)
}

fn project_title(project: roxmltree::Node<'_, '_>) -> Option<String> {
    child_text(project, "title").or_else(|| child_text(project, "name"))
}

fn read_project(path: &Path, config: &ConverterConfig) -> Result<Novel, NwxError> {
    let text = read_index(path)?;
    let document = parse_index(path, &text)?;
    let root = document.root_element();

    let version_text = root.attribute("fileVersion").unwrap_or_default();
    let version =
        FileVersion::parse(version_text).ok_or_else(|| NwxError::UnsupportedVersion {
            version: version_text.to_string(),
        })?;

    let mut session = ReadSession::new();
    if let Some(project) = child(root, "project") {
        session.novel.title = project_title(project).unwrap_or_default();
        let authors: Vec<String> = children(project, "author")
            .filter_map(|author| author.text())
            .map(|author| author.trim().to_string())
            .filter(|author| !author.is_empty())
            .collect();
        session.novel.author_name = authors.join(", ");
    }

    let lookup = child(root, "settings")
        .map(StatusLookup::read)
        .unwrap_or_default();

    let mut handles = Handles::new();
    let mut items = ItemMap::new();
    let mut document_order = Vec::new();
    if let Some(content) = child(root, "content") {
        for node in children(content, "item") {
            let item = NwItem::read(node, version, &lookup)?;
            if !handles.add(&item.handle) {
                return Err(NwxError::InvalidHandle {
                    handle: item.handle,
                });
            }
            document_order.push(item.handle.clone());
            items.insert(item.handle.clone(), item);
        }
    }
    info!(
        "event=nwx_index module=nwx status=ok file_version={version} items={}",
        items.len()
    );

    let tree = ProjectTree::build(items, &document_order)?;
    let rosters = tree.partition();
    let project_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let characters = CharacterCodec::new(config);
    for handle in &rosters.characters {
        let item = &tree.items[handle];
        characters.decode(&read_content(project_dir, item)?, item, &mut session);
    }
    let locations = WorldCodec::new(config, WorldKind::Location);
    for handle in &rosters.locations {
        let item = &tree.items[handle];
        locations.decode(&read_content(project_dir, item)?, item, &mut session);
    }
    let objects = WorldCodec::new(config, WorldKind::Object);
    for handle in &rosters.objects {
        let item = &tree.items[handle];
        objects.decode(&read_content(project_dir, item)?, item, &mut session);
    }
    let novel_codec = NovelCodec::new(config);
    for handle in &rosters.novel {
        let item = &tree.items[handle];
        novel_codec.decode(&read_content(project_dir, item)?, item, &mut session);
    }

    let mut novel = session.into_novel();
    resolve_references(&mut novel)?;
    Ok(novel)
}

/// Title to ids of every roster entry carrying that title.
fn title_index<'a, T>(
    order: &'a [ElementId],
    collection: &'a HashMap<ElementId, T>,
    title_of: impl Fn(&T) -> &str,
) -> HashMap<&'a str, Vec<&'a ElementId>> {
    let mut index: HashMap<&str, Vec<&ElementId>> = HashMap::new();
    for id in order {
        if let Some(entry) = collection.get(id) {
            index.entry(title_of(entry)).or_default().push(id);
        }
    }
    index
}

fn resolve_titles(
    scene_id: &str,
    kind: &'static str,
    titles: &[String],
    index: &HashMap<&str, Vec<&ElementId>>,
) -> Result<Vec<ElementId>, NwxError> {
    titles
        .iter()
        .map(|title| match index.get(title.as_str()).map(Vec::as_slice) {
            Some([id]) => Ok((*id).clone()),
            Some([_, _, ..]) => Err(NwxError::AmbiguousReference {
                scene: scene_id.to_string(),
                kind,
                title: title.clone(),
            }),
            _ => Err(NwxError::UnresolvedReference {
                scene: scene_id.to_string(),
                kind,
                title: title.clone(),
            }),
        })
        .collect()
}

/// Replaces the reference titles captured while decoding with roster ids.
fn resolve_references(novel: &mut Novel) -> Result<(), NwxError> {
    let characters = title_index(&novel.srt_characters, &novel.characters, |c| c.title.as_str());
    let locations = title_index(&novel.srt_locations, &novel.locations, |l| l.title.as_str());
    let items = title_index(&novel.srt_items, &novel.items, |i| i.title.as_str());

    let mut resolved = Vec::with_capacity(novel.scenes.len());
    for scene_id in novel.scene_ids_in_order() {
        let scene = &novel.scenes[&scene_id];
        let ids = (
            resolve_titles(&scene_id, "character", &scene.characters, &characters)?,
            resolve_titles(&scene_id, "location", &scene.locations, &locations)?,
            resolve_titles(&scene_id, "item", &scene.items, &items)?,
        );
        resolved.push((scene_id, ids));
    }

    for (scene_id, (character_ids, location_ids, item_ids)) in resolved {
        if let Some(scene) = novel.scenes.get_mut(&scene_id) {
            scene.characters = character_ids;
            scene.locations = location_ids;
            scene.items = item_ids;
        }
    }
    Ok(())
}
