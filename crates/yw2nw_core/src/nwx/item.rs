//! novelWriter item records and their per-version encodings.
//!
//! # Responsibility
//! - Hold the metadata of one project tree node.
//! - Read and write the `<item>` element for file format 1.3, 1.4 and 1.5.
//!
//! # Invariants
//! - The encoding is chosen once per project via `FileVersion`.
//! - Unknown type/class/layout labels are kept verbatim (`Other`).
//! - In 1.5, status and importance are stored as lookup keys; an unknown key
//!   is malformed input.

use crate::xml::{child, XmlElement};
use roxmltree::Node;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Parent value of top-level items.
pub const ROOT_PARENT: &str = "None";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ItemError {
    #[error("item attribute `{0}` is missing")]
    MissingAttribute(&'static str),
    #[error("item `{handle}` has a non-numeric order `{value}`")]
    InvalidOrder { handle: String, value: String },
    #[error("item `{handle}` refers to unknown {table} key `{key}`")]
    UnknownLookupKey {
        handle: String,
        table: &'static str,
        key: String,
    },
}

/// Project index format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FileVersion {
    #[serde(rename = "1.3")]
    V1_3,
    #[serde(rename = "1.4")]
    V1_4,
    #[serde(rename = "1.5")]
    V1_5,
}

impl FileVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1_3 => "1.3",
            Self::V1_4 => "1.4",
            Self::V1_5 => "1.5",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "1.3" => Some(Self::V1_3),
            "1.4" => Some(Self::V1_4),
            "1.5" => Some(Self::V1_5),
            _ => None,
        }
    }

    /// `(appVersion, hexVersion)` of the novelWriter release writing this format.
    pub fn app_version(self) -> (&'static str, &'static str) {
        match self {
            Self::V1_3 => ("1.6-alpha0", "0x010600a0"),
            Self::V1_4 => ("1.7-alpha0", "0x010700a0"),
            Self::V1_5 => ("2.0.7", "0x020007f0"),
        }
    }
}

impl Display for FileVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! label_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum $name {
            $($variant,)+
            /// Label not known to this converter.
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $label,)+
                    Self::Other(label) => label.as_str(),
                }
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Ok(match value {
                    $($label => Self::$variant,)+
                    other => Self::Other(other.to_string()),
                })
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

label_enum!(
    /// Tree role of an item.
    ItemType { Root => "ROOT", Folder => "FOLDER", File => "FILE" }
);

label_enum!(
    /// Root class an item belongs to.
    ItemClass {
        Novel => "NOVEL",
        Plot => "PLOT",
        Character => "CHARACTER",
        World => "WORLD",
        Timeline => "TIMELINE",
        Object => "OBJECT",
        Entity => "ENTITY",
        Custom => "CUSTOM",
        Archive => "ARCHIVE",
        Trash => "TRASH",
    }
);

label_enum!(
    /// Whether a file holds prose or notes.
    ItemLayout { Document => "DOCUMENT", Note => "NOTE" }
);

impl ItemClass {
    /// Archive and trash subtrees are never converted.
    pub fn is_trailer(&self) -> bool {
        matches!(self, Self::Archive | Self::Trash)
    }
}

fn parse_label<T: FromStr<Err = std::convert::Infallible>>(value: &str) -> T {
    match value.parse() {
        Ok(parsed) => parsed,
        Err(never) => match never {},
    }
}

/// Key/label tables for status and importance (format 1.5).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLookup {
    pub status: Vec<(String, String)>,
    pub importance: Vec<(String, String)>,
}

impl StatusLookup {
    /// Builds tables with generated keys (`s000000`, `i000000`, ...).
    pub fn generate(status: &[String], importance: &[String]) -> Self {
        let keyed = |prefix: char, labels: &[String]| -> Vec<(String, String)> {
            labels
                .iter()
                .enumerate()
                .map(|(index, label)| (format!("{prefix}{index:06}"), label.clone()))
                .collect()
        };
        Self {
            status: keyed('s', status),
            importance: keyed('i', importance),
        }
    }

    fn label_of<'a>(table: &'a [(String, String)], key: &str) -> Option<&'a str> {
        table
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, label)| label.as_str())
    }

    fn key_of<'a>(table: &'a [(String, String)], label: &str) -> Option<&'a str> {
        table
            .iter()
            .find(|(_, candidate)| candidate == label)
            .map(|(key, _)| key.as_str())
    }

    pub fn status_label(&self, key: &str) -> Option<&str> {
        Self::label_of(&self.status, key)
    }

    pub fn importance_label(&self, key: &str) -> Option<&str> {
        Self::label_of(&self.importance, key)
    }

    pub fn status_key(&self, label: &str) -> Option<&str> {
        Self::key_of(&self.status, label)
    }

    pub fn importance_key(&self, label: &str) -> Option<&str> {
        Self::key_of(&self.importance, label)
    }

    /// Reads `<settings><status>` and `<settings><importance>` entries.
    pub fn read(settings: Node<'_, '_>) -> Self {
        let table = |tag: &str| -> Vec<(String, String)> {
            child(settings, tag)
                .map(|node| {
                    node.children()
                        .filter(|entry| entry.is_element() && entry.has_tag_name("entry"))
                        .filter_map(|entry| {
                            let key = entry.attribute("key")?;
                            Some((key.to_string(), entry.text().unwrap_or("").to_string()))
                        })
                        .collect()
                })
                .unwrap_or_default()
        };
        Self {
            status: table("status"),
            importance: table("importance"),
        }
    }
}

/// Metadata of one project tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NwItem {
    pub handle: String,
    pub parent: String,
    pub order: u32,
    pub name: String,
    pub item_type: Option<ItemType>,
    pub class: Option<ItemClass>,
    pub layout: Option<ItemLayout>,
    pub status: Option<String>,
    pub importance: Option<String>,
    /// `exported` before format 1.5, `active` since.
    pub active: Option<bool>,
    pub expanded: Option<bool>,
    pub char_count: Option<u32>,
    pub word_count: Option<u32>,
    pub para_count: Option<u32>,
    pub cursor_pos: Option<u32>,
}

impl NwItem {
    pub fn new(handle: impl Into<String>, parent: impl Into<String>, order: u32) -> Self {
        Self {
            handle: handle.into(),
            parent: parent.into(),
            order,
            name: String::new(),
            item_type: None,
            class: None,
            layout: None,
            status: None,
            importance: None,
            active: None,
            expanded: None,
            char_count: None,
            word_count: None,
            para_count: None,
            cursor_pos: None,
        }
    }

    pub fn is_file(&self) -> bool {
        self.item_type == Some(ItemType::File)
    }

    /// Reads one `<item>` element in the given format.
    pub fn read(
        node: Node<'_, '_>,
        version: FileVersion,
        lookup: &StatusLookup,
    ) -> Result<Self, ItemError> {
        let handle = node
            .attribute("handle")
            .ok_or(ItemError::MissingAttribute("handle"))?;
        let parent = node.attribute("parent").unwrap_or(ROOT_PARENT);
        let order_text = node
            .attribute("order")
            .ok_or(ItemError::MissingAttribute("order"))?;
        let order = order_text
            .trim()
            .parse()
            .map_err(|_| ItemError::InvalidOrder {
                handle: handle.to_string(),
                value: order_text.to_string(),
            })?;
        let mut item = NwItem::new(handle, parent, order);

        match version {
            FileVersion::V1_3 => {
                let text = |tag: &str| child(node, tag).map(|n| n.text().unwrap_or("").to_string());
                item.name = text("name").unwrap_or_default();
                item.item_type = text("type").map(|v| parse_label(&v));
                item.class = text("class").map(|v| parse_label(&v));
                item.layout = text("layout").map(|v| parse_label(&v));
                item.status = text("status");
                item.active = text("exported").map(|v| parse_flag(&v));
                item.expanded = text("expanded").map(|v| parse_flag(&v));
                item.char_count = text("charCount").and_then(|v| v.trim().parse().ok());
                item.word_count = text("wordCount").and_then(|v| v.trim().parse().ok());
                item.para_count = text("paraCount").and_then(|v| v.trim().parse().ok());
                item.cursor_pos = text("cursorPos").and_then(|v| v.trim().parse().ok());
            }
            FileVersion::V1_4 | FileVersion::V1_5 => {
                item.item_type = node.attribute("type").map(parse_label);
                item.class = node.attribute("class").map(parse_label);
                item.layout = node.attribute("layout").map(parse_label);
                if let Some(meta) = child(node, "meta") {
                    let count =
                        |key: &str| -> Option<u32> { meta.attribute(key).and_then(|v| v.trim().parse().ok()) };
                    item.expanded = meta.attribute("expanded").map(parse_flag);
                    item.char_count = count("charCount");
                    item.word_count = count("wordCount");
                    item.para_count = count("paraCount");
                    item.cursor_pos = count("cursorPos");
                }
                if let Some(name) = child(node, "name") {
                    item.name = name.text().unwrap_or("").to_string();
                    if version == FileVersion::V1_4 {
                        item.status = name.attribute("status").map(str::to_string);
                        item.active = name.attribute("exported").map(parse_flag);
                    } else {
                        item.status = name
                            .attribute("status")
                            .map(|key| resolve(handle, "status", key, lookup.status_label(key)))
                            .transpose()?;
                        item.importance = name
                            .attribute("import")
                            .map(|key| {
                                resolve(handle, "importance", key, lookup.importance_label(key))
                            })
                            .transpose()?;
                        item.active = Some(name.attribute("active").is_some_and(parse_flag));
                    }
                }
            }
        }
        Ok(item)
    }

    /// Serializes this item as a new `<item>` child of `content`.
    pub fn write(&self, content: &mut XmlElement, version: FileVersion, lookup: &StatusLookup) {
        let mut node = XmlElement::new("item")
            .attr("handle", self.handle.as_str())
            .attr("parent", self.parent.as_str())
            .attr("order", self.order.to_string());

        match version {
            FileVersion::V1_3 => {
                node.push_text("name", self.name.as_str());
                if let Some(item_type) = &self.item_type {
                    node.push_text("type", item_type.as_str());
                }
                if let Some(class) = &self.class {
                    node.push_text("class", class.as_str());
                }
                if let Some(status) = &self.status {
                    node.push_text("status", status.as_str());
                }
                if let Some(active) = self.active {
                    node.push_text("exported", python_flag(active));
                }
                if let Some(layout) = &self.layout {
                    node.push_text("layout", layout.as_str());
                }
                if let Some(expanded) = self.expanded {
                    node.push_text("expanded", python_flag(expanded));
                }
                for (tag, value) in self.counters() {
                    if let Some(value) = value {
                        node.push_text(tag, value.to_string());
                    }
                }
            }
            FileVersion::V1_4 | FileVersion::V1_5 => {
                if let Some(item_type) = &self.item_type {
                    node.set("type", item_type.as_str());
                }
                if let Some(class) = &self.class {
                    node.set("class", class.as_str());
                }
                if let Some(layout) = &self.layout {
                    node.set("layout", layout.as_str());
                }

                let mut meta = XmlElement::new("meta");
                if let Some(expanded) = self.expanded {
                    let flag = if version == FileVersion::V1_4 {
                        python_flag(expanded)
                    } else {
                        yes_no(expanded)
                    };
                    meta.set("expanded", flag);
                }
                for (key, value) in self.counters() {
                    if let Some(value) = value {
                        meta.set(key, value.to_string());
                    }
                }
                node.push(meta);

                let mut name = XmlElement::new("name").with_text(self.name.as_str());
                if version == FileVersion::V1_4 {
                    if let Some(status) = &self.status {
                        name.set("status", status.as_str());
                    }
                    if let Some(active) = self.active {
                        name.set("exported", python_flag(active));
                    }
                } else {
                    if let Some(key) = self.status.as_deref().and_then(|s| lookup.status_key(s)) {
                        name.set("status", key);
                    }
                    if let Some(key) = self
                        .importance
                        .as_deref()
                        .and_then(|s| lookup.importance_key(s))
                    {
                        name.set("import", key);
                    }
                    if let Some(active) = self.active {
                        name.set("active", yes_no(active));
                    }
                }
                node.push(name);
            }
        }
        content.push(node);
    }

    fn counters(&self) -> [(&'static str, Option<u32>); 4] {
        [
            ("charCount", self.char_count),
            ("wordCount", self.word_count),
            ("paraCount", self.para_count),
            ("cursorPos", self.cursor_pos),
        ]
    }
}

fn resolve(
    handle: &str,
    table: &'static str,
    key: &str,
    label: Option<&str>,
) -> Result<String, ItemError> {
    label
        .map(str::to_string)
        .ok_or_else(|| ItemError::UnknownLookupKey {
            handle: handle.to_string(),
            table,
            key: key.to_string(),
        })
}

/// Reads a boolean written by any novelWriter version.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "yes" | "true" | "on"
    )
}

fn python_flag(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Flat handle map of all items in an index.
pub type ItemMap = HashMap<String, NwItem>;

#[cfg(test)]
mod tests {
    use super::{parse_flag, ItemClass, ItemType, StatusLookup};

    #[test]
    fn labels_keep_unknown_values() {
        assert_eq!("FILE".parse::<ItemType>().unwrap(), ItemType::File);
        let custom: ItemClass = "STORYLINE".parse().unwrap();
        assert_eq!(custom.as_str(), "STORYLINE");
        assert!(ItemClass::Trash.is_trailer());
        assert!(!ItemClass::Novel.is_trailer());
    }

    #[test]
    fn flags_accept_all_spellings() {
        for value in ["yes", "True", "on", " TRUE "] {
            assert!(parse_flag(value), "{value}");
        }
        for value in ["no", "False", "off", ""] {
            assert!(!parse_flag(value), "{value}");
        }
    }

    #[test]
    fn generated_lookup_maps_both_ways() {
        let lookup = StatusLookup::generate(
            &["New".to_string(), "Draft".to_string()],
            &["Minor".to_string()],
        );
        assert_eq!(lookup.status_key("Draft"), Some("s000001"));
        assert_eq!(lookup.status_label("s000000"), Some("New"));
        assert_eq!(lookup.importance_key("Minor"), Some("i000000"));
        assert_eq!(lookup.importance_label("i000009"), None);
    }
}
