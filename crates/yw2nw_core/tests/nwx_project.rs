use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use yw2nw_core::nwx::PROJECT_FILE;
use yw2nw_core::{ChapterLevel, ConverterConfig, NwxError, NwxProject, SceneStatus};

const INDEX_1_5: &str = r#"<?xml version='1.0' encoding='utf-8'?>
<novelWriterXML appVersion="2.0" hexVersion="0x020000f0" fileVersion="1.5" timeStamp="2023-01-01 00:00:00">
  <project id="0b2ee6a7-0000-4000-8000-000000000000">
    <name>Working Title</name>
    <title>The Mill</title>
    <author>Ann</author>
    <author>Ben</author>
  </project>
  <settings>
    <status>
      <entry key="s000001" count="2" red="0" green="0" blue="0">Draft</entry>
      <entry key="s000002" count="1" red="0" green="0" blue="0">Finished</entry>
    </status>
    <importance>
      <entry key="i000001" count="1" red="0" green="0" blue="0">Main</entry>
      <entry key="i000002" count="2" red="0" green="0" blue="0">Minor</entry>
    </importance>
  </settings>
  <content items="11">
    <item handle="a000000000001" parent="None" order="0" type="ROOT" class="NOVEL">
      <meta expanded="yes"/>
      <name status="s000001" active="yes">Novel</name>
    </item>
    <item handle="a000000000003" parent="a000000000001" order="1" type="FILE" class="NOVEL" layout="DOCUMENT">
      <meta wordCount="4"/>
      <name status="s000002" active="yes">Arrival</name>
    </item>
    <item handle="a000000000002" parent="a000000000001" order="0" type="FILE" class="NOVEL" layout="DOCUMENT">
      <name status="s000001" active="yes">Chapter One</name>
    </item>
    <item handle="b000000000001" parent="None" order="1" type="ROOT" class="CHARACTER">
      <name>Characters</name>
    </item>
    <item handle="b000000000002" parent="b000000000001" order="0" type="FILE" class="CHARACTER" layout="NOTE">
      <name import="i000001" active="yes">Jane Doe</name>
    </item>
    <item handle="b000000000003" parent="b000000000001" order="1" type="FILE" class="CHARACTER" layout="NOTE">
      <name import="i000002" active="yes">Bob</name>
    </item>
    <item handle="b000000000004" parent="b000000000001" order="2" type="FILE" class="CHARACTER" layout="NOTE">
      <name import="i000002" active="yes">Carl</name>
    </item>
    <item handle="c000000000001" parent="None" order="2" type="ROOT" class="WORLD">
      <name>Locations</name>
    </item>
    <item handle="c000000000002" parent="c000000000001" order="0" type="FILE" class="WORLD" layout="NOTE">
      <name active="yes">Old Mill</name>
    </item>
    <item handle="d000000000001" parent="None" order="3" type="ROOT" class="TRASH">
      <name>Trash</name>
    </item>
    <item handle="d000000000002" parent="d000000000001" order="0" type="FILE" class="NOVEL" layout="DOCUMENT">
      <name active="yes">Deleted</name>
    </item>
  </content>
</novelWriterXML>
"#;

const CONTENT_1_5: &[(&str, &str)] = &[
    (
        "a000000000002",
        "%%~name: Chapter One\n%%~path: a000000000001/a000000000002\n%%~kind: NOVEL/DOCUMENT\n\
         ## Chapter One\n\n% synopsis: The beginning.\n",
    ),
    (
        "a000000000003",
        "### Arrival\n\n@pov: Bob\n@char: Jane_Doe\n@location: Old_Mill\n%tag: night\n\n\
         She came.\n\nIt _rained_.\n",
    ),
    ("b000000000002", "# Jane Doe\n\n@tag: Jane_Doe\n\nTall.\n"),
    ("b000000000003", "# Bob\n"),
    ("b000000000004", "# Carl\n"),
    (
        "c000000000002",
        "# Old Mill\n\n@tag: Old_Mill\n%aka: The Mill\n\nDusty.\n",
    ),
];

/// Writes an index and its content files into `<tmp>/book.nw`.
fn project(index: &str, files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let project_dir = dir.path().join("book.nw");
    std::fs::create_dir_all(project_dir.join("content")).unwrap();
    for (handle, text) in files {
        std::fs::write(project_dir.join("content").join(format!("{handle}.nwd")), text).unwrap();
    }
    let index_path = project_dir.join(PROJECT_FILE);
    std::fs::write(&index_path, index).unwrap();
    (dir, index_path)
}

fn read(path: &Path) -> Result<yw2nw_core::Novel, NwxError> {
    NwxProject::read(path, &ConverterConfig::default())
}

#[test]
fn reads_format_1_5_project() {
    let (_dir, index) = project(INDEX_1_5, CONTENT_1_5);
    let novel = read(&index).unwrap();

    assert_eq!(novel.title, "The Mill");
    assert_eq!(novel.author_name, "Ann, Ben");
    assert_eq!(novel.srt_chapters, vec!["1".to_string()]);
    let chapter = &novel.chapters["1"];
    assert_eq!(chapter.title, "Chapter One");
    assert_eq!(chapter.desc, "The beginning.");
    assert_eq!(chapter.srt_scenes, vec!["1".to_string()]);

    let scene = &novel.scenes["1"];
    assert_eq!(scene.title, "Arrival");
    assert_eq!(scene.status, Some(SceneStatus::Done));
    assert_eq!(scene.characters, vec!["2", "1"]);
    assert_eq!(scene.locations, vec!["1"]);
    assert_eq!(scene.tags, vec!["night"]);
    assert_eq!(scene.content, "She came.\nIt [i]rained[/i].");

    assert_eq!(novel.srt_characters, vec!["1", "2", "3"]);
    assert_eq!(novel.characters["1"].title, "Jane Doe");
    assert_eq!(novel.characters["1"].desc, "Tall.");
    assert!(novel.characters["1"].is_major);
    assert!(!novel.characters["2"].is_major);
    assert_eq!(novel.locations["1"].aka, "The Mill");
}

#[test]
fn unknown_reference_title_is_an_error() {
    let mut files = CONTENT_1_5.to_vec();
    files[1].1 = "### Arrival\n\n@char: Nobody\n\nText.\n";
    let (_dir, index) = project(INDEX_1_5, &files);

    match read(&index) {
        Err(NwxError::UnresolvedReference { scene, kind, title }) => {
            assert_eq!((scene.as_str(), kind, title.as_str()), ("1", "character", "Nobody"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn duplicate_titles_make_references_ambiguous() {
    let mut files = CONTENT_1_5.to_vec();
    files[4].1 = "# Carl\n\n@tag: Bob\n";
    let (_dir, index) = project(INDEX_1_5, &files);

    assert!(matches!(
        read(&index),
        Err(NwxError::AmbiguousReference { kind: "character", .. })
    ));
}

#[test]
fn missing_content_file_aborts_read() {
    let files: Vec<_> = CONTENT_1_5
        .iter()
        .copied()
        .filter(|(handle, _)| *handle != "b000000000004")
        .collect();
    let (_dir, index) = project(INDEX_1_5, &files);

    let err = read(&index).unwrap_err();
    assert_eq!(err.code(), "nwd_read_failed");
}

const INDEX_1_3: &str = r#"<?xml version='1.0' encoding='utf-8'?>
<novelWriterXML appVersion="1.6" hexVersion="0x010600f0" fileVersion="1.3" timeStamp="2021-05-01 10:00:00">
  <project>
    <name>Old Book</name>
    <author>Ann</author>
  </project>
  <settings>
    <status>
      <entry blue="0" green="0" red="0">New</entry>
      <entry blue="0" green="0" red="0">1st Draft</entry>
    </status>
  </settings>
  <content count="3">
    <item handle="a000000000001" order="0" parent="None">
      <name>Novel</name>
      <type>ROOT</type>
      <class>NOVEL</class>
      <status>New</status>
      <expanded>True</expanded>
    </item>
    <item handle="a000000000002" order="0" parent="a000000000001">
      <name>Part One</name>
      <type>FILE</type>
      <class>NOVEL</class>
      <status>1st Draft</status>
      <exported>True</exported>
      <layout>DOCUMENT</layout>
      <charCount>30</charCount>
    </item>
    <item handle="b000000000001" order="1" parent="None">
      <name>Characters</name>
      <type>ROOT</type>
      <class>CHARACTER</class>
      <status>New</status>
    </item>
  </content>
</novelWriterXML>
"#;

#[test]
fn reads_format_1_3_project() {
    let (_dir, index) = project(
        INDEX_1_3,
        &[(
            "a000000000002",
            "# Part One\n## Chapter\n### A\nBody A\n#### B\nBody B\n",
        )],
    );
    let novel = read(&index).unwrap();

    assert_eq!(novel.title, "Old Book");
    assert_eq!(novel.author_name, "Ann");
    assert_eq!(novel.srt_chapters, vec!["1", "2"]);
    assert_eq!(novel.chapters["1"].level, ChapterLevel::Part);
    assert_eq!(novel.chapters["2"].level, ChapterLevel::Chapter);
    assert!(novel.chapters["1"].srt_scenes.is_empty());
    assert_eq!(novel.chapters["2"].srt_scenes, vec!["1", "2"]);
    assert!(novel.scenes["2"].append_to_prev);
    assert_eq!(novel.scenes["1"].status, Some(SceneStatus::Draft));
    assert!(novel.characters.is_empty());
}

const INDEX_1_4: &str = r#"<?xml version='1.0' encoding='utf-8'?>
<novelWriterXML appVersion="1.7" hexVersion="0x010700f0" fileVersion="1.4" timeStamp="2022-06-01 10:00:00">
  <project>
    <name>Notes Book</name>
    <title>Notebook</title>
  </project>
  <settings/>
  <content count="3">
    <item handle="a000000000001" parent="None" order="0" type="ROOT" class="NOVEL">
      <meta expanded="True"/>
      <name status="New" exported="True">Novel</name>
    </item>
    <item handle="a000000000002" parent="a000000000001" order="0" type="FILE" class="NOVEL" layout="NOTE">
      <meta charCount="10"/>
      <name status="1st Edit" exported="True">Plan</name>
    </item>
    <item handle="a000000000003" parent="a000000000001" order="1" type="FILE" class="NOVEL" layout="DOCUMENT">
      <name status="2nd Edit" exported="False">Cut</name>
    </item>
  </content>
</novelWriterXML>
"#;

#[test]
fn reads_format_1_4_project() {
    let (_dir, index) = project(
        INDEX_1_4,
        &[
            ("a000000000002", "## Plan\n### Idea\nAn idea.\n"),
            ("a000000000003", "## Cut\n### Gone\nGone text.\n"),
        ],
    );
    let novel = read(&index).unwrap();

    assert_eq!(novel.title, "Notebook");
    assert_eq!(novel.author_name, "");
    let plan = &novel.scenes["1"];
    assert!(plan.is_notes_scene);
    assert!(!plan.is_unused);
    assert_eq!(plan.status, Some(SceneStatus::FirstEdit));
    let cut = &novel.scenes["2"];
    assert!(cut.is_unused);
    assert_eq!(cut.status, Some(SceneStatus::SecondEdit));
    assert!(novel.chapters["2"].is_unused);
}

#[test]
fn title_falls_back_to_project_name() {
    let (_dir, index) = project(INDEX_1_3, &[]);
    assert_eq!(
        NwxProject::read_title(&index).unwrap(),
        Some("Old Book".to_string())
    );
}

#[test]
fn unsupported_version_is_rejected() {
    let index = INDEX_1_3.replace(r#"fileVersion="1.3""#, r#"fileVersion="1.2""#);
    let (_dir, index) = project(&index, &[]);

    match read(&index) {
        Err(NwxError::UnsupportedVersion { version }) => assert_eq!(version, "1.2"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn foreign_xml_is_not_a_project() {
    let (_dir, index) = project("<?xml version='1.0'?><YWRITER7/>", &[]);
    assert!(matches!(read(&index), Err(NwxError::NotNovelWriter { .. })));
}

#[test]
fn malformed_handle_is_rejected() {
    let index = INDEX_1_3.replace(r#"handle="b000000000001""#, r#"handle="not-a-handle!""#);
    let (_dir, index) = project(&index, &[]);

    match read(&index) {
        Err(NwxError::InvalidHandle { handle }) => assert_eq!(handle, "not-a-handle!"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn dangling_parent_is_rejected() {
    let index = INDEX_1_3.replace(
        r#"order="0" parent="a000000000001""#,
        r#"order="0" parent="f000000000009""#,
    );
    let (_dir, index) = project(&index, &[]);

    assert!(matches!(
        read(&index),
        Err(NwxError::UnknownParent { ref handle, ref parent })
            if handle == "a000000000002" && parent == "f000000000009"
    ));
}
