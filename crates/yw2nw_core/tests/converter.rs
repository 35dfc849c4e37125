use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use yw2nw_core::nwx::{LOCK_FILE, PROJECT_FILE};
use yw2nw_core::{
    read_yw7, write_yw7, Chapter, Character, ConvertError, Conversion, Converter,
    ConverterConfig, Novel, Reporter, Scene, SceneStatus, SilentReporter,
};

/// Records every message and answers the overwrite question with `answer`.
#[derive(Default)]
struct RecordingReporter {
    answer: bool,
    messages: Vec<String>,
    asked: Vec<PathBuf>,
}

impl Reporter for RecordingReporter {
    fn info_what(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn info_how(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn confirm_overwrite(&mut self, path: &Path) -> bool {
        self.asked.push(path.to_path_buf());
        self.answer
    }
}

fn small_novel() -> Novel {
    let mut novel = Novel::new();
    novel.title = "The Mill".to_string();
    novel.author_name = "Ann".to_string();
    novel.push_character(Character {
        title: "Jane".to_string(),
        full_name: "Jane Doe".to_string(),
        ..Character::default()
    });
    let chapter = novel.push_chapter(Chapter {
        title: "Chapter One".to_string(),
        ..Chapter::default()
    });
    novel.push_scene(
        &chapter,
        Scene {
            title: "Opening".to_string(),
            content: "First paragraph.\nSecond [i]paragraph[/i].".to_string(),
            status: Some(SceneStatus::FirstEdit),
            characters: vec!["1".to_string()],
            tags: vec!["dawn".to_string()],
            ..Scene::default()
        },
    );
    novel
}

fn yw7_source(dir: &Path) -> PathBuf {
    let path = dir.join("The Mill.yw7");
    write_yw7(&small_novel(), &path).unwrap();
    path
}

#[test]
fn yw7_to_novelwriter_and_back() {
    let dir = tempfile::tempdir().unwrap();
    let source = yw7_source(dir.path());
    let converter = Converter::new(ConverterConfig::default());

    let written = converter.run(&source, &mut SilentReporter).unwrap();
    let index = dir.path().join("The Mill.nw").join(PROJECT_FILE);
    assert_eq!(written, Conversion::Written(index.clone()));
    let scene_text = std::fs::read_dir(dir.path().join("The Mill.nw").join("content"))
        .unwrap()
        .map(|entry| std::fs::read_to_string(entry.unwrap().path()).unwrap())
        .find(|text| text.contains("### Opening"))
        .unwrap();
    assert!(scene_text.contains("First paragraph.\n\nSecond _paragraph_."));
    assert!(scene_text.contains("@pov: Jane"));

    let mut reporter = RecordingReporter {
        answer: true,
        ..RecordingReporter::default()
    };
    let written = converter.run(&index, &mut reporter).unwrap();
    assert_eq!(written, Conversion::Written(source.clone()));
    assert_eq!(reporter.asked, vec![source.clone()]);
    assert!(dir.path().join("The Mill.yw7.bak").is_file());

    assert_eq!(read_yw7(&source).unwrap(), small_novel());
}

#[test]
fn existing_project_folder_is_backed_up() {
    let dir = tempfile::tempdir().unwrap();
    let source = yw7_source(dir.path());
    let converter = Converter::default();

    converter.run(&source, &mut SilentReporter).unwrap();
    std::fs::write(dir.path().join("The Mill.nw").join("marker.txt"), "old").unwrap();
    let mut reporter = RecordingReporter::default();
    converter.run(&source, &mut reporter).unwrap();

    let backup = dir.path().join("The Mill.nw.bak");
    assert!(backup.join("marker.txt").is_file());
    assert!(!dir.path().join("The Mill.nw").join("marker.txt").exists());
    assert!(reporter
        .messages
        .iter()
        .any(|message| message.contains("The Mill.nw.bak")));

    converter.run(&source, &mut SilentReporter).unwrap();
    assert!(dir.path().join("The Mill.nw.bk000").is_dir());
}

#[test]
fn locked_project_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let source = yw7_source(dir.path());
    let project_dir = dir.path().join("The Mill.nw");
    std::fs::create_dir_all(&project_dir).unwrap();
    std::fs::write(project_dir.join(LOCK_FILE), "").unwrap();

    let err = Converter::default()
        .run(&source, &mut SilentReporter)
        .unwrap_err();
    assert!(matches!(err, ConvertError::ProjectLocked(ref path) if path == &project_dir));
    assert_eq!(err.code(), "project_locked");
    assert!(!project_dir.join(PROJECT_FILE).exists());
    assert!(!dir.path().join("The Mill.nw.bak").exists());
}

#[test]
fn declined_overwrite_cancels() {
    let dir = tempfile::tempdir().unwrap();
    let source = yw7_source(dir.path());
    let converter = Converter::default();
    converter.run(&source, &mut SilentReporter).unwrap();
    let before = std::fs::read_to_string(&source).unwrap();

    let mut reporter = RecordingReporter::default();
    let index = dir.path().join("The Mill.nw").join(PROJECT_FILE);
    assert_eq!(converter.run(&index, &mut reporter).unwrap(), Conversion::Canceled);

    assert_eq!(std::fs::read_to_string(&source).unwrap(), before);
    assert!(!dir.path().join("The Mill.yw7.bak").exists());
    assert!(reporter
        .messages
        .iter()
        .any(|message| message == "Action canceled by user."));
}

#[test]
fn unsupported_and_missing_sources_fail() {
    let dir = tempfile::tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "text").unwrap();
    let converter = Converter::default();

    let mut reporter = RecordingReporter::default();
    let err = converter.run(&notes, &mut reporter).unwrap_err();
    assert!(matches!(err, ConvertError::Unsupported(_)));
    assert!(reporter.messages.iter().any(|message| message.starts_with("Error: ")));

    let err = converter
        .run(&dir.path().join("missing.yw7"), &mut reporter)
        .unwrap_err();
    assert!(matches!(err, ConvertError::NotFound(_)));
    assert_eq!(err.code(), "source_not_found");
}

#[test]
fn broken_yw7_reports_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("broken.yw7");
    std::fs::write(&source, "<YWRITER7><PROJECT>").unwrap();

    let err = Converter::default()
        .run(&source, &mut SilentReporter)
        .unwrap_err();
    assert_eq!(err.code(), "yw7_malformed");
    assert!(!dir.path().join("broken.nw").exists());
}
