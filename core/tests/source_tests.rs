use std::fs;
use std::io;
use std::path::Path;

use search_core::persist::{load_optional_stop_words, load_stop_words, read_artifact, write_artifact};
use search_core::source::{load_json_inputs, load_markdown_tree};
use search_core::{Extractor, SourceError};
use tempfile::tempdir;

fn write(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

#[test]
fn markdown_tree_loads_posts_then_pages_sorted_by_name() {
    let dir = tempdir().unwrap();
    let content = dir.path();
    write(&content.join("posts/b-second.md"), "---\ntitle: Second\n---\nsecond body\n");
    write(&content.join("posts/a-first.md"), "---\ntitle: First\nslug: first\n---\nfirst body\n");
    write(&content.join("posts/notes.txt"), "not markdown");
    write(&content.join("pages/about.md"), "---\ntitle: About\ntags:\n  - '#searchable'\n---\nabout body\n");

    let docs = load_markdown_tree(content).unwrap();
    let titles: Vec<&str> = docs.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second", "About"]);
    assert_eq!(docs[0].url, "first");
    assert_eq!(docs[1].url, "b-second");
    assert!(docs[2].is_page);
    assert!(docs[2].tags.contains("#searchable"));
    assert_eq!(docs[0].body, "first body\n");
}

#[test]
fn malformed_front_matter_skips_only_that_document() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("posts/good.md"), "---\ntitle: Good\n---\nbody\n");
    write(&dir.path().join("posts/bad.md"), "---\ntitle: [broken\n---\nbody\n");
    write(&dir.path().join("posts/none.md"), "no front matter at all\n");
    fs::create_dir(dir.path().join("pages")).unwrap();

    let docs = load_markdown_tree(dir.path()).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].title, "Good");
}

#[test]
fn missing_content_directories_abort() {
    let dir = tempdir().unwrap();
    let err = load_markdown_tree(&dir.path().join("contnet")).unwrap_err();
    assert!(matches!(err, SourceError::Io { ref source, .. } if source.kind() == io::ErrorKind::NotFound));

    fs::create_dir(dir.path().join("posts")).unwrap();
    let err = load_markdown_tree(dir.path()).unwrap_err();
    assert!(matches!(err, SourceError::Io { ref path, .. } if path.ends_with("pages")));

    fs::create_dir(dir.path().join("pages")).unwrap();
    assert!(load_markdown_tree(dir.path()).unwrap().is_empty());
}

#[cfg(unix)]
#[test]
fn symlinked_sources_are_followed() {
    use std::os::unix::fs::symlink;

    let dir = tempdir().unwrap();
    write(&dir.path().join("shared/post.md"), "---\ntitle: Shared\n---\nlinked body\n");
    write(&dir.path().join("shared/doc.json"), r#"{"title": "Linked", "slug": "linked"}"#);
    fs::create_dir_all(dir.path().join("content/posts")).unwrap();
    fs::create_dir_all(dir.path().join("content/pages")).unwrap();
    fs::create_dir_all(dir.path().join("exports")).unwrap();
    symlink(dir.path().join("shared/post.md"), dir.path().join("content/posts/linked.md")).unwrap();
    symlink(dir.path().join("shared/doc.json"), dir.path().join("exports/doc.json")).unwrap();

    let docs = load_markdown_tree(&dir.path().join("content")).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].title, "Shared");
    assert_eq!(docs[0].url, "linked");

    let docs = load_json_inputs(&dir.path().join("exports")).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].title, "Linked");
}

#[test]
fn json_and_jsonl_inputs() {
    let dir = tempdir().unwrap();
    write(
        &dir.path().join("a.json"),
        r##"[{"title": "Post", "slug": "post", "html": "<p>words</p>"},
            {"title": "Page", "url": "/page", "body": "text", "page": true, "tags": [{"name": "#searchable"}]},
            {"slug": "untitled"}]"##,
    );
    write(&dir.path().join("b.jsonl"), "{\"title\": \"Line\", \"slug\": \"line\"}\n\n");

    let docs = load_json_inputs(dir.path()).unwrap();
    let titles: Vec<&str> = docs.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["Post", "Page", "Line"]);
    assert_eq!(docs[0].format, Extractor::Html);
    assert_eq!(docs[1].format, Extractor::Markdown);
    assert_eq!(docs[1].url, "/page");
    assert!(docs[1].is_page);
}

#[test]
fn unreadable_input_aborts() {
    let dir = tempdir().unwrap();
    let err = load_json_inputs(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, SourceError::Io { .. }));
}

#[test]
fn corrupt_json_file_aborts() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("broken.jsonl"), "{\"title\": \"ok\", \"slug\": \"ok\"}\n{not json\n");
    let err = load_json_inputs(dir.path()).unwrap_err();
    assert!(matches!(err, SourceError::Parse { .. }));
}

#[test]
fn artifact_write_replaces_atomically() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("public/data/search.bin");
    write_artifact(&path, b"first").unwrap();
    write_artifact(&path, b"second").unwrap();
    assert_eq!(read_artifact(&path).unwrap(), b"second");

    let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap()).unwrap().collect();
    assert_eq!(leftovers.len(), 1);
}

#[test]
fn stop_word_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stop-words");
    assert!(load_stop_words(&path).is_err());
    assert!(load_optional_stop_words(&path).unwrap().is_empty());

    write(&path, "# comment\nthe\n\nand\n");
    let words = load_stop_words(&path).unwrap();
    assert_eq!(words.len(), 2);
    assert!(words.contains("the"));
}
