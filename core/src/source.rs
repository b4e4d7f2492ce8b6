//! Document sources feeding the compiler.
//!
//! Two layouts are understood: a content tree of markdown files with YAML front matter, and
//! JSON/JSONL exports of posts and pages with HTML or markdown bodies. Read failures are fatal.
//! A document whose metadata cannot be understood is skipped with a warning.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::SourceError;
use crate::extract::Extractor;

/// One post or page as delivered by a source, before tag filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub is_page: bool,
    pub title: String,
    pub url: String,
    pub tags: BTreeSet<String>,
    pub body: String,
    pub format: Extractor,
}

#[derive(Debug, Deserialize)]
struct FrontMatter {
    title: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct InputDoc {
    title: Option<String>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    tags: Vec<InputTag>,
    #[serde(default)]
    page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InputTag {
    Name(String),
    Object { name: String },
}

impl InputTag {
    fn into_name(self) -> String {
        match self {
            InputTag::Name(name) | InputTag::Object { name } => name,
        }
    }
}

/// Split a leading `---` delimited block from `source`.
///
/// Returns the front matter (without delimiters) and the remaining body. An unterminated
/// block is treated as no front matter at all.
pub fn split_front_matter(source: &str) -> (Option<&str>, &str) {
    let mut lines = source.split_inclusive('\n');
    let start = match lines.next() {
        Some(first) if first.trim() == "---" => first.len(),
        _ => return (None, source),
    };
    let mut offset = start;
    for line in lines {
        if line.trim() == "---" {
            return (Some(&source[start..offset]), &source[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, source)
}

/// Parse one markdown file. `stem` is the url used when the front matter has no `slug`.
pub fn parse_markdown_document(
    origin: &str,
    stem: &str,
    is_page: bool,
    source: &str,
) -> Result<SourceDocument, SourceError> {
    let (front_matter, body) = split_front_matter(source);
    let front_matter = front_matter.ok_or_else(|| SourceError::metadata(origin, "missing front matter"))?;
    let meta: FrontMatter =
        serde_yaml::from_str(front_matter).map_err(|err| SourceError::metadata(origin, err))?;
    Ok(SourceDocument {
        is_page,
        title: meta.title,
        url: meta.slug.unwrap_or_else(|| stem.to_string()),
        tags: meta.tags.into_iter().collect(),
        body: body.to_string(),
        format: Extractor::Markdown,
    })
}

/// Load `<content>/posts/*.md` then `<content>/pages/*.md`, each sorted by file name.
///
/// Both directories must exist; an empty one is fine.
pub fn load_markdown_tree(content: &Path) -> Result<Vec<SourceDocument>, SourceError> {
    require_dir(content)?;
    let mut documents = Vec::new();
    for (resource, is_page) in [("posts", false), ("pages", true)] {
        let dir = content.join(resource);
        require_dir(&dir)?;
        for path in sorted_files(&dir, 1, &["md"])? {
            let source = fs::read_to_string(&path).map_err(|err| SourceError::io(&path, err))?;
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            let origin = path.display().to_string();
            match parse_markdown_document(&origin, stem, is_page, &source) {
                Ok(doc) => documents.push(doc),
                Err(err @ SourceError::Metadata { .. }) => tracing::warn!(%err, "skipping document"),
                Err(err) => return Err(err),
            }
        }
    }
    Ok(documents)
}

fn require_dir(dir: &Path) -> Result<(), SourceError> {
    if dir.is_dir() {
        return Ok(());
    }
    let err = io::Error::new(io::ErrorKind::NotFound, "content directory not found");
    Err(SourceError::io(dir, err))
}

/// Load JSON (one record or an array) and JSONL (one record per line) exports.
///
/// `input` may be a single file or a directory, which is searched recursively in file name
/// order for `.json` and `.jsonl` files.
pub fn load_json_inputs(input: &Path) -> Result<Vec<SourceDocument>, SourceError> {
    let files = if input.is_dir() {
        sorted_files(input, usize::MAX, &["json", "jsonl"])?
    } else {
        vec![input.to_path_buf()]
    };

    let mut documents = Vec::new();
    for file in files {
        let text = fs::read_to_string(&file).map_err(|err| SourceError::io(&file, err))?;
        let records = if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            parse_jsonl(&file, &text)?
        } else {
            parse_json(&file, &text)?
        };
        for (n, record) in records.into_iter().enumerate() {
            let origin = format!("{} record {}", file.display(), n + 1);
            match document_from_record(&origin, record) {
                Ok(doc) => documents.push(doc),
                Err(err) => tracing::warn!(%err, "skipping document"),
            }
        }
    }
    Ok(documents)
}

fn parse_json(file: &Path, text: &str) -> Result<Vec<serde_json::Value>, SourceError> {
    match serde_json::from_str(text) {
        Ok(serde_json::Value::Array(records)) => Ok(records),
        Ok(record) => Ok(vec![record]),
        Err(err) => Err(SourceError::Parse { path: file.to_path_buf(), message: err.to_string() }),
    }
}

fn parse_jsonl(file: &Path, text: &str) -> Result<Vec<serde_json::Value>, SourceError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line).map_err(|err| SourceError::Parse {
                path: file.to_path_buf(),
                message: format!("line {}: {err}", n + 1),
            })
        })
        .collect()
}

fn document_from_record(origin: &str, record: serde_json::Value) -> Result<SourceDocument, SourceError> {
    let doc: InputDoc = serde_json::from_value(record).map_err(|err| SourceError::metadata(origin, err))?;
    let title = doc.title.ok_or_else(|| SourceError::metadata(origin, "missing title"))?;
    let url = doc.slug.or(doc.url).ok_or_else(|| SourceError::metadata(origin, "missing slug or url"))?;
    let (body, format) = match (doc.html, doc.body) {
        (Some(html), _) => (html, Extractor::Html),
        (None, Some(body)) => (body, Extractor::Markdown),
        (None, None) => (String::new(), Extractor::Markdown),
    };
    Ok(SourceDocument {
        is_page: doc.page,
        title,
        url,
        tags: doc.tags.into_iter().map(InputTag::into_name).collect(),
        body,
        format,
    })
}

fn sorted_files(dir: &Path, max_depth: usize, extensions: &[&str]) -> Result<Vec<PathBuf>, SourceError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).max_depth(max_depth).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|err| SourceError::io(dir, err.into()))?;
        let path = entry.path();
        let matches = path.extension().and_then(|s| s.to_str()).is_some_and(|ext| extensions.contains(&ext));
        if entry.file_type().is_file() && matches {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}
