use chrono::{DateTime, Datelike, Local};
use itertools::Itertools;
use pulldown_cmark::{Event, Parser, Tag, TagEnd, TextMergeStream};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tap::prelude::*;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

pub const MARKDOWN_EXTENSION: &str = "md";

#[derive(Error, Debug)]
pub enum GetMarkdownFilesError {
    #[error("Not a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("Failed to walk {0:?}: {1}")]
    Walk(PathBuf, walkdir::Error),
}

pub fn has_markdown_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == MARKDOWN_EXTENSION)
        .unwrap_or(false)
}

/// Recursively collects every file under `root` whose extension is exactly `.md`.
///
/// Entries are visited depth first in file name order. Symlinked directories are not
/// descended into, but a symlink that resolves to a file counts as a post.
pub fn get_markdown_files_recursive(root: &Path) -> Result<Vec<PathBuf>, GetMarkdownFilesError> {
    // A missing root surfaces from the walk itself as NotFound
    if root.exists() && !root.is_dir() {
        return Err(GetMarkdownFilesError::NotADirectory(root.to_owned()));
    }

    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .map_ok(DirEntry::into_path)
        .filter_ok(|path| has_markdown_extension(path) && path.is_file())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| GetMarkdownFilesError::Walk(root.to_owned(), e))
}

pub fn read_file_bytes(path: &Path) -> std::io::Result<Vec<u8>> {
    fs::read(path)
}

pub fn read_file_content(path: &Path) -> Option<String> {
    read_file_bytes(path)
        .ok()?
        .pipe(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .pipe(Some)
}

pub fn parse_markdown_file<'a>(content: &'a str) -> Vec<Event<'a>> {
    let parser = Parser::new(content);

    TextMergeStream::new(parser).collect_vec()
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractFirstHeadingError {
    #[error("No heading found in markdown content")]
    NoHeadingFound,

    #[error("Heading was never closed")]
    UnterminatedHeading,
}

/// Returns the text of the first heading of any level.
///
/// Inline code inside the heading contributes its content, other inline markup is dropped
/// but its text is kept.
pub fn extract_first_heading_text(events: &[Event<'_>]) -> Result<String, ExtractFirstHeadingError> {
    let start = events
        .iter()
        .position(|event| matches!(event, Event::Start(Tag::Heading { .. })))
        .ok_or(ExtractFirstHeadingError::NoHeadingFound)?;

    let mut mut_text = String::new();

    for event in &events[start + 1..] {
        match event {
            Event::End(TagEnd::Heading(_)) => return Ok(mut_text.trim().to_owned()),
            Event::Text(cow_str) | Event::Code(cow_str) => mut_text.push_str(cow_str),
            Event::SoftBreak | Event::HardBreak => mut_text += " ",
            _ => continue,
        }
    }

    Err(ExtractFirstHeadingError::UnterminatedHeading)
}

pub fn extract_first_heading_text_from_content(
    content: &str,
) -> Result<String, ExtractFirstHeadingError> {
    let events = parse_markdown_file(content);

    extract_first_heading_text(&events)
}

pub fn file_stem_string(path: &Path) -> Option<String> {
    path.file_stem()?.to_string_lossy().into_owned().pipe(Some)
}

pub fn file_name_string(path: &Path) -> Option<String> {
    path.file_name()?.to_string_lossy().into_owned().pipe(Some)
}

/// Local creation date of a file, or its modification date where the platform has no
/// creation time.
pub fn get_file_creation_date(path: &Path) -> std::io::Result<DateTime<Local>> {
    let metadata = fs::metadata(path)?;

    let system_time = match metadata.created() {
        Ok(created) => created,
        Err(e) => {
            log::debug!("No creation time for {path:?} ({e}), using modification time");
            metadata.modified()?
        }
    };

    Ok(DateTime::<Local>::from(system_time))
}

pub fn get_file_creation_month_day(path: &Path) -> std::io::Result<(u32, u32)> {
    let date = get_file_creation_date(path)?;

    Ok((date.month(), date.day()))
}
