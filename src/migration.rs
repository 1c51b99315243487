use chrono::NaiveDate;
use itertools::Itertools;
use std::{
    io::Write,
    path::{Path, PathBuf},
};
use tap::prelude::*;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::{
    common::{self, ExtractFirstHeadingError, GetMarkdownFilesError},
    config::MigrationConfig,
    prompt::{PromptError, Prompter},
};

pub const MONTHS_IN_YEAR: u32 = 12;

/// A markdown post as found in the source tree. Never written to.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub content: Vec<u8>,
    pub res_heading: Result<String, ExtractFirstHeadingError>,
}

impl SourceDocument {
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = common::read_file_bytes(path)?;

        let res_heading = String::from_utf8_lossy(&content)
            .pipe(|text| common::extract_first_heading_text_from_content(&text));

        if let Err(e) = &res_heading {
            log::warn!("{e} in {path:?}, falling back to the file name as the title");
        }

        Ok(Self {
            path: path.to_owned(),
            content,
            res_heading,
        })
    }

    /// The first heading, or the file stem when the post has none.
    pub fn default_title(&self) -> String {
        match &self.res_heading {
            Ok(heading) => heading.clone(),
            Err(_) => common::file_stem_string(&self.path).unwrap_or_default(),
        }
    }
}

/// Everything the operator told us about one post.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationRecord {
    pub title: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub tags: Vec<String>,
    pub description: String,
}

#[derive(Error, Debug)]
pub enum CollectMigrationRecordError {
    #[error("Prompt failed: {0}")]
    Prompt(#[from] PromptError),

    #[error("Could not read the creation date of {0:?}: {1:?}")]
    CreationDate(PathBuf, std::io::Error),
}

/// Reads tags one per line until an empty line, then echoes what was collected.
///
/// Tags keep their entry order and are trimmed. A line of only whitespace adds an empty tag.
pub fn collect_tags(prompter: &mut impl Prompter) -> Result<Vec<String>, PromptError> {
    let mut mut_tags: Vec<String> = vec![];

    loop {
        let answer = prompter.prompt_no_default("tag")?;

        if answer.is_empty() {
            prompter.say(&format!("Tags: {mut_tags:?}"))?;

            return Ok(mut_tags);
        }

        mut_tags.push(answer.trim().to_owned());
    }
}

/// Asks for title, date, tags and description, offering `default_month_day` for the date.
pub fn collect_migration_record_with_date(
    prompter: &mut impl Prompter,
    config: &MigrationConfig,
    source: &SourceDocument,
    default_month_day: (u32, u32),
) -> Result<MigrationRecord, PromptError> {
    let title = prompter.prompt("Title", &source.default_title())?;

    let (default_month, default_day) = default_month_day;

    let month = prompter.prompt_parsed("Month", default_month, |month| {
        (1..=MONTHS_IN_YEAR).contains(month)
    })?;

    let day = prompter.prompt_parsed("Day", default_day, |day| {
        NaiveDate::from_ymd_opt(config.default_year, month, *day).is_some()
    })?;

    let tags = collect_tags(prompter)?;

    let description = prompter.prompt_no_default("Description")?;

    Ok(MigrationRecord {
        title,
        year: config.default_year,
        month,
        day,
        tags,
        description,
    })
}

/// Asks whether to migrate `source` and, if so, collects its record.
///
/// Returns `None` when the operator declines; nothing further is asked in that case.
pub fn collect_migration_record(
    prompter: &mut impl Prompter,
    config: &MigrationConfig,
    source: &SourceDocument,
) -> Result<Option<MigrationRecord>, CollectMigrationRecordError> {
    let load = prompter.confirm(&format!("Load {}?", source.default_title()))?;

    if !load {
        return Ok(None);
    }

    let default_month_day = common::get_file_creation_month_day(&source.path)
        .map_err(|e| CollectMigrationRecordError::CreationDate(source.path.clone(), e))?;

    collect_migration_record_with_date(prompter, config, source, default_month_day)?
        .pipe(Some)
        .pipe(Ok)
}

pub fn render_metadata_lines(record: &MigrationRecord, author: &str) -> Vec<String> {
    vec![
        "%{".to_owned(),
        format!("\ttitle: \"{}\",", record.title),
        format!("\tauthor: \"{author}\","),
        format!("\ttags: ~w({}),", record.tags.iter().join(",")),
        format!("\tdescription: \"{}\"", record.description),
        "}".to_owned(),
        "---".to_owned(),
    ]
}

/// The metadata block with every line newline terminated.
pub fn render_metadata_block(record: &MigrationRecord, author: &str) -> String {
    render_metadata_lines(record, author)
        .into_iter()
        .map(|line| line + "\n")
        .collect::<String>()
}

#[derive(Error, Debug)]
pub enum WriteOutputDocumentError {
    #[error("Source has no file name: {0:?}")]
    NoFileName(PathBuf),

    #[error("Destination already exists and overwriting is off: {0:?}")]
    DestinationExists(PathBuf),

    #[error("Got IO Error {0:?}")]
    Io(#[from] std::io::Error),

    #[error("Failed to move the written post into place: {0:?}")]
    Persist(#[from] tempfile::PersistError),
}

/// `<output_root>/<year>/<MM>-<DD>-<source file name>`
pub fn destination_path(
    config: &MigrationConfig,
    record: &MigrationRecord,
    source_path: &Path,
) -> Result<PathBuf, WriteOutputDocumentError> {
    let file_name = common::file_name_string(source_path)
        .ok_or_else(|| WriteOutputDocumentError::NoFileName(source_path.to_owned()))?;

    let out = config
        .output_root
        .join(record.year.to_string())
        .join(format!("{:02}-{:02}-{file_name}", record.month, record.day));

    Ok(out)
}

/// Regular file mode before the umask, as a plain create would use.
#[cfg(unix)]
pub const NEW_POST_MODE: u32 = 0o666;

/// Opens the temp file a post is written into. It gets the mode of the post it replaces, or
/// the mode of a freshly created file, instead of tempfile's owner-only default.
#[cfg(unix)]
fn stage_output_file(parent: &Path, destination: &Path) -> std::io::Result<NamedTempFile> {
    use std::{fs::Permissions, os::unix::fs::PermissionsExt};

    let staged = tempfile::Builder::new()
        .permissions(Permissions::from_mode(NEW_POST_MODE))
        .tempfile_in(parent)?;

    if let Ok(metadata) = std::fs::metadata(destination) {
        staged.as_file().set_permissions(metadata.permissions())?;
    }

    Ok(staged)
}

#[cfg(not(unix))]
fn stage_output_file(parent: &Path, _destination: &Path) -> std::io::Result<NamedTempFile> {
    NamedTempFile::new_in(parent)
}

/// Writes the metadata block followed by the untouched source content.
///
/// The post is staged in a temporary file next to the destination and moved into place
/// once complete, so an interrupted run leaves either the old file or the new one.
pub fn write_output_document(
    config: &MigrationConfig,
    record: &MigrationRecord,
    source: &SourceDocument,
) -> Result<PathBuf, WriteOutputDocumentError> {
    let destination = destination_path(config, record, &source.path)?;

    let parent = destination
        .parent()
        .ok_or_else(|| WriteOutputDocumentError::NoFileName(destination.clone()))?;

    std::fs::create_dir_all(parent)?;

    if !config.overwrite && destination.exists() {
        return Err(WriteOutputDocumentError::DestinationExists(destination));
    }

    let mut mut_staged = stage_output_file(parent, &destination)?;

    mut_staged.write_all(render_metadata_block(record, &config.author).as_bytes())?;
    mut_staged.write_all(&source.content)?;
    mut_staged.flush()?;

    if config.overwrite {
        mut_staged.persist(&destination)?;
    } else {
        mut_staged.persist_noclobber(&destination)?;
    }

    log::debug!("Wrote {destination:?}");

    Ok(destination)
}

/// Snapshot of the posts already in the output tree, shown to the operator at start.
#[derive(Debug, Clone, Default)]
pub struct ExistingOutputIndex {
    pub paths: Vec<PathBuf>,
}

impl ExistingOutputIndex {
    pub fn from_output_root(output_root: &Path) -> Result<Self, GetMarkdownFilesError> {
        if !output_root.exists() {
            log::debug!("Output root {output_root:?} does not exist yet");

            return Ok(Self::default());
        }

        Ok(Self {
            paths: common::get_markdown_files_recursive(output_root)?,
        })
    }

    /// Whether some existing post's name ends with `file_name`, as dated posts do.
    pub fn contains_file_name(&self, file_name: &str) -> bool {
        self.paths.iter().any(|path| {
            common::file_name_string(path)
                .map(|name| name.ends_with(file_name))
                .unwrap_or(false)
        })
    }

    pub fn display_paths(&self) -> String {
        format!(
            "[{}]",
            self.paths.iter().map(|path| format!("{path:?}")).join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MigrationOutcome {
    Declined,
    Written(PathBuf),
}

#[derive(Error, Debug)]
pub enum MigrateSourceDocumentError {
    #[error("Could not read source {0:?}: {1:?}")]
    ReadSource(PathBuf, std::io::Error),

    #[error("Collecting metadata failed: {0}")]
    Collect(#[from] CollectMigrationRecordError),

    #[error("Writing the post failed: {0}")]
    Write(#[from] WriteOutputDocumentError),
}

impl MigrateSourceDocumentError {
    /// The operator went away, so there is no point asking about further posts.
    pub fn is_end_of_input(&self) -> bool {
        matches!(
            self,
            MigrateSourceDocumentError::Collect(CollectMigrationRecordError::Prompt(
                PromptError::EndOfInput(_)
            ))
        )
    }
}

/// Runs the whole interactive sequence for one source post.
pub fn migrate_source_document(
    prompter: &mut impl Prompter,
    config: &MigrationConfig,
    path: &Path,
) -> Result<MigrationOutcome, MigrateSourceDocumentError> {
    let source = SourceDocument::load(path)
        .map_err(|e| MigrateSourceDocumentError::ReadSource(path.to_owned(), e))?;

    let Some(record) = collect_migration_record(prompter, config, &source)? else {
        log::debug!("Declined {path:?}");

        return Ok(MigrationOutcome::Declined);
    };

    let destination = write_output_document(config, &record, &source)?;

    Ok(MigrationOutcome::Written(destination))
}
