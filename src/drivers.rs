use log::LevelFilter;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::{
    common::{self, GetMarkdownFilesError},
    config::MigrationConfig,
    migration::{self, ExistingOutputIndex, MigrateSourceDocumentError, MigrationOutcome},
    prompt::{PromptError, Prompter},
};

pub fn init_logging_with_level(level: LevelFilter) {
    env_logger::builder()
        .filter_level(level)
        .try_init()
        .map_err(|e| e.to_string())
        .expect("Failed to initialize logger");
}

/// What happened to each post of a batch.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchSummary {
    pub written: Vec<PathBuf>,
    pub declined: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

impl BatchSummary {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

#[derive(Error, Debug)]
pub enum MigratePostsError {
    #[error("Failed to list source posts: {0}")]
    SourceDir(GetMarkdownFilesError),

    #[error("Failed to list existing posts: {0}")]
    OutputDir(GetMarkdownFilesError),

    #[error("Failed to talk to the operator: {0}")]
    Prompt(#[from] PromptError),

    #[error("Stopped at {0:?}: {1}")]
    Aborted(PathBuf, MigrateSourceDocumentError),
}

/// Walks `source_dir` and migrates every markdown post in it, one at a time.
///
/// A failed post is logged and the batch moves on, unless `config.fail_fast` is set. Running
/// out of operator input always ends the batch.
pub fn migrate_posts_in_dir(
    prompter: &mut impl Prompter,
    config: &MigrationConfig,
    source_dir: &Path,
) -> Result<BatchSummary, MigratePostsError> {
    let existing = ExistingOutputIndex::from_output_root(&config.output_root)
        .map_err(MigratePostsError::OutputDir)?;

    prompter.say(&format!("Existing posts: {}", existing.display_paths()))?;

    let posts =
        common::get_markdown_files_recursive(source_dir).map_err(MigratePostsError::SourceDir)?;

    log::info!("Found {} posts in {source_dir:?}", posts.len());

    let mut mut_summary = BatchSummary::default();

    for post in posts {
        prompter.say(&format!("Loading post: {}", post.display()))?;

        let already_in_output = common::file_name_string(&post)
            .map(|file_name| existing.contains_file_name(&file_name))
            .unwrap_or(false);

        if already_in_output {
            log::warn!("{post:?} looks like it was already migrated");
        }

        match migration::migrate_source_document(prompter, config, &post) {
            Ok(MigrationOutcome::Written(destination)) => {
                log::info!("Migrated {post:?} to {destination:?}");
                mut_summary.written.push(post);
            }
            Ok(MigrationOutcome::Declined) => mut_summary.declined.push(post),
            Err(e) if e.is_end_of_input() || config.fail_fast => {
                return Err(MigratePostsError::Aborted(post, e));
            }
            Err(e) => {
                log::error!("Failed to migrate {post:?}: {e}");
                mut_summary.failed.push(post);
            }
        }
    }

    log::info!(
        "Done: {} written, {} declined, {} failed",
        mut_summary.written.len(),
        mut_summary.declined.len(),
        mut_summary.failed.len()
    );

    Ok(mut_summary)
}
