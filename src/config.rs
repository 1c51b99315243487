use std::path::{Path, PathBuf};

pub const DEFAULT_AUTHOR: &str = "Annabelle Adelaide";
pub const DEFAULT_YEAR: i32 = 2025;
pub const DEFAULT_OUTPUT_ROOT: &str = "../posts/";

/// Settings fixed for a whole migration run.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationConfig {
    /// Written verbatim into every metadata block.
    pub author: String,

    /// Year of every migrated post. It is neither prompted for nor derived from the file.
    pub default_year: i32,

    /// Posts land in `<output_root>/<year>/`.
    pub output_root: PathBuf,

    /// Replace an existing destination file instead of failing that post.
    pub overwrite: bool,

    /// Abort the batch on the first failed post instead of moving on.
    pub fail_fast: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            author: DEFAULT_AUTHOR.to_owned(),
            default_year: DEFAULT_YEAR,
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            overwrite: true,
            fail_fast: false,
        }
    }
}

impl MigrationConfig {
    pub fn with_output_root(mut self, output_root: &Path) -> Self {
        self.output_root = output_root.to_owned();
        self
    }
}
