//! Command-line and merge configuration
//!
//! Options come from CLI arguments, with `LABELDB_*` environment variables
//! as fallbacks for the switches that make sense to set once per shell.
//!
//! # Example
//!
//! ```no_run
//! use labeldb::{Cli, Command};
//!
//! let cli = Cli::from_args();
//! if let Command::Merge { db, images, .. } = &cli.command {
//!     println!("Merging {} images into {}", images.len(), db.display());
//! }
//! ```

use crate::{LabelError, Result};
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Analogue 3D label database tool
#[derive(Debug, Clone, Parser)]
#[command(
    name = "labeldb",
    about = "Merge custom cartridge labels into an Analogue 3D labels.db",
    version
)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true, env = "LABELDB_VERBOSE")]
    pub verbose: bool,

    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// Operations on a label database
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Add or replace labels; each image file is named after its signature
    Merge {
        /// Database file to update
        db: PathBuf,

        /// Images named `<hex signature>.<ext>`
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Copy the database to `<DB>.bak` before writing
        #[arg(long, env = "LABELDB_BACKUP")]
        backup: bool,

        /// Merge and report without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Print every signature in the database
    List {
        /// Database file to read
        db: PathBuf,
    },

    /// Write the label stored for a signature to an image file
    Export {
        /// Database file to read
        db: PathBuf,

        /// Signature in hex, with or without `0x`
        signature: String,

        /// Output image; the format follows the extension
        out: PathBuf,
    },

    /// Create an empty database
    Init {
        /// Database file to create
        db: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse configuration from an explicit argument list.
    pub fn try_from_iter<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(|e| LabelError::Config(e.to_string()))
    }

    /// Default log filter when `RUST_LOG` is unset
    #[must_use]
    pub const fn default_log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

/// Inputs to a merge run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Database file to update
    pub database: PathBuf,
    /// Image files to merge in
    pub images: Vec<PathBuf>,
    /// Copy the database aside before writing
    pub backup: bool,
    /// Skip writing
    pub dry_run: bool,
}

impl MergeOptions {
    /// Create options for `database` with no images
    pub fn new(database: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }

    /// Set the images to merge
    #[must_use]
    pub fn with_images<I, P>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.images = images.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable the backup copy
    #[must_use]
    pub const fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    /// Enable or disable dry-run mode
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Where the backup copy goes: the database path with `.bak` appended
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.database.clone().into_os_string();
        name.push(".bak");
        PathBuf::from(name)
    }

    /// Validate options.
    ///
    /// # Errors
    ///
    /// Returns `LabelError::Config` if:
    /// - The database file doesn't exist
    /// - No images are given
    /// - An image file doesn't exist
    pub fn validate(&self) -> Result<()> {
        if !self.database.is_file() {
            return Err(LabelError::Config(format!(
                "database not found: {}",
                self.database.display()
            )));
        }

        if self.images.is_empty() {
            return Err(LabelError::Config("no images to merge".to_string()));
        }

        if let Some(missing) = self.images.iter().find(|path| !path.is_file()) {
            return Err(LabelError::Config(format!(
                "image not found: {}",
                missing.display()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_merge() {
        let cli = Cli::try_from_iter([
            "labeldb",
            "merge",
            "labels.db",
            "a/00000001.png",
            "b/00000002.png",
            "--backup",
        ])
        .unwrap();

        assert!(!cli.verbose);
        let Command::Merge {
            db,
            images,
            backup,
            dry_run,
        } = cli.command
        else {
            panic!("expected merge command");
        };
        assert_eq!(db, PathBuf::from("labels.db"));
        assert_eq!(images.len(), 2);
        assert!(backup);
        assert!(!dry_run);
    }

    #[test]
    fn test_merge_requires_images() {
        let err = Cli::try_from_iter(["labeldb", "merge", "labels.db"]).unwrap_err();
        assert!(matches!(err, LabelError::Config(_)));
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_from_iter(["labeldb", "list", "labels.db", "-v"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.default_log_level(), "debug");
        assert!(matches!(cli.command, Command::List { .. }));
    }

    #[test]
    fn test_parse_export_and_init() {
        let cli = Cli::try_from_iter(["labeldb", "export", "labels.db", "0x3274BDAF", "out.png"])
            .unwrap();
        assert!(
            matches!(cli.command, Command::Export { ref signature, .. } if signature == "0x3274BDAF")
        );

        let cli = Cli::try_from_iter(["labeldb", "init", "new.db", "--force"]).unwrap();
        assert!(matches!(cli.command, Command::Init { force: true, .. }));
    }

    #[test]
    fn test_backup_path_appends_suffix() {
        let options = MergeOptions::new("/sd/Library/N64/Images/labels.db");
        assert_eq!(
            options.backup_path(),
            PathBuf::from("/sd/Library/N64/Images/labels.db.bak")
        );
    }

    #[test]
    fn test_validate() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("labels.db");
        let image = dir.path().join("00000001.png");

        let options = MergeOptions::new(&db).with_images([&image]);
        assert!(matches!(options.validate(), Err(LabelError::Config(_))));

        std::fs::write(&db, b"").unwrap();
        assert!(options.validate().is_err());

        std::fs::write(&image, b"").unwrap();
        options.validate().unwrap();

        let options = MergeOptions::new(&db);
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("no images"));
    }

    #[test]
    fn test_builder() {
        let options = MergeOptions::new("labels.db")
            .with_images(["00000001.png"])
            .with_backup(true)
            .with_dry_run(true);
        assert_eq!(options.images, vec![PathBuf::from("00000001.png")]);
        assert!(options.backup);
        assert!(options.dry_run);
    }
}
