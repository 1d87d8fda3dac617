//! Operations behind the `labeldb` subcommands

use crate::config::{Command, MergeOptions};
use crate::database::LabelDatabase;
use crate::encoder::PixelEncoder;
use crate::merge::MergeStats;
use crate::pending::PendingSet;
use crate::{LabelError, Result};
use labeldb_formats::{LabelsHeader, Signature};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Run a parsed subcommand, printing its results to stdout
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Merge {
            db,
            images,
            backup,
            dry_run,
        } => {
            let options = MergeOptions::new(db)
                .with_images(images)
                .with_backup(backup)
                .with_dry_run(dry_run);
            let stats = merge(&options)?;
            println!(
                "{} inserted, {} replaced, {} kept ({} total){}",
                stats.inserted,
                stats.replaced,
                stats.kept,
                stats.total(),
                if options.dry_run { " [dry run]" } else { "" }
            );
        }
        Command::List { db } => {
            let header = header(&db)?;
            println!("{} ({})", header.database_name(), header.vendor_name());
            let signatures = list(&db)?;
            for signature in &signatures {
                println!("{signature}");
            }
            println!("{} labels", signatures.len());
        }
        Command::Export { db, signature, out } => {
            let signature: Signature = signature.parse()?;
            export(&db, signature, &out)?;
            println!("Wrote {signature} to {}", out.display());
        }
        Command::Init { db, force } => {
            init(&db, force)?;
            println!("Created {}", db.display());
        }
    }
    Ok(())
}

/// Merge image files into a database
///
/// Every image name is checked before the database is opened, and every
/// image is decoded before anything is written.
pub fn merge(options: &MergeOptions) -> Result<MergeStats> {
    options.validate()?;
    let pending = PendingSet::from_paths(&options.images)?;

    if options.backup && !options.dry_run {
        let backup = options.backup_path();
        fs::copy(&options.database, &backup).map_err(|e| LabelError::file(&backup, e))?;
        info!("Backed up database to {}", backup.display());
    }

    let mut encoder = PixelEncoder::new();
    if options.dry_run {
        let mut db = LabelDatabase::open_read_only(&options.database)?;
        let merged = db.plan(&pending, &mut encoder)?;
        info!(
            "Dry run: would write {} images to {}",
            merged.entries.len(),
            options.database.display()
        );
        return Ok(merged.stats);
    }

    let mut db = LabelDatabase::open(&options.database)?;
    let merged = db.plan(&pending, &mut encoder)?;
    info!(
        "Writing {} images to {}",
        merged.entries.len(),
        options.database.display()
    );
    db.store(&merged.entries)?;
    Ok(merged.stats)
}

/// Read the signatures of a database in index order
pub fn list(db: &Path) -> Result<Vec<Signature>> {
    let mut db = LabelDatabase::open_read_only(db)?;
    Ok(db.signatures()?.into_signatures())
}

/// Read the header of a database, warning if it does not look like a labels file
pub fn header(db: &Path) -> Result<LabelsHeader> {
    let header = LabelDatabase::open_read_only(db)?.header()?;
    if !header.is_labels_database() {
        warn!(
            "{} does not identify as a labels database (found {:?})",
            db.display(),
            header.database_name()
        );
    }
    Ok(header)
}

/// Decode the label stored for `signature` into an image file
pub fn export(db: &Path, signature: Signature, out: &Path) -> Result<()> {
    let mut database = LabelDatabase::open_read_only(db)?;
    let block = database.block(signature)?;
    let image = PixelEncoder::new().decode_block(&block)?;
    image.save(out)?;
    info!("Exported {signature} from {}", db.display());
    Ok(())
}

/// Create an empty database, refusing to replace an existing file unless forced
pub fn init(db: &Path, force: bool) -> Result<()> {
    if db.exists() {
        if !force {
            return Err(LabelError::Config(format!(
                "{} already exists (use --force to overwrite)",
                db.display()
            )));
        }
        warn!("Overwriting {}", db.display());
    }
    LabelDatabase::create(db, force)?;
    Ok(())
}
