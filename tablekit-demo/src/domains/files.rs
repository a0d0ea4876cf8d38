//! Directory listing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::{debug, warn};
use tablekit::{Alignment, Column, FieldDescriptor, Table, TableContainer};
use thiserror::Error;

use crate::console::{Console, SharedIo};
use crate::dialog::{ConsoleConfirm, ConsoleDialog, FormField, MemoryClipboard};
use crate::paths;
use crate::render::RenderOptions;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot expand '~': no home directory")]
    NoHome,

    #[error("cannot read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub folder: String,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

/// Expand a leading `~` to the home directory.
pub fn expand_path(path: &str) -> Result<PathBuf, SourceError> {
    match path.strip_prefix('~') {
        Some(rest) => {
            let home = paths::home_dir().ok_or(SourceError::NoHome)?;
            Ok(home.join(rest.trim_start_matches(['/', '\\'])))
        }
        None => Ok(PathBuf::from(path)),
    }
}

/// List a directory, sorted by name.
///
/// Entries whose metadata cannot be read are skipped.
pub fn files_from(folder: &str) -> Result<Vec<FileEntry>, SourceError> {
    let path = expand_path(folder)?;
    list(&path)
}

fn list(path: &Path) -> Result<Vec<FileEntry>, SourceError> {
    let io_error = |source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    };
    let folder = path.display().to_string();

    let mut files = Vec::new();
    for entry in fs::read_dir(path).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("skipping {}: {e}", entry.path().display());
                continue;
            }
        };
        files.push(FileEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            folder: folder.clone(),
            size: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Local>::from),
        });
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("listed {} entries in {folder}", files.len());
    Ok(files)
}

pub fn columns() -> Vec<Column<FileEntry>> {
    let size = FieldDescriptor::new("Size", |f: &FileEntry| f.size.to_string())
        .order_by_key(|f: &FileEntry| f.size);
    let time = FieldDescriptor::new("Time", |f: &FileEntry| {
        f.modified
            .map(|t| t.format(TIME_FORMAT).to_string())
            .unwrap_or_default()
    });
    let name = FieldDescriptor::new("Name", |f: &FileEntry| f.name.clone());

    vec![
        Column::new(size, 12).align(Alignment::Trailing),
        Column::new(time, 19),
        Column::new(name, 40),
    ]
}

pub fn form() -> Vec<FormField<FileEntry>> {
    vec![
        FormField::new(
            "Name",
            |f: &FileEntry| f.name.clone(),
            |f: &mut FileEntry, s: &str| {
                if s.is_empty() {
                    return Err("Name is required".to_string());
                }
                f.name = s.to_string();
                Ok(())
            },
        ),
        FormField::new(
            "Folder",
            |f: &FileEntry| f.folder.clone(),
            |f: &mut FileEntry, s: &str| {
                f.folder = s.to_string();
                Ok(())
            },
        ),
    ]
}

pub fn console(
    folder: &str,
    io: SharedIo,
    options: RenderOptions,
) -> Result<Console<FileEntry>, SourceError> {
    let table = Table::new(columns(), FileEntry::default);
    table.set_data(files_from(folder)?);

    let clipboard = MemoryClipboard::new(io.clone());
    let dialog = ConsoleDialog::new("File", io.clone(), form(), table.clone());
    let container = TableContainer::new(table, dialog, ConsoleConfirm::new(io.clone()))
        .with_clipboard(clipboard.clone());
    Ok(Console::new(container, io, clipboard, options))
}
