//! ZIP archive handling: entry extraction and import ordering

mod planner;
mod reader;

pub use planner::ZipPathPlanner;
pub use reader::{ArchiveEntries, ZipContentReader};

/// Why an archive entry name was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySkip {
    Empty,
    NulByte,
    Absolute,
    Traversal,
    Directory,
    MacMetadata,
}

/// Normalize an archive entry name to a safe relative path.
///
/// Backslashes become forward slashes and leading `./` segments are
/// dropped. Absolute paths, drive prefixes and `..` segments are rejected,
/// as are directories and macOS resource-fork entries.
pub fn normalize_entry_name(raw: &str) -> Result<String, EntrySkip> {
    if raw.is_empty() {
        return Err(EntrySkip::Empty);
    }
    if raw.contains('\0') {
        return Err(EntrySkip::NulByte);
    }

    let name = raw.replace('\\', "/");
    if name.starts_with('/') || has_drive_prefix(&name) {
        return Err(EntrySkip::Absolute);
    }
    if name.split('/').any(|segment| segment == "..") {
        return Err(EntrySkip::Traversal);
    }
    if name.ends_with('/') {
        return Err(EntrySkip::Directory);
    }

    let mut name = name.as_str();
    while let Some(rest) = name.strip_prefix("./") {
        name = rest.trim_start_matches('/');
    }

    if name.is_empty() {
        return Err(EntrySkip::Empty);
    }
    if name.starts_with("__MACOSX/") {
        return Err(EntrySkip::MacMetadata);
    }

    Ok(name.to_string())
}

fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
