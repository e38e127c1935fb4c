//! Entry-point resolution
//!
//! XS only loads `.js` modules. An entry file with any other (possibly compound)
//! extension gets a `.js` symlink next to the manifest that references it.

use crate::errors::{ManifestError, Result};
use crate::naming::UniqueNameProvider;
use crate::package::PackageDescriptor;
use serde_json::Value;
use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Extension the toolchain loads natively.
pub const NATIVE_EXTENSION: &str = ".js";

/// Entry used when a package declares neither exports nor `main`.
pub const DEFAULT_ENTRY: &str = "./index.js";

/// File name appended when the entry points at a directory.
pub const DEFAULT_INDEX: &str = "index.js";

/// Give up on alias names after this many collisions.
const MAX_ALIAS_ATTEMPTS: usize = 64;

/// Target of an export condition: a string, or the `default` of a nested condition map.
fn condition_target<'a>(conditions: &'a Value, condition: &str) -> Option<&'a str> {
    match conditions.get(condition)? {
        Value::String(target) => Some(target.as_str()),
        Value::Object(nested) => nested.get("default").and_then(Value::as_str),
        _ => None,
    }
}

/// Entry file as declared: `exports.import`, `exports.require`, `main`, then `./index.js`.
///
/// Conditions under the `"."` subpath are honored as well.
pub fn declared_entry(descriptor: &PackageDescriptor) -> &str {
    let conditions = descriptor
        .exports
        .as_ref()
        .map(|exports| exports.get(".").unwrap_or(exports));

    conditions
        .and_then(|c| condition_target(c, "import").or_else(|| condition_target(c, "require")))
        .or(descriptor.main.as_deref())
        .unwrap_or(DEFAULT_ENTRY)
}

/// Lexically normalize `path`, resolving `.` and `..` without touching the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Absolute, existing entry file for `descriptor`.
///
/// Directories resolve to their `index.js`; an extension-less path that does
/// not exist gets `.js` appended.
pub fn resolve_entry(descriptor: &PackageDescriptor, package: &str) -> Result<PathBuf> {
    let declared = declared_entry(descriptor);
    if declared.is_empty() {
        return Err(ManifestError::VoidEntryPoint(package.to_string()));
    }

    let mut path = normalize_lexically(&descriptor.dir().join(declared));
    if path.exists() {
        if path.is_dir() {
            path.push(DEFAULT_INDEX);
        }
    } else if path.extension().is_none() {
        let mut with_ext = OsString::from(path);
        with_ext.push(NATIVE_EXTENSION);
        path = PathBuf::from(with_ext);
    }

    if !path.exists() {
        return Err(ManifestError::MissingEntryPoint {
            package: package.to_string(),
            path,
        });
    }
    debug!("{}: entry point {}", package, path.display());
    Ok(path)
}

/// Split a file name into its base name and full compound extension.
///
/// `index.d.ts` yields `("index", ".d.ts")`; leading dots belong to the base name.
pub fn split_compound_extension(path: &Path) -> (String, String) {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let offset = file_name.len() - file_name.trim_start_matches('.').len();
    match file_name[offset..].find('.') {
        Some(dot) => {
            let (base, ext) = file_name.split_at(offset + dot);
            (base.to_string(), ext.to_string())
        }
        None => (file_name, String::new()),
    }
}

/// Path string without its final extension, as module entries are written.
pub fn strip_extension(path: &Path) -> String {
    if path.extension().is_some() {
        path.with_extension("").to_string_lossy().into_owned()
    } else {
        path.to_string_lossy().into_owned()
    }
}

#[cfg(unix)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

/// Create `<base>-<ext>-<unique>.js` in `dir`, symlinked to `target`.
///
/// Names are regenerated until one is free; an existing file is never replaced.
pub fn create_alias(
    target: &Path,
    dir: &Path,
    names: &mut dyn UniqueNameProvider,
) -> Result<PathBuf> {
    let (base, ext) = split_compound_extension(target);
    let tag: String = ext.chars().filter(|c| *c != '.').collect();

    for _ in 0..MAX_ALIAS_ATTEMPTS {
        let file_name = format!("{}-{}-{}{}", base, tag, names.next_name(), NATIVE_EXTENSION);
        let candidate = dir.join(file_name);
        // symlink_metadata also sees dangling links
        if candidate.symlink_metadata().is_ok() {
            debug!("Alias {} already taken, retrying", candidate.display());
            continue;
        }
        symlink_file(target, &candidate)?;
        debug!("Aliased {} as {}", target.display(), candidate.display());
        return Ok(candidate);
    }

    Err(ManifestError::Io(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!(
            "no free alias name for {} after {} attempts",
            target.display(),
            MAX_ALIAS_ATTEMPTS
        ),
    )))
}

/// Entry path the toolchain can load: `entry` itself if natively loadable,
/// otherwise a fresh alias placed in `alias_dir`.
pub fn ensure_loadable(
    entry: &Path,
    alias_dir: &Path,
    names: &mut dyn UniqueNameProvider,
) -> Result<PathBuf> {
    let (_, ext) = split_compound_extension(entry);
    if ext == NATIVE_EXTENSION {
        return Ok(entry.to_path_buf());
    }
    create_alias(entry, alias_dir, names)
}
