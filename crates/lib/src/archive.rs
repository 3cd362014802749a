//! Archive extraction with leading-component stripping.
//!
//! Equivalent to `tar --strip-components=N`: the first `strip` path components
//! of every entry are dropped and entries with nothing left are skipped.
//! Entries that would escape the destination are rejected, including writes
//! that would pass through a symlink unpacked earlier from the same archive.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ArchiveError {
  #[error("failed to read archive {}: {source}", archive.display())]
  Read {
    archive: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to read zip archive {}: {source}", archive.display())]
  Zip {
    archive: PathBuf,
    #[source]
    source: zip::result::ZipError,
  },

  #[error("failed to write {}: {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("archive entry escapes the destination: {}", entry.display())]
  UnsafeEntry { entry: PathBuf },

  #[error("archive {} contained nothing after stripping {strip} component(s)", archive.display())]
  Empty { archive: PathBuf, strip: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveFormat {
  TarGz,
  Zip,
}

/// Extract `archive` into `dest`, dropping `strip` leading components.
///
/// Returns the number of entries written.
pub fn extract(archive: &Path, format: ArchiveFormat, dest: &Path, strip: usize) -> Result<usize, ArchiveError> {
  info!(archive = %archive.display(), dest = %dest.display(), strip, ?format, "extracting");
  fs::create_dir_all(dest).map_err(|source| ArchiveError::Write {
    path: dest.to_path_buf(),
    source,
  })?;
  let root = dunce::canonicalize(dest).map_err(|source| ArchiveError::Write {
    path: dest.to_path_buf(),
    source,
  })?;

  let written = match format {
    ArchiveFormat::TarGz => extract_tar_gz(archive, &root, strip)?,
    ArchiveFormat::Zip => extract_zip(archive, &root, strip)?,
  };

  if written == 0 {
    return Err(ArchiveError::Empty {
      archive: archive.to_path_buf(),
      strip,
    });
  }
  debug!(entries = written, "extraction complete");
  Ok(written)
}

fn extract_tar_gz(archive: &Path, dest: &Path, strip: usize) -> Result<usize, ArchiveError> {
  let read_err = |source| ArchiveError::Read {
    archive: archive.to_path_buf(),
    source,
  };

  let file = File::open(archive).map_err(read_err)?;
  let mut tar = tar::Archive::new(GzDecoder::new(file));
  tar.set_preserve_permissions(true);

  let mut written = 0;
  for entry in tar.entries().map_err(read_err)? {
    let mut entry = entry.map_err(read_err)?;
    let path = entry.path().map_err(read_err)?.into_owned();
    let Some(relative) = strip_components(&path, strip)? else {
      continue;
    };
    let target = dest.join(&relative);
    create_parent(dest, &target, &path)?;

    let write_err = |source| ArchiveError::Write {
      path: target.clone(),
      source,
    };

    if entry.header().entry_type().is_hard_link() {
      // Hard link targets are archive paths and need the same stripping.
      let link = entry
        .link_name()
        .map_err(read_err)?
        .map(|l| l.into_owned())
        .ok_or_else(|| ArchiveError::UnsafeEntry { entry: path.clone() })?;
      let Some(link_relative) = strip_components(&link, strip)? else {
        continue;
      };
      let original = dest.join(link_relative);
      check_contained(dest, &original, &link)?;
      fs::hard_link(original, &target).map_err(write_err)?;
    } else {
      entry.unpack(&target).map_err(write_err)?;
    }
    written += 1;
  }
  Ok(written)
}

fn extract_zip(archive: &Path, dest: &Path, strip: usize) -> Result<usize, ArchiveError> {
  let file = File::open(archive).map_err(|source| ArchiveError::Read {
    archive: archive.to_path_buf(),
    source,
  })?;
  let zip_err = |source| ArchiveError::Zip {
    archive: archive.to_path_buf(),
    source,
  };
  let mut zip = zip::ZipArchive::new(file).map_err(zip_err)?;

  let mut written = 0;
  for index in 0..zip.len() {
    let mut entry = zip.by_index(index).map_err(zip_err)?;
    let path = entry.enclosed_name().ok_or_else(|| ArchiveError::UnsafeEntry {
      entry: PathBuf::from(entry.name()),
    })?;
    let Some(relative) = strip_components(&path, strip)? else {
      continue;
    };
    let target = dest.join(relative);
    let write_err = |source| ArchiveError::Write {
      path: target.clone(),
      source,
    };

    create_parent(dest, &target, &path)?;
    if entry.is_dir() {
      fs::create_dir_all(&target).map_err(write_err)?;
    } else {
      let mut out = File::create(&target).map_err(write_err)?;
      io::copy(&mut entry, &mut out).map_err(write_err)?;
      #[cfg(unix)]
      if let Some(mode) = entry.unix_mode() {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&target, fs::Permissions::from_mode(mode)).map_err(write_err)?;
      }
    }
    written += 1;
  }
  Ok(written)
}

/// Drop the first `strip` normal components of `path`.
///
/// `.` components are ignored. Returns `None` when nothing remains and an
/// error when the path is absolute or walks upwards.
pub fn strip_components(path: &Path, strip: usize) -> Result<Option<PathBuf>, ArchiveError> {
  let mut normal = Vec::new();
  for component in path.components() {
    match component {
      Component::Normal(part) => normal.push(part),
      Component::CurDir => {}
      Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
        return Err(ArchiveError::UnsafeEntry {
          entry: path.to_path_buf(),
        });
      }
    }
  }

  if normal.len() <= strip {
    return Ok(None);
  }
  Ok(Some(normal[strip..].iter().collect()))
}

/// Require that the nearest existing ancestor of `target` resolves inside
/// `root`. `root` must already be canonical.
fn check_contained(root: &Path, target: &Path, entry: &Path) -> Result<(), ArchiveError> {
  let Some(existing) = target
    .parent()
    .and_then(|parent| parent.ancestors().find(|p| fs::symlink_metadata(p).is_ok()))
  else {
    return Ok(());
  };
  let resolved = dunce::canonicalize(existing).map_err(|source| ArchiveError::Write {
    path: existing.to_path_buf(),
    source,
  })?;
  if resolved.starts_with(root) {
    Ok(())
  } else {
    Err(ArchiveError::UnsafeEntry {
      entry: entry.to_path_buf(),
    })
  }
}

fn create_parent(root: &Path, target: &Path, entry: &Path) -> Result<(), ArchiveError> {
  check_contained(root, target, entry)?;
  match target.parent() {
    Some(parent) => fs::create_dir_all(parent).map_err(|source| ArchiveError::Write {
      path: parent.to_path_buf(),
      source,
    }),
    None => Ok(()),
  }
}
