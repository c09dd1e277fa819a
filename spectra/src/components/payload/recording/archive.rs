use crate::error::ArchiveError;
use flate2::{write::GzEncoder, Compression};
use log::debug;
use std::{
    ffi::OsStr,
    fs::File,
    path::{Component, Path, PathBuf},
};
use tar::Builder;

/// Bundles a run's activity log and images into a single gzip
/// compressed tar, ready to be pulled off the payload in one transfer.
#[derive(Debug, Clone)]
pub struct Archiver {
    activity_log: PathBuf,
}

impl Archiver {
    /// * `activity_log`: log added as the first entry of every archive.
    pub fn new<P: Into<PathBuf>>(activity_log: P) -> Self {
        Self {
            activity_log: activity_log.into(),
        }
    }

    /// Name of the archive produced for `output_prefix`.
    pub fn archive_path(output_prefix: &str) -> PathBuf {
        PathBuf::from(format!("{output_prefix}_all.tar"))
    }

    /// Write `<output_prefix>_all.tar` holding the activity log followed
    /// by each file in `filenames`, in order. Fails on the first input
    /// that cannot be read.
    ///
    /// * `output_prefix`: prefix the images were captured with.
    /// * `filenames`: images to bundle.
    pub fn archive<F: AsRef<Path>>(
        &self,
        output_prefix: &str,
        filenames: &[F],
    ) -> Result<PathBuf, ArchiveError> {
        let path = Self::archive_path(output_prefix);
        let file = File::create(&path).map_err(|source| ArchiveError::Create {
            path: path.clone(),
            source,
        })?;
        let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));

        let inputs = std::iter::once(self.activity_log.as_path())
            .chain(filenames.iter().map(|filename| filename.as_ref()));
        for input in inputs {
            debug!("adding {:?} to {:?}", input, path);
            builder
                .append_path_with_name(input, entry_name(input))
                .map_err(|source| ArchiveError::Entry {
                    path: input.to_path_buf(),
                    source,
                })?;
        }

        builder
            .into_inner()
            .and_then(|encoder| encoder.finish())
            .map_err(|source| ArchiveError::Finish {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

/// Name stored in the archive: the path normalised lexically, with `..`
/// removing the component before it, and made relative. A `..` with
/// nothing left to remove is dropped so no entry escapes the archive.
pub fn entry_name(path: &Path) -> PathBuf {
    let mut parts: Vec<&OsStr> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::ParentDir => {
                parts.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    parts.into_iter().collect()
}
