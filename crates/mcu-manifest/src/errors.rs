use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating or synthesizing manifests
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unable to resolve path for package '{0}'")]
    UnresolvedPackage(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid package descriptor {}: {reason}", path.display())]
    InvalidDescriptor { path: PathBuf, reason: String },

    #[error("Invalid manifest {}: {reason}", path.display())]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("{package}: entry point not found: {}", path.display())]
    MissingEntryPoint { package: String, path: PathBuf },

    #[error("{0}: skipped as package entry point voided")]
    VoidEntryPoint(String),
}

impl ManifestError {
    /// Soft errors abort synthesis of one package without failing the traversal.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            ManifestError::MissingEntryPoint { .. } | ManifestError::VoidEntryPoint(_)
        )
    }

    /// Whether a dependency failing with this error is dropped from its parent's
    /// include list instead of aborting the whole run.
    pub fn skips_dependency(&self) -> bool {
        self.is_soft()
            || matches!(
                self,
                ManifestError::UnresolvedPackage(_)
                    | ManifestError::InvalidDescriptor { .. }
                    | ManifestError::InvalidManifest { .. }
            )
    }
}

pub type Result<T> = std::result::Result<T, ManifestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_display() {
        let err = ManifestError::UnresolvedPackage("@scope/pkg".to_string());
        assert_eq!(
            err.to_string(),
            "Unable to resolve path for package '@scope/pkg'"
        );
    }

    #[test]
    fn test_soft_classification() {
        assert!(ManifestError::VoidEntryPoint("x".into()).is_soft());
        assert!(ManifestError::MissingEntryPoint {
            package: "x".into(),
            path: PathBuf::from("/x/index.js"),
        }
        .is_soft());
        assert!(!ManifestError::UnresolvedPackage("x".into()).is_soft());
        assert!(ManifestError::UnresolvedPackage("x".into()).skips_dependency());
        assert!(!ManifestError::InvalidArgument("x".into()).skips_dependency());
        assert!(ManifestError::InvalidManifest {
            path: PathBuf::from("/x/mcu/manifest.json"),
            reason: "expected value".into(),
        }
        .skips_dependency());
    }
}
