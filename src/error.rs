//! Error types for plugin schemas, manifests and migration

use thiserror::Error;

/// Result type for plugin schema operations
pub type Result<T> = std::result::Result<T, PluginError>;

/// Plugin schema errors
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("invalid id: {0}")]
    InvalidId(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("{0}")]
    InvalidExtension(String),

    /// A nested manifest conversion failure, labeled with where it happened
    #[error("{path}: {source}")]
    Manifest {
        path: String,
        #[source]
        source: Box<PluginError>,
    },

    #[error("invalid plugins")]
    InvalidPlugins,

    #[error("plugin not installed")]
    PluginNotInstalled,

    #[error("loader error: {0}")]
    Loader(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Semver error: {0}")]
    Semver(#[from] semver::Error),
}

impl PluginError {
    /// Wrap this error with a path label such as `ext (cesium)`
    pub fn at(self, path: impl Into<String>) -> Self {
        PluginError::Manifest {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping path labels
    pub fn root_cause(&self) -> &PluginError {
        match self {
            PluginError::Manifest { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_labels_nest() {
        let err = PluginError::InvalidExtension("visualizer missing".to_string())
            .at("ext (cesium)")
            .at("manifest");
        assert_eq!(
            err.to_string(),
            "manifest: ext (cesium): visualizer missing"
        );
        assert!(matches!(err.root_cause(), PluginError::InvalidExtension(_)));
    }
}
