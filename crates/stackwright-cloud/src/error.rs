//! Cloud model error types

use thiserror::Error;

/// Errors raised while declaring, validating or handing off resources
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Resource declared twice: {0}")]
    DuplicateResource(String),

    #[error("Resource '{from}' references undeclared resource '{to}'")]
    DanglingReference { from: String, to: String },

    #[error("Resource '{from}' references unknown output '{to}.{attribute}'")]
    UnknownOutput {
        from: String,
        to: String,
        attribute: String,
    },

    #[error("Cyclic resource references: {0}")]
    CyclicReference(String),

    #[error("Resource '{resource}' was rejected by the provider: {message}")]
    ProviderRejection { resource: String, message: String },

    #[error("Output '{resource}.{attribute}' could not be resolved")]
    ReferenceResolution { resource: String, attribute: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Manifest store error: {0}")]
    StoreError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
