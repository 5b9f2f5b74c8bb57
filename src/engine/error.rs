use thiserror::Error;

/// Contract violations in the inventories handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum EngineError {
    #[error("instance type '{0}' is not of the form <family>.<size>")]
    MalformedInstanceType(String),

    #[error("instance type '{instance_type}' has size '{size}' with no normalized unit weight")]
    UnknownInstanceSize { instance_type: String, size: String },
}
