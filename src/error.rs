use thiserror::Error;

/// Errors raised while validating a prompt template against its pools.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template uses anchor [{anchor}], but pool {anchor} is empty")]
    EmptyPool { anchor: u32 },

    #[error(
        "Template references [{anchor}], but only {supplied} pools were supplied; connect pool_{anchor}"
    )]
    MissingPool { anchor: u32, supplied: usize },
}

/// Errors that can occur while loading or persisting loop state.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Could not access state file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("State file '{path}' is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised by a backend signal sink.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("Signal channel is closed")]
    ChannelClosed,

    #[error("Failed to encode signal '{event}': {message}")]
    Encode { event: String, message: String },
}

/// Errors reported by the host editor when the UI asks it to do something.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Host rejected the queue request: {0}")]
    QueueRejected(String),

    #[error("Node type '{0}' is not registered")]
    UnknownNodeType(String),
}

/// Errors raised while registering extensions or node definitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("An extension named '{0}' is already registered")]
    DuplicateExtension(String),

    #[error("Node type '{0}' is already registered")]
    DuplicateNodeType(String),
}

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
