use netconf_core_types::SessionId;
use thiserror::Error;

/// Result type alias using NetconfError
pub type Result<T> = std::result::Result<T, NetconfError>;

// ========== rpc-error Facility ==========

/// RFC 6241 `error-tag` values raised by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorTag {
    InUse,
    InvalidValue,
    MissingAttribute,
    BadAttribute,
    UnknownAttribute,
    MissingElement,
    BadElement,
    UnknownElement,
    LockDenied,
    DataExists,
    DataMissing,
    OperationNotSupported,
    OperationFailed,
    MalformedMessage,
}

impl ErrorTag {
    /// Wire form of the tag
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorTag::InUse => "in-use",
            ErrorTag::InvalidValue => "invalid-value",
            ErrorTag::MissingAttribute => "missing-attribute",
            ErrorTag::BadAttribute => "bad-attribute",
            ErrorTag::UnknownAttribute => "unknown-attribute",
            ErrorTag::MissingElement => "missing-element",
            ErrorTag::BadElement => "bad-element",
            ErrorTag::UnknownElement => "unknown-element",
            ErrorTag::LockDenied => "lock-denied",
            ErrorTag::DataExists => "data-exists",
            ErrorTag::DataMissing => "data-missing",
            ErrorTag::OperationNotSupported => "operation-not-supported",
            ErrorTag::OperationFailed => "operation-failed",
            ErrorTag::MalformedMessage => "malformed-message",
        }
    }

    /// The `error-type` this tag is reported with unless overridden
    pub fn default_type(&self) -> ErrorType {
        match self {
            ErrorTag::InUse | ErrorTag::DataExists | ErrorTag::DataMissing => {
                ErrorType::Application
            }
            ErrorTag::MalformedMessage => ErrorType::Rpc,
            _ => ErrorType::Protocol,
        }
    }
}

/// RFC 6241 `error-type` layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    Transport,
    Rpc,
    Protocol,
    Application,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Transport => "transport",
            ErrorType::Rpc => "rpc",
            ErrorType::Protocol => "protocol",
            ErrorType::Application => "application",
        }
    }
}

/// Structured rpc-error as sent to the client
///
/// Severity is always `error`; warnings are never produced.
#[derive(Debug, Clone, PartialEq)]
pub struct NcError {
    tag: ErrorTag,
    error_type: ErrorType,
    op: Option<String>,
    message: String,
    path: Option<String>,
    session_id: Option<SessionId>,
    bad_element: Option<String>,
    bad_attribute: Option<String>,
}

impl NcError {
    /// Create an error with the tag's default type
    pub fn new(tag: ErrorTag) -> Self {
        Self {
            tag,
            error_type: tag.default_type(),
            op: None,
            message: String::new(),
            path: None,
            session_id: None,
            bad_element: None,
            bad_attribute: None,
        }
    }

    /// Override the error type
    pub fn with_type(mut self, error_type: ErrorType) -> Self {
        self.error_type = error_type;
        self
    }

    /// Add the RPC operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add a human readable message (`error-message`)
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add the data path the error refers to (`error-path`)
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add the `session-id` error-info (lock holder)
    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Add the `bad-element` error-info
    pub fn with_bad_element(mut self, name: impl Into<String>) -> Self {
        self.bad_element = Some(name.into());
        self
    }

    /// Add the `bad-attribute` error-info
    pub fn with_bad_attribute(mut self, name: impl Into<String>) -> Self {
        self.bad_attribute = Some(name.into());
        self
    }

    pub fn tag(&self) -> ErrorTag {
        self.tag
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn severity(&self) -> &'static str {
        "error"
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    pub fn bad_element(&self) -> Option<&str> {
        self.bad_element.as_deref()
    }

    pub fn bad_attribute(&self) -> Option<&str> {
        self.bad_attribute.as_deref()
    }

    /// Whether any error-info child would be emitted
    pub fn has_info(&self) -> bool {
        self.session_id.is_some() || self.bad_element.is_some() || self.bad_attribute.is_some()
    }
}

impl std::fmt::Display for NcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}/{}]", self.tag.as_str(), self.error_type.as_str())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(sid) = self.session_id {
            write!(f, " (session-id: {})", sid)?;
        }
        Ok(())
    }
}

impl std::error::Error for NcError {}

// ========== Domain Errors ==========

/// Failures raised by the engine's operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetconfError {
    // Request shape
    #[error("Malformed request: {reason}")]
    MalformedMessage { reason: String },

    #[error("XML syntax error at byte {position}: {reason}")]
    XmlSyntax { position: usize, reason: String },

    #[error("Malformed XPath expression '{expr}': {reason}")]
    XPathSyntax { expr: String, reason: String },

    #[error("Unknown element '{name}' under {parent}")]
    UnknownNode { parent: String, name: String },

    #[error("Missing element '{element}'")]
    MissingElement { element: String },

    #[error("Missing attribute '{attribute}' on '{element}'")]
    MissingAttribute { element: String, attribute: String },

    #[error("Attribute '{attribute}' is not allowed on '{element}'")]
    BadAttribute { element: String, attribute: String },

    #[error("Unknown value '{value}' for attribute '{attribute}'")]
    UnknownAttribute { attribute: String, value: String },

    #[error("Invalid data path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Invalid schema definition at '{node}': {reason}")]
    SchemaDefinition { node: String, reason: String },

    #[error("Invalid configuration in {origin}: {reason}")]
    Config { origin: String, reason: String },

    // Edit semantics
    #[error("Data already exists at {path}")]
    DataExists { path: String },

    #[error("Data missing at {path}")]
    DataMissing { path: String },

    #[error("Invalid value at {path}: {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("Operation '{operation}' not permitted under '{inherited}'")]
    OperationTransition {
        operation: String,
        inherited: String,
    },

    #[error("Operation not supported: {reason}")]
    NotSupported { reason: String },

    #[error("Path {path} is not readable")]
    NotReadable { path: String },

    // Proxy
    #[error("Proxy store at {mount} is read-only")]
    ProxyReadOnly { mount: String },

    #[error("Remote store error: {reason}")]
    Remote { reason: String },

    // Sessions and locks
    #[error("Datastore is locked by session {holder}")]
    InUse { holder: SessionId },

    #[error("Lock denied, held by session {holder}")]
    LockDenied { holder: SessionId },

    #[error("Operation failed: {reason}")]
    OperationFailed { reason: String },

    #[error("Invalid session id {session_id}")]
    InvalidSession { session_id: u32 },

    #[error("Attempt to kill own session is forbidden")]
    SelfKill,

    #[error("Session limit of {max} reached")]
    SessionLimit { max: usize },
}

impl NetconfError {
    /// Shorthand for `InvalidValue`
    pub fn invalid_value(path: impl Into<String>, reason: impl Into<String>) -> Self {
        NetconfError::InvalidValue {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for `NotSupported`
    pub fn not_supported(reason: impl Into<String>) -> Self {
        NetconfError::NotSupported {
            reason: reason.into(),
        }
    }

    /// The rpc-error tag this failure is reported with
    pub fn tag(&self) -> ErrorTag {
        NcError::from(self.clone()).tag()
    }
}

impl From<NetconfError> for NcError {
    fn from(err: NetconfError) -> Self {
        let message = err.to_string();
        match err {
            NetconfError::MalformedMessage { .. }
            | NetconfError::XmlSyntax { .. }
            | NetconfError::XPathSyntax { .. } => {
                NcError::new(ErrorTag::MalformedMessage).with_message(message)
            }

            NetconfError::UnknownNode { name, .. } => NcError::new(ErrorTag::MalformedMessage)
                .with_bad_element(name)
                .with_message(message),

            NetconfError::MissingElement { element } => NcError::new(ErrorTag::MissingElement)
                .with_bad_element(element)
                .with_message(message),

            NetconfError::MissingAttribute { element, attribute } => {
                NcError::new(ErrorTag::MissingAttribute)
                    .with_bad_element(element)
                    .with_bad_attribute(attribute)
                    .with_message(message)
            }

            NetconfError::BadAttribute { element, attribute } => {
                NcError::new(ErrorTag::BadAttribute)
                    .with_bad_element(element)
                    .with_bad_attribute(attribute)
                    .with_message(message)
            }

            NetconfError::UnknownAttribute { attribute, .. } => {
                NcError::new(ErrorTag::UnknownAttribute)
                    .with_bad_attribute(attribute)
                    .with_message(message)
            }

            NetconfError::InvalidPath { path, .. } => NcError::new(ErrorTag::InvalidValue)
                .with_path(path)
                .with_message(message),

            NetconfError::DataExists { path } => NcError::new(ErrorTag::DataExists)
                .with_path(path)
                .with_message(message),

            NetconfError::DataMissing { path } => NcError::new(ErrorTag::DataMissing)
                .with_path(path)
                .with_message(message),

            NetconfError::InvalidValue { path, .. } => NcError::new(ErrorTag::InvalidValue)
                .with_path(path)
                .with_message(message),

            NetconfError::OperationTransition { .. } | NetconfError::NotSupported { .. } => {
                NcError::new(ErrorTag::OperationNotSupported).with_message(message)
            }

            NetconfError::NotReadable { path } => NcError::new(ErrorTag::OperationNotSupported)
                .with_type(ErrorType::Application)
                .with_path(path)
                .with_message(message),

            NetconfError::ProxyReadOnly { mount } => NcError::new(ErrorTag::InvalidValue)
                .with_path(mount)
                .with_message(message),

            NetconfError::Remote { .. } => {
                NcError::new(ErrorTag::OperationFailed).with_message(message)
            }

            NetconfError::InUse { holder } => NcError::new(ErrorTag::InUse)
                .with_session_id(holder)
                .with_message(message),

            NetconfError::LockDenied { holder } => NcError::new(ErrorTag::LockDenied)
                .with_session_id(holder)
                .with_message(message),

            NetconfError::OperationFailed { .. }
            | NetconfError::SessionLimit { .. }
            | NetconfError::SchemaDefinition { .. }
            | NetconfError::Config { .. } => {
                NcError::new(ErrorTag::OperationFailed).with_message(message)
            }

            NetconfError::InvalidSession { .. } | NetconfError::SelfKill => {
                NcError::new(ErrorTag::InvalidValue).with_message(message)
            }
        }
    }
}
