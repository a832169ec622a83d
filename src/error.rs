use std::fmt;

/// Input rejected before any request is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Nothing was typed (after trimming).
    EmptyUrl,
    /// Not an http/https URL.
    InvalidUrl,
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::EmptyUrl => "请输入视频链接",
            ValidationError::InvalidUrl => "请输入有效的视频链接",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValidationError::EmptyUrl => write!(f, "empty URL"),
            ValidationError::InvalidUrl => write!(f, "URL must use http or https"),
        }
    }
}

/// Every failure the client can run into while talking to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    Validation(ValidationError),

    /// The backend answered with a non-2xx status. `message` is the
    /// `error` field of the JSON body when there was one.
    Http {
        status: u16,
        message: Option<String>,
    },

    /// The request never got a response (connect, timeout, TLS, ...).
    Network(String),

    /// The response arrived but the body did not match the expected shape.
    Decode(String),

    /// Local I/O, e.g. reading a file before upload.
    Io(String),
}

pub const NETWORK_ERROR_MESSAGE: &str = "网络错误，请稍后重试";

impl ClientError {
    /// Text shown to the user. HTTP errors prefer the server's message and
    /// fall back to `fallback`; transport errors share one generic message.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Validation(v) => v.user_message().to_string(),
            ClientError::Http {
                message: Some(msg), ..
            } if !msg.is_empty() => msg.clone(),
            ClientError::Http { .. } | ClientError::Decode(_) | ClientError::Io(_) => {
                fallback.to_string()
            }
            ClientError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
        }
    }

    /// Like `user_message` but never shows the server's text.
    pub fn fixed_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            _ => fallback.to_string(),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClientError::Validation(v) => write!(f, "Validation error: {v}"),
            ClientError::Http {
                status,
                message: Some(msg),
            } => write!(f, "HTTP {status}: {msg}"),
            ClientError::Http {
                status,
                message: None,
            } => write!(f, "HTTP {status}"),
            ClientError::Network(msg) => write!(f, "Network error: {msg}"),
            ClientError::Decode(msg) => write!(f, "Decode error: {msg}"),
            ClientError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Validation(err)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Http {
                status: status.as_u16(),
                message: None,
            }
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Io(err.to_string())
    }
}
