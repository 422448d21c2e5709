use std::fmt;

#[derive(Debug)]
pub enum WeaveError {
    InvalidConfig(String),
    ConfigParse(toml::de::Error),
    Io(std::io::Error),
}

impl fmt::Display for WeaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeaveError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            WeaveError::ConfigParse(e) => write!(f, "config parse error: {e}"),
            WeaveError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for WeaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WeaveError::InvalidConfig(_) => None,
            WeaveError::ConfigParse(e) => Some(e),
            WeaveError::Io(e) => Some(e),
        }
    }
}

impl From<toml::de::Error> for WeaveError {
    fn from(e: toml::de::Error) -> Self {
        WeaveError::ConfigParse(e)
    }
}

impl From<std::io::Error> for WeaveError {
    fn from(e: std::io::Error) -> Self {
        WeaveError::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, WeaveError>;
