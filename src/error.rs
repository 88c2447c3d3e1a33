use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Not an OOXML package, or the main document part is missing.
    InvalidDocx(String),
    /// The main document part is not well-formed XML.
    Xml(roxmltree::Error),
    /// Neither the buffer nor the text fallback produced a single line.
    NoContent,
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidDocx(msg) => write!(f, "invalid DOCX: {msg}"),
            Error::Xml(e) => write!(f, "invalid DOCX: malformed XML: {e}"),
            Error::NoContent => write!(f, "no content to analyze"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Xml(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::Xml(e)
    }
}
