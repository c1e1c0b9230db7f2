use std::fmt;

/// The ways a decode can fail.
///
/// Every variant aborts the whole decode, there is no partial output.
#[derive(
    thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Hash, strum::IntoStaticStr, strum::EnumIter,
)]
pub enum ErrorKind {
    /// The input is not an even-length hex string.
    #[error("invalid hex")]
    InvalidHex,
    /// A read would run past the end of the buffer.
    #[error("truncated buffer")]
    TruncatedBuffer,
    /// An offset word points outside the buffer.
    #[error("dangling offset")]
    DanglingOffset,
    /// A declared length cannot possibly fit in what is left of the buffer.
    #[error("array too large")]
    ArrayTooLarge,
    /// A fixed-width field failed a structural check.
    #[error("invalid format")]
    InvalidFormat,
}

impl ErrorKind {
    /// The stable, CamelCase name of this kind, e.g `"TruncatedBuffer"`.
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// A decode failure, with the byte offset where it was detected.
///
/// For [`ErrorKind::InvalidHex`] the offset is a character index into the
/// input string, for everything else it is a byte index into the calldata.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecodeError {
    kind: ErrorKind,
    offset: usize,
    field: Option<&'static str>,
}

impl DecodeError {
    pub(crate) fn new(kind: ErrorKind, offset: usize) -> Self {
        Self {
            kind,
            offset,
            field: None,
        }
    }

    pub(crate) fn with_field(mut self, field: Option<&'static str>) -> Self {
        self.field = field;
        self
    }

    /// What went wrong.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Where it went wrong.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The innermost named field being read when the error occurred.
    pub fn field(&self) -> Option<&'static str> {
        self.field
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.kind, self.offset)?;
        if let Some(field) = self.field {
            write!(f, " (reading `{field}`)")?;
        }
        Ok(())
    }
}

impl std::error::Error for DecodeError {}

/// Attach the name of the field being read to an error, keeping the innermost
/// one if already set.
pub(crate) trait FieldExt<T> {
    fn field(self, name: &'static str) -> Result<T, DecodeError>;
}

impl<T> FieldExt<T> for Result<T, DecodeError> {
    fn field(self, name: &'static str) -> Result<T, DecodeError> {
        self.map_err(|mut e| {
            e.field.get_or_insert(name);
            e
        })
    }
}

/// Error returned by [`crate::decode`], which also renders JSON.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The input could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The decoded bundle could not be rendered.
    #[error("couldn't render bundle as json")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The decode taxonomy of this error, if it came from decoding.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Decode(it) => Some(it.kind()),
            Error::Json(_) => None,
        }
    }
}

#[test]
fn innermost_field_wins() {
    let e = Err::<(), _>(DecodeError::new(ErrorKind::TruncatedBuffer, 7))
        .field("hook_data")
        .field("orders")
        .unwrap_err();
    assert_eq!(e.field(), Some("hook_data"));
    assert_eq!(
        e.to_string(),
        "truncated buffer at offset 7 (reading `hook_data`)"
    );
}

#[test]
fn kind_names_are_stable() {
    use strum::IntoEnumIterator as _;
    let names = ErrorKind::iter().map(ErrorKind::name).collect::<Vec<_>>();
    assert_eq!(
        names,
        [
            "InvalidHex",
            "TruncatedBuffer",
            "DanglingOffset",
            "ArrayTooLarge",
            "InvalidFormat"
        ]
    );
}
