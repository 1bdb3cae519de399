use thiserror::Error;

#[derive(Error, Debug)]
pub enum RustyFtdcError {
    #[error("read past the end of the input")]
    OutOfRange,

    #[error("document size field is out of bounds")]
    InvalidSize,

    #[error("document terminator is missing or misplaced")]
    InvalidTerminator,

    #[error("unsupported BSON element type 0x{0:02x}")]
    UnsupportedType(u8),

    #[error("key or string value is not valid UTF-8")]
    Utf8Error,

    #[error("varint does not terminate within 10 bytes")]
    VarintTooLong,

    #[error("document nesting exceeds the depth limit")]
    RecursionLimit,

    #[error("reference flattens to {flattened} metrics but the chunk declares {declared}")]
    MetricsCountMismatch { declared: u32, flattened: usize },

    #[error("{metrics} metrics x {samples} samples exceeds the decoding bound")]
    ChunkTooLarge { metrics: u32, samples: u32 },

    #[error("zlib payload did not inflate: {0}")]
    InflateError(#[from] std::io::Error),
}

/// What went wrong at a particular input position.
///
/// Chunks are unrecoverable once any of these fire, so parsers never try
/// to backtrack around them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    OutOfRange,
    InvalidSize,
    InvalidTerminator,
    UnsupportedType(u8),
    Utf8,
    VarintTooLong,
    RecursionLimit,
    Nom(nom::error::ErrorKind),
}

/// The error type threaded through every `nom` parser in this crate.
///
/// `nom`'s stock error only remembers an `ErrorKind`, which is too coarse
/// for the failure modes a chunk consumer needs to tell apart, so the
/// parsers carry their own kind alongside the failing input.
#[derive(Debug, PartialEq)]
pub struct FtdcParseError<'a> {
    pub input: &'a [u8],
    pub kind: ParseErrorKind,
}

impl<'a> FtdcParseError<'a> {
    /// Fails the calling parser at `input`.
    pub(crate) fn err<T>(input: &'a [u8], kind: ParseErrorKind) -> ParseResult<'a, T> {
        Err(nom::Err::Error(FtdcParseError { input, kind }))
    }
}

impl<'a> nom::error::ParseError<&'a [u8]> for FtdcParseError<'a> {
    fn from_error_kind(input: &'a [u8], kind: nom::error::ErrorKind) -> Self {
        let kind = match kind {
            // `complete` parsers report exhausted input as Eof.
            nom::error::ErrorKind::Eof => ParseErrorKind::OutOfRange,
            other => ParseErrorKind::Nom(other),
        };
        FtdcParseError { input, kind }
    }

    fn append(_input: &'a [u8], _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

/// `nom` result specialised to the crate's parse error.
pub type ParseResult<'a, T> = nom::IResult<&'a [u8], T, FtdcParseError<'a>>;

impl<'a> From<nom::Err<FtdcParseError<'a>>> for RustyFtdcError {
    fn from(err: nom::Err<FtdcParseError<'a>>) -> Self {
        match err {
            nom::Err::Incomplete(_) => RustyFtdcError::OutOfRange,
            nom::Err::Error(e) | nom::Err::Failure(e) => match e.kind {
                ParseErrorKind::OutOfRange | ParseErrorKind::Nom(_) => RustyFtdcError::OutOfRange,
                ParseErrorKind::InvalidSize => RustyFtdcError::InvalidSize,
                ParseErrorKind::InvalidTerminator => RustyFtdcError::InvalidTerminator,
                ParseErrorKind::UnsupportedType(byte) => RustyFtdcError::UnsupportedType(byte),
                ParseErrorKind::Utf8 => RustyFtdcError::Utf8Error,
                ParseErrorKind::VarintTooLong => RustyFtdcError::VarintTooLong,
                ParseErrorKind::RecursionLimit => RustyFtdcError::RecursionLimit,
            },
        }
    }
}
