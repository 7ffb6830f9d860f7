//! Address string parse errors.

use std::num::ParseIntError;

/// Reasons a string is not a valid `host:port[:role]` address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    #[error("empty address")]
    Empty,

    #[error("missing port in `{0}`")]
    MissingPort(String),

    #[error("empty host")]
    EmptyHost,

    /// Host padded with whitespace or containing `[`/`]`.
    #[error("invalid host `{0}`")]
    InvalidHost(String),

    /// `[` without a matching `]`.
    #[error("unclosed bracket in `{0}`")]
    UnclosedBracket(String),

    #[error("invalid port `{port}`: {source}")]
    InvalidPort {
        port: String,
        #[source]
        source: ParseIntError,
    },

    #[error("unknown role suffix `{0}`")]
    UnknownRole(String),

    /// More than three segments, or text between `]` and the port separator.
    #[error("unexpected trailing data in `{0}`")]
    TrailingSegments(String),

    /// IPv6 literals must be written as `[addr]:port`.
    #[error("IPv6 host must be bracketed in `{0}`")]
    UnbracketedIpv6(String),
}
