//! Canonical text codec for relocation signals.
//!
//! Remote calls only carry an error's class name and message, so the signal
//! travels as text inside the message:
//!
//! ```text
//! EntityGroup moved to: hostname=<HOST> port=<PORT>.
//! ```
//!
//! # Decoding
//!
//! Each field is recovered on its own: the hostname runs from `hostname=` to
//! the next space, the port from `port=` to the next period. A field that
//! cannot be recovered is reported to the codec's [`ParseDiagnostics`] and
//! left unknown. Decoding never fails outright.
//!
//! Hostnames containing a space or one of the markers do not survive the
//! round trip. The layout is private to this module so a structured encoding
//! can replace it behind [`SignalCodec`].

use std::fmt;
use std::num::ParseIntError;

use helix_core::Limits;
use tracing::warn;

use crate::signal::{EntityGroupMoved, UNKNOWN_PORT};

/// Leading text of every encoded signal.
pub const MOVED_PREFIX: &str = "EntityGroup moved to: ";

/// Marker preceding the hostname.
pub const HOSTNAME_FIELD: &str = "hostname=";

/// Marker preceding the port.
pub const PORT_FIELD: &str = "port=";

const HOSTNAME_TERMINATOR: char = ' ';
const PORT_TERMINATOR: char = '.';

/// Bytes of an oversized input included in diagnostics.
const PREVIEW_BYTES: usize = 128;

/// Writes the canonical text for `hostname` and `port`.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_canonical<W: fmt::Write>(
    w: &mut W,
    hostname: &str,
    port: i32,
) -> fmt::Result {
    write!(
        w,
        "{MOVED_PREFIX}{HOSTNAME_FIELD}{hostname}{HOSTNAME_TERMINATOR}{PORT_FIELD}{port}{PORT_TERMINATOR}"
    )
}

/// A field of the encoded signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// The `hostname=` field.
    Hostname,
    /// The `port=` field.
    Port,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hostname => f.write_str("hostname"),
            Self::Port => f.write_str("port"),
        }
    }
}

/// Why a field could not be recovered from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The field marker does not appear in the text.
    #[error("marker '{marker}' not found")]
    MissingMarker {
        /// The missing marker.
        marker: &'static str,
    },

    /// Nothing terminates the value after the marker.
    #[error("no '{terminator}' terminates the value after '{marker}'")]
    Unterminated {
        /// The marker whose value is unterminated.
        marker: &'static str,
        /// The expected terminator.
        terminator: char,
    },

    /// The value between marker and terminator is empty.
    #[error("empty value after '{marker}'")]
    Empty {
        /// The marker whose value is empty.
        marker: &'static str,
    },

    /// The port value is not a base-10 integer.
    #[error("port '{value}' is not a base-10 integer")]
    InvalidPort {
        /// The text found between marker and terminator.
        value: String,
        /// The integer parse failure.
        #[source]
        source: ParseIntError,
    },

    /// The text is longer than any encoded signal may be.
    #[error("encoded signal is {actual} bytes (max {max})")]
    TooLong {
        /// Length of the text.
        actual: usize,
        /// Maximum accepted length.
        max: usize,
    },
}

/// Receives the soft failures of decoding.
pub trait ParseDiagnostics: fmt::Debug + Send + Sync {
    /// Called once per field that could not be recovered from `input`.
    fn field_unparseable(&self, field: Field, error: &FieldError, input: &str);
}

/// Reports decode failures as `tracing` warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl ParseDiagnostics for TracingDiagnostics {
    fn field_unparseable(&self, field: Field, error: &FieldError, input: &str) {
        warn!(
            field = %field,
            error = %error,
            input = %input,
            "Can't parse relocation signal field, continuing"
        );
    }
}

/// Maps relocation signals to and from text.
pub trait SignalCodec: fmt::Debug + Send + Sync {
    /// Encodes a signal.
    fn encode(&self, signal: &EntityGroupMoved) -> String;

    /// Decodes a signal. Unrecoverable fields leave the signal invalid.
    fn decode(&self, text: &str) -> EntityGroupMoved;
}

/// The canonical text codec.
#[derive(Debug, Clone)]
pub struct TextCodec<D = TracingDiagnostics> {
    diagnostics: D,
    max_encoded_bytes: usize,
}

impl TextCodec<TracingDiagnostics> {
    /// Creates a codec that logs failures through `tracing`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_diagnostics(TracingDiagnostics)
    }
}

impl Default for TextCodec<TracingDiagnostics> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: ParseDiagnostics> TextCodec<D> {
    /// Creates a codec reporting failures to `diagnostics`.
    #[must_use]
    pub fn with_diagnostics(diagnostics: D) -> Self {
        Self {
            diagnostics,
            max_encoded_bytes: encoded_bytes_limit(&Limits::new()),
        }
    }

    /// Applies the encoded length limit from `limits`.
    #[must_use]
    pub fn with_limits(mut self, limits: &Limits) -> Self {
        self.max_encoded_bytes = encoded_bytes_limit(limits);
        self
    }

    /// Returns the diagnostics sink.
    #[must_use]
    pub const fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    fn recover<T>(&self, field: Field, text: &str, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.diagnostics.field_unparseable(field, &error, text);
                None
            }
        }
    }
}

impl<D: ParseDiagnostics> SignalCodec for TextCodec<D> {
    fn encode(&self, signal: &EntityGroupMoved) -> String {
        signal.to_string()
    }

    fn decode(&self, text: &str) -> EntityGroupMoved {
        if text.len() > self.max_encoded_bytes {
            let error = FieldError::TooLong {
                actual: text.len(),
                max: self.max_encoded_bytes,
            };
            let shown = preview(text, PREVIEW_BYTES);
            self.diagnostics.field_unparseable(Field::Hostname, &error, shown);
            self.diagnostics.field_unparseable(Field::Port, &error, shown);
            return EntityGroupMoved::from_parts(None, UNKNOWN_PORT);
        }

        let hostname = self.recover(Field::Hostname, text, extract_hostname(text));
        let port = self
            .recover(Field::Port, text, extract_port(text))
            .unwrap_or(UNKNOWN_PORT);
        EntityGroupMoved::from_parts(hostname, port)
    }
}

fn encoded_bytes_limit(limits: &Limits) -> usize {
    usize::try_from(limits.max_encoded_bytes).unwrap_or(usize::MAX)
}

/// Extracts the hostname: the text after `hostname=` up to the next space.
///
/// # Errors
///
/// Returns an error if the marker or the terminating space is missing, or
/// the hostname is empty.
pub fn extract_hostname(text: &str) -> Result<String, FieldError> {
    let value = field_value(text, HOSTNAME_FIELD, HOSTNAME_TERMINATOR)?;
    if value.is_empty() {
        return Err(FieldError::Empty {
            marker: HOSTNAME_FIELD,
        });
    }
    Ok(value.to_owned())
}

/// Extracts the port: the text after `port=` up to the next period.
///
/// # Errors
///
/// Returns an error if the marker or the terminating period is missing, or
/// the value is not a base-10 `i32`.
pub fn extract_port(text: &str) -> Result<i32, FieldError> {
    let value = field_value(text, PORT_FIELD, PORT_TERMINATOR)?;
    value.parse::<i32>().map_err(|source| FieldError::InvalidPort {
        value: value.to_owned(),
        source,
    })
}

fn field_value<'a>(
    text: &'a str,
    marker: &'static str,
    terminator: char,
) -> Result<&'a str, FieldError> {
    let start = text
        .find(marker)
        .ok_or(FieldError::MissingMarker { marker })?
        + marker.len();
    let rest = &text[start..];
    let end = rest
        .find(terminator)
        .ok_or(FieldError::Unterminated { marker, terminator })?;
    Ok(&rest[..end])
}

/// Returns at most `max` bytes of `text`, cut on a char boundary.
fn preview(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
