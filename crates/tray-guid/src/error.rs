use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid guid: must be 36 chars (got {got})")]
    #[diagnostic(
        code(tray_guid::bad_size),
        help("expected the form 01234567-89ab-cdef-0123-456789abcdef")
    )]
    BadSize { got: usize },

    #[error("invalid guid: must have '-' at offsets 8, 13, 18 and 23")]
    #[diagnostic(code(tray_guid::bad_hyphens))]
    BadHyphens,

    #[error("invalid guid: invalid hexadecimal characters")]
    #[diagnostic(code(tray_guid::bad_hex))]
    BadHex,

    #[error("invalid guid buffer: must be 16 bytes (got {got})")]
    #[diagnostic(code(tray_guid::bad_buffer_size))]
    BadBufferSize { got: usize },
}
