use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("icon stream too small for header: {size} bytes (need {needed})")]
    #[diagnostic(code(icon_stream::header_too_small))]
    HeaderTooSmall { size: usize, needed: usize },

    #[error("icon stream item list offset {offset} is past the end of the buffer ({size} bytes)")]
    #[diagnostic(code(icon_stream::item_list_out_of_bounds))]
    ItemListOutOfBounds { offset: usize, size: usize },

    #[error("icon record #{index} out of bounds: off={offset}, end={end}, size={size}")]
    #[diagnostic(
        code(icon_stream::record_out_of_bounds),
        help("the header promises more records than the buffer holds")
    )]
    RecordOutOfBounds {
        index: u32,
        offset: usize,
        end: usize,
        size: usize,
    },

    #[error("integer overflow")]
    #[diagnostic(code(icon_stream::integer_overflow))]
    IntegerOverflow,
}
