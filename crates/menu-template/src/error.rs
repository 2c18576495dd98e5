use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(code(menu_template::io))]
    Io(#[from] std::io::Error),

    #[error("menu template too small for header: {size} bytes (need 8)")]
    #[diagnostic(code(menu_template::header_too_small))]
    HeaderTooSmall { size: usize },

    #[error("unsupported menu template version: {got} (expected 1)")]
    #[diagnostic(code(menu_template::unsupported_version))]
    UnsupportedVersion { got: u16 },

    #[error("invalid menu template header offset: {got} (must be at least 4)")]
    #[diagnostic(code(menu_template::header_offset))]
    InvalidHeaderOffset { got: u16 },

    #[error("menu item out of bounds: off={offset}, need={needed}, size={size}")]
    #[diagnostic(code(menu_template::item_out_of_bounds))]
    ItemOutOfBounds {
        offset: usize,
        needed: usize,
        size: usize,
    },

    #[error("menu item text at off={offset} has no terminator")]
    #[diagnostic(code(menu_template::unterminated_text))]
    UnterminatedText { offset: usize },

    #[error("menu nesting deeper than {max} levels")]
    #[diagnostic(code(menu_template::nesting_too_deep))]
    NestingTooDeep { max: usize },
}
