//! Page markup: discovering the elements the behavior layer binds to

pub mod measure;
pub mod parser;

pub use measure::{tallest_slide, text_block_height};
pub use parser::{PageBindings, parse_html, parse_page};
