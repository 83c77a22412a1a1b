//! Text conversion: BBCode tags and markdown rendering.

pub mod bbcode;
pub mod markdown;

pub use bbcode::underline_to_markdown;
pub use markdown::{markdown_to_html, render_markdown};
