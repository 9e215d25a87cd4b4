//! LaTeX Renderer: turns loaded content into a finished document.
//!
//! `context` builds the placeholder values, `template` substitutes them.

pub mod context;
pub mod dates;
pub mod latex;
pub mod template;
