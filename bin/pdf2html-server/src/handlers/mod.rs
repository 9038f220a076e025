//! Conversion services used by the HTTP routes.

pub mod pdf2html;
pub mod staging;
