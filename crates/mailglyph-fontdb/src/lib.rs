// this_file: crates/mailglyph-fontdb/src/lib.rs

//! Font discovery for mailglyph: directory scanning, the font catalog and
//! name-or-path resolution.

pub mod catalog;
pub mod resolver;
pub mod scanner;

pub use catalog::{CatalogIndex, FontCatalog};
pub use resolver::{closest_match, levenshtein, FontResolver};
pub use scanner::{fonts_in_directory, DirectoryFontScanner, FONT_DIR_ENV};
