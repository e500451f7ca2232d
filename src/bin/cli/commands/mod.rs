pub mod headings;
pub mod migrate;
pub mod replacements;
pub mod tree;
