pub mod chars;
pub mod document;
pub mod position;
