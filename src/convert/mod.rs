//! Conversion of extracted intermediate collections into the canonical
//! metadata document and its schema projection.

pub mod assembler;
