pub mod parse;
pub mod summarize;
