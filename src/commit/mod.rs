//! Conventional commit grammar: configuration, compiled matchers and parsing.

pub mod grammar;
pub mod keywords;
pub mod parser;
pub mod record;

pub use grammar::{CommitGrammar, ParserOptions};
pub use keywords::KeywordMatcher;
pub use parser::ParseOutcome;
pub use record::{CommitRecord, Note, RawCommit, Reference};
