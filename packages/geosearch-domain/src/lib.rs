pub mod date_serde;
pub mod dictionary;
pub mod expand;
pub mod filter;
pub mod fusion;
pub mod tagger;
pub mod text;
