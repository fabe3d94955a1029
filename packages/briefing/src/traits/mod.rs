//! Collaborator traits for the briefing library.
//!
//! Applications implement these to plug in a language model, web search
//! providers and article storage.

pub mod ai;
pub mod searcher;
pub mod store;
