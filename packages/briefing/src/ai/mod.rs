//! Language model implementations.

mod openai;

pub use openai::OpenAI;
