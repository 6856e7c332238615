//! Generation backends

mod openai;

pub use openai::OpenAiGenerator;
