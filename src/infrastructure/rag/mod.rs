//! Retrieval-augmented answering with trust scores

mod facade;
mod state;

pub use facade::{RagAnswer, RagFacade};
pub use state::{QueryLifecycle, QueryState};
