//! Infrastructure layer - orchestration and external service adapters

pub mod answering;
pub mod deadline;
pub mod events;
pub mod http_client;
pub mod llm;
pub mod logging;
pub mod observability;
pub mod oracle;
pub mod rag;
pub mod retriever;
