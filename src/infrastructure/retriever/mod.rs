mod static_retriever;

pub use static_retriever::StaticRetriever;
