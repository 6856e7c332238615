//! Score oracle implementations

mod http_oracle;

pub use http_oracle::HttpScoreOracle;
