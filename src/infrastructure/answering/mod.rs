//! Answer generation with trust scoring

mod client;

pub use client::AnsweringClient;
