pub mod analysis;
pub mod api_types;
pub mod budget;
pub mod collect;
pub mod config;
pub mod error;
pub mod fallback;
pub mod fetch;
pub mod limiter;
pub mod llm;
pub mod models;
pub mod orchestrator;
pub mod out_models;
pub mod prompts;
pub mod render;
pub mod report;
pub mod scoring;
pub mod similarity;
pub mod theme;
