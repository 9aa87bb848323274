pub mod config;
pub mod errors;
pub mod intent;
pub mod llm;
pub mod logging;
pub mod prompt;
pub mod rag;
pub mod server;
pub mod state;
pub mod vector_math;
pub mod widget;
