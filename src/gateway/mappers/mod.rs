// Protocol mappers
// One module per upstream wire format, plus the normalized models

pub mod gemini;
pub mod groq;
pub mod models;

pub use models::*;
