pub mod dub;
pub mod gemini;
pub mod murf;
pub mod pdf;
pub mod poller;
pub mod relay;
