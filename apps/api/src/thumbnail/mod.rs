pub mod handlers;
pub mod prompts;
pub mod rate_limit;
pub mod safety;
