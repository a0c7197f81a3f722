//! External advisor adapters.

pub mod openai;

pub use openai::{advisor_budget_from_env, OpenAiAdvisor};
