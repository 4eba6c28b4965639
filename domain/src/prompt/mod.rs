//! Prompt domain
//!
//! Built-in task prompts for each planning phase and the layout of a phase
//! request.

mod template;

pub use template::PhasePrompt;
