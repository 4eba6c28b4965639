//! Brownfield codebase analysis.

mod analyzer;

pub use analyzer::CodebaseAnalyzer;
