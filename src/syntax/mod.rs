//! Source text in, source text out.
//!
//! [`parser`] turns Go-like text into a [`Program`](crate::ast::Program);
//! [`printer`] renders a program back in canonical form; [`layout`] holds
//! the indentation and delimiter scanning both share. None of them knows
//! anything about macros.

pub mod layout;
pub mod parser;
pub mod printer;

pub use parser::parse;
pub use printer::format_program;
