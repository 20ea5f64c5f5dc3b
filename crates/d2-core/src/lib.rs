//! D2 Core Types and Definitions
//!
//! This crate provides the foundational types shared by the D2 parser and
//! its tooling. It includes:
//!
//! - **Identifiers**: String-interned shape paths ([`identifier::Id`])
//! - **Colors**: CSS color parsing for style values ([`color::Color`])
//! - **Keywords**: Reserved keywords and the shape catalogue ([`keyword`] module)
//! - **Styles**: Style keywords and their value validators ([`style`] module)

pub mod color;
pub mod identifier;
pub mod keyword;
pub mod style;
