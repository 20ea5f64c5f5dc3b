//! Error codes for the D2 diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Scanner errors
//! - `E1xx` - Parser errors
//! - `E2xx` - Validation errors

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Scanner Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A quoted string reached the end of its line without a closing quote.
    E001,

    /// Unexpected character.
    ///
    /// A control character appeared outside a string or comment.
    E002,

    /// Invalid escape sequence.
    ///
    /// Valid escapes are: `\n`, `\r`, `\t`, `\\`, `\"`, `\'`, `\/`, `\0`,
    /// and a backslash before a space or `#`.
    E003,

    /// Unterminated block comment.
    ///
    /// A `"""` comment was never closed.
    E004,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    E100,

    /// Unexpected end of input.
    ///
    /// The input ended inside an array.
    E101,

    /// Unclosed block.
    ///
    /// A `{` has no matching `}`.
    E102,

    /// Missing connection endpoint.
    ///
    /// A connector is not followed by a shape or inline block.
    E103,

    /// Anonymous block outside a shape.
    ///
    /// A `{ ... }` block at document level is not attached to any shape.
    E104,

    /// Nesting too deep.
    E105,

    // =========================================================================
    // Validation Errors (E2xx)
    // =========================================================================
    /// Unknown keyword.
    ///
    /// A key inside a `style` map or connection block is not a known keyword.
    E200,

    /// Invalid style value.
    E201,

    /// Unknown shape type.
    E202,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "invalid escape sequence",
            ErrorCode::E004 => "unterminated block comment",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "unexpected end of input",
            ErrorCode::E102 => "unclosed block",
            ErrorCode::E103 => "missing connection endpoint",
            ErrorCode::E104 => "anonymous block outside a shape",
            ErrorCode::E105 => "nesting too deep",
            ErrorCode::E200 => "unknown keyword",
            ErrorCode::E201 => "invalid style value",
            ErrorCode::E202 => "unknown shape type",
        }
    }

    /// Returns `true` for codes produced by the scanner.
    pub fn is_lexical(&self) -> bool {
        self.as_str().starts_with("E0")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E103.to_string(), "E103");
        assert_eq!(ErrorCode::E202.to_string(), "E202");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E001.description(), "unterminated string literal");
        assert_eq!(ErrorCode::E102.description(), "unclosed block");
        assert_eq!(ErrorCode::E201.description(), "invalid style value");
    }

    #[test]
    fn test_error_code_phase() {
        assert!(ErrorCode::E004.is_lexical());
        assert!(!ErrorCode::E100.is_lexical());
    }
}
