//! Content stream operators

use crate::objects::Object;

/// Save graphics state
pub const PUSH_GRAPHICS_STATE: &str = "q";
/// Restore graphics state
pub const POP_GRAPHICS_STATE: &str = "Q";

/// A single content stream instruction: operands followed by the operator name.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    name: String,
    operands: Vec<Object>,
}

impl Operator {
    pub fn new(name: impl Into<String>, operands: Vec<Object>) -> Self {
        Self {
            name: name.into(),
            operands,
        }
    }

    /// Operator without operands
    pub fn of(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn push_graphics_state() -> Self {
        Self::of(PUSH_GRAPHICS_STATE)
    }

    pub fn pop_graphics_state() -> Self {
        Self::of(POP_GRAPHICS_STATE)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operands(&self) -> &[Object] {
        &self.operands
    }
}
