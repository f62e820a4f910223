mod dictionary;
mod literal;
mod operator;
mod primitive;
mod stream;

pub use dictionary::Dictionary;
pub use literal::{Literal, LiteralConfig};
pub use operator::{Operator, POP_GRAPHICS_STATE, PUSH_GRAPHICS_STATE};
pub use primitive::{Object, ObjectId, ObjectKind};
pub use stream::{Stream, StreamContent};

#[cfg(feature = "compression")]
pub(crate) use stream::deflate;
