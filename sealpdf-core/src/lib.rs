//! # sealpdf
//!
//! An in-memory PDF indirect object graph with a standard security handler.
//!
//! ## Features
//!
//! - **Object graph**: register, assign and delete indirect objects, resolve
//!   references with type checks
//! - **Literals**: build dictionaries and arrays from native values
//! - **Content streams**: operator lists rendered (and deflated) at write time
//! - **Encryption**: RC4 40/128-bit, AES-128 and AES-256 picked from the PDF
//!   version, with owner/user passwords and permission flags
//! - **Writer**: classic cross-reference output with per-object encryption
//!
//! ## Quick Start
//!
//! ```rust
//! use sealpdf::{save_to_bytes, Literal, ObjectGraph, PdfVersion, SecurityConfig, WriterConfig};
//!
//! # fn main() -> sealpdf::Result<()> {
//! let mut graph = ObjectGraph::new();
//! graph.set_version(PdfVersion::V1_7);
//!
//! let pages = graph.next_ref();
//! let catalog = graph.obj(Literal::dict([
//!     ("Type", Literal::from("Catalog")),
//!     ("Pages", Literal::from(pages)),
//! ]));
//! let root = graph.register(catalog);
//! let tree = graph.obj(Literal::dict([
//!     ("Type", Literal::from("Pages")),
//!     ("Kids", Literal::array([])),
//!     ("Count", Literal::from(0)),
//! ]));
//! graph.assign(pages, tree)?;
//! graph.trailer_mut().root = Some(root);
//!
//! let security = SecurityConfig::new().with_user_password("secret");
//! let bytes = save_to_bytes(&mut graph, Some(&security), WriterConfig::default())?;
//! assert!(bytes.starts_with(b"%PDF-1.7"));
//! # Ok(())
//! # }
//! ```

pub mod encryption;
pub mod error;
pub mod graph;
pub mod objects;
pub mod version;
pub mod writer;

pub use encryption::{
    PermissionFlags, Permissions, PrintingPermission, SecurityConfig, SecurityHandler,
};
pub use error::{PdfError, Result};
pub use graph::{ObjectGraph, TrailerInfo, MAX_OBJECT_NUMBER};
pub use objects::{Dictionary, Literal, LiteralConfig, Object, ObjectId, Operator, Stream};
pub use version::PdfVersion;
pub use writer::{save_to_bytes, save_to_file, PdfWriter, WriterConfig};

/// Current version of sealpdf
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
