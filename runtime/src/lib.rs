//! The value library generated LOLCODE programs run against.
//!
//! Every storage slot of a compiled program holds a [`Value`]. The functions
//! in this crate implement the dynamic-type rules of the language (casts,
//! arithmetic, equality, truthiness) and are the only place those rules live;
//! the compiler never evaluates them itself.

pub mod cast;
pub mod error;
pub mod io;
pub mod ops;
pub mod value;

pub use error::Error;
pub use ops::Builtin;
pub use value::{Kind, Value};

pub type Result<T, E = Error> = std::result::Result<T, E>;
