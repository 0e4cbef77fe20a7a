pub mod document;
pub mod enums;
pub mod user;

pub use document::*;
pub use enums::*;
pub use user::*;
