//! Domain layer for the shopping session core.
//!
//! Plain data types shared by every other layer, independent of HTTP or
//! storage concerns.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`item`]: Shopping list item and login credentials
//!
//! # Examples
//!
//! ```
//! use shopping_session::domain::{Result, ShoppingItem};
//!
//! fn checked(item: ShoppingItem) -> Result<ShoppingItem> {
//!     item.validate()?;
//!     Ok(item)
//! }
//!
//! assert!(checked(ShoppingItem::new("apples", 3, 0.4)).is_ok());
//! ```

pub mod error;
pub mod item;

pub use error::{Result, SessionError};
pub use item::{Credentials, ShoppingItem};
