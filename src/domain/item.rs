//! Shopping list item and login credentials.

use super::error::{Result, SessionError};
use serde::{Deserialize, Serialize};

/// A single entry of the shopping list.
///
/// The server owns identity: `id` stays empty until the server has stored the
/// item and handed it back through a list fetch. Field names on the wire follow
/// the server's document shape (`_id`, `type`, `count`, `price`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    /// Server-assigned identifier, empty for items not yet stored.
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Free-text category, e.g. "milk".
    #[serde(rename = "type")]
    pub item_type: String,

    /// Quantity. Fractional amounts (e.g. 1.5 kg) are allowed.
    #[serde(default)]
    pub count: f64,

    /// Unit price.
    #[serde(default)]
    pub price: f64,
}

impl ShoppingItem {
    /// Creates an item that has not been stored server-side yet.
    ///
    /// # Examples
    ///
    /// ```
    /// use shopping_session::ShoppingItem;
    ///
    /// let item = ShoppingItem::new("milk", 2, 1.25);
    /// assert!(item.id.is_empty());
    /// assert!((item.total() - 2.5).abs() < f64::EPSILON);
    /// ```
    pub fn new(item_type: impl Into<String>, count: impl Into<f64>, price: f64) -> Self {
        Self {
            id: String::new(),
            item_type: item_type.into(),
            count: count.into(),
            price,
        }
    }

    /// Returns a copy carrying the given server identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Line total (`count × price`).
    #[must_use]
    pub fn total(&self) -> f64 {
        self.count * self.price
    }

    /// Checks the item is fit to send to the server.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidItem`] if the type is blank, or the count
    /// or price is negative or not a finite number.
    pub fn validate(&self) -> Result<()> {
        if self.item_type.trim().is_empty() {
            return Err(SessionError::InvalidItem("type must not be empty".to_string()));
        }
        if !self.count.is_finite() || self.count < 0.0 {
            return Err(SessionError::InvalidItem(format!(
                "count must be a non-negative number, got {}",
                self.count
            )));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(SessionError::InvalidItem(format!(
                "price must be a non-negative number, got {}",
                self.price
            )));
        }
        Ok(())
    }
}

/// Username and password used to build register/login bodies.
///
/// Never stored in the session state.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
