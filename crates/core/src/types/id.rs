//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. IDs come from a
//! spreadsheet or are generated at checkout, so they wrap free-form strings.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `Default`
/// - Conversion methods: `new()`, `as_str()`, `is_empty()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use neon_core::define_id;
/// define_id!(SkuId);
/// define_id!(InvoiceId);
///
/// let sku = SkuId::new("LS00001");
/// let invoice = InvoiceId::new("LS00001");
///
/// // These are different types, so this won't compile:
/// // let _: SkuId = invoice;
/// assert_eq!(sku.as_str(), invoice.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            Default,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the ID is the empty string.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(OrderId);

impl ProductId {
    /// Numeric sort key: the digits of the ID read as one number.
    ///
    /// `"LS00002"` yields 2 and `"3"` yields 3. IDs without any digit yield 0.
    /// Overlong digit runs saturate instead of wrapping.
    #[must_use]
    pub fn numeric_key(&self) -> u64 {
        self.0
            .chars()
            .filter_map(|c| c.to_digit(10))
            .fold(0_u64, |acc, d| {
                acc.saturating_mul(10).saturating_add(u64::from(d))
            })
    }
}

impl OrderId {
    /// Order IDs are `ORD-` followed by the creation time in Unix milliseconds.
    #[must_use]
    pub fn from_timestamp_millis(millis: i64) -> Self {
        Self(format!("ORD-{millis}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_key_strips_prefix() {
        assert_eq!(ProductId::new("LS00002").numeric_key(), 2);
        assert_eq!(ProductId::new("3").numeric_key(), 3);
        assert_eq!(ProductId::new("A1B2").numeric_key(), 12);
    }

    #[test]
    fn test_numeric_key_without_digits_is_zero() {
        assert_eq!(ProductId::new("abc").numeric_key(), 0);
        assert_eq!(ProductId::new("").numeric_key(), 0);
    }

    #[test]
    fn test_numeric_key_saturates() {
        let id = ProductId::new("9".repeat(40));
        assert_eq!(id.numeric_key(), u64::MAX);
    }

    #[test]
    fn test_order_id_format() {
        let id = OrderId::from_timestamp_millis(1_700_000_000_123);
        assert_eq!(id.as_str(), "ORD-1700000000123");
    }

    #[test]
    fn test_serde_transparent() {
        let id = ProductId::new("LS00001");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"LS00001\"");
    }
}
