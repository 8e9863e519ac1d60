//! Newtype IDs for type-safe entity references.
//!
//! The Aurora backend stores everything in MongoDB, so entity IDs are opaque
//! 24-character hex strings. Use the `define_id!` macro to create type-safe
//! wrappers that prevent accidentally mixing IDs from different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<String>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use aurora_core::define_id;
/// define_id!(ClientId);
/// define_id!(ProductId);
///
/// let client_id = ClientId::new("64f7b2c8a1b2c3d4e5f6a7b8");
/// let product_id = ProductId::new("64f7b2c8a1b2c3d4e5f6a7b9");
///
/// // These are different types, so this won't compile:
/// // let _: ClientId = product_id;
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
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(ClientId);
define_id!(CartId);
define_id!(QuoteId);
define_id!(BrandId);
define_id!(CategoryId);
define_id!(BranchId);
define_id!(EmployeeId);
define_id!(AppointmentId);
