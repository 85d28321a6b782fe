//! Macro for the non-blank string identifiers used on the wire.
//!
//! Sheet names and spreadsheet ids both travel as plain JSON strings, but a
//! blank one is never meaningful to the remote service. The macro generates
//! the wrapper plus the conversions the rest of the workspace relies on.

/// Define a string newtype that rejects blank (empty or whitespace-only) values.
///
/// Generates `try_new()` (returns `Option`), `as_str()`, `into_inner()`,
/// `Display`, `AsRef<str>`, `Deref<Target = str>`, `Borrow<str>`,
/// `TryFrom<String>`, `TryFrom<&str>`, `PartialEq<str>`/`<&str>` and serde
/// impls that validate on the way in.
macro_rules! define_wire_name {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
        #[serde(transparent)]
        $vis struct $Name(String);

        impl<'de> serde::Deserialize<'de> for $Name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $Name::try_new(s).ok_or_else(|| {
                    serde::de::Error::custom(concat!(stringify!($Name), " must not be blank"))
                })
            }
        }

        impl $Name {
            /// Wrap `value`, returning `None` when it is empty or whitespace-only.
            pub fn try_new(value: impl Into<String>) -> Option<Self> {
                let s = value.into();
                if s.trim().is_empty() {
                    None
                } else {
                    Some(Self(s))
                }
            }

            /// Return the wrapped value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the inner `String`.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $Name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::ops::Deref for $Name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $Name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $Name {
            type Error = &'static str;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                $Name::try_new(s).ok_or(concat!(stringify!($Name), " must not be blank"))
            }
        }

        impl TryFrom<&str> for $Name {
            type Error = &'static str;
            fn try_from(s: &str) -> Result<Self, Self::Error> {
                $Name::try_new(s).ok_or(concat!(stringify!($Name), " must not be blank"))
            }
        }

        impl PartialEq<str> for $Name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $Name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

pub(crate) use define_wire_name;
