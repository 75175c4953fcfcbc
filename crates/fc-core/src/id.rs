use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner shared by node and edge ids.
///
/// The host store hands us string ids every frame; interning keeps the
/// per-frame layout maps keyed by a 4-byte `Copy` handle.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

static COUNTER: AtomicU64 = AtomicU64::new(0);

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Spur);

        impl $name {
            /// Intern a string as an id, or return the existing handle.
            pub fn intern(s: &str) -> Self {
                Self(INTERNER.get_or_intern(s))
            }

            /// Resolve back to the host's string id.
            pub fn as_str(&self) -> &str {
                INTERNER.resolve(&self.0)
            }

            /// Generate a fresh id with a prefix, e.g. `slider_12`.
            pub fn with_prefix(prefix: &str) -> Self {
                let n = COUNTER.fetch_add(1, Ordering::Relaxed);
                Self::intern(&format!("{prefix}_{n}"))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::intern(&s))
            }
        }
    };
}

interned_id!(
    /// Identifier of a node in the host graph store.
    NodeId
);

interned_id!(
    /// Identifier of an edge (wire) in the host graph store.
    EdgeId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("adder");
        let b = NodeId::intern("adder");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "adder");
    }

    #[test]
    fn prefixed_ids_are_unique() {
        let a = NodeId::with_prefix("slider");
        let b = NodeId::with_prefix("slider");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("slider_"));
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = EdgeId::intern("e-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"e-1\"");
        let back: EdgeId = serde_json::from_str("\"e-1\"").unwrap();
        assert_eq!(back, id);
    }
}
