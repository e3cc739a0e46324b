//! Ids for use in typed collections.

macro_rules! id {
    ($name:ident, $ty:ty) => {
        #[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $name($ty);

        impl From<$name> for usize {
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl From<usize> for $name {
            fn from(val: usize) -> $name {
                Self(val as $ty)
            }
        }

        impl From<$name> for $ty {
            fn from(id: $name) -> $ty {
                id.0
            }
        }

        impl From<$ty> for $name {
            fn from(val: $ty) -> $name {
                Self(val)
            }
        }
    };
}

// raw string ids from the workflow document (node, port, trigger and edge ids):
id!(IdentId, u32);
// display names (node labels, port names):
id!(NameId, u16);

id!(NodeId, u16);
id!(PortId, u16);
id!(TriggerId, u8);
id!(EdgeId, u32);
