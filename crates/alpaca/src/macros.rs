// Defines a token enum backed by a single table of wire names.
//
// The table drives both the matchers (`from_name`, `from_name_ignore_case`)
// and the printers (`name`, `Debug`, `Display`, `Serialize`).
macro_rules! wire_names {
    (
        $(#[$meta:meta])*
        $all:ident => $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $text:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        #[doc = concat!("All [`", stringify!($name), "`]s, in table order.")]
        pub const $all: &[$name] = &[$($name::$variant,)+];

        impl $name {
            #[doc = concat!("Returns the [`", stringify!($name), "`] name as it appears on the wire.")]
            #[must_use]
            pub const fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            #[doc = concat!("Finds the [`", stringify!($name), "`] whose name is exactly `name`.")]
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                $all.iter().copied().find(|token| token.name() == name)
            }

            #[doc = concat!(
                "Finds the [`", stringify!($name), "`] whose name is equal to `name`, ",
                "ignoring ASCII case."
            )]
            #[must_use]
            pub fn from_name_ignore_case(name: &str) -> Option<Self> {
                $all
                    .iter()
                    .copied()
                    .find(|token| token.name().eq_ignore_ascii_case(name))
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.name())
            }
        }

        #[cfg(feature = "deserialize")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let name =
                    <alloc::borrow::Cow<'_, str> as serde::Deserialize<'de>>::deserialize(deserializer)?;
                Self::from_name(&name).ok_or_else(|| {
                    <D::Error as serde::de::Error>::custom(format_args!(
                        "unknown {} `{}`",
                        stringify!($name),
                        name
                    ))
                })
            }
        }
    };
}

pub(crate) use wire_names;
