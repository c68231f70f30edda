//! Serde helpers for keyword enums
//!
//! CFML keywords are case-insensitive, so enums parsed from source or from
//! JSON configuration accept any casing and optional aliases.

/// Implement case-insensitive deserialization for a fieldless enum
///
/// Usage:
/// ```ignore
/// impl_case_insensitive_deserialize!(
///     Access,
///     Public => "public",
///     Private => "private" | "hidden"
/// );
/// ```
#[macro_export]
macro_rules! impl_case_insensitive_deserialize {
    ($enum_type:ty, $($variant:ident => $($str_val:literal)|+),+ $(,)?) => {
        impl<'de> ::serde::Deserialize<'de> for $enum_type {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let s = <::std::string::String as ::serde::Deserialize>::deserialize(deserializer)?;
                match s.to_lowercase().as_str() {
                    $(
                        $($str_val)|+ => ::std::result::Result::Ok(Self::$variant),
                    )+
                    _ => ::std::result::Result::Err(<D::Error as ::serde::de::Error>::custom(::std::format!(
                        "unknown variant '{}', expected one of: {}",
                        s,
                        [$($($str_val),+),+].join(", ")
                    ))),
                }
            }
        }
    };
}
