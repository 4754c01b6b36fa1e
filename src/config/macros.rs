/// Declare a configuration section with its defaults in one place.
///
/// ```
/// perpkeeper::config_struct! {
///     pub struct RetryConfig {
///         timeout_secs: u64 = 10,
///         enabled: bool = true,
///     }
/// }
/// ```
///
/// Expands to a struct with public fields, a `Default` impl built from the
/// listed values, and serde support with `#[serde(default)]` so a partial
/// TOML section only overrides the keys it names.
#[macro_export]
macro_rules! config_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_name:ident: $field_type:ty = $default_value:expr
            ),*
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field_name: $field_type,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $(
                        $field_name: $default_value,
                    )*
                }
            }
        }
    };
}
