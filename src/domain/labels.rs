/// Lowercases and drops everything but letters and digits, so that
/// `Pending Approval`, `pending-approval` and `PENDING_APPROVAL` compare equal.
pub fn normalize_label(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Declares a closed set of string labels that serialize exactly as written
/// and parse leniently from spreadsheet cells.
macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub fn from_label(value: &str) -> Option<Self> {
                let wanted = $crate::domain::labels::normalize_label(value);
                if wanted.is_empty() {
                    return None;
                }
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| $crate::domain::labels::normalize_label(candidate.label()) == wanted)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

pub(crate) use labelled_enum;
