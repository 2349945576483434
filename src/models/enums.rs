use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(TreatmentStatus {
    Applied => "applied",
    Pending => "pending",
});

str_enum!(MatchKind {
    Exact => "exact",
    Partial => "partial",
});

str_enum!(SymptomClass {
    Healthy => "healthy",
    Unhealthy => "unhealthy",
});

str_enum!(Verdict {
    NoSelection => "no_selection",
    Healthy => "healthy",
    Matched => "matched",
    Ambiguous => "ambiguous",
    Unknown => "unknown",
});

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn treatment_status_round_trips_through_str() {
        assert_eq!(TreatmentStatus::from_str("applied").unwrap(), TreatmentStatus::Applied);
        assert_eq!(TreatmentStatus::Pending.as_str(), "pending");
    }

    #[test]
    fn unknown_value_is_invalid_enum() {
        let err = MatchKind::from_str("fuzzy").unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::InvalidEnum { ref field, ref value } if field == "MatchKind" && value == "fuzzy"
        ));
    }

    #[test]
    fn verdict_serializes_snake_case() {
        let json = serde_json::to_string(&Verdict::NoSelection).unwrap();
        assert_eq!(json, "\"no_selection\"");
    }
}
