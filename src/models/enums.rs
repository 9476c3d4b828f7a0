//! Shared domain enums stored as text columns

use serde::{Deserialize, Serialize};
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    mysql::{MySqlTypeInfo, MySqlValueRef},
    Decode, Encode, MySql,
};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

/// Declares an enum persisted as its snake_case label, with serde, Display,
/// FromStr and sqlx conversions that go through the label.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {} value: {}", stringify!($name), s)),
                }
            }
        }

        impl sqlx::Type<MySql> for $name {
            fn type_info() -> MySqlTypeInfo {
                <str as sqlx::Type<MySql>>::type_info()
            }

            fn compatible(ty: &MySqlTypeInfo) -> bool {
                <str as sqlx::Type<MySql>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, MySql> for $name {
            fn decode(value: MySqlValueRef<'r>) -> Result<Self, BoxDynError> {
                let s = <&str as Decode<MySql>>::decode(value)?;
                s.parse().map_err(Into::into)
            }
        }

        impl Encode<'_, MySql> for $name {
            fn encode_by_ref(&self, buf: &mut Vec<u8>) -> IsNull {
                <&str as Encode<MySql>>::encode(self.as_str(), buf)
            }
        }
    };
}

text_enum! {
    /// Account role
    pub enum UserRole {
        Admin => "admin",
        Manager => "manager",
        Technician => "technician",
        Operator => "operator",
        User => "user",
    }
}

text_enum! {
    /// Account lifecycle; accounts are deactivated, never deleted
    pub enum UserStatus {
        Active => "active",
        Deactivated => "deactivated",
    }
}

text_enum! {
    /// Operational condition of a piece of equipment
    pub enum EquipmentStatus {
        Operational => "operational",
        UnderMaintenance => "under_maintenance",
        Broken => "broken",
        Scrapped => "scrapped",
    }
}

text_enum! {
    /// Team lifecycle; deleting a team archives it
    pub enum TeamLifecycle {
        Active => "active",
        Archived => "archived",
    }
}

text_enum! {
    pub enum WorkCenterStatus {
        Active => "active",
        Inactive => "inactive",
        Maintenance => "maintenance",
    }
}

text_enum! {
    pub enum RequestType {
        Corrective => "corrective",
        Preventive => "preventive",
    }
}

text_enum! {
    /// Workflow stage of a maintenance request
    pub enum RequestStage {
        New => "new",
        InProgress => "in_progress",
        Repaired => "repaired",
        Scrap => "scrap",
    }
}

text_enum! {
    pub enum RequestPriority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

impl Default for EquipmentStatus {
    fn default() -> Self {
        EquipmentStatus::Operational
    }
}

impl Default for WorkCenterStatus {
    fn default() -> Self {
        WorkCenterStatus::Active
    }
}

impl Default for RequestType {
    fn default() -> Self {
        RequestType::Corrective
    }
}

impl Default for RequestPriority {
    fn default() -> Self {
        RequestPriority::Medium
    }
}

impl RequestStage {
    /// Repaired and scrap end the active life of a request
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStage::Repaired | RequestStage::Scrap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_serde_names() {
        for stage in RequestStage::ALL {
            let json = serde_json::to_string(stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage.as_str()));
            assert_eq!(stage.as_str().parse::<RequestStage>().unwrap(), *stage);
        }
        assert_eq!(
            serde_json::to_string(&EquipmentStatus::UnderMaintenance).unwrap(),
            "\"under_maintenance\""
        );
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert!("done".parse::<RequestStage>().is_err());
        assert!("Admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn terminal_stages() {
        assert!(RequestStage::Repaired.is_terminal());
        assert!(RequestStage::Scrap.is_terminal());
        assert!(!RequestStage::New.is_terminal());
        assert!(!RequestStage::InProgress.is_terminal());
    }
}
