use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, FieldError};
use crate::types::{max_money, Money};

/// Room category. Stored and serialized in uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomCategory {
    Historic,
    MountainView,
    FamilyCabin,
}

impl RoomCategory {
    pub const ALL: [RoomCategory; 3] = [Self::Historic, Self::MountainView, Self::FamilyCabin];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Historic => "HISTORIC",
            Self::MountainView => "MOUNTAIN_VIEW",
            Self::FamilyCabin => "FAMILY_CABIN",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let upper = raw.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == upper)
            .ok_or_else(|| CoreError::Validation(format!("Unknown room type '{raw}'")))
    }
}

impl fmt::Display for RoomCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field checks shared by room create and update. `None` means the field was
/// not supplied and is skipped.
pub fn validate_room_fields(
    name: Option<&str>,
    room_number: Option<&str>,
    capacity: Option<i32>,
    base_price: Option<Money>,
) -> Result<(), CoreError> {
    let mut errors = Vec::new();

    if name.is_some_and(|n| n.trim().is_empty()) {
        errors.push(FieldError::new("name", "Room name is required"));
    }
    if room_number.is_some_and(|n| n.trim().is_empty()) {
        errors.push(FieldError::new("roomNumber", "Room number is required"));
    }
    if capacity.is_some_and(|c| c < 1) {
        errors.push(FieldError::new("capacity", "Capacity must be at least 1"));
    }
    if let Some(price) = base_price {
        if price <= Decimal::ZERO {
            errors.push(FieldError::new("basePrice", "Base price must be positive"));
        } else if price > max_money() {
            errors.push(FieldError::new(
                "basePrice",
                format!("Base price must not exceed {}", max_money()),
            ));
        } else if price.round_dp(2) != price {
            errors.push(FieldError::new(
                "basePrice",
                "Base price must have at most two decimal places",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::InvalidFields(errors))
    }
}
