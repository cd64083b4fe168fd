use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// One of the eight fixed supply-chain stages a block can record.
///
/// The declaration order is the canonical order: it matches the numbering
/// used by the session menu (1-8) and the order of [`Stage::ALL`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Procurement,
    InventoryStorage,
    OrderFulfillment,
    Transportation,
    CustomerDeliverySatisfaction,
    QualityControl,
    ProductReturn,
    ProductWorthiness,
}

impl Stage {
    /// Number of stages; also the maximum number of appends per ledger.
    pub const COUNT: usize = 8;

    /// Every stage in canonical order.
    pub const ALL: [Stage; Stage::COUNT] = [
        Stage::Procurement,
        Stage::InventoryStorage,
        Stage::OrderFulfillment,
        Stage::Transportation,
        Stage::CustomerDeliverySatisfaction,
        Stage::QualityControl,
        Stage::ProductReturn,
        Stage::ProductWorthiness,
    ];

    /// Zero-based position in [`Stage::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// One-based number shown in the stage selection menu.
    pub fn menu_number(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Resolve a one-based menu number.
    pub fn from_menu_number(number: u8) -> Result<Self, TypeError> {
        number
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i as usize).copied())
            .ok_or(TypeError::InvalidStageNumber(number))
    }

    /// Short stage name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Procurement => "Procurement",
            Self::InventoryStorage => "Inventory Storage",
            Self::OrderFulfillment => "Order Fulfillment",
            Self::Transportation => "Transportation",
            Self::CustomerDeliverySatisfaction => "Customer Delivery Satisfaction",
            Self::QualityControl => "Quality Control",
            Self::ProductReturn => "Product Return",
            Self::ProductWorthiness => "Product Worthiness",
        }
    }

    /// Heading stored as the value of every block's leading `Block` field.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Procurement => "Procurement Information",
            Self::InventoryStorage => "Inventory Information",
            Self::OrderFulfillment => "Order Fulfillment Information",
            Self::Transportation => "Transportation Information",
            Self::CustomerDeliverySatisfaction => "Customer Delivery Satisfactory Information",
            Self::QualityControl => "Quality Inspection Control Information",
            Self::ProductReturn => "Product Returns Information",
            Self::ProductWorthiness => "Product Worthiness Information",
        }
    }

    /// Reverse of [`Stage::display_name`].
    pub fn from_display_name(heading: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.display_name() == heading)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = TypeError;

    /// Accepts the short name (any case) or the menu number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(number) = trimmed.parse::<u8>() {
            return Self::from_menu_number(number);
        }
        Self::ALL
            .into_iter()
            .find(|stage| stage.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TypeError::UnknownStage(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_numbers_follow_canonical_order() {
        for (i, stage) in Stage::ALL.iter().enumerate() {
            assert_eq!(stage.index(), i);
            assert_eq!(stage.menu_number() as usize, i + 1);
            assert_eq!(Stage::from_menu_number(stage.menu_number()).unwrap(), *stage);
        }
    }

    #[test]
    fn out_of_range_menu_number_rejected() {
        assert_eq!(Stage::from_menu_number(0), Err(TypeError::InvalidStageNumber(0)));
        assert_eq!(Stage::from_menu_number(9), Err(TypeError::InvalidStageNumber(9)));
    }

    #[test]
    fn display_names_are_distinct_and_reversible() {
        for stage in Stage::ALL {
            assert_eq!(Stage::from_display_name(stage.display_name()), Some(stage));
        }
        assert_eq!(Stage::from_display_name("Genesis"), None);
    }

    #[test]
    fn parse_by_name_or_number() {
        assert_eq!("quality control".parse::<Stage>().unwrap(), Stage::QualityControl);
        assert_eq!(" 4 ".parse::<Stage>().unwrap(), Stage::Transportation);
        assert!(matches!("Shipping".parse::<Stage>(), Err(TypeError::UnknownStage(_))));
    }

    #[test]
    fn display_uses_short_name() {
        assert_eq!(format!("{}", Stage::InventoryStorage), "Inventory Storage");
    }

    #[test]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&Stage::ProductReturn).unwrap();
        let parsed: Stage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Stage::ProductReturn);
    }
}
