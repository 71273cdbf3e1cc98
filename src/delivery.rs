//! Delivery options

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Day on which pickup orders are ready.
pub const PICKUP_DAY: &str = "Wednesday";

/// Where pickup orders are collected from.
pub const PICKUP_LOCATION: &str = "2 Bissell St, Birmingham B5 7HP";

/// Day on which delivery orders go out.
pub const DELIVERY_DAY: &str = "Thursday";

/// Unrecognised delivery option name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown delivery option: {0} (expected pickup or delivery)")]
pub struct ParseDeliveryOptionError(String);

/// How the customer receives the order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOption {
    /// Collected from the bakery
    #[default]
    Pickup,

    /// Delivered to the customer's address
    Delivery,
}

impl DeliveryOption {
    /// Wire name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pickup => "pickup",
            Self::Delivery => "delivery",
        }
    }

    /// Day the order is handed over.
    pub const fn day(self) -> &'static str {
        match self {
            Self::Pickup => PICKUP_DAY,
            Self::Delivery => DELIVERY_DAY,
        }
    }

    /// Whether the customer must supply an address.
    pub const fn requires_address(self) -> bool {
        matches!(self, Self::Delivery)
    }
}

impl fmt::Display for DeliveryOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryOption {
    type Err = ParseDeliveryOptionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pickup" | "collection" => Ok(Self::Pickup),
            "delivery" => Ok(Self::Delivery),
            _ => Err(ParseDeliveryOptionError(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_pickup() {
        assert_eq!(DeliveryOption::default(), DeliveryOption::Pickup);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Delivery".parse(), Ok(DeliveryOption::Delivery));
        assert_eq!(" pickup ".parse(), Ok(DeliveryOption::Pickup));
        assert!("courier".parse::<DeliveryOption>().is_err());
    }

    #[test]
    fn only_delivery_needs_an_address() {
        assert!(DeliveryOption::Delivery.requires_address());
        assert!(!DeliveryOption::Pickup.requires_address());
    }
}
