//! Promotional discount types.

use crate::error::CommerceError;
use crate::ids::{DiscountId, ProductId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Kind of discount, for reporting and drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DiscountType {
    /// Percentage off.
    #[default]
    Percent,
    /// Fixed amount off.
    Fixed,
    /// Percentage off, gated on cart quantity.
    Quantity,
    /// Holiday campaign, fixed amount off.
    Holiday,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percent => "percent",
            DiscountType::Fixed => "fixed",
            DiscountType::Quantity => "quantity",
            DiscountType::Holiday => "holiday",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "percent" => Some(DiscountType::Percent),
            "fixed" => Some(DiscountType::Fixed),
            "quantity" => Some(DiscountType::Quantity),
            "holiday" => Some(DiscountType::Holiday),
            _ => None,
        }
    }

    /// Check whether this kind needs a redeem code. Percent promotions
    /// apply automatically on listings; everything else is code-entered.
    pub fn requires_code(&self) -> bool {
        !matches!(self, DiscountType::Percent)
    }
}

/// Kind plus value of a discount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountKind {
    /// Percentage off (percentage points, e.g. 10.0 for 10%).
    Percent { rate: f64 },
    /// Flat amount off.
    Fixed { amount: Money },
    /// Percentage off, active only when the cart holds at least
    /// `min_quantity` units.
    Quantity { rate: f64, min_quantity: i64 },
    /// Flat amount off for a holiday campaign.
    Holiday { amount: Money },
}

impl DiscountKind {
    /// The plain kind tag for this value.
    pub fn discount_type(&self) -> DiscountType {
        match self {
            DiscountKind::Percent { .. } => DiscountType::Percent,
            DiscountKind::Fixed { .. } => DiscountType::Fixed,
            DiscountKind::Quantity { .. } => DiscountType::Quantity,
            DiscountKind::Holiday { .. } => DiscountType::Holiday,
        }
    }
}

/// A promotional discount definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Discount {
    /// Unique discount identifier.
    pub id: DiscountId,
    /// Display name (e.g., "Tết Sale").
    pub name: String,
    /// Redeem code. Required for every kind except percent.
    pub code: Option<String>,
    /// Kind and value.
    pub kind: DiscountKind,
    /// Tie-break rank; the resolution policies interpret it.
    pub priority: i32,
    /// Products this discount is limited to. Empty = all products.
    pub product_ids: Vec<ProductId>,
    /// Start of the validity window (Unix timestamp).
    pub starts_at: i64,
    /// End of the validity window. None = open-ended.
    pub ends_at: Option<i64>,
    /// Whether the discount is switched on.
    pub is_active: bool,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Discount {
    /// Create a percentage discount, valid from now, applying to all
    /// products.
    pub fn percent(name: impl Into<String>, rate: f64) -> Self {
        let now = current_timestamp();
        Self {
            id: DiscountId::generate(),
            name: name.into(),
            code: None,
            kind: DiscountKind::Percent { rate },
            priority: 0,
            product_ids: Vec::new(),
            starts_at: now,
            ends_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a fixed amount discount.
    pub fn fixed(name: impl Into<String>, code: impl Into<String>, amount: Money) -> Self {
        let now = current_timestamp();
        Self {
            id: DiscountId::generate(),
            name: name.into(),
            code: Some(code.into()),
            kind: DiscountKind::Fixed { amount },
            priority: 0,
            product_ids: Vec::new(),
            starts_at: now,
            ends_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a quantity-gated percentage discount.
    pub fn quantity(
        name: impl Into<String>,
        code: impl Into<String>,
        rate: f64,
        min_quantity: i64,
    ) -> Self {
        let now = current_timestamp();
        Self {
            id: DiscountId::generate(),
            name: name.into(),
            code: Some(code.into()),
            kind: DiscountKind::Quantity { rate, min_quantity },
            priority: 0,
            product_ids: Vec::new(),
            starts_at: now,
            ends_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a holiday campaign discount.
    pub fn holiday(name: impl Into<String>, code: impl Into<String>, amount: Money) -> Self {
        let now = current_timestamp();
        Self {
            id: DiscountId::generate(),
            name: name.into(),
            code: Some(code.into()),
            kind: DiscountKind::Holiday { amount },
            priority: 0,
            product_ids: Vec::new(),
            starts_at: now,
            ends_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the tie-break priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Limit the discount to specific products.
    pub fn with_products(mut self, product_ids: Vec<ProductId>) -> Self {
        self.product_ids = product_ids;
        self
    }

    /// Set the start of the validity window.
    pub fn starting_at(mut self, timestamp: i64) -> Self {
        self.starts_at = timestamp;
        self
    }

    /// Set the end of the validity window.
    pub fn expires_at(mut self, timestamp: i64) -> Self {
        self.ends_at = Some(timestamp);
        self
    }

    /// Check validity at an explicit instant.
    pub fn is_valid_at(&self, now: i64) -> bool {
        if !self.is_active {
            return false;
        }
        if now < self.starts_at {
            return false;
        }
        if let Some(ends) = self.ends_at {
            if now > ends {
                return false;
            }
        }
        true
    }

    /// Check validity against the wall clock.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(current_timestamp())
    }

    /// Check whether this discount covers the given product.
    pub fn applies_to(&self, product_id: &ProductId) -> bool {
        self.product_ids.is_empty() || self.product_ids.contains(product_id)
    }

    /// Check whether this discount covers any of the given products.
    pub fn applies_to_any<'a>(&self, product_ids: impl IntoIterator<Item = &'a ProductId>) -> bool {
        if self.product_ids.is_empty() {
            return true;
        }
        product_ids
            .into_iter()
            .any(|id| self.product_ids.contains(id))
    }
}

/// Admin payload for creating a discount.
///
/// Everything user-supplied is optional so validation can reject the
/// gaps instead of the deserializer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountDraft {
    /// Display name.
    pub name: String,
    /// Kind of discount being created.
    pub discount_type: DiscountType,
    /// Percentage points for percent/quantity kinds, currency amount
    /// for fixed/holiday kinds.
    pub value: Option<f64>,
    /// Redeem code.
    pub code: Option<String>,
    /// Currency for flat-amount kinds. Defaults to the storefront
    /// currency.
    pub currency: Option<Currency>,
    /// Quantity gate for the quantity kind.
    pub min_quantity: Option<i64>,
    /// Tie-break priority.
    pub priority: Option<i32>,
    /// Start of the validity window. Defaults to creation time.
    pub starts_at: Option<i64>,
    /// End of the validity window.
    pub ends_at: Option<i64>,
    /// Product restriction. Empty = all products.
    pub product_ids: Vec<ProductId>,
    /// Whether the discount starts switched on. Defaults to true.
    pub is_active: Option<bool>,
}

impl DiscountDraft {
    /// Start a draft of the given kind.
    pub fn new(name: impl Into<String>, discount_type: DiscountType) -> Self {
        Self {
            name: name.into(),
            discount_type,
            value: None,
            code: None,
            currency: None,
            min_quantity: None,
            priority: None,
            starts_at: None,
            ends_at: None,
            product_ids: Vec::new(),
            is_active: None,
        }
    }

    /// Set the discount value.
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    /// Set the redeem code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the quantity gate.
    pub fn with_min_quantity(mut self, min_quantity: i64) -> Self {
        self.min_quantity = Some(min_quantity);
        self
    }

    /// Set the validity window.
    pub fn with_window(mut self, starts_at: i64, ends_at: Option<i64>) -> Self {
        self.starts_at = Some(starts_at);
        self.ends_at = ends_at;
        self
    }

    /// Validate the draft and produce a discount.
    ///
    /// `now` anchors defaulted timestamps and makes validation
    /// deterministic under test.
    pub fn build(self, now: i64) -> Result<Discount, CommerceError> {
        let value = self
            .value
            .ok_or_else(|| CommerceError::ValidationError("discount value is required".into()))?;
        if value < 0.0 {
            return Err(CommerceError::ValidationError(
                "discount value must not be negative".into(),
            ));
        }

        let code = match self.code {
            Some(code) if code.trim().is_empty() => {
                return Err(CommerceError::ValidationError(
                    "discount code must not be empty".into(),
                ));
            }
            Some(code) => Some(code),
            None if self.discount_type.requires_code() => {
                return Err(CommerceError::ValidationError(format!(
                    "discount code is required for {} discounts",
                    self.discount_type.as_str()
                )));
            }
            None => None,
        };

        let min_quantity = self.min_quantity.unwrap_or(0);
        if min_quantity < 0 {
            return Err(CommerceError::ValidationError(
                "min_quantity must not be negative".into(),
            ));
        }

        let starts_at = self.starts_at.unwrap_or(now);
        if let Some(ends_at) = self.ends_at {
            if ends_at < starts_at {
                return Err(CommerceError::ValidationError(
                    "end date precedes start date".into(),
                ));
            }
        }

        let currency = self.currency.unwrap_or_default();
        let kind = match self.discount_type {
            DiscountType::Percent => DiscountKind::Percent { rate: value },
            DiscountType::Fixed => DiscountKind::Fixed {
                amount: Money::from_decimal(value, currency),
            },
            DiscountType::Quantity => DiscountKind::Quantity {
                rate: value,
                min_quantity,
            },
            DiscountType::Holiday => DiscountKind::Holiday {
                amount: Money::from_decimal(value, currency),
            },
        };

        Ok(Discount {
            id: DiscountId::generate(),
            name: self.name,
            code,
            kind,
            priority: self.priority.unwrap_or(0),
            product_ids: self.product_ids,
            starts_at,
            ends_at: self.ends_at,
            is_active: self.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
