use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderflow_core::{DomainError, DomainResult, Entity, Money, OrderId, PaymentId};
use orderflow_orders::{ChangeStatus, Order, OrderStatus};

/// Orders totalling strictly less than this are approved.
pub const APPROVAL_LIMIT: Money = Money::from_units(1000);

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    BankSlip,
    Pix,
}

impl PaymentMethod {
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Card => "Card",
            PaymentMethod::BankSlip => "Bank slip",
            PaymentMethod::Pix => "Pix",
        }
    }
}

impl core::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Payment status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Awaiting,
    Approved,
    Recused,
}

impl PaymentStatus {
    pub fn label(self) -> &'static str {
        match self {
            PaymentStatus::Awaiting => "Awaiting",
            PaymentStatus::Approved => "Approved",
            PaymentStatus::Recused => "Recused",
        }
    }
}

impl core::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of processing a payment.
///
/// A decline is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Approved; the order should apply `transition` (to `Paid`).
    Approved { transition: ChangeStatus },
    /// Declined; the order stays as it is.
    Recused { total: Money },
}

impl PaymentOutcome {
    pub fn is_approved(&self) -> bool {
        matches!(self, PaymentOutcome::Approved { .. })
    }

    pub fn transition(&self) -> Option<&ChangeStatus> {
        match self {
            PaymentOutcome::Approved { transition } => Some(transition),
            PaymentOutcome::Recused { .. } => None,
        }
    }
}

/// One payment attempt for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    id: PaymentId,
    order_id: OrderId,
    method: PaymentMethod,
    status: PaymentStatus,
    processed_at: Option<DateTime<Utc>>,
}

impl Payment {
    pub fn new(id: PaymentId, order_id: OrderId, method: PaymentMethod) -> Self {
        Self {
            id,
            order_id,
            method,
            status: PaymentStatus::Awaiting,
            processed_at: None,
        }
    }

    pub fn id_typed(&self) -> PaymentId {
        self.id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    /// Set once processing has run, `None` before that.
    pub fn processed_at(&self) -> Option<DateTime<Utc>> {
        self.processed_at
    }

    /// Run the simulated processor against `order`.
    ///
    /// Processing is not guarded against repetition: calling it again re-reads
    /// the current total and decides afresh.
    pub fn process(&mut self, order: &Order, now: DateTime<Utc>) -> DomainResult<PaymentOutcome> {
        if order.id_typed() != self.order_id {
            return Err(DomainError::invariant("payment processed against another order"));
        }

        let total = order.calculate_total();
        self.processed_at = Some(now);

        if total < APPROVAL_LIMIT {
            self.status = PaymentStatus::Approved;
            return Ok(PaymentOutcome::Approved {
                transition: ChangeStatus {
                    order_id: self.order_id,
                    status: OrderStatus::Paid,
                    occurred_at: now,
                },
            });
        }

        self.status = PaymentStatus::Recused;
        Ok(PaymentOutcome::Recused { total })
    }
}

impl Entity for Payment {
    type Id = PaymentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
