//! Transaction model
//!
//! One record per real-estate deal: the property, the parties, the key dates,
//! the commission and the milestone checklist. Mutations go through the
//! `lifecycle` module; this type only knows how to describe and validate itself.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::TransactionId;
use super::milestone::{Milestone, MilestoneKind};
use super::money::Money;

/// Contractual status of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    UnderContract,
    InspectionPeriod,
    ClearToClose,
    Closed,
    Cancelled,
}

impl TransactionStatus {
    /// Closed and Cancelled are final
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Cancelled)
    }

    /// The next status along the main path, if any
    pub fn successor(&self) -> Option<Self> {
        match self {
            Self::UnderContract => Some(Self::InspectionPeriod),
            Self::InspectionPeriod => Some(Self::ClearToClose),
            Self::ClearToClose => Some(Self::Closed),
            Self::Closed | Self::Cancelled => None,
        }
    }

    /// Parse from user input ("under-contract", "Clear to Close", "closed")
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(|c| c.to_lowercase())
            .collect();
        match normalized.as_str() {
            "undercontract" => Some(Self::UnderContract),
            "inspectionperiod" | "inspection" => Some(Self::InspectionPeriod),
            "cleartoclose" | "ctc" => Some(Self::ClearToClose),
            "closed" => Some(Self::Closed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnderContract => write!(f, "Under Contract"),
            Self::InspectionPeriod => write!(f, "Inspection Period"),
            Self::ClearToClose => write!(f, "Clear to Close"),
            Self::Closed => write!(f, "Closed"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Which side of the deal the brokerage represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[default]
    Purchase,
    Sale,
    Lease,
}

impl TransactionType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "purchase" | "buy" => Some(Self::Purchase),
            "sale" | "sell" => Some(Self::Sale),
            "lease" | "rental" => Some(Self::Lease),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Purchase => write!(f, "Purchase"),
            Self::Sale => write!(f, "Sale"),
            Self::Lease => write!(f, "Lease"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    #[default]
    SingleFamily,
    Condo,
    Townhouse,
    MultiFamily,
    Land,
    Other,
}

impl PropertyType {
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(|c| c.to_lowercase())
            .collect();
        match normalized.as_str() {
            "singlefamily" | "house" => Some(Self::SingleFamily),
            "condo" | "condominium" => Some(Self::Condo),
            "townhouse" | "townhome" => Some(Self::Townhouse),
            "multifamily" | "duplex" => Some(Self::MultiFamily),
            "land" | "lot" => Some(Self::Land),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleFamily => write!(f, "Single Family"),
            Self::Condo => write!(f, "Condo"),
            Self::Townhouse => write!(f, "Townhouse"),
            Self::MultiFamily => write!(f, "Multi-Family"),
            Self::Land => write!(f, "Land"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// The property under contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub price: Money,
    #[serde(default)]
    pub property_type: PropertyType,
}

impl Property {
    /// Single-line address ("123 Oak St, Austin, TX 78701")
    pub fn full_address(&self) -> String {
        format!("{}, {}, {} {}", self.address, self.city, self.state, self.zip)
    }
}

/// A real-estate transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Optimistic-concurrency stamp, bumped on every committed mutation
    #[serde(default = "initial_version")]
    pub version: u64,

    #[serde(default)]
    pub transaction_type: TransactionType,

    pub property: Property,

    /// Reference to the client record owned by the CRM
    pub client_ref: String,

    #[serde(default)]
    pub status: TransactionStatus,

    pub contract_date: NaiveDate,

    /// Scheduled closing date
    pub closing_date: NaiveDate,

    /// Date the deal actually closed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_closing_date: Option<NaiveDate>,

    /// Milestones in canonical order
    pub milestones: Vec<Milestone>,

    /// Total commission on the deal
    pub commission: Money,

    /// Rate the commission was derived from, when it was derived
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commission_rate: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_agent_ref: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_agent_ref: Option<String>,

    /// Cached progress percentage (see `lifecycle::compute_progress`)
    #[serde(default)]
    pub progress: u8,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    /// Set when the transaction reaches a terminal status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

fn initial_version() -> u64 {
    1
}

impl Transaction {
    /// Create a transaction with no milestones yet
    pub fn new(
        property: Property,
        client_ref: impl Into<String>,
        contract_date: NaiveDate,
        closing_date: NaiveDate,
        commission: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            version: initial_version(),
            transaction_type: TransactionType::default(),
            property,
            client_ref: client_ref.into(),
            status: TransactionStatus::UnderContract,
            contract_date,
            closing_date,
            actual_closing_date: None,
            milestones: Vec::new(),
            commission,
            commission_rate: None,
            listing_agent_ref: None,
            buyer_agent_ref: None,
            progress: 0,
            notes: String::new(),
            archived_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Look up a milestone entry by kind
    pub fn milestone(&self, kind: MilestoneKind) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.name == kind)
    }

    pub fn milestone_mut(&mut self, kind: MilestoneKind) -> Option<&mut Milestone> {
        self.milestones.iter_mut().find(|m| m.name == kind)
    }

    /// Whether the given milestone is present and completed
    pub fn is_completed(&self, kind: MilestoneKind) -> bool {
        self.milestone(kind).map(|m| m.completed).unwrap_or(false)
    }

    /// Number of completed milestones
    pub fn completed_count(&self) -> usize {
        self.milestones.iter().filter(|m| m.completed).count()
    }

    /// The first incomplete milestone in canonical order
    pub fn current_milestone(&self) -> Option<&Milestone> {
        self.milestones.iter().find(|m| !m.completed)
    }

    /// Date of the most recent milestone completion, or the contract date
    pub fn last_activity(&self) -> NaiveDate {
        self.milestones
            .iter()
            .filter_map(Milestone::activity_date)
            .max()
            .unwrap_or(self.contract_date)
    }

    /// Signed number of days from `today` to the scheduled closing date
    pub fn days_until_closing(&self, today: NaiveDate) -> i64 {
        (self.closing_date - today).num_days()
    }

    /// Actual closing date when known, otherwise the scheduled one
    pub fn effective_closing_date(&self) -> NaiveDate {
        self.actual_closing_date.unwrap_or(self.closing_date)
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Listing and buyer shares of the commission
    pub fn commission_split(&self) -> (Money, Money) {
        self.commission.split_even()
    }

    /// Whether the given agent is on either side of the deal
    pub fn involves_agent(&self, agent_ref: &str) -> bool {
        self.listing_agent_ref.as_deref() == Some(agent_ref)
            || self.buyer_agent_ref.as_deref() == Some(agent_ref)
    }

    /// Stamp the modification time
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Validate the transaction
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if self.property.address.trim().is_empty() {
            return Err(TransactionValidationError::MissingAddress);
        }

        if self.property.price.is_negative() {
            return Err(TransactionValidationError::NegativePrice(self.property.price));
        }

        if self.closing_date < self.contract_date {
            return Err(TransactionValidationError::ClosingBeforeContract {
                contract: self.contract_date,
                closing: self.closing_date,
            });
        }

        let mut previous: Option<MilestoneKind> = None;
        for milestone in &self.milestones {
            if let Some(prev) = previous {
                if milestone.name <= prev {
                    return Err(TransactionValidationError::MilestoneOrder(milestone.name));
                }
            }
            previous = Some(milestone.name);

            if milestone.completed && milestone.status != super::MilestoneStatus::Complete {
                return Err(TransactionValidationError::CompletedWithoutStatus(
                    milestone.name,
                ));
            }

            if milestone.completed {
                if let Some(blocking) = milestone
                    .name
                    .predecessors()
                    .iter()
                    .find(|p| !self.is_completed(**p))
                {
                    return Err(TransactionValidationError::SkippedMilestone {
                        milestone: milestone.name,
                        blocking: *blocking,
                    });
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.id, self.property.address, self.status
        )
    }
}

/// Reasons a transaction record is inconsistent
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionValidationError {
    MissingAddress,
    NegativePrice(Money),
    ClosingBeforeContract {
        contract: NaiveDate,
        closing: NaiveDate,
    },
    MilestoneOrder(MilestoneKind),
    CompletedWithoutStatus(MilestoneKind),
    SkippedMilestone {
        milestone: MilestoneKind,
        blocking: MilestoneKind,
    },
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAddress => write!(f, "Property address is required"),
            Self::NegativePrice(price) => write!(f, "Property price cannot be negative: {}", price),
            Self::ClosingBeforeContract { contract, closing } => write!(
                f,
                "Closing date {} is before contract date {}",
                closing, contract
            ),
            Self::MilestoneOrder(kind) => write!(
                f,
                "Milestone '{}' is duplicated or out of canonical order",
                kind
            ),
            Self::CompletedWithoutStatus(kind) => {
                write!(f, "Milestone '{}' is completed but not marked Complete", kind)
            }
            Self::SkippedMilestone { milestone, blocking } => write!(
                f,
                "Milestone '{}' is completed while '{}' is not",
                milestone, blocking
            ),
        }
    }
}

impl std::error::Error for TransactionValidationError {}
