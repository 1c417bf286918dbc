//! Common vocabulary types for the replenishment workflow

use serde::{Deserialize, Serialize};

/// Stock classification for a part, derived from its quantity fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    /// On-hand quantity is below the minimum threshold
    Critique,
    /// On-hand quantity sits exactly at the minimum threshold
    Faible,
    /// On-hand quantity is above the minimum threshold
    Ok,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Critique => "critique",
            StockStatus::Faible => "faible",
            StockStatus::Ok => "ok",
        }
    }
}

/// Approval state of a part's reorder proposal.
///
/// `None → Pending → Approved | Refused`, and any state can be reset back to
/// `None`. Only `Approved` parts are visible in the purchasing queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    None,
    Pending,
    Approved,
    Refused,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::None => "none",
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Refused => "refused",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(ApprovalStatus::None),
            "pending" => Some(ApprovalStatus::Pending),
            "approved" => Some(ApprovalStatus::Approved),
            "refused" => Some(ApprovalStatus::Refused),
            _ => Option::None,
        }
    }

    /// A new purchase request may only be opened from `None` or `Refused`.
    /// Re-submitting while `Pending` is a no-op, and an `Approved` part is
    /// already past the gate.
    pub fn can_submit(&self) -> bool {
        matches!(self, ApprovalStatus::None | ApprovalStatus::Refused)
    }

    /// Sort rank for the admin review queue: unsubmitted proposals first,
    /// then pending requests, then everything already decided.
    pub fn review_rank(&self) -> i32 {
        match self {
            ApprovalStatus::None => 0,
            ApprovalStatus::Pending => 1,
            ApprovalStatus::Approved | ApprovalStatus::Refused => 2,
        }
    }
}

/// Operation kind recorded in the history ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    /// An order committed to a supplier
    Commande,
    /// A direct purchase
    Achat,
    /// Stock taken out of inventory
    Sortie,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Commande => "Commande",
            OperationKind::Achat => "Achat",
            OperationKind::Sortie => "Sortie",
        }
    }

    /// Kinds that open a receipt cycle, i.e. may later be stamped with a
    /// received date by a total receipt.
    pub fn opens_receipt(&self) -> bool {
        matches!(self, OperationKind::Commande | OperationKind::Achat)
    }
}

/// Notification event kinds, keyed the way the per-user preference flags are
/// stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PiecesACommander,
    DemandeApprobation,
    ApprobationAccordee,
    ApprobationRefusee,
    PieceCommandee,
}

impl EventKind {
    /// Key under which the flag is stored in a user's preference map.
    pub fn pref_key(&self) -> &'static str {
        match self {
            EventKind::PiecesACommander => "pieces_a_commander",
            EventKind::DemandeApprobation => "demande_approbation",
            EventKind::ApprobationAccordee => "approbation_accordee",
            EventKind::ApprobationRefusee => "approbation_refusee",
            EventKind::PieceCommandee => "piece_commandee",
        }
    }

    /// Default when the user never touched the flag. Everything is opt-out
    /// except the order-placed digest, which is opt-in.
    pub fn default_enabled(&self) -> bool {
        !matches!(self, EventKind::PieceCommandee)
    }

    /// Approval requests only go to administrators.
    pub fn admin_only(&self) -> bool {
        matches!(self, EventKind::DemandeApprobation)
    }
}
