use crate::SettlementError;
use std::collections::BTreeMap;

/// Maximum departure from zero tolerated on the balance-sheet total.
pub const BALANCE_TOLERANCE: f64 = 1e-6;

/// Tolerance applied to solved variable values when resolving transfer
/// directions and reconciling realized nets.
pub const AMOUNT_TOLERANCE: f64 = 1e-6;

/// Index of a participant in the (name-sorted) roster of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(pub usize);

/// A participant and their required net amount
/// (positive: is owed money, negative: owes money).
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub name: String,
    pub net: f64,
}

/// Validated balance input: one net amount per unique participant name.
///
/// Entries are kept sorted by name so that model construction, and
/// therefore the solve, is deterministic across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceSheet {
    entries: BTreeMap<String, f64>,
}

impl BalanceSheet {
    pub fn from_entries<I, S>(entries: I) -> Result<Self, SettlementError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut sheet = BTreeMap::new();
        for (name, net) in entries {
            let name = name.into();
            if sheet.insert(name.clone(), net).is_some() {
                return Err(SettlementError::DuplicateParticipant(name));
            }
        }
        Ok(Self { entries: sheet })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, net)| (name.as_str(), *net))
    }
}

/// One direction of a pair's ledger: `owner` books amounts received
/// from (`payout`) and paid toward (`payment`) `partner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct OrderedPair {
    pub(crate) owner: ParticipantId,
    pub(crate) partner: ParticipantId,
}

impl OrderedPair {
    /// Returns `None` for self-pairs; a participant has no ledger
    /// against themselves.
    pub fn new(owner: ParticipantId, partner: ParticipantId) -> Option<Self> {
        if owner == partner {
            return None;
        }
        Some(Self { owner, partner })
    }

    pub fn owner(&self) -> ParticipantId {
        self.owner
    }

    pub fn partner(&self) -> ParticipantId {
        self.partner
    }

    pub fn reversed(&self) -> Self {
        Self {
            owner: self.partner,
            partner: self.owner,
        }
    }
}

/// An unordered pair of distinct participants, stored canonically with
/// `lo < hi`. Carries the single transaction indicator in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnorderedPair {
    pub(crate) lo: ParticipantId,
    pub(crate) hi: ParticipantId,
}

impl UnorderedPair {
    /// Returns `None` for self-pairs.
    pub fn new(a: ParticipantId, b: ParticipantId) -> Option<Self> {
        if a == b {
            return None;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        Some(Self { lo, hi })
    }

    pub fn lo(&self) -> ParticipantId {
        self.lo
    }

    pub fn hi(&self) -> ParticipantId {
        self.hi
    }

    /// Both directional ledgers of this pair: `lo`'s side, then `hi`'s.
    pub fn sides(&self) -> (OrderedPair, OrderedPair) {
        (
            OrderedPair {
                owner: self.lo,
                partner: self.hi,
            },
            OrderedPair {
                owner: self.hi,
                partner: self.lo,
            },
        )
    }
}

/// A settled transfer: `from` pays `amount` to `to`. Always positive.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub from: String,
    pub to: String,
    pub amount: f64,
}

/// Post-solve verification record for one participant.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationRecord {
    pub name: String,
    pub required: f64,
    pub realized: f64,
}

/// The extracted result of a solve: the transfer list plus the
/// per-participant reconciliation that was verified against it.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub transfers: Vec<Transfer>,
    pub reconciliation: Vec<ReconciliationRecord>,
}

impl Settlement {
    pub fn transaction_count(&self) -> usize {
        self.transfers.len()
    }
}
