//! Bounded-edit review of one candidate before it is persisted.
//!
//! A [`ReviewSession`] owns exactly one reconciled candidate. The monetary
//! fields start locked; each edit needs an explicit unlock and a confirm,
//! and at most [`EDIT_CEILING`] confirms are allowed before an
//! administrator has to approve further changes.
//!
//! ```text
//!            request_edit (edit_count < 2)
//!   Locked ─────────────────────────────────▶ Unlocked
//!     ▲  ◀───────────────────────────────────   │
//!     │        confirm_amounts (edit_count+1)   │
//!     │
//!     │ approve / reject        escalate (edit_count == 2)
//!     └──────────── PendingApproval ◀──── Locked
//! ```

use std::fmt;

use chrono::Local;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::SaveError;
use crate::models::invoice::{ExtractedFields, InvoiceRecord, InvoiceStatus, RecordDraft};
use crate::reconcile::{match_verdict, MatchVerdict, Reconciliation};
use crate::store::InvoiceStore;

/// Confirmed edits allowed without administrative approval.
pub const EDIT_CEILING: u32 = 2;

/// Timestamp format for `created_at`.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Whether the monetary fields may currently be changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditState {
    #[default]
    Locked,
    Unlocked,
    /// Past the ceiling and waiting for an administrator.
    PendingApproval,
}

/// A refused action. Non-fatal: the session is left exactly as it was.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    #[error("no edits remain ({EDIT_CEILING} of {EDIT_CEILING} used)")]
    EditCeilingReached,

    #[error("amounts are locked; request an edit first")]
    NotUnlocked,

    #[error("confirm the amounts before saving")]
    Unlocked,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("edits remain; escalation is only needed at the edit ceiling")]
    NotAtCeiling,

    #[error("no edit request is pending")]
    NoPendingRequest,

    #[error("amounts must be non-negative and small enough to add up")]
    AmountOutOfRange,
}

/// Operator warning tied to the number of edits used so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditWarning {
    /// One confirmed edit; one remains.
    OneEditRemaining,
    /// The ceiling is reached.
    NoEditsRemaining,
}

impl fmt::Display for EditWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditWarning::OneEditRemaining => write!(f, "edit 1/{EDIT_CEILING}: one edit remains"),
            EditWarning::NoEditsRemaining => {
                write!(f, "edit {EDIT_CEILING}/{EDIT_CEILING}: no edits remain")
            }
        }
    }
}

/// One operator's in-progress review of one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSession {
    fields: ExtractedFields,
    extracted_total: Decimal,
    state: EditState,
    edit_count: u32,
    request_edit: bool,
}

impl ReviewSession {
    /// Start reviewing a freshly reconciled candidate.
    pub fn new(reconciliation: Reconciliation) -> Self {
        Self {
            fields: reconciliation.fields,
            extracted_total: reconciliation.extracted_total,
            state: EditState::Locked,
            edit_count: 0,
            request_edit: false,
        }
    }

    pub fn fields(&self) -> &ExtractedFields {
        &self.fields
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn edit_count(&self) -> u32 {
        self.edit_count
    }

    pub fn request_edit_flag(&self) -> bool {
        self.request_edit
    }

    /// The total reconciled from the document, unaffected by edits.
    pub fn extracted_total(&self) -> Decimal {
        self.extracted_total
    }

    pub fn edits_remaining(&self) -> u32 {
        EDIT_CEILING.saturating_sub(self.edit_count)
    }

    /// Warning to show for the current edit count, if any.
    pub fn warning(&self) -> Option<EditWarning> {
        match self.edit_count {
            0 => None,
            1 => Some(EditWarning::OneEditRemaining),
            _ => Some(EditWarning::NoEditsRemaining),
        }
    }

    /// Verdict for the current amounts against the document total.
    pub fn verdict(&self) -> MatchVerdict {
        self.verdict_for(self.fields.pre_tax_amount, self.fields.tax_amount)
    }

    /// Verdict for amounts the operator is typing, before confirming.
    pub fn verdict_for(&self, pre_tax: Decimal, tax: Decimal) -> MatchVerdict {
        match_verdict(self.extracted_total, pre_tax, tax)
    }

    /// Whether `amount` literally appears in the source document.
    pub fn check_exists(&self, amount: Decimal) -> bool {
        self.fields.contains_amount(amount)
    }

    /// Locked → Unlocked. Refused once the ceiling is reached.
    pub fn request_edit(&mut self) -> Result<(), Refusal> {
        match self.state {
            EditState::Unlocked => Ok(()),
            _ if self.edit_count >= EDIT_CEILING => {
                warn!("Edit request refused: {} edits used", self.edit_count);
                Err(Refusal::EditCeilingReached)
            }
            EditState::PendingApproval => Err(Refusal::EditCeilingReached),
            EditState::Locked => {
                self.state = EditState::Unlocked;
                Ok(())
            }
        }
    }

    /// Unlocked → Locked with the operator's amounts. The total becomes
    /// `pre_tax + tax` and one edit is used up.
    ///
    /// Negative amounts, and pairs whose sum is not representable, are
    /// refused without using an edit.
    pub fn confirm_amounts(&mut self, pre_tax: Decimal, tax: Decimal) -> Result<MatchVerdict, Refusal> {
        if self.state != EditState::Unlocked {
            return Err(Refusal::NotUnlocked);
        }
        if pre_tax.is_sign_negative() || tax.is_sign_negative() {
            return Err(Refusal::AmountOutOfRange);
        }
        let total = pre_tax.checked_add(tax).ok_or(Refusal::AmountOutOfRange)?;

        self.fields.pre_tax_amount = pre_tax;
        self.fields.tax_amount = tax;
        self.fields.total_amount = total;
        self.state = EditState::Locked;
        self.edit_count += 1;

        let verdict = self.verdict();
        info!(
            "Confirmed amounts pre_tax={} tax={} (edit {}/{}, matched={})",
            pre_tax, tax, self.edit_count, EDIT_CEILING, verdict.matched
        );
        Ok(verdict)
    }

    /// At the ceiling, ask an administrator for another edit cycle. The
    /// record can still be saved; it is flagged `request_edit`.
    pub fn escalate(&mut self) -> Result<(), Refusal> {
        match self.state {
            EditState::Unlocked => Err(Refusal::Unlocked),
            EditState::PendingApproval => Ok(()),
            EditState::Locked if self.edit_count < EDIT_CEILING => Err(Refusal::NotAtCeiling),
            EditState::Locked => {
                self.request_edit = true;
                self.state = EditState::PendingApproval;
                info!("Edit approval requested after {} edits", self.edit_count);
                Ok(())
            }
        }
    }

    /// Administrator grants another full set of edits.
    pub fn approve(&mut self) -> Result<(), Refusal> {
        if self.state != EditState::PendingApproval {
            return Err(Refusal::NoPendingRequest);
        }
        self.edit_count = 0;
        self.request_edit = false;
        self.state = EditState::Locked;
        Ok(())
    }

    /// Administrator declines; the ceiling stays in force.
    pub fn reject(&mut self) -> Result<(), Refusal> {
        if self.state != EditState::PendingApproval {
            return Err(Refusal::NoPendingRequest);
        }
        self.request_edit = false;
        self.state = EditState::Locked;
        Ok(())
    }

    /// Build the record that a save would persist, without persisting it.
    ///
    /// Refused while unlocked and when date, invoice number or invoice
    /// symbol is empty.
    pub fn finalize(&self, draft: RecordDraft) -> Result<InvoiceRecord, Refusal> {
        if draft.date.trim().is_empty() {
            return Err(Refusal::MissingField("date"));
        }
        if draft.invoice_number.trim().is_empty() {
            return Err(Refusal::MissingField("invoice_number"));
        }
        if draft.invoice_symbol.trim().is_empty() {
            return Err(Refusal::MissingField("invoice_symbol"));
        }
        if self.state == EditState::Unlocked {
            return Err(Refusal::Unlocked);
        }

        let pre_tax = self.fields.pre_tax_amount;
        let tax = self.fields.tax_amount;
        let total = pre_tax.checked_add(tax).ok_or(Refusal::AmountOutOfRange)?;

        Ok(InvoiceRecord {
            id: 0,
            invoice_type: draft.invoice_type,
            date: draft.date,
            invoice_number: draft.invoice_number,
            invoice_symbol: draft.invoice_symbol,
            seller_name: draft.seller,
            buyer_name: draft.buyer,
            pre_tax_amount: pre_tax,
            tax_amount: tax,
            total_amount: total,
            status: InvoiceStatus::Active,
            edit_count: self.edit_count,
            request_edit: self.request_edit,
            created_at: Local::now().format(CREATED_AT_FORMAT).to_string(),
            memo: draft.memo,
        })
    }

    /// Persist the candidate. Nothing reaches the store when refused.
    pub fn save<S>(&self, draft: RecordDraft, store: &mut S) -> Result<InvoiceRecord, SaveError>
    where
        S: InvoiceStore + ?Sized,
    {
        let record = self.finalize(draft).inspect_err(|refusal| {
            warn!("Save refused: {}", refusal);
        })?;
        let stored = store.insert(record)?;
        info!(
            "Saved invoice {} ({}, total {}, {} edits{})",
            stored.id,
            stored.invoice_type,
            stored.total_amount,
            stored.edit_count,
            if stored.request_edit { ", pending approval" } else { "" }
        );
        Ok(stored)
    }
}

/// Administrator approves a persisted record's pending edit request.
pub fn approve_edit(record: &mut InvoiceRecord) -> Result<(), Refusal> {
    if !record.request_edit {
        return Err(Refusal::NoPendingRequest);
    }
    record.edit_count = 0;
    record.request_edit = false;
    Ok(())
}

/// Administrator rejects a persisted record's pending edit request,
/// leaving its edit count at the ceiling.
pub fn reject_edit(record: &mut InvoiceRecord) -> Result<(), Refusal> {
    if !record.request_edit {
        return Err(Refusal::NoPendingRequest);
    }
    record.request_edit = false;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::InvoiceType;
    use crate::reconcile::{analyze, AnalysisMode};
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    const TEXT: &str = "Ký hiệu: 1C24TAA
Số hóa đơn: 456
Ngày 05 tháng 03 năm 2024
Đơn vị bán hàng: CÔNG TY A
Người mua hàng: CÔNG TY B
Cộng tiền hàng: 1.000.000
Tiền thuế GTGT: 80.000
Tổng cộng thanh toán: 1.080.000
";

    fn session() -> ReviewSession {
        ReviewSession::new(analyze(TEXT, AnalysisMode::Normal))
    }

    fn draft(session: &ReviewSession) -> RecordDraft {
        RecordDraft::from_fields(session.fields(), InvoiceType::In).with_memo(None, "hd.pdf")
    }

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn test_new_session_is_locked() {
        let s = session();
        assert_eq!(s.state(), EditState::Locked);
        assert_eq!(s.edit_count(), 0);
        assert_eq!(s.warning(), None);
        assert!(s.verdict().matched);
    }

    #[test]
    fn test_two_edit_cycles_then_refused() {
        let mut s = session();

        s.request_edit().unwrap();
        s.confirm_amounts(d(1_000_000), d(80_000)).unwrap();
        assert_eq!(s.warning(), Some(EditWarning::OneEditRemaining));

        s.request_edit().unwrap();
        s.confirm_amounts(d(1_000_000), d(80_000)).unwrap();
        assert_eq!(s.edit_count(), 2);
        assert_eq!(s.warning(), Some(EditWarning::NoEditsRemaining));

        let before = s.clone();
        assert_eq!(s.request_edit(), Err(Refusal::EditCeilingReached));
        assert_eq!(s, before);
    }

    #[test]
    fn test_confirm_recomputes_total_and_compares_to_document() {
        let mut s = session();
        s.request_edit().unwrap();
        let verdict = s.confirm_amounts(d(1_000_000), d(70_000)).unwrap();

        assert_eq!(s.fields().total_amount, d(1_070_000));
        assert_eq!(s.extracted_total(), d(1_080_000));
        assert!(!verdict.matched);
        assert_eq!(verdict.difference, d(10_000));

        // A second edit is still judged against the document, not 1.070.000.
        s.request_edit().unwrap();
        let verdict = s.confirm_amounts(d(1_000_000), d(79_995)).unwrap();
        assert!(verdict.matched);
    }

    #[test]
    fn test_confirm_requires_unlock() {
        let mut s = session();
        assert_eq!(s.confirm_amounts(d(1), d(2)), Err(Refusal::NotUnlocked));
        assert_eq!(s.edit_count(), 0);
    }

    #[test]
    fn test_confirm_refuses_unsummable_amounts() {
        let mut s = session();
        s.request_edit().unwrap();
        let before = s.clone();

        assert_eq!(s.confirm_amounts(Decimal::MAX, Decimal::ONE), Err(Refusal::AmountOutOfRange));
        assert_eq!(s.confirm_amounts(d(-5), d(80_000)), Err(Refusal::AmountOutOfRange));
        assert_eq!(s, before);
        assert_eq!(s.state(), EditState::Unlocked);
        assert_eq!(s.edit_count(), 0);

        // The operator can still confirm sane amounts afterwards.
        assert!(s.confirm_amounts(d(1_000_000), d(80_000)).unwrap().matched);
    }

    #[test]
    fn test_save_refuses_unsummable_extracted_amounts() {
        let text = "Ký hiệu: 1C24TAA\nSố hóa đơn: 9\nNgày 01 tháng 02 năm 2024\n\
                    Cộng tiền hàng: 79.000.000.000.000.000.000.000.000.000\n\
                    Tiền thuế GTGT: 79.000.000.000.000.000.000.000.000.000\n";
        let s = ReviewSession::new(analyze(text, AnalysisMode::Normal));
        let mut store = MemoryStore::new();

        assert!(!s.verdict().matched);
        let err = s.save(draft(&s), &mut store).unwrap_err();
        assert!(matches!(err, SaveError::Refused(Refusal::AmountOutOfRange)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_repeated_unlock_is_harmless() {
        let mut s = session();
        s.request_edit().unwrap();
        s.request_edit().unwrap();
        assert_eq!(s.state(), EditState::Unlocked);
        assert_eq!(s.edit_count(), 0);
    }

    #[test]
    fn test_check_exists_is_strict() {
        let s = session();
        assert!(s.check_exists(d(1_080_000)));
        assert!(s.check_exists(d(80_000)));
        assert!(!s.check_exists(d(80_001)));
    }

    #[test]
    fn test_save_refused_while_unlocked() {
        let mut s = session();
        let mut store = MemoryStore::new();
        s.request_edit().unwrap();

        let err = s.save(draft(&s), &mut store).unwrap_err();
        assert!(matches!(err, SaveError::Refused(Refusal::Unlocked)));
        assert!(store.is_empty());
        assert_eq!(s.state(), EditState::Unlocked);
    }

    #[test]
    fn test_save_requires_identifying_fields() {
        let s = session();
        let mut store = MemoryStore::new();
        let mut incomplete = draft(&s);
        incomplete.invoice_symbol.clear();

        let err = s.save(incomplete, &mut store).unwrap_err();
        assert!(matches!(err, SaveError::Refused(Refusal::MissingField("invoice_symbol"))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_persists_locked_amounts() {
        let mut s = session();
        let mut store = MemoryStore::new();
        s.request_edit().unwrap();
        s.confirm_amounts(d(900_000), d(72_000)).unwrap();

        let record = s.save(draft(&s), &mut store).unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.invoice_number, "0000456");
        assert_eq!(record.seller_name, "CÔNG TY A");
        assert_eq!(record.total_amount, d(972_000));
        assert_eq!(record.total_amount, record.pre_tax_amount + record.tax_amount);
        assert_eq!(record.edit_count, 1);
        assert_eq!(record.status, InvoiceStatus::Active);
        assert_eq!(record.memo, "hd.pdf");
        assert!(!record.request_edit);
    }

    #[test]
    fn test_escalation_flags_saved_record() {
        let mut s = session();
        let mut store = MemoryStore::new();

        assert_eq!(s.escalate(), Err(Refusal::NotAtCeiling));
        for _ in 0..EDIT_CEILING {
            s.request_edit().unwrap();
            s.confirm_amounts(d(1_000_000), d(80_000)).unwrap();
        }
        s.escalate().unwrap();
        assert_eq!(s.state(), EditState::PendingApproval);
        assert_eq!(s.request_edit(), Err(Refusal::EditCeilingReached));

        let record = s.save(draft(&s), &mut store).unwrap();
        assert!(record.request_edit);
        assert_eq!(record.edit_count, 2);
    }

    #[test]
    fn test_session_approve_and_reject() {
        let mut s = session();
        for _ in 0..EDIT_CEILING {
            s.request_edit().unwrap();
            s.confirm_amounts(d(1_000_000), d(80_000)).unwrap();
        }

        let mut rejected = s.clone();
        rejected.escalate().unwrap();
        rejected.reject().unwrap();
        assert_eq!(rejected.state(), EditState::Locked);
        assert_eq!(rejected.edit_count(), EDIT_CEILING);
        assert!(!rejected.request_edit_flag());
        assert_eq!(rejected.request_edit(), Err(Refusal::EditCeilingReached));

        s.escalate().unwrap();
        s.approve().unwrap();
        assert_eq!(s.edit_count(), 0);
        assert!(s.request_edit().is_ok());

        assert_eq!(s.approve(), Err(Refusal::NoPendingRequest));
    }

    #[test]
    fn test_record_approve_and_reject() {
        let mut s = session();
        for _ in 0..EDIT_CEILING {
            s.request_edit().unwrap();
            s.confirm_amounts(d(1_000_000), d(80_000)).unwrap();
        }
        s.escalate().unwrap();
        let record = s.finalize(draft(&s)).unwrap();

        let mut approved = record.clone();
        approve_edit(&mut approved).unwrap();
        assert_eq!(approved.edit_count, 0);
        assert!(!approved.request_edit);

        let mut rejected = record;
        reject_edit(&mut rejected).unwrap();
        assert_eq!(rejected.edit_count, 2);
        assert!(!rejected.request_edit);
        assert_eq!(reject_edit(&mut rejected), Err(Refusal::NoPendingRequest));
    }

    #[test]
    fn test_created_at_format() {
        let s = session();
        let record = s.finalize(draft(&s)).unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(&record.created_at, CREATED_AT_FORMAT).is_ok());
    }
}
