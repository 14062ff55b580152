//! Reversing vouchers.
//!
//! A reversal copies every entry of a posted voucher with debit and credit
//! swapped, so the pair nets to zero on each account.

use chrono::NaiveDate;
use ledgerline_shared::types::{VoucherEntryId, VoucherId};

use crate::error::LedgerError;
use crate::voucher::types::{AuditStamp, Voucher, VoucherEntry, VoucherStatus};

/// Entries of `original` with each side swapped. Line numbers, accounts and
/// magnitudes are kept.
#[must_use]
pub fn reversing_entries(original: &[VoucherEntry]) -> Vec<VoucherEntry> {
    original
        .iter()
        .map(|entry| VoucherEntry {
            id: VoucherEntryId::new(),
            line_number: entry.line_number,
            account_id: entry.account_id,
            debit: entry.credit,
            credit: entry.debit,
            description: Some(match &entry.description {
                Some(memo) => format!("Reversal: {memo}"),
                None => "Reversal".to_string(),
            }),
        })
        .collect()
}

/// Builds the posted reversal voucher for `original`.
///
/// The caller assigns the number and persists both vouchers; this only
/// shapes the new aggregate.
///
/// # Errors
///
/// `InvalidDate` if `date` precedes the original voucher's date.
pub fn build_reversal(
    original: &Voucher,
    number: String,
    date: NaiveDate,
    description: Option<&str>,
    stamp: AuditStamp,
) -> Result<Voucher, LedgerError> {
    if date < original.date {
        return Err(LedgerError::InvalidDate(format!(
            "reversal date {date} is before voucher date {}",
            original.date
        )));
    }

    let description = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map_or_else(
            || format!("Reversal of {}", original.number),
            ToString::to_string,
        );

    Ok(Voucher {
        id: VoucherId::new(),
        tenant_id: original.tenant_id,
        number,
        date,
        voucher_type: original.voucher_type,
        status: VoucherStatus::Posted,
        description,
        reference: original.reference.clone(),
        total_debit: original.total_credit,
        total_credit: original.total_debit,
        is_reversal: true,
        reversal_of_id: Some(original.id),
        reversed_by_id: None,
        rejection_reason: None,
        created: stamp,
        updated: None,
        submitted: Some(stamp),
        approved: Some(stamp),
        rejected: None,
        posted: Some(stamp),
        cancelled: None,
        entries: reversing_entries(&original.entries),
    })
}
