//! Voucher number formatting.

use chrono::{Datelike, NaiveDate};
use ledgerline_shared::types::TenantId;

use crate::error::LedgerError;
use crate::store::VoucherRepository;
use crate::voucher::types::VoucherType;

/// Formats `{PREFIX}-{YYYYMM}-{NNNN}` from the voucher date's calendar month.
#[must_use]
pub fn format_voucher_number(voucher_type: VoucherType, date: NaiveDate, sequence: u32) -> String {
    format!(
        "{}-{:04}{:02}-{sequence:04}",
        voucher_type.prefix(),
        date.year(),
        date.month()
    )
}

/// Takes the next sequence for the date's calendar month and formats it.
pub(crate) async fn allocate_number<T: VoucherRepository + Send>(
    tx: &mut T,
    tenant_id: TenantId,
    voucher_type: VoucherType,
    date: NaiveDate,
) -> Result<String, LedgerError> {
    let sequence = tx
        .next_voucher_sequence(tenant_id, voucher_type, date.year(), date.month())
        .await?;
    Ok(format_voucher_number(voucher_type, date, sequence))
}
