//! Ledger schema: chart of accounts, vouchers, balances and fiscal periods.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TENANT SETTINGS
        // ============================================================
        db.execute_unprepared(TENANT_SETTINGS_SQL).await?;

        // ============================================================
        // PART 3: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 4: FISCAL PERIODS
        // ============================================================
        db.execute_unprepared(FISCAL_PERIODS_SQL).await?;

        // ============================================================
        // PART 5: VOUCHERS
        // ============================================================
        db.execute_unprepared(VOUCHERS_SQL).await?;
        db.execute_unprepared(VOUCHER_ENTRIES_SQL).await?;
        db.execute_unprepared(VOUCHER_SEQUENCES_SQL).await?;

        // ============================================================
        // PART 6: LEDGER BALANCES
        // ============================================================
        db.execute_unprepared(LEDGER_BALANCES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE account_type AS ENUM ('asset', 'liability', 'equity', 'revenue', 'expense');

CREATE TYPE account_nature AS ENUM ('debit', 'credit');

CREATE TYPE fiscal_period_status AS ENUM ('open', 'closed', 'locked');

CREATE TYPE voucher_type AS ENUM ('general', 'sales', 'purchase', 'payment', 'receipt');

CREATE TYPE voucher_status AS ENUM (
    'draft',
    'pending',
    'approved',
    'posted',
    'rejected',
    'cancelled'
);
";

const TENANT_SETTINGS_SQL: &str = r"
CREATE TABLE tenant_settings (
    tenant_id UUID PRIMARY KEY,
    fiscal_year_start_month INTEGER NOT NULL DEFAULT 1
        CHECK (fiscal_year_start_month BETWEEN 1 AND 12),
    decimal_precision INTEGER NOT NULL DEFAULT 2
        CHECK (decimal_precision BETWEEN 0 AND 8),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    nature account_nature NOT NULL,
    parent_id UUID REFERENCES accounts(id),
    level INTEGER NOT NULL DEFAULT 1 CHECK (level >= 1),
    is_control BOOLEAN NOT NULL DEFAULT false,
    is_active BOOLEAN NOT NULL DEFAULT true,
    sort_order INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_accounts_tenant_code UNIQUE (tenant_id, code),
    CONSTRAINT chk_accounts_not_self_parent CHECK (parent_id IS NULL OR parent_id <> id)
);

CREATE INDEX idx_accounts_tenant ON accounts(tenant_id, code);
CREATE INDEX idx_accounts_parent ON accounts(parent_id) WHERE parent_id IS NOT NULL;
";

const FISCAL_PERIODS_SQL: &str = r"
CREATE TABLE fiscal_periods (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    fiscal_year INTEGER NOT NULL,
    period_number INTEGER NOT NULL CHECK (period_number BETWEEN 1 AND 12),
    name VARCHAR(50) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    status fiscal_period_status NOT NULL DEFAULT 'open',
    closed_by UUID,
    closed_at TIMESTAMPTZ,

    CONSTRAINT uq_fiscal_periods_tenant_key UNIQUE (tenant_id, fiscal_year, period_number),
    CONSTRAINT chk_fiscal_periods_dates CHECK (start_date <= end_date)
);
";

const VOUCHERS_SQL: &str = r"
CREATE TABLE vouchers (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    number VARCHAR(30) NOT NULL,
    voucher_date DATE NOT NULL,
    voucher_type voucher_type NOT NULL,
    status voucher_status NOT NULL DEFAULT 'draft',
    description TEXT NOT NULL DEFAULT '',
    reference_kind VARCHAR(50),
    reference_id VARCHAR(100),
    total_debit NUMERIC(19, 8) NOT NULL DEFAULT 0,
    total_credit NUMERIC(19, 8) NOT NULL DEFAULT 0,
    is_reversal BOOLEAN NOT NULL DEFAULT false,
    reversal_of_id UUID REFERENCES vouchers(id),
    reversed_by_id UUID REFERENCES vouchers(id),
    rejection_reason TEXT,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    updated_at TIMESTAMPTZ,
    submitted_by UUID,
    submitted_at TIMESTAMPTZ,
    approved_by UUID,
    approved_at TIMESTAMPTZ,
    rejected_by UUID,
    rejected_at TIMESTAMPTZ,
    posted_by UUID,
    posted_at TIMESTAMPTZ,
    cancelled_by UUID,
    cancelled_at TIMESTAMPTZ,

    CONSTRAINT uq_vouchers_tenant_number UNIQUE (tenant_id, number),
    CONSTRAINT chk_vouchers_posted_balanced CHECK (status <> 'posted' OR total_debit = total_credit)
);

CREATE INDEX idx_vouchers_tenant_date ON vouchers(tenant_id, voucher_date DESC, number DESC);
CREATE INDEX idx_vouchers_status ON vouchers(tenant_id, status);
CREATE UNIQUE INDEX uq_vouchers_reversal_of ON vouchers(reversal_of_id)
    WHERE reversal_of_id IS NOT NULL;
";

const VOUCHER_ENTRIES_SQL: &str = r"
CREATE TABLE voucher_entries (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    voucher_id UUID NOT NULL REFERENCES vouchers(id) ON DELETE CASCADE,
    line_number INTEGER NOT NULL CHECK (line_number >= 1),
    account_id UUID NOT NULL REFERENCES accounts(id),
    debit NUMERIC(19, 8) NOT NULL DEFAULT 0 CHECK (debit >= 0),
    credit NUMERIC(19, 8) NOT NULL DEFAULT 0 CHECK (credit >= 0),
    description TEXT,

    CONSTRAINT uq_voucher_entries_line UNIQUE (voucher_id, line_number),
    CONSTRAINT chk_voucher_entries_one_side CHECK (
        (debit > 0 AND credit = 0) OR (credit > 0 AND debit = 0)
    )
);

CREATE INDEX idx_voucher_entries_account ON voucher_entries(tenant_id, account_id);
";

const VOUCHER_SEQUENCES_SQL: &str = r"
CREATE TABLE voucher_sequences (
    tenant_id UUID NOT NULL,
    voucher_type voucher_type NOT NULL,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
    last_value INTEGER NOT NULL,

    PRIMARY KEY (tenant_id, voucher_type, year, month)
);
";

const LEDGER_BALANCES_SQL: &str = r"
CREATE TABLE ledger_balances (
    tenant_id UUID NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    period_year INTEGER NOT NULL,
    period_month INTEGER NOT NULL CHECK (period_month BETWEEN 1 AND 12),
    opening_debit NUMERIC(19, 8) NOT NULL DEFAULT 0,
    opening_credit NUMERIC(19, 8) NOT NULL DEFAULT 0,
    period_debit NUMERIC(19, 8) NOT NULL DEFAULT 0,
    period_credit NUMERIC(19, 8) NOT NULL DEFAULT 0,
    closing_debit NUMERIC(19, 8) NOT NULL DEFAULT 0,
    closing_credit NUMERIC(19, 8) NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    PRIMARY KEY (tenant_id, account_id, period_year, period_month)
);

CREATE INDEX idx_ledger_balances_period ON ledger_balances(tenant_id, period_year, period_month);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS ledger_balances;
DROP TABLE IF EXISTS voucher_sequences;
DROP TABLE IF EXISTS voucher_entries;
DROP TABLE IF EXISTS vouchers;
DROP TABLE IF EXISTS fiscal_periods;
DROP TABLE IF EXISTS accounts;
DROP TABLE IF EXISTS tenant_settings;

DROP TYPE IF EXISTS voucher_status;
DROP TYPE IF EXISTS voucher_type;
DROP TYPE IF EXISTS fiscal_period_status;
DROP TYPE IF EXISTS account_nature;
DROP TYPE IF EXISTS account_type;
";
