//! Initial database migration.
//!
//! Creates the users and expenses tables. Money is stored as
//! `NUMERIC(20,2)`, rates as `NUMERIC(28,10)`; the approval flow snapshot
//! and history are JSONB.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(EXPENSES_SQL).await?;
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    username VARCHAR(64) NOT NULL,
    password_hash TEXT NOT NULL,
    role VARCHAR(20) NOT NULL DEFAULT 'employee',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_users_username UNIQUE (username),
    CONSTRAINT chk_users_username_len CHECK (char_length(username) >= 3),
    CONSTRAINT chk_users_role CHECK (role IN ('employee', 'manager', 'finance', 'director', 'admin'))
);
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id UUID PRIMARY KEY,
    submitter_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
    submitter_name VARCHAR(64) NOT NULL,
    category VARCHAR(100) NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    amount NUMERIC(20, 2) NOT NULL,
    currency CHAR(3) NOT NULL,
    base_amount NUMERIC(20, 2) NOT NULL,
    base_currency CHAR(3) NOT NULL,
    conversion_rate NUMERIC(28, 10) NOT NULL,
    rate_degraded BOOLEAN NOT NULL DEFAULT false,
    expense_date DATE NOT NULL,
    approval_flow JSONB NOT NULL DEFAULT '[]'::jsonb,
    current_approver_index INTEGER,
    status VARCHAR(20) NOT NULL,
    status_role VARCHAR(20),
    history JSONB NOT NULL DEFAULT '[]'::jsonb,
    version BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_expenses_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_expenses_rate_positive CHECK (conversion_rate > 0),
    CONSTRAINT chk_expenses_status CHECK (status IN ('pending', 'approved', 'rejected')),
    CONSTRAINT chk_expenses_status_role CHECK (
        (status = 'approved' AND status_role IS NULL)
        OR (status <> 'approved' AND status_role IS NOT NULL)
    ),
    CONSTRAINT chk_expenses_index_terminal CHECK (
        (status = 'pending') = (current_approver_index IS NOT NULL)
    )
);

-- Approver queues
CREATE INDEX idx_expenses_queue ON expenses(status_role, created_at DESC) WHERE status = 'pending';

-- Submitter history
CREATE INDEX idx_expenses_submitter ON expenses(submitter_id, created_at DESC);

CREATE INDEX idx_expenses_created ON expenses(created_at DESC);
";

const TRIGGERS_SQL: &str = r"
-- Normalized amounts are fixed at submission
CREATE OR REPLACE FUNCTION prevent_expense_amount_change()
RETURNS TRIGGER AS $$
BEGIN
    IF NEW.amount <> OLD.amount
        OR NEW.currency <> OLD.currency
        OR NEW.base_amount <> OLD.base_amount
        OR NEW.base_currency <> OLD.base_currency
        OR NEW.conversion_rate <> OLD.conversion_rate
        OR NEW.approval_flow <> OLD.approval_flow THEN
        RAISE EXCEPTION 'expense amounts and approval flow are immutable';
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_expenses_immutable_amounts
    BEFORE UPDATE ON expenses
    FOR EACH ROW EXECUTE FUNCTION prevent_expense_amount_change();
";

const DROP_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_expenses_immutable_amounts ON expenses;
DROP FUNCTION IF EXISTS prevent_expense_amount_change();
DROP TABLE IF EXISTS expenses CASCADE;
DROP TABLE IF EXISTS users CASCADE;
";
