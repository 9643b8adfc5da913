//! Initial database migration.
//!
//! Creates the enums, the wallets table, the transaction_logs table with
//! the unique idempotency-key constraint, and the append-only ledgers table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(WALLETS_SQL).await?;
        db.execute_unprepared(TRANSACTION_LOGS_SQL).await?;
        db.execute_unprepared(LEDGERS_SQL).await?;

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
CREATE TYPE transaction_log_status AS ENUM (
    'PENDING',
    'SUCCESS',
    'FAILED'
);

CREATE TYPE ledger_entry_type AS ENUM (
    'TRANSFER',
    'INTEREST',
    'OTHER'
);
";

const WALLETS_SQL: &str = r"
CREATE TABLE wallets (
    id SERIAL PRIMARY KEY,
    balance BIGINT NOT NULL DEFAULT 0,
    currency VARCHAR(3) NOT NULL DEFAULT 'USD',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_wallets_currency ON wallets(currency);
";

const TRANSACTION_LOGS_SQL: &str = r"
CREATE TABLE transaction_logs (
    id SERIAL PRIMARY KEY,
    idempotency_key VARCHAR(64) NOT NULL UNIQUE,
    status transaction_log_status NOT NULL,
    from_wallet_id INTEGER NOT NULL
        REFERENCES wallets(id) ON UPDATE CASCADE ON DELETE RESTRICT,
    to_wallet_id INTEGER NOT NULL
        REFERENCES wallets(id) ON UPDATE CASCADE ON DELETE RESTRICT,
    amount BIGINT NOT NULL,
    currency VARCHAR(3) NOT NULL,
    reference VARCHAR(255),
    description VARCHAR(255),
    response_payload JSONB,
    error_message VARCHAR(500),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_transaction_logs_status ON transaction_logs(status);
CREATE INDEX idx_transaction_logs_created_at ON transaction_logs(created_at);
";

const LEDGERS_SQL: &str = r#"
CREATE TABLE ledgers (
    id SERIAL PRIMARY KEY,
    wallet_id INTEGER NOT NULL
        REFERENCES wallets(id) ON UPDATE CASCADE ON DELETE RESTRICT,
    amount BIGINT NOT NULL,
    "type" ledger_entry_type NOT NULL,
    reference VARCHAR(255),
    transaction_log_id INTEGER
        REFERENCES transaction_logs(id) ON UPDATE CASCADE ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_ledgers_wallet_id ON ledgers(wallet_id);
CREATE INDEX idx_ledgers_transaction_log_id ON ledgers(transaction_log_id);
CREATE INDEX idx_ledgers_created_at ON ledgers(created_at);
"#;

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS ledgers;
DROP TABLE IF EXISTS transaction_logs;
DROP TABLE IF EXISTS wallets;
DROP TYPE IF EXISTS ledger_entry_type;
DROP TYPE IF EXISTS transaction_log_status;
";
