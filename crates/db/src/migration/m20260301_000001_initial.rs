//! Initial database migration.
//!
//! Creates the enums, profile and feed tables, the chart of accounts and
//! the ledger tables.

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
        // PART 2: PROFILES & FEED
        // ============================================================
        db.execute_unprepared(PROFILES_SQL).await?;
        db.execute_unprepared(POSTS_SQL).await?;

        // ============================================================
        // PART 3: ORGANIZATIONS & CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ORGANIZATIONS_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 4: TRANSACTIONS & LEDGER
        // ============================================================
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(JOURNAL_LINES_SQL).await?;

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

CREATE TYPE normal_balance AS ENUM ('debit', 'credit');
";

const PROFILES_SQL: &str = r"
-- id matches the subject of tokens issued by the hosted auth provider
CREATE TABLE profiles (
    id UUID PRIMARY KEY,
    name VARCHAR(256),
    email VARCHAR(256) NOT NULL,
    image VARCHAR(256)
);
";

const POSTS_SQL: &str = r"
CREATE TABLE posts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    content TEXT NOT NULL CHECK (char_length(content) >= 2),
    posted_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    processed BOOLEAN NOT NULL DEFAULT false,
    -- NULL means no attachments were submitted; '[]' is an explicit empty list
    file_urls JSONB CHECK (file_urls IS NULL OR jsonb_typeof(file_urls) = 'array')
);

CREATE INDEX idx_posts_user ON posts(user_id);
CREATE INDEX idx_posts_posted_at ON posts(posted_at DESC);
";

const ORGANIZATIONS_SQL: &str = r"
CREATE TABLE organizations (
    id SERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    owner_id UUID NOT NULL REFERENCES profiles(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_organizations_owner ON organizations(owner_id);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id SERIAL PRIMARY KEY,
    organization_id INTEGER NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(100) NOT NULL,
    account_type account_type NOT NULL,
    normal_balance normal_balance NOT NULL,
    balance NUMERIC(12, 2) NOT NULL DEFAULT 0,
    UNIQUE (organization_id, name)
);

CREATE INDEX idx_accounts_org ON accounts(organization_id);
CREATE INDEX idx_accounts_type ON accounts(organization_id, account_type);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id SERIAL PRIMARY KEY,
    organization_id INTEGER NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    description TEXT NOT NULL,
    date DATE NOT NULL,
    post_id UUID REFERENCES posts(id) ON DELETE SET NULL,
    is_approved BOOLEAN NOT NULL DEFAULT false,
    approved_by UUID REFERENCES profiles(id),
    approved_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CHECK (is_approved = (approved_at IS NOT NULL))
);

CREATE INDEX idx_transactions_org ON transactions(organization_id, created_at DESC);
CREATE INDEX idx_transactions_date ON transactions(date);
CREATE INDEX idx_transactions_post ON transactions(post_id) WHERE post_id IS NOT NULL;
CREATE INDEX idx_transactions_approved_by ON transactions(approved_by) WHERE approved_by IS NOT NULL;
";

const JOURNAL_LINES_SQL: &str = r"
CREATE TABLE journal_lines (
    id SERIAL PRIMARY KEY,
    transaction_id INTEGER NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
    account_id INTEGER NOT NULL REFERENCES accounts(id),
    amount NUMERIC(12, 2) NOT NULL CHECK (amount >= 0),
    is_credit BOOLEAN NOT NULL
);

CREATE INDEX idx_journal_lines_transaction ON journal_lines(transaction_id);
CREATE INDEX idx_journal_lines_account ON journal_lines(account_id);
";

const DROP_ALL_SQL: &str = r"
-- Order matters due to foreign key constraints
DROP TABLE IF EXISTS journal_lines;
DROP TABLE IF EXISTS transactions;
DROP TABLE IF EXISTS accounts;
DROP TABLE IF EXISTS organizations;
DROP TABLE IF EXISTS posts;
DROP TABLE IF EXISTS profiles;

DROP TYPE IF EXISTS normal_balance;
DROP TYPE IF EXISTS account_type;
";
