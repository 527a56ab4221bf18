//! Database seeder for Ringbook development and testing.
//!
//! Seeds a profile, an organization it owns, and the default chart of
//! accounts. Running it twice leaves existing rows alone.
//!
//! Environment:
//! - `DATABASE_URL` (required)
//! - `SEED_USER_ID`: auth provider user id (defaults to a fixed test id)
//! - `SEED_USER_EMAIL`: profile email (defaults to `test@ringbook.dev`)
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use ringbook_core::ledger::AccountType;
use ringbook_db::{
    AccountRepository, OrganizationRepository, ProfileRepository,
    repositories::CreateAccountInput,
};
use ringbook_shared::types::{OrganizationId, UserId};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

/// Test user ID used when `SEED_USER_ID` is not set.
const TEST_USER_ID: &str = "00000000-0000-0000-0000-000000000002";

/// The default chart: name and type per account.
const DEFAULT_CHART: &[(&str, AccountType)] = &[
    ("HSBC", AccountType::Asset),
    ("Inventory", AccountType::Asset),
    ("Receive-later", AccountType::Asset),
    ("Fixed-Asset", AccountType::Asset),
    ("Credit-Card", AccountType::Liability),
    ("Loan", AccountType::Liability),
    ("Pay-Later", AccountType::Liability),
    ("Capital", AccountType::Equity),
    ("Sales", AccountType::Revenue),
    ("Fee-Income", AccountType::Revenue),
    ("Interest-Income", AccountType::Revenue),
    ("Rent", AccountType::Expense),
    ("Payroll", AccountType::Expense),
    ("Meal", AccountType::Expense),
    ("Marketing", AccountType::Expense),
    ("Other", AccountType::Expense),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;
    let user_id = UserId::from_uuid(
        Uuid::parse_str(&std::env::var("SEED_USER_ID").unwrap_or_else(|_| TEST_USER_ID.into()))
            .context("SEED_USER_ID must be a UUID")?,
    );
    let email = std::env::var("SEED_USER_EMAIL").unwrap_or_else(|_| "test@ringbook.dev".into());

    println!("Connecting to database...");
    let db = ringbook_db::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    println!("Seeding profile...");
    ProfileRepository::new(db.clone())
        .upsert(user_id, &email, Some("Test User"))
        .await?;
    println!("  Profile {user_id} <{email}>");

    println!("Seeding organization...");
    let organization_id = seed_organization(&db, user_id).await?;

    println!("Seeding chart of accounts...");
    seed_chart(&db, organization_id).await?;

    println!("Seeding complete!");
    Ok(())
}

async fn seed_organization(db: &DatabaseConnection, owner: UserId) -> anyhow::Result<OrganizationId> {
    let repo = OrganizationRepository::new(db.clone());
    if let Some(existing) = repo.find_by_owner(owner).await? {
        println!("  Organization already exists, skipping...");
        return Ok(OrganizationId(existing.id));
    }

    let org = repo.create("Test Organization", owner).await?;
    println!("  Created organization {}", org.id);
    Ok(OrganizationId(org.id))
}

async fn seed_chart(db: &DatabaseConnection, organization_id: OrganizationId) -> anyhow::Result<()> {
    let repo = AccountRepository::new(db.clone());
    if !repo.list_accounts(organization_id).await?.is_empty() {
        println!("  Chart of accounts already exists, skipping...");
        return Ok(());
    }

    let inputs: Vec<CreateAccountInput> = DEFAULT_CHART
        .iter()
        .map(|(name, account_type)| CreateAccountInput::new(*name, *account_type))
        .collect();
    let created = repo.create_accounts(organization_id, &inputs).await?;
    println!("  Created {} accounts", created.len());
    Ok(())
}
