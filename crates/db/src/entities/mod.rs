//! `SeaORM` entity definitions.

pub mod accounts;
pub mod journal_lines;
pub mod organizations;
pub mod posts;
pub mod profiles;
pub mod sea_orm_active_enums;
pub mod transactions;
