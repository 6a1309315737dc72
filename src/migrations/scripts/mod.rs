pub mod m001_users;
pub mod m002_expenses;
pub mod m003_groups;
pub mod m004_backfill_expense_split;
pub mod m005_seed_roommates;
