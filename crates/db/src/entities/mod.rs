//! `SeaORM` entity definitions, one module per table.

pub mod accessories;
pub mod accessory_assignments;
pub mod accessory_categories;
pub mod clients;
pub mod leave_requests;
pub mod project_members;
pub mod projects;
pub mod roles;
pub mod sessions;
pub mod tasks;
pub mod teams;
pub mod timesheet_entries;
pub mod users;
