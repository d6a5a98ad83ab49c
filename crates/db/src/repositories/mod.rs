//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod accessory;
pub mod client;
pub mod leave;
pub mod project;
pub mod report;
pub mod role;
pub mod session;
pub mod task;
pub mod team;
pub mod timesheet;
pub mod user;

pub use accessory::{AccessoryError, AccessoryInput, AccessoryRepository, AssignmentInput};
pub use client::{ClientRepository, CreateClientInput, UpdateClientInput};
pub use leave::LeaveRepository;
pub use project::{CreateProjectInput, ProjectError, ProjectRepository, UpdateProjectInput};
pub use report::{DayHours, EmployeeProjectHours, ProjectHoursRow, ReportRepository};
pub use role::RoleRepository;
pub use session::SessionRepository;
pub use task::{CreateTaskInput, TaskError, TaskRepository, UpdateTaskInput};
pub use team::TeamRepository;
pub use timesheet::{
    ApprovalItem, ApprovalItemOutcome, EditEntryInput, NewEntryInput, SyncOutcome,
    TimesheetRepository,
};
pub use user::{CreateUserInput, TeamUserCount, UpdateUserInput, UserRepository};
