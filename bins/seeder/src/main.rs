//! Database seeder for EPM development and testing.
//!
//! Seeds the standard roles, a couple of teams and a Super Admin account
//! for local development and testing purposes.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use epm_core::auth::hash_password;
use epm_db::entities::{roles, teams, users};

/// The roles the application expects to exist.
const ROLE_NAMES: [&str; 6] = [
    "Super Admin",
    "HR",
    "Billing Manager",
    "Project Manager",
    "Team Lead",
    "Employee",
];

/// Development teams seeded for convenience.
const TEAM_NAMES: [&str; 3] = ["Development", "Design", "Sales"];

/// Seed admin account ID (consistent for all seeds).
const ADMIN_USER_ID: &str = "00000000-0000-0000-0000-000000000001";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = epm_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding roles...");
    seed_roles(&db).await;

    println!("Seeding teams...");
    seed_teams(&db).await;

    println!("Seeding admin user...");
    seed_admin_user(&db).await;

    println!("Seeding complete!");
}

fn admin_user_id() -> Uuid {
    Uuid::parse_str(ADMIN_USER_ID).unwrap()
}

/// Seeds the standard role set, skipping names that already exist.
async fn seed_roles(db: &DatabaseConnection) {
    for name in ROLE_NAMES {
        let exists = roles::Entity::find()
            .filter(roles::Column::Name.eq(name))
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some();
        if exists {
            println!("  Role {name:?} already exists, skipping...");
            continue;
        }

        let now = Utc::now().into();
        roles::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .expect("Failed to seed role");
    }
}

/// Seeds the development teams, skipping names that already exist.
async fn seed_teams(db: &DatabaseConnection) {
    for name in TEAM_NAMES {
        let exists = teams::Entity::find()
            .filter(teams::Column::Name.eq(name))
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some();
        if exists {
            println!("  Team {name:?} already exists, skipping...");
            continue;
        }

        let now = Utc::now().into();
        teams::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .expect("Failed to seed team");
    }
}

/// Seeds a Super Admin account for development.
async fn seed_admin_user(db: &DatabaseConnection) {
    if users::Entity::find_by_id(admin_user_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Admin user already exists, skipping...");
        return;
    }

    let super_admin = roles::Entity::find()
        .filter(roles::Column::Name.eq("Super Admin"))
        .one(db)
        .await
        .expect("Failed to look up Super Admin role")
        .expect("Super Admin role must be seeded first");

    let password_hash = hash_password("admin123").expect("Failed to hash seed password");

    let now = Utc::now().into();
    users::ActiveModel {
        id: Set(admin_user_id()),
        name: Set("Admin".to_string()),
        email: Set("admin@epm.dev".to_string()),
        password_hash: Set(password_hash),
        role_id: Set(super_admin.id),
        team_id: Set(None),
        phone: Set(None),
        address: Set(None),
        joining_date: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to seed admin user");
}
