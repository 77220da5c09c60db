use anyhow::{Context, Result};

use crate::database::models::{User, UserRole};
use crate::database::store::UserStore;
use crate::services::auth::hash_password;

struct SeedUser {
    email: &'static str,
    name: &'static str,
    password: &'static str,
    role: UserRole,
    balance: i32,
    department: &'static str,
}

const ADMIN: SeedUser = SeedUser {
    email: "admin@company.com",
    name: "System Administrator",
    password: "admin123",
    role: UserRole::Admin,
    balance: 30,
    department: "IT",
};

const MANAGER: SeedUser = SeedUser {
    email: "maria.silva@company.com",
    name: "Maria Silva",
    password: "manager123",
    role: UserRole::Manager,
    balance: 25,
    department: "HR",
};

const EMPLOYEES: [SeedUser; 3] = [
    SeedUser {
        email: "joao.santos@company.com",
        name: "Joao Santos",
        password: "123456",
        role: UserRole::Employee,
        balance: 22,
        department: "Engineering",
    },
    SeedUser {
        email: "ana.oliveira@company.com",
        name: "Ana Oliveira",
        password: "123456",
        role: UserRole::Employee,
        balance: 28,
        department: "Design",
    },
    SeedUser {
        email: "carlos.pereira@company.com",
        name: "Carlos Pereira",
        password: "123456",
        role: UserRole::Employee,
        balance: 15,
        department: "Marketing",
    },
];

impl SeedUser {
    fn build(&self, cost: u32) -> Result<User> {
        let password_hash = hash_password(self.password, cost)
            .with_context(|| format!("Failed to hash password for {}", self.email))?;

        Ok(User::new(
            self.email.to_string(),
            password_hash,
            self.name.to_string(),
            self.role,
        )
        .with_balance(self.balance)
        .with_department(self.department))
    }
}

/// Fills an empty user table with an admin, a manager and three of their
/// reports. Returns how many users were created.
pub async fn seed_database(users: &dyn UserStore, bcrypt_cost: u32) -> Result<usize> {
    if users.count_users().await? > 0 {
        log::info!("Database already seeded, skipping...");
        return Ok(0);
    }

    log::info!("Seeding database with initial data...");

    users.create_user(&ADMIN.build(bcrypt_cost)?).await?;
    let manager = users.create_user(&MANAGER.build(bcrypt_cost)?).await?;

    for employee in &EMPLOYEES {
        let user = employee.build(bcrypt_cost)?.with_manager(Some(manager.id));
        users.create_user(&user).await?;
    }

    log::info!("Database seeded successfully! Available users:");
    for seed in std::iter::once(&ADMIN)
        .chain(std::iter::once(&MANAGER))
        .chain(EMPLOYEES.iter())
    {
        log::info!("- {} ({}): {} / {}", seed.name, seed.role, seed.email, seed.password);
    }

    Ok(2 + EMPLOYEES.len())
}
