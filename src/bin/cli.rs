use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use registrar::cli::seeder::{self, SeedConfig};
use registrar::modules::identity::service::IdentityService;
use registrar_models::users::{CreateUserDto, Role};

#[derive(Parser)]
#[command(name = "registrar-cli")]
#[command(about = "Registrar CLI - Administrative tools for Registrar", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the default administrator account if none exists
    EnsureAdmin,
    /// Create a new user account
    CreateUser {
        /// Caller-assigned user id (at most 15 characters)
        #[arg(short = 'i', long)]
        id: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Full name
        #[arg(short = 'n', long)]
        full_name: Option<String>,

        /// Role: admin, lecturer, or student
        #[arg(short = 'r', long)]
        role: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the database with demo departments, courses, sections, and users
    Seed {
        /// Number of departments to create
        #[arg(short = 'd', long, default_value = "3")]
        departments: usize,

        /// Number of courses per department
        #[arg(long, default_value = "2")]
        courses: usize,

        /// Number of lecturers per department
        #[arg(long, default_value = "2")]
        lecturers: usize,

        /// Number of students per department
        #[arg(long, default_value = "10")]
        students: usize,

        /// Number of rooms
        #[arg(long, default_value = "4")]
        rooms: usize,

        /// Number of enrollments per class section
        #[arg(long, default_value = "5")]
        enrollments: usize,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info,sqlx=warn", env!("CARGO_PKG_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = registrar_db::init_db_pool().await;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let cli = Cli::parse();

    match cli.command {
        Commands::EnsureAdmin => handle_ensure_admin(&pool).await,
        Commands::CreateUser {
            id,
            email,
            full_name,
            role,
            password,
        } => handle_create_user(&pool, id, email, full_name, role, password).await,
        Commands::Seed {
            departments,
            courses,
            lecturers,
            students,
            rooms,
            enrollments,
        } => {
            let config = SeedConfig {
                departments,
                courses_per_department: courses,
                lecturers_per_department: lecturers,
                students_per_department: students,
                rooms,
                enrollments_per_section: enrollments,
            };
            handle_seed(&pool, config).await
        }
    }
}

async fn handle_ensure_admin(pool: &sqlx::PgPool) {
    match IdentityService::ensure_admin_exists(pool).await {
        Ok(true) => {
            println!("✅ Admin account created.");
            println!("   Email: {}", registrar_models::users::default_admin::EMAIL);
        }
        Ok(false) => {
            println!("✅ Admin account already exists.");
        }
        Err(e) => {
            eprintln!("\n❌ Error ensuring admin account: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_create_user(
    pool: &sqlx::PgPool,
    id: Option<String>,
    email: Option<String>,
    full_name: Option<String>,
    role: Option<String>,
    password: Option<String>,
) {
    let id = id.unwrap_or_else(|| {
        Input::new()
            .with_prompt("User id")
            .interact_text()
            .expect("Failed to read user id")
    });

    let email = email.unwrap_or_else(|| {
        Input::new()
            .with_prompt("Email address")
            .interact_text()
            .expect("Failed to read email")
    });

    let full_name = full_name.unwrap_or_else(|| {
        Input::new()
            .with_prompt("Full name")
            .interact_text()
            .expect("Failed to read full name")
    });

    let role = role.unwrap_or_else(|| {
        Input::new()
            .with_prompt("Role (admin/lecturer/student)")
            .interact_text()
            .expect("Failed to read role")
    });

    let role: Role = match role.parse() {
        Ok(role) => role,
        Err(e) => {
            eprintln!("\n❌ {}", e);
            std::process::exit(1);
        }
    };

    let password = password.unwrap_or_else(|| {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .expect("Failed to read password")
    });

    let email = match email.parse() {
        Ok(email) => email,
        Err(e) => {
            eprintln!("\n❌ {}", e);
            std::process::exit(1);
        }
    };

    let dto = CreateUserDto {
        id: id.clone().into(),
        email,
        role,
        full_name: full_name.clone(),
        date_of_birth: None,
        password,
    };

    match IdentityService::create_user(pool, dto).await {
        Ok(user) => {
            println!("\n✅ User created successfully!");
            println!("   Id: {}", user.id);
            println!("   Email: {}", user.email);
            println!("   Name: {}", user.full_name);

            // An admin profile needs nothing beyond the user row, so
            // attach it here; lecturer/student profiles reference a
            // department and are attached by the service API instead.
            if role == Role::Admin {
                if let Err(e) = IdentityService::create_admin(pool, &user.id).await {
                    eprintln!("\n❌ Error attaching admin profile: {}", e);
                    std::process::exit(1);
                }
                println!("   Admin profile attached.");
            }
        }
        Err(e) => {
            eprintln!("\n❌ Error creating user: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_seed(pool: &sqlx::PgPool, config: SeedConfig) {
    match seeder::seed_all(pool, config).await {
        Ok(_) => {}
        Err(e) => {
            eprintln!("\n❌ Error seeding database: {}", e);
            std::process::exit(1);
        }
    }
}
