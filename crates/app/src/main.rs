//! Rigforge Application CLI

use std::process;

use clap::{Args, Parser, Subcommand};
use rigforge_app::{
    auth::{JwtConfig, JwtService, NewUser, PgAuthService, Role},
    database::{self, Db},
};
use sqlx::PgPool;

#[derive(Debug, Parser)]
#[command(name = "rigforge-app", about = "Rigforge CLI", long_about = None)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(DbCommand),
    User(UserCommand),
}

#[derive(Debug, Args)]
struct DbCommand {
    #[command(subcommand)]
    command: DbSubcommand,
}

#[derive(Debug, Subcommand)]
enum DbSubcommand {
    /// Apply pending migrations
    Migrate,
}

#[derive(Debug, Args)]
struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Debug, Subcommand)]
enum UserSubcommand {
    /// Create a user with the admin role
    CreateAdmin(CreateAdminArgs),

    /// Grant the admin role to an existing user
    Promote(PromoteArgs),
}

#[derive(Debug, Args)]
struct CreateAdminArgs {
    /// Display name
    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long, env = "RIGFORGE_ADMIN_PASSWORD")]
    password: String,
}

#[derive(Debug, Args)]
struct PromoteArgs {
    #[arg(long)]
    email: String,
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let pool = connect(cli.database_url.as_deref()).await?;

    match cli.command {
        Commands::Db(DbCommand {
            command: DbSubcommand::Migrate,
        }) => migrate(&pool).await,
        Commands::User(UserCommand {
            command: UserSubcommand::CreateAdmin(args),
        }) => create_admin(pool, args).await,
        Commands::User(UserCommand {
            command: UserSubcommand::Promote(args),
        }) => promote(pool, args).await,
    }
}

async fn connect(database_url: Option<&str>) -> Result<PgPool, String> {
    let database_url = database_url.ok_or("DATABASE_URL is not set")?;

    database::connect(database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))
}

async fn migrate(pool: &PgPool) -> Result<(), String> {
    database::migrate(pool)
        .await
        .map_err(|error| format!("failed to apply migrations: {error}"))?;

    println!("migrations applied");

    Ok(())
}

async fn create_admin(pool: PgPool, args: CreateAdminArgs) -> Result<(), String> {
    let user = auth_service(pool)?
        .create_user(
            NewUser {
                name: args.name,
                email: args.email,
                password: args.password,
            },
            Role::Admin,
        )
        .await
        .map_err(|error| format!("failed to create admin: {error}"))?;

    println!("user_uuid: {}", user.uuid);
    println!("email: {}", user.email);
    println!("role: {}", user.role);

    Ok(())
}

async fn promote(pool: PgPool, args: PromoteArgs) -> Result<(), String> {
    let user = auth_service(pool)?
        .promote_to_admin(&args.email)
        .await
        .map_err(|error| format!("failed to promote user: {error}"))?;

    println!("user_uuid: {}", user.uuid);
    println!("role: {}", user.role);

    Ok(())
}

/// Token settings are irrelevant to user management, so any valid secret works here.
fn auth_service(pool: PgPool) -> Result<PgAuthService, String> {
    let jwt = JwtConfig::new("rigforge-cli-unused-signing-secret!", 1, "rigforge-cli")
        .map_err(|error| format!("failed to configure tokens: {error}"))?;

    Ok(PgAuthService::new(Db::new(pool), JwtService::new(jwt)))
}
