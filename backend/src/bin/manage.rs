//! Administrative commands: schema migration, user registration and group
//! maintenance against the configured PostgreSQL database.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io::{self, BufRead};
use std::sync::Arc;

use blog_backend::domain::BlogAdminService;
use blog_backend::outbound::persistence::{
    DbPool, DieselGroupRepository, DieselUserRepository, PoolConfig, run_pending_migrations,
};
use blog_backend::outbound::security::Argon2PasswordHasher;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use tokio::runtime::Builder;
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

const DATABASE_URL_ENV: &str = "BLOG_DATABASE_URL";
const PASSWORD_ENV: &str = "BLOG_PASSWORD";

/// `manage` command arguments.
#[derive(Debug, Parser)]
#[command(name = "manage", about = "Administer the blog database", version)]
struct CliArgs {
    /// Database connection URL. Falls back to `BLOG_DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url", global = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending schema migrations.
    Migrate,
    /// Register a user. The password is read from `BLOG_PASSWORD` or the
    /// first line of standard input.
    CreateUser {
        /// Login name.
        username: String,
    },
    /// Create a group.
    CreateGroup {
        /// Unique URL slug.
        slug: String,
        /// Display title.
        title: String,
        /// Optional longer description.
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Delete a group. Its posts are kept without a group.
    DeleteGroup {
        /// Slug of the group to delete.
        slug: String,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .try_init()
    {
        tracing::warn!(%error, "tracing init failed");
    }

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> Result<()> {
    let database_url = resolve_database_url(args.database_url, env::var(DATABASE_URL_ENV).ok())?;
    if let Command::Migrate = args.command {
        run_pending_migrations(&database_url)
            .await
            .wrap_err("migrate database")?;
        return Ok(());
    }

    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(1))
        .await
        .wrap_err("create database pool")?;
    let admin = BlogAdminService::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselGroupRepository::new(pool)),
        Arc::new(Argon2PasswordHasher),
    );

    match args.command {
        Command::Migrate => {}
        Command::CreateUser { username } => {
            let password = read_password(env::var(PASSWORD_ENV).ok(), io::stdin().lock())?;
            let user = admin
                .create_user(&username, password)
                .await
                .map_err(|error| eyre!("create user: {error}"))?;
            tracing::info!(user_id = %user.id(), "created user {}", user.username());
        }
        Command::CreateGroup {
            slug,
            title,
            description,
        } => {
            admin
                .create_group(&slug, &title, &description)
                .await
                .map_err(|error| eyre!("create group: {error}"))?;
        }
        Command::DeleteGroup { slug } => {
            admin
                .delete_group(&slug)
                .await
                .map_err(|error| eyre!("delete group: {error}"))?;
        }
    }
    Ok(())
}

fn resolve_database_url(explicit: Option<String>, from_env: Option<String>) -> Result<String> {
    let url = explicit
        .or(from_env)
        .ok_or_else(|| eyre!("database URL missing: set --database-url or {DATABASE_URL_ENV}"))?;
    if url.trim().is_empty() {
        return Err(eyre!("database URL must not be empty"));
    }
    Ok(url)
}

fn read_password(from_env: Option<String>, mut input: impl BufRead) -> Result<Zeroizing<String>> {
    if let Some(password) = from_env {
        return Ok(Zeroizing::new(password));
    }
    let mut line = Zeroizing::new(String::new());
    input
        .read_line(&mut line)
        .wrap_err("read password from stdin")?;
    Ok(Zeroizing::new(line.trim_end_matches(['\r', '\n']).to_owned()))
}
