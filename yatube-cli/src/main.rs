use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use validator::Validate;

use yatube_server::application::auth_service::hash_password;
use yatube_server::data::{
    GroupRepository, PostgresGroupRepository, PostgresUserRepository, UserRepository,
};
use yatube_server::domain::group::CreateGroupRequest;
use yatube_server::domain::user::RegisterUserRequest;
use yatube_server::domain::DomainError;
use yatube_server::infrastructure::database::{create_pool, run_migrations};
use yatube_server::infrastructure::logging::init_logging;

#[derive(Parser)]
#[command(author, version, about = "Yatube operator tool", long_about = None)]
struct Cli {
    /// Overrides DATABASE_URL from the environment
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a post group
    CreateGroup {
        #[arg(short, long)]
        title: String,

        /// Defaults to the slugified title
        #[arg(short, long)]
        slug: Option<String>,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Create a user account
    CreateUser {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// List all groups
    ListGroups,
}

fn group_request(
    title: &str,
    explicit_slug: Option<&str>,
    description: &str,
) -> CreateGroupRequest {
    CreateGroupRequest {
        title: title.trim().to_string(),
        slug: explicit_slug
            .map(str::to_string)
            .unwrap_or_else(|| slug::slugify(title)),
        description: description.to_string(),
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if let Err(e) = init_logging("warn") {
        eprintln!("{} {:#}", "⚠".yellow(), e);
    }

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "❌".red(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let database_url = match cli.database_url {
        Some(url) => url,
        None => std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
    };

    let pool = create_pool(&database_url, 1).await?;
    run_migrations(&pool).await?;

    match cli.command {
        Commands::CreateGroup {
            title,
            slug,
            description,
        } => {
            let request = group_request(&title, slug.as_deref(), &description);
            request
                .validate()
                .map_err(|e| anyhow::anyhow!("invalid group: {}", e))?;

            let repo = PostgresGroupRepository::new(pool);
            match repo.create(request).await {
                Ok(group) => {
                    println!("{} Group created", "✅".green());
                    println!("   ID: {}", group.id);
                    println!("   Slug: {}", group.slug.bold());
                    println!("   Title: {}", group.title);
                }
                Err(DomainError::GroupAlreadyExists) => {
                    bail!("a group with this slug already exists")
                }
                Err(e) => return Err(e).context("failed to create group"),
            }
        }

        Commands::CreateUser {
            username,
            email,
            password,
        } => {
            let request = RegisterUserRequest {
                username,
                email,
                password,
            }
            .clean()
            .map_err(|errors| {
                let details: Vec<String> = errors
                    .iter()
                    .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
                    .collect();
                anyhow::anyhow!("invalid user: {}", details.join("; "))
            })?;

            let password_hash = hash_password(&request.password)?;
            let repo = PostgresUserRepository::new(pool);
            match repo.create(request, password_hash).await {
                Ok(user) => {
                    println!("{} User created", "✅".green());
                    println!("   ID: {}", user.id);
                    println!("   Username: {}", user.username.bold());
                    println!("   Email: {}", user.email);
                }
                Err(DomainError::UserAlreadyExists) => {
                    bail!("a user with this username or email already exists")
                }
                Err(e) => return Err(e).context("failed to create user"),
            }
        }

        Commands::ListGroups => {
            let repo = PostgresGroupRepository::new(pool);
            let groups = repo.list().await.context("failed to list groups")?;

            if groups.is_empty() {
                println!("   No groups yet");
                println!("   Tip: yatube-cli create-group --title \"My group\"");
            } else {
                for group in groups {
                    println!("   [{}] {}  {}", group.id, group.slug.bold(), group.title);
                }
            }
        }
    }

    Ok(())
}
