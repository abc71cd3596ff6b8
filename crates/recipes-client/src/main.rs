//! More Recipes CLI
//!
//! Fills and submits the More Recipes forms from the command line.
//!
//! # Usage
//!
//! ```bash
//! recipes login --email chef@example.com --password secret
//! recipes review 12 --rating 5 --comment "Lovely"
//! recipes add-recipe --name "Jollof Rice" --total-time "45 mins" --difficulty Normal \
//!     --ingredient Rice --ingredient Tomatoes --direction "Cook it" --image jollof.png
//! recipes edit-recipe 12 --difficulty Easy
//! recipes whoami
//! ```

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use recipes_client::{telemetry, ClientConfig};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "recipes")]
#[command(author = "More Recipes")]
#[command(version)]
#[command(about = "More Recipes command line client", long_about = None)]
struct Cli {
    /// API base URL
    #[arg(long, env = "RECIPES_API_URL")]
    api_url: Option<String>,

    /// Image upload endpoint
    #[arg(long, env = "RECIPES_UPLOAD_URL")]
    upload_url: Option<String>,

    /// Session token file
    #[arg(long, env = "RECIPES_TOKEN_PATH")]
    token_path: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, env = "RECIPES_LOG_LEVEL")]
    log_level: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "json")]
    format: output::OutputFormat,

    /// Profile name from config file
    #[arg(long, short)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "RECIPES_PASSWORD")]
        password: String,
    },
    /// Create an account
    Signup(SignupArgs),
    /// Review a recipe
    Review {
        recipe_id: u64,
        /// Stars, 1 to 5
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        comment: String,
    },
    /// Add a recipe
    AddRecipe(RecipeArgs),
    /// Edit an existing recipe; only the given fields change
    EditRecipe {
        id: u64,
        #[command(flatten)]
        recipe: RecipeArgs,
    },
    /// Show the signed-in user
    Whoami,
    /// Forget the session token
    Logout,
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Args)]
struct SignupArgs {
    #[arg(long)]
    firstname: String,
    #[arg(long)]
    lastname: String,
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "RECIPES_PASSWORD")]
    password: String,
    #[arg(long)]
    password_confirm: String,
    #[arg(long)]
    about_me: Option<String>,
    #[arg(long)]
    occupation: Option<String>,
}

#[derive(Args)]
struct RecipeArgs {
    #[arg(long)]
    name: Option<String>,
    /// Image file to upload
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long)]
    total_time: Option<String>,
    #[arg(long)]
    difficulty: Option<String>,
    #[arg(long)]
    extra_info: Option<String>,
    #[arg(long)]
    vegetarian: Option<bool>,
    #[arg(long = "ingredient")]
    ingredients: Vec<String>,
    #[arg(long = "preparation")]
    preparations: Vec<String>,
    #[arg(long = "direction")]
    directions: Vec<String>,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a default config file
    Init,
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match ClientConfig::load(cli.profile.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(upload_url) = cli.upload_url {
        config.upload_url = upload_url;
    }
    if let Some(token_path) = cli.token_path {
        config.token_path = Some(token_path);
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }

    telemetry::init_tracing(&config.log_level);

    let result = run(cli.command, config, cli.profile.as_deref(), cli.format).await;

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(
    command: Commands,
    config: ClientConfig,
    profile: Option<&str>,
    format: output::OutputFormat,
) -> recipes_client::Result<()> {
    let ctx = commands::Context::new(config, format)?;

    match command {
        Commands::Login { email, password } => commands::auth::login(&ctx, email, password).await,
        Commands::Signup(args) => commands::auth::signup(&ctx, args).await,
        Commands::Whoami => commands::auth::whoami(&ctx).await,
        Commands::Logout => commands::auth::logout(&ctx),
        Commands::Review {
            recipe_id,
            rating,
            comment,
        } => commands::review::handle(&ctx, recipe_id, rating, comment).await,
        Commands::AddRecipe(args) => commands::recipes::add(&ctx, args).await,
        Commands::EditRecipe { id, recipe } => commands::recipes::edit(&ctx, id, recipe).await,
        Commands::Config { action } => commands::config::handle(action, &ctx, profile),
    }
}
