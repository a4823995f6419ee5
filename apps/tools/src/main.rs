use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use shared::domain::DocumentId;
use storage::{ContentStore, Storage};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/pitches.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    CreateUser {
        username: String,
    },
    ListStartups {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    ShowStartup {
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url)
        .await
        .with_context(|| format!("failed to open {}", cli.database_url))?;

    match cli.command {
        Command::CreateUser { username } => {
            let username = username.trim();
            if username.is_empty() {
                bail!("username must not be empty");
            }
            let user_id = storage.create_user(username).await?;
            println!("created user_id={user_id}");
        }
        Command::ListStartups { limit } => {
            for startup in storage.list_documents(limit).await? {
                println!(
                    "{}\t{}\t{}\tauthor={}\t{}",
                    startup.id,
                    startup.created_at.to_rfc3339(),
                    startup.document.slug.current,
                    startup.document.author.target,
                    startup.document.title
                );
            }
        }
        Command::ShowStartup { id } => {
            let Some(startup) = storage.load_document(&DocumentId(id.clone())).await? else {
                bail!("startup {id} not found");
            };
            println!("{}", serde_json::to_string_pretty(&startup)?);
        }
    }

    Ok(())
}
