use bookstore_app::database::{self, DEFAULT_MAX_CONNECTIONS, Db};
use clap::{Parser, Subcommand};

mod category;
mod db;
mod token;
mod user;

#[derive(Debug, Parser)]
#[command(name = "bookstore-app", about = "Bookstore admin CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    User(user::UserCommand),
    Token(token::TokenCommand),
    Category(category::CategoryCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::User(command) => user::run(command).await,
            Commands::Token(command) => token::run(command).await,
            Commands::Category(command) => category::run(command).await,
        }
    }
}

pub(crate) async fn connect(database_url: &str) -> Result<Db, String> {
    database::connect(database_url, DEFAULT_MAX_CONNECTIONS)
        .await
        .map(Db::new)
        .map_err(|error| format!("failed to connect to database: {error}"))
}
