use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::Engine;
use migration::MigratorTrait;
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub name: String,
        pub email: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "splitpot_admin")]
#[command(about = "Admin utilities for Splitpot (bootstrap users/groups)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./splitpot.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Group(Group),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    /// External identity id; a fresh UUID is generated when absent.
    #[arg(long)]
    id: Option<String>,
}

#[derive(Args, Debug)]
struct Group {
    #[command(subcommand)]
    command: GroupCommand,
}

#[derive(Subcommand, Debug)]
enum GroupCommand {
    Create(GroupCreateArgs),
}

#[derive(Args, Debug)]
struct GroupCreateArgs {
    /// Owner's user id.
    #[arg(long)]
    owner: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: Option<String>,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let email = args.email.trim().to_lowercase();
            if users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("user already exists: {email}");
                std::process::exit(1);
            }

            let id = args.id.unwrap_or_else(|| Uuid::new_v4().to_string());
            let user = users::ActiveModel {
                id: Set(id.clone()),
                name: Set(args.name),
                email: Set(email),
            };
            users::Entity::insert(user).exec(&db).await?;

            println!("created user: {id}");
        }
        Command::Group(Group {
            command: GroupCommand::Create(args),
        }) => {
            let engine = Engine::builder().database(db.clone()).build();
            let detail = engine
                .new_group(&args.owner, &args.name, args.description.as_deref())
                .await?;
            println!("created group: {} ({})", detail.group.name, detail.group.id);
        }
    }

    Ok(())
}
