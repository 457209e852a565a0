//! Admin utilities: accounts, currencies and exchange rates are reference
//! data the public API never writes, so they are managed from here.

use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Engine, NewUserCmd};
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

#[derive(Parser, Debug)]
#[command(name = "cambio_admin")]
#[command(about = "Admin utilities for Cambio (accounts, currencies, rates)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./cambio.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Currency(Currency),
    Rate(Rate),
    /// Insert a starter currency set and their pairwise rates.
    Seed,
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
    email: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    password: String,
    /// Staff accounts are hidden from member-facing lookups.
    #[arg(long)]
    staff: bool,
    #[arg(long)]
    superuser: bool,
    /// Create the account deactivated; it can authenticate but gets 403.
    #[arg(long)]
    inactive: bool,
}

#[derive(Args, Debug)]
struct Currency {
    #[command(subcommand)]
    command: CurrencyCommand,
}

#[derive(Subcommand, Debug)]
enum CurrencyCommand {
    Create(CurrencyCreateArgs),
}

#[derive(Args, Debug)]
struct CurrencyCreateArgs {
    #[arg(long)]
    code: String,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct Rate {
    #[command(subcommand)]
    command: RateCommand,
}

#[derive(Subcommand, Debug)]
enum RateCommand {
    Set(RateSetArgs),
}

#[derive(Args, Debug)]
struct RateSetArgs {
    /// Source currency code, e.g. `USD`.
    #[arg(long)]
    from: String,
    /// Target currency code, e.g. `EUR`.
    #[arg(long)]
    to: String,
    /// Multiplicative factor applied to the source amount.
    #[arg(long)]
    amount: f64,
}

const SEED_CURRENCIES: &[(&str, &str)] = &[
    ("USD", "United States dollar"),
    ("EUR", "Euro"),
    ("GBP", "Pound sterling"),
    ("PLN", "Polish złoty"),
];

const SEED_RATES: &[(&str, &str, f64)] = &[
    ("USD", "EUR", 0.92),
    ("EUR", "USD", 1.09),
    ("USD", "GBP", 0.79),
    ("GBP", "USD", 1.27),
    ("USD", "PLN", 3.94),
    ("PLN", "USD", 0.25),
    ("EUR", "GBP", 0.86),
    ("GBP", "EUR", 1.17),
    ("EUR", "PLN", 4.28),
    ("PLN", "EUR", 0.23),
    ("GBP", "PLN", 4.99),
    ("PLN", "GBP", 0.20),
];

async fn connect(database_url: &str) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = sea_orm::Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(user) => match user.command {
            UserCommand::Create(args) => {
                let cmd = NewUserCmd::new(args.email, args.name, args.password)
                    .active(!args.inactive)
                    .staff(args.staff)
                    .superuser(args.superuser);
                let user = engine.create_user(cmd).await?;
                println!("created user {} (id {})", user.email, user.id);
            }
        },
        Command::Currency(currency) => match currency.command {
            CurrencyCommand::Create(args) => {
                let currency = engine.create_currency(&args.code, &args.name).await?;
                println!("created currency {} (id {})", currency.code, currency.id);
            }
        },
        Command::Rate(rate) => match rate.command {
            RateCommand::Set(args) => {
                let rate = engine.set_rate(&args.from, &args.to, args.amount).await?;
                println!(
                    "rate {} -> {} = {}",
                    rate.from_currency.code, rate.to_currency.code, rate.amount
                );
            }
        },
        Command::Seed => {
            for (code, name) in SEED_CURRENCIES {
                match engine.create_currency(code, name).await {
                    Ok(currency) => println!("created currency {}", currency.code),
                    Err(engine::EngineError::ExistingKey(_)) => {
                        println!("currency {code} already present, skipping");
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            for (from, to, amount) in SEED_RATES {
                let rate = engine.set_rate(from, to, *amount).await?;
                println!(
                    "rate {} -> {} = {}",
                    rate.from_currency.code, rate.to_currency.code, rate.amount
                );
            }
        }
    }

    Ok(())
}
