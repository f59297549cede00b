use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Actor, AutoApprovalSetting, Engine, EngineError, MoneyCents, Role};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "reimburse_admin")]
#[command(about = "Admin utilities for the reimbursement service (bootstrap users, settings)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./reimburse.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Settings(Settings),
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
    username: String,
    /// student, accountant, administrator or super_administrator.
    #[arg(long, default_value = "student", value_parser = parse_role)]
    role: Role,
    /// Address used for decision emails.
    #[arg(long)]
    email: Option<String>,
}

#[derive(Args, Debug)]
struct Settings {
    #[command(subcommand)]
    command: SettingsCommand,
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    /// Show or change the auto-approval threshold.
    AutoApproval(AutoApprovalArgs),
}

#[derive(Args, Debug)]
struct AutoApprovalArgs {
    #[command(subcommand)]
    command: AutoApprovalCommand,
}

#[derive(Subcommand, Debug)]
enum AutoApprovalCommand {
    Show,
    /// Approve requests up to and including `amount` on submission.
    Enable {
        /// Dollar amount, e.g. `100` or `49.99`.
        #[arg(long, value_parser = parse_amount)]
        amount: MoneyCents,
    },
    Disable,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::try_from(raw).map_err(|err| err.to_string())
}

fn parse_amount(raw: &str) -> Result<MoneyCents, String> {
    raw.parse::<MoneyCents>().map_err(|err| err.to_string())
}

/// Settings commands run with administrator rights on behalf of the operator.
fn operator() -> Actor {
    Actor::new("admin_cli", Role::Administrator)
}

fn print_setting(setting: AutoApprovalSetting) {
    if setting.enabled {
        println!("auto-approval: enabled, up to {}", setting.amount);
    } else {
        println!("auto-approval: disabled");
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
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
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;

            match engine
                .register_user(&args.username, &password, args.role, args.email.as_deref())
                .await
            {
                Ok(profile) => {
                    println!(
                        "created user: {} ({})",
                        profile.username,
                        profile.role.as_str()
                    );
                }
                Err(EngineError::ExistingKey(_)) => {
                    eprintln!("user already exists: {}", args.username);
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::Settings(Settings {
            command: SettingsCommand::AutoApproval(AutoApprovalArgs { command }),
        }) => {
            let actor = operator();
            let setting = match command {
                AutoApprovalCommand::Show => engine.auto_approval_setting(&actor).await?,
                AutoApprovalCommand::Enable { amount } => {
                    engine
                        .set_auto_approval(&actor, AutoApprovalSetting::enabled(amount))
                        .await?
                }
                AutoApprovalCommand::Disable => {
                    engine
                        .set_auto_approval(&actor, AutoApprovalSetting::disabled())
                        .await?
                }
            };
            print_setting(setting);
        }
    }

    Ok(())
}
