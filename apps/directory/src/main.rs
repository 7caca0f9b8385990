use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{EmployeeForm, ViewMode};
use shared::domain::{EmployeeId, SortKey, SortOrder};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod repl;
mod ui_error;

use app::{App, EmployeeFields};
use repl::Prompter;

#[derive(Parser, Debug)]
#[command(name = "directory")]
#[command(about = "Employee directory client", long_about = None)]
struct Cli {
    /// GraphQL endpoint of the directory gateway
    #[arg(long, global = true)]
    gateway_url: Option<String>,
    /// Local storage for the session, e.g. sqlite://./data/directory.db
    #[arg(long, global = true)]
    database_url: Option<String>,
    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session
    Login {
        #[arg(long, short)]
        username: String,
        /// Prompted for when omitted
        #[arg(long, short)]
        password: Option<String>,
    },
    /// Sign out and clear the persisted session
    Logout,
    /// Show the current session
    Whoami {
        /// Skip the gateway round trip
        #[arg(long)]
        offline: bool,
    },
    /// List employees, one page at a time
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value = "name")]
        sort_by: SortKey,
        #[arg(long, default_value = "asc")]
        order: SortOrder,
        /// grid or tile
        #[arg(long, value_parser = parse_view_mode)]
        view: Option<ViewMode>,
    },
    /// Free-text search over employees
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, value_parser = parse_view_mode)]
        view: Option<ViewMode>,
    },
    /// Show one employee
    Show { id: String },
    /// Create an employee (admin)
    Add {
        #[command(flatten)]
        fields: EmployeeFields,
    },
    /// Edit an employee (admin)
    Edit {
        id: String,
        #[command(flatten)]
        fields: EmployeeFields,
    },
    /// Delete an employee (admin)
    Delete {
        id: String,
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Render a route, e.g. /employees/grid or /reports
    Open { path: String },
    /// Interactive shell (the default)
    Shell,
}

fn parse_view_mode(raw: &str) -> Result<ViewMode, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "grid" | "table" => Ok(ViewMode::Grid),
        "tile" | "list" => Ok(ViewMode::Tile),
        other => Err(format!("unknown view mode '{other}' (expected grid or tile)")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = config::load_settings()?;
    if let Some(v) = cli.gateway_url {
        settings.gateway_url = v;
    }
    if let Some(v) = cli.database_url {
        settings.database_url = config::normalize_database_url(&v);
    }
    if let Some(v) = cli.timeout_secs {
        settings.request_timeout_secs = v;
    }

    let mut app = App::connect(&settings).await?;
    let mut prompter = Prompter::stdin();

    let outcome = match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => return repl::run(&mut app, &mut prompter).await,
        Command::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => prompter.ask("Password: ").await?.unwrap_or_default(),
            };
            app.login(&username, password.trim()).await
        }
        Command::Logout => app.logout().await,
        Command::Whoami { offline } => app.whoami(!offline).await,
        Command::List {
            page,
            sort_by,
            order,
            view,
        } => {
            if app.enter_directory(view).await {
                let list = app.client().list().clone();
                list.configure(page, sort_by, order).await;
                let view = list.refresh().await;
                app.show_directory(view).await
            } else {
                Ok(())
            }
        }
        Command::Search { query, page, view } => {
            if app.enter_directory(view).await {
                let list = app.client().list().clone();
                let mut view = list.submit_search(&query).await;
                if page > 1 && view.has_next {
                    view = list.set_page(page).await;
                }
                app.show_directory(view).await
            } else {
                Ok(())
            }
        }
        Command::Show { id } => app.show_employee(&EmployeeId::new(id)).await,
        Command::Add { fields } => {
            let mut form = EmployeeForm::create();
            fields.apply_to(&mut form);
            app.save(&form).await
        }
        Command::Edit { id, fields } => match app.edit_form(&EmployeeId::new(id)).await {
            Ok(mut form) => {
                fields.apply_to(&mut form);
                app.save(&form).await
            }
            Err(err) => Err(err),
        },
        Command::Delete { id, yes } => {
            if yes
                || prompter
                    .confirm("Are you sure you want to delete this employee?")
                    .await?
            {
                app.delete(&EmployeeId::new(id)).await
            } else {
                println!("Cancelled.");
                Ok(())
            }
        }
        Command::Open { path } => app.open(&path).await,
    };

    if let Err(err) = outcome {
        debug!(category = ?err.category(), context = ?err.context(), "command failed");
        eprintln!("{err}");
        std::process::exit(1);
    }
    Ok(())
}
