//! Interactive shell: one line per command, screens re-rendered after each.

use std::io::Write as _;

use client_core::{view::render_form, EmployeeForm, ViewMode};
use shared::domain::{EmployeeClass, EmployeeId, SortKey, SortOrder};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

use crate::{
    app::App,
    ui_error::{UiError, UiErrorContext},
};

const HELP: &str = "\
commands:
  open <path>            navigate, e.g. open /employees/list
  login [user] [pass]    sign in
  logout                 sign out
  whoami                 show and verify the current session
  menu [full]            show the navigation menu
  next | prev | page <n> move between pages
  sort <name|age|class|attendance>
  order <asc|desc>
  search <text>          free-text search; `search` alone clears it
  clear                  leave search mode
  view <grid|tile>       switch display mode
  refresh                reload the current page
  show <id>              employee details
  add                    create an employee (admin)
  edit <id>              edit an employee (admin)
  delete <id>            delete an employee (admin)
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Empty,
    Help,
    Quit,
    Open(String),
    Login {
        username: Option<String>,
        password: Option<String>,
    },
    Logout,
    Whoami,
    Menu { full: bool },
    Next,
    Prev,
    Page(u32),
    Sort(SortKey),
    Order(SortOrder),
    Search(String),
    Clear,
    View(ViewMode),
    Refresh,
    Show(EmployeeId),
    Add,
    Edit(EmployeeId),
    Delete(EmployeeId),
}

pub fn parse_line(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let required = |what: &str| {
        if rest.is_empty() {
            Err(format!("usage: {verb} <{what}>"))
        } else {
            Ok(rest.to_string())
        }
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "" => ReplCommand::Empty,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        "open" | "go" => ReplCommand::Open(required("path")?),
        "login" => {
            let mut parts = rest.split_whitespace().map(str::to_string);
            ReplCommand::Login {
                username: parts.next(),
                password: parts.next(),
            }
        }
        "logout" => ReplCommand::Logout,
        "whoami" => ReplCommand::Whoami,
        "menu" => ReplCommand::Menu {
            full: rest.eq_ignore_ascii_case("full"),
        },
        "next" | "n" => ReplCommand::Next,
        "prev" | "p" => ReplCommand::Prev,
        "page" => ReplCommand::Page(
            required("number")?
                .parse()
                .map_err(|_| format!("not a page number: '{rest}'"))?,
        ),
        "sort" => ReplCommand::Sort(required("key")?.parse()?),
        "order" => ReplCommand::Order(required("asc|desc")?.parse()?),
        "search" | "/" => ReplCommand::Search(rest.to_string()),
        "clear" => ReplCommand::Clear,
        "view" => match required("grid|tile")?.to_ascii_lowercase().as_str() {
            "grid" | "table" => ReplCommand::View(ViewMode::Grid),
            "tile" | "list" => ReplCommand::View(ViewMode::Tile),
            other => return Err(format!("unknown view mode '{other}'")),
        },
        "refresh" | "r" => ReplCommand::Refresh,
        "show" => ReplCommand::Show(EmployeeId::new(required("id")?)),
        "add" | "new" => ReplCommand::Add,
        "edit" => ReplCommand::Edit(EmployeeId::new(required("id")?)),
        "delete" | "rm" => ReplCommand::Delete(EmployeeId::new(required("id")?)),
        other => return Err(format!("unknown command '{other}'; try `help`")),
    };
    Ok(command)
}

/// Line-oriented prompts on stdin.
pub struct Prompter {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompter {
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// `None` on end of input.
    pub async fn ask(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        print!("{prompt}");
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }

    pub async fn confirm(&mut self, prompt: &str) -> anyhow::Result<bool> {
        let answer = self.ask(&format!("{prompt} [y/N] ")).await?;
        Ok(answer.is_some_and(|a| matches!(a.trim().to_ascii_lowercase().as_str(), "y" | "yes")))
    }
}

pub async fn run(app: &mut App, prompter: &mut Prompter) -> anyhow::Result<()> {
    println!("Employee Directory shell. Type `help` for commands.");
    let start = if app.client().session().is_authenticated().await {
        "/"
    } else {
        "/login"
    };
    report(app.open(start).await, prompter).await?;

    loop {
        let prompt = format!("{}> ", app.current_route().path());
        let Some(line) = prompter.ask(&prompt).await? else {
            break;
        };
        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        debug!(?command, "repl command");
        if command == ReplCommand::Quit {
            break;
        }
        let outcome = execute(app, prompter, command).await?;
        report(outcome, prompter).await?;
    }
    Ok(())
}

async fn execute(
    app: &mut App,
    prompter: &mut Prompter,
    command: ReplCommand,
) -> anyhow::Result<Result<(), UiError>> {
    let outcome = match command {
        ReplCommand::Empty | ReplCommand::Quit => Ok(()),
        ReplCommand::Help => {
            println!("{HELP}");
            Ok(())
        }
        ReplCommand::Open(path) => app.open(&path).await,
        ReplCommand::Login { username, password } => {
            let username = match username {
                Some(u) => u,
                None => prompter.ask("Username: ").await?.unwrap_or_default(),
            };
            let password = match password {
                Some(p) => p,
                None => prompter.ask("Password: ").await?.unwrap_or_default(),
            };
            app.login(username.trim(), password.trim()).await
        }
        ReplCommand::Logout => app.logout().await,
        ReplCommand::Whoami => app.whoami(true).await,
        ReplCommand::Menu { full } => {
            app.print_menu(full);
            Ok(())
        }
        ReplCommand::View(mode) => {
            app.set_view_mode(mode);
            if app.current_route().shows_directory() {
                let view = app.client().list().view().await;
                app.show_directory(view).await
            } else {
                Ok(())
            }
        }
        ReplCommand::Show(id) => app.show_employee(&id).await,
        ReplCommand::Add => {
            let mut form = EmployeeForm::create();
            if fill_form(prompter, &mut form).await? {
                app.save(&form).await
            } else {
                Ok(())
            }
        }
        ReplCommand::Edit(id) => match app.edit_form(&id).await {
            Ok(mut form) => {
                if fill_form(prompter, &mut form).await? {
                    app.save(&form).await
                } else {
                    Ok(())
                }
            }
            Err(err) => Err(err),
        },
        ReplCommand::Delete(id) => {
            if prompter
                .confirm("Are you sure you want to delete this employee?")
                .await?
            {
                app.delete(&id).await
            } else {
                println!("Cancelled.");
                Ok(())
            }
        }
        listing => {
            if !app.current_route().shows_directory() && !app.enter_directory(None).await {
                return Ok(Ok(()));
            }
            let list = app.client().list().clone();
            let view = match listing {
                ReplCommand::Next => list.next_page().await,
                ReplCommand::Prev => list.previous_page().await,
                ReplCommand::Page(page) => list.set_page(page).await,
                ReplCommand::Sort(key) => list.set_sort_by(key).await,
                ReplCommand::Order(order) => list.set_sort_order(order).await,
                ReplCommand::Search(text) => list.submit_search(&text).await,
                ReplCommand::Clear => list.clear_search().await,
                _ => list.refresh().await,
            };
            app.show_directory(view).await
        }
    };
    Ok(outcome)
}

/// Prints a failure. Mutation failures block until acknowledged.
async fn report(outcome: Result<(), UiError>, prompter: &mut Prompter) -> anyhow::Result<()> {
    let Err(err) = outcome else {
        return Ok(());
    };
    if err.context() == UiErrorContext::Login {
        // the login screen already shows the banner
        return Ok(());
    }
    println!("{err}");
    if matches!(
        err.context(),
        UiErrorContext::SaveEmployee | UiErrorContext::DeleteEmployee
    ) {
        prompter.ask("Press Enter to continue...").await?;
    }
    Ok(())
}

/// Walks through the form fields. Empty answers keep the current value. Returns false
/// when the user cancels or input ends.
async fn fill_form(prompter: &mut Prompter, form: &mut EmployeeForm) -> anyhow::Result<bool> {
    loop {
        print!("{}", form_summary(form));
        let draft = form.draft().clone();

        let Some(name) = field(prompter, "Full Name", &draft.name).await? else {
            return Ok(false);
        };
        form.set_name(name);

        let Some(age) = field(prompter, "Age", &draft.age.to_string()).await? else {
            return Ok(false);
        };
        match age.trim().parse() {
            Ok(age) => form.set_age(age),
            Err(_) => println!("  age must be a whole number; keeping {}", draft.age),
        }

        let classes = EmployeeClass::ALL.map(EmployeeClass::label).join("/");
        let Some(class) =
            field(prompter, &format!("Class/Level ({classes})"), draft.class.label()).await?
        else {
            return Ok(false);
        };
        match class.parse::<EmployeeClass>() {
            Ok(class) => form.set_class(class),
            Err(err) => println!("  {err}; keeping {}", draft.class),
        }

        let Some(attendance) =
            field(prompter, "Attendance %", &draft.attendance.to_string()).await?
        else {
            return Ok(false);
        };
        match attendance.trim().parse() {
            Ok(attendance) => form.set_attendance(attendance),
            Err(_) => println!("  attendance must be a number; keeping {}", draft.attendance),
        }

        loop {
            let current = form.draft().subjects.join(", ");
            let Some(answer) = prompter
                .ask(&format!(
                    "  Subjects [{current}] (+name adds, -name removes, empty continues): "
                ))
                .await?
            else {
                return Ok(false);
            };
            let answer = answer.trim();
            if answer == "." {
                return Ok(false);
            }
            if let Some(subject) = answer.strip_prefix('-') {
                form.remove_subject(subject.trim());
            } else if let Some(subject) = answer.strip_prefix('+') {
                form.add_subject(subject);
            } else if answer.is_empty() {
                break;
            } else {
                form.add_subject(answer);
            }
        }

        match form.validate() {
            Ok(()) => return Ok(true),
            Err(err) => println!("  {err}; please correct the form"),
        }
    }
}

/// The current draft followed by the prompt conventions.
fn form_summary(form: &EmployeeForm) -> String {
    format!("{}(empty keeps the value, `.` cancels)\n", render_form(form))
}

/// One field prompt. `None` means cancel.
async fn field(
    prompter: &mut Prompter,
    label: &str,
    current: &str,
) -> anyhow::Result<Option<String>> {
    let Some(answer) = prompter.ask(&format!("  {label} [{current}]: ")).await? else {
        return Ok(None);
    };
    let answer = answer.trim();
    Ok(match answer {
        "." => None,
        "" => Some(current.to_string()),
        _ => Some(answer.to_string()),
    })
}

#[cfg(test)]
#[path = "tests/repl_tests.rs"]
mod tests;
