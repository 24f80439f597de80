//! Terminal front end for the to-do page.
//!
//! Starts on the sign-in route, then renders the page after every command.
//! Logs go to stderr so they do not interleave with the rendered page.

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tidy::cli::{Command, HELP};
use tidy::page::Key;
use tidy::{
    Config, History, HttpTodoService, InMemoryTodoService, PageError, Route, SignInPage,
    TodoPage, TodoService,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Reducer-driven to-do list synchronized with a remote task service.
#[derive(Parser, Debug)]
#[command(name = "tidy", version, about)]
struct Cli {
    /// Base URL of the task service (overrides `TIDY_API_URL`)
    #[arg(long)]
    api_url: Option<String>,

    /// Username to pre-fill (overrides `TIDY_USERNAME`)
    #[arg(short, long)]
    username: Option<String>,

    /// Use an in-memory service instead of the HTTP API
    #[arg(long)]
    in_memory: bool,
}

type Input = Lines<BufReader<Stdin>>;

fn init_tracing(config: &Config) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn prompt(input: &mut Input, label: &str) -> anyhow::Result<Option<String>> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(label.as_bytes()).await?;
    stdout.flush().await?;
    Ok(input.next_line().await?)
}

/// Run the sign-in form until it succeeds. `false` means stdin closed.
async fn sign_in(
    config: &Config,
    service: Arc<dyn TodoService>,
    history: &History,
    input: &mut Input,
) -> anyhow::Result<bool> {
    let mut form = SignInPage::new(service, Arc::new(history.clone()));

    while history.current() == Some(Route::SignIn) {
        let default_user = config.credentials.username.as_deref().unwrap_or_default();
        let Some(username) = prompt(input, &format!("username [{default_user}]: ")).await? else {
            return Ok(false);
        };
        form.username = if username.trim().is_empty() {
            default_user.to_string()
        } else {
            username
        };

        form.password = match &config.credentials.password {
            Some(password) => password.clone(),
            None => match prompt(input, "password: ").await? {
                Some(password) => password,
                None => return Ok(false),
            },
        };

        if form.submit().await.is_err() {
            println!("! {}", form.error().unwrap_or("sign-in failed"));
        }
    }
    Ok(true)
}

fn missing_row(row: usize) -> Result<(), PageError> {
    println!("no row {row}");
    Ok(())
}

/// Run the page until the user quits or the session ends. `false` means quit.
async fn todo_page(
    config: &Config,
    service: Arc<dyn TodoService>,
    history: &History,
    input: &mut Input,
) -> anyhow::Result<bool> {
    let mut page = TodoPage::new(service, Arc::new(history.clone()))
        .with_request_timeout(config.page_timeout());
    if let Err(error) = page.mount().await {
        println!("! {error}");
    }

    while history.current() == Some(Route::Todos) {
        println!("\n{}", page.render().await);

        let Some(line) = prompt(input, "tidy> ").await? else {
            return Ok(false);
        };
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(tidy::cli::CommandError::Empty) => continue,
            Err(error) => {
                println!("{error}");
                continue;
            },
        };

        let visible = page.visible_todos().await;
        let row_id = |row: usize| visible.get(row - 1).map(|todo| todo.id.clone());

        let result = match command {
            Command::Add(text) => {
                page.set_input(text);
                page.on_create_key(Key::Enter).await
            },
            Command::ToggleAll(checked) => page.on_toggle_all(checked).await,
            Command::Toggle { row, checked } => match row_id(row) {
                Some(id) => page.on_toggle_todo(id, checked).await,
                None => missing_row(row),
            },
            Command::Edit { row, content } => match row_id(row) {
                Some(id) => page.on_edit_todo(id, content).await,
                None => missing_row(row),
            },
            Command::Remove(row) => match row_id(row) {
                Some(id) => page.on_delete_todo(id).await,
                None => missing_row(row),
            },
            Command::Clear => page.on_clear_all().await,
            Command::Show(filter) => {
                page.show(filter);
                Ok(())
            },
            Command::Dismiss => page.dismiss_error().await,
            Command::Help => {
                println!("{HELP}");
                Ok(())
            },
            Command::Quit => return Ok(false),
        };
        if let Err(error) = result {
            tracing::warn!(%error, "Page operation failed");
            println!("! {error}");
        }
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(url) = cli.api_url {
        config.api.url = url;
    }
    if let Some(username) = cli.username {
        config.credentials.username = Some(username);
    }

    init_tracing(&config);

    let service: Arc<dyn TodoService> = if cli.in_memory {
        tracing::info!("Using in-memory task service");
        let mut memory = InMemoryTodoService::new();
        if let (Some(username), Some(password)) =
            (&config.credentials.username, &config.credentials.password)
        {
            memory = memory.with_credentials(username.clone(), password.clone());
        }
        Arc::new(memory)
    } else {
        tracing::info!(url = %config.api.url, "Using HTTP task service");
        Arc::new(
            HttpTodoService::new(config.api.url.clone(), config.request_timeout())
                .context("failed to build HTTP client")?,
        )
    };

    let history = History::starting_at(Route::SignIn);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let keep_going = match history.current() {
            Some(Route::Todos) => {
                todo_page(&config, Arc::clone(&service), &history, &mut input).await?
            },
            _ => sign_in(&config, Arc::clone(&service), &history, &mut input).await?,
        };
        if !keep_going {
            break;
        }
    }

    tracing::info!("Bye");
    Ok(())
}
