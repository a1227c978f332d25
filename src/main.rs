//! Stocklens - stock insight and portfolio analysis client.

mod api;
mod app;
mod cli;
mod config;
mod error;
mod flow;
mod holdings;
mod models;
mod render;
mod ui;

use anyhow::{Context, Result};
use api::AnalysisClient;
use app::App;
use cli::{Args, Command, OutputArgs};
use config::Config;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use flow::{Flow, FlowKind, Submission};
use holdings::HoldingsList;
use models::StockQueryRequest;
use ratatui::{Terminal, backend::CrosstermBackend};
use render::Document;
use std::fs::{self, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse command line arguments
    let args = Args::parse_args();

    let interactive = matches!(args.command, Command::Portfolio { interactive: true, .. });
    init_logging(args.verbose, interactive);

    // Load configuration
    let mut config = if let Some(ref path) = args.config {
        Config::load(path)?
    } else {
        Config::load_or_default()
    };
    if let Some(url) = args.url {
        config.server.base_url = url;
    }
    if let Some(timeout) = args.timeout {
        config.server.timeout = timeout;
    }

    match args.command {
        Command::Query { query, output } => {
            let request = match StockQueryRequest::new(query) {
                Ok(request) => request,
                Err(e) => return Ok(validation_failure(e)),
            };
            let client = AnalysisClient::new(&config.server)?;
            run_flow(&client, Submission::Query(request), &output).await
        }
        Command::Portfolio {
            holdings,
            risk,
            interactive,
            output,
        } => {
            let risk = risk.unwrap_or(config.portfolio.risk);
            let holdings = match collect_holdings(&holdings, &config) {
                Ok(holdings) => holdings,
                Err(e) => return Ok(validation_failure(e)),
            };
            let client = AnalysisClient::new(&config.server)?;

            if interactive {
                let mut app = App::new(client, holdings, risk, config.output.directory);
                run_interactive(&mut app).await?;
                return Ok(ExitCode::SUCCESS);
            }

            let request = match holdings.to_request(risk) {
                Ok(request) => request,
                Err(e) => return Ok(validation_failure(e)),
            };
            run_flow(&client, Submission::Portfolio(request), &output).await
        }
        Command::History { clear, output } => {
            let client = AnalysisClient::new(&config.server)?;
            run_history(&client, clear, &output).await
        }
        Command::Config { write } => {
            if write {
                let path = Config::default_config_path()
                    .context("Could not determine the config directory")?;
                config::write_sample(&path)?;
                println!("Wrote sample config to {}", path.display());
            } else {
                print!("{}", config::sample_config());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Set up `env_logger`. Interactive mode logs to a file so the screen stays clean.
fn init_logging(verbose: bool, interactive: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));

    if interactive {
        let file = Config::config_dir().and_then(|dir| {
            fs::create_dir_all(&dir).ok()?;
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("stocklens.log"))
                .ok()
        });
        match file {
            Some(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            None => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }

    builder.init();
}

/// Collect holdings from the command line, or from config when none were given.
fn collect_holdings(
    args: &[(String, String)],
    config: &Config,
) -> Result<HoldingsList, error::ValidationError> {
    let mut holdings = HoldingsList::new();

    if args.is_empty() {
        for holding in &config.portfolio.holdings {
            holdings.add(&holding.symbol, &holding.quantity.to_string())?;
        }
    } else {
        for (symbol, quantity) in args {
            holdings.add(symbol, quantity)?;
        }
    }

    Ok(holdings)
}

/// Run one flow end to end and write what it rendered.
async fn run_flow(
    client: &AnalysisClient,
    submission: Submission,
    output: &OutputArgs,
) -> Result<ExitCode> {
    let kind = submission.kind();
    let mut flow = Flow::new(kind);
    flow.begin()?;
    show_loading(kind)?;

    let outcome = flow::execute(client, &submission).await;
    let document = flow.complete(outcome);

    write_output(kind, document, output)?;
    Ok(exit_code(document))
}

/// Fetch (or clear) the service's query history.
async fn run_history(
    client: &AnalysisClient,
    clear: bool,
    output: &OutputArgs,
) -> Result<ExitCode> {
    if clear {
        return match client.clear_history().await {
            Ok(ack) => {
                println!("{}", ack.message);
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                Ok(ExitCode::FAILURE)
            }
        };
    }

    let mut flow = Flow::new(FlowKind::History);
    flow.begin()?;
    show_loading(FlowKind::History)?;
    let outcome = match client.history().await {
        Ok(history) => flow::Outcome::Success(render::history::report(&history)),
        Err(e) => flow::Outcome::Failure(e.to_string()),
    };
    let document = flow.complete(outcome);

    write_output(FlowKind::History, document, output)?;
    Ok(exit_code(document))
}

/// Tell a person at the terminal that a request is on its way.
///
/// Skipped when stderr is redirected so scripted runs stay quiet.
fn show_loading(kind: FlowKind) -> io::Result<()> {
    log::info!("{}: loading", kind.title());
    let stderr = io::stderr();
    if stderr.is_terminal() {
        writeln!(stderr.lock(), "{}", kind.loading_message())?;
    }
    Ok(())
}

fn write_output(kind: FlowKind, document: &Document, output: &OutputArgs) -> Result<()> {
    let html = if output.fragment {
        document.to_html()
    } else {
        render::page(kind.title(), document)
    };

    match &output.output {
        Some(path) => {
            fs::write(path, html)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

fn exit_code(document: &Document) -> ExitCode {
    if document.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn validation_failure(error: error::ValidationError) -> ExitCode {
    eprintln!("Error: {}", error);
    ExitCode::FAILURE
}

/// Run the portfolio editor with a TUI.
async fn run_interactive(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Main application loop.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        // Draw UI
        terminal.draw(|f| ui::render(f, app))?;

        // Handle events with timeout
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key_event(app, key.code, key.modifiers);
                }
            }
        }

        // Pick up a finished analysis
        app.poll_outcome();

        if app.should_quit() {
            break;
        }

        // Let the spawned request make progress between frames
        tokio::task::yield_now().await;
    }

    Ok(())
}

/// Handle keyboard input.
fn handle_key_event(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        // Quit
        KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // Form editing
        KeyCode::Tab | KeyCode::BackTab => app.next_field(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Enter => app.add_holding(),
        KeyCode::Char(c) => app.input_char(c),

        // Holdings table
        KeyCode::Up => app.select_up(),
        KeyCode::Down => app.select_down(),
        KeyCode::Delete => app.remove_selected(),

        // Risk selector
        KeyCode::Left => app.prev_risk(),
        KeyCode::Right => app.next_risk(),

        // Submit
        KeyCode::F(5) => app.analyze(),

        _ => {}
    }
}
