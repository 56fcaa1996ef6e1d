//! dirview - a virtualized directory explorer for the terminal

use std::io::{self, stdout};
use std::panic;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tracing::{error, info};

use dirview::config::{config_dir, Config};
use dirview::errors::{AppError, AppResult};
use dirview::query::LocalQueryClient;
use dirview::state::app::App;
use dirview::ui::{FileListWidget, ListLayout, StatusBar};
use dirview::{input, logging};

#[derive(Debug, Parser)]
#[command(name = "dirview")]
#[command(about = "Browse a directory tree in a virtualized list", long_about = None)]
struct Cli {
    /// Directory to browse (defaults to general.start_path, then the working directory)
    path: Option<PathBuf>,
    /// Maximum entries fetched per directory
    #[arg(long)]
    limit: Option<usize>,
    /// Location id used for thumbnail lookup
    #[arg(long)]
    location_id: Option<i64>,
    /// Read configuration from this file instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    loop {
        app.poll_responses();

        terminal.draw(|frame| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(1)])
                .split(frame.area());

            let show_header = app.config.display.show_header;
            app.list_layout = ListLayout::compute(chunks[0], show_header);
            let list = FileListWidget::new(&app.theme).show_header(show_header);
            frame.render_stateful_widget(list, chunks[0], &mut app.explorer);

            let status = StatusBar::new(&app.explorer, app.current_path(), &app.theme);
            frame.render_widget(status, chunks[1]);
        })?;

        // Shorter poll while a listing is pending so it shows up promptly
        let poll_timeout = if app.explorer.is_loading() {
            Duration::from_millis(20)
        } else {
            Duration::from_millis(100)
        };

        if event::poll(poll_timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key(app, key),
                Event::Mouse(mouse) => input::handle_mouse(app, mouse, Instant::now()),
                // The next draw re-measures the list
                Event::Resize(..) => {}
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> AppResult<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    if let Some(limit) = cli.limit {
        config.general.limit = limit;
    }
    if let Some(location_id) = cli.location_id {
        config.general.location_id = location_id;
    }
    Ok(config)
}

fn browse_root(cli: &Cli, config: &Config) -> AppResult<PathBuf> {
    let root = match (&cli.path, &config.general.start_path) {
        (Some(path), _) => path.clone(),
        (None, Some(path)) => PathBuf::from(path),
        (None, None) => std::env::current_dir()?,
    };
    let root = root.canonicalize()?;
    if !root.is_dir() {
        return Err(AppError::Config(format!("{} is not a directory", root.display())));
    }
    Ok(root)
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let root = browse_root(&cli, &config)?;

    let config_dir = config_dir();
    let _log_guard = match &config_dir {
        Some(dir) => match logging::init_logger(dir, &config.general.log_level) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("Warning: Could not open log file: {}", e);
                None
            }
        },
        None => None,
    };
    info!(root = %root.display(), limit = config.limit(), "starting");

    setup_panic_hook();
    let mut terminal = setup_terminal()?;

    let client = LocalQueryClient::new(root, config_dir);
    let mut app = App::new(config, Box::new(client), "/");
    let result = run(&mut terminal, &mut app);

    restore_terminal()?;
    if let Err(e) = &result {
        error!(error = %e, "terminal loop failed");
    }
    info!("exiting");
    result.map_err(AppError::from)
}
