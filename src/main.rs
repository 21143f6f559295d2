// main.rs

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dotenv::dotenv;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::process;

mod api;
mod app;
mod calendar;
mod config;
mod firestore;
mod models;
mod parser;
mod store;
mod swipe;
mod ui;

use api::Api;
use app::App;
use config::Config;
use store::Store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from a .env file if present.
    dotenv().ok();

    // Missing configuration is fatal and must be visible before the
    // alternate screen swallows stderr.
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(1);
        }
    };

    let api = Api::new(&config.firebase);
    let mut store = Store::new(api);

    // Restore the previous session if a refresh token was persisted.
    if let Some(saved) = config::load_saved_session() {
        let restored = store.api().refresh_session(&saved.refresh_token).await;
        match restored {
            Ok(session) => {
                if let Err(err) = store.init_session(Some(session)).await {
                    eprintln!("Warning: could not load data: {}", err);
                }
            }
            Err(_) => config::clear_saved_session(),
        }
    }

    // Setup terminal UI
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let app = App::new(store);
    let res = ui::run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
