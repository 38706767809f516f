use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rulwatch::report::FleetReport;
use rulwatch::{
    events, ui, App, ChannelSource, DataSource, FileSource, FleetData, InferenceSource, Settings,
    UnitId, View,
};

/// How often export mode re-polls a source that is still loading.
const EXPORT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "rulwatch")]
#[command(about = "Terminal dashboard for predicted Remaining Useful Life of engine units")]
struct Args {
    /// Predictions CSV (unit_number, time_in_cycles, predicted_RUL); `-` reads stdin
    #[arg(short, long, conflicts_with_all = ["validation", "model"])]
    file: Option<PathBuf>,

    /// Validation feature table to run the model over
    #[arg(long, requires = "model")]
    validation: Option<PathBuf>,

    /// Fitted linear pipeline (JSON) used for inference and explanations
    #[arg(long, requires = "validation")]
    model: Option<PathBuf>,

    /// Settings file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Warning threshold: RUL below this is a warning
    #[arg(long)]
    warning: Option<f64>,

    /// Critical threshold: RUL below this is critical
    #[arg(long)]
    critical: Option<f64>,

    /// Unit selected at startup
    #[arg(short, long)]
    unit: Option<String>,

    /// Refresh interval in seconds
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Export the fleet assessment to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref(), args.export.is_some())?;

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(ref file) = args.file {
        settings.data_path = file.clone();
    }
    if let Some(warning) = args.warning {
        settings.thresholds.warning = warning;
    }
    if let Some(critical) = args.critical {
        settings.thresholds.critical = critical;
    }
    if let Some(refresh) = args.refresh {
        settings.refresh_secs = refresh;
    }
    let thresholds = settings.validated_thresholds()?;

    let source: Box<dyn DataSource> = match (args.validation, args.model) {
        (Some(validation), Some(model)) => Box::new(InferenceSource::new(
            validation,
            model,
            settings.columns.clone(),
        )),
        _ if settings.data_path == Path::new("-") => Box::new(ChannelSource::spawn_reader(
            io::stdin(),
            settings.columns.clone(),
            "stdin",
        )),
        _ => Box::new(FileSource::new(&settings.data_path, settings.columns.clone())),
    };
    info!(source = source.description(), ?thresholds, "starting");

    if let Some(export_path) = args.export {
        return export_to_file(source, &export_path, &settings);
    }

    let refresh = Duration::from_secs(settings.refresh_secs.max(1));
    run_tui(source, &settings, args.unit.map(UnitId::new), refresh)
}

/// Route tracing output away from the terminal the TUI draws on.
fn init_logging(log_file: Option<&Path>, export: bool) -> Result<()> {
    let filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rulwatch=info"));

    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(filter())
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .init();
    } else if export {
        tracing_subscriber::registry()
            .with(filter())
            .with(fmt::layer().with_writer(io::stderr))
            .init();
    }
    Ok(())
}

/// Run the TUI with the given data source
fn run_tui(
    source: Box<dyn DataSource>,
    settings: &Settings,
    unit: Option<UnitId>,
    refresh_interval: Duration,
) -> Result<()> {
    // Create app before touching the terminal so setup errors print normally
    let mut app = App::new(source, settings.thresholds)?;
    if let Some(unit) = unit {
        app.select_unit(unit);
    }
    app.reload_data();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, &mut app, refresh_interval);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 16;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let top = (area.height / 2).saturating_sub(2);
                let centered =
                    ratatui::layout::Rect::new(0, top, area.width, 5u16.min(area.height - top));
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(10),   // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Fleet => ui::fleet::render(frame, app, chunks[2]),
                View::Trend => ui::trend::render(frame, app, chunks[2]),
                View::Explain => ui::explain::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                // Header (1) + tabs (1) + table border (1); the table header is row 3
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse, 3),
                _ => {}
            }
        }

        if last_refresh.elapsed() >= refresh_interval {
            app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}

/// Load once, assess every unit and write the report.
fn export_to_file(
    mut source: Box<dyn DataSource>,
    export_path: &Path,
    settings: &Settings,
) -> Result<()> {
    let thresholds = settings.validated_thresholds()?;
    // File and inference sources settle on the first poll; a stdin stream
    // settles once the producer closes it.
    let dataset = loop {
        if let Some(dataset) = source.poll() {
            break dataset;
        }
        if let Some(e) = source.error() {
            anyhow::bail!("{}: {}", source.description(), e);
        }
        std::thread::sleep(EXPORT_POLL_INTERVAL);
    };

    let fleet = FleetData::from_dataset(dataset, &thresholds);
    if fleet.units.is_empty() {
        warn!("dataset has no units");
    }
    FleetReport::from_fleet(&fleet).write(export_path)?;

    info!(path = %export_path.display(), units = fleet.units.len(), "exported");
    println!("Exported fleet assessment to: {}", export_path.display());
    Ok(())
}
