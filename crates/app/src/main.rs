use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use waveform_contour_core::{
    AppConfig, ColumnShade, Flag, RawSignal, RedrawFrame, Result, WaveformModel,
};

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { input } => run_info(&input),
        Commands::Render {
            input,
            flags,
            config,
            zoom,
            offset,
            json,
        } => run_render(RenderArgs {
            input: &input,
            flags: flags.as_deref(),
            config: config.as_deref(),
            zoom,
            offset,
            json,
        }),
    }
}

fn load_signal(path: &Path) -> Result<RawSignal> {
    let text = std::fs::read_to_string(path)?;
    RawSignal::from_json(&text)
}

fn run_info(input: &Path) -> Result<()> {
    tracing::info!(?input, "inspecting signal");

    let signal = load_signal(input)?;
    let mut model = WaveformModel::default();
    model.set_sound_file(&signal)?;

    let pyramid = model.pyramid()?;
    println!(
        "{} frames, {} Hz, {} samples per frame",
        signal.num_frames(),
        signal.sample_rate,
        signal.samples_per_frame
    );
    for (index, level) in pyramid.levels().iter().enumerate() {
        println!(
            "level {index}: {:>8} samples, zoom factor {}",
            level.len(),
            level.zoom_factor()
        );
    }
    println!("initial zoom level: {}", model.zoom_level()?);
    Ok(())
}

struct RenderArgs<'a> {
    input: &'a Path,
    flags: Option<&'a Path>,
    config: Option<&'a Path>,
    zoom: Option<usize>,
    offset: usize,
    json: bool,
}

fn run_render(args: RenderArgs<'_>) -> Result<()> {
    tracing::info!(input = ?args.input, zoom = ?args.zoom, offset = args.offset, "rendering contour");

    let config = match args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let signal = load_signal(args.input)?;

    let mut model = WaveformModel::new(config.display);
    model.set_sound_file(&signal)?;
    if let Some(path) = args.flags {
        let text = std::fs::read_to_string(path)?;
        let flags: Vec<Flag> = serde_json::from_str(&text)?;
        model.set_flags(&flags);
    }
    if let Some(zoom) = args.zoom {
        model.set_zoom_level(zoom)?;
    }
    let max_pos = model.max_pos()?;
    model.set_parameters(0, 0, args.offset.min(max_pos))?;

    let frame = model.redraw()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&frame)?);
    } else {
        print!("{}", draw_text(&frame));
    }
    Ok(())
}

/// Text rendition of a frame: a flag row, the mirrored contour, and the
/// edge timecodes.
fn draw_text(frame: &RedrawFrame) -> String {
    let width = frame.width();
    let mut out = String::new();

    let mut flag_row = vec![' '; width + 1];
    for &column in &frame.flag_columns {
        if let Some(cell) = flag_row.get_mut(column) {
            *cell = 'F';
        }
    }
    out.extend(flag_row);
    out.push('\n');

    let budget = frame.heights.iter().copied().max().unwrap_or(0) as i64;
    for row in -budget..=budget {
        for (column, &height) in frame.heights.iter().enumerate() {
            let cell = if frame.playback_column == Some(column) {
                '|'
            } else if row.unsigned_abs() <= u64::from(height) {
                match frame.shades[column] {
                    ColumnShade::Boundary => ':',
                    ColumnShade::Selected => '=',
                    ColumnShade::Unselected => '#',
                }
            } else {
                ' '
            };
            out.push(cell);
        }
        out.push('\n');
    }

    let gap = width.saturating_sub(frame.start_time.len() + frame.end_time.len());
    out.push_str(&frame.start_time);
    out.push_str(&" ".repeat(gap.max(1)));
    out.push_str(&frame.end_time);
    out.push('\n');
    out
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Zoomable amplitude contours for recordings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the level pyramid built for a signal file.
    Info {
        /// JSON file with `sample_rate`, `samples_per_frame` and `gains`.
        input: PathBuf,
    },
    /// Render the visible window of a signal as text or JSON.
    Render {
        /// JSON file with `sample_rate`, `samples_per_frame` and `gains`.
        input: PathBuf,
        /// Optional JSON list of `{"seconds_after_start": N}` flags.
        #[arg(short, long)]
        flags: Option<PathBuf>,
        /// Optional display configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Zoom level to step to before rendering (0-4).
        #[arg(short, long)]
        zoom: Option<usize>,
        /// Horizontal scroll offset in pixels.
        #[arg(short, long, default_value_t = 0)]
        offset: usize,
        /// Emit the frame as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}
