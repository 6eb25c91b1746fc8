use clap::{Parser, Subcommand};
use photo_batch::config::{self, StudioConfig};
use photo_batch::session::{Export, RenderRequest, Session};
use photo_batch::transport::HttpTransport;
use photo_batch::types::{BatchState, Source};
use photo_batch::{grid, output};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// File in the temp directory holding the last rendered batch.
const BATCH_FILENAME: &str = "batch.json";

/// Flags that shape a render. Unset flags fall back to config.toml.
#[derive(clap::Args, Clone, Default)]
struct RenderArgs {
    /// Image source: placeholder or search
    #[arg(long)]
    source: Option<Source>,

    /// Search query (search source only)
    #[arg(long)]
    query: Option<String>,

    /// API access key (search source only)
    #[arg(long)]
    key: Option<String>,

    /// Number of images, clamped to 1-60
    #[arg(long)]
    count: Option<u32>,

    /// Full-resolution square edge in pixels (0 = default)
    #[arg(long)]
    size: Option<u32>,
}

impl RenderArgs {
    fn request(&self, config: &StudioConfig) -> RenderRequest {
        let mut request = RenderRequest::from_config(config);
        if let Some(source) = self.source {
            request.source = source;
        }
        if let Some(query) = &self.query {
            request.query = query.clone();
        }
        if let Some(key) = &self.key {
            request.api_key = key.clone();
        }
        if let Some(count) = self.count {
            request.count = count;
        }
        if self.size.is_some() {
            request.size = self.size;
        }
        request
    }
}

#[derive(clap::Args, Clone, Default)]
struct CollageArgs {
    /// Collage cell edge in pixels (0 = default)
    #[arg(long)]
    cell: Option<u32>,
}

#[derive(Parser)]
#[command(name = "photo-batch")]
#[command(about = "Fetch a batch of photos, then export a zip or a collage")]
#[command(long_about = "\
Fetch a batch of photos, then export a zip or a collage

Sources:
  placeholder   Seeded random images. No key needed.
  search        Photo search API. Needs --query and --key (or config.toml).

Typical session:

  photo-batch render --count 9 --size 1200     # writes dist/preview.html
  photo-batch zip                              # dist/photos_9_1200.zip
  photo-batch collage --cell 300               # dist/collage_9_300.png

'render' remembers the batch in the temp directory; 'zip' and 'collage'
export whatever was rendered last. 'run' does all three in one go.

Run 'photo-batch gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Output directory for preview.html and exports
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for the remembered batch
    #[arg(long, default_value = ".photo-batch-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a new batch and write the HTML preview
    Render(RenderArgs),
    /// Download the last batch at full size into a zip
    Zip,
    /// Compose the last batch's previews into one PNG
    Collage(CollageArgs),
    /// Render, then export both the zip and the collage
    Run {
        #[command(flatten)]
        render: RenderArgs,
        #[command(flatten)]
        collage: CollageArgs,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.config_dir)?;
    let transport = HttpTransport::new(config.network.timeout(), &config.network.user_agent)?;
    let batch = load_batch(&cli.temp_dir)?;

    match &cli.command {
        Command::Render(args) => {
            render(&cli, &transport, &config, batch, args)?;
        }
        Command::Zip => {
            let (result, _) = with_session(&transport, &config, batch, |s| s.export_archive());
            save_export(&cli.output, &result?)?;
        }
        Command::Collage(args) => {
            let (result, _) =
                with_session(&transport, &config, batch, |s| s.export_collage(args.cell));
            save_export(&cli.output, &result?)?;
        }
        Command::Run { render: args, collage } => {
            println!("==> Rendering");
            let batch = render(&cli, &transport, &config, batch, args)?;

            println!("==> Packing zip");
            let (result, batch) =
                with_session(&transport, &config, batch, |s| s.export_archive());
            save_export(&cli.output, &result?)?;

            println!("==> Composing collage");
            let (result, _) =
                with_session(&transport, &config, batch, |s| s.export_collage(collage.cell));
            save_export(&cli.output, &result?)?;
        }
        Command::GenConfig => unreachable!("handled above"),
    }

    Ok(())
}

/// Run one command against a session whose notices are printed as they
/// arrive. The printer is joined before returning so later output stays in
/// order.
fn with_session<R>(
    transport: &HttpTransport,
    config: &StudioConfig,
    batch: BatchState,
    command: impl FnOnce(&Session<&HttpTransport>) -> R,
) -> (R, BatchState) {
    let (tx, rx) = mpsc::channel();
    let printer = std::thread::spawn(move || {
        for notice in rx {
            output::print_notice(&notice);
        }
    });

    let session = Session::new(transport, config.clone())
        .with_batch(batch)
        .with_notices(tx);
    let result = command(&session);
    let batch = BatchState::clone(&session.batch());
    drop(session);
    printer.join().ok();

    (result, batch)
}

/// Render, remember the batch (even when the fetch failed and left it
/// empty), and write the HTML preview.
fn render(
    cli: &Cli,
    transport: &HttpTransport,
    config: &StudioConfig,
    batch: BatchState,
    args: &RenderArgs,
) -> Result<BatchState, Box<dyn std::error::Error>> {
    let request = args.request(config);
    let (result, batch) = with_session(transport, config, batch, |s| s.render(&request));
    save_batch(&cli.temp_dir, &batch)?;
    result?;

    output::print_tiles(&grid::tiles(&batch));
    std::fs::create_dir_all(&cli.output)?;
    let preview_path = cli.output.join(grid::PREVIEW_FILENAME);
    let html = grid::render_page(&batch);
    std::fs::write(&preview_path, &html)?;
    println!("{}", output::format_saved(&preview_path, html.len()));

    Ok(batch)
}

fn load_batch(temp_dir: &Path) -> Result<BatchState, Box<dyn std::error::Error>> {
    let path = temp_dir.join(BATCH_FILENAME);
    if !path.exists() {
        return Ok(BatchState::default());
    }
    let content = std::fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write via a temp file so a reader never sees a half-written batch.
fn save_batch(temp_dir: &Path, batch: &BatchState) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(temp_dir)?;
    let path = temp_dir.join(BATCH_FILENAME);
    let partial = temp_dir.join(format!("{BATCH_FILENAME}.partial"));
    std::fs::write(&partial, serde_json::to_string_pretty(batch)?)?;
    std::fs::rename(&partial, &path)?;
    Ok(())
}

fn save_export(output_dir: &Path, export: &Export) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(&export.filename);
    std::fs::write(&path, &export.bytes)?;
    println!("{}", output::format_saved(&path, export.bytes.len()));
    Ok(())
}
