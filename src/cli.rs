use crate::config::{Config, LayoutEngine, load_config};
use crate::layout::LayoutDump;
use crate::logging;
use crate::render::write_output_svg;
#[cfg(feature = "png")]
use crate::render::write_output_png;
use crate::schema;
use crate::session::Designer;
use crate::store::{FileStore, get_data, put_data};
use crate::view::{SummaryTab, summary};
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "flowd",
    version,
    about = "Page-flow designer: layout, render and persist form definitions"
)]
pub struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config JSON/JSON5 file (theme, layout, minimap, sync flags)
    #[arg(short = 'c', long = "configFile", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the flow diagram with its minimap
    Render(RenderArgs),
    /// Print computed node boxes and edge routes as JSON
    Layout(LayoutArgs),
    /// Check a document against the schema
    Validate { document: PathBuf },
    /// Print one tab of the summary view
    Summary {
        document: PathBuf,
        #[arg(short = 't', long = "tab", value_enum, default_value = "model")]
        tab: TabArg,
    },
    /// Write the stored document as formatted JSON
    Download {
        document: PathBuf,
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Replace the stored document with an uploaded file ('-' for stdin)
    Upload { document: PathBuf, input: PathBuf },
}

#[derive(ClapArgs, Debug)]
pub struct RenderArgs {
    pub document: PathBuf,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    #[arg(long = "engine", value_enum)]
    pub engine: Option<EngineArg>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    #[arg(long = "no-minimap")]
    pub no_minimap: bool,
}

#[derive(ClapArgs, Debug)]
pub struct LayoutArgs {
    pub document: PathBuf,

    #[arg(long = "engine", value_enum)]
    pub engine: Option<EngineArg>,

    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum EngineArg {
    Dagre,
    Layered,
}

impl From<EngineArg> for LayoutEngine {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Dagre => LayoutEngine::Dagre,
            EngineArg::Layered => LayoutEngine::Layered,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum TabArg {
    Model,
    Json,
    Paths,
}

impl From<TabArg> for SummaryTab {
    fn from(arg: TabArg) -> Self {
        match arg {
            TabArg::Model => SummaryTab::Model,
            TabArg::Json => SummaryTab::Json,
            TabArg::Paths => SummaryTab::Paths,
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Render(render) => run_render(render, config),
        Command::Layout(layout) => run_layout(layout, config),
        Command::Validate { document } => run_validate(&document),
        Command::Summary { document, tab } => {
            let designer = open_designer(&document, config)?;
            let snapshot = designer
                .current()
                .ok_or_else(|| anyhow::anyhow!("no document loaded"))?;
            print!("{}", summary(&snapshot.doc, tab.into()));
            Ok(())
        }
        Command::Download { document, output } => {
            let store = FileStore::open(&document)?;
            let response = get_data(&store, true);
            if !response.is_success() {
                anyhow::bail!("download failed ({}): {}", response.status, response.body);
            }
            write_text(&response.body, output.as_deref())
        }
        Command::Upload { document, input } => {
            let store = FileStore::open(&document)?;
            let body = read_input(&input)?;
            let response = put_data(&store, &body);
            if !response.is_success() {
                anyhow::bail!("upload rejected ({}): {}", response.status, response.body);
            }
            tracing::info!(path = %store.path().display(), "document replaced");
            Ok(())
        }
    }
}

fn run_render(args: RenderArgs, mut config: Config) -> Result<()> {
    if let Some(engine) = args.engine {
        config.layout.engine = engine.into();
    }
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    if args.no_minimap {
        config.render.show_minimap = false;
    }

    let designer = open_designer(&args.document, config)?;
    let svg = designer
        .render()
        .ok_or_else(|| anyhow::anyhow!("document has not been laid out"))?;
    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref()),
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, designer.config())
        }
    }
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    write_output_png(svg, output, &config.render, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn run_layout(args: LayoutArgs, mut config: Config) -> Result<()> {
    if let Some(engine) = args.engine {
        config.layout.engine = engine.into();
    }
    let designer = open_designer(&args.document, config)?;
    let layout = designer
        .layout()
        .ok_or_else(|| anyhow::anyhow!("document has not been laid out"))?;
    let dump = LayoutDump::new(layout, &designer.config().layout);
    let json = serde_json::to_string_pretty(&dump)?;
    write_text(&json, args.output.as_deref())
}

fn run_validate(path: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&contents)?;
    match schema::validate(raw) {
        Ok(doc) => {
            println!("ok: {} page(s)", doc.pages.len());
            Ok(())
        }
        Err(err) => {
            for issue in err.issues() {
                eprintln!("{issue}");
            }
            Err(anyhow::anyhow!("{} is not a valid document", path.display()))
        }
    }
}

fn open_designer(document: &Path, config: Config) -> Result<Designer<FileStore>> {
    let store = FileStore::open(document)
        .with_context(|| format!("opening {}", document.display()))?;
    Ok(Designer::open(store, config)?)
}

fn write_text(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{text}"),
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read_to_string(path)?)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
