use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "vizplay", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single animation step as a PNG.
    Frame(FrameArgs),
    /// Render every step of a document into a directory.
    Steps(StepsArgs),
    /// Build a BST from values and print its traversal order.
    Traverse(TraverseArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input visualization document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Step index (0-based).
    #[arg(long, default_value_t = 0)]
    step: usize,

    /// Uniform zoom factor.
    #[arg(long, default_value_t = 1.0)]
    zoom: f64,

    /// Canvas size in pixels.
    #[arg(long, default_value_t = 1000)]
    width: u32,
    #[arg(long, default_value_t = 800)]
    height: u32,

    /// TTF/OTF font for labels. Without it, labels are omitted.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct StepsArgs {
    /// Input visualization document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Uniform zoom factor.
    #[arg(long, default_value_t = 1.0)]
    zoom: f64,

    /// Canvas size in pixels.
    #[arg(long, default_value_t = 1000)]
    width: u32,
    #[arg(long, default_value_t = 800)]
    height: u32,

    /// TTF/OTF font for labels. Without it, labels are omitted.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Output directory for step_NNN.png files.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct TraverseArgs {
    /// Traversal variant.
    #[arg(long, value_enum, default_value_t = KindChoice::Inorder)]
    kind: KindChoice,

    /// Values to insert, in order.
    #[arg(long, value_delimiter = ',', conflicts_with = "preset")]
    values: Vec<i64>,

    /// Use a built-in tree instead of --values.
    #[arg(long, value_enum)]
    preset: Option<PresetChoice>,

    /// Seed for the random preset.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindChoice {
    Inorder,
    Preorder,
    Postorder,
    Levelorder,
}

impl From<KindChoice> for vizplay::TraversalKind {
    fn from(k: KindChoice) -> Self {
        match k {
            KindChoice::Inorder => Self::Inorder,
            KindChoice::Preorder => Self::Preorder,
            KindChoice::Postorder => Self::Postorder,
            KindChoice::Levelorder => Self::LevelOrder,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PresetChoice {
    Balanced,
    Lecture,
    Random,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Steps(args) => cmd_steps(args),
        Command::Traverse(args) => cmd_traverse(args),
    }
}

fn read_document(path: &Path) -> anyhow::Result<vizplay::VisualizationData> {
    let f = File::open(path).with_context(|| format!("open document '{}'", path.display()))?;
    let r = BufReader::new(f);
    let doc: vizplay::VisualizationData =
        serde_json::from_reader(r).with_context(|| "parse visualization JSON")?;
    doc.validate()?;
    Ok(doc)
}

fn make_renderer(font: Option<&Path>) -> anyhow::Result<vizplay::CpuRenderer> {
    let settings = vizplay::RenderSettings {
        clear_rgba: Some([15, 23, 42, 255]),
    };
    match font {
        Some(path) => {
            let bytes =
                std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
            Ok(vizplay::CpuRenderer::with_font(settings, bytes)?)
        }
        None => Ok(vizplay::CpuRenderer::new(settings)),
    }
}

fn write_png(frame: &vizplay::FrameRgba, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))?;
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let doc = read_document(&args.in_path)?;
    anyhow::ensure!(
        args.step < doc.step_count(),
        "step {} out of range (document has {} steps)",
        args.step,
        doc.step_count()
    );

    let mut renderer = make_renderer(args.font.as_deref())?;
    let canvas = vizplay::Canvas {
        width: args.width,
        height: args.height,
    };
    let frame = renderer.render_document(&doc, args.step, args.zoom, canvas)?;
    write_png(&frame, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_steps(args: StepsArgs) -> anyhow::Result<()> {
    let doc = read_document(&args.in_path)?;
    let mut renderer = make_renderer(args.font.as_deref())?;
    let canvas = vizplay::Canvas {
        width: args.width,
        height: args.height,
    };

    for step in 0..doc.step_count() {
        let frame = renderer.render_document(&doc, step, args.zoom, canvas)?;
        let out = args.out_dir.join(format!("step_{step:03}.png"));
        write_png(&frame, &out)?;
        if let Some(desc) = doc.steps.get(step).map(|s| s.description.as_str()) {
            eprintln!("wrote {} ({desc})", out.display());
        } else {
            eprintln!("wrote {}", out.display());
        }
    }
    Ok(())
}

fn cmd_traverse(args: TraverseArgs) -> anyhow::Result<()> {
    let mut tree = vizplay::TreeWorkspace::new();
    match args.preset {
        Some(PresetChoice::Balanced) => tree.load(vizplay::TreePreset::Balanced),
        Some(PresetChoice::Lecture) => tree.load(vizplay::TreePreset::Lecture),
        Some(PresetChoice::Random) => tree.load(vizplay::TreePreset::Random { seed: args.seed }),
        None => {
            anyhow::ensure!(!args.values.is_empty(), "provide --values or --preset");
            for v in &args.values {
                tree.insert(*v);
            }
        }
    }

    let kind: vizplay::TraversalKind = args.kind.into();
    let order = vizplay::traversal_order(&tree, kind);
    let rendered: Vec<String> = order.iter().map(ToString::to_string).collect();
    println!("{}: {}", kind.as_str(), rendered.join(", "));
    println!("nodes: {}, height: {}", tree.len(), tree.height());
    Ok(())
}
