use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "catcaption", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stamp a caption onto an image or GIF animation.
    Caption(CaptionArgs),
    /// Print format, dimensions and (for GIFs) frame timing of an image.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct CaptionArgs {
    /// Input image (format is sniffed from content).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Caption text; `\n` separates lines.
    #[arg(long)]
    text: String,

    /// Output path. GIF input produces GIF output, anything else JPEG.
    #[arg(long)]
    out: PathBuf,

    /// Font file; defaults to `$IMPACT_FILENAME`, then `impact.ttf`.
    #[arg(long)]
    font: Option<PathBuf>,

    /// JSON caption settings; missing fields take their defaults.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Caption animation frames in parallel.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for `--parallel`.
    #[arg(long)]
    threads: Option<usize>,

    /// How frames lacking the ink colors are handled.
    #[arg(long, value_enum)]
    palette: Option<PaletteChoice>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PaletteChoice {
    Exact,
    Extend,
    Compact,
}

impl From<PaletteChoice> for catcaption::PaletteStrategy {
    fn from(choice: PaletteChoice) -> Self {
        match choice {
            PaletteChoice::Exact => Self::Exact,
            PaletteChoice::Extend => Self::Extend,
            PaletteChoice::Compact => Self::Compact,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Caption(args) => cmd_caption(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read input image '{}'", path.display()))
}

fn load_settings(args: &CaptionArgs) -> anyhow::Result<catcaption::CaptionSettings> {
    let mut settings = match &args.settings {
        Some(path) => catcaption::CaptionSettings::from_json_path(path)?,
        None => catcaption::CaptionSettings::default(),
    };
    if args.parallel {
        settings.threading.parallel = true;
    }
    if args.threads.is_some() {
        settings.threading.threads = args.threads;
    }
    if let Some(choice) = args.palette {
        settings.palette_strategy = choice.into();
    }
    settings.validate()?;
    Ok(settings)
}

fn cmd_caption(args: CaptionArgs) -> anyhow::Result<()> {
    let settings = load_settings(&args)?;

    // The process cannot caption anything without its font.
    let fonts = match &args.font {
        Some(path) => catcaption::FontResource::from_path(path)?,
        None => catcaption::FontResource::from_env()?,
    };

    let captioner = catcaption::Captioner::new(fonts, settings)?;
    let input = read_input(&args.in_path)?;
    let text = args.text.replace("\\n", "\n");
    let out = captioner.caption(&input, &text)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &out.bytes)
        .with_context(|| format!("write {} '{}'", out.format.mime_type(), args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let input = read_input(&args.in_path)?;
    match catcaption::decode_image(&input)? {
        catcaption::DecodedImage::Animated(anim) => {
            println!("format:    gif");
            println!("size:      {}x{}", anim.width, anim.height);
            println!("frames:    {}", anim.frames.len());
            println!("repeat:    {:?}", anim.repeat);
            println!(
                "global:    {}",
                anim.global_palette
                    .as_ref()
                    .map_or_else(|| "none".to_string(), |p| format!("{} colors", p.len()))
            );
            for (i, frame) in anim.frames.iter().enumerate() {
                println!(
                    "  frame {i}: delay={} dispose={:?} rect={}x{}+{}+{} palette={}{}",
                    frame.delay,
                    frame.dispose,
                    frame.canvas.width(),
                    frame.canvas.height(),
                    frame.canvas.left,
                    frame.canvas.top,
                    frame.canvas.palette().len(),
                    if frame.local_palette { " (local)" } else { "" },
                );
            }
        }
        catcaption::DecodedImage::Static(canvas) => {
            let format = catcaption::sniff_format(&input)?;
            println!("format:    {format:?}");
            println!("size:      {}x{}", canvas.width(), canvas.height());
        }
    }
    Ok(())
}
