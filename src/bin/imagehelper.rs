use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use imagehelper::{
    AssetCatalog, BlurEffect, CallbackQueue, Color, ContentMode, Font, Rect,
    RasterBuffer, RemoteImageCache, Size,
};

#[derive(Parser, Debug)]
#[command(name = "imagehelper", version)]
struct Cli {
    /// Raise log verbosity (`-v` debug, `-vv` trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the demo gallery as a contact-sheet PNG.
    Gallery(GalleryArgs),
    /// Apply a chain of transforms to one image.
    Apply(ApplyArgs),
}

#[derive(Parser, Debug)]
struct GalleryArgs {
    /// Source photo; a generated beach scene is used when omitted.
    #[arg(long)]
    photo: Option<PathBuf>,

    /// Named photo inside `--assets` (e.g. `beach`), used when `--photo` is not given.
    #[arg(long, default_value = "beach")]
    photo_name: String,

    /// Asset directory searched for `--photo-name`.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// TTF/OTF font for the text item, titles and captions.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Image URL or path for the web-image item.
    #[arg(long)]
    url: Option<String>,

    /// Seconds to wait for `--url`.
    #[arg(long, default_value_t = 10)]
    url_timeout: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Optional JSON manifest of item placements.
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Cell side in pixels.
    #[arg(long, default_value_t = 280)]
    cell: u32,
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Crop rectangle `x,y,width,height`, applied first.
    #[arg(long, value_parser = parse_rect)]
    crop: Option<Rect>,

    /// Crop to the centred square.
    #[arg(long)]
    square: bool,

    /// Resize target `WIDTHxHEIGHT`.
    #[arg(long, value_parser = parse_size)]
    resize: Option<Size>,

    #[arg(long, value_enum, default_value_t = ModeChoice::Fit)]
    mode: ModeChoice,

    /// Effect preset applied after resizing.
    #[arg(long, value_enum)]
    effect: Option<EffectChoice>,

    /// Tint colour for `--effect tint`.
    #[arg(long, value_parser = parse_color, default_value = "#ff0000")]
    tint: Color,

    /// Corner radius in pixels.
    #[arg(long)]
    round: Option<f64>,

    /// Cut a circle (overrides `--round`).
    #[arg(long)]
    circle: bool,

    /// Border width in pixels.
    #[arg(long)]
    border: Option<f64>,

    #[arg(long, value_parser = parse_color, default_value = "#aaaaaa")]
    border_color: Color,

    /// Transparent padding in pixels, applied last.
    #[arg(long)]
    pad: Option<u32>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    Fill,
    Fit,
    AspectFill,
}

impl From<ModeChoice> for ContentMode {
    fn from(m: ModeChoice) -> Self {
        match m {
            ModeChoice::Fill => ContentMode::ScaleToFill,
            ModeChoice::Fit => ContentMode::ScaleAspectFit,
            ModeChoice::AspectFill => ContentMode::ScaleAspectFill,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EffectChoice {
    Light,
    ExtraLight,
    Dark,
    Tint,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Gallery(args) => cmd_gallery(args),
        Command::Apply(args) => cmd_apply(args),
    }
}

fn cmd_gallery(args: GalleryArgs) -> anyhow::Result<()> {
    let photo = match (&args.photo, &args.assets) {
        (Some(path), _) => load_image(path)?,
        (None, Some(root)) => AssetCatalog::new(root)
            .image_named(&args.photo_name)
            .with_context(|| format!("load asset '{}'", args.photo_name))?,
        (None, None) => imagehelper::sample_photo(640, 480)?,
    };
    let font = args
        .font
        .as_ref()
        .map(|p| Font::load(p, 16.0))
        .transpose()?;

    let mut sections = imagehelper::demo_sections(&photo, font.as_ref(), args.cell)?;

    if let Some(url) = &args.url {
        let queue = CallbackQueue::new();
        let cache =
            RemoteImageCache::with_defaults(queue.sender()).context("start image cache")?;
        let item = imagehelper::web_image_item(
            &cache,
            &queue,
            url,
            args.cell,
            Duration::from_secs(args.url_timeout),
        )?;
        if let Some(web) = sections.iter_mut().find(|s| s.title == "Web Image") {
            web.items = vec![item];
        }
    }

    let (sheet, manifest) = imagehelper::contact_sheet(&sections, font.as_ref(), args.cell)?;
    imagehelper::save_png(&sheet, &args.out)?;
    tracing::info!(
        items = manifest.item_count(),
        w = sheet.width(),
        h = sheet.height(),
        "gallery rendered"
    );

    if let Some(path) = &args.manifest {
        std::fs::write(path, manifest.to_json_pretty()?)
            .with_context(|| format!("write manifest '{}'", path.display()))?;
    }
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let mut img = load_image(&args.in_path)?;

    if let Some(rect) = args.crop {
        img = img.crop(rect)?;
    }
    if args.square {
        img = img.crop_to_square()?;
    }
    if let Some(size) = args.resize {
        img = img.resize(size, args.mode.into())?;
    }
    img = match args.effect {
        None => img,
        Some(EffectChoice::Light) => img.apply_blur(&BlurEffect::light())?,
        Some(EffectChoice::ExtraLight) => img.apply_blur(&BlurEffect::extra_light())?,
        Some(EffectChoice::Dark) => img.apply_blur(&BlurEffect::dark())?,
        Some(EffectChoice::Tint) => img.apply_tint_effect(args.tint)?,
    };
    img = match (args.circle, args.round, args.border) {
        (true, _, Some(w)) => img.round_corners_to_circle_with_border(w, args.border_color)?,
        (true, _, None) => img.round_corners_to_circle()?,
        (false, Some(r), Some(w)) => img.round_corners_with_border(r, w, args.border_color)?,
        (false, Some(r), None) => img.round_corners(r)?,
        (false, None, Some(w)) => img.apply_border(w, args.border_color)?,
        (false, None, None) => img,
    };
    if let Some(p) = args.pad {
        img = img.apply_padding(p)?;
    }

    imagehelper::save_png(&img, &args.out)?;
    eprintln!("wrote {} ({}x{})", args.out.display(), img.width(), img.height());
    Ok(())
}

fn load_image(path: &Path) -> anyhow::Result<RasterBuffer> {
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    Ok(imagehelper::decode_image(&bytes)?)
}

fn parse_numbers<const N: usize>(s: &str, sep: char) -> Result<[f64; N], String> {
    let parts = s
        .split(sep)
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("'{p}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    parts
        .try_into()
        .map_err(|v: Vec<f64>| format!("expected {N} values, got {}", v.len()))
}

fn parse_rect(s: &str) -> Result<Rect, String> {
    let [x, y, w, h] = parse_numbers::<4>(s, ',')?;
    Ok(Rect::new(x, y, x + w, y + h))
}

fn parse_size(s: &str) -> Result<Size, String> {
    let [w, h] = parse_numbers::<2>(&s.to_ascii_lowercase(), 'x')?;
    Ok(Size::new(w, h))
}

fn parse_color(s: &str) -> Result<Color, String> {
    Color::from_hex(s).map_err(|e| e.to_string())
}
