use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use typemetry::raster::{RasterError, RasterOptions, ResvgRasterizer};
use typemetry::{
    BaselineMode, CanvasSize, FontSpec, FontStyle, FontWeight, MeasureOptions, PixelBBox,
    Typemetry,
};

/// Glyph commands render at this size unless `--size` or `--font` says otherwise.
const DEFAULT_GLYPH_SIZE: f64 = 100.0;
const DEFAULT_FAMILY: &str = "sans-serif";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Typemetry(typemetry::Error),
    Raster(RasterError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Typemetry(err) => write!(f, "{err}"),
            CliError::Raster(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<typemetry::Error> for CliError {
    fn from(value: typemetry::Error) -> Self {
        Self::Typemetry(value)
    }
}

impl From<RasterError> for CliError {
    fn from(value: RasterError) -> Self {
        Self::Raster(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Measure,
    Glyph,
    Sample,
}

#[derive(Debug, Default)]
struct Args {
    command: Option<Command>,
    text: Option<String>,
    font: Option<FontSpec>,
    family: Option<String>,
    weight: Option<FontWeight>,
    style: Option<FontStyle>,
    size: Option<f64>,
    baseline: BaselineMode,
    font_files: Vec<PathBuf>,
    no_system_fonts: bool,
    precision: Option<u32>,
    scaled: Option<f64>,
    pretty: bool,
    out: Option<PathBuf>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GlyphOut<'a> {
    text: &'a str,
    font: String,
    baseline: &'static str,
    anchor_y: f64,
    bbox: Option<PixelBBox>,
    /// Ink top and bottom edges above the anchor row, in pixels.
    top: Option<f64>,
    bottom: Option<f64>,
}

fn usage() -> &'static str {
    "typemetry-cli\n\
\n\
USAGE:\n\
  typemetry-cli measure [font flags] [--precision <n>] [--scaled <px>] [--pretty]\n\
  typemetry-cli glyph <text> [--baseline alphabetic|top|bottom] [font flags] [--pretty]\n\
  typemetry-cli sample <text> [--baseline alphabetic|top|bottom] [font flags] --out <path.png>\n\
\n\
FONT FLAGS:\n\
  --font <css-shorthand>   e.g. 'italic 700 16px \"Georgia\"'\n\
  --family <name>          overrides the --font family (default: sans-serif)\n\
  --weight <100..900|normal|bold>\n\
  --style normal|italic\n\
  --size <px>              glyph/sample render size (default: 100)\n\
  --font-file <path>       load an extra font file; repeatable\n\
  --no-system-fonts        only use --font-file fonts\n\
\n\
NOTES:\n\
  - measure prints size-normalized metrics as JSON; --scaled multiplies them by <px>.\n\
  - glyph prints a null bbox when the text leaves no ink.\n\
  - TYPEMETRY_REFERENCE_SIZE and TYPEMETRY_PARALLEL tune the measurement pass.\n\
  - RUST_LOG controls diagnostics on stderr.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_positive(raw: &str) -> Result<f64, CliError> {
    let v = raw.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
    if !(v.is_finite() && v > 0.0) {
        return Err(CliError::Usage(usage()));
    }
    Ok(v)
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "measure" if args.command.is_none() => args.command = Some(Command::Measure),
            "glyph" if args.command.is_none() => args.command = Some(Command::Glyph),
            "sample" if args.command.is_none() => args.command = Some(Command::Sample),
            "--font" => args.font = Some(next_value(&mut it)?.parse::<FontSpec>()?),
            "--family" => args.family = Some(next_value(&mut it)?.clone()),
            "--weight" => args.weight = Some(next_value(&mut it)?.parse::<FontWeight>()?),
            "--style" => args.style = Some(next_value(&mut it)?.parse::<FontStyle>()?),
            "--size" => args.size = Some(parse_positive(next_value(&mut it)?)?),
            "--baseline" => args.baseline = next_value(&mut it)?.parse::<BaselineMode>()?,
            "--font-file" => args.font_files.push(PathBuf::from(next_value(&mut it)?)),
            "--no-system-fonts" => args.no_system_fonts = true,
            "--precision" => {
                let raw = next_value(&mut it)?;
                args.precision = Some(raw.parse::<u32>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--scaled" => args.scaled = Some(parse_positive(next_value(&mut it)?)?),
            "--pretty" => args.pretty = true,
            "--out" => args.out = Some(PathBuf::from(next_value(&mut it)?)),
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            text => {
                if args.text.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.text = Some(text.to_string());
            }
        }
    }

    let valid = match args.command {
        None => false,
        Some(Command::Measure) => args.text.is_none(),
        Some(Command::Glyph) => args.text.is_some(),
        Some(Command::Sample) => args.text.is_some() && args.out.is_some(),
    };
    if !valid {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn font_spec(args: &Args) -> FontSpec {
    let mut font = args
        .font
        .clone()
        .unwrap_or_else(|| FontSpec::new(DEFAULT_FAMILY).with_size(DEFAULT_GLYPH_SIZE));
    if let Some(family) = &args.family {
        font.family = family.clone();
    }
    if let Some(weight) = args.weight {
        font.weight = weight;
    }
    if let Some(style) = args.style {
        font.style = style;
    }
    if let Some(size) = args.size {
        font.size = size;
    }
    font
}

fn build(args: &Args) -> Result<(Arc<ResvgRasterizer>, Typemetry), CliError> {
    let raster = RasterOptions {
        load_system_fonts: !args.no_system_fonts,
        font_files: args.font_files.clone(),
        ..RasterOptions::default()
    };
    let rasterizer = Arc::new(ResvgRasterizer::new(&raster)?);
    log::debug!("{} font faces available", rasterizer.fontdb().len());

    let mut options = MeasureOptions::from_env()?;
    if let Some(precision) = args.precision {
        options.precision = precision;
    }
    options.validate()?;

    let typemetry = Typemetry::new(rasterizer.clone()).with_options(options);
    Ok((rasterizer, typemetry))
}

fn run(args: Args) -> Result<(), CliError> {
    let Some(command) = args.command else {
        return Err(CliError::Usage(usage()));
    };
    let font = font_spec(&args);
    font.validate()?;
    let (rasterizer, typemetry) = build(&args)?;

    match command {
        Command::Measure => {
            let metrics = typemetry.measure_font(&font)?;
            let metrics = match args.scaled {
                Some(px) => metrics.scaled(px),
                None => metrics,
            };
            println!(
                "{}",
                metrics.to_json(typemetry.options().precision, args.pretty)?
            );
        }
        Command::Glyph => {
            let text = args.text.as_deref().unwrap_or_default();
            let engine = typemetry.engine();
            let sample = match engine.measure_glyph(text, &font, args.baseline) {
                Ok(sample) => Some(sample),
                Err(err) if err.is_sample_failure() => {
                    log::info!("{err}");
                    None
                }
                Err(err) => return Err(err.into()),
            };
            let canvas = CanvasSize::for_text(text, font.size, typemetry.options());
            let out = GlyphOut {
                text,
                font: font.css_font(),
                baseline: args.baseline.as_str(),
                anchor_y: f64::from(canvas.height) / 2.0,
                bbox: sample.map(|s| s.bbox),
                top: sample.map(|s| s.top()),
                bottom: sample.map(|s| s.bottom()),
            };
            if args.pretty {
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", serde_json::to_string(&out)?);
            }
        }
        Command::Sample => {
            let text = args.text.as_deref().unwrap_or_default();
            let Some(path) = args.out.as_deref() else {
                return Err(CliError::Usage(usage()));
            };
            let canvas = CanvasSize::for_text(text, font.size, typemetry.options());
            let png =
                rasterizer.render_png(text, &font, args.baseline, canvas.width, canvas.height)?;
            std::fs::write(path, png)?;
            log::info!(
                "wrote {}x{} sample to {}",
                canvas.width,
                canvas.height,
                path.display()
            );
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        let code = if matches!(err, CliError::Usage(_)) {
            2
        } else {
            1
        };
        std::process::exit(code);
    }
}
