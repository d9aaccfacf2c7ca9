use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "mkflag", version, about = "Render flag badge icons as PNGs")]
struct Cli {
    /// Label text drawn on the badge.
    #[arg(short, long)]
    text: String,

    /// Text, flag and border colors as `AARRGGBB,AARRGGBB,AARRGGBB`
    /// (6-digit `RRGGBB` tokens imply full alpha).
    #[arg(short, long)]
    colors: String,

    /// Output file name prefix; files land at `{prefix}_{tag}_{scale}.png`.
    #[arg(short = 'f', long = "prefix")]
    prefix: String,

    /// Output scale factor.
    #[arg(short, long)]
    scale: f64,

    /// Optional logo image (PNG/JPEG/... or SVG) drawn left of the text.
    #[arg(short, long)]
    logo: Option<PathBuf>,

    /// Text metrics backend.
    #[arg(long, value_enum, default_value_t = MetricsChoice::Parley)]
    metrics: MetricsChoice,

    /// Font file override; otherwise a bold sans face is resolved from the
    /// system font database.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Print per-style layout and export-rect diagnostics as JSON and exit.
    #[arg(long)]
    dump_layout: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MetricsChoice {
    Parley,
    Fontdue,
}

fn make_backend(choice: MetricsChoice) -> mkflag::MetricsBackend {
    match choice {
        MetricsChoice::Parley => mkflag::MetricsBackend::Parley,
        MetricsChoice::Fontdue => mkflag::MetricsBackend::Fontdue,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(
        text = %cli.text,
        colors = %cli.colors,
        prefix = %cli.prefix,
        scale = cli.scale,
        "parsed arguments"
    );

    let spec = mkflag::FlagSpec {
        text: cli.text,
        scale: cli.scale,
        colors: mkflag::ColorSet::parse(&cli.colors)?,
        file_prefix: cli.prefix,
        logo_path: cli.logo,
    };
    let opts = mkflag::RenderOptions {
        backend: make_backend(cli.metrics),
        font_file: cli.font,
    };

    if cli.dump_layout {
        return dump_layout_diagnostics(&spec, &opts);
    }

    let report = mkflag::render_flag_set(&spec, &opts)?;
    for path in &report.written {
        eprintln!("wrote {}", path.display());
    }
    for (style, reason) in &report.skipped {
        eprintln!("skipped {style}: {reason}");
    }
    if report.written.is_empty() {
        anyhow::bail!("no badge file could be written");
    }
    Ok(())
}

fn dump_layout_diagnostics(
    spec: &mkflag::FlagSpec,
    opts: &mkflag::RenderOptions,
) -> anyhow::Result<()> {
    spec.validate()?;
    let design = mkflag::DesignMetrics::default();
    let font = mkflag::load_font(&design.font_family, opts.font_file.as_deref())?;
    let mut provider = mkflag::create_provider(opts.backend, &font, design.font_size)?;
    let logo_metrics =
        mkflag::prepare_logo(spec, &design, provider.as_mut()).map(|(_, metrics)| metrics);

    let mut entries = Vec::new();
    for style in mkflag::StockStyle::ALL {
        let layout = mkflag::compute_layout(&spec.text, &design, provider.as_mut(), logo_metrics)?;
        let rect = mkflag::export_rect(&layout, style, &design, spec.scale)?;
        entries.push(serde_json::json!({
            "style": style.tag(),
            "file": mkflag::style_file_name(&spec.file_prefix, style, spec.scale),
            "layout": layout,
            "export_rect": rect,
        }));
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::Value::Array(entries))?
    );
    Ok(())
}
