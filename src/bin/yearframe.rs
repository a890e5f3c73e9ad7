use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use sha2::Digest as _;

use yearframe::session::project::{OpenedProject, ProjectDocument, build_editor};

#[derive(Parser, Debug)]
#[command(name = "yearframe", version)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the slots defined by a template config JSON.
    Slots(SlotsArgs),
    /// Print month assignments and image geometry of a project.
    Inspect(ProjectArgs),
    /// Render the editing preview at a given display width.
    Preview(PreviewArgs),
    /// Export the finished composition as PNG.
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct SlotsArgs {
    /// Template config JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct ProjectArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Rendered preview width in pixels.
    #[arg(long, default_value_t = 960.0)]
    width: f64,

    /// Select this month (draws the selection outline).
    #[arg(long)]
    select: Option<u8>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Output directory (defaults to the project's directory).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Override the supersample factor (1..=4).
    #[arg(long)]
    supersample: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Slots(args) => cmd_slots(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn project_root(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn open(path: &Path, doc: &ProjectDocument) -> anyhow::Result<OpenedProject> {
    let source = yearframe::FsConfigSource::new(project_root(path));
    let opened = build_editor(doc, &source)?;
    if let Some(notice) = opened.editor.notice() {
        eprintln!("warning: {notice}");
    }
    for r in &opened.uploads.rejected {
        eprintln!("skipped {r}");
    }
    Ok(opened)
}

fn cmd_slots(args: SlotsArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("open template config '{}'", args.in_path.display()))?;
    let slots = yearframe::template::config::parse_config(&bytes)?;
    println!("month  left    top     width   height  background");
    for s in &slots {
        let bg = s.placeholder_color().to_straight_rgba8();
        println!(
            "{:<6} {:<7} {:<7} {:<7} {:<7} #{:02x}{:02x}{:02x}{:02x}",
            s.month.abbrev(),
            s.x,
            s.y,
            s.width,
            s.height,
            bg[0],
            bg[1],
            bg[2],
            bg[3]
        );
    }
    Ok(())
}

fn cmd_inspect(args: ProjectArgs) -> anyhow::Result<()> {
    let doc = ProjectDocument::from_path(&args.project)?;
    let opened = open(&args.project, &doc)?;
    let ed = &opened.editor;
    let t = ed.template();

    println!(
        "template {} ({}) {}x{}, {} slots",
        t.id,
        t.name,
        t.canvas.width,
        t.canvas.height,
        t.slots.len()
    );
    for v in ed.slot_views() {
        let name = v
            .image_id
            .and_then(|id| ed.library().get(id))
            .map_or("-", |img| img.source_name.as_str());
        match v.image {
            Some(p) => println!(
                "  {} {:<24} size {:.1}x{:.1} at ({:.1}, {:.1}) scale {}",
                v.month.abbrev(),
                name,
                p.size.width,
                p.size.height,
                p.local.x0,
                p.local.y0,
                ed.transforms().get(v.month).scale
            ),
            None => println!("  {} (empty)", v.month.abbrev()),
        }
    }

    let missing = ed.library().missing_months();
    if !missing.is_empty() {
        let list: Vec<_> = missing.iter().map(|m| m.abbrev()).collect();
        println!("missing: {}", list.join(", "));
    }
    Ok(())
}

/// Block until uploads and overlay finish decoding so the preview shows them.
fn settle_decodes(ed: &yearframe::Editor) {
    let timeout = ed.export_settings().decode_timeout;
    let handles = ed
        .library()
        .images()
        .iter()
        .map(|img| &img.pixels)
        .chain(ed.overlay());
    for h in handles {
        if let Err(e) = h.wait(timeout) {
            tracing::warn!(error = %e, "image left out of preview");
        }
    }
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let doc = ProjectDocument::from_path(&args.project)?;
    let mut ed = open(&args.project, &doc)?.editor;
    ed.resize(args.width)?;
    if let Some(n) = args.select {
        ed.select(yearframe::Month::new(n)?)?;
    }
    settle_decodes(&ed);

    let frame = ed.render_preview()?;
    let bytes = yearframe::export::png::encode_png(&frame)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &bytes)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {} ({}x{})", args.out.display(), frame.width, frame.height);
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut doc = ProjectDocument::from_path(&args.project)?;
    if args.supersample.is_some() {
        doc.export.supersample = args.supersample;
    }
    let ed = open(&args.project, &doc)?.editor;

    let dir = args
        .out_dir
        .unwrap_or_else(|| project_root(&args.project).to_path_buf());
    let mut sink = yearframe::FileSink::new(dir);
    let report = ed.export(&mut sink)?;

    let path = sink
        .written()
        .last()
        .context("export finished without writing a file")?;
    let bytes = std::fs::read(path).with_context(|| format!("read back '{}'", path.display()))?;
    eprintln!(
        "wrote {} ({}x{}, supersample {})",
        path.display(),
        report.width,
        report.height,
        report.supersample
    );
    println!("sha256: {}", sha256_hex(&bytes));
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
