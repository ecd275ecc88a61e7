//! Paper comparison CLI.
//!
//! Usage:
//!   paper-compare render <paper> <width> <height> [scene options] [--3d] -o <output.bmp>
//!   paper-compare compare <file_a> <file_b> [-t <tolerance>] [-d <diff.bmp>] [-s <sidebyside.bmp>]
//!   paper-compare verify <paper_a> <paper_b> <width> <height> [scene options] [-t <tolerance>] [-d <diff.bmp>]
//!   paper-compare list
//!
//! Scene options: -a <alpha> -b <boost> -m <min_alpha> -n <points> --seed <n>
//!
//! Set RUST_LOG=plot_paper=trace to see per-paper diagnostics.

use std::error::Error;
use std::path::Path;
use std::process::ExitCode;
use std::str::FromStr;

use paper_compare::scene::{render_scene, Scene, SceneParams};
use paper_compare::{compare_buffers, generate_diff_image, generate_sidebyside, load_image, save_image};
use plot_paper::paper::PaperKind;
use tracing::{debug, error};
use tracing_subscriber::{fmt, EnvFilter};

type CmdResult = Result<bool, Box<dyn Error>>;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(true).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    let result = match args[1].as_str() {
        "render" => cmd_render(&args[2..]),
        "compare" => cmd_compare(&args[2..]),
        "verify" => cmd_verify(&args[2..]),
        "list" => cmd_list(),
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            return ExitCode::FAILURE;
        }
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    eprintln!("paper-compare: render scatter scenes through paper types and compare them");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  render <paper> <width> <height> [scene options] [--3d] -o <output.bmp|raw>");
    eprintln!("      Render the reference scene through one paper type.");
    eprintln!();
    eprintln!("  compare <file_a> <file_b> [-t <tolerance>] [-d <diff.bmp>] [-s <sidebyside.bmp>]");
    eprintln!("      Compare two image files pixel by pixel.");
    eprintln!();
    eprintln!("  verify <paper_a> <paper_b> <width> <height> [scene options] [-t <tolerance>] [-d <diff.bmp>]");
    eprintln!("      Render one scene through two paper types and compare.");
    eprintln!();
    eprintln!("  list");
    eprintln!("      List paper types.");
    eprintln!();
    eprintln!("Scene options: -a <alpha> -b <boost> -m <min_alpha> -n <points> --seed <n>");
}

fn cmd_list() -> CmdResult {
    println!("{:<12} {:<8} {:<4} {:<4}", "paper", "output", "2D", "3D");
    for kind in PaperKind::ALL {
        let mark = |b: bool| if b { "yes" } else { "-" };
        println!(
            "{:<12} {:<8} {:<4} {:<4}",
            kind.name(),
            if kind.is_bitmap() { "bitmap" } else { "vector" },
            mark(kind.supports_2d()),
            mark(kind.supports_3d()),
        );
    }
    Ok(true)
}

// ============================================================================
// Argument parsing
// ============================================================================

fn parse<T: FromStr>(what: &str, value: Option<&String>) -> Result<T, Box<dyn Error>> {
    let value = value.ok_or_else(|| format!("missing value for {}", what))?;
    value
        .parse()
        .map_err(|_| format!("invalid {}: {}", what, value).into())
}

fn parse_kind(name: &str) -> Result<PaperKind, Box<dyn Error>> {
    PaperKind::from_name(name)
        .ok_or_else(|| format!("unknown paper '{}'; use 'list' to see paper types", name).into())
}

/// Options shared by the rendering commands.
#[derive(Debug, Default)]
struct Options {
    params: SceneParams,
    deep: bool,
    tolerance: u8,
    output: Option<String>,
    diff: Option<String>,
    sidebyside: Option<String>,
}

fn parse_options(args: &[String]) -> Result<Options, Box<dyn Error>> {
    let mut opts = Options::default();
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-a" => opts.params.alpha = parse("alpha", it.next())?,
            "-b" => opts.params.boost = parse("boost", it.next())?,
            "-m" => opts.params.min_alpha = parse("min_alpha", it.next())?,
            "-n" => opts.params.points = parse("points", it.next())?,
            "--seed" => opts.params.seed = parse("seed", it.next())?,
            "-t" => opts.tolerance = parse("tolerance", it.next())?,
            "-o" => opts.output = Some(parse("output", it.next())?),
            "-d" => opts.diff = Some(parse("diff path", it.next())?),
            "-s" => opts.sidebyside = Some(parse("side-by-side path", it.next())?),
            "--3d" => opts.deep = true,
            other => return Err(format!("unknown option: {}", other).into()),
        }
    }
    debug!(?opts, "parsed options");
    Ok(opts)
}

fn parse_size(args: &[String]) -> Result<(u32, u32), Box<dyn Error>> {
    let width = parse("width", args.first())?;
    let height = parse("height", args.get(1))?;
    if width == 0 || height == 0 {
        return Err("width and height must be positive".into());
    }
    Ok((width, height))
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_render(args: &[String]) -> CmdResult {
    if args.len() < 3 {
        return Err("usage: paper-compare render <paper> <width> <height> [options] -o <output>".into());
    }
    let kind = parse_kind(&args[0])?;
    let (width, height) = parse_size(&args[1..3])?;
    let opts = parse_options(&args[3..])?;

    let mut scene = Scene::for_kinds(&[kind]).ok_or("no scene for this paper")?;
    if opts.deep {
        if !kind.supports_3d() {
            return Err(format!("{} papers do not take 3D placement", kind).into());
        }
        scene.deep = true;
    }

    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| format!("{}_{}x{}.bmp", kind.name().to_lowercase(), width, height));
    println!("Rendering {} at {}x{} with {:?}...", kind, width, height, opts.params);
    let buf = render_scene(kind, scene, width, height, &opts.params)?;
    save_image(Path::new(&output), &buf)?;
    println!("Saved: {}", output);
    Ok(true)
}

fn cmd_compare(args: &[String]) -> CmdResult {
    if args.len() < 2 {
        return Err("usage: paper-compare compare <file_a> <file_b> [-t <tol>] [-d <diff>] [-s <sidebyside>]".into());
    }
    let opts = parse_options(&args[2..])?;
    let a = load_image(Path::new(&args[0]))?;
    let b = load_image(Path::new(&args[1]))?;

    let result = compare_buffers(&a, &b, opts.tolerance)?;
    println!("{}", result);

    if let Some(dp) = &opts.diff {
        save_image(Path::new(dp), &generate_diff_image(&a, &b)?)?;
        println!("Diff saved: {}", dp);
    }
    if let Some(sp) = &opts.sidebyside {
        save_image(Path::new(sp), &generate_sidebyside(&a, &b)?)?;
        println!("Side-by-side saved: {}", sp);
    }
    Ok(result.passed())
}

fn cmd_verify(args: &[String]) -> CmdResult {
    if args.len() < 4 {
        return Err("usage: paper-compare verify <paper_a> <paper_b> <width> <height> [options]".into());
    }
    let kinds = [parse_kind(&args[0])?, parse_kind(&args[1])?];
    let (width, height) = parse_size(&args[2..4])?;
    let opts = parse_options(&args[4..])?;
    let scene = Scene::for_kinds(&kinds)
        .ok_or_else(|| format!("{} and {} share no placement interface", kinds[0], kinds[1]))?;

    let mut bufs = Vec::with_capacity(2);
    for kind in kinds {
        println!("Rendering {}...", kind);
        let buf = render_scene(kind, scene, width, height, &opts.params)?;
        let path = format!("{}_{}x{}.bmp", kind.name().to_lowercase(), width, height);
        save_image(Path::new(&path), &buf)?;
        println!("  Saved: {}", path);
        bufs.push(buf);
    }
    let (a, b) = (&bufs[0], &bufs[1]);

    let result = compare_buffers(a, b, opts.tolerance)?;
    println!("\n{}", result);

    if let Some(dp) = &opts.diff {
        save_image(Path::new(dp), &generate_diff_image(a, b)?)?;
        println!("Diff saved: {}", dp);
    }

    if !result.passed() {
        let sbs_path = format!("{}_vs_{}_{}x{}.bmp", kinds[0], kinds[1], width, height);
        save_image(Path::new(&sbs_path), &generate_sidebyside(a, b)?)?;
        println!("Side-by-side saved: {}", sbs_path);

        println!("\nDifference histogram:");
        for (diff_val, &count) in result.diff_histogram.iter().enumerate() {
            if count > 0 {
                println!("  diff={}: {} channels", diff_val, count);
            }
        }
        return Ok(false);
    }

    println!("\nMATCH");
    Ok(true)
}
