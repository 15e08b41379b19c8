//! ISEL - instruction table inspector
//!
//! Usage: isel [OPTIONS]

use anyhow::{Context, Result, bail};
use clap::Parser as ClapParser;
use isel::backend::{Platform, PlatformRegistry};
use isel::common::{DiagnosticReporter, Span};
use isel::driver::{Session, SessionConfig};

#[derive(ClapParser, Debug)]
#[command(name = "isel")]
#[command(author = "ISEL Team")]
#[command(version)]
#[command(about = "Inspect the instruction selection tables of retro CPU targets", long_about = None)]
struct Args {
    /// Target platform
    #[arg(short, long, default_value = "spc700")]
    platform: String,

    /// Only list instructions whose operation contains this text
    #[arg(short, long)]
    filter: Option<String>,

    /// List available platforms
    #[arg(long)]
    list_platforms: bool,

    /// Encode an unconditional jump to this address instead of dumping the table
    #[arg(long, value_parser = parse_address)]
    jump: Option<u32>,

    /// Address the jump is placed at
    #[arg(long, value_parser = parse_address, default_value = "0x0200")]
    origin: u32,

    /// Use long (absolute) branch forms
    #[arg(long)]
    long: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_address(text: &str) -> Result<u32, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix('$')) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| format!("invalid address `{}`: {}", text, e))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let registry = PlatformRegistry::with_builtin().context("failed to set up platforms")?;

    if args.list_platforms {
        for platform in registry.list() {
            println!("{:<10} {}", platform.name(), platform.target());
        }
        return Ok(());
    }

    let platform = registry
        .find_by_name(&args.platform)
        .with_context(|| format!("unknown platform `{}`", args.platform))?;

    match args.jump {
        Some(dest) => encode_jump(platform, &args, dest),
        None => {
            dump_table(platform, args.filter.as_deref());
            Ok(())
        }
    }
}

fn dump_table(platform: &dyn Platform, filter: Option<&str>) {
    let defs = platform.definitions();
    let table = platform.instructions();
    let mut shown = 0;

    for instruction in table.iter() {
        let operation = instruction.signature.ty.display(defs).to_string();
        if filter.is_some_and(|f| !operation.contains(f)) {
            continue;
        }
        let opcode = instruction
            .options
            .opcode
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ");
        let clobbered = instruction
            .options
            .invalidated
            .iter()
            .map(|&flag| defs.name(flag))
            .collect::<Vec<_>>()
            .join(",");
        println!(
            "{:<56} {:<16} {:<12} {}",
            instruction.signature.display(defs).to_string(),
            opcode,
            instruction.encoding.name(),
            clobbered
        );
        shown += 1;
    }

    println!("{} of {} instructions", shown, table.len());
}

fn encode_jump(platform: &dyn Platform, args: &Args, dest: u32) -> Result<()> {
    let source = format!("goto {:#06X}", dest);
    let location = Span::new(0, source.len());
    let config = SessionConfig {
        origin: args.origin,
        distance_hint: usize::from(args.long),
    };

    let mut session = Session::new(platform, config);
    let result = session.goto(dest, location);
    let (output, diagnostics) = session.finish();

    if let Err(error) = result {
        let mut reporter = DiagnosticReporter::new();
        let file_id = reporter.add_file("<jump>", source);
        if diagnostics.is_empty() {
            reporter.report_error(file_id, &error);
        } else {
            reporter.report_diagnostics(file_id, &diagnostics);
        }
        bail!("{}", error);
    }

    let bytes = output.iter().map(|b| format!("{:02X}", b)).collect::<Vec<_>>().join(" ");
    println!("{:#06X}: {}", args.origin, bytes);
    Ok(())
}
