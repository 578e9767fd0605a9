mod demos;

use bumpalo::Bump;
use clap::Parser;
use ember::{Disassembly, Engine, EngineOptions, Error, Port, ProcessPort};
use miette::{IntoDiagnostic, Result, miette};
use std::process::ExitCode;
use tracing::info;

/// Ember - a compact bytecode interpreter for memory-constrained devices
#[derive(Parser, Debug)]
#[command(name = "ember")]
#[command(about = "Run built-in Ember demo programs", long_about = None)]
struct Args {
    /// List the built-in demos and exit
    #[arg(long)]
    list: bool,

    /// Print the program listing before running it
    #[arg(long)]
    disassemble: bool,

    /// Heap region size in bytes
    #[arg(long, default_value_t = ember::DEFAULT_HEAP_CAPACITY)]
    heap_size: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Demo to run
    #[arg(default_value = "assignment")]
    demo: String,
}

fn init_logging(verbose: u8) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    // EMBER_LOG or RUST_LOG override the -v level
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("EMBER_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new(level))
        .into_diagnostic()?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    if args.list {
        for demo in demos::DEMOS {
            println!("{:<16} {}", demo.name, demo.about);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let demo = demos::find(&args.demo)
        .ok_or_else(|| miette!("unknown demo `{}` (see --list)", args.demo))?;
    let program = (demo.program)().map_err(Error::from)?;

    let arena = Bump::new();
    let options = EngineOptions {
        heap_capacity: args.heap_size,
    };
    let mut engine = Engine::new(&arena, options).unwrap_or_else(|e| ProcessPort.fatal(&e));
    let pool = match ember::literal_pool(&engine, demo.strings, demo.numbers) {
        Ok(pool) => pool,
        Err(Error::Fatal(e)) => ProcessPort.fatal(&e),
        Err(e) => return Err(e.into()),
    };

    if args.disassemble {
        println!("{}", Disassembly::new(&program).with_pool(&pool));
    }

    let completion = engine.execute_or_abort(&ProcessPort, &program, &pool);
    let stats = engine.heap_stats();
    info!(
        peak = stats.peak,
        capacity = stats.capacity,
        "{} finished",
        demo.name
    );

    println!("{}", completion.value);
    Ok(if completion.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
