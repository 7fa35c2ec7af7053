/// silcast - SSA to CAst Reconstruction CLI
use itertools::Itertools;
use silcast::ast::TreeFactory;
use silcast::config::TranslatorConfig;
use silcast::ir::Module;
use silcast::translate::{load_module, translate_module, TranslationOutput, TranslationStats};
use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process;
use tracing::Level;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_usage() {
    eprintln!("silcast v{}", VERSION);
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    silcast [OPTIONS] <INPUT>");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -h, --help           Print this help message");
    eprintln!("    -V, --version        Print version information");
    eprintln!("    -o, --output <FILE>  Write output to FILE (default: stdout)");
    eprintln!("    -c, --config <FILE>  Read translator settings from a TOML file");
    eprintln!("    -v, --verbose        Log translation progress (repeat for more detail)");
    eprintln!("    --stats              Print translation counters to stderr");
    eprintln!();
    eprintln!("ARGUMENTS:");
    eprintln!("    <INPUT>              Input module as JSON (use '-' for stdin)");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("    silcast module.json");
    eprintln!("    silcast -c silcast.toml -o out.cast module.json");
    eprintln!("    cat module.json | silcast -v -");
}

fn print_version() {
    println!("silcast {}", VERSION);
}

struct Options {
    input: Option<String>,
    output: Option<String>,
    config: Option<String>,
    verbosity: u8,
    show_stats: bool,
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = env::args().collect();

    let mut input = None;
    let mut output = None;
    let mut config = None;
    let mut verbosity = 0u8;
    let mut show_stats = false;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            "-V" | "--version" => {
                print_version();
                process::exit(0);
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing output file after -o".to_string());
                }
                output = Some(args[i].clone());
            }
            "-c" | "--config" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing config file after -c".to_string());
                }
                config = Some(args[i].clone());
            }
            "-v" | "--verbose" => {
                verbosity = verbosity.saturating_add(1);
            }
            "--stats" => {
                show_stats = true;
            }
            arg if arg.starts_with('-') && arg != "-" => {
                return Err(format!("Unknown option: {}", arg));
            }
            arg => {
                if input.is_some() {
                    return Err("Multiple input files specified".to_string());
                }
                input = Some(arg.to_string());
            }
        }
        i += 1;
    }

    Ok(Options {
        input,
        output,
        config,
        verbosity,
        show_stats,
    })
}

fn load_config(path: Option<&str>) -> Result<TranslatorConfig, String> {
    match path {
        Some(path) => TranslatorConfig::load(Path::new(path)).map_err(|e| e.to_string()),
        None => Ok(TranslatorConfig::default()),
    }
}

fn init_logging(config: &TranslatorConfig, verbosity: u8) {
    let level = match verbosity {
        0 => config.max_level(),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn read_module(input: &str) -> Result<Module, String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        Module::from_json(&buffer).map_err(|e| format!("Invalid module: {}", e))
    } else {
        let path = Path::new(input);
        if !path.exists() {
            return Err(format!("Input file not found: {}", input));
        }
        load_module(path).map_err(|e| e.to_string())
    }
}

fn write_output(output: Option<&str>, content: &str) -> Result<(), String> {
    match output {
        Some(path) => {
            let mut file = fs::File::create(path)
                .map_err(|e| format!("Failed to create output file '{}': {}", path, e))?;
            file.write_all(content.as_bytes())
                .map_err(|e| format!("Failed to write to output file '{}': {}", path, e))?;
            Ok(())
        }
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

/// One `;; name` header per function followed by its block statements
fn format_output(tree: &TreeFactory, output: &TranslationOutput) -> Result<String, String> {
    let mut sections = Vec::with_capacity(output.functions.len());
    for function in &output.functions {
        let blocks: Vec<String> = function
            .blocks
            .iter()
            .map(|&block| tree.render_pretty(block))
            .collect::<Result<_, _>>()
            .map_err(|e| format!("Rendering failed: {}", e))?;
        sections.push(format!(";; {}\n{}\n", function.name, blocks.iter().join("\n")));
    }
    Ok(sections.iter().join("\n"))
}

fn format_stats(stats: &TranslationStats) -> String {
    [
        ("functions", stats.functions),
        ("declarations", stats.declarations),
        ("blocks", stats.blocks),
        ("blocks emitted", stats.blocks_emitted),
        ("instructions", stats.instructions),
        ("nodes produced", stats.nodes_produced),
        ("unhandled", stats.unhandled),
    ]
    .iter()
    .map(|(name, count)| format!("{:>16}: {}", name, count))
    .join("\n")
}

fn run(module: &Module, config: &TranslatorConfig, options: &Options) -> Result<String, String> {
    let mut tree = TreeFactory::new();
    let output = translate_module(module, &mut tree, config).map_err(|e| e.to_string())?;

    if options.show_stats {
        eprintln!("{}", format_stats(&output.stats));
    }
    format_output(&tree, &output)
}

fn main() {
    let options = match parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    let Some(input) = options.input.as_deref() else {
        eprintln!("Error: Missing input file");
        eprintln!();
        print_usage();
        process::exit(1);
    };

    let config = match load_config(options.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    init_logging(&config, options.verbosity);

    let module = match read_module(input) {
        Ok(module) => module,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let output = match run(&module, &config, &options) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = write_output(options.output.as_deref(), &output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
