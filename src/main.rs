//! # RJS Compiler
//!
//! A Rust-based JavaScript compiler that analyzes, rewrites, and checks
//! conformance of ES3–ES2017 source files.
//!
//! ## Usage
//!
//! ```bash
//! rjs-compiler [OPTIONS] <FILE>
//! ```
//!
//! For more information, run `rjs-compiler --help`.

use std::path::PathBuf;
use std::process;

use clap::{Arg, Command};

use rjs_compiler::context::CompilerOptions;
use rjs_compiler::diagnostics::PrintingSink;
use rjs_compiler::passes::FeatureSet;

/// Application version constant
const VERSION: &str = "0.1.0";

/// Application name constant
const APP_NAME: &str = "rjs-compiler";

/// Configuration structure for the compiler
#[derive(Debug, Clone)]
struct CompilerConfig {
    /// Input file path to compile
    input_file: Option<PathBuf>,
    /// Enable verbose output
    verbose: bool,
    /// Conformance rule configuration file, if any
    conformance_config: Option<PathBuf>,
    /// Target feature set
    feature_set: FeatureSet,
}

/// Custom error types for the compiler
#[derive(Debug, thiserror::Error)]
enum CompilerError {
    #[error("Input file not specified")]
    MissingInputFile,
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Conformance config error: {0}")]
    ConformanceConfig(String),
    #[error("Compilation failed: {0}")]
    Compile(#[from] rjs_compiler::CompileError),
    #[error("Conformance violations found")]
    ConformanceViolations,
}

/// Result type alias for compiler operations
type CompilerResult<T> = Result<T, CompilerError>;

fn main() {
    if let Err(error) = run_compiler() {
        eprintln!("Error: {}", error);
        process::exit(1);
    }
}

fn run_compiler() -> CompilerResult<()> {
    let config = parse_command_line_arguments()?;

    display_welcome_message();

    if config.verbose {
        display_verbose_info(&config);
    }

    match config.input_file {
        Some(ref file_path) => compile_file(file_path, &config),
        None => {
            display_usage_information();
            Err(CompilerError::MissingInputFile)
        }
    }
}

fn parse_command_line_arguments() -> CompilerResult<CompilerConfig> {
    let matches = Command::new(APP_NAME)
        .version(VERSION)
        .author("RJS Compiler Team <team@rjscompiler.dev>")
        .about("RJS Compiler - A Rust-based JavaScript compiler")
        .long_about(
            "A high-performance JavaScript compiler built with Rust. \n\n\
             Analyzes, rewrites, and checks conformance of JavaScript \n\
             source files against a declarative rule set.",
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::SetTrue)
                .help("Enable verbose output for debugging"),
        )
        .arg(
            Arg::new("conformance")
                .short('c')
                .long("conformance")
                .help("Path to a conformance rule configuration file (JSON)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("target")
                .short('t')
                .long("target")
                .help("Target ECMAScript feature set")
                .value_name("VERSION")
                .value_parser(["es3", "es5", "es2015", "es2017"])
                .default_value("es2017"),
        )
        .arg(
            Arg::new("input")
                .help("Input JavaScript file to compile")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .index(1),
        )
        .get_matches();

    let input_file = matches.get_one::<PathBuf>("input").cloned();
    let verbose = matches.get_flag("verbose");
    let conformance_config = matches.get_one::<PathBuf>("conformance").cloned();
    let feature_set = match matches.get_one::<String>("target").map(String::as_str) {
        Some("es3") => FeatureSet::Es3,
        Some("es5") => FeatureSet::Es5,
        Some("es2015") => FeatureSet::Es2015,
        _ => FeatureSet::Es2017,
    };

    Ok(CompilerConfig {
        input_file,
        verbose,
        conformance_config,
        feature_set,
    })
}

fn display_welcome_message() {
    println!("🦀 Hello Rust!");
    println!("Welcome to RJS Compiler v{}", VERSION);
}

fn display_verbose_info(config: &CompilerConfig) {
    println!("🔍 Verbose mode enabled");
    println!("📋 Configuration:");

    if let Some(ref input_path) = config.input_file {
        println!("   📁 Input file: {}", input_path.display());
    }
    println!("   🎯 Target: {:?}", config.feature_set);
    if let Some(ref c) = config.conformance_config {
        println!("   🛠️  Conformance config: {}", c.display());
    }
}

fn display_usage_information() {
    println!("💡 Usage: {} [OPTIONS] <FILE>", APP_NAME);
    println!("   Use --help for more information");
    println!("   Example: {} --verbose my_script.js", APP_NAME);
}

fn load_conformance_rules(path: Option<&PathBuf>) -> CompilerResult<Vec<rjs_compiler::conformance::Rule>> {
    let Some(path) = path else { return Ok(Vec::new()) };
    let text = std::fs::read_to_string(path).map_err(|e| CompilerError::ConformanceConfig(e.to_string()))?;
    let parsed: rjs_compiler::conformance::RuleConfig =
        serde_json::from_str(&text).map_err(|e| CompilerError::ConformanceConfig(e.to_string()))?;
    Ok(parsed.requirement)
}

fn compile_file(file_path: &PathBuf, config: &CompilerConfig) -> CompilerResult<()> {
    if config.verbose {
        println!("📂 Processing input file: {}", file_path.display());
    }

    if !file_path.exists() {
        return Err(CompilerError::FileNotFound(file_path.clone()));
    }

    let source_code = std::fs::read_to_string(file_path).map_err(|_| CompilerError::FileNotFound(file_path.clone()))?;

    if config.verbose {
        println!("📄 Read {} bytes from file", source_code.len());
        println!("🚀 Starting compilation pipeline...");
    }

    let rules = load_conformance_rules(config.conformance_config.as_ref())?;

    let options = CompilerOptions {
        feature_set: config.feature_set,
        verbose: config.verbose,
        ..CompilerOptions::default()
    };
    let sink = Box::new(PrintingSink::new(config.verbose));

    let output = rjs_compiler::compile(&source_code, &file_path.to_string_lossy(), options, &rules, sink)?;

    if config.verbose {
        println!("📊 Compilation statistics:");
        println!("   🔧 Nodes changed across passes: {}", output.stats.nodes_changed);
        println!("   🗑️  Nodes removed: {}", output.stats.nodes_removed);
        println!("   🌳 Arena size: {} nodes", output.arena.len());
    }

    if !output.findings.is_empty() {
        println!("🛠️  Conformance findings: {}", output.findings.len());
        return Err(CompilerError::ConformanceViolations);
    }

    println!("✅ Compilation completed successfully!");
    Ok(())
}
