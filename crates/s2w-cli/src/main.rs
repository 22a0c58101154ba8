use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use s2w_convert::{ConvertConfig, Event, build_query, compile_rule, render_rule};
use s2w_parser::{SigmaRule, parse_rule_file};

#[derive(Parser)]
#[command(name = "s2w")]
#[command(about = "Convert Sigma detection rules into Wazuh XML rules")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert Sigma YAML rules into Wazuh XML files
    ///
    /// Accepts a single rule file or a directory of .yml/.yaml files.
    /// Failures are reported per document; the remaining documents still
    /// convert and the exit status is non-zero when any document failed.
    Convert {
        /// Path to a Sigma rule file or a directory of rules
        input: PathBuf,

        /// Directory the XML files are written into
        #[arg(short, long, default_value = "wazuh")]
        output: PathBuf,

        /// Compile patterns without the case-insensitivity flag
        #[arg(long)]
        case_sensitive: bool,

        /// Keep field-name casing as written instead of lowercasing the
        /// leading character
        #[arg(long)]
        keep_field_case: bool,
    },

    /// Print a rule's flat search query as JSON
    Query {
        /// Path to a Sigma rule file
        path: PathBuf,

        /// Pretty-print JSON output
        #[arg(short, long, default_value_t = true)]
        pretty: bool,
    },

    /// Check compiled rules against sample log events
    ///
    /// Sample logs are JSON files holding either an array of events or
    /// newline-delimited events. Each rule passes when at least one sample
    /// event matches it.
    Verify {
        /// Path to a Sigma rule file or a directory of rules
        #[arg(short, long)]
        rules: PathBuf,

        /// Path to a sample log file or a directory of .json files
        #[arg(short, long)]
        logs: PathBuf,
    },

    /// Parse a condition expression and print the AST
    Condition {
        /// The condition expression to parse
        expr: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            case_sensitive,
            keep_field_case,
        } => cmd_convert(input, output, case_sensitive, keep_field_case),
        Commands::Query { path, pretty } => cmd_query(path, pretty),
        Commands::Verify { rules, logs } => cmd_verify(rules, logs),
        Commands::Condition { expr } => cmd_condition(expr),
    }
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_convert(input: PathBuf, output: PathBuf, case_sensitive: bool, keep_field_case: bool) {
    let config = ConvertConfig {
        case_insensitive: !case_sensitive,
        fold_leading_char: !keep_field_case,
        ..ConvertConfig::default()
    };

    if let Err(e) = fs::create_dir_all(&output) {
        eprintln!("Error creating {}: {e}", output.display());
        process::exit(1);
    }

    let paths = rule_paths(&input);
    let mut failed = 0usize;
    let mut written = 0usize;

    for path in &paths {
        let rule = match parse_rule_file(path) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Error parsing {}: {e}", path.display());
                failed += 1;
                continue;
            }
        };
        let compiled = match compile_rule(&rule, &config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error compiling {}: {e}", path.display());
                failed += 1;
                continue;
            }
        };
        let mut doc_ok = true;
        for file in render_rule(&compiled, &config) {
            let out = output.join(&file.file_name);
            match fs::write(&out, &file.xml) {
                Ok(()) => {
                    println!("Written {}", out.display());
                    written += 1;
                }
                Err(e) => {
                    eprintln!("Error writing {}: {e}", out.display());
                    doc_ok = false;
                }
            }
        }
        if !doc_ok {
            failed += 1;
        }
    }

    eprintln!(
        "Converted {} of {} documents, {written} files written.",
        paths.len() - failed,
        paths.len()
    );
    if failed > 0 {
        process::exit(1);
    }
}

fn cmd_query(path: PathBuf, pretty: bool) {
    let rule = load_rule(&path);
    let compiled = match compile_rule(&rule, &ConvertConfig::default()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error compiling {}: {e}", path.display());
            process::exit(1);
        }
    };

    let out = serde_json::json!({
        "id": compiled.metadata.id,
        "query": build_query(&compiled),
    });
    print_json(&out, pretty);
}

fn cmd_verify(rules_path: PathBuf, logs_path: PathBuf) {
    let events = load_events(&logs_path);
    if events.is_empty() {
        eprintln!("No sample events found in {}", logs_path.display());
        process::exit(1);
    }

    let config = ConvertConfig::default();
    let mut failed = 0usize;
    let mut passed = 0usize;

    for path in &rule_paths(&rules_path) {
        let rule = match parse_rule_file(path) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Error parsing {}: {e}", path.display());
                failed += 1;
                continue;
            }
        };
        let compiled = match compile_rule(&rule, &config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error compiling {}: {e}", path.display());
                failed += 1;
                continue;
            }
        };

        let hit = events
            .iter()
            .any(|v| compiled.matches(&Event::from_value(v)));
        if hit {
            println!("Rule {} passed with sample log", compiled.metadata.id);
            passed += 1;
        } else {
            println!(
                "Rule {} failed: no matching sample event",
                compiled.metadata.id
            );
            failed += 1;
        }
    }

    eprintln!("{passed} rules passed, {failed} failed.");
    if failed > 0 || passed == 0 {
        process::exit(1);
    }
}

fn cmd_condition(expr: String) {
    match s2w_parser::parse_condition(&expr) {
        Ok(ast) => print_json(&ast, true),
        Err(e) => {
            eprintln!("Condition parse error: {e}");
            process::exit(1);
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Expand a file-or-directory path into rule file paths. Directories are
/// scanned one level deep for .yml/.yaml entries, sorted by name.
fn rule_paths(path: &Path) -> Vec<PathBuf> {
    if !path.is_dir() {
        return vec![path.to_path_buf()];
    }

    let entries = match fs::read_dir(path) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error reading {}: {e}", path.display());
            process::exit(1);
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"))
        })
        .collect();
    paths.sort();
    paths
}

fn load_rule(path: &Path) -> SigmaRule {
    match parse_rule_file(path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error parsing {}: {e}", path.display());
            process::exit(1);
        }
    }
}

/// Load sample events from a JSON file or a directory of .json files. Each
/// file may hold a single object, an array of events, or NDJSON lines.
fn load_events(path: &Path) -> Vec<serde_json::Value> {
    let files: Vec<PathBuf> = if path.is_dir() {
        match fs::read_dir(path) {
            Ok(entries) => entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| {
                    p.extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
                })
                .collect(),
            Err(e) => {
                eprintln!("Error reading {}: {e}", path.display());
                process::exit(1);
            }
        }
    } else {
        vec![path.to_path_buf()]
    };

    let mut events = Vec::new();
    for file in files {
        let content = match fs::read_to_string(&file) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error reading {}: {e}", file.display());
                process::exit(1);
            }
        };

        match serde_json::from_str::<serde_json::Value>(content.trim()) {
            Ok(serde_json::Value::Array(arr)) => events.extend(arr),
            Ok(v) => events.push(v),
            Err(_) => {
                // NDJSON fallback
                for (n, line) in content.lines().enumerate() {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str(line) {
                        Ok(v) => events.push(v),
                        Err(e) => {
                            eprintln!("Invalid JSON on {}:{}: {e}", file.display(), n + 1);
                            process::exit(1);
                        }
                    }
                }
            }
        }
    }
    events
}

fn print_json(value: &impl serde::Serialize, pretty: bool) {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match json {
        Ok(j) => println!("{j}"),
        Err(e) => {
            eprintln!("JSON serialization error: {e}");
            process::exit(1);
        }
    }
}
