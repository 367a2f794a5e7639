//! CLI: convert between formats, infer types, generate and validate samples.
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;

use shapecast::{
    EmitOptions, Format, Inference, InferencePolicy, TypeSchema, TypeTarget, Value, policy_for,
};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// convert structured data between JSON, YAML, XML and CSV, infer type
/// definitions from it, and generate samples from a schema
#[derive(Parser, Debug)]
#[command(name = "shapecast", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// re-encode one document in another format
    Convert(ConvertOut),
    /// infer a schema from one or more documents and emit type definitions
    Types(TypesOut),
    /// generate a random instance of a JSON Schema document
    Sample(SampleOut),
    /// check documents against a JSON Schema document
    Validate(ValidateOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// source format (defaults to each file's extension, JSON for stdin)
    #[arg(long, value_enum)]
    from: Option<Format>,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct ConvertOut {
    /// source format (defaults to the file extension)
    #[arg(long, value_enum)]
    from: Option<Format>,

    /// target format
    #[arg(long, value_enum)]
    to: Format,

    /// input file or '-' for stdin
    #[arg(long, short)]
    input: String,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct TypesOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output language
    #[arg(long, value_enum)]
    target: TypeTarget,

    /// top-level type name
    #[arg(long, default_value = "Root")]
    root_type: String,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct SampleOut {
    /// JSON Schema document ('-' for stdin)
    #[arg(long)]
    schema: String,

    /// seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// output format
    #[arg(long, value_enum, default_value = "json")]
    to: Format,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct ValidateOut {
    /// JSON Schema document
    #[arg(long)]
    schema: String,

    #[command(flatten)]
    input_settings: InputSettings,
}

/// One parsed input, after the pointer and jq steps.
struct Document {
    origin: String,
    format: Format,
    value: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Read and parse every input in parallel; documents come back in input order.
    fn load_documents(&self) -> Result<Vec<Document>> {
        let sources = resolve_file_path_patterns(&self.input)?;
        let per_source = sources
            .par_iter()
            .map(|source| self.load_source(source))
            .collect::<Result<Vec<_>>>()?;
        Ok(per_source.into_iter().flatten().collect())
    }

    fn load_source(&self, source: &str) -> Result<Vec<Document>> {
        let text = read_source(source)?;
        let format = self.from.unwrap_or_else(|| guess_format(source));
        let value = shapecast::parse(&text, format).with_context(|| format!("failed to parse {source}"))?;

        let value = match self.json_pointer.as_deref() {
            None => value,
            Some(ptr) => value
                .pointer(ptr)
                .cloned()
                .ok_or_else(|| anyhow!("JSON pointer {ptr} does not resolve in {source}"))?,
        };

        let values = match self.jq_expr.as_deref() {
            None => vec![value],
            Some(jq_expr) => shapecast::jq_exec::run_jaq(jq_expr, &value)
                .with_context(|| format!("failed to apply jq expression to {source}"))?,
        };

        Ok(values
            .into_iter()
            .map(|value| Document { origin: source.to_string(), format, value })
            .collect())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Convert(target) => {
                let text = read_source(&target.input)?;
                let from = target.from.unwrap_or_else(|| guess_format(&target.input));
                let out = shapecast::convert(&text, from, target.to)
                    .with_context(|| format!("failed to convert {} from {from} to {}", target.input, target.to))?;
                write_output(target.out.as_deref(), &out)
            }
            Command::Types(target) => {
                let docs = target.input_settings.load_documents()?;
                // typed scalars win unless every input is CSV
                let policy = if !docs.is_empty() && docs.iter().all(|d| d.format == Format::Csv) {
                    policy_for(Format::Csv)
                } else {
                    InferencePolicy::default()
                };
                let mut inf = Inference::with_policy(policy);
                for doc in &docs {
                    inf.observe_value(&doc.value);
                }
                tracing::info!(documents = docs.len(), "inference finished");
                let schema = inf.solve();

                let opts = EmitOptions { root_name: target.root_type.clone() };
                let src = shapecast::emit_type_with(&schema, target.target, &opts)?;
                write_output(target.out.as_deref(), &src)
            }
            Command::Sample(target) => {
                let schema = load_schema(&target.schema)?;
                let value = match target.seed {
                    Some(seed) => shapecast::generate_sample_seeded(&schema, seed),
                    None => shapecast::generate_sample(&schema),
                };
                let out = shapecast::serialize(&value, target.to)?;
                write_output(target.out.as_deref(), &out)
            }
            Command::Validate(target) => {
                let schema = load_schema(&target.schema)?;
                let docs = target.input_settings.load_documents()?;
                let mut failures = 0;
                for doc in &docs {
                    match shapecast::validate(&doc.value, &schema) {
                        Ok(()) => eprintln!("{} {}", "valid".green().bold(), doc.origin),
                        Err(violations) => {
                            failures += 1;
                            eprintln!("{} {}", "invalid".red().bold(), doc.origin);
                            for v in violations {
                                eprintln!("  {}", v.to_string().red());
                            }
                        }
                    }
                }
                if failures > 0 {
                    bail!("{failures} of {} documents failed validation", docs.len());
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn load_schema(source: &str) -> Result<TypeSchema> {
    let text = read_source(source)?;
    shapecast::read_json_schema(&text).with_context(|| format!("failed to read schema {source}"))
}

fn read_source(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).context("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(source).with_context(|| format!("failed to read source file {source}"))
}

fn guess_format(source: &str) -> Format {
    Path::new(source)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(Format::from_extension)
        .unwrap_or(Format::Json)
}

fn write_output(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, text).with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            println!("{}", text.trim_end_matches('\n'));
            Ok(())
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<String>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                matched_any = true;
                out.push(entry?.to_string_lossy().to_string());
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            // literal path or '-'
            out.push(pattern.to_string());
        }
    }

    Ok(out)
}
