//! narro - EPUB to narration text

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;

use narro::{Book, classify, clean, detect_kind, parse_selection, read_epub};

#[derive(Parser)]
#[command(name = "narro")]
#[command(version, about = "Extract narration-ready text from EPUB files", long_about = None)]
#[command(after_help = "EXAMPLES:
    narro book.epub -i                      Show book metadata
    narro book.epub -l                      List fragments with verdicts
    narro book.epub -l --json               Same, as JSON
    narro book.epub -o out.txt -s '1-5,8'   Export cleaned text for a selection")]
struct Cli {
    /// Input EPUB file
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file for cleaned narration text (stdout if omitted)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<String>,

    /// Show book metadata without exporting
    #[arg(short, long)]
    info: bool,

    /// List fragments with classification verdicts
    #[arg(short, long)]
    list: bool,

    /// Emit the fragment listing as JSON (with --list)
    #[arg(long)]
    json: bool,

    /// Fragment selection, e.g. "1-5,8" (1-based; default: all)
    #[arg(short, long, value_name = "SELECTION")]
    select: Option<String>,

    /// Voice identifier recorded in exported output headers
    #[arg(long, value_name = "VOICE")]
    voice: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = if cli.info {
        show_info(&cli.input)
    } else if cli.list {
        list_fragments(&cli.input, cli.json)
    } else {
        export(&cli)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn show_info(path: &str) -> Result<(), String> {
    let book = read_epub(path).map_err(|e| e.to_string())?;

    println!("File: {path}");
    println!("Title: {}", book.title);
    println!("Author: {}", book.author);
    println!("Fragments: {}", book.fragments.len());
    println!("Semantic annotations: {}", book.semantics.len());
    println!("Detected kind: {:?}", detect_kind(&book));

    Ok(())
}

#[derive(serde::Serialize)]
struct FragmentListing<'a> {
    index: usize,
    title: &'a str,
    path: &'a str,
    include: bool,
    confidence: f32,
    reason: Option<&'a str>,
}

fn list_fragments(path: &str, json: bool) -> Result<(), String> {
    let book = read_epub(path).map_err(|e| e.to_string())?;
    let verdicts = classify(&book);

    let listings: Vec<FragmentListing<'_>> = book
        .fragments
        .iter()
        .zip(&verdicts)
        .enumerate()
        .map(|(i, (fragment, verdict))| FragmentListing {
            index: i + 1,
            title: &fragment.title,
            path: &fragment.path,
            include: verdict.include,
            confidence: verdict.confidence,
            reason: verdict.reason.as_deref(),
        })
        .collect();

    if json {
        let out = serde_json::to_string_pretty(&listings).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    for entry in &listings {
        let mark = if entry.include { "+" } else { "-" };
        match entry.reason {
            Some(reason) => println!(
                "{} {:3}. {} ({:.2}: {})",
                mark, entry.index, entry.title, entry.confidence, reason
            ),
            None => println!("{} {:3}. {}", mark, entry.index, entry.title),
        }
    }

    Ok(())
}

fn export(cli: &Cli) -> Result<(), String> {
    let book = read_epub(&cli.input).map_err(|e| e.to_string())?;

    let selection = cli.select.as_deref().unwrap_or("");
    let indices = parse_selection(selection, book.fragments.len());
    if indices.is_empty() {
        return Err("selection matches no fragments".into());
    }

    let text = render_export(&book, &indices, cli.voice.as_deref());

    match &cli.output {
        Some(path) => {
            std::fs::write(path, text).map_err(|e| e.to_string())?;
            println!("Wrote {} fragments to {path}", indices.len());
        }
        None => {
            std::io::stdout()
                .write_all(text.as_bytes())
                .map_err(|e| e.to_string())?;
        }
    }

    Ok(())
}

fn render_export(book: &Book, indices: &[usize], voice: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} by {}\n", book.title, book.author));
    if let Some(voice) = voice {
        out.push_str(&format!("Voice: {voice}\n"));
    }
    out.push('\n');

    for &index in indices {
        let fragment = &book.fragments[index];
        out.push_str(&format!("== {} ==\n\n", fragment.title));
        out.push_str(&clean(&fragment.plain));
        out.push_str("\n\n");
    }

    out
}
