//! docpane - browse and search Markdown/MDX documentation from the terminal

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use docpane_core::{
    build_all_sections, get_main_navigation, split_content_by_sections, BreakingPoint, Config,
    Document, Renderer, SearchEngine, SearchMode,
};
use log::debug;
use std::path::{Path, PathBuf};

/// Split documentation into sections and search it
#[derive(Parser, Debug)]
#[command(name = "docpane")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file to use instead of the platform default
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Heading level that starts a new section (h1-h4)
    #[arg(short, long, global = true, value_name = "LEVEL")]
    breaking_point: Option<BreakingPoint>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List breaking-point headings
    Nav {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// List sections with their subsections
    Sections {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the self-contained MDX source of every section
    Mdx {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Render sections to sanitized HTML
    Render {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Only render the section with this slug
        #[arg(long)]
        section: Option<String>,
    },
    /// Search sections across files
    Search {
        query: String,
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
        /// Use fuzzy matching
        #[arg(long)]
        fuzzy: bool,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let (mut config, events) = match &args.config {
        Some(path) => Config::load_file(path)?,
        None => Config::load().context("Failed to load configuration")?,
    };
    for event in &events {
        event.log();
    }
    if let Some(bp) = args.breaking_point {
        config.breaking_point = bp;
    }
    debug!("breaking point {}", config.breaking_point);

    match args.command {
        Command::Nav { file } => {
            let doc = load(&file)?;
            for heading in get_main_navigation(&doc.raw_content, config.breaking_point) {
                println!(
                    "{:>5}  {}  #{}",
                    heading.source_line_index + 1,
                    heading.title,
                    heading.slug
                );
            }
        }
        Command::Sections { file } => {
            let doc = load(&file)?;
            let sections = split_content_by_sections(
                &doc.raw_content,
                config.breaking_point,
                doc.is_component_source,
            );
            for (idx, section) in sections.iter().enumerate() {
                println!("{} (h{}) #{}", section.title, section.level, section.slug);
                let ids = section.subsection_ids(0, idx);
                for (heading, id) in section.subsections.iter().zip(ids) {
                    let depth = heading.level.saturating_sub(section.level);
                    let indent = "  ".repeat(usize::from(depth));
                    println!("{indent}{} #{id}", heading.title);
                }
            }
        }
        Command::Mdx { file } => {
            let doc = load(&file)?;
            for section in build_all_sections(&doc.raw_content, config.breaking_point) {
                println!("--- {} #{}", section.title, section.slug);
                println!("{}", section.full_source);
            }
        }
        Command::Render { file, section } => {
            let doc = load(&file)?;
            let sections = split_content_by_sections(
                &doc.raw_content,
                config.breaking_point,
                doc.is_component_source,
            );
            let selected: Vec<_> = match &section {
                Some(slug) => sections.iter().filter(|s| &s.slug == slug).collect(),
                None => sections.iter().collect(),
            };
            if selected.is_empty() {
                bail!("No section `{}` in {}", section.unwrap_or_default(), file.display());
            }

            let mut renderer = Renderer::new(&config);
            for section in selected {
                let rendered = renderer.render_section(&doc, section)?;
                println!("<section id=\"{}\">\n{}</section>", section.slug, rendered.html);
            }
        }
        Command::Search {
            query,
            files,
            fuzzy,
            limit,
        } => {
            let docs = Document::load_all(&files)?;
            debug!("indexing {} documents", docs.len());
            if let Some(limit) = limit {
                config.search.max_results = limit;
            }
            let mode = if fuzzy { SearchMode::Fuzzy } else { config.search.mode };

            let engine = SearchEngine::new(&docs, config.search.clone());
            for result in engine.search(&query, mode) {
                println!(
                    "{:>6.2}  {}#{}  {}",
                    result.score, result.document_slug, result.section.slug, result.section.title
                );
                for m in &result.matches {
                    println!("        {:?}: {}", m.kind, m.text.replace('\n', " "));
                }
            }
        }
    }

    Ok(())
}

fn load(file: &Path) -> Result<Document> {
    Document::load(file).with_context(|| format!("Failed to load document: {}", file.display()))
}
