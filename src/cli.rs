use crate::config::{Config, load_config};
use crate::layout::layout;
use crate::layout_dump::layout_dump_string;
use crate::mutate::{NodeDefaults, PlaceRequest, SpecificDefaults, place, replace};
use crate::parser::{emit_content, parse_content, validate_graph};
use crate::remove::{delete, remove};
use crate::render::{render_svg, write_output_svg};
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "bsed", version, about = "Branching-scenario editor core (mutate and lay out content graphs)")]
pub struct Args {
    /// Input scenario file (content array JSON) or '-' for stdin
    #[arg(short = 'i', long = "input", global = true)]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output", global = true)]
    pub output: Option<PathBuf>,

    /// Config JSON file (layout dimensions, theme)
    #[arg(short = 'c', long = "configFile", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute the tree layout and write it as JSON, SVG or PNG
    Layout {
        #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "json")]
        output_format: OutputFormat,
        /// Node to lay the tree out from
        #[arg(long = "root", default_value_t = 0)]
        root: i32,
    },
    /// Insert a new node or move an existing one
    Place {
        /// Existing node id, or -1 to insert a new node
        #[arg(long = "id", default_value_t = -1, allow_negative_numbers = true)]
        id: i32,
        /// New successor id; 0 makes the node the entry point
        #[arg(long = "next", allow_negative_numbers = true)]
        next: i32,
        /// Parent node whose link attaches to the placed node
        #[arg(long = "parent")]
        parent: Option<i32>,
        /// Alternative index on a branching parent
        #[arg(long = "alternative")]
        alternative: Option<usize>,
        /// Library for a freshly inserted node
        #[arg(long = "library")]
        library: Option<String>,
        /// Title for a freshly inserted node
        #[arg(long = "title")]
        title: Option<String>,
    },
    /// Remove a node (branching questions take their alternatives along)
    Remove {
        #[arg(long = "id", allow_negative_numbers = true)]
        id: i32,
        /// Also remove the node's descendants
        #[arg(long = "cascade")]
        cascade: bool,
    },
    /// Replace a node in place with a fresh default node
    Replace {
        #[arg(long = "id", allow_negative_numbers = true)]
        id: i32,
        #[arg(long = "library")]
        library: Option<String>,
        #[arg(long = "title")]
        title: Option<String>,
    },
    /// Check the content array against the link invariants
    Validate,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let content = parse_content(&input)?;

    match args.command {
        Command::Layout {
            output_format,
            root,
        } => {
            let tree = layout(&content, root, &config.layout)?;
            match output_format {
                OutputFormat::Json => {
                    let dump = layout_dump_string(&tree)?;
                    write_text(&dump, args.output.as_deref())?;
                }
                OutputFormat::Svg => {
                    let svg = render_svg(&tree, &content, &config.theme, &config.render);
                    write_output_svg(&svg, args.output.as_deref())?;
                }
                OutputFormat::Png => {
                    write_png(&tree, &content, &config, args.output.as_deref())?;
                }
            }
        }
        Command::Place {
            id,
            next,
            parent,
            alternative,
            library,
            title,
        } => {
            let request = PlaceRequest {
                id,
                next_content_id: next,
                parent_id: parent,
                alternative_index: alternative,
                defaults: Some(NodeDefaults {
                    library,
                    params: None,
                    specific: Some(SpecificDefaults {
                        content_title: title,
                    }),
                }),
            };
            let mutated = place(&content, &request)?;
            write_text(&emit_content(&mutated)?, args.output.as_deref())?;
        }
        Command::Remove { id, cascade } => {
            let mutated = if cascade {
                remove(&content, id, true)?
            } else {
                delete(&content, id)?
            };
            write_text(&emit_content(&mutated)?, args.output.as_deref())?;
        }
        Command::Replace { id, library, title } => {
            let defaults = NodeDefaults {
                library,
                params: None,
                specific: Some(SpecificDefaults {
                    content_title: title,
                }),
            };
            let mutated = replace(&content, id, Some(&defaults))?;
            write_text(&emit_content(&mutated)?, args.output.as_deref())?;
        }
        Command::Validate => {
            validate_graph(&content)?;
            eprintln!("ok: {} nodes, links in bounds", content.len());
        }
    }

    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_text(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)?,
        None => println!("{}", text),
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(
    tree: &crate::layout::TreeLayout,
    content: &[crate::ir::ContentNode],
    config: &Config,
    output: Option<&Path>,
) -> Result<()> {
    let output =
        output.ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
    let svg = render_svg(tree, content, &config.theme, &config.render);
    crate::render::write_output_png(&svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(
    _tree: &crate::layout::TreeLayout,
    _content: &[crate::ir::ContentNode],
    _config: &Config,
    _output: Option<&Path>,
) -> Result<()> {
    Err(anyhow::anyhow!(
        "png output requires the 'png' feature"
    ))
}
