//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use toolbox_core::{Quality, ThreadCount};
use toolbox_tools::svg::DEFAULT_COMPONENT_NAME;

/// Image-to-WebP converter and everyday text utilities
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands, one per tool
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Convert images to WebP
    #[command(visible_alias = "c")]
    Convert {
        /// Images to convert; non-images and WebP files are skipped
        #[arg(required = true, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
        files: Vec<PathBuf>,

        /// WebP quality, 1-100 [env: TOOLBOX_QUALITY, default: 80]
        #[arg(short, long)]
        quality: Option<Quality>,

        /// Number of parallel workers, 1-16 [env: TOOLBOX_THREADS, default: 4]
        #[arg(short = 'j', long)]
        threads: Option<ThreadCount>,

        /// Output directory [env: TOOLBOX_OUT_DIR, default: .]
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        out_dir: Option<PathBuf>,
    },

    /// List the available tools, or show one by id
    Tools {
        /// Tool id; unknown ids resolve to the image converter
        id: Option<String>,
    },

    /// Base64 encode or decode
    #[command(visible_alias = "b64")]
    Base64 {
        #[command(subcommand)]
        action: Base64Action,
    },

    /// Pretty-print JSON, optionally as a collapsible tree
    Json {
        /// JSON text; read from stdin when omitted or `-`
        input: Option<String>,

        /// Render as a tree instead of plain indented text
        #[arg(short, long)]
        tree: bool,

        /// Expand a tree path (e.g. `root.items`); repeatable
        #[arg(short, long = "expand", value_name = "PATH")]
        expand: Vec<String>,

        /// Expand every container in the tree
        #[arg(short = 'a', long)]
        expand_all: bool,
    },

    /// Run a JavaScript function body and print its stringified result
    #[command(visible_alias = "js")]
    Exec {
        /// Script; read from stdin when omitted or `-`
        input: Option<String>,
    },

    /// Byte, character, word and line counts
    Stats {
        /// Text; read from stdin when omitted or `-`
        input: Option<String>,
    },

    /// Turn SVG markup into a React component
    Svg {
        /// SVG markup; read from stdin when omitted or `-`
        input: Option<String>,

        /// Component name
        #[arg(short, long, default_value = DEFAULT_COMPONENT_NAME)]
        name: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum Base64Action {
    /// Encode UTF-8 text
    Encode {
        /// Text; read from stdin when omitted or `-`
        input: Option<String>,
    },
    /// Decode to UTF-8 text
    Decode {
        /// Base64; read from stdin when omitted or `-`
        input: Option<String>,
    },
    /// Decode a data URI or bare Base64 payload into an image file
    DecodeImage {
        /// Data URI or Base64; read from stdin when omitted or `-`
        input: Option<String>,

        /// File to write the decoded bytes to
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: PathBuf,
    },
    /// Encode an image file as a data URI
    Image {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        path: PathBuf,

        /// Print only the payload, without the `data:` prefix
        #[arg(long)]
        raw: bool,
    },
}
