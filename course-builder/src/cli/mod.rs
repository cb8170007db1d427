//! Command-line harness around the course builder

pub mod handler;
pub mod outline;

pub use handler::handle_command;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::api::models::MaterialType;
use crate::builder::ItemRef;

#[derive(Debug, Parser)]
#[command(name = "course-builder", version, about = "Arrange course sections and materials")]
pub struct Cli {
    /// Course to operate on
    #[arg(long, global = true, env = "COURSE_BUILDER_COURSE")]
    pub course: Option<i64>,

    /// Path to a config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the course outline
    Show,

    /// Drop one item onto another, e.g. --item material:4 --onto section:2
    Move {
        #[arg(long)]
        item: ItemRef,
        #[arg(long)]
        onto: ItemRef,
    },

    /// Append a section to the course
    AddSection {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
    },

    /// Append a material to a section
    AddMaterial {
        #[arg(long)]
        section: i64,
        #[arg(long)]
        title: String,
        #[arg(long = "type")]
        material_type: MaterialType,
        #[arg(long)]
        url: String,
        /// Seconds; only kept for videos
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long)]
        required: bool,
        #[arg(long)]
        description: Option<String>,
    },

    /// Change a section's title and description
    EditSection {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
    },

    /// Replace a material's content; its position is kept
    EditMaterial {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long = "type")]
        material_type: MaterialType,
        #[arg(long)]
        url: String,
        /// Seconds; only kept for videos
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long)]
        required: bool,
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a section and all of its materials
    DeleteSection {
        #[arg(long)]
        id: i64,
    },

    /// Delete a single material
    DeleteMaterial {
        #[arg(long)]
        id: i64,
    },
}
