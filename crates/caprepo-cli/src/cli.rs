//! CLI type definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "caprepo")]
#[command(about = "Capability repository - find and cache resource metadata", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Storage directory, overriding the configuration
    #[arg(long, global = true, env = "CAPREPO_STORAGE_DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Local Maven repository root, overriding the configuration
    #[arg(long, global = true, env = "CAPREPO_MAVEN_REPOSITORY")]
    pub maven_repository: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find capabilities satisfying a requirement
    Find {
        /// Requirement namespace
        #[arg(short, long)]
        namespace: String,

        /// Filter expression, e.g. "(osgi.identity=org.example.core)"
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Resolve maven coordinates, caching the result
    Resolve {
        /// Coordinates groupId:artifactId[:type[:classifier]]:version
        coordinates: String,
    },

    /// List stored resources
    List,

    /// Show storage statistics
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}
