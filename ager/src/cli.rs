use crate::config::Config;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Ages scanned documents with stains, folds, cracks and grime.
#[derive(Parser, Debug)]
#[command(name = "ager", version, about)]
pub struct Cli {
    /// Log per-mark and per-effect decisions
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of the per-user ager.toml
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Age one or more images
    Age {
        /// Source images
        #[arg(required = true, value_name = "FILE")]
        inputs: Vec<PathBuf>,

        /// Directory for `{name}_aged.{ext}` files
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Pack every result into one .tar.gz instead of separate files
        #[arg(long, value_name = "FILE")]
        archive: Option<PathBuf>,

        #[command(flatten)]
        options: AgingOptions,
    },

    /// Synthesize aged manuscript pages on blank paper
    Samples {
        /// Directory for the generated pages
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Number of pages to generate
        #[arg(long, default_value_t = 4)]
        count: usize,

        #[command(flatten)]
        options: AgingOptions,
    },

    /// Print the effective configuration as TOML
    Config {
        #[command(flatten)]
        options: AgingOptions,
    },
}

/// Overrides for values otherwise taken from the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct AgingOptions {
    /// light, medium, heavy or extreme
    #[arg(short, long)]
    pub level: Option<String>,

    /// Number of marks per page (1-20)
    #[arg(short, long)]
    pub marks: Option<u32>,

    /// Global mark intensity (0.2-1.5)
    #[arg(short, long)]
    pub intensity: Option<f32>,

    /// Draw from the five basic archetypes only
    #[arg(long)]
    pub basic: bool,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// png, jpeg, bmp or tiff
    #[arg(short, long)]
    pub format: Option<String>,

    /// Resolution written into the file (72-600)
    #[arg(long)]
    pub dpi: Option<u32>,

    /// Maximum encoded size in bytes
    #[arg(long)]
    pub budget: Option<usize>,
}

impl AgingOptions {
    pub fn apply(&self, config: &mut Config) {
        if let Some(level) = &self.level {
            config.aging.level = level.clone();
        }

        if let Some(marks) = self.marks {
            config.aging.marks = marks;
        }

        if let Some(intensity) = self.intensity {
            config.aging.intensity = intensity;
        }

        if self.basic {
            config.aging.archetype_set = "basic".to_string();
        }

        if let Some(format) = &self.format {
            config.output.format = format.clone();
        }

        if let Some(dpi) = self.dpi {
            config.output.dpi = dpi;
        }

        if let Some(budget) = self.budget {
            config.output.byte_budget = budget;
        }
    }
}
