use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Marcel Kempenaar, Niels van der Vegt",
    version,
    about = "povmol - build POV-Ray scenes and animations of molecules read from PDB files.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to compute frames.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print an overview of the atoms, bonds and element styles of a PDB file.
    Inspect(InspectArgs),
    /// Write one POV-Ray scene file per animation frame.
    Render(RenderArgs),
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the PDB file.
    #[arg(required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Keep the file coordinates instead of moving the centroid to the origin.
    #[arg(long)]
    pub no_center: bool,

    /// Translation applied before centering, as "x,y,z".
    #[arg(long, value_name = "X,Y,Z", allow_hyphen_values = true)]
    pub offset: Option<String>,

    /// Also print the POV-Ray objects of the molecule.
    #[arg(long)]
    pub sdl: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMode {
    /// Element symbols.
    Names,
    /// Atom indices.
    Indices,
    /// Both element symbols and indices.
    Both,
}

/// Arguments for the `render` subcommand.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Path to the scene configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// PDB file to animate, overriding `molecule.pdb-path`.
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Directory the scene files are written to, overriding `output.directory`.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// File name prefix for the scene files, overriding `output.prefix`.
    #[arg(long, value_name = "NAME")]
    pub prefix: Option<String>,

    /// Frames to render, e.g. "20..40", "0..=10" or "0,5,9". Defaults to all frames.
    #[arg(short, long, value_name = "FRAMES")]
    pub frames: Option<String>,

    /// Override the number of frames in the animation.
    #[arg(short = 'n', long, value_name = "INT")]
    pub number_frames: Option<usize>,

    /// Label every atom, overriding the render section of the config file.
    #[arg(long, value_enum, value_name = "MODE")]
    pub labels: Option<LabelMode>,

    /// Draw a ball-and-stick model with the given scale factor.
    #[arg(long, value_name = "FLOAT")]
    pub stick: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S frames.number-frames=60
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
