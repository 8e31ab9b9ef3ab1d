use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use ps_impose::constants::{DEFAULT_DRAW_WIDTH, DEFAULT_TOLERANCE, IDENTITY_SPEC};
use ps_impose::{
    ImposeError, NupOptions, PageSize, PaperSize, Selection, TransformOptions,
    parse_absolute_dimension, parse_paper, parse_ranges, parse_specs,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "pst",
    about = "Rearrange and impose pages of PostScript and PDF documents",
    version
)]
struct Cli {
    /// Report each output page as it is written
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select, reorder, rotate, scale and combine pages
    Pstops {
        /// Page specifications; `0` keeps every page as it is
        #[arg(short = 'S', long, default_value = IDENTITY_SPEC)]
        specs: String,

        /// Select the given page ranges, e.g. `1-4,_,_2-_1`
        #[arg(short = 'R', long)]
        pages: Option<String>,

        /// Select even-numbered pages
        #[arg(short, long)]
        even: bool,

        /// Select odd-numbered pages
        #[arg(short, long)]
        odd: bool,

        /// Reverse the order of the selected pages
        #[arg(short, long)]
        reverse: bool,

        #[command(flatten)]
        paper: PaperArgs,

        /// Draw a line of the given width around each page [default: 1pt]
        #[arg(short, long, value_name = "DIMENSION", num_args = 0..=1, default_missing_value = "")]
        draw: Option<String>,

        /// Input file (standard input if omitted)
        infile: Option<PathBuf>,

        /// Output file (standard output if omitted)
        outfile: Option<PathBuf>,
    },

    /// Put several pages on each sheet
    Psnup {
        /// Number of pages to impose on each output page
        #[arg(short = 'n', long = "nup", value_name = "NUMBER")]
        nup: usize,

        #[command(flatten)]
        paper: PaperArgs,

        /// Margin around the whole output page
        #[arg(short, long, value_name = "DIMENSION", default_value = "0")]
        margin: String,

        /// Border around each input page
        #[arg(short, long, value_name = "DIMENSION", default_value = "0")]
        border: String,

        /// Draw a line of the given width around each page [default: 1pt]
        #[arg(short, long, value_name = "DIMENSION", num_args = 0..=1, default_missing_value = "")]
        draw: Option<String>,

        /// Input pages are rotated left
        #[arg(short = 'l', long = "rotatedleft")]
        rotated_left: bool,

        /// Input pages are rotated right
        #[arg(short = 'r', long = "rotatedright")]
        rotated_right: bool,

        /// Swap output width and height
        #[arg(short, long)]
        flip: bool,

        /// Fill columns before rows
        #[arg(short = 'c', long)]
        transpose: bool,

        /// Largest wasted area accepted, in square points
        #[arg(short, long, default_value_t = DEFAULT_TOLERANCE)]
        tolerance: f64,

        /// Input file (standard input if omitted)
        infile: Option<PathBuf>,

        /// Output file (standard output if omitted)
        outfile: Option<PathBuf>,
    },
}

#[derive(Args)]
struct PaperArgs {
    /// Output paper name or WIDTHxHEIGHT
    #[arg(short, long)]
    paper: Option<String>,

    /// Input paper name or WIDTHxHEIGHT
    #[arg(short = 'P', long)]
    inpaper: Option<String>,

    /// Output page width
    #[arg(short = 'W', long, value_name = "DIMENSION")]
    width: Option<String>,

    /// Output page height
    #[arg(short = 'H', long, value_name = "DIMENSION")]
    height: Option<String>,

    /// Input page width
    #[arg(long, value_name = "DIMENSION")]
    inwidth: Option<String>,

    /// Input page height
    #[arg(long, value_name = "DIMENSION")]
    inheight: Option<String>,
}

impl PaperArgs {
    fn output_size(&self) -> ps_impose::Result<Option<PageSize>> {
        resolve_size(&self.paper, &self.width, &self.height, "output")
    }

    fn input_size(&self) -> ps_impose::Result<Option<PageSize>> {
        resolve_size(&self.inpaper, &self.inwidth, &self.inheight, "input")
    }
}

fn resolve_size(
    paper: &Option<String>,
    width: &Option<String>,
    height: &Option<String>,
    which: &str,
) -> ps_impose::Result<Option<PageSize>> {
    if let Some(paper) = paper {
        return parse_paper(paper).map(Some);
    }
    match (width, height) {
        (Some(width), Some(height)) => Ok(Some(PageSize::new(
            parse_absolute_dimension(width)?,
            parse_absolute_dimension(height)?,
        ))),
        (None, None) => Ok(None),
        _ => Err(ImposeError::Config(format!(
            "{which} page width and height must both be set, or neither"
        ))),
    }
}

/// Line width for `--draw`; a bare flag draws the default width
fn parse_draw(draw: Option<&str>) -> ps_impose::Result<f64> {
    match draw {
        None => Ok(0.0),
        Some("") => Ok(DEFAULT_DRAW_WIDTH),
        Some(width) => parse_absolute_dimension(width),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Exit status for a failed run: the library's own status when the
/// failure came from it, 1 otherwise
fn exit_status(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ImposeError>())
        .map_or(1, |cause| cause.exit_code() as u8)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };
    init_logging(cli.verbose, cli.quiet);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pst: {err:#}");
            ExitCode::from(exit_status(&err))
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Pstops {
            specs,
            pages,
            even,
            odd,
            reverse,
            paper,
            draw,
            infile,
            outfile,
        } => {
            let output_size = paper.output_size()?;
            let input_size = paper.input_size()?;
            let specs = parse_specs(
                &specs,
                output_size.map(|size| size.width),
                output_size.map(|size| size.height),
            )?;
            if let Some(pages) = &pages {
                parse_ranges(pages)?;
            }

            let options = TransformOptions {
                output_size,
                input_size,
                draw: parse_draw(draw.as_deref())?,
                ..Default::default()
            };
            let selection = Selection {
                ranges: pages,
                odd,
                even,
                reverse,
            };

            let input = ps_impose::read_input(infile.as_deref()).await?;
            let (output, stats) =
                ps_impose::rearrange_bytes(input, specs, options, selection).await?;
            ps_impose::write_output(outfile.as_deref(), &output).await?;

            log::info!(
                "{} of {} input pages selected, {} blank placements",
                stats.selected_pages,
                stats.source_pages,
                stats.blank_placements
            );
        }

        Commands::Psnup {
            nup,
            paper,
            margin,
            border,
            draw,
            rotated_left,
            rotated_right,
            flip,
            transpose,
            tolerance,
            infile,
            outfile,
        } => {
            let nup_options = NupOptions {
                pages: nup,
                margin: parse_absolute_dimension(&margin)?,
                border: parse_absolute_dimension(&border)?,
                tolerance,
                column_major: transpose,
                rotated_left,
                rotated_right,
                flip,
            };
            nup_options.validate()?;
            let draw = parse_draw(draw.as_deref())?;

            let input = ps_impose::read_input(infile.as_deref()).await?;

            let mut input_size = paper.input_size()?;
            if input_size.is_none() {
                input_size = ps_impose::probe_input_size(&input)
                    .context("cannot read input page size")?;
            }
            let output_size = paper
                .output_size()?
                .or(input_size)
                .or_else(|| PaperSize::system_default().map(PaperSize::size))
                .ok_or_else(|| {
                    ImposeError::Config(
                        "output page size not set, and could not get default paper size"
                            .to_string(),
                    )
                })?;
            let input_size = input_size.unwrap_or(output_size);

            let layout = ps_impose::plan_nup(&nup_options, output_size, input_size)?;
            let specs = layout.spec_set()?;
            let options = TransformOptions {
                output_size: Some(layout.output_size),
                input_size: Some(input_size),
                draw,
                ..Default::default()
            };

            let (output, _) =
                ps_impose::rearrange_bytes(input, specs, options, Selection::default()).await?;
            ps_impose::write_output(outfile.as_deref(), &output).await?;
        }
    }

    Ok(())
}
