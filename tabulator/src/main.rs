use clap::Parser;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod measurements;
mod report;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Airsoft safety table generator and drag analysis")]
struct Args {
    /// Load a workflow config from YAML; the table flags below are then ignored
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Table preset: vsaf-2020, classic-2020 or classic-2020-cd04
    #[arg(long, default_value = "vsaf-2020")]
    preset: String,
    /// Override the preset's drag coefficient
    #[arg(long)]
    drag_coefficient: Option<f64>,
    /// Preset to compare the generated table against
    #[arg(long)]
    compare_with: Option<String>,
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,
    /// Render the HTML table in feet per second
    #[arg(long, default_value_t = false)]
    fps: bool,
    /// Fit the drag coefficient against generated chronograph series
    #[arg(long, default_value_t = false)]
    synthetic_fit: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(
            &args.preset,
            args.drag_coefficient,
            args.compare_with,
            args.output_dir,
            args.fps,
            args.synthetic_fit,
        )
    };

    let runner = Runner::new(workflow_config);
    let result = runner.execute()?;

    println!(
        "{} -> {}x{} table, drag coefficient {:.5}, drag constant {}",
        result.definition.title,
        result.table.shape().0,
        result.table.shape().1,
        result.definition.drag_coefficient,
        result.drag
    );
    if let Some(estimate) = &result.fit {
        println!(
            "Final result, drag coefficient: {:.5} +- {:.6} ({} datasets, {} excluded)",
            estimate.drag_coefficient,
            estimate.std_dev,
            estimate.fits.len(),
            estimate.excluded.len()
        );
    }
    for path in runner.write_reports(&result)? {
        println!("wrote {}", path.display());
    }

    Ok(())
}
