use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use skumatch_core::config::CatalogConfig;
use skumatch_core::{BuildProgress, Catalog};
use tracing::debug;

use super::report;

fn active_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "  {bar:30.cyan/blue} {spinner:.green} {pos:>5}/{len:<5} {prefix:.dim} {msg}",
    )
    .unwrap()
    .progress_chars("━╸─")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("  {spinner:.green} {prefix:.dim} {msg}").unwrap()
}

fn done_style() -> ProgressStyle {
    ProgressStyle::with_template("  {bar:30.green} {prefix:.green} {msg:.dim}").unwrap()
}

pub fn run(config: CatalogConfig, show_unmatched: bool) -> Result<()> {
    let output_paths = config.output.clone();
    let catalog = Catalog::new(config).context("invalid configuration")?;

    let mp = MultiProgress::new();
    let mut active_pb: Option<ProgressBar> = None;
    let mut unmatched_count: u64 = 0;

    let output = catalog.build(Some(&mut |progress| match progress {
        BuildProgress::IndexStart { root } => {
            mp.println(String::new()).ok();
            mp.println(format!("  Indexing {root}")).ok();

            let pb = mp.add(ProgressBar::new_spinner());
            pb.set_style(spinner_style());
            pb.set_prefix("Scanning");
            pb.enable_steady_tick(std::time::Duration::from_millis(80));
            active_pb = Some(pb);
        }
        BuildProgress::IndexComplete {
            images,
            keys,
            folders,
        } => {
            if let Some(pb) = active_pb.take() {
                pb.finish_and_clear();
                mp.remove(&pb);
            }
            mp.println(format!(
                "  Indexed {images} images under {keys} keys in {folders} folders"
            ))
            .ok();
        }
        BuildProgress::RowsLoaded { count } => {
            let pb = mp.add(ProgressBar::new(count as u64));
            pb.set_style(active_style());
            pb.set_prefix("Resolving");
            pb.set_message(String::new());
            pb.enable_steady_tick(std::time::Duration::from_millis(80));
            active_pb = Some(pb);
        }
        BuildProgress::ProductResolved { sku, matched } => {
            if !matched {
                unmatched_count += 1;
            }
            if let Some(ref pb) = active_pb {
                pb.set_message(sku);
                pb.inc(1);
            }
        }
        BuildProgress::PhaseComplete { phase } => {
            debug!(%phase, "phase complete");
            if phase == "assembly" {
                if let Some(pb) = active_pb.take() {
                    let total = pb.length().unwrap_or(0);
                    pb.set_style(done_style());
                    pb.set_prefix("done");
                    pb.finish_with_message(format!(
                        "Resolved {total} products ({unmatched_count} without images)"
                    ));
                }
            }
        }
    }))?;

    output
        .write(&output_paths)
        .context("failed to write catalog outputs")?;

    report::print_summary(&output.summary);
    if show_unmatched {
        report::print_unmatched(&output.unmatched);
    }

    println!();
    println!("  Products: {}", output_paths.products.display());
    println!("  Report:   {}", output_paths.report.display());
    println!();
    Ok(())
}
