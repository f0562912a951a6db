//! Presentation Layer
//!
//! Renders a [`StepSnapshot`] to the terminal: status line, distance table,
//! and the edge strip with the just-relaxed edge highlighted. Strictly an
//! observer — nothing in here touches the run state.

use console::style;

use crate::graph::GraphSpec;
use crate::stepper::{Distance, Phase, StepSnapshot};

/// Human-readable status for the current phase, as shown in the header line.
pub fn status_line(snapshot: &StepSnapshot) -> String {
    match snapshot.phase {
        Phase::Initialization => "Initializing distances...".to_string(),
        Phase::Relaxation => format!("Relaxation Pass {}", snapshot.iteration + 1),
        Phase::CycleCheck => "Checking for negative cycles...".to_string(),
        Phase::Complete => {
            if snapshot.has_negative_cycle {
                "Negative Cycle Detected".to_string()
            } else {
                "Algorithm Complete".to_string()
            }
        }
    }
}

/// Render one snapshot. `step` is the number of calls made so far,
/// with 0 being the freshly initialized state.
pub fn render_step(spec: &GraphSpec, snapshot: &StepSnapshot, step: usize) {
    println!();
    println!(
        "{} {}   {}",
        style(format!("[step {:>3}]", step)).dim(),
        style(status_line(snapshot)).bold(),
        style(format!(
            "iteration {} / {}",
            snapshot.iteration, snapshot.iteration_bound
        ))
        .dim(),
    );

    render_distances(snapshot);
    render_edges(spec, snapshot);

    if snapshot.phase == Phase::Complete {
        println!();
        if snapshot.has_negative_cycle {
            println!(
                "{}",
                style("⚠ Negative-weight cycle detected! Shortest paths are undefined.")
                    .yellow()
                    .bold()
            );
        } else {
            println!(
                "{}",
                style("✓ Algorithm complete. No negative cycles found. Shortest paths are valid.")
                    .green()
            );
        }
    }
}

fn render_distances(snapshot: &StepSnapshot) {
    let cells: Vec<String> = snapshot
        .distances
        .iter()
        .map(|(node, distance)| {
            let cell = format!("{}={}", node, distance);
            if snapshot.changed_node.as_deref() == Some(node.as_str()) {
                style(cell).yellow().bold().to_string()
            } else if *distance == Distance::Unreachable {
                style(cell).dim().to_string()
            } else {
                cell
            }
        })
        .collect();

    println!("  distances: {}", cells.join("  "));
}

fn render_edges(spec: &GraphSpec, snapshot: &StepSnapshot) {
    let active = snapshot.active_edge.as_ref();

    let cells: Vec<String> = spec
        .edges
        .iter()
        .map(|edge| {
            let cell = format!("{}→{}({})", edge.from, edge.to, edge.weight);
            let is_active = active.map_or(false, |a| {
                a.from == edge.from && a.to == edge.to && a.weight == edge.weight
            });
            if is_active {
                style(cell).yellow().bold().to_string()
            } else {
                style(cell).dim().to_string()
            }
        })
        .collect();

    println!("  edges:     {}", cells.join("  "));
}
