//! Terminal output formatting.

use colored::Colorize;
use zdb_graph::{ExportReport, PassReport};

/// Print the end-of-run summary.
pub fn print_report(report: &ExportReport, target: &str) {
    println!("{}", "─".repeat(60));
    println!(
        "{:<12} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "Kind", "Visited", "Skipped", "Nodes", "Linked", "Unlinked"
    );

    for pass in &report.passes {
        print_pass(pass);
    }

    println!("{}", "─".repeat(60));

    match &report.graph {
        Some(counts) => println!(
            "  {} now holds {} nodes, {} relationships",
            target.cyan(),
            counts.nodes.to_string().bold(),
            counts.relationships.to_string().bold()
        ),
        None => println!("  {} {}", target.cyan(), "counts unavailable".dimmed()),
    }

    let skipped = report.skipped();
    if skipped > 0 {
        println!(
            "  {} {} undecodable record(s) skipped",
            "!".yellow().bold(),
            skipped.to_string().yellow()
        );
    }

    let elapsed = report.finished_at - report.started_at;
    println!("  {}", format!("Finished in {} ms", elapsed.num_milliseconds()).dimmed());
}

fn print_pass(pass: &PassReport) {
    let skipped = if pass.skipped > 0 {
        pass.skipped.to_string().yellow()
    } else {
        pass.skipped.to_string().normal()
    };

    println!(
        "{:<12} {:>9} {:>9} {:>9} {:>9} {:>9}",
        pass.kind.as_str().green(),
        pass.visited,
        skipped,
        pass.nodes_created,
        pass.edges_linked,
        pass.links_unmatched
    );
}
