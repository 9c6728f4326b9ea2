//! Console rendering of extracted papers

use comfy_table::{
    Cell, Color, ContentArrangement, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
};
use pharmapub_filter::{ExtractedPaper, FIELD_NAMES, Summary};

/// Two-column field/value table for one paper; list fields one entry per line
pub fn paper_table(paper: &ExtractedPaper) -> Table {
    let values = [
        paper.pubmed_id.clone(),
        paper.title.clone(),
        paper.publication_date.clone(),
        paper.authors.join("\n"),
        paper.company_affiliations.join("\n"),
        paper.corresponding_author_email.clone(),
    ];

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Field").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);
    for (name, value) in FIELD_NAMES.iter().zip(values) {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }
    table
}

/// Print every paper to stdout
pub fn print_papers(papers: &[ExtractedPaper]) {
    for paper in papers {
        println!("{}", paper_table(paper));
    }
}

/// Run counters on stderr
pub fn print_summary(summary: &Summary) {
    let rows = [
        (
            "Papers",
            format!("{}/{} extracted", summary.extracted, summary.total_ids),
        ),
        (
            "Failures",
            format!(
                "{} fetch, {} extraction",
                summary.fetch_failures, summary.extract_failures
            ),
        ),
        ("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())),
    ];

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Summary").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    eprintln!("\n{table}");
}
