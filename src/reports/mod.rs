use comfy_table::presets::ASCII_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use dagforge::model::Dag;
use dagforge::score::Score;

pub fn print_structure(dag: &Dag) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Node", "Family", "Parents"]);

    for node in 0..dag.num_nodes() {
        let parents = dag
            .parents(node)
            .iter()
            .map(|&p| dag.name(p))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(dag.name(node)),
            Cell::new(dag.node_kind(node).to_string()),
            Cell::new(if parents.is_empty() { "-" } else { parents.as_str() }),
        ]);
    }
    println!("{table}");
}

pub fn print_local_scores(dag: &Dag, score: &dyn Score) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Node", "Local Score"]);

    let mut total = 0.0;
    for node in 0..dag.num_nodes() {
        let local = score.local_score(dag, node);
        total += local;
        table.add_row(vec![
            Cell::new(dag.name(node)),
            Cell::new(format!("{:.4}", local)).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL"),
        Cell::new(format!("{:.4}", total)).set_alignment(CellAlignment::Right),
    ]);
    println!("{table}");
}

/// Learned-vs-reference arc comparison: shared, reversed, extra and missing
/// arcs, matched by node name so the two graphs may order nodes differently.
pub fn print_comparison(learned: &Dag, reference: &Dag) {
    let name_arcs = |dag: &Dag| -> std::collections::HashSet<(String, String)> {
        dag.arcs()
            .into_iter()
            .map(|(s, t)| (dag.name(s).to_string(), dag.name(t).to_string()))
            .collect()
    };
    let learned_arcs = name_arcs(learned);
    let reference_arcs = name_arcs(reference);

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_header(vec!["Arc", "Status"]);

    let mut rows: Vec<(String, &str)> = Vec::new();
    for (s, t) in &learned_arcs {
        let status = if reference_arcs.contains(&(s.clone(), t.clone())) {
            "shared"
        } else if reference_arcs.contains(&(t.clone(), s.clone())) {
            "reversed"
        } else {
            "extra"
        };
        rows.push((format!("{} -> {}", s, t), status));
    }
    for (s, t) in &reference_arcs {
        if !learned_arcs.contains(&(s.clone(), t.clone()))
            && !learned_arcs.contains(&(t.clone(), s.clone()))
        {
            rows.push((format!("{} -> {}", s, t), "missing"));
        }
    }
    rows.sort();
    for (arc, status) in rows {
        table.add_row(vec![arc, status.to_string()]);
    }
    println!("{table}");
}
