use crate::app::pipeline::RunOutput;
use crate::domain::Role;
use crate::emu::Registry;

/// Header block for an evaluation run.
pub fn format_run_summary(run: &RunOutput) -> String {
    let mut out = String::new();

    out.push_str("=== mgemu - Modified Gravity Emulator ===\n");
    out.push_str(&format!(
        "Model: {} ({}) | schema {}\n",
        run.family.display_name(),
        run.family.key(),
        run.schema.tag()
    ));
    out.push_str(&format!("Quantity: {}\n", run.quantity.label()));
    out.push_str(&format!("Redshifts: {}\n", fmt_vec(&run.z, 3)));
    out.push_str(&format!(
        "Output: {} z-bins x {} k-modes | k=[{}, {}] h/Mpc\n",
        run.result.zbins(),
        run.result.k.len(),
        fmt_num(run.result.k.first().copied().unwrap_or(f64::NAN)),
        fmt_num(run.result.k.last().copied().unwrap_or(f64::NAN)),
    ));

    out
}

/// One row per wavenumber, one column per redshift bin.
pub fn format_table(run: &RunOutput) -> String {
    let mut out = String::new();

    let mut header = format!("{:>12}", "k [h/Mpc]");
    let mut rule = format!("{:-<12}", "");
    for z in &run.z {
        header.push_str(&format!(" {:>12}", format!("z={z:.3}")));
        rule.push_str(&format!(" {:-<12}", ""));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    for (j, k) in run.result.k.iter().enumerate() {
        let mut line = format!("{:>12}", fmt_num(*k));
        for i in 0..run.result.zbins() {
            line.push_str(&format!(" {:>12}", fmt_num(run.result.values[(i, j)])));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// What a loaded emulator expects from its caller.
pub fn format_registry(registry: &Registry) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{} ({}) | schema {}\n",
        registry.family().display_name(),
        registry.family().key(),
        registry.schema().tag()
    ));
    out.push_str(&format!("Required parameters: {}\n", registry.keys().join(", ")));
    out.push_str(&format!("Boost grid: {}\n", fmt_grid(registry.k())));
    if let Some(lin) = registry.grid(Role::LinPs) {
        out.push_str(&format!("Linear spectrum grid: {}\n", fmt_grid(lin)));
    }

    out.push_str("\nNetworks:\n");
    for (role, model) in registry.roles() {
        out.push_str(&format!(
            "- {:<10} {:<28} {}\n",
            role.as_str(),
            model.name(),
            fmt_grid(model.modes()),
        ));
        out.push_str(&format!("  inputs: {}\n", model.parameters().join(", ")));
    }

    out
}

fn fmt_grid(k: &[f64]) -> String {
    format!(
        "{} modes, k=[{}, {}] h/Mpc",
        k.len(),
        fmt_num(k.first().copied().unwrap_or(f64::NAN)),
        fmt_num(k.last().copied().unwrap_or(f64::NAN)),
    )
}

fn fmt_num(v: f64) -> String {
    let a = v.abs();
    if v == 0.0 || (1e-3..1e4).contains(&a) {
        format!("{v:.6}")
    } else {
        format!("{v:.4e}")
    }
}

fn fmt_vec(v: &[f64], digits: usize) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.digits$}")).collect();
    format!("[{}]", parts.join(", "))
}
