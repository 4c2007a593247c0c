use vesta_domain::services::strategy::StrategyKind;

pub(super) fn run_strategies() -> Result<(), String> {
    print!("{}", render_strategies());
    Ok(())
}

fn render_strategies() -> String {
    let mut out = String::from("Available strategies:\n");
    for kind in StrategyKind::ALL {
        out.push_str(&format!("  {:<22} {}\n", kind.id(), kind.description()));
    }
    out
}
