/// Show today's progress.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (mut coordinator, _store) = super::open_coordinator()?;
    let (date_key, today) = coordinator.get_today(None)?;

    println!("{date_key}");
    println!(
        "  {} / {} {} ({} drinks)",
        today.intake,
        today.goal,
        today.measurement,
        today.logs.len()
    );
    if today.goal_reached() {
        println!("  goal reached");
    } else {
        println!("  {} {} to go", today.remaining(), today.measurement);
    }
    Ok(())
}
