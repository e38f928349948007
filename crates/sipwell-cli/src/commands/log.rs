use chrono::Utc;

/// Append one drink to today's log.
pub fn run(amount: Option<u32>) -> Result<(), Box<dyn std::error::Error>> {
    let (mut coordinator, _store) = super::open_coordinator()?;
    let settings = coordinator.get_settings(None)?;
    let amount = amount.unwrap_or(settings.intake);

    let (_, mut today) = coordinator.get_today(None)?;
    today.log_intake(amount, Utc::now());
    coordinator.set_today(today.clone())?;

    println!(
        "logged {amount} {} -- {} / {} {} today",
        today.measurement, today.intake, today.goal, today.measurement
    );
    if today.goal_reached() {
        println!("daily goal reached!");
    }
    Ok(())
}
