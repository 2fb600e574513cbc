use std::io::{self, BufRead, Write};
use warehouse_sim::core::execution::config::parse_drain_limit;
use warehouse_sim::{SimulationConfig, SimulationEngine};

/// Drain limit from the first argument, or asked for on stdin
fn read_drain_limit() -> Result<Option<u64>, Box<dyn std::error::Error>> {
    let input = match std::env::args().nth(1) {
        Some(arg) => arg,
        None => {
            print!("Enter the number of trucks to load (-1 for unbounded mode): ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line
        }
    };
    Ok(parse_drain_limit(&input)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger without timestamps for cleaner output
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .init();

    let drain_limit = read_drain_limit()?;
    let config = SimulationConfig::default().with_drain_limit(drain_limit);

    println!("Configuration:");
    println!("  Base rate: {} units/hour", config.base_rate);
    for source in &config.sources {
        println!("  Factory {}: x{:.1}", source.name, source.rate_multiplier);
    }
    println!(
        "  Warehouse capacity: {} (M = {})",
        config.warehouse_capacity(),
        config.capacity_multiplier
    );
    println!("  Truck capacities: {:?}", config.pull_capacities);
    match config.drain_limit {
        Some(limit) => println!("  Trucks to load: {}", limit),
        None => println!("  Trucks to load: unbounded"),
    }
    println!();

    let mut engine = SimulationEngine::new(config)?;
    let report = engine.run()?;

    println!();
    for line in report.shipments.report_lines() {
        println!("{}", line);
    }
    for consumer in &report.consumers {
        match consumer.average_load() {
            Some(average) => println!(
                "{}: {} drains, {:.2} units on average",
                consumer.name, consumer.drains, average
            ),
            None => println!("{}: no drains", consumer.name),
        }
    }

    Ok(())
}
