/// Example program to print the loaded configuration
///
/// Run with: cargo run -p edge-config --example print_config

fn main() {
    // Load configuration from edge.toml
    let config = edge_config::EdgeConfig::load();

    println!("=== Edge Configuration ===\n");

    println!("Registry Settings:");
    println!("  Namespace: {}", config.registry.namespace);
    println!("  Flush Delay (ms): {}", config.registry.flush_delay_ms);
    println!();

    println!("Logging Settings:");
    println!("  Filter: {:?}", config.logging.filter);
    println!();

    println!("Runner Settings:");
    println!("  Scenario: {:?}", config.runner.scenario);
    println!("  Print Stylesheet: {}", config.runner.print_stylesheet);
}
