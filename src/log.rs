use crate::input::HindcastConfig;
use std::time::Duration;

pub fn show_greeting(command: &str) {
    println!("=== EOF Hindcast Skill ===");
    println!("Command: {}", command);
}

pub fn config_echo(config: &HindcastConfig) {
    println!("\nConfiguration:");
    println!("  Retained modes: {}", config.modes);
    println!("  Train window: {}", config.train);
    println!("  Test window: {}", config.test);
    println!("  Region: {}", config.region);

    let inputs = &config.inputs;
    let show = |name: &str, value: &Option<String>| {
        println!("  {}: {}", name, value.as_deref().unwrap_or("(not set)"));
    };
    show("U", &inputs.u);
    show("S", &inputs.s);
    show("VT", &inputs.vt);
    if inputs.transpose_vt {
        println!("    (stored time-major, transposed on load)");
    }
    show("Series", &inputs.series);
    println!(
        "    columns: {} (time), {} (value)",
        inputs.time_column, inputs.value_column
    );
    if let Some(predictions) = &config.predictions {
        println!("  Predictions output: {}", predictions);
    }
}

pub fn show_farewell_with_timing(elapsed: Duration) {
    println!(
        "\n=== Completed successfully in {:.3} s ===",
        elapsed.as_secs_f64()
    );
}
