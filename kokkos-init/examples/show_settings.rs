//! Resolve settings from this process's arguments and environment and print
//! them along with the devices that would be used.
//!
//! Run with:
//!
//! ```bash
//! cargo run --example show_settings -- --kokkos-num-devices=4,1 --kokkos-tune-internals
//! KOKKOS_VISIBLE_DEVICES=2,1 cargo run --example show_settings
//! RUST_LOG=debug cargo run --example show_settings -- --kokkos-help
//! ```

use kokkos_init::{get_visible_devices, resolve_from_process, select_device};
use tracing_subscriber::EnvFilter;

/// Stand-in for a driver query; real runtimes ask the device API
const HARDWARE_DEVICE_COUNT: i32 = 4;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let resolved = resolve_from_process()?;
    let settings = &resolved.settings;

    println!("Resolved settings:\n{}", settings);
    println!("Threads to use: {}", settings.num_threads_or_default());
    println!("Unconsumed arguments: {:?}", resolved.remaining_args);

    let visible = get_visible_devices(settings, HARDWARE_DEVICE_COUNT);
    println!(
        "\nVisible devices (hardware reports {}): {:?}",
        HARDWARE_DEVICE_COUNT, visible
    );
    match select_device(settings, &visible) {
        Ok(device) => println!("Selected device: {}", device),
        Err(e) => println!("No device selected: {}", e),
    }

    Ok(())
}
