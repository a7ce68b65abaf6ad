//! QuantumFlow engine - CLI entry point.

fn main() -> anyhow::Result<()> {
    quantumflow_runner::run()
}
