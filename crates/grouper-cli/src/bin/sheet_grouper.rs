use anyhow::Result;

fn main() -> Result<()> {
    grouper_cli::init_logging();
    grouper_cli::run()
}
