use clap::Parser;
use inspect::Config;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::parse();
    let stdout = std::io::stdout();
    inspect::run(&config, &mut stdout.lock())
}
