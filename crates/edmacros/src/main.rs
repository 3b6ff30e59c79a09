use clap::Parser;

fn main() -> anyhow::Result<()> {
    edmacros::init();

    let cli = edmacros::cli::Cli::parse();
    cli.run()
}
