use clap::Subcommand;
use color_eyre::Result;

pub(crate) mod info;
pub(crate) mod seed;
pub(crate) mod serve;

#[derive(Subcommand, Default)]
pub(crate) enum Command {
    /// Run the HTTP API and the job worker (default)
    #[default]
    Serve,
    /// Replace every recipe with the sample recipes
    SeedRecipes,
    /// Print version and configuration summary
    Info,
}

impl Command {
    pub(crate) async fn run(&self) -> Result<()> {
        match self {
            Command::Serve => serve::serve().await,
            Command::SeedRecipes => seed::seed_recipes().await,
            Command::Info => info::print_info(),
        }
    }
}
