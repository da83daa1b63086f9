use color_eyre::Result;

use crate::{
    barcode::OpenFoodFactsConfig,
    mailer::MailerConfig,
    state::{AdminConfig, AppConfig, VersionInfo},
};

fn configured(value: bool) -> &'static str {
    if value {
        "configured"
    } else {
        "not configured"
    }
}

pub(crate) fn print_info() -> Result<()> {
    let versions = VersionInfo::current();
    let app = AppConfig::from_env()?;

    println!("{} {}", versions.name, versions.version);
    println!();
    println!("Base URL:        {}", app.base_url);
    println!("CORS origins:    {}", app.cors_origins.join(", "));
    println!(
        "Database:        {}",
        configured(std::env::var("DATABASE_URL").is_ok())
    );
    println!(
        "Admin token:     {}",
        configured(AdminConfig::from_env().token.is_some())
    );
    println!(
        "OpenAI:          {}",
        configured(openai::OpenAiConfig::from_env().is_ok())
    );
    println!(
        "Email:           {}",
        configured(MailerConfig::from_env().is_some())
    );
    println!(
        "Open Food Facts: {}",
        OpenFoodFactsConfig::from_env().base_url
    );

    Ok(())
}
