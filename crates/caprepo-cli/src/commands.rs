//! Command implementations

use crate::cli::{Commands, OutputFormat};
use crate::config::CliConfig;
use anyhow::{Context, Result};
use caprepo_core::{Capability, CapabilityRef, MavenCoordinates, Requirement, Resource};
use caprepo_repository::{
    AggregatingRepository, FileStorage, LocalMavenResolver, MavenDelegateRepository,
    PersistentRepository, QueryOutcome,
};
use serde::Serialize;
use std::io::Write;
use tracing::info;

/// Assemble the repository stack
///
/// A persistent cache in the storage directory in front of an aggregator
/// holding the maven delegate.
pub fn build_repository(config: &CliConfig) -> Result<PersistentRepository> {
    config.repository.validate()?;
    let name = config.repository.name.clone();

    let mut origin = AggregatingRepository::new(format!("{}-aggregator", name));
    match config.maven_repository() {
        Some(root) => {
            let resolver = LocalMavenResolver::new(&root)?;
            info!("Resolving maven artifacts from {}", resolver.root().display());
            origin.add_repository(MavenDelegateRepository::new("maven", resolver));
        }
        None => info!("No maven repository configured"),
    }

    let storage_dir = config.repository.resolve_storage_dir()?;
    let storage = FileStorage::new(name.clone(), &storage_dir)?;
    info!("Repository storage at {}", storage.path().display());

    Ok(PersistentRepository::new(name, storage, origin))
}

/// A capability as printed: the capability plus a summary of its resource
#[derive(Serialize)]
struct ProviderView<'a> {
    capability: &'a Capability,
    resource: Option<String>,
    content_url: Option<&'a str>,
}

impl<'a> From<&'a CapabilityRef> for ProviderView<'a> {
    fn from(capability: &'a CapabilityRef) -> Self {
        Self {
            capability: capability.capability(),
            resource: capability.resource().identity_key(),
            content_url: capability.resource().content_url(),
        }
    }
}

fn print<T: Serialize>(format: OutputFormat, value: &T) -> Result<()> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", text.trim_end())?;
    Ok(())
}

fn print_outcome(format: OutputFormat, outcome: &QueryOutcome) -> Result<()> {
    for warning in &outcome.warnings {
        eprintln!("warning: {}", warning);
    }
    let providers: Vec<ProviderView<'_>> = outcome.capabilities.iter().map(Into::into).collect();
    print(format, &providers)
}

/// Run one command against the repository
pub async fn run(command: Commands, config: &CliConfig) -> Result<()> {
    let repository = build_repository(config)?;

    match command {
        Commands::Find { namespace, filter } => {
            let mut requirement = Requirement::new(namespace)?;
            if let Some(filter) = filter {
                requirement = requirement.with_filter(filter);
            }
            let outcome = repository.query(&requirement).await?;
            print_outcome(config.output, &outcome)
        }
        Commands::Resolve { coordinates } => {
            let coordinates = MavenCoordinates::parse(&coordinates)
                .with_context(|| format!("Invalid coordinates '{}'", coordinates))?;
            let outcome = repository
                .query(&Requirement::maven(&coordinates))
                .await?;
            if outcome.capabilities.is_empty() {
                info!("No artifact found for {}", coordinates);
            }
            print_outcome(config.output, &outcome)
        }
        Commands::List => {
            let resources = repository.storage().resources().await?;
            let resources: Vec<&Resource> = resources.iter().map(|r| r.as_ref()).collect();
            print(config.output, &resources)
        }
        Commands::Stats => {
            let stats = repository.storage().stats().await?;
            print(config.output, &stats)
        }
    }
}
