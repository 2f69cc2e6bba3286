//! Service factory for building the dispatcher's collaborators.
//!
//! Construction of the registry client and installer is kept apart from the
//! configuration: services are built from configuration values but are not
//! part of it.

use anyhow::Result;
use reqwest::Client;

use super::config::Config;
use crate::http::HttpClient;
use crate::install::TarballInstaller;
use crate::registry::NpmRegistry;
use crate::runtime::Runtime;

pub const USER_AGENT: &str = concat!("scaffold-cli/", env!("CARGO_PKG_VERSION"));

pub fn build_http_client() -> Result<HttpClient> {
    let client = Client::builder().user_agent(USER_AGENT).build()?;
    Ok(HttpClient::new(client))
}

pub fn build_registry(config: &Config) -> Result<NpmRegistry> {
    Ok(NpmRegistry::new(
        build_http_client()?,
        Some(config.registry_url.clone()),
    ))
}

pub fn build_installer<R: Runtime>(runtime: R) -> Result<TarballInstaller<R>> {
    Ok(TarballInstaller::new(runtime, build_http_client()?))
}

/// Everything a dispatch needs besides the runtime and configuration.
pub struct Services<R: Runtime> {
    pub registry: NpmRegistry,
    pub installer: TarballInstaller<R>,
}

impl<R: Runtime> Services<R> {
    pub fn from_config(runtime: R, config: &Config) -> Result<Self> {
        Ok(Self {
            registry: build_registry(config)?,
            installer: build_installer(runtime)?,
        })
    }
}
