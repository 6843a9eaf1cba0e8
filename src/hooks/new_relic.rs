//! NewRelic deployment markers.
//!
//! Before a deployment the hook resolves the application id matching its
//! filter, then records a deployment marker against it.
use super::{render_filter, DeploymentEvent, Hook};
use crate::config::NewRelicConfig;
use crate::error::CckError;
use crate::manifest::NewRelicManifest;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use ureq::Agent;

const KIND: &str = "newRelic";

pub struct NewRelicHook {
    agent: Agent,
    url: String,
    api_key: String,
    application_filter: String,
    stop_on_error: bool,
}

#[derive(Debug, Serialize)]
struct DeploymentMarker {
    revision: String,
    changelog: String,
    description: String,
    user: String,
}

#[derive(Debug, Serialize)]
struct DeploymentBody {
    deployment: DeploymentMarker,
}

#[derive(Debug, Deserialize)]
struct ApplicationList {
    #[serde(default)]
    applications: Vec<Application>,
}

#[derive(Debug, Deserialize)]
struct Application {
    id: u64,
}

impl NewRelicHook {
    pub fn new(config: &NewRelicConfig, manifest: &NewRelicManifest) -> Result<Self, CckError> {
        if config.url.trim().is_empty() {
            return Err(CckError::hook_construction(
                KIND,
                "hooks.newRelic.url must be set in the config",
            ));
        }
        if config.api_key.trim().is_empty() {
            return Err(CckError::hook_construction(
                KIND,
                "hooks.newRelic.apiKey must be set in the config",
            ));
        }
        if manifest.application_filter.trim().is_empty() {
            return Err(CckError::hook_construction(
                KIND,
                "applicationFilter must be set in the manifest",
            ));
        }

        // Status codes are checked per call, so they must not surface as transport errors.
        let agent = Agent::new_with_config(
            Agent::config_builder().http_status_as_error(false).build(),
        );
        Ok(Self {
            agent,
            url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            application_filter: manifest.application_filter.clone(),
            stop_on_error: manifest.stop_on_error,
        })
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}/{}", self.url, route)
    }

    fn find_application_id(&self, name_filter: &str) -> Result<u64> {
        let url = self.endpoint("v2/applications.json");
        tracing::debug!(url = %url, method = "GET", "NewRelic request");
        let mut response = self
            .agent
            .get(url.as_str())
            .header("X-Api-Key", &self.api_key)
            .query("filter[name]", name_filter)
            .call()
            .context("query NewRelic applications")?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .context("read NewRelic applications response")?;
        tracing::debug!(status, body = %body, "NewRelic response");
        if status != 200 {
            return Err(anyhow!("HTTP error from NewRelic: status {status}"));
        }

        let list: ApplicationList =
            serde_json::from_str(&body).context("parse NewRelic applications")?;
        list.applications
            .first()
            .map(|app| app.id)
            .ok_or_else(|| anyhow!("application {name_filter} not found"))
    }

    fn create_deployment(&self, application_id: u64, marker: DeploymentMarker) -> Result<()> {
        let url = self.endpoint(&format!("v2/applications/{application_id}/deployments.json"));
        tracing::debug!(url = %url, method = "POST", "NewRelic request");
        let response = self
            .agent
            .post(url.as_str())
            .header("X-Api-Key", &self.api_key)
            .send_json(&DeploymentBody { deployment: marker })
            .context("create NewRelic deployment")?;

        let status = response.status().as_u16();
        tracing::debug!(status, "NewRelic response");
        if status != 201 {
            return Err(anyhow!("NewRelic status code: {status}"));
        }
        Ok(())
    }
}

impl Hook for NewRelicHook {
    fn kind(&self) -> &str {
        KIND
    }

    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn pre_deployment(&mut self, event: &DeploymentEvent) -> Result<()> {
        let filter = render_filter(&self.application_filter, event)?;
        let application_id = self.find_application_id(&filter)?;

        let marker = DeploymentMarker {
            revision: event.version.clone(),
            changelog: String::new(),
            description: format!(
                "Deploying {} {} on {}",
                event.service, event.version, event.env
            ),
            user: event.user.clone(),
        };
        self.create_deployment(application_id, marker)
    }

    fn post_deployment(&mut self, _event: &DeploymentEvent) -> Result<()> {
        Ok(())
    }

    fn stop_on_error(&self) -> bool {
        self.stop_on_error
    }
}

#[cfg(test)]
#[path = "new_relic_tests.rs"]
mod tests;
