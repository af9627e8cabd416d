//! # Lifecycle Hook
//!
//! [`MultiDumpMiddleware`] renders the request's dumps and splices the panel
//! into the outgoing body, as the last step before the response is written.
//!
//! The panel is skipped when:
//!
//! - the environment is not in `enabled_environments`
//! - the route is excluded by name or pattern (`_wdt`, `_profiler` by default)
//! - the request is a sub-request
//! - `html_only` is set and the response is not `text/html`
//!
//! Rendering failures are logged and leave the body untouched.

use std::time::Duration;

use tracing::{debug, error, info};

use super::Middleware;
use crate::config::{MultiDumpConfig, RouteExclusions};
use crate::error::Result;
use crate::ids::panel_prefix;
use crate::inject::inject_titled;
use crate::render::{DefaultItems, Renderer};
use crate::server::{is_html_content_type, HttpRequest, HttpResponse};

pub struct MultiDumpMiddleware {
    config: MultiDumpConfig,
    exclusions: RouteExclusions,
    renderer: Renderer,
    environment: String,
}

impl MultiDumpMiddleware {
    /// Build the hook for `environment`, compiling the route exclusions.
    pub fn new(config: MultiDumpConfig, environment: impl Into<String>) -> Result<Self> {
        let exclusions = config.route_exclusions()?;
        Ok(Self {
            config,
            exclusions,
            renderer: Renderer::default(),
            environment: environment.into(),
        })
    }

    /// Replace the default renderer, e.g. to install another [`ValueSerializer`].
    ///
    /// [`ValueSerializer`]: crate::serializer::ValueSerializer
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &MultiDumpConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    fn applies_to(&self, req: &HttpRequest, content_type: Option<&str>) -> bool {
        if !self.config.is_enabled_for(&self.environment) {
            return false;
        }
        if self.exclusions.is_excluded(req.route.as_deref()) {
            debug!(route = ?req.route, "route excluded from dump panel");
            return false;
        }
        if req.sub_request {
            return false;
        }
        !self.config.html_only || is_html_content_type(content_type)
    }

    /// The body with the panel injected, or `None` when the panel does not
    /// apply to this response or could not be rendered.
    pub fn on_before_response_sent(
        &self,
        req: &HttpRequest,
        body: &str,
        content_type: Option<&str>,
    ) -> Option<String> {
        if !self.applies_to(req, content_type) {
            return None;
        }

        let app = req.app_context(&self.environment);
        let defaults: Option<&dyn DefaultItems> = if self.config.include_defaults {
            Some(req as &dyn DefaultItems)
        } else {
            None
        };
        let prefix = panel_prefix();

        let injected = self
            .renderer
            .render(&app, defaults, &prefix)
            .and_then(|panel| {
                let entries = panel.entry_count;
                let badge = panel.badge;
                inject_titled(body, &panel, &prefix, &self.config.title)
                    .map(|out| (out, entries, badge))
            });

        match injected {
            Ok((out, entries, badge)) => {
                info!(
                    request_id = %req.request_id,
                    path = %req.path,
                    entries,
                    badge,
                    "dump panel injected"
                );
                Some(out)
            }
            Err(err) => {
                error!(
                    request_id = %req.request_id,
                    path = %req.path,
                    error = %err,
                    "dump panel rendering failed; response left untouched"
                );
                None
            }
        }
    }
}

impl Middleware for MultiDumpMiddleware {
    fn after(&self, req: &HttpRequest, res: &mut HttpResponse, _latency: Duration) {
        if let Some(body) = self.on_before_response_sent(req, &res.body, res.content_type()) {
            res.body = body;
        }
    }
}
