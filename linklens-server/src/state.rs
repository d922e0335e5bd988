use linklens_config::LinklensConfig;
use linklens_social::profile::ProfilePipeline;
use std::sync::Arc;

/// Shared, read-only handler state.
///
/// A server started without an access token still runs; every request is
/// answered with a configuration error until it is restarted with one.
#[derive(Clone)]
pub struct AppState {
    backend: Arc<Backend>,
}

enum Backend {
    Ready(ProfilePipeline),
    Unconfigured(String),
}

impl AppState {
    pub fn ready(pipeline: ProfilePipeline) -> Self {
        Self {
            backend: Arc::new(Backend::Ready(pipeline)),
        }
    }

    pub fn unconfigured(reason: impl Into<String>) -> Self {
        Self {
            backend: Arc::new(Backend::Unconfigured(reason.into())),
        }
    }

    pub fn from_config(cfg: &LinklensConfig) -> Self {
        match ProfilePipeline::from_config(cfg) {
            Ok(pipeline) => Self::ready(pipeline),
            Err(e) => {
                tracing::warn!(error = %e, "server.pipeline_unavailable");
                Self::unconfigured(e.to_string())
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.backend, Backend::Ready(_))
    }

    pub(crate) fn pipeline(&self) -> Result<&ProfilePipeline, &str> {
        match &*self.backend {
            Backend::Ready(p) => Ok(p),
            Backend::Unconfigured(reason) => Err(reason),
        }
    }
}
