use serde::{Deserialize, Serialize};
use thiserror::Error;

use crux_core::capability::{Capability, CapabilityContext, Operation};

use crate::geo::LatLon;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeolocationOperation {
    CurrentPosition,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GeolocationError {
    #[error("geolocation is not supported on this device")]
    Unsupported,
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable: {message}")]
    Unavailable { message: String },
    #[error("timed out waiting for a position fix")]
    Timeout,
}

pub type GeolocationResult = Result<LatLon, GeolocationError>;

impl Operation for GeolocationOperation {
    type Output = GeolocationResult;
}

/// Asks the shell for the device position. The shell answers once, and a
/// position it reports is validated like any other coordinate on the way in.
pub struct Geolocation<Ev> {
    context: CapabilityContext<GeolocationOperation, Ev>,
}

impl<Ev> Capability<Ev> for Geolocation<Ev> {
    type Operation = GeolocationOperation;
    type MappedSelf<MappedEv> = Geolocation<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Geolocation::new(self.context.map_event(f))
    }
}

impl<Ev> Geolocation<Ev>
where
    Ev: Send + 'static,
{
    pub fn new(context: CapabilityContext<GeolocationOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn current_position<F>(&self, make_event: F)
    where
        F: FnOnce(GeolocationResult) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx
                .request_from_shell(GeolocationOperation::CurrentPosition)
                .await;
            ctx.update_app(make_event(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_answers_deserialize() {
        let ok: GeolocationResult =
            serde_json::from_str(r#"{"Ok":{"lat":43.70313,"lon":7.26608}}"#).unwrap();
        assert_eq!(ok, Ok(LatLon::new(43.70313, 7.26608).unwrap()));

        let denied: GeolocationResult = serde_json::from_str(r#"{"Err":"PermissionDenied"}"#).unwrap();
        assert_eq!(denied, Err(GeolocationError::PermissionDenied));
    }

    #[test]
    fn out_of_range_fix_is_rejected() {
        let bad = serde_json::from_str::<GeolocationResult>(r#"{"Ok":{"lat":95.0,"lon":7.0}}"#);
        assert!(bad.is_err());
    }
}
