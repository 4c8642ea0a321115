use std::time::Duration;

use reqwest::blocking::Client;

use super::wire::{
    AcceptBody, AcceptReply, AckReply, CompleteBody, CompleteReply, LocationBody, PendingReply,
    PickupBody, RegisterBody, RideCreatedReply, RideRequestBody, StatusReply,
};
use super::{BackendError, PhaseReport, RideBackend};
use crate::geo::Position;
use crate::ride::{RideId, RideOffer, RideReceipt, RideRequest};

const CALL_TIMEOUT: Duration = Duration::from_secs(3);

/// Blocking HTTP client for the coordination backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: String,
}

impl HttpBackend {
    /// Create a client for the given endpoint (e.g. `http://localhost:3000/api`).
    pub fn new(endpoint: &str) -> Self {
        let client = Client::builder()
            .timeout(CALL_TIMEOUT)
            .build()
            .expect("failed to build backend client");
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }
}

impl RideBackend for HttpBackend {
    fn register(
        &self,
        node_id: &str,
        display_name: &str,
        position: Position,
    ) -> Result<(), BackendError> {
        let body = RegisterBody {
            node_id,
            display_name,
            lat: position.lat,
            lng: position.lng,
        };
        let reply: AckReply = self
            .client
            .post(self.url("/node/register"))
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;
        if reply.ok {
            Ok(())
        } else {
            Err(BackendError::Protocol("registration refused".to_string()))
        }
    }

    fn report_position(&self, node_id: &str, position: Position) -> Result<(), BackendError> {
        let body = LocationBody {
            node_id,
            lat: position.lat,
            lng: position.lng,
        };
        self.client
            .post(self.url("/node/location"))
            .json(&body)
            .send()?
            .error_for_status()?;
        Ok(())
    }

    fn submit_request(&self, request: &RideRequest) -> Result<RideId, BackendError> {
        let body = RideRequestBody {
            pickup: &request.pickup,
            destination: &request.destination,
            requester_id: &request.requester_id,
        };
        let reply: RideCreatedReply = self
            .client
            .post(self.url("/ride/request"))
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(reply.ride_id)
    }

    fn poll_pending_requests(&self, node_id: &str) -> Result<Vec<RideOffer>, BackendError> {
        let reply: PendingReply = self
            .client
            .get(self.url("/ride/pending"))
            .query(&[("nodeID", node_id)])
            .send()?
            .error_for_status()?
            .json()?;
        Ok(reply.rides.into_iter().map(Into::into).collect())
    }

    fn accept_ride(&self, ride_id: RideId, node_id: &str) -> Result<bool, BackendError> {
        let body = AcceptBody { ride_id, node_id };
        let reply: AcceptReply = self
            .client
            .post(self.url("/ride/accept"))
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(reply.accepted)
    }

    fn confirm_pickup(&self, ride_id: RideId) -> Result<(), BackendError> {
        let body = PickupBody { ride_id };
        let reply: AckReply = self
            .client
            .post(self.url("/ride/pickup"))
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;
        if reply.ok {
            Ok(())
        } else {
            Err(BackendError::Protocol("pickup not acknowledged".to_string()))
        }
    }

    fn complete_ride(&self, ride_id: RideId, drop: Position) -> Result<RideReceipt, BackendError> {
        let body = CompleteBody {
            ride_id,
            drop_lat: drop.lat,
            drop_lng: drop.lng,
        };
        let reply: CompleteReply = self
            .client
            .post(self.url("/ride/complete"))
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(reply.into())
    }

    fn poll_status(&self, ride_id: RideId) -> Result<PhaseReport, BackendError> {
        let reply: StatusReply = self
            .client
            .get(self.url("/ride/status"))
            .query(&[("rideID", ride_id.to_string())])
            .send()?
            .error_for_status()?
            .json()?;
        Ok(reply.phase.into())
    }
}
