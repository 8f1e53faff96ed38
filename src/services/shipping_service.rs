use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::models::{
    fee_table, validate_text, AddressField, DeliveryQuote, LookupOutcome, LookupResolution,
    PostalLookupRequest, PostalLookupResponse, ServiceError, ServiceResult,
    ShippingFeesResponse, MAX_POSTAL_CODE_INPUT_LENGTH,
};
use crate::observability::Metrics;
use crate::repositories::SessionRepository;
use crate::services::distance::DistanceEstimator;
use crate::services::postal_lookup::PostalCodeLookup;
use crate::services::session_service::lock_session;

/// Postal-code lookups and delivery quotes
pub struct ShippingService {
    session_repository: Arc<dyn SessionRepository>,
    postal_lookup: Arc<dyn PostalCodeLookup>,
    distance_estimator: Arc<dyn DistanceEstimator>,
    origin_address: String,
    metrics: Arc<Metrics>,
}

impl ShippingService {
    pub fn new(
        session_repository: Arc<dyn SessionRepository>,
        postal_lookup: Arc<dyn PostalCodeLookup>,
        distance_estimator: Arc<dyn DistanceEstimator>,
        origin_address: String,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            session_repository,
            postal_lookup,
            distance_estimator,
            origin_address,
            metrics,
        }
    }

    /// Origin address and the published fee bands
    pub fn fee_table(&self) -> ShippingFeesResponse {
        ShippingFeesResponse {
            origin_address: self.origin_address.clone(),
            bands: fee_table(),
        }
    }

    /// Resolve the session's postal code and quote a delivery fee.
    ///
    /// The session is saved with `searching` set before the remote call and
    /// saved again once the call settles, with `searching` cleared on every
    /// path. The session lock is released while the call is in flight, so
    /// overlapping lookups are not fenced and the last to finish wins.
    #[instrument(skip(self, request))]
    pub async fn lookup_postal_code(
        &self,
        session_id: &str,
        request: PostalLookupRequest,
    ) -> ServiceResult<PostalLookupResponse> {
        let (guard, mut session) =
            lock_session(self.session_repository.as_ref(), session_id).await?;

        if let Some(postal_code) = request.postal_code {
            validate_text("postal_code", &postal_code, MAX_POSTAL_CODE_INPUT_LENGTH)?;
            session.set_address_field(AddressField::PostalCode, postal_code);
        }

        let postal_code = match session.begin_postal_lookup() {
            Ok(code) => code,
            Err(e) => {
                self.metrics.record_postal_lookup("invalid", 0.0);
                self.session_repository.save_session(session).await?;
                warn!(error = %e, "Rejected postal code before lookup");
                return Err(e.into());
            }
        };
        self.session_repository.save_session(session).await?;
        drop(guard);

        let start_time = Instant::now();
        let result = self.postal_lookup.lookup(&postal_code).await;
        let elapsed = start_time.elapsed().as_secs_f64();

        let resolution = match &result {
            Ok(LookupOutcome::Found(hint)) => {
                let distance_km = self.distance_estimator.estimate_km(&postal_code);
                let quote = DeliveryQuote::for_distance(distance_km);
                self.metrics.record_postal_lookup("found", elapsed);
                self.metrics.record_delivery_quote(&quote.fee.to_string());
                LookupResolution::Found {
                    hint: hint.clone(),
                    quote,
                }
            }
            Ok(LookupOutcome::NotFound) => {
                self.metrics.record_postal_lookup("not_found", elapsed);
                LookupResolution::NotFound
            }
            Err(_) => {
                self.metrics.record_postal_lookup("failed", elapsed);
                LookupResolution::Failed
            }
        };

        // Re-read: other transitions may have landed while the call was in flight
        let (_guard, mut session) =
            lock_session(self.session_repository.as_ref(), session_id).await?;
        session.complete_postal_lookup(resolution);
        let session = self.session_repository.save_session(session).await?;

        match result {
            Ok(LookupOutcome::Found(_)) => {
                let quote = session.quote.ok_or_else(|| ServiceError::LookupFailed {
                    message: "quote missing after lookup".to_string(),
                })?;
                info!(
                    postal_code = %postal_code,
                    distance_km = quote.distance_km,
                    fee = %quote.fee,
                    "Delivery quote computed"
                );
                Ok(PostalLookupResponse {
                    postal_code: postal_code.formatted(),
                    address: session.address,
                    quote,
                })
            }
            Ok(LookupOutcome::NotFound) => {
                info!(postal_code = %postal_code, "Postal code not found");
                Err(ServiceError::PostalCodeNotFound {
                    postal_code: postal_code.formatted(),
                })
            }
            Err(e) => {
                warn!(postal_code = %postal_code, error = %e, "Postal code lookup failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AddressHint, PostalCode, StorefrontSession};
    use crate::repositories::InMemorySessionRepository;
    use crate::services::distance::FixedDistance;
    use crate::services::postal_lookup::LookupError;
    use async_trait::async_trait;
    use mockall::mock;
    use rust_decimal_macros::dec;

    mock! {
        TestPostalLookup {}

        #[async_trait]
        impl PostalCodeLookup for TestPostalLookup {
            async fn lookup(&self, postal_code: &PostalCode) -> Result<LookupOutcome, LookupError>;
        }
    }

    const ORIGIN: &str = "Rua Rui Costa, 520, CEP 58046-085, João Pessoa - PB";

    async fn setup(
        lookup: MockTestPostalLookup,
        distance_km: f64,
    ) -> (ShippingService, Arc<InMemorySessionRepository>, String) {
        let sessions = Arc::new(InMemorySessionRepository::new());
        let mut session = StorefrontSession::new();
        session.set_address_field(AddressField::Street, "Rua Antiga".to_string());
        let session = sessions.save_session(session).await.unwrap();

        let service = ShippingService::new(
            sessions.clone(),
            Arc::new(lookup),
            Arc::new(FixedDistance(distance_km)),
            ORIGIN.to_string(),
            Arc::new(Metrics::new().unwrap()),
        );
        (service, sessions, session.id)
    }

    fn request(code: &str) -> PostalLookupRequest {
        PostalLookupRequest {
            postal_code: Some(code.to_string()),
        }
    }

    #[test]
    fn test_fee_table_includes_origin() {
        let sessions = Arc::new(InMemorySessionRepository::new());
        let service = ShippingService::new(
            sessions,
            Arc::new(MockTestPostalLookup::new()),
            Arc::new(FixedDistance(1.0)),
            ORIGIN.to_string(),
            Arc::new(Metrics::new().unwrap()),
        );

        let table = service.fee_table();
        assert_eq!(table.origin_address, ORIGIN);
        assert_eq!(table.bands.len(), 4);
        assert_eq!(table.bands[0].fee, dec!(4.00));
    }

    #[tokio::test]
    async fn test_found_lookup_fills_address_and_quote() {
        let mut lookup = MockTestPostalLookup::new();
        lookup.expect_lookup().times(1).returning(|code| {
            assert_eq!(code.as_str(), "58046085");
            Ok(LookupOutcome::Found(AddressHint {
                street: "Rua Rui Costa".to_string(),
                neighborhood: "Altiplano".to_string(),
                ..Default::default()
            }))
        });
        let (service, sessions, session_id) = setup(lookup, 6.4).await;

        let response = service
            .lookup_postal_code(&session_id, request("58046-085"))
            .await
            .unwrap();

        assert_eq!(response.postal_code, "58046-085");
        assert_eq!(response.address.street, "Rua Rui Costa");
        assert_eq!(response.quote.fee, dec!(7.00));

        let session = sessions.find_session(&session_id).await.unwrap().unwrap();
        assert!(!session.searching);
        assert_eq!(session.quote.map(|q| q.distance_km), Some(6.4));
    }

    #[tokio::test]
    async fn test_invalid_code_skips_network_call() {
        let mut lookup = MockTestPostalLookup::new();
        lookup.expect_lookup().times(0);
        let (service, sessions, session_id) = setup(lookup, 1.0).await;

        let result = service.lookup_postal_code(&session_id, request("1234")).await;
        assert!(matches!(result, Err(ServiceError::ValidationError { .. })));

        let session = sessions.find_session(&session_id).await.unwrap().unwrap();
        assert!(!session.searching);
        assert_eq!(session.address.postal_code, "1234");
    }

    #[tokio::test]
    async fn test_not_found_leaves_address_untouched() {
        let mut lookup = MockTestPostalLookup::new();
        lookup
            .expect_lookup()
            .returning(|_| Ok(LookupOutcome::NotFound));
        let (service, sessions, session_id) = setup(lookup, 1.0).await;

        let result = service
            .lookup_postal_code(&session_id, request("99999-999"))
            .await;
        assert!(matches!(result, Err(ServiceError::PostalCodeNotFound { .. })));

        let session = sessions.find_session(&session_id).await.unwrap().unwrap();
        assert!(!session.searching);
        assert_eq!(session.address.street, "Rua Antiga");
        assert!(session.quote.is_none());
    }

    #[tokio::test]
    async fn test_failure_clears_searching_and_previous_quote() {
        let mut lookup = MockTestPostalLookup::new();
        lookup.expect_lookup().returning(|_| {
            Err(LookupError::InvalidBaseUrl {
                url: "x".to_string(),
                reason: "unreachable".to_string(),
            })
        });
        let (service, sessions, session_id) = setup(lookup, 1.0).await;

        let mut session = sessions.find_session(&session_id).await.unwrap().unwrap();
        session.quote = Some(DeliveryQuote::for_distance(2.0));
        sessions.save_session(session).await.unwrap();

        let result = service
            .lookup_postal_code(&session_id, request("58046085"))
            .await;
        assert!(matches!(result, Err(ServiceError::LookupFailed { .. })));

        let session = sessions.find_session(&session_id).await.unwrap().unwrap();
        assert!(!session.searching);
        assert!(session.quote.is_none());
        assert_eq!(session.address.street, "Rua Antiga");
    }

    #[tokio::test]
    async fn test_lookup_uses_stored_code_when_request_is_empty() {
        let mut lookup = MockTestPostalLookup::new();
        lookup
            .expect_lookup()
            .returning(|_| Ok(LookupOutcome::Found(AddressHint::default())));
        let (service, sessions, session_id) = setup(lookup, 20.0).await;

        let mut session = sessions.find_session(&session_id).await.unwrap().unwrap();
        session.set_address_field(AddressField::PostalCode, "58046085".to_string());
        sessions.save_session(session).await.unwrap();

        let response = service
            .lookup_postal_code(&session_id, PostalLookupRequest::default())
            .await
            .unwrap();
        assert_eq!(response.quote.fee, dec!(14.00));
        assert_eq!(response.address.street, "");
    }
}
