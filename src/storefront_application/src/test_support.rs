//! Hand-rolled port doubles shared by the unit tests of this crate.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use storefront_core::{
    Acknowledgement, ApiError, AuthApi, BearerToken, CanonicalPayload, CatalogApi, ChallengeToken,
    EmailAddress, Identity, LoginReply, MalformedTokenError, Password, ProductListing,
    ProductLookup, ProductQuery, Registration, RequestSigner, Role, SecondFactorCode,
    SessionState, Signature, SignerError, TokenDecoder, TokenStorage, TokenStorageError,
    Username, ValidProduct, VerifyReply, derive_display_name,
};
use tokio::sync::Notify;

/// Decodes `subject|ROLE` or `subject|ROLE|expired`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockDecoder;

impl TokenDecoder for MockDecoder {
    fn decode(
        &self,
        token: &BearerToken,
        display_name_override: Option<&str>,
    ) -> Result<Identity, MalformedTokenError> {
        let mut parts = token.expose().split('|');
        let subject = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| MalformedTokenError::new("missing subject"))?;
        let role_claim = parts
            .next()
            .ok_or_else(|| MalformedTokenError::new("not a token"))?;
        let expires_at = match parts.next() {
            Some("expired") => Some(Utc::now() - chrono::Duration::minutes(1)),
            _ => None,
        };
        let (role, source) = Role::resolve(Some(role_claim));
        Ok(Identity::new(
            subject.to_string(),
            derive_display_name(subject, display_name_override),
            String::new(),
            role,
            source,
            expires_at,
        ))
    }
}

pub fn authenticated_state() -> SessionState {
    SessionState::authenticated(
        MockDecoder
            .decode(&BearerToken::parse("alice|NORMAL_USER").unwrap(), None)
            .unwrap(),
    )
}

#[derive(Default)]
pub struct MockTokenStorage {
    token: Mutex<Option<String>>,
    fail_reads: bool,
    clears: AtomicUsize,
}

impl MockTokenStorage {
    pub fn with_token(raw: &str) -> Self {
        Self {
            token: Mutex::new(Some(raw.to_string())),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn current(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl TokenStorage for MockTokenStorage {
    fn load(&self) -> Result<Option<BearerToken>, TokenStorageError> {
        if self.fail_reads {
            return Err(TokenStorageError::Io("disk on fire".to_string()));
        }
        Ok(self
            .current()
            .and_then(|raw| BearerToken::parse(raw).ok()))
    }

    fn store(&self, token: &BearerToken) -> Result<(), TokenStorageError> {
        *self.token.lock().unwrap() = Some(token.expose().to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStorageError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        *self.token.lock().unwrap() = None;
        Ok(())
    }
}

/// Signs with the payload itself and remembers every payload.
#[derive(Clone, Default)]
pub struct RecordingSigner {
    payloads: Arc<Mutex<Vec<String>>>,
}

impl RecordingSigner {
    pub fn payloads(&self) -> Vec<String> {
        self.payloads.lock().unwrap().clone()
    }
}

impl RequestSigner for RecordingSigner {
    fn sign(&self, payload: &CanonicalPayload) -> Result<Signature, SignerError> {
        self.payloads
            .lock()
            .unwrap()
            .push(payload.as_str().to_string());
        Ok(Signature::new(format!("signed:{}", payload.as_str())))
    }
}

type Queue<T> = Arc<Mutex<VecDeque<Result<T, ApiError>>>>;

/// Scripted authentication endpoints.
#[derive(Clone, Default)]
pub struct MockAuthApi {
    logins: Queue<LoginReply>,
    verifies: Queue<VerifyReply>,
    login_gate: Arc<Mutex<Option<Arc<Notify>>>>,
    login_calls: Arc<AtomicUsize>,
}

impl MockAuthApi {
    pub fn push_login(&self, reply: Result<LoginReply, ApiError>) {
        self.logins.lock().unwrap().push_back(reply);
    }

    pub fn push_verify(&self, reply: Result<VerifyReply, ApiError>) {
        self.verifies.lock().unwrap().push_back(reply);
    }

    /// Make logins wait until the returned handle is notified.
    pub fn hold_logins(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.login_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn login(
        &self,
        _username: &Username,
        _password: &Password,
        _signature: &Signature,
    ) -> Result<LoginReply, ApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.login_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.logins
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ApiError::Network("no scripted reply".to_string())))
    }

    async fn verify_second_factor(
        &self,
        _code: &SecondFactorCode,
        _challenge: &ChallengeToken,
        _signature: &Signature,
    ) -> Result<VerifyReply, ApiError> {
        self.verifies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ApiError::Network("no scripted reply".to_string())))
    }

    async fn register(
        &self,
        registration: &Registration,
        _signature: &Signature,
    ) -> Result<Acknowledgement, ApiError> {
        Ok(Acknowledgement::Accepted {
            message: format!("registered {}", registration.username.as_str()),
        })
    }

    async fn forgot_username(&self, _email: &EmailAddress) -> Result<Acknowledgement, ApiError> {
        Ok(Acknowledgement::Accepted {
            message: "sent".to_string(),
        })
    }

    async fn forgot_password(&self, _email: &EmailAddress) -> Result<Acknowledgement, ApiError> {
        Err(ApiError::Timeout)
    }

    async fn reset_password(
        &self,
        _reset_token: &str,
        _new_password: &Password,
    ) -> Result<Acknowledgement, ApiError> {
        Ok(Acknowledgement::Rejected {
            message: "reset link expired".to_string(),
        })
    }
}

/// Scripted product endpoints. Listings answer after a per-search delay.
#[derive(Clone, Default)]
pub struct MockCatalogApi {
    acknowledgements: Queue<Acknowledgement>,
    listing_delays: Arc<Mutex<Vec<(String, Duration)>>>,
    listing_error: Arc<Mutex<Option<ApiError>>>,
    calls: Arc<AtomicUsize>,
}

impl MockCatalogApi {
    pub fn push_acknowledgement(&self, reply: Result<Acknowledgement, ApiError>) {
        self.acknowledgements.lock().unwrap().push_back(reply);
    }

    pub fn delay_search(&self, search: &str, delay: Duration) {
        self.listing_delays
            .lock()
            .unwrap()
            .push((search.to_string(), delay));
    }

    pub fn fail_listings_with(&self, error: ApiError) {
        *self.listing_error.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_acknowledgement(&self) -> Result<Acknowledgement, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.acknowledgements
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Acknowledgement::Accepted {
                message: "ok".to_string(),
            }))
    }
}

#[async_trait]
impl CatalogApi for MockCatalogApi {
    async fn create_product(
        &self,
        _bearer: &BearerToken,
        _product: &ValidProduct,
        _signature: &Signature,
    ) -> Result<Acknowledgement, ApiError> {
        self.next_acknowledgement()
    }

    async fn update_product(
        &self,
        _bearer: &BearerToken,
        _original_name: &str,
        _product: &ValidProduct,
        _signature: &Signature,
    ) -> Result<Acknowledgement, ApiError> {
        self.next_acknowledgement()
    }

    async fn delete_product(
        &self,
        _bearer: &BearerToken,
        _name: &str,
        _signature: &Signature,
    ) -> Result<Acknowledgement, ApiError> {
        self.next_acknowledgement()
    }

    async fn get_product(
        &self,
        _bearer: &BearerToken,
        name: &str,
    ) -> Result<ProductLookup, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ProductLookup::Rejected {
            message: format!("{name} not found"),
        })
    }

    async fn list_products(
        &self,
        _bearer: &BearerToken,
        query: &ProductQuery,
        _signature: &Signature,
    ) -> Result<ProductListing, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let search = query.search.clone().unwrap_or_default();
        let delay = self
            .listing_delays
            .lock()
            .unwrap()
            .iter()
            .find(|(term, _)| *term == search)
            .map(|(_, delay)| *delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.listing_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(ProductListing::Page(storefront_core::ProductPage {
            products: vec![storefront_core::Product {
                id: Some(1),
                name: search,
                description: None,
                price: 10.0,
                quantity: 1,
                category: None,
                created_at: None,
            }],
            total_pages: 1,
            total_items: 1,
        }))
    }
}
