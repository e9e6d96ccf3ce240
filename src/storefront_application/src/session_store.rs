use std::sync::Arc;

use chrono::Utc;
use secrecy::Secret;
use storefront_core::{
    AuthApi, BearerToken, IdentityPatch, MalformedTokenError, Password, RequestSigner,
    SecondFactorCode, SessionPhase, SessionState, TokenDecoder, TokenStorage, Username,
};
use tokio::sync::watch;

use crate::{
    session_gateway::{LoginError, LoginOutcome, SessionGateway, VerifyError},
    session_link::{BearerUpdate, SessionLink, Submission},
};

/// Single source of truth for who is logged in.
///
/// Every transition goes through this type. Observers hold read-only
/// [`watch::Receiver`]s or a [`SessionLink`].
pub struct SessionStore<D, A, S>
where
    D: TokenDecoder,
    A: AuthApi,
    S: RequestSigner,
{
    link: SessionLink,
    decoder: D,
    gateway: SessionGateway<A, S>,
}

impl<D, A, S> SessionStore<D, A, S>
where
    D: TokenDecoder,
    A: AuthApi,
    S: RequestSigner,
{
    pub fn new(decoder: D, api: A, signer: S, storage: Arc<dyn TokenStorage>) -> Self {
        let link = SessionLink::new(storage);
        let gateway = SessionGateway::new(api, signer, link.clone());
        Self {
            link,
            decoder,
            gateway,
        }
    }

    /// Boot transition: examine the persisted token once.
    ///
    /// An undecodable, unreadable or expired token is discarded from storage.
    #[tracing::instrument(name = "SessionStore::restore", skip(self))]
    pub fn restore(&self) -> SessionPhase {
        let (next, bearer) = match self.link.storage().load() {
            Err(e) => {
                tracing::warn!(error = %e, "Persisted token is unreadable, discarding it");
                (SessionState::anonymous(), BearerUpdate::Clear)
            }
            Ok(None) => (SessionState::anonymous(), BearerUpdate::Keep),
            Ok(Some(token)) => match self.decoder.decode(&token, None) {
                Ok(identity) if identity.is_expired(Utc::now()) => {
                    tracing::info!("Persisted token has expired, discarding it");
                    (SessionState::anonymous(), BearerUpdate::Clear)
                }
                Ok(identity) => {
                    tracing::info!(role = %identity.role(), "Restored session");
                    (SessionState::authenticated(identity), BearerUpdate::Set(token))
                }
                Err(e) => {
                    tracing::info!(error = %e, "Persisted token is unusable, discarding it");
                    (SessionState::anonymous(), BearerUpdate::Clear)
                }
            },
        };

        let phase = next.phase();
        self.link.replace(next, bearer);
        phase
    }

    /// Check credentials with the backend.
    ///
    /// Rejected with [`LoginError::Busy`] while another submission is in
    /// flight. Network failures leave the session as it was.
    #[tracing::instrument(name = "SessionStore::login", skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: Secret<String>,
    ) -> Result<SessionPhase, LoginError> {
        let username = Username::parse(username)?;
        let password = Password::try_from(password)?;
        let Submission {
            generation,
            previous,
        } = self.link.begin().ok_or(LoginError::Busy)?;

        match self.gateway.login(&username, &password).await {
            Ok(LoginOutcome::Authenticated(token)) => {
                self.establish(generation, token, Some(username.as_str().to_string()))
                    .map_err(|e| match e {
                        EstablishError::Malformed(e) => LoginError::MalformedToken(e),
                        EstablishError::Superseded => LoginError::Superseded,
                    })
            }
            Ok(LoginOutcome::SecondFactorRequired(challenge)) => {
                self.link
                    .set_pending_display_name(Some(username.as_str().to_string()));
                let next = SessionState::pending_second_factor(challenge);
                if !self.link.commit(generation, next, BearerUpdate::Clear) {
                    return Err(LoginError::Superseded);
                }
                tracing::info!("Second factor required");
                Ok(SessionPhase::PendingSecondFactor)
            }
            Err(e @ LoginError::Authentication(_)) => {
                tracing::info!(error = %e, "Login rejected");
                self.link
                    .commit(generation, SessionState::anonymous(), BearerUpdate::Clear);
                Err(e)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                self.link
                    .commit(generation, previous.with_loading(false), BearerUpdate::Keep);
                Err(e)
            }
        }
    }

    /// Complete a pending login with the one-time code.
    ///
    /// A wrong code keeps the challenge for another try. An expired challenge
    /// sends the session back to anonymous.
    #[tracing::instrument(name = "SessionStore::verify_second_factor", skip_all)]
    pub async fn verify_second_factor(&self, code: &str) -> Result<SessionPhase, VerifyError> {
        if !self.link.state().is_pending_second_factor() {
            return Err(VerifyError::NoPendingChallenge);
        }
        let code = SecondFactorCode::parse(code)?;
        let Submission {
            generation,
            previous,
        } = self.link.begin().ok_or(VerifyError::Busy)?;
        let Some(challenge) = previous.second_factor_challenge().cloned() else {
            self.link
                .commit(generation, previous.with_loading(false), BearerUpdate::Keep);
            return Err(VerifyError::NoPendingChallenge);
        };

        match self.gateway.verify_second_factor(&code, &challenge).await {
            Ok(token) => {
                let display_name = self.link.pending_display_name();
                self.establish(generation, token, display_name)
                    .map_err(|e| match e {
                        EstablishError::Malformed(e) => VerifyError::MalformedToken(e),
                        EstablishError::Superseded => VerifyError::Superseded,
                    })
            }
            Err(e @ VerifyError::ChallengeExpired(_)) => {
                tracing::info!(error = %e, "Second-factor challenge expired");
                self.link.set_pending_display_name(None);
                self.link
                    .commit(generation, SessionState::anonymous(), BearerUpdate::Clear);
                Err(e)
            }
            Err(e) => {
                tracing::info!(error = %e, "Second-factor verification failed");
                self.link
                    .commit(generation, previous.with_loading(false), BearerUpdate::Keep);
                Err(e)
            }
        }
    }

    /// Synchronous, infallible and idempotent. Any in-flight login or
    /// verification that completes afterwards is discarded.
    #[tracing::instrument(name = "SessionStore::logout", skip(self))]
    pub fn logout(&self) {
        self.gateway.logout();
    }

    /// Merge cosmetic profile fields. Ignored unless authenticated.
    pub fn patch_identity(&self, patch: IdentityPatch) -> bool {
        self.link.patch(|state| state.patch_identity(patch))
    }

    pub fn state(&self) -> SessionState {
        self.link.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.link.subscribe()
    }

    pub fn bearer(&self) -> Option<BearerToken> {
        self.link.bearer()
    }

    /// Capability handle for components making bearer-authenticated calls.
    pub fn link(&self) -> SessionLink {
        self.link.clone()
    }

    fn establish(
        &self,
        generation: u64,
        token: BearerToken,
        display_name: Option<String>,
    ) -> Result<SessionPhase, EstablishError> {
        let decoded = self
            .decoder
            .decode(&token, display_name.as_deref())
            .and_then(|identity| {
                if identity.is_expired(Utc::now()) {
                    Err(MalformedTokenError::new("token has already expired"))
                } else {
                    Ok(identity)
                }
            });
        let identity = match decoded {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(error = %e, "Backend issued an unusable token");
                self.link
                    .commit(generation, SessionState::anonymous(), BearerUpdate::Clear);
                return Err(EstablishError::Malformed(e));
            }
        };

        tracing::info!(role = %identity.role(), "Session established");
        self.link.set_pending_display_name(None);
        if !self.link.commit(
            generation,
            SessionState::authenticated(identity),
            BearerUpdate::Set(token),
        ) {
            return Err(EstablishError::Superseded);
        }
        Ok(SessionPhase::Authenticated)
    }
}

enum EstablishError {
    Malformed(MalformedTokenError),
    Superseded,
}
