use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use secrecy::ExposeSecret;
use serde::{Serialize, de::DeserializeOwned};
use storefront_core::{
    Acknowledgement, ApiError, AuthApi, BearerToken, CatalogApi, ChallengeToken, EmailAddress,
    LoginReply, Password, ProductListing, ProductLookup, ProductQuery, Registration,
    SecondFactorCode, Signature, Username, ValidProduct, VerifyReply,
};

use crate::http::wire::{
    AcknowledgementResponse, EmailRequest, LoginRequest, LoginResponse, ProductDeleteRequest,
    ProductListRequest, ProductListResponse, ProductLookupResponse, ProductRequest,
    ProductUpdateRequest, RegisterRequest, ResetPasswordRequest, VerifyRequest, VerifyResponse,
};

/// Per-request timeouts. Product writes may carry larger bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTimeouts {
    pub json: Duration,
    pub upload: Duration,
}

/// Speaks the storefront backend's JSON protocol over reqwest.
#[derive(Debug, Clone)]
pub struct RestApiClient {
    http_client: Client,
    base_url: Url,
    timeouts: RequestTimeouts,
}

impl RestApiClient {
    pub fn new(
        base_url: &str,
        timeouts: RequestTimeouts,
        http_client: Client,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::Network(format!("invalid base url {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Network(format!(
                "base url {base_url} cannot carry paths"
            )));
        }
        Ok(Self {
            http_client,
            base_url,
            timeouts,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(
        &self,
        method: Method,
        segments: &[&str],
        timeout: Duration,
        bearer: Option<&BearerToken>,
    ) -> RequestBuilder {
        let builder = self
            .http_client
            .request(method, self.url(segments))
            .timeout(timeout);
        match bearer {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    async fn post_json<B, T>(
        &self,
        segments: &[&str],
        body: &B,
        bearer: Option<&BearerToken>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::POST, segments, self.timeouts.json, bearer)
            .json(body);
        decode(send(request).await?).await
    }
}

async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request.send().await.map_err(transport_error)?;
    match response.status() {
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized(error_message(response).await)),
        StatusCode::FORBIDDEN => Err(ApiError::Forbidden(error_message(response).await)),
        _ => Ok(response),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().await.map_err(transport_error)?;
    match serde_json::from_slice::<T>(&body) {
        Ok(value) => Ok(value),
        Err(e) if status.is_success() => Err(ApiError::Decode(e.to_string())),
        Err(_) => Err(ApiError::UnexpectedStatus {
            status: status.as_u16(),
            message: message_from_body(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string()),
        }),
    }
}

fn transport_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(error.to_string())
    }
}

async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.bytes().await.unwrap_or_default();
    message_from_body(&body).unwrap_or_else(|| status.to_string())
}

/// `message`/`mensaje` from a JSON body, or the body itself when it is text.
fn message_from_body(body: &[u8]) -> Option<String> {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        return ["message", "mensaje", "error"]
            .into_iter()
            .find_map(|key| value.get(key).and_then(|v| v.as_str()))
            .map(str::to_string);
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    (!text.is_empty()).then_some(text)
}

#[async_trait::async_trait]
impl AuthApi for RestApiClient {
    #[tracing::instrument(name = "RestApiClient::login", skip_all)]
    async fn login(
        &self,
        username: &Username,
        password: &Password,
        signature: &Signature,
    ) -> Result<LoginReply, ApiError> {
        let body = LoginRequest {
            username: username.as_str(),
            password: password.as_ref().expose_secret(),
            signature: signature.as_str(),
        };
        let response: LoginResponse = self.post_json(&["auth", "login"], &body, None).await?;
        LoginReply::try_from(response)
    }

    #[tracing::instrument(name = "RestApiClient::verify_second_factor", skip_all)]
    async fn verify_second_factor(
        &self,
        code: &SecondFactorCode,
        challenge: &ChallengeToken,
        signature: &Signature,
    ) -> Result<VerifyReply, ApiError> {
        let body = VerifyRequest {
            code: code.as_str(),
            challenge_token: challenge.expose(),
            signature: signature.as_str(),
        };
        let request = self
            .request(
                Method::POST,
                &["auth", "verify-second-factor"],
                self.timeouts.json,
                None,
            )
            .json(&body);
        let response = send(request).await?;
        if response.status() == StatusCode::GONE {
            let message = error_message(response).await;
            return Ok(VerifyReply::ChallengeExpired { message });
        }
        VerifyReply::try_from(decode::<VerifyResponse>(response).await?)
    }

    #[tracing::instrument(name = "RestApiClient::register", skip_all)]
    async fn register(
        &self,
        registration: &Registration,
        signature: &Signature,
    ) -> Result<Acknowledgement, ApiError> {
        let body = RegisterRequest {
            username: registration.username.as_str(),
            email: registration.email.as_str(),
            password: registration.password.as_ref().expose_secret(),
            role: registration.role.as_str(),
            signature: signature.as_str(),
        };
        let response: AcknowledgementResponse =
            self.post_json(&["auth", "register"], &body, None).await?;
        Ok(response.into())
    }

    #[tracing::instrument(name = "RestApiClient::forgot_username", skip_all)]
    async fn forgot_username(&self, email: &EmailAddress) -> Result<Acknowledgement, ApiError> {
        let body = EmailRequest {
            email: email.as_str(),
        };
        let response: AcknowledgementResponse = self
            .post_json(&["auth", "forgot-username"], &body, None)
            .await?;
        Ok(response.into())
    }

    #[tracing::instrument(name = "RestApiClient::forgot_password", skip_all)]
    async fn forgot_password(&self, email: &EmailAddress) -> Result<Acknowledgement, ApiError> {
        let body = EmailRequest {
            email: email.as_str(),
        };
        let response: AcknowledgementResponse = self
            .post_json(&["auth", "forgot-password"], &body, None)
            .await?;
        Ok(response.into())
    }

    #[tracing::instrument(name = "RestApiClient::reset_password", skip_all)]
    async fn reset_password(
        &self,
        reset_token: &str,
        new_password: &Password,
    ) -> Result<Acknowledgement, ApiError> {
        let body = ResetPasswordRequest {
            token: reset_token,
            new_password: new_password.as_ref().expose_secret(),
        };
        let response: AcknowledgementResponse = self
            .post_json(&["auth", "reset-password"], &body, None)
            .await?;
        Ok(response.into())
    }
}

#[async_trait::async_trait]
impl CatalogApi for RestApiClient {
    #[tracing::instrument(name = "RestApiClient::create_product", skip_all, fields(name = %product.name()))]
    async fn create_product(
        &self,
        bearer: &BearerToken,
        product: &ValidProduct,
        signature: &Signature,
    ) -> Result<Acknowledgement, ApiError> {
        let body = ProductRequest {
            name: product.name(),
            description: product.description(),
            price: product.price(),
            quantity: product.quantity(),
            category: product.category().wire_name(),
            signature: signature.as_str(),
        };
        let request = self
            .request(
                Method::POST,
                &["products", "create"],
                self.timeouts.upload,
                Some(bearer),
            )
            .json(&body);
        let response: AcknowledgementResponse = decode(send(request).await?).await?;
        Ok(response.into())
    }

    #[tracing::instrument(name = "RestApiClient::update_product", skip_all, fields(original_name = %original_name))]
    async fn update_product(
        &self,
        bearer: &BearerToken,
        original_name: &str,
        product: &ValidProduct,
        signature: &Signature,
    ) -> Result<Acknowledgement, ApiError> {
        let body = ProductUpdateRequest {
            original_name,
            new_name: product.name(),
            description: product.description(),
            price: product.price(),
            quantity: product.quantity(),
            category: product.category().wire_name(),
            signature: signature.as_str(),
        };
        let request = self
            .request(
                Method::PUT,
                &["products", "update"],
                self.timeouts.upload,
                Some(bearer),
            )
            .json(&body);
        let response: AcknowledgementResponse = decode(send(request).await?).await?;
        Ok(response.into())
    }

    #[tracing::instrument(name = "RestApiClient::delete_product", skip_all, fields(name = %name))]
    async fn delete_product(
        &self,
        bearer: &BearerToken,
        name: &str,
        signature: &Signature,
    ) -> Result<Acknowledgement, ApiError> {
        let body = ProductDeleteRequest {
            name,
            signature: signature.as_str(),
        };
        let response: AcknowledgementResponse = self
            .post_json(&["products", "delete"], &body, Some(bearer))
            .await?;
        Ok(response.into())
    }

    #[tracing::instrument(name = "RestApiClient::get_product", skip_all, fields(name = %name))]
    async fn get_product(
        &self,
        bearer: &BearerToken,
        name: &str,
    ) -> Result<ProductLookup, ApiError> {
        let request = self.request(
            Method::GET,
            &["products", "by-name", name],
            self.timeouts.json,
            Some(bearer),
        );
        let response = send(request).await?;
        if response.status() == StatusCode::NOT_FOUND {
            let message = error_message(response).await;
            return Ok(ProductLookup::Rejected { message });
        }
        ProductLookup::try_from(decode::<ProductLookupResponse>(response).await?)
    }

    #[tracing::instrument(name = "RestApiClient::list_products", skip_all, fields(page = query.page))]
    async fn list_products(
        &self,
        bearer: &BearerToken,
        query: &ProductQuery,
        signature: &Signature,
    ) -> Result<ProductListing, ApiError> {
        let body = ProductListRequest {
            search: query.search.as_deref(),
            page: query.page,
            page_size: query.page_size,
            signature: signature.as_str(),
        };
        let response: ProductListResponse = self
            .post_json(&["products", "list"], &body, Some(bearer))
            .await?;
        Ok(response.into())
    }
}
