//! Request and response bodies of the storefront backend.
//!
//! Responses accept the legacy field names the backend has used as aliases.
//! A response without a `code` fails to decode.

use serde::{Deserialize, Serialize};
use storefront_core::{
    Acknowledgement, ApiError, BearerToken, Category, ChallengeToken, LoginReply, Product,
    ProductListing, ProductLookup, ProductPage, VerifyReply,
};

const SUCCESS: i64 = 0;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub signature: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest<'a> {
    pub code: &'a str,
    pub challenge_token: &'a str,
    pub signature: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: &'a str,
    pub signature: &'a str,
}

#[derive(Serialize, Debug)]
pub struct EmailRequest<'a> {
    pub email: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest<'a> {
    pub token: &'a str,
    pub new_password: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub price: f64,
    pub quantity: i64,
    pub category: &'a str,
    pub signature: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdateRequest<'a> {
    pub original_name: &'a str,
    pub new_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub price: f64,
    pub quantity: i64,
    pub category: &'a str,
    pub signature: &'a str,
}

#[derive(Serialize, Debug)]
pub struct ProductDeleteRequest<'a> {
    pub name: &'a str,
    pub signature: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductListRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<&'a str>,
    pub page: u32,
    pub page_size: u32,
    pub signature: &'a str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(alias = "codigo")]
    pub code: i64,
    #[serde(default, alias = "mensaje")]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, alias = "requiereOtp")]
    pub requires_second_factor: Option<bool>,
    #[serde(default, alias = "tempToken")]
    pub challenge_token: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    #[serde(alias = "codigo")]
    pub code: i64,
    #[serde(default, alias = "mensaje")]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub challenge_expired: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct AcknowledgementResponse {
    #[serde(alias = "codigo")]
    pub code: i64,
    #[serde(default, alias = "mensaje")]
    pub message: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody {
    #[serde(default, alias = "id_product", alias = "idProduct")]
    pub id: Option<i64>,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "descripcion")]
    pub description: Option<String>,
    #[serde(default, alias = "precio")]
    pub price: f64,
    #[serde(default, alias = "cantidad")]
    pub quantity: i64,
    #[serde(default, alias = "categoria")]
    pub category: Option<String>,
    #[serde(default, alias = "fechaCreacion")]
    pub created_at: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    #[serde(alias = "codigo")]
    pub code: i64,
    #[serde(default, alias = "mensaje")]
    pub message: Option<String>,
    #[serde(default, alias = "productos")]
    pub products: Vec<ProductBody>,
    #[serde(default, alias = "totalPaginas")]
    pub total_pages: u32,
    #[serde(default, alias = "totalElementos")]
    pub total_items: u64,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductLookupResponse {
    #[serde(alias = "codigo")]
    pub code: i64,
    #[serde(default, alias = "mensaje")]
    pub message: Option<String>,
    #[serde(default, alias = "id_product", alias = "idProduct")]
    pub id: Option<i64>,
    #[serde(default, alias = "nombre")]
    pub name: Option<String>,
    #[serde(default, alias = "descripcion")]
    pub description: Option<String>,
    #[serde(default, alias = "precio")]
    pub price: Option<f64>,
    #[serde(default, alias = "cantidad")]
    pub quantity: Option<i64>,
    #[serde(default, alias = "categoria")]
    pub category: Option<String>,
    #[serde(default, alias = "fechaCreacion")]
    pub created_at: Option<String>,
}

fn message_or(message: Option<String>, fallback: &str) -> String {
    message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn bearer(raw: String) -> Result<BearerToken, ApiError> {
    BearerToken::parse(raw).map_err(|e| ApiError::Decode(e.to_string()))
}

impl TryFrom<LoginResponse> for LoginReply {
    type Error = ApiError;

    fn try_from(response: LoginResponse) -> Result<Self, Self::Error> {
        if response.code != SUCCESS {
            return Ok(LoginReply::Rejected {
                message: message_or(response.message, "Login failed"),
            });
        }
        if response.requires_second_factor.unwrap_or(false) {
            let challenge = response
                .challenge_token
                .ok_or_else(|| ApiError::Decode("second factor required without a challenge".into()))
                .and_then(|raw| {
                    ChallengeToken::parse(raw).map_err(|e| ApiError::Decode(e.to_string()))
                })?;
            return Ok(LoginReply::SecondFactorRequired(challenge));
        }
        match response.token {
            Some(token) => Ok(LoginReply::Token(bearer(token)?)),
            None => Err(ApiError::Decode("login succeeded without a token".into())),
        }
    }
}

impl TryFrom<VerifyResponse> for VerifyReply {
    type Error = ApiError;

    fn try_from(response: VerifyResponse) -> Result<Self, Self::Error> {
        if response.code == SUCCESS {
            return match response.token {
                Some(token) => Ok(VerifyReply::Token(bearer(token)?)),
                None => Err(ApiError::Decode("verification succeeded without a token".into())),
            };
        }
        if response.challenge_expired.unwrap_or(false) {
            return Ok(VerifyReply::ChallengeExpired {
                message: message_or(response.message, "Verification code expired"),
            });
        }
        Ok(VerifyReply::InvalidCode {
            message: message_or(response.message, "Invalid verification code"),
        })
    }
}

impl From<AcknowledgementResponse> for Acknowledgement {
    fn from(response: AcknowledgementResponse) -> Self {
        if response.code == SUCCESS {
            Acknowledgement::Accepted {
                message: message_or(response.message, "OK"),
            }
        } else {
            Acknowledgement::Rejected {
                message: message_or(response.message, "Request rejected"),
            }
        }
    }
}

impl From<ProductBody> for Product {
    fn from(body: ProductBody) -> Self {
        Product {
            id: body.id,
            name: body.name,
            description: body.description,
            price: body.price,
            quantity: body.quantity,
            category: body.category.as_deref().and_then(Category::from_wire_name),
            created_at: body.created_at,
        }
    }
}

impl From<ProductListResponse> for ProductListing {
    fn from(response: ProductListResponse) -> Self {
        if response.code != SUCCESS {
            return ProductListing::Rejected {
                message: message_or(response.message, "Failed to list products"),
            };
        }
        ProductListing::Page(ProductPage {
            products: response.products.into_iter().map(Product::from).collect(),
            total_pages: response.total_pages,
            total_items: response.total_items,
        })
    }
}

impl TryFrom<ProductLookupResponse> for ProductLookup {
    type Error = ApiError;

    fn try_from(response: ProductLookupResponse) -> Result<Self, Self::Error> {
        if response.code != SUCCESS {
            return Ok(ProductLookup::Rejected {
                message: message_or(response.message, "Product not found"),
            });
        }
        let name = response
            .name
            .ok_or_else(|| ApiError::Decode("product without a name".into()))?;
        Ok(ProductLookup::Found(Product {
            id: response.id,
            name,
            description: response.description,
            price: response.price.unwrap_or_default(),
            quantity: response.quantity.unwrap_or_default(),
            category: response.category.as_deref().and_then(Category::from_wire_name),
            created_at: response.created_at,
        }))
    }
}
