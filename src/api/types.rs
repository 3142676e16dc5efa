//! HTTP API request/response types.
//!
//! # Purpose
//! Defines shared payload shapes for the REST API and OpenAPI schema
//! generation.
use crate::model::{Tweet, Wish};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SystemInfo {
    pub api_version: String,
    pub storage_backend: String,
    pub durable: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct TweetCreateRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct TweetUpdateRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TweetListResponse {
    pub items: Vec<Tweet>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct WishCreateRequest {
    pub title: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub order_no: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct WishUpdateRequest {
    pub title: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub order_no: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct WishOrderRequest {
    pub order_no: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WishListResponse {
    pub items: Vec<Wish>,
}
