//! OpenAPI schema aggregation.
//!
//! # Purpose
//! Collects all routes and schema types into a single OpenAPI document for
//! docs and client generation.
use crate::api::{
    system, tweets,
    types::{
        ErrorResponse, HealthStatus, SystemInfo, TweetCreateRequest, TweetListResponse,
        TweetUpdateRequest, WishCreateRequest, WishListResponse, WishOrderRequest,
        WishUpdateRequest,
    },
    users, webhooks, wishes,
};
use crate::model::{Membership, MembershipRole, Organization, Tweet, User, Wish};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "taine-api",
        version = "v1",
        description = "Identity-sync backend with wish and tweet APIs"
    ),
    paths(
        system::health,
        system::system_info,
        users::me,
        webhooks::receive,
        tweets::create_tweet,
        tweets::list_tweets,
        tweets::list_my_tweets,
        tweets::get_tweet,
        tweets::update_tweet,
        tweets::delete_tweet,
        tweets::list_tweets_unauthenticated,
        wishes::create_wish,
        wishes::list_wishes,
        wishes::list_wishes_by_organization,
        wishes::get_wish,
        wishes::update_wish,
        wishes::update_wish_order,
        wishes::soft_delete_wish,
        wishes::restore_wish,
        wishes::delete_wish
    ),
    components(schemas(
        HealthStatus,
        SystemInfo,
        ErrorResponse,
        User,
        Organization,
        Membership,
        MembershipRole,
        Tweet,
        TweetCreateRequest,
        TweetUpdateRequest,
        TweetListResponse,
        Wish,
        WishCreateRequest,
        WishUpdateRequest,
        WishOrderRequest,
        WishListResponse
    )),
    tags(
        (name = "system", description = "Health and discovery endpoints"),
        (name = "users", description = "Authenticated user info"),
        (name = "webhooks", description = "Identity provider webhook receiver"),
        (name = "tweets", description = "User-scoped tweets"),
        (name = "wishes", description = "Organization-scoped wishes")
    )
)]
pub struct ApiDoc;
