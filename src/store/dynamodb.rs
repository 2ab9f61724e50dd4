//! DynamoDB post store
//!
//! One item per post, keyed by `id`. Listing is a full paginated scan
//! sorted in memory; the table needs no secondary indexes.

use super::schema::*;
use super::{PostStore, Result, StoreError};
use crate::config::BlogConfig;
use crate::content::{sort_newest_first, Author, Facet, Post};
use async_trait::async_trait;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType,
    ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;
use aws_smithy_types::retry::RetryConfig;
use aws_smithy_types::timeout::TimeoutConfig;
use std::collections::HashMap;
use std::time::Duration;

type Item = HashMap<String, AttributeValue>;

/// DynamoDB store configuration
#[derive(Debug, Clone, Default)]
pub struct DynamoDbConfig {
    /// DynamoDB table name
    pub table_name: String,
    /// AWS region (optional, uses SDK default if not specified)
    pub region: Option<String>,
    /// Optional endpoint override (e.g. LocalStack)
    pub endpoint: Option<String>,
    /// Timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

/// DynamoDB-backed post store
#[derive(Clone)]
pub struct DynamoDbPostStore {
    client: Client,
    table_name: String,
}

impl std::fmt::Debug for DynamoDbPostStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoDbPostStore")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl DynamoDbPostStore {
    /// Create a store from shared SDK config plus per-table overrides
    pub fn new(sdk_config: &aws_config::SdkConfig, config: DynamoDbConfig) -> Self {
        // Inherit HTTP client and credentials from the SdkConfig. Each store
        // call is one request, so SDK retries are switched off.
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config)
            .retry_config(RetryConfig::disabled());

        if let Some(region) = config.region {
            builder = builder.region(aws_sdk_dynamodb::config::Region::new(region));
        }

        if let Some(endpoint) = config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        if let Some(timeout_ms) = config.timeout_ms {
            let timeout_config = TimeoutConfig::builder()
                .operation_timeout(Duration::from_millis(timeout_ms))
                .build();
            builder = builder.timeout_config(timeout_config);
        }

        Self {
            client: Client::from_conf(builder.build()),
            table_name: config.table_name,
        }
    }

    /// Create a store for the configured table using the default AWS credential chain
    pub async fn from_blog_config(config: &BlogConfig) -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(
            &sdk_config,
            DynamoDbConfig {
                table_name: config.table.clone(),
                region: config.region.clone(),
                endpoint: config.endpoint.clone(),
                timeout_ms: config.timeout_ms,
            },
        )
    }

    /// Create from a pre-built client
    pub fn from_client(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Create the posts table if it does not exist yet
    ///
    /// Returns `true` when a table was created.
    pub async fn ensure_table(&self) -> Result<bool> {
        match self
            .client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
        {
            Ok(_) => return Ok(false),
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_resource_not_found_exception())
                    .unwrap_or(false) => {}
            Err(e) => return Err(sdk_unavailable("DescribeTable", e)),
        }

        let id_attr = AttributeDefinition::builder()
            .attribute_name(ATTR_ID)
            .attribute_type(ScalarAttributeType::S)
            .build()
            .map_err(|e| StoreError::unavailable(format!("invalid table schema: {}", e)))?;
        let id_key = KeySchemaElement::builder()
            .attribute_name(ATTR_ID)
            .key_type(KeyType::Hash)
            .build()
            .map_err(|e| StoreError::unavailable(format!("invalid table schema: {}", e)))?;

        let created = self
            .client
            .create_table()
            .table_name(&self.table_name)
            .attribute_definitions(id_attr)
            .key_schema(id_key)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await;

        match created {
            Ok(_) => {
                tracing::info!("Created table {}", self.table_name);
                Ok(true)
            }
            // Someone else created it between describe and create
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_resource_in_use_exception())
                    .unwrap_or(false) =>
            {
                Ok(false)
            }
            Err(e) => Err(sdk_unavailable("CreateTable", e)),
        }
    }

    /// Scan the whole table, following pagination, optionally filtered
    async fn scan(&self, filter: Option<(Facet, &str)>) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        let mut last_evaluated_key: Option<Item> = None;

        loop {
            let mut request = self.client.scan().table_name(&self.table_name);

            if let Some((facet, value)) = filter {
                request = request
                    .filter_expression("contains(#attr, :value)")
                    .expression_attribute_names("#attr", facet.attribute())
                    .expression_attribute_values(":value", AttributeValue::S(value.to_string()));
            }

            if let Some(key) = last_evaluated_key.take() {
                request = request.set_exclusive_start_key(Some(key));
            }

            let response = request
                .send()
                .await
                .map_err(|e| sdk_unavailable("Scan", e))?;

            for item in response.items() {
                match item_to_post(item) {
                    Ok(post) => posts.push(post),
                    Err(e) => tracing::warn!("Skipping item in {}: {}", self.table_name, e),
                }
            }

            last_evaluated_key = response.last_evaluated_key().cloned();
            if last_evaluated_key.is_none() {
                break;
            }
        }

        sort_newest_first(&mut posts);
        tracing::debug!("Scanned {} posts from {}", posts.len(), self.table_name);
        Ok(posts)
    }
}

#[async_trait]
impl PostStore for DynamoDbPostStore {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        self.scan(None).await
    }

    async fn get_post(&self, id: &str) -> Result<Post> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(ATTR_ID, AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| sdk_unavailable("GetItem", e))?;

        let item = response.item().ok_or_else(|| StoreError::not_found(id))?;
        item_to_post(item)
    }

    async fn list_posts_in(&self, facet: Facet, value: &str) -> Result<Vec<Post>> {
        // `contains` on a list also matches substrings of string attributes,
        // so re-check the decoded list.
        let posts = self.scan(Some((facet, value))).await?;
        Ok(posts.into_iter().filter(|p| p.has(facet, value)).collect())
    }

    async fn put_post(&self, post: &Post) -> Result<()> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(post_to_item(post)))
            .condition_expression("attribute_not_exists(#pk)")
            .expression_attribute_names("#pk", ATTR_ID)
            .send()
            .await;

        match result {
            Ok(_) => {
                tracing::info!("Stored post {} in {}", post.id, self.table_name);
                Ok(())
            }
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                Err(StoreError::AlreadyExists(post.id.clone()))
            }
            Err(e) => Err(sdk_unavailable("PutItem", e)),
        }
    }
}

fn sdk_unavailable<E, R>(operation: &str, err: SdkError<E, R>) -> StoreError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    StoreError::unavailable(format!(
        "DynamoDB {} failed: {}",
        operation,
        DisplayErrorContext(&err)
    ))
}

/// Convert a DynamoDB item to a post
pub(crate) fn item_to_post(item: &Item) -> Result<Post> {
    let id = item
        .get(ATTR_ID)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| StoreError::invalid_item("<unknown>", "missing id"))?;

    let string_attr = |name: &str| -> Result<String> {
        item.get(name)
            .and_then(|v| v.as_s().ok())
            .cloned()
            .ok_or_else(|| StoreError::invalid_item(&id, format!("missing {}", name)))
    };

    let title = string_attr(ATTR_TITLE)?;
    let body = string_attr(ATTR_BODY)?;

    let created_at = item
        .get(ATTR_CREATED_AT)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| parse_epoch(n))
        .and_then(Post::timestamp_from_epoch)
        .ok_or_else(|| StoreError::invalid_item(&id, format!("missing {}", ATTR_CREATED_AT)))?;

    let mut post = Post::new(id, title, body, created_at);
    post.categories = string_list(item.get(ATTR_CATEGORIES));
    post.tags = string_list(item.get(ATTR_TAGS));
    post.thumbnail = item
        .get(ATTR_THUMBNAIL)
        .and_then(|v| v.as_s().ok())
        .filter(|s| !s.is_empty())
        .cloned();
    post.author = item
        .get(ATTR_AUTHOR)
        .and_then(|v| v.as_m().ok())
        .map(|m| {
            let field = |name: &str| {
                m.get(name)
                    .and_then(|v| v.as_s().ok())
                    .cloned()
                    .unwrap_or_default()
            };
            Author {
                name: field(ATTR_AUTHOR_NAME),
                email: field(ATTR_AUTHOR_EMAIL),
            }
        });

    Ok(post)
}

/// Convert a post to a DynamoDB item
pub(crate) fn post_to_item(post: &Post) -> Item {
    let mut item = HashMap::new();
    item.insert(ATTR_ID.to_string(), AttributeValue::S(post.id.clone()));
    item.insert(ATTR_TITLE.to_string(), AttributeValue::S(post.title.clone()));
    item.insert(ATTR_BODY.to_string(), AttributeValue::S(post.body.clone()));
    item.insert(
        ATTR_CREATED_AT.to_string(),
        AttributeValue::N(post.created_epoch().to_string()),
    );
    item.insert(
        ATTR_CATEGORIES.to_string(),
        AttributeValue::L(
            post.categories
                .iter()
                .cloned()
                .map(AttributeValue::S)
                .collect(),
        ),
    );
    item.insert(
        ATTR_TAGS.to_string(),
        AttributeValue::L(post.tags.iter().cloned().map(AttributeValue::S).collect()),
    );

    if let Some(author) = &post.author {
        let mut m = HashMap::new();
        m.insert(
            ATTR_AUTHOR_NAME.to_string(),
            AttributeValue::S(author.name.clone()),
        );
        m.insert(
            ATTR_AUTHOR_EMAIL.to_string(),
            AttributeValue::S(author.email.clone()),
        );
        item.insert(ATTR_AUTHOR.to_string(), AttributeValue::M(m));
    }

    if let Some(thumbnail) = &post.thumbnail {
        item.insert(
            ATTR_THUMBNAIL.to_string(),
            AttributeValue::S(thumbnail.clone()),
        );
    }

    item
}

/// Epoch seconds from a DynamoDB number, which may carry a fraction
fn parse_epoch(n: &str) -> Option<i64> {
    n.parse::<i64>()
        .ok()
        .or_else(|| n.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
}

/// Strings from either a list (L) or a string set (SS) attribute
fn string_list(value: Option<&AttributeValue>) -> Vec<String> {
    match value {
        Some(AttributeValue::L(list)) => list
            .iter()
            .filter_map(|v| v.as_s().ok())
            .cloned()
            .collect(),
        Some(AttributeValue::Ss(set)) => set.clone(),
        Some(AttributeValue::S(single)) => vec![single.clone()],
        _ => Vec::new(),
    }
}
