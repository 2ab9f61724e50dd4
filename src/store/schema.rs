//! DynamoDB table schema constants
//!
//! ```text
//! Table: blog (configurable via BLOGTABLE)
//!
//! Primary Key:
//!   - id (String, Partition Key)
//!
//! Attributes:
//!   - title: String
//!   - body: String (markdown)
//!   - created_at: Number (Unix epoch seconds)
//!   - categories: List of String (optional)
//!   - tags: List of String (optional)
//!   - author: Map { name: String, email: String } (optional)
//!   - thumbnail: String (optional)
//! ```

/// Primary key attribute
pub const ATTR_ID: &str = "id";

pub const ATTR_TITLE: &str = "title";

pub const ATTR_BODY: &str = "body";

/// Creation time, epoch seconds
pub const ATTR_CREATED_AT: &str = "created_at";

pub const ATTR_CATEGORIES: &str = "categories";

pub const ATTR_TAGS: &str = "tags";

/// Map with `name` and `email`
pub const ATTR_AUTHOR: &str = "author";

pub const ATTR_AUTHOR_NAME: &str = "name";

pub const ATTR_AUTHOR_EMAIL: &str = "email";

pub const ATTR_THUMBNAIL: &str = "thumbnail";
