//! Inbound parameter extraction and validation.
//!
//! Shape failures of paths and query strings are `400`. A JSON body that
//! cannot be decoded is `422`; a decoded body whose fields break a length or
//! range constraint is `400`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::{GatewayError, GatewayResult};

pub const MAX_TAKE: u32 = 30;
pub const MAX_TEXT_SEARCH: usize = 32;
pub const MAX_COMMENT: usize = 256;
pub const MAX_TITLE: usize = 32;
pub const MAX_DESCRIPTION: usize = 128;

/// Field-level constraints of a decoded input.
pub trait Validate {
    fn validate(&self) -> GatewayResult<()>;
}

/// Decode a JSON body and check its constraints.
pub fn decode_json<T>(bytes: &[u8]) -> GatewayResult<T>
where
    T: DeserializeOwned + Validate,
{
    let input: T = serde_json::from_slice(bytes)
        .map_err(|e| GatewayError::UnprocessableBody(format!("format problems: {}", e)))?;
    input.validate()?;
    Ok(input)
}

/// First value of `name` in a raw query string.
pub fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    let query = query?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Parse a required numeric id (≥ 1).
pub fn parse_id(raw: Option<&str>, name: &'static str) -> GatewayResult<u64> {
    let raw = raw.ok_or(GatewayError::MissingParam(name))?;
    match raw.parse::<u64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(GatewayError::BadRequest(format!("{} is not a valid {}", raw, name))),
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> GatewayResult<()> {
    let len = value.chars().count();
    if len == 0 || len > max {
        return Err(GatewayError::BadRequest(format!(
            "{} must be 1-{} characters",
            field, max
        )));
    }
    Ok(())
}

fn check_positive(field: &'static str, value: i64) -> GatewayResult<()> {
    if value < 1 {
        return Err(GatewayError::BadRequest(format!(
            "{} {} does not exist",
            field, value
        )));
    }
    Ok(())
}

/// Genre filter of the mehm listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Genre {
    Programming,
    Dhbw,
    Other,
}

impl Genre {
    /// `""` means "no filter".
    pub fn from_query(value: &str) -> GatewayResult<Option<Self>> {
        match value {
            "" => Ok(None),
            "PROGRAMMING" => Ok(Some(Genre::Programming)),
            "DHBW" => Ok(Some(Genre::Dhbw)),
            "OTHER" => Ok(Some(Genre::Other)),
            other => Err(GatewayError::BadRequest(format!("invalid genre {}", other))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Genre::Programming => "PROGRAMMING",
            Genre::Dhbw => "DHBW",
            Genre::Other => "OTHER",
        }
    }
}

/// Sort order of the mehm listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CreatedDate,
    Likes,
}

impl SortKey {
    pub fn from_query(value: &str) -> GatewayResult<Self> {
        match value {
            "createdDate" => Ok(SortKey::CreatedDate),
            "likes" => Ok(SortKey::Likes),
            other => Err(GatewayError::BadRequest(format!("invalid sort {}", other))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::CreatedDate => "createdDate",
            SortKey::Likes => "likes",
        }
    }
}

/// Pagination and filters of `GET /api/mehms`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MehmQuery {
    pub skip: Option<u32>,
    pub take: Option<u32>,
    pub text_search: Option<String>,
    pub genre: Option<Genre>,
    pub sort: Option<SortKey>,
}

impl MehmQuery {
    /// Parse and validate; unknown parameters are ignored.
    pub fn parse(query: Option<&str>) -> GatewayResult<Self> {
        let param = |name: &str| query_param(query, name);
        let mut parsed = Self::default();

        if let Some(skip) = param("skip") {
            parsed.skip = Some(
                skip.parse()
                    .map_err(|_| GatewayError::BadRequest(format!("invalid skip {}", skip)))?,
            );
        }
        if let Some(take) = param("take") {
            match take.parse::<u32>() {
                Ok(n) if (1..=MAX_TAKE).contains(&n) => parsed.take = Some(n),
                _ => {
                    return Err(GatewayError::BadRequest(format!(
                        "take must be 1-{}, got {}",
                        MAX_TAKE, take
                    )))
                }
            }
        }
        if let Some(text) = param("textSearch") {
            if text.chars().count() > MAX_TEXT_SEARCH {
                return Err(GatewayError::BadRequest(format!(
                    "textSearch must be at most {} characters",
                    MAX_TEXT_SEARCH
                )));
            }
            parsed.text_search = Some(text);
        }
        if let Some(genre) = param("genre") {
            parsed.genre = Genre::from_query(&genre)?;
        }
        if let Some(sort) = param("sort") {
            parsed.sort = Some(SortKey::from_query(&sort)?);
        }

        Ok(parsed)
    }

    /// Query parameters to send upstream.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(skip) = self.skip {
            pairs.push(("skip", skip.to_string()));
        }
        if let Some(take) = self.take {
            pairs.push(("take", take.to_string()));
        }
        if let Some(text) = &self.text_search {
            pairs.push(("textSearch", text.clone()));
        }
        if let Some(genre) = self.genre {
            pairs.push(("genre", genre.as_str().to_string()));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.as_str().to_string()));
        }
        pairs
    }
}

/// Body of `POST /api/comments/new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub mehm_id: i64,
    pub comment: String,
}

impl NewComment {
    /// Build from `mehmId` / `comment` query parameters.
    pub fn from_query(query: Option<&str>) -> GatewayResult<Self> {
        let raw_id = query_param(query, "mehmId").ok_or(GatewayError::MissingParam("mehmId"))?;
        let mehm_id = raw_id
            .parse()
            .map_err(|_| GatewayError::BadRequest(format!("{} is not a valid mehmId", raw_id)))?;
        let comment = query_param(query, "comment").ok_or(GatewayError::MissingParam("comment"))?;

        let input = Self { mehm_id, comment };
        input.validate()?;
        Ok(input)
    }
}

impl Validate for NewComment {
    fn validate(&self) -> GatewayResult<()> {
        check_positive("mehmId", self.mehm_id)?;
        check_len("comment", &self.comment, MAX_COMMENT)
    }
}

/// Body of `POST /api/comments/update`.
///
/// Accepts `text` as an alias of `comment`; the comment service reads `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentUpdate {
    pub id: i64,
    #[serde(alias = "text", rename(serialize = "text"))]
    pub comment: String,
}

impl Validate for CommentUpdate {
    fn validate(&self) -> GatewayResult<()> {
        check_positive("id", self.id)?;
        check_len("comment", &self.comment, MAX_COMMENT)
    }
}

/// Body of `POST /api/mehms/{id}/update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MehmUpdate {
    pub description: String,
    pub title: String,
}

impl Validate for MehmUpdate {
    fn validate(&self) -> GatewayResult<()> {
        check_len("description", &self.description, MAX_DESCRIPTION)?;
        check_len("title", &self.title, MAX_TITLE)
    }
}

/// Body of `POST /api/user/delete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteUser {
    pub id: String,
}

impl Validate for DeleteUser {
    fn validate(&self) -> GatewayResult<()> {
        if self.id.trim().is_empty() {
            return Err(GatewayError::MissingParam("id"));
        }
        if self.id.trim() != self.id {
            return Err(GatewayError::BadRequest(format!("invalid id {:?}", self.id)));
        }
        Ok(())
    }
}
