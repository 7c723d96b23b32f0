use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::error::CouchDaoError;
use crate::dao::models::{GameEntity, GameStateEntity, UserEntity};

pub const GAME_PREFIX: &str = "game::";
pub const USER_PREFIX: &str = "user::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    #[serde(default)]
    pub doc: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchUserDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub user: UserBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBody {
    pub username: String,
    pub email: String,
    pub created_at: SystemTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchGameDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub game: GameBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameBody {
    pub user_id: Uuid,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
    pub state: GameStateEntity,
    #[serde(default)]
    pub finished: bool,
}

impl From<(UserEntity, Option<String>)> for CouchUserDocument {
    fn from((user, rev): (UserEntity, Option<String>)) -> Self {
        Self {
            id: user_doc_id(user.id),
            rev,
            user: UserBody {
                username: user.username,
                email: user.email,
                created_at: user.created_at,
            },
        }
    }
}

impl TryFrom<CouchUserDocument> for UserEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchUserDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: extract_uuid(&doc.id)?,
            username: doc.user.username,
            email: doc.user.email,
            created_at: doc.user.created_at,
        })
    }
}

impl From<(GameEntity, Option<String>)> for CouchGameDocument {
    fn from((game, rev): (GameEntity, Option<String>)) -> Self {
        Self {
            id: game_doc_id(game.id),
            rev,
            game: GameBody {
                user_id: game.user_id,
                created_at: game.created_at,
                updated_at: game.updated_at,
                state: game.state,
                finished: game.finished,
            },
        }
    }
}

impl TryFrom<CouchGameDocument> for GameEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchGameDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: extract_uuid(&doc.id)?,
            user_id: doc.game.user_id,
            created_at: doc.game.created_at,
            updated_at: doc.game.updated_at,
            state: doc.game.state,
            finished: doc.game.finished,
        })
    }
}

pub fn game_doc_id(id: Uuid) -> String {
    format!("{}{}", GAME_PREFIX, id)
}

pub fn user_doc_id(id: Uuid) -> String {
    format!("{}{}", USER_PREFIX, id)
}

pub fn extract_uuid(doc_id: &str) -> Result<Uuid, CouchDaoError> {
    let (_, id) = doc_id
        .split_once("::")
        .ok_or_else(|| CouchDaoError::InvalidDocId {
            doc_id: doc_id.to_string(),
            kind: "missing separator",
        })?;

    Uuid::parse_str(id).map_err(|_| CouchDaoError::InvalidDocId {
        doc_id: doc_id.to_string(),
        kind: "invalid UUID",
    })
}
