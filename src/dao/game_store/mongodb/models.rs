use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::MongoDaoError;
use crate::dao::models::{GameEntity, GameStateEntity, UserEntity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUserDocument {
    #[serde(rename = "_id")]
    id: String,
    username: String,
    email: String,
    created_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: String,
    user_id: String,
    created_at: DateTime,
    updated_at: DateTime,
    state: GameStateEntity,
    #[serde(default)]
    finished: bool,
}

impl From<UserEntity> for MongoUserDocument {
    fn from(value: UserEntity) -> Self {
        Self {
            id: value.id.to_string(),
            username: value.username,
            email: value.email,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoUserDocument> for UserEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoUserDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&value.id)?,
            username: value.username,
            email: value.email,
            created_at: value.created_at.to_system_time(),
        })
    }
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
            state: value.state,
            finished: value.finished,
        }
    }
}

impl TryFrom<MongoGameDocument> for GameEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoGameDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&value.id)?,
            user_id: parse_id(&value.user_id)?,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
            state: value.state,
            finished: value.finished,
        })
    }
}

fn parse_id(value: &str) -> Result<Uuid, MongoDaoError> {
    Uuid::parse_str(value).map_err(|source| MongoDaoError::InvalidId {
        value: value.to_owned(),
        source,
    })
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

pub fn user_filter(user_id: Uuid) -> Document {
    doc! {"user_id": user_id.to_string()}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::game::{GameSession, User};

    #[test]
    fn game_document_keeps_identifiers_as_strings() {
        let entity: GameEntity = GameSession::new(Uuid::new_v4()).into();
        let document = MongoGameDocument::from(entity.clone());
        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["_id"], entity.id.to_string());
        assert_eq!(json["user_id"], entity.user_id.to_string());
        assert_eq!(json["state"]["rolls_left"], 3);

        let back = GameEntity::try_from(document).unwrap();
        assert_eq!(back.id, entity.id);
        assert_eq!(back.state, entity.state);
    }

    #[test]
    fn malformed_id_is_reported() {
        let mut document = MongoUserDocument::from(UserEntity::from(User::new(
            "carol".into(),
            "carol@example.com".into(),
        )));
        document.id = "not-a-uuid".into();
        assert!(matches!(
            UserEntity::try_from(document),
            Err(MongoDaoError::InvalidId { .. })
        ));
    }

    #[test]
    fn user_document_round_trips() {
        let entity: UserEntity = User::new("alice".into(), "alice@example.com".into()).into();
        let back = UserEntity::try_from(MongoUserDocument::from(entity.clone())).unwrap();
        assert_eq!(back.id, entity.id);
        assert_eq!(back.username, entity.username);
    }
}
