//! [`Command`] for authorizing a [`User`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use jsonwebtoken::{Algorithm, Validation};
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`] by a [`session::Token`] issued by
/// the external authentication flow.
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeUserSession> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config.jwt_decoding_key,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        drop(
            self.database()
                .execute(Select(By::<Option<User>, _>::new(session.user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(session.user_id))
                .map_err(tracerr::wrap!())?,
        );

        Ok(session)
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// [`User`] the [`Session`] belongs to does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use std::time::{SystemTime, UNIX_EPOCH};

    use jsonwebtoken::{EncodingKey, Header};

    use crate::{
        domain::user::{self, Session},
        fixture, Command as _,
    };

    use super::{AuthorizeUserSession, ExecutionError};

    fn token(user_id: user::Id, ttl: i64) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let session = Session {
            user_id,
            expires_at: now.checked_add_signed(ttl).unwrap(),
        };
        jsonwebtoken::encode(
            &Header::default(),
            &session,
            &EncodingKey::from_secret(fixture::JWT_SECRET),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn authorizes_known_user() {
        let me = fixture::user("me");
        let svc = fixture::service(vec![], vec![], vec![me.clone()]).await;

        let session = svc
            .execute(AuthorizeUserSession {
                token: token(me.id, 600).into(),
            })
            .await
            .unwrap();

        assert_eq!(session.user_id, me.id);
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let me = fixture::user("me");
        let svc = fixture::service(vec![], vec![], vec![me.clone()]).await;

        let err = svc
            .execute(AuthorizeUserSession {
                token: token(me.id, -600).into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_user() {
        let svc = fixture::service(vec![], vec![], vec![]).await;

        let err = svc
            .execute(AuthorizeUserSession {
                token: token(user::Id::new(), 600).into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UserNotExists(_)));
    }
}
