//! [`Context`]-related definitions.

use std::{
    future,
    sync::{
        atomic::{self, AtomicU16},
        Arc,
    },
};

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use common::DateTime;
use derive_more::Debug;
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};
use serde::Deserialize;
use service::domain::user;
use tokio::sync::OnceCell;

use crate::{api, define_error, AsError, Error, JuniperResponse, Service};

/// Application context.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// [`Auth`] access token verifier.
    auth: Auth,

    /// Error status code.
    error_status_code: AtomicU16,

    /// Parts of the HTTP request.
    parts: http::request::Parts,

    /// Current [`Session`].
    current_session: OnceCell<Session>,

    /// Last authentication [`Error`].
    auth_error: OnceCell<Error>,
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the error status code of this [`Context`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn error_status_code(&self) -> http::StatusCode {
        http::StatusCode::from_u16(
            self.error_status_code.load(atomic::Ordering::Relaxed),
        )
        .expect("invalid status code")
    }

    /// Sets the error status code for this [`Context`].
    ///
    /// Provided [`http::StatusCode`] will be applied to the response.
    pub fn set_error_status_code(&self, status_code: http::StatusCode) {
        self.error_status_code
            .store(status_code.as_u16(), atomic::Ordering::Relaxed);
    }

    /// Helper method calling [`Context::set_error_status_code()`] inside
    /// [`Result::map_err()`] closure.
    pub fn error(&self) -> impl FnOnce(Error) -> Error + '_ {
        move |err| {
            self.set_error_status_code(err.status_code);
            err
        }
    }

    /// Sets the current [`Session`] for this [`Context`].
    pub async fn set_current_session(&self, session: Session) {
        _ = self
            .current_session
            .get_or_init(|| future::ready(session))
            .await;
    }

    /// Tries to get the current [`Session`] for this [`Context`].
    ///
    /// [`None`] is returned if the current HTTP request carries no
    /// authorization at all, allowing anonymous access.
    ///
    /// # Errors
    ///
    /// Errors if the provided access token is invalid.
    pub async fn try_current_session(&self) -> Result<Option<Session>, Error> {
        self.current_session().await.map(Some).or_else(|e| {
            if e.code == Error::from(AuthError::AuthorizationRequired).code {
                Ok(None)
            } else {
                Err(e)
            }
        })
    }

    /// Returns the current [`Session`] for this [`Context`].
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the current HTTP request is not authorized;
    /// - the provided access token is invalid.
    pub async fn current_session(&self) -> Result<Session, Error> {
        self.current_session
            .get_or_try_init(|| async {
                match self
                    .auth_error
                    .get_or_try_init(|| async {
                        match self.do_authentication().await {
                            Ok(u) => Err(u),
                            Err(e) => Ok(e),
                        }
                    })
                    .await
                {
                    Ok(e) => Err(e),
                    Err(u) => Ok(u),
                }
            })
            .await
            .cloned()
            .map_err(Clone::clone)
    }

    /// Applies the [`juniper::Variables`] provided by the client on GraphQL
    /// subscription initialization.
    ///
    /// # Errors
    ///
    /// Errors if the provided variables are invalid.
    pub(crate) fn apply_subscription_variables(
        &mut self,
        vars: &juniper::Variables,
    ) -> Result<(), Error> {
        if let Some(token) = vars.get("authToken") {
            let token = token
                .as_string_value()
                .ok_or_else(|| Error::from(AuthError::InvalidVariables))?;
            let token = format!("Bearer {token}")
                .parse()
                .map_err(|_| Error::from(AuthError::InvalidVariables))?;
            drop(
                self.parts
                    .headers
                    .insert(http::header::AUTHORIZATION, token),
            );
        }

        Ok(())
    }

    /// Performs the [`Session`] authentication.
    ///
    /// # Errors
    ///
    /// Errors if the provided access token is missing, expired or has an
    /// invalid signature.
    async fn do_authentication(&self) -> Result<Session, Error> {
        let res = self
            .parts
            .clone()
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await;
        match res {
            Ok(TypedHeader(Authorization(bearer))) => self
                .auth
                .verify(bearer.token())
                .ok_or_else(|| AuthError::InvalidToken.into()),
            Err(e) => {
                if e.is_missing() {
                    Err(AuthError::AuthorizationRequired.into())
                } else {
                    Err(e.into_error())
                }
            }
        }
        .map_err(self.error())
    }
}

impl juniper::Context for Context {}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = JuniperResponse;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let missing = |name: &'static str| JuniperResponse {
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            response: GraphQLBatchResponse::Single(GraphQLResponse::error(
                Error::internal(&format!("missing `{name}` extension"))
                    .into_field_error(),
            )),
        };

        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| missing("Service"))?;
        let auth = parts
            .extensions
            .get::<Auth>()
            .cloned()
            .ok_or_else(|| missing("Auth"))?;

        Ok(Self {
            service,
            auth,
            error_status_code: AtomicU16::new(
                http::StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            ),
            parts: parts.clone(),
            current_session: OnceCell::new(),
            auth_error: OnceCell::new(),
        })
    }
}

/// Verifier of access tokens issued by the external identity provider.
#[derive(Clone, Debug)]
pub struct Auth {
    /// Key verifying token signatures.
    #[debug(skip)]
    decoding_key: Arc<jsonwebtoken::DecodingKey>,

    /// Token validation parameters.
    validation: jsonwebtoken::Validation,
}

impl Auth {
    /// Creates a new [`Auth`] verifying tokens signed with the provided
    /// secret.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: Arc::new(jsonwebtoken::DecodingKey::from_secret(
                secret.as_bytes(),
            )),
            validation: jsonwebtoken::Validation::default(),
        }
    }

    /// Verifies the provided access token, returning the [`Session`] it
    /// describes.
    ///
    /// [`None`] is returned if the token is expired or malformed.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<Session> {
        let token = jsonwebtoken::decode::<Claims>(
            token,
            &self.decoding_key,
            &self.validation,
        )
        .ok()?;
        Some(Session {
            user_id: token.claims.sub.into(),
            expires_at: DateTime::from_unix_timestamp(token.claims.exp)?,
        })
    }
}

/// Claims of an access token this application trusts.
#[derive(Debug, Deserialize)]
struct Claims {
    /// ID of the `User` the token was issued to.
    sub: user::Id,

    /// Unix timestamp of the token expiration.
    exp: i64,
}

/// User session.
#[derive(Clone, Copy, Debug)]
pub struct Session {
    /// ID of the `User` associated with this [`Session`].
    pub user_id: api::user::Id,

    /// [`DateTime`] when this [`Session`] expires.
    pub expires_at: DateTime,
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = "INVALID_ACCESS_TOKEN"]
        #[status = UNAUTHORIZED]
        #[message = "Invalid or expired access token"]
        InvalidToken,

        #[code = "INVALID_VARIABLES"]
        #[status = BAD_REQUEST]
        #[message = "Invalid subscription authorization variables"]
        InvalidVariables,
    }
}
