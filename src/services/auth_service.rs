use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::FilmRepository;
use crate::models::{password_digest, AuthError, User, LOCAL_PASSWORD_DIGESTS, LOCAL_USERS};

/// 当前登录会话
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// 本地认证服务
///
/// 只对内置账户表做口令摘要比对并记住最近一次登录，
/// 不提供真实的认证与安全保障
pub struct AuthService {
    repository: Arc<dyn FilmRepository>,
    current: RwLock<Option<Session>>,
}

impl AuthService {
    pub fn new(repository: Arc<dyn FilmRepository>) -> Self {
        Self {
            repository,
            current: RwLock::new(None),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let digest = password_digest(password);
        let stored = LOCAL_PASSWORD_DIGESTS
            .iter()
            .find(|(known_email, _)| *known_email == email)
            .map(|(_, stored_digest)| *stored_digest);

        match stored {
            Some(stored_digest) if stored_digest == digest => {}
            _ => return Err(AuthError::InvalidCredentials),
        }

        let user = LOCAL_USERS
            .iter()
            .find(|user| user.email == email)
            .cloned()
            .ok_or(AuthError::UserNotFound)?;

        let session = Session {
            user,
            token: Uuid::new_v4().to_string(),
        };

        self.remember(&session).await;
        tracing::info!("User logged in: {}", session.user.email);

        Ok(session)
    }

    pub async fn login_as_guest(&self) -> Session {
        let session = Session {
            user: User::guest(),
            token: Uuid::new_v4().to_string(),
        };

        self.remember(&session).await;
        tracing::info!("Guest session started");

        session
    }

    pub async fn logout(&self) {
        *self.current.write().await = None;

        if let Err(err) = self.repository.clear_user().await {
            tracing::warn!("Failed to clear saved user: {}", err);
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|session| session.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// 启动时恢复最近一次登录的账户
    pub async fn load_saved_user(&self) {
        match self.repository.load_user().await {
            Ok(Some(user)) => {
                tracing::info!("Restored saved session for {}", user.email);
                *self.current.write().await = Some(Session {
                    user,
                    token: Uuid::new_v4().to_string(),
                });
            }
            Ok(None) => {}
            Err(err) => tracing::warn!("Failed to load saved user: {}", err),
        }
    }

    async fn remember(&self, session: &Session) {
        *self.current.write().await = Some(session.clone());

        if let Err(err) = self.repository.save_user(&session.user).await {
            tracing::warn!("Failed to persist session: {}", err);
        }
    }
}
