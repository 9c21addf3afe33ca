use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// 本地账户
///
/// 登录只是对内置账户表的本地校验，不提供真实的认证与安全保障
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub is_guest: bool,
}

impl User {
    pub fn guest() -> User {
        User {
            id: "guest".to_string(),
            email: "guest@analogfilms.com".to_string(),
            name: "Guest User".to_string(),
            is_guest: true,
        }
    }
}

lazy_static! {
    /// 内置测试账户
    pub static ref LOCAL_USERS: Vec<User> = vec![
        User {
            id: "admin".to_string(),
            email: "admin@analogfilms.com".to_string(),
            name: "Admin User".to_string(),
            is_guest: false,
        },
        User {
            id: "user1".to_string(),
            email: "user@test.com".to_string(),
            name: "Test User".to_string(),
            is_guest: false,
        },
        User {
            id: "demo".to_string(),
            email: "demo@demo.com".to_string(),
            name: "Demo User".to_string(),
            is_guest: false,
        },
    ];

    /// 内置账户口令摘要表（sha256 hex）
    pub static ref LOCAL_PASSWORD_DIGESTS: Vec<(&'static str, &'static str)> = vec![
        (
            "admin@analogfilms.com",
            "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9",
        ),
        (
            "user@test.com",
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8",
        ),
        (
            "demo@demo.com",
            "2a97516c354b68848cdbd8f54a226a0a55b21ed138e207ad6c5cbb9c00aa5aea",
        ),
    ];
}

/// 口令摘要（sha256 hex）
pub fn password_digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 认证错误
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("An unknown error occurred")]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_digest_matches_builtin_table() {
        let digest = password_digest("admin123");
        let expected = LOCAL_PASSWORD_DIGESTS
            .iter()
            .find(|(email, _)| *email == "admin@analogfilms.com")
            .map(|(_, d)| *d)
            .unwrap();
        assert_eq!(digest, expected);
    }

    #[test]
    fn test_wrong_password_does_not_match() {
        let digest = password_digest("not-the-password");
        assert!(LOCAL_PASSWORD_DIGESTS.iter().all(|(_, d)| *d != digest));
    }
}
