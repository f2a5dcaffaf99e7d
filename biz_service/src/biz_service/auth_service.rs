use common::config::AdminConfig;
use common::errors::AppError;
use common::repository_util::RepoResult;
use common::util::common_utils::{build_md5_with_key, secure_eq};
use common::util::date_util::now;
use log::warn;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 已验证的后台会话
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AdminSession {
    pub username: String,
    pub role: String,
    /// 过期时间（Unix 秒）
    pub expires_at: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResult {
    pub token: String,
    #[serde(flatten)]
    pub session: AdminSession,
}

/// 配置中的固定账号登录，签发 `hex(username|role|expiry).md5(key + payload)` 形式的 token
pub struct AuthService {
    admin: AdminConfig,
    md5_key: String,
}

impl AuthService {
    pub fn new(admin: AdminConfig, md5_key: impl Into<String>) -> Self {
        Self { admin, md5_key: md5_key.into() }
    }

    pub fn token_ttl_secs(&self) -> i64 {
        self.admin.token_ttl_secs
    }

    pub fn login(&self, request: &LoginRequest) -> RepoResult<LoginResult> {
        let digest = build_md5_with_key(&self.md5_key, &request.password);
        let account = self
            .admin
            .users
            .iter()
            .find(|u| u.username == request.username && secure_eq(&u.password_md5.to_lowercase(), &digest));
        let Some(account) = account else {
            warn!("rejected admin login for {}", request.username);
            return Err(AppError::Unauthorized("Invalid username or password".to_string()));
        };
        let session = AdminSession {
            username: account.username.clone(),
            role: account.role.clone(),
            expires_at: now() + self.admin.token_ttl_secs,
        };
        Ok(LoginResult { token: self.sign(&session), session })
    }

    pub fn sign(&self, session: &AdminSession) -> String {
        let payload = format!("{}|{}|{}", session.username, session.role, session.expires_at);
        let signature = build_md5_with_key(&self.md5_key, &payload);
        format!("{}.{}", hex::encode(payload), signature)
    }

    /// 签名不对、格式错误或已过期都返回 None
    pub fn verify(&self, token: &str) -> Option<AdminSession> {
        let (encoded, signature) = token.trim().split_once('.')?;
        let payload = String::from_utf8(hex::decode(encoded).ok()?).ok()?;
        if !secure_eq(&build_md5_with_key(&self.md5_key, &payload), signature) {
            return None;
        }
        let mut parts = payload.rsplitn(3, '|');
        let expires_at: i64 = parts.next()?.parse().ok()?;
        let role = parts.next()?.to_string();
        let username = parts.next()?.to_string();
        if expires_at <= now() {
            return None;
        }
        Some(AdminSession { username, role, expires_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::config::AdminAccount;

    fn service(ttl: i64) -> AuthService {
        let admin = AdminConfig {
            token_ttl_secs: ttl,
            users: vec![AdminAccount {
                username: "admin".into(),
                password_md5: build_md5_with_key("secret-key", "admin123"),
                role: "admin".into(),
            }],
        };
        AuthService::new(admin, "secret-key")
    }

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest { username: username.into(), password: password.into() }
    }

    #[test]
    fn issued_token_round_trips() {
        let svc = service(3600);
        let result = svc.login(&login("admin", "admin123")).unwrap();
        let session = svc.verify(&result.token).unwrap();
        assert_eq!(session, result.session);
        assert_eq!(session.role, "admin");
    }

    #[test]
    fn wrong_password_is_unauthorized() {
        let svc = service(3600);
        assert!(matches!(svc.login(&login("admin", "nope")).unwrap_err(), AppError::Unauthorized(_)));
        assert!(svc.login(&login("root", "admin123")).is_err());
    }

    #[test]
    fn tampered_or_expired_tokens_are_rejected() {
        let svc = service(3600);
        let token = svc.login(&login("admin", "admin123")).unwrap().token;
        let (_, signature) = token.split_once('.').unwrap();
        let forged = format!("{}.{}", hex::encode("admin|admin|9999999999"), signature);
        assert!(svc.verify(&forged).is_none());
        assert!(svc.verify("garbage").is_none());

        let expired = service(-10);
        let token = expired.login(&login("admin", "admin123")).unwrap().token;
        assert!(expired.verify(&token).is_none());
    }
}
