use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT Claims结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (user id，超级管理员为用户名)
    pub username: String,
    pub exp: usize, // expiration time
    pub iat: usize, // issued at
    pub iss: String, // issuer
}

impl Claims {
    pub fn new(sub: String, username: String, issuer: String, expiration_seconds: u64) -> Self {
        let now = Utc::now().timestamp().max(0) as usize;

        Self {
            sub,
            username,
            exp: now + expiration_seconds as usize,
            iat: now,
            iss: issuer,
        }
    }
}

/// JWT服务
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    expiration: u64,
}

impl JwtService {
    /// 创建新的JWT服务
    pub fn new(secret: &str, issuer: String, expiration: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            issuer,
            expiration,
        }
    }

    /// 生成JWT令牌
    pub fn generate(
        &self,
        user_id: &str,
        username: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims::new(
            user_id.to_string(),
            username.to_string(),
            self.issuer.clone(),
            self.expiration,
        );
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// 验证JWT令牌
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// 获取过期时间（秒）
    pub fn expiration(&self) -> u64 {
        self.expiration
    }
}
