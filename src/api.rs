use crate::config::Firebase;
use crate::firestore::{profile_from_doc, DocModel, Document, Fields, ListResponse};
use crate::models::Profile;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Active user context established by a sign-in, registration, or token
/// refresh. All Firestore paths are scoped under `uid`.
#[derive(Clone, Debug)]
pub struct Session {
    pub uid: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
}

/// The fixed set of authentication failures surfaced on the auth form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthCode {
    WrongCredential,
    AccountNotFound,
    IdentityInUse,
    WeakCredential,
    InvalidIdentity,
    Other,
}

impl AuthCode {
    /// Firebase error messages sometimes carry a detail suffix
    /// ("WEAK_PASSWORD : Password should be at least 6 characters").
    fn from_wire(code: &str) -> AuthCode {
        let code = code.split_whitespace().next().unwrap_or(code);
        match code {
            "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => AuthCode::WrongCredential,
            "EMAIL_NOT_FOUND" => AuthCode::AccountNotFound,
            "EMAIL_EXISTS" => AuthCode::IdentityInUse,
            "WEAK_PASSWORD" => AuthCode::WeakCredential,
            "INVALID_EMAIL" => AuthCode::InvalidIdentity,
            _ => AuthCode::Other,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthCode::WrongCredential => "Wrong password or PIN",
            AuthCode::AccountNotFound => "No account with that identity",
            AuthCode::IdentityInUse => "That identity is already taken",
            AuthCode::WeakCredential => "Password or PIN is too weak",
            AuthCode::InvalidIdentity => "That does not look like a valid identity",
            AuthCode::Other => "Sign-in failed, please try again",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", .0.message())]
    Auth(AuthCode),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("remote store error: {0}")]
    Remote(String),
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(rename = "localId")]
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(rename = "idToken")]
    id_token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    user_id: String,
    id_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

pub struct Api {
    client: Client,
    api_key: String,
    project_id: String,
}

impl Api {
    pub fn new(firebase: &Firebase) -> Api {
        Api {
            client: Client::new(),
            api_key: firebase.api_key.clone(),
            project_id: firebase.project_id.clone(),
        }
    }

    fn auth_url(&self, action: &str) -> String {
        format!(
            "https://identitytoolkit.googleapis.com/v1/accounts:{}?key={}",
            action, self.api_key
        )
    }

    fn user_url(&self, uid: &str) -> String {
        format!(
            "https://firestore.googleapis.com/v1/projects/{}/databases/(default)/documents/users/{}",
            self.project_id, uid
        )
    }

    async fn auth_request(&self, action: &str, email: &str, password: &str) -> Result<Session, ApiError> {
        let body = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });
        let res = self
            .client
            .post(self.auth_url(action))
            .json(&body)
            .send()
            .await?;
        if res.status().is_success() {
            let auth = res.json::<AuthResponse>().await?;
            Ok(Session {
                uid: auth.local_id,
                email: auth.email,
                id_token: auth.id_token,
                refresh_token: auth.refresh_token,
            })
        } else {
            let body = res.json::<ErrorBody>().await?;
            Err(ApiError::Auth(AuthCode::from_wire(&body.error.message)))
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        self.auth_request("signInWithPassword", email, password).await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        self.auth_request("signUp", email, password).await
    }

    /// Exchange a persisted refresh token for a fresh session at startup.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ApiError> {
        let url = format!("https://securetoken.googleapis.com/v1/token?key={}", self.api_key);
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        let res = self.client.post(url).form(&form).send().await?;
        if res.status().is_success() {
            let refreshed = res.json::<RefreshResponse>().await?;
            Ok(Session {
                uid: refreshed.user_id,
                email: String::new(),
                id_token: refreshed.id_token,
                refresh_token: refreshed.refresh_token,
            })
        } else {
            Err(ApiError::Auth(AuthCode::Other))
        }
    }

    /// Fetch every document of one collection for the signed-in user,
    /// following page tokens. Documents that do not decode are skipped.
    pub async fn list<T: DocModel>(&self, session: &Session) -> Result<Vec<T>, ApiError> {
        let url = format!("{}/{}", self.user_url(&session.uid), T::COLLECTION);
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut query: Vec<(&str, String)> = vec![("pageSize", "300".to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }
            let res = self
                .client
                .get(&url)
                .query(&query)
                .bearer_auth(&session.id_token)
                .send()
                .await?;
            let res = check_store_status(res).await?;
            let list = res.json::<ListResponse>().await?;
            records.extend(list.documents.iter().filter_map(T::from_doc));
            match list.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => return Ok(records),
            }
        }
    }

    /// Persist a new record; the server assigns the document id.
    pub async fn create<T: DocModel>(&self, session: &Session, record: &T) -> Result<Document, ApiError> {
        let url = format!("{}/{}", self.user_url(&session.uid), T::COLLECTION);
        let res = self
            .client
            .post(url)
            .bearer_auth(&session.id_token)
            .json(&Document::new(record.to_fields()))
            .send()
            .await?;
        let res = check_store_status(res).await?;
        Ok(res.json::<Document>().await?)
    }

    /// Field-masked update: only the given fields are touched on the server.
    pub async fn patch(
        &self,
        session: &Session,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), ApiError> {
        let url = format!("{}/{}/{}", self.user_url(&session.uid), collection, id);
        let mask: Vec<(&str, String)> = fields
            .keys()
            .map(|key| ("updateMask.fieldPaths", key.clone()))
            .collect();
        let res = self
            .client
            .patch(url)
            .query(&mask)
            .bearer_auth(&session.id_token)
            .json(&Document::new(fields))
            .send()
            .await?;
        check_store_status(res).await?;
        Ok(())
    }

    pub async fn delete(&self, session: &Session, collection: &str, id: &str) -> Result<(), ApiError> {
        let url = format!("{}/{}/{}", self.user_url(&session.uid), collection, id);
        let res = self
            .client
            .delete(url)
            .bearer_auth(&session.id_token)
            .send()
            .await?;
        check_store_status(res).await?;
        Ok(())
    }

    /// The profile document is created lazily; a missing document reads as the
    /// default profile.
    pub async fn fetch_profile(&self, session: &Session) -> Result<Profile, ApiError> {
        let res = self
            .client
            .get(self.user_url(&session.uid))
            .bearer_auth(&session.id_token)
            .send()
            .await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(Profile::default());
        }
        let res = check_store_status(res).await?;
        let doc = res.json::<Document>().await?;
        Ok(profile_from_doc(&doc))
    }

    pub async fn patch_profile(&self, session: &Session, fields: Fields) -> Result<(), ApiError> {
        let url = self.user_url(&session.uid);
        let mask: Vec<(&str, String)> = fields
            .keys()
            .map(|key| ("updateMask.fieldPaths", key.clone()))
            .collect();
        let res = self
            .client
            .patch(url)
            .query(&mask)
            .bearer_auth(&session.id_token)
            .json(&Document::new(fields))
            .send()
            .await?;
        check_store_status(res).await?;
        Ok(())
    }
}

async fn check_store_status(res: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    if res.status().is_success() {
        Ok(res)
    } else {
        let status = res.status();
        let detail = res.text().await.unwrap_or_default();
        Err(ApiError::Remote(format!("{}: {}", status, detail)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_auth_code_mapping() {
        assert_eq!(AuthCode::from_wire("EMAIL_NOT_FOUND"), AuthCode::AccountNotFound);
        assert_eq!(AuthCode::from_wire("INVALID_LOGIN_CREDENTIALS"), AuthCode::WrongCredential);
        assert_eq!(AuthCode::from_wire("EMAIL_EXISTS"), AuthCode::IdentityInUse);
        assert_eq!(
            AuthCode::from_wire("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthCode::WeakCredential
        );
        assert_eq!(AuthCode::from_wire("TOO_MANY_ATTEMPTS_TRY_LATER"), AuthCode::Other);
    }
}
