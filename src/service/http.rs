//! HTTP-backed implementation of the remote note service.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};

use super::api::NoteService;
use super::types::{AttachmentMetadata, NewNote, Note, NoteId, UserProfile, UserRole};

/// JSON client for the remote note service.
#[derive(Clone)]
pub struct HttpNoteService {
  http: reqwest::Client,
  base: Url,
  token: Option<String>,
}

impl HttpNoteService {
  pub fn new(config: &Config) -> Result<Self> {
    let base = Url::parse(&config.service.url)
      .map_err(|e| Error::Config(format!("invalid service url {}: {}", config.service.url, e)))?;

    let http = reqwest::Client::builder()
      .build()
      .map_err(|e| Error::Remote(format!("failed to build http client: {}", e)))?;

    Ok(Self {
      http,
      base,
      token: Config::get_api_token().ok(),
    })
  }

  fn endpoint(&self, path: &str) -> Result<Url> {
    self
      .base
      .join(path)
      .map_err(|e| Error::Remote(format!("invalid endpoint {}: {}", path, e)))
  }

  fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
    let builder = self.http.request(method, url);
    match &self.token {
      Some(token) => builder.bearer_auth(token),
      None => builder,
    }
  }

  async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
    let url = self.endpoint(path)?;
    let response = self
      .request(reqwest::Method::GET, url)
      .send()
      .await
      .map_err(|e| Error::Remote(format!("GET {} failed: {}", path, e)))?;

    Self::check_status(path, &response)?;

    response
      .json()
      .await
      .map_err(|e| Error::Remote(format!("failed to parse {} response: {}", path, e)))
  }

  fn check_status(path: &str, response: &reqwest::Response) -> Result<()> {
    let status = response.status();
    match status {
      StatusCode::NOT_FOUND | StatusCode::FORBIDDEN => Err(Error::NotFoundOrForbidden),
      s if s.is_success() => Ok(()),
      s => Err(Error::Remote(format!("{} returned {}", path, s))),
    }
  }
}

#[derive(Deserialize)]
struct SubmitResponse {
  id: NoteId,
}

#[async_trait]
impl NoteService for HttpNoteService {
  async fn get_verified_notes(&self) -> Result<Vec<Note>> {
    self.get_json("notes/verified").await
  }

  async fn get_my_submissions(&self) -> Result<Vec<Note>> {
    self.get_json("notes/mine").await
  }

  async fn get_note_by_id(&self, id: NoteId) -> Result<Note> {
    self.get_json(&format!("notes/{}", id)).await
  }

  async fn submit_note(
    &self,
    subject: &str,
    unit: &str,
    title: &str,
    description: &str,
    attachments: Vec<AttachmentMetadata>,
  ) -> Result<NoteId> {
    let url = self.endpoint("notes")?;
    let body = NewNote {
      subject: subject.to_string(),
      unit: unit.to_string(),
      title: title.to_string(),
      description: description.to_string(),
      attachments,
    };

    let response = self
      .request(reqwest::Method::POST, url)
      .json(&body)
      .send()
      .await
      .map_err(|e| Error::Remote(format!("failed to submit note: {}", e)))?;

    Self::check_status("notes", &response)?;

    let submitted: SubmitResponse = response
      .json()
      .await
      .map_err(|e| Error::Remote(format!("failed to parse submit response: {}", e)))?;

    Ok(submitted.id)
  }

  async fn verify_note(&self, id: NoteId, reject_reason: Option<String>) -> Result<()> {
    let path = format!("notes/{}/verify", id);
    let url = self.endpoint(&path)?;
    let body = serde_json::json!({ "rejectReason": reject_reason });

    let response = self
      .request(reqwest::Method::POST, url)
      .json(&body)
      .send()
      .await
      .map_err(|e| Error::Remote(format!("failed to verify note {}: {}", id, e)))?;

    Self::check_status(&path, &response)
  }

  async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>> {
    match self.get_json::<UserProfile>("profile").await {
      Ok(profile) => Ok(Some(profile)),
      Err(Error::NotFoundOrForbidden) => Ok(None),
      Err(e) => Err(e),
    }
  }

  async fn save_caller_user_profile(&self, profile: UserProfile) -> Result<()> {
    let url = self.endpoint("profile")?;

    let response = self
      .request(reqwest::Method::PUT, url)
      .json(&profile)
      .send()
      .await
      .map_err(|e| Error::Remote(format!("failed to save profile: {}", e)))?;

    Self::check_status("profile", &response)
  }

  async fn is_caller_admin(&self) -> Result<bool> {
    self.get_json("roles/me/admin").await
  }

  async fn get_caller_user_role(&self) -> Result<UserRole> {
    self.get_json("roles/me").await
  }
}
