//! The remote hosting service seam and its HTTP implementation.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{
    header::HeaderValue,
    multipart::{Form, Part},
    Body, Client, RequestBuilder, Response,
};
use shared::{
    domain::{Percentage, SessionId, VideoId},
    protocol::{
        Endpoint, VideoMetadata, CATEGORY_HEADER, CSRF_TOKEN_HEADER, DESCRIPTION_HEADER,
        FILESIZE_HEADER, STATUS_HEADER, TAGS_HEADER, TITLE_HEADER, UPLOAD_FILE_FIELD,
    },
};
use tokio_util::io::ReaderStream;
use tracing::debug;
use url::Url;

use crate::{
    metadata::VideoMetadataForm,
    staging::{FileSource, StagedFile},
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait VideoHost: Send + Sync {
    async fn upload(
        &self,
        session_id: &SessionId,
        file: &StagedFile,
        form: &VideoMetadataForm,
    ) -> Result<()>;
    async fn progress(&self, session_id: &SessionId) -> Result<Percentage>;
    async fn cancel(&self, session_id: &SessionId) -> Result<()>;
    async fn video_id(&self, session_id: &SessionId) -> Result<VideoId>;
    async fn update(&self, session_id: &SessionId, metadata: &VideoMetadata) -> Result<()>;
}

pub struct MissingVideoHost;

#[async_trait]
impl VideoHost for MissingVideoHost {
    async fn upload(
        &self,
        session_id: &SessionId,
        _file: &StagedFile,
        _form: &VideoMetadataForm,
    ) -> Result<()> {
        Err(anyhow!("video host unavailable for session {session_id}"))
    }

    async fn progress(&self, session_id: &SessionId) -> Result<Percentage> {
        Err(anyhow!("video host unavailable for session {session_id}"))
    }

    async fn cancel(&self, session_id: &SessionId) -> Result<()> {
        Err(anyhow!("video host unavailable for session {session_id}"))
    }

    async fn video_id(&self, session_id: &SessionId) -> Result<VideoId> {
        Err(anyhow!("video host unavailable for session {session_id}"))
    }

    async fn update(&self, session_id: &SessionId, _metadata: &VideoMetadata) -> Result<()> {
        Err(anyhow!("video host unavailable for session {session_id}"))
    }
}

pub struct HttpVideoHost {
    http: Client,
    base_url: Url,
    csrf_token: Option<String>,
    request_timeout: Duration,
}

impl HttpVideoHost {
    pub fn new(base_url: &str, csrf_token: Option<String>) -> Result<Self> {
        Self::with_client(Client::new(), base_url, csrf_token)
    }

    pub fn with_client(http: Client, base_url: &str, csrf_token: Option<String>) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid base url '{base_url}'"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("base url '{base_url}' cannot carry a path"));
        }
        Ok(Self {
            http,
            base_url,
            csrf_token: csrf_token.filter(|token| !token.trim().is_empty()),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Applies to every call except the upload, whose duration scales with file size.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn endpoint_url(&self, session_id: &SessionId, endpoint: Endpoint) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("base url '{}' cannot carry a path", self.base_url))?
            .pop_if_empty()
            .extend(endpoint.path_segments(session_id));
        Ok(url)
    }

    fn with_csrf(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.csrf_token {
            Some(token) => request.header(CSRF_TOKEN_HEADER, token),
            None => request,
        }
    }

    async fn get(&self, session_id: &SessionId, endpoint: Endpoint) -> Result<Response> {
        let url = self.endpoint_url(session_id, endpoint)?;
        debug!(%url, "GET");
        let response = self
            .with_csrf(self.http.get(url))
            .timeout(self.request_timeout)
            .send()
            .await
            .with_context(|| format!("{} request failed", endpoint.segment()))?
            .error_for_status()?;
        Ok(response)
    }
}

/// Header values cannot carry control characters; user text is flattened.
fn metadata_header(value: &str) -> Result<HeaderValue> {
    let flattened: String = value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    HeaderValue::from_bytes(flattened.as_bytes())
        .with_context(|| format!("metadata value cannot be sent as a header: {value:?}"))
}

#[async_trait]
impl VideoHost for HttpVideoHost {
    async fn upload(
        &self,
        session_id: &SessionId,
        file: &StagedFile,
        form: &VideoMetadataForm,
    ) -> Result<()> {
        let url = self.endpoint_url(session_id, Endpoint::Upload)?;
        let part = match file.source() {
            FileSource::Bytes(bytes) => Part::bytes(bytes.clone()),
            FileSource::Path(path) => {
                let handle = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("failed to open {}", path.display()))?;
                Part::stream_with_length(Body::wrap_stream(ReaderStream::new(handle)), file.size())
            }
        }
        .file_name(file.file_name().to_string());

        debug!(%url, size = file.size(), "POST upload");
        self.with_csrf(self.http.post(url))
            .header(FILESIZE_HEADER, file.size().to_string())
            .header(TITLE_HEADER, metadata_header(&form.title)?)
            .header(DESCRIPTION_HEADER, metadata_header(&form.description)?)
            .header(TAGS_HEADER, metadata_header(&form.tags)?)
            .header(CATEGORY_HEADER, metadata_header(&form.category)?)
            .header(STATUS_HEADER, metadata_header(&form.status)?)
            .multipart(Form::new().part(UPLOAD_FILE_FIELD, part))
            .send()
            .await
            .context("upload request failed")?
            .error_for_status()?;
        Ok(())
    }

    async fn progress(&self, session_id: &SessionId) -> Result<Percentage> {
        let body = self.get(session_id, Endpoint::Progress).await?.text().await?;
        Ok(Percentage::parse(&body)?)
    }

    async fn cancel(&self, session_id: &SessionId) -> Result<()> {
        self.get(session_id, Endpoint::Cancel).await?;
        Ok(())
    }

    async fn video_id(&self, session_id: &SessionId) -> Result<VideoId> {
        let body = self.get(session_id, Endpoint::VideoId).await?.text().await?;
        Ok(VideoId::new(body)?)
    }

    async fn update(&self, session_id: &SessionId, metadata: &VideoMetadata) -> Result<()> {
        let url = self.endpoint_url(session_id, Endpoint::Update)?;
        debug!(%url, "POST update");
        self.with_csrf(self.http.post(url))
            .timeout(self.request_timeout)
            .json(metadata)
            .send()
            .await
            .context("update request failed")?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
