//! HTTP implementation of the remote store

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::models::{
    CourseId, DeleteResponse, Material, MaterialDraft, MaterialId, MaterialOrderPatch,
    NewMaterial, NewSection, Section, SectionId, SectionOrderPatch, SectionPatch,
};
use super::remote::RemoteStore;
use crate::config::ApiConfig;

/// REST client for the course backend
#[derive(Debug, Clone)]
pub struct CourseClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl CourseClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        log::trace!("{} {}", method, url);
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, what: &str) -> Result<T> {
        let response = builder
            .send()
            .await
            .with_context(|| format!("Request failed: {}", what))?;
        let response = check_status(response, what).await?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("Invalid response body: {}", what))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.request(Method::GET, path), path).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send(self.request(Method::POST, path).json(body), path)
            .await
    }

    async fn patch<B: Serialize + Sync, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send(self.request(Method::PATCH, path).json(body), path)
            .await
    }

    async fn delete(&self, path: &str) -> Result<bool> {
        let response: DeleteResponse = self.send(self.request(Method::DELETE, path), path).await?;
        Ok(response.success)
    }
}

async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    anyhow::bail!("{} returned HTTP {}: {}", what, status.as_u16(), body.trim())
}

#[async_trait]
impl RemoteStore for CourseClient {
    async fn list_sections(&self, course_id: CourseId) -> Result<Vec<Section>> {
        self.get(&format!("courses/{}/sections", course_id.0)).await
    }

    async fn list_materials(&self, section_id: SectionId) -> Result<Vec<Material>> {
        self.get(&format!("sections/{}/materials", section_id.0))
            .await
    }

    async fn create_section(&self, new: &NewSection) -> Result<Section> {
        log::debug!("Creating section '{}' at order {}", new.title, new.order);
        self.post("sections", new).await
    }

    async fn create_material(&self, new: &NewMaterial) -> Result<Material> {
        log::debug!(
            "Creating material '{}' in {} at order {}",
            new.title, new.section_id, new.order
        );
        self.post("materials", new).await
    }

    async fn update_section(&self, id: SectionId, patch: &SectionPatch) -> Result<Section> {
        self.patch(&format!("sections/{}", id.0), patch).await
    }

    async fn update_material(&self, id: MaterialId, draft: &MaterialDraft) -> Result<Material> {
        self.patch(&format!("materials/{}", id.0), draft).await
    }

    async fn update_section_order(&self, id: SectionId, order: u32) -> Result<Section> {
        self.patch(&format!("sections/{}", id.0), &SectionOrderPatch { order })
            .await
    }

    async fn update_material_order(
        &self,
        id: MaterialId,
        order: u32,
        section_id: Option<SectionId>,
    ) -> Result<Material> {
        self.patch(
            &format!("materials/{}", id.0),
            &MaterialOrderPatch { order, section_id },
        )
        .await
    }

    async fn delete_section(&self, id: SectionId) -> Result<bool> {
        self.delete(&format!("sections/{}", id.0)).await
    }

    async fn delete_material(&self, id: MaterialId) -> Result<bool> {
        self.delete(&format!("materials/{}", id.0)).await
    }
}
