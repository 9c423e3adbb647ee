//! 商品 REST 接口
//!
//! `CatalogApi` 是数据源的抽象，`HttpCatalogApi` 是基于 reqwest 的实现

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::ApiError;
use crate::models::{NewProduct, Product, ProductPatch};

#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// GET 整个商品集合
    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;

    /// PUT 单个商品的部分字段
    async fn update_product(&self, id: i64, patch: &ProductPatch) -> Result<(), ApiError>;

    /// POST 新商品
    async fn create_product(&self, product: &NewProduct) -> Result<(), ApiError>;
}

pub struct HttpCatalogApi {
    client: Client,
    base_url: Url,
}

impl HttpCatalogApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, client)
    }

    /// 只接受 http / https 的绝对地址
    fn with_client(base_url: &str, client: Client) -> Result<Self, ApiError> {
        let url = Url::parse(base_url).map_err(|source| ApiError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::UnsupportedScheme {
                url: base_url.to_string(),
                scheme: url.scheme().to_string(),
            });
        }

        Ok(Self {
            client,
            base_url: url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/{id}`
    pub fn item_url(&self, id: i64) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&id.to_string());
        }
        url
    }
}

fn ensure_success(response: &reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ApiError::Status {
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let response = self.client.get(self.base_url.clone()).send().await?;
        ensure_success(&response)?;
        response
            .json::<Vec<Product>>()
            .await
            .map_err(ApiError::Decode)
    }

    async fn update_product(&self, id: i64, patch: &ProductPatch) -> Result<(), ApiError> {
        let response = self
            .client
            .put(self.item_url(id))
            .json(patch)
            .send()
            .await?;
        ensure_success(&response)
    }

    async fn create_product(&self, product: &NewProduct) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.base_url.clone())
            .json(product)
            .send()
            .await?;
        ensure_success(&response)
    }
}
