//! Implements the `FinanceApi` trait against the Spendbook REST backend.

use crate::api::{
    FinanceApi, NewCategory, NewTransaction, TransactionQuery, TransactionsResponse,
};
use crate::model::{Category, Transaction, TransactionKind};
use crate::{Config, Result};
use anyhow::{bail, Context};
use reqwest::{Method, RequestBuilder, Response};
use tracing::trace;

/// Implements the `FinanceApi` trait using `reqwest` against the base URL
/// from [`Config`]. Holds an optional bearer token obtained by the (external)
/// authentication flow; token acquisition and persistence are not handled
/// here.
pub struct RestApi {
    base_url: url::Url,
    bearer_token: Option<String>,
    client: reqwest::Client,
}

impl RestApi {
    /// Creates a client using the base URL and request timeout from `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to build the HTTP client")?;
        Ok(Self {
            base_url: config.api_base_url().clone(),
            bearer_token: None,
            client,
        })
    }

    /// Attaches a bearer token to every subsequent request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn endpoint(&self, path: &str) -> Result<url::Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid endpoint path '{path}'"))
    }

    fn request(&self, method: Method, url: url::Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

/// Turns a non-success response into an error carrying the status and body.
async fn check(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    bail!("{what} failed with status {status}: {body}")
}

#[async_trait::async_trait]
impl FinanceApi for RestApi {
    async fn fetch_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        trace!("fetch_transactions {query:?}");
        let url = self.endpoint("transactions")?;
        let response = self
            .request(Method::GET, url)
            .query(query)
            .send()
            .await
            .context("Failed to fetch transactions")?;
        let body: TransactionsResponse = check(response, "Fetching transactions")
            .await?
            .json()
            .await
            .context("Failed to parse the transactions response")?;
        Ok(body.transactions)
    }

    async fn fetch_categories(&self, kind: Option<TransactionKind>) -> Result<Vec<Category>> {
        trace!("fetch_categories kind={kind:?}");
        let url = self.endpoint("categories")?;
        let mut request = self.request(Method::GET, url);
        if let Some(kind) = kind {
            request = request.query(&[("type", kind.to_string())]);
        }
        let response = request.send().await.context("Failed to fetch categories")?;
        check(response, "Fetching categories")
            .await?
            .json()
            .await
            .context("Failed to parse the categories response")
    }

    async fn create_transaction(&self, input: &NewTransaction) -> Result<Transaction> {
        trace!("create_transaction {input:?}");
        let url = self.endpoint("transactions")?;
        let response = self
            .request(Method::POST, url)
            .json(input)
            .send()
            .await
            .context("Failed to create the transaction")?;
        check(response, "Creating a transaction")
            .await?
            .json()
            .await
            .context("Failed to parse the created transaction")
    }

    async fn create_category(&self, input: &NewCategory) -> Result<Category> {
        trace!("create_category {input:?}");
        let url = self.endpoint("categories")?;
        let response = self
            .request(Method::POST, url)
            .json(input)
            .send()
            .await
            .context("Failed to create the category")?;
        check(response, "Creating a category")
            .await?
            .json()
            .await
            .context("Failed to parse the created category")
    }

    async fn delete_category(&self, id: &str) -> Result<()> {
        trace!("delete_category {id}");
        let url = self.endpoint(&format!("categories/{id}"))?;
        let response = self
            .request(Method::DELETE, url)
            .send()
            .await
            .with_context(|| format!("Failed to delete category '{id}'"))?;
        check(response, "Deleting a category").await?;
        Ok(())
    }

    async fn set_default_category(&self, id: &str) -> Result<Category> {
        trace!("set_default_category {id}");
        let url = self.endpoint(&format!("categories/{id}/default"))?;
        let response = self
            .request(Method::PATCH, url)
            .send()
            .await
            .with_context(|| format!("Failed to set default category '{id}'"))?;
        check(response, "Setting the default category")
            .await?
            .json()
            .await
            .context("Failed to parse the updated category")
    }
}
