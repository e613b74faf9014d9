//! Business partners (clients, vendors, leads).
//!
//! Create and update payloads are normalized and validated locally; an
//! invalid payload never reaches the network.

use hire_models::{
    BusinessPartner, CreateBusinessPartner, Page, QueryFilters, UpdateBusinessPartner,
};
use tracing::{debug, info};

use super::{fetch_page, item_path, list_keys, validate};
use crate::error::ClientResult;
use crate::http::ApiClient;

const BASE: &str = "/business-partners";

#[derive(Clone)]
pub struct BusinessPartnersClient {
    api: ApiClient,
}

impl BusinessPartnersClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, filters: &QueryFilters) -> ClientResult<Page<BusinessPartner>> {
        fetch_page(
            &self.api,
            "business_partners.list",
            BASE,
            list_keys::BUSINESS_PARTNERS,
            filters,
        )
        .await
    }

    pub async fn get(&self, id: &str) -> ClientResult<BusinessPartner> {
        self.api
            .get("business_partners.get", item_path(BASE, id), &QueryFilters::new())
            .await
    }

    pub async fn create(&self, input: CreateBusinessPartner) -> ClientResult<BusinessPartner> {
        let input = input.normalized();
        if let Err(e) = validate(&input) {
            debug!(name = %input.name, "Rejected business partner before sending: {}", e);
            return Err(e);
        }

        let partner: BusinessPartner = self.api.post("business_partners.create", BASE, &input).await?;
        info!(partner_id = %partner.id, "Created business partner");
        Ok(partner)
    }

    pub async fn update(
        &self,
        id: &str,
        input: UpdateBusinessPartner,
    ) -> ClientResult<BusinessPartner> {
        let input = input.normalized();
        validate(&input)?;
        self.api
            .put("business_partners.update", item_path(BASE, id), &input)
            .await
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.api
            .delete("business_partners.delete", item_path(BASE, id))
            .await
    }
}
