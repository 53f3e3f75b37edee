//! Contact inquiries are read-only for administrators.

use contentdesk_api_types::{Contact, ListPage, ListQuery};

use crate::infra::http::{ApiError, ApiRequest, RestClient};

#[derive(Clone)]
pub struct ContactsClient {
    rest: RestClient,
}

impl ContactsClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// Paged inquiries; the status filter does not apply here.
    pub async fn list(&self, query: ListQuery) -> Result<ListPage<Contact>, ApiError> {
        let request = ApiRequest::get("contact")
            .query("page", query.page)
            .query("pageSize", query.page_size);
        self.rest
            .list(request, "contactList", "문의 목록 조회 실패")
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Contact, ApiError> {
        self.rest
            .field(
                ApiRequest::get(format!("contact/{id}")),
                "contact",
                "문의 상세 조회 실패",
            )
            .await
    }
}
